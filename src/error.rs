//! Error types for u-tabstat.
//!
//! Statistical and chart-series computations never fail; they return
//! `None` or an explicit empty result. Errors only arise at the dataset
//! boundary (building, editing, or decoding a [`Dataset`](crate::dataset::Dataset)).

use thiserror::Error;

/// All errors produced by u-tabstat operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TabStatError {
    /// Column key not present in the dataset.
    #[error("column '{key}' not found")]
    ColumnNotFound { key: String },
    /// Two columns share the same key.
    #[error("duplicate column key '{key}'")]
    DuplicateColumn { key: String },
    /// A row has a different number of cells than there are columns.
    #[error("expected {expected} cells, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    /// Row index past the end of the dataset.
    #[error("row {row} out of bounds (rows={rows})")]
    RowOutOfBounds { row: usize, rows: usize },
    /// Dataset or configuration JSON could not be decoded.
    #[error("invalid JSON: {0}")]
    Json(String),
    /// Structurally invalid input not covered by another variant.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl From<serde_json::Error> for TabStatError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e.to_string())
    }
}
