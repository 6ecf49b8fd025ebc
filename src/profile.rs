//! Column-level and dataset-level profiles.
//!
//! A profile bundles what a statistics view shows for a column: its role,
//! missing cells, descriptive statistics (numeric columns only), the
//! ungrouped frequency table and, when every cell is numeric, the grouped
//! table. Profiles are computed fresh on every call.
//!
//! # Example
//!
//! ```
//! use u_tabstat::classify::ColumnRole;
//! use u_tabstat::dataset::Dataset;
//! use u_tabstat::profile::profile_column;
//!
//! let ds = Dataset::from_json_str(r#"{
//!     "columns": [{"key": "t", "name": "Temperature"}],
//!     "rows": [{"t": "20,5"}, {"t": 21.3}, {"t": null}, {"t": "19.8"}]
//! }"#).unwrap();
//!
//! let p = profile_column(&ds, "t").unwrap();
//! assert_eq!(p.role, ColumnRole::Numeric);
//! assert_eq!(p.null_count, 1);
//! assert_eq!(p.numeric_count, 3);
//! assert!(p.statistics.is_some());
//! assert!(p.grouped.is_none()); // one cell is null
//! ```

use serde::Serialize;

use crate::classify::{classify_column_with, ColumnRole};
use crate::coerce::numeric_values;
use crate::config::AnalysisConfig;
use crate::dataset::{Cell, Dataset};
use crate::descriptive::{box_summary_with, describe_with, BoxSummary, DescriptiveSummary};
use crate::error::TabStatError;
use crate::frequency::{grouped_table_with, ungrouped_table, GroupedRow, UngroupedRow};

// ── Column Profile ────────────────────────────────────────────────────

/// Complete profile of a single column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnProfile {
    /// Column key.
    pub key: String,
    /// Display name.
    pub name: String,
    /// Classified role.
    pub role: ColumnRole,
    /// Total number of rows.
    pub row_count: usize,
    /// Number of null cells.
    pub null_count: usize,
    /// Missing cell percentage (0.0 to 100.0).
    pub missing_pct: f64,
    /// Cells that coerce to numbers.
    pub numeric_count: usize,
    /// Descriptive statistics (numeric columns only).
    pub statistics: Option<DescriptiveSummary>,
    /// Box-plot summary (numeric columns only).
    pub box_plot: Option<BoxSummary>,
    /// Ungrouped frequency table over all cells.
    pub ungrouped: Vec<UngroupedRow>,
    /// Grouped frequency table (fully numeric columns only).
    pub grouped: Option<Vec<GroupedRow>>,
}

/// Profiles a single column with default settings.
pub fn profile_column(dataset: &Dataset, key: &str) -> Result<ColumnProfile, TabStatError> {
    profile_column_with(dataset, key, &AnalysisConfig::default())
}

/// Profiles a single column.
///
/// # Errors
///
/// [`TabStatError::ColumnNotFound`] if `key` is not a column of the dataset.
pub fn profile_column_with(
    dataset: &Dataset,
    key: &str,
    config: &AnalysisConfig,
) -> Result<ColumnProfile, TabStatError> {
    let cells = dataset
        .column(key)
        .ok_or_else(|| TabStatError::ColumnNotFound {
            key: key.to_string(),
        })?;
    let name = dataset
        .display_name(key)
        .filter(|n| !n.is_empty())
        .unwrap_or(key)
        .to_string();
    Ok(build_profile(key, name, cells, config, classify_column_with(dataset, key, config)))
}

fn build_profile(
    key: &str,
    name: String,
    cells: &[Cell],
    config: &AnalysisConfig,
    role: ColumnRole,
) -> ColumnProfile {
    let row_count = cells.len();
    let null_count = cells.iter().filter(|c| c.is_null()).count();
    let missing_pct = if row_count > 0 {
        (null_count as f64 / row_count as f64) * 100.0
    } else {
        0.0
    };
    let numeric_count = numeric_values(cells, config.coercion).len();

    let (statistics, box_plot) = match role {
        ColumnRole::Numeric => (
            describe_with(cells, config.coercion),
            box_summary_with(cells, config.coercion),
        ),
        ColumnRole::Categorical => (None, None),
    };

    ColumnProfile {
        key: key.to_string(),
        name,
        role,
        row_count,
        null_count,
        missing_pct,
        numeric_count,
        statistics,
        box_plot,
        ungrouped: ungrouped_table(cells),
        grouped: grouped_table_with(cells, config),
    }
}

// ── Dataset Profile ───────────────────────────────────────────────────

/// Summary of an entire dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetProfile {
    pub row_count: usize,
    pub column_count: usize,
    /// Number of numeric columns.
    pub numeric_columns: usize,
    /// Number of categorical columns.
    pub categorical_columns: usize,
    /// Null cells across all columns.
    pub total_nulls: usize,
    /// Overall missing rate as percentage (0-100).
    pub sparsity_pct: f64,
    /// Per-column profiles, in column order.
    pub columns: Vec<ColumnProfile>,
}

/// Profiles every column with default settings.
///
/// ```
/// use u_tabstat::dataset::Dataset;
/// use u_tabstat::profile::profile_dataset;
///
/// let mut ds = Dataset::with_keys(&["x", "y"]).unwrap();
/// ds.push_row(vec![1.0.into(), "A".into()]).unwrap();
/// ds.push_row(vec![2.0.into(), "B".into()]).unwrap();
///
/// let p = profile_dataset(&ds);
/// assert_eq!(p.row_count, 2);
/// assert_eq!(p.numeric_columns, 1);
/// assert_eq!(p.sparsity_pct, 0.0);
/// ```
pub fn profile_dataset(dataset: &Dataset) -> DatasetProfile {
    profile_dataset_with(dataset, &AnalysisConfig::default())
}

/// Profiles every column.
pub fn profile_dataset_with(dataset: &Dataset, config: &AnalysisConfig) -> DatasetProfile {
    let columns: Vec<ColumnProfile> = dataset
        .iter()
        .map(|(def, cells)| {
            let name = if def.name.is_empty() {
                def.key.clone()
            } else {
                def.name.clone()
            };
            let role = classify_column_with(dataset, &def.key, config);
            build_profile(&def.key, name, cells, config, role)
        })
        .collect();

    let row_count = dataset.row_count();
    let column_count = dataset.column_count();
    let numeric_columns = columns
        .iter()
        .filter(|c| c.role == ColumnRole::Numeric)
        .count();
    let total_nulls: usize = columns.iter().map(|c| c.null_count).sum();
    let total_cells = row_count * column_count;
    let sparsity_pct = if total_cells > 0 {
        (total_nulls as f64 / total_cells as f64) * 100.0
    } else {
        0.0
    };

    DatasetProfile {
        row_count,
        column_count,
        numeric_columns,
        categorical_columns: column_count - numeric_columns,
        total_nulls,
        sparsity_pct,
        columns,
    }
}
