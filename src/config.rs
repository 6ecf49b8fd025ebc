//! Analysis configuration.
//!
//! [`AnalysisConfig`] gathers every policy constant the engine uses. It is
//! an immutable value handed to each `*_with` entry point; functions without
//! the suffix use [`AnalysisConfig::default()`].
//!
//! ```
//! use u_tabstat::config::{AnalysisConfig, BoundaryMode};
//! use u_tabstat::coerce::CoercionPolicy;
//!
//! let config = AnalysisConfig::new()
//!     .coercion(CoercionPolicy::NormalizedFirst)
//!     .boundary(BoundaryMode::HalfOpen)
//!     .max_categories(5);
//! assert_eq!(config.sample_size, 100);
//! assert_eq!(config.max_categories, 5);
//!
//! // Partial JSON keeps defaults for missing fields.
//! let from_json: AnalysisConfig = serde_json::from_str(r#"{"histogramBins": 10}"#).unwrap();
//! assert_eq!(from_json.histogram_bins, 10);
//! assert_eq!(from_json.numeric_threshold, 0.6);
//! ```

use serde::{Deserialize, Serialize};

use crate::coerce::CoercionPolicy;

/// Rows inspected when classifying a column.
pub const DEFAULT_SAMPLE_SIZE: usize = 100;

/// Minimum fraction of sampled cells that must coerce for a column to be numeric.
pub const DEFAULT_NUMERIC_THRESHOLD: f64 = 0.6;

/// Maximum number of categories kept in a category series.
pub const DEFAULT_MAX_CATEGORIES: usize = 12;

/// Number of bins in the automatic histogram.
pub const DEFAULT_HISTOGRAM_BINS: usize = 8;

/// Range buckets in a stacked series without a category column.
pub const DEFAULT_STACKED_BINS: usize = 6;

/// Numeric series combined in a stacked chart.
pub const DEFAULT_STACKED_SERIES: usize = 3;

/// How grouped-frequency classes treat a value lying exactly on a shared boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BoundaryMode {
    /// Every class counts `start <= v <= end`. A value on an interior
    /// boundary is counted in both neighbouring classes.
    #[default]
    Inclusive,
    /// Classes count `start <= v < end`; only the last class includes its
    /// upper bound. Each value is counted exactly once.
    HalfOpen,
}

/// Policy constants for classification, coercion and series shaping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalysisConfig {
    /// Reading order for ambiguous decimal strings. Default: `RawFirst`.
    pub coercion: CoercionPolicy,
    /// Rows sampled by the column classifier. Default: 100.
    pub sample_size: usize,
    /// Numeric fraction at or above which a column is numeric. Default: 0.6.
    pub numeric_threshold: f64,
    /// Categories kept in count / sum series. Default: 12.
    pub max_categories: usize,
    /// Bins in the automatic histogram. Default: 8.
    pub histogram_bins: usize,
    /// Range buckets used by stacked series without a category column. Default: 6.
    pub stacked_bins: usize,
    /// Numeric series combined in a stacked chart. Default: 3.
    pub stacked_series: usize,
    /// Boundary handling for grouped frequency tables. Default: `Inclusive`.
    pub boundary: BoundaryMode,
}

impl AnalysisConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the coercion policy.
    pub fn coercion(mut self, policy: CoercionPolicy) -> Self {
        self.coercion = policy;
        self
    }

    /// Sets the classifier sample size.
    pub fn sample_size(mut self, rows: usize) -> Self {
        self.sample_size = rows;
        self
    }

    /// Sets the numeric classification threshold.
    pub fn numeric_threshold(mut self, threshold: f64) -> Self {
        self.numeric_threshold = threshold;
        self
    }

    /// Sets how many categories a series keeps.
    pub fn max_categories(mut self, n: usize) -> Self {
        self.max_categories = n;
        self
    }

    /// Sets the histogram bin count.
    pub fn histogram_bins(mut self, bins: usize) -> Self {
        self.histogram_bins = bins;
        self
    }

    /// Sets the range bucket count for stacked series without a category.
    pub fn stacked_bins(mut self, bins: usize) -> Self {
        self.stacked_bins = bins;
        self
    }

    /// Sets how many numeric series a stacked chart combines.
    pub fn stacked_series(mut self, n: usize) -> Self {
        self.stacked_series = n;
        self
    }

    /// Sets the grouped-table boundary mode.
    pub fn boundary(mut self, mode: BoundaryMode) -> Self {
        self.boundary = mode;
        self
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            coercion: CoercionPolicy::default(),
            sample_size: DEFAULT_SAMPLE_SIZE,
            numeric_threshold: DEFAULT_NUMERIC_THRESHOLD,
            max_categories: DEFAULT_MAX_CATEGORIES,
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
            stacked_bins: DEFAULT_STACKED_BINS,
            stacked_series: DEFAULT_STACKED_SERIES,
            boundary: BoundaryMode::default(),
        }
    }
}
