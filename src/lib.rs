//! # u-tabstat
//!
//! Tabular statistics and chart-series derivation engine with C FFI bindings.
//!
//! u-tabstat takes a rectangular dataset of loosely typed cells (numbers,
//! strings in either decimal convention, nulls) and derives what a
//! statistics view or a chart needs:
//!
//! - **Statistics**: central tendency, position and dispersion measures,
//!   ungrouped and Sturges-grouped frequency tables
//! - **Charts**: column roles decide between category counts, category sums
//!   and histograms, plus scatter, bar + line, stacked and regression data
//!
//! Invalid or missing data never raises: results are `None` or an explicit
//! empty series, and callers branch on that before rendering.
//!
//! ## Modules
//!
//! - [`dataset`]: Column-major dataset of raw cells, JSON boundary, cell edits
//! - [`coerce`]: Locale-tolerant numeric coercion (`"1.234,5"`, `"3,14"`, `"12 kg"`)
//! - [`config`]: Immutable analysis configuration
//! - [`classify`]: Numeric / categorical column roles (60% of a 100-row sample)
//! - [`descriptive`]: Mean, median, mode, percentiles, quartiles, deciles, variance, CV, box summary
//! - [`frequency`]: Ungrouped and grouped frequency tables, natural ordering
//! - [`series`]: Chart series builder (count / cat-sum / hist / empty)
//! - [`composite`]: Scatter, bar + line, stacked, linear regression, heatmap matrix
//! - [`profile`]: Column and dataset profiles
//! - [`ffi`]: C FFI bindings (JSON in, JSON out)
//! - [`error`]: Error types
//!
//! ## Quick Start
//!
//! ```
//! use u_tabstat::classify::{classify_column, ColumnRole};
//! use u_tabstat::dataset::Dataset;
//! use u_tabstat::descriptive::mean;
//! use u_tabstat::series::{build_series, SeriesKind};
//!
//! let ds = Dataset::from_json_str(r#"{
//!     "columns": [{"key": "cat", "name": "Category"}, {"key": "val", "name": "Value"}],
//!     "rows": [
//!         {"cat": "A", "val": "10"},
//!         {"cat": "A", "val": "5"},
//!         {"cat": "B", "val": "7"}
//!     ]
//! }"#).unwrap();
//!
//! assert_eq!(classify_column(&ds, "val"), ColumnRole::Numeric);
//! assert_eq!(mean(ds.column("val").unwrap()), Some(22.0 / 3.0));
//!
//! let chart = build_series(&ds, Some("val"));
//! assert_eq!(chart.kind, SeriesKind::CatSum);
//! assert_eq!(chart.series[0].name, "A");
//! assert_eq!(chart.series[0].value, 15.0);
//! ```

pub mod classify;
pub mod coerce;
pub mod composite;
pub mod config;
pub mod dataset;
pub mod descriptive;
pub mod error;
pub mod ffi;
pub mod frequency;
pub mod profile;
pub mod series;
