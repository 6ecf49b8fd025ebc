//! Column role classification.
//!
//! A column is [`Numeric`](ColumnRole::Numeric) when at least 60% of its
//! first 100 cells coerce to numbers, otherwise
//! [`Categorical`](ColumnRole::Categorical). Downstream code switches on
//! the returned role instead of re-testing convertibility.
//!
//! Roles depend on cell contents, so they must be recomputed after any edit
//! to the dataset. Nothing here caches.
//!
//! ```
//! use u_tabstat::classify::{classify_column, ColumnRole};
//! use u_tabstat::dataset::Dataset;
//!
//! let mut ds = Dataset::with_keys(&["cat", "val"]).unwrap();
//! ds.push_row(vec!["A".into(), "10".into()]).unwrap();
//! ds.push_row(vec!["B".into(), "7,5".into()]).unwrap();
//!
//! assert_eq!(classify_column(&ds, "val"), ColumnRole::Numeric);
//! assert_eq!(classify_column(&ds, "cat"), ColumnRole::Categorical);
//! ```

use std::fmt;

use serde::Serialize;
use tracing::{debug, trace};

use crate::coerce::{CoercionPolicy, RawValue};
use crate::config::AnalysisConfig;
use crate::dataset::Dataset;

/// Role a column plays in analysis and charting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnRole {
    /// Mostly numeric values.
    Numeric,
    /// Labels, free text, or mostly unparseable values.
    Categorical,
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric => write!(f, "Numeric"),
            Self::Categorical => write!(f, "Categorical"),
        }
    }
}

/// Fraction of the first `sample_size` values that coerce to numbers.
///
/// Returns `None` when the sample is empty.
pub fn numeric_ratio<T: RawValue>(
    values: &[T],
    sample_size: usize,
    policy: CoercionPolicy,
) -> Option<f64> {
    let sample = &values[..values.len().min(sample_size)];
    if sample.is_empty() {
        return None;
    }
    let numeric = sample
        .iter()
        .filter(|v| v.to_number(policy).is_some())
        .count();
    Some(numeric as f64 / sample.len() as f64)
}

/// Classifies a sequence of raw values.
///
/// An empty sequence is categorical.
pub fn classify_values<T: RawValue>(values: &[T], config: &AnalysisConfig) -> ColumnRole {
    let ratio = numeric_ratio(values, config.sample_size, config.coercion);
    let role = match ratio {
        Some(r) if r >= config.numeric_threshold => ColumnRole::Numeric,
        _ => ColumnRole::Categorical,
    };
    trace!(?ratio, threshold = config.numeric_threshold, %role, "numeric ratio");
    role
}

/// Classifies one dataset column with default settings.
///
/// Unknown keys are treated as an all-null column, hence categorical.
pub fn classify_column(dataset: &Dataset, key: &str) -> ColumnRole {
    classify_column_with(dataset, key, &AnalysisConfig::default())
}

/// Classifies one dataset column.
pub fn classify_column_with(dataset: &Dataset, key: &str, config: &AnalysisConfig) -> ColumnRole {
    let Some(cells) = dataset.column(key) else {
        debug!(column = key, "unknown column classified as categorical");
        return ColumnRole::Categorical;
    };
    let role = classify_values(cells, config);
    debug!(column = key, %role, "classified column");
    role
}

/// Returns `true` if the sequence is non-empty and every value coerces.
///
/// Stricter than classification; grouped frequency tables require it.
pub fn is_fully_numeric<T: RawValue>(values: &[T], policy: CoercionPolicy) -> bool {
    !values.is_empty() && values.iter().all(|v| v.to_number(policy).is_some())
}

// ── ColumnRoles ───────────────────────────────────────────────────────

/// Roles of every column of a dataset, in column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnRoles {
    roles: Vec<(String, ColumnRole)>,
}

impl ColumnRoles {
    /// Role of the given column.
    pub fn role(&self, key: &str) -> Option<ColumnRole> {
        self.roles
            .iter()
            .find(|(k, _)| k == key)
            .map(|&(_, r)| r)
    }

    /// Returns `true` if the column is known and numeric.
    pub fn is_numeric(&self, key: &str) -> bool {
        self.role(key) == Some(ColumnRole::Numeric)
    }

    /// Keys of numeric columns, in column order.
    pub fn numeric_keys(&self) -> impl Iterator<Item = &str> {
        self.keys_with(ColumnRole::Numeric)
    }

    /// Keys of categorical columns, in column order.
    pub fn categorical_keys(&self) -> impl Iterator<Item = &str> {
        self.keys_with(ColumnRole::Categorical)
    }

    fn keys_with(&self, role: ColumnRole) -> impl Iterator<Item = &str> {
        self.roles
            .iter()
            .filter(move |(_, r)| *r == role)
            .map(|(k, _)| k.as_str())
    }

    /// Iterates over (key, role) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, ColumnRole)> {
        self.roles.iter().map(|(k, r)| (k.as_str(), *r))
    }

    /// Number of classified columns.
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// Returns `true` if no columns were classified.
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

/// Classifies every column with default settings.
pub fn classify_columns(dataset: &Dataset) -> ColumnRoles {
    classify_columns_with(dataset, &AnalysisConfig::default())
}

/// Classifies every column.
pub fn classify_columns_with(dataset: &Dataset, config: &AnalysisConfig) -> ColumnRoles {
    let roles = dataset
        .columns()
        .iter()
        .map(|c| (c.key.clone(), classify_column_with(dataset, &c.key, config)))
        .collect();
    ColumnRoles { roles }
}

// ── Tests ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Cell;

    fn single_column(cells: Vec<Cell>) -> Dataset {
        let mut ds = Dataset::with_keys(&["x"]).unwrap();
        for c in cells {
            ds.push_row(vec![c]).unwrap();
        }
        ds
    }

    fn mixed(numeric: usize, total: usize) -> Vec<Cell> {
        (0..total)
            .map(|i| {
                if i < numeric {
                    Cell::from(i.to_string())
                } else {
                    Cell::from("label")
                }
            })
            .collect()
    }

    // ── Threshold ────────────────────────────────────────────────

    #[test]
    fn exactly_sixty_percent_is_numeric() {
        let ds = single_column(mixed(60, 100));
        assert_eq!(classify_column(&ds, "x"), ColumnRole::Numeric);
    }

    #[test]
    fn fifty_nine_percent_is_categorical() {
        let ds = single_column(mixed(59, 100));
        assert_eq!(classify_column(&ds, "x"), ColumnRole::Categorical);
    }

    #[test]
    fn only_first_hundred_rows_sampled() {
        // 100 labels followed by 500 numbers: the sample sees labels only.
        let mut cells: Vec<Cell> = (0..100).map(|_| Cell::from("label")).collect();
        cells.extend((0..500).map(|i| Cell::Number(i as f64)));
        let ds = single_column(cells);
        assert_eq!(classify_column(&ds, "x"), ColumnRole::Categorical);
    }

    #[test]
    fn short_column_uses_all_rows() {
        let ds = single_column(vec!["1".into(), "2".into(), "x".into()]);
        assert_eq!(
            numeric_ratio(ds.column("x").unwrap(), 100, CoercionPolicy::RawFirst),
            Some(2.0 / 3.0)
        );
        assert_eq!(classify_column(&ds, "x"), ColumnRole::Numeric);
    }

    #[test]
    fn nulls_count_against_numeric() {
        let ds = single_column(vec![Cell::Number(1.0), Cell::Null, Cell::Null]);
        assert_eq!(classify_column(&ds, "x"), ColumnRole::Categorical);
    }

    #[test]
    fn custom_threshold() {
        let config = AnalysisConfig::new().numeric_threshold(0.9);
        let values = ["1", "2", "3", "x"];
        assert_eq!(classify_values(&values, &config), ColumnRole::Categorical);
        assert_eq!(
            classify_values(&values, &AnalysisConfig::default()),
            ColumnRole::Numeric
        );
    }

    #[test]
    fn column_and_values_agree_under_config() {
        let config = AnalysisConfig::new().sample_size(4).numeric_threshold(0.75);
        let cells = vec![
            Cell::from("1"),
            Cell::from("2"),
            Cell::from("3"),
            Cell::from("x"),
            Cell::from("y"),
        ];
        let ds = single_column(cells.clone());
        assert_eq!(classify_values(&cells, &config), ColumnRole::Numeric);
        assert_eq!(classify_column_with(&ds, "x", &config), ColumnRole::Numeric);

        let strict = config.numeric_threshold(0.8);
        assert_eq!(classify_values(&cells, &strict), ColumnRole::Categorical);
        assert_eq!(classify_column_with(&ds, "x", &strict), ColumnRole::Categorical);
    }

    // ── Edge cases ───────────────────────────────────────────────

    #[test]
    fn empty_and_unknown_columns_are_categorical() {
        let ds = Dataset::with_keys(&["x"]).unwrap();
        assert_eq!(classify_column(&ds, "x"), ColumnRole::Categorical);
        assert_eq!(classify_column(&ds, "missing"), ColumnRole::Categorical);
        assert_eq!(numeric_ratio::<Cell>(&[], 100, CoercionPolicy::RawFirst), None);
    }

    #[test]
    fn edit_flips_role() {
        let mut ds = single_column(vec!["1".into(), "2".into(), "x".into()]);
        assert_eq!(classify_column(&ds, "x"), ColumnRole::Numeric);
        ds.set_cell(0, "x", "one".into()).unwrap();
        assert_eq!(classify_column(&ds, "x"), ColumnRole::Categorical);
    }

    #[test]
    fn fully_numeric_check() {
        let p = CoercionPolicy::RawFirst;
        assert!(is_fully_numeric(&["1", "2,5", "3"], p));
        assert!(!is_fully_numeric(&["1", ""], p));
        assert!(!is_fully_numeric::<&str>(&[], p));
    }

    // ── ColumnRoles ──────────────────────────────────────────────

    #[test]
    fn roles_for_all_columns() {
        let mut ds = Dataset::with_keys(&["a", "b", "c"]).unwrap();
        ds.push_row(vec!["x".into(), 1.0.into(), "2".into()]).unwrap();
        ds.push_row(vec!["y".into(), 2.0.into(), "3".into()]).unwrap();

        let roles = classify_columns(&ds);
        assert_eq!(roles.len(), 3);
        assert_eq!(roles.role("a"), Some(ColumnRole::Categorical));
        assert!(roles.is_numeric("b"));
        assert_eq!(roles.numeric_keys().collect::<Vec<_>>(), vec!["b", "c"]);
        assert_eq!(roles.categorical_keys().collect::<Vec<_>>(), vec!["a"]);
        assert_eq!(roles.role("zzz"), None);
    }
}
