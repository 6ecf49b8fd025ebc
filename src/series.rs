//! Chart-series builder.
//!
//! [`build_series`] turns a dataset and a selected column into a
//! `{kind, series}` pair a chart can draw without further processing:
//!
//! | Selected column | Other columns          | Kind      | Series                          |
//! |-----------------|------------------------|-----------|---------------------------------|
//! | missing         | –                      | `empty`   | none                            |
//! | categorical     | –                      | `count`   | rows per category, top 12       |
//! | numeric         | a categorical one      | `cat-sum` | sum per category, top 12        |
//! | numeric         | only numeric           | `hist`    | 8 equal-width bins              |
//!
//! Category rankings sort by value descending with a stable sort, so equal
//! values keep the order in which their categories were first seen.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::classify::{classify_columns_with, ColumnRole};
use crate::coerce::{numeric_values, CoercionPolicy, RawValue};
use crate::config::AnalysisConfig;
use crate::dataset::{format_number, Dataset, EMPTY_LABEL};
use crate::frequency::round_to;

/// Shape of a chart series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SeriesKind {
    /// Occurrences per category of a categorical column.
    Count,
    /// Sum of a numeric column per category of another column.
    CatSum,
    /// Histogram bins of a numeric column.
    Hist,
    /// Nothing to draw.
    Empty,
}

/// A named value: one bar, slice or bin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub name: String,
    pub value: f64,
}

impl SeriesPoint {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Output of [`build_series`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    pub kind: SeriesKind,
    pub series: Vec<SeriesPoint>,
    /// Grouping column of a `cat-sum` series.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_column: Option<String>,
}

impl ChartSeries {
    /// The `empty` result.
    pub fn empty() -> Self {
        Self {
            kind: SeriesKind::Empty,
            series: Vec::new(),
            category_column: None,
        }
    }

    fn of(kind: SeriesKind, series: Vec<SeriesPoint>) -> Self {
        if series.is_empty() {
            return Self::empty();
        }
        Self {
            kind,
            series,
            category_column: None,
        }
    }

    /// Returns `true` for the `empty` result.
    pub fn is_empty(&self) -> bool {
        self.kind == SeriesKind::Empty
    }
}

// ── Builder ───────────────────────────────────────────────────────────

/// Builds the series for a selected column with default settings.
///
/// ```
/// use u_tabstat::dataset::Dataset;
/// use u_tabstat::series::{build_series, SeriesKind};
///
/// let ds = Dataset::from_json_str(r#"{
///     "columns": [{"key": "cat"}, {"key": "val"}],
///     "rows": [
///         {"cat": "A", "val": "10"},
///         {"cat": "A", "val": "5"},
///         {"cat": "B", "val": "7"}
///     ]
/// }"#).unwrap();
///
/// let chart = build_series(&ds, Some("val"));
/// assert_eq!(chart.kind, SeriesKind::CatSum);
/// assert_eq!(chart.series[0].name, "A");
/// assert_eq!(chart.series[0].value, 15.0);
/// assert_eq!(chart.series[1].value, 7.0);
/// ```
pub fn build_series(dataset: &Dataset, selected: Option<&str>) -> ChartSeries {
    build_series_with(dataset, selected, &AnalysisConfig::default())
}

/// Builds the series for a selected column.
///
/// Returns the `empty` result when nothing is selected, the dataset has no
/// rows or columns, or the selected column does not exist.
pub fn build_series_with(
    dataset: &Dataset,
    selected: Option<&str>,
    config: &AnalysisConfig,
) -> ChartSeries {
    let Some(selected) = selected else {
        return ChartSeries::empty();
    };
    if dataset.is_empty() {
        return ChartSeries::empty();
    }
    let Some(values) = dataset.column(selected) else {
        debug!(column = selected, "series requested for unknown column");
        return ChartSeries::empty();
    };

    let roles = classify_columns_with(dataset, config);
    if !roles.is_numeric(selected) {
        debug!(column = selected, "building count series");
        let series = count_by_category(values, config.max_categories);
        return ChartSeries::of(SeriesKind::Count, series);
    }

    let category = roles
        .iter()
        .find(|&(key, role)| key != selected && role == ColumnRole::Categorical)
        .map(|(key, _)| key);

    match category.and_then(|key| dataset.column(key).map(|cells| (key, cells))) {
        Some((key, categories)) => {
            debug!(column = selected, category = key, "building cat-sum series");
            let series = aggregate_by_category(
                categories,
                values,
                config.coercion,
                config.max_categories,
            );
            let mut chart = ChartSeries::of(SeriesKind::CatSum, series);
            if !chart.is_empty() {
                chart.category_column = Some(key.to_string());
            }
            chart
        }
        None => {
            debug!(column = selected, bins = config.histogram_bins, "building histogram");
            let series = histogram(values, config.histogram_bins, config.coercion);
            ChartSeries::of(SeriesKind::Hist, series)
        }
    }
}

// ── Category helpers ──────────────────────────────────────────────────

/// Category label of a raw value; nulls and empty strings share [`EMPTY_LABEL`].
pub(crate) fn category_label<T: RawValue>(value: &T) -> String {
    match value.to_label() {
        Some(l) if !l.is_empty() => l.into_owned(),
        _ => EMPTY_LABEL.to_string(),
    }
}

/// Per-category running totals in first-seen order.
#[derive(Debug, Default)]
pub(crate) struct CategoryTotals {
    index: HashMap<String, usize>,
    entries: Vec<(String, f64)>,
}

impl CategoryTotals {
    pub(crate) fn add(&mut self, category: String, amount: f64) {
        match self.index.get(&category) {
            Some(&i) => self.entries[i].1 += amount,
            None => {
                self.index.insert(category.clone(), self.entries.len());
                self.entries.push((category, amount));
            }
        }
    }

    /// Highest totals first, at most `limit` entries.
    pub(crate) fn top(self, limit: usize) -> Vec<SeriesPoint> {
        let mut entries = self.entries;
        entries.sort_by(|a, b| b.1.total_cmp(&a.1));
        entries.truncate(limit);
        entries
            .into_iter()
            .map(|(name, value)| SeriesPoint { name, value })
            .collect()
    }
}

/// Occurrences of each category, most frequent first, at most `limit`.
///
/// ```
/// use u_tabstat::series::count_by_category;
///
/// let series = count_by_category(&["x", "y", "y", ""], 12);
/// assert_eq!(series[0].name, "y");
/// assert_eq!(series[0].value, 2.0);
/// assert_eq!(series[2].name, "(empty)");
/// ```
pub fn count_by_category<T: RawValue>(values: &[T], limit: usize) -> Vec<SeriesPoint> {
    let mut totals = CategoryTotals::default();
    for v in values {
        totals.add(category_label(v), 1.0);
    }
    totals.top(limit)
}

/// Sum of `values` per category, highest first, at most `limit`.
///
/// Rows whose value is not numeric are skipped; a category whose values are
/// all non-numeric does not appear.
pub fn aggregate_by_category<C: RawValue, V: RawValue>(
    categories: &[C],
    values: &[V],
    policy: CoercionPolicy,
    limit: usize,
) -> Vec<SeriesPoint> {
    let mut totals = CategoryTotals::default();
    for (c, v) in categories.iter().zip(values) {
        if let Some(y) = v.to_number(policy) {
            totals.add(category_label(c), y);
        }
    }
    totals.top(limit)
}

// ── Histogram ─────────────────────────────────────────────────────────

/// `[from – to)` with both bounds rounded to two decimals.
pub(crate) fn bucket_label(from: f64, to: f64) -> String {
    format!(
        "[{} – {})",
        format_number(round_to(from, 2)),
        format_number(round_to(to, 2))
    )
}

/// Equal-width histogram of the numeric values.
///
/// A value falls into bin `min(⌊(v − min)/width⌋, bins − 1)`, so every value
/// is counted once. When all values are equal a single bin named after
/// the value holds them all. No numeric values gives an empty series.
///
/// ```
/// use u_tabstat::coerce::CoercionPolicy;
/// use u_tabstat::series::histogram;
///
/// let bins = histogram(&[0.0, 1.0, 2.0, 3.0, 4.0], 4, CoercionPolicy::RawFirst);
/// assert_eq!(bins[0].name, "[0 – 1)");
/// assert_eq!(bins[3].value, 2.0);
/// ```
pub fn histogram<T: RawValue>(values: &[T], bins: usize, policy: CoercionPolicy) -> Vec<SeriesPoint> {
    let xs = numeric_values(values, policy);
    if xs.is_empty() {
        return Vec::new();
    }
    let bins = bins.max(1);
    let min = xs.iter().copied().fold(f64::INFINITY, f64::min);
    let max = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        return vec![SeriesPoint::new(format_number(min), xs.len() as f64)];
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for v in &xs {
        let idx = (((v - min) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| {
            let from = min + i as f64 * width;
            let to = if i + 1 == bins {
                max
            } else {
                min + (i + 1) as f64 * width
            };
            SeriesPoint::new(bucket_label(from, to), count as f64)
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Cell;

    fn dataset(keys: &[&str], rows: Vec<Vec<Cell>>) -> Dataset {
        let mut ds = Dataset::with_keys(keys).unwrap();
        for r in rows {
            ds.push_row(r).unwrap();
        }
        ds
    }

    // ── Decision policy ──────────────────────────────────────────

    #[test]
    fn nothing_selected_is_empty() {
        let ds = dataset(&["a"], vec![vec!["1".into()]]);
        assert_eq!(build_series(&ds, None), ChartSeries::empty());
    }

    #[test]
    fn empty_dataset_is_empty() {
        let ds = Dataset::with_keys(&["a"]).unwrap();
        assert!(build_series(&ds, Some("a")).is_empty());
        let none = Dataset::with_keys(&[]).unwrap();
        assert!(build_series(&none, Some("a")).is_empty());
    }

    #[test]
    fn unknown_column_is_empty() {
        let ds = dataset(&["a"], vec![vec!["1".into()]]);
        assert!(build_series(&ds, Some("zzz")).is_empty());
    }

    #[test]
    fn categorical_selected_counts() {
        let ds = dataset(
            &["fruit"],
            vec![
                vec!["apple".into()],
                vec!["pear".into()],
                vec!["pear".into()],
                vec![Cell::Null],
            ],
        );
        let chart = build_series(&ds, Some("fruit"));
        assert_eq!(chart.kind, SeriesKind::Count);
        assert_eq!(chart.series[0], SeriesPoint::new("pear", 2.0));
        assert_eq!(chart.series[1], SeriesPoint::new("apple", 1.0));
        assert_eq!(chart.series[2], SeriesPoint::new(EMPTY_LABEL, 1.0));
        assert_eq!(chart.category_column, None);
    }

    #[test]
    fn numeric_with_category_sums() {
        let ds = dataset(
            &["cat", "val"],
            vec![
                vec!["A".into(), "10".into()],
                vec!["A".into(), "5".into()],
                vec!["B".into(), "7".into()],
            ],
        );
        let chart = build_series(&ds, Some("val"));
        assert_eq!(chart.kind, SeriesKind::CatSum);
        assert_eq!(
            chart.series,
            vec![SeriesPoint::new("A", 15.0), SeriesPoint::new("B", 7.0)]
        );
        assert_eq!(chart.category_column.as_deref(), Some("cat"));
    }

    #[test]
    fn numeric_only_builds_histogram() {
        let rows = (0..16).map(|i| vec![Cell::Number(i as f64)]).collect();
        let ds = dataset(&["v"], rows);
        let chart = build_series(&ds, Some("v"));
        assert_eq!(chart.kind, SeriesKind::Hist);
        assert_eq!(chart.series.len(), 8);
        let total: f64 = chart.series.iter().map(|p| p.value).sum();
        assert_eq!(total, 16.0);
    }

    #[test]
    fn kind_serializes_kebab_case() {
        let json = serde_json::to_value(SeriesKind::CatSum).unwrap();
        assert_eq!(json, "cat-sum");
        let chart = serde_json::to_value(ChartSeries::empty()).unwrap();
        assert_eq!(chart, serde_json::json!({"kind": "empty", "series": []}));
    }

    // ── Category helpers ─────────────────────────────────────────

    #[test]
    fn count_keeps_first_seen_order_on_ties() {
        let series = count_by_category(&["c", "b", "a", "b", "c"], 12);
        let names: Vec<&str> = series.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["c", "b", "a"]);
    }

    #[test]
    fn count_truncates_to_limit() {
        let labels: Vec<String> = (0..20).map(|i| format!("k{i}")).collect();
        assert_eq!(count_by_category(&labels, 12).len(), 12);
    }

    #[test]
    fn aggregate_skips_non_numeric() {
        let cats = ["A", "B", "B", "C"];
        let vals = ["1", "x", "2,5", "n/a"];
        let series = aggregate_by_category(&cats, &vals, CoercionPolicy::RawFirst, 12);
        assert_eq!(
            series,
            vec![SeriesPoint::new("B", 2.5), SeriesPoint::new("A", 1.0)]
        );
    }

    // ── Histogram ────────────────────────────────────────────────

    #[test]
    fn histogram_single_value() {
        let series = histogram(&[3.0, 3.0, 3.0], 8, CoercionPolicy::RawFirst);
        assert_eq!(series, vec![SeriesPoint::new("3", 3.0)]);
    }

    #[test]
    fn histogram_counts_each_value_once() {
        let data: Vec<f64> = (0..=8).map(f64::from).collect();
        let series = histogram(&data, 8, CoercionPolicy::RawFirst);
        let counts: Vec<f64> = series.iter().map(|p| p.value).collect();
        assert_eq!(counts, vec![1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 2.0]);
        assert_eq!(series[7].name, "[7 – 8)");
    }

    #[test]
    fn histogram_labels_round() {
        let series = histogram(&[0.0, 1.0], 3, CoercionPolicy::RawFirst);
        assert_eq!(series[0].name, "[0 – 0.33)");
        assert_eq!(series[1].name, "[0.33 – 0.67)");
        assert_eq!(series[2].name, "[0.67 – 1)");
    }

    #[test]
    fn histogram_of_text_is_empty() {
        assert!(histogram(&["a", "b"], 8, CoercionPolicy::RawFirst).is_empty());
    }
}
