//! Two-variable and multi-series chart data.
//!
//! Every builder here picks its columns from the classifier's roles the
//! same way [`build_series`](crate::series::build_series) does. A requested
//! (selected) numeric column takes precedence; otherwise the first numeric
//! column in dataset order is used. Builders return `None` when there is
//! nothing to draw.

use serde::Serialize;
use tracing::debug;
use u_numflow::stats;

use crate::classify::{classify_columns_with, is_fully_numeric, ColumnRoles};
use crate::coerce::{numeric_values, CoercionPolicy, RawValue};
use crate::config::AnalysisConfig;
use crate::dataset::{format_number, Cell, Dataset};
use crate::error::TabStatError;
use crate::series::{bucket_label, category_label};

/// An (x, y) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
}

// ── Shared helpers ────────────────────────────────────────────────────

fn first_categorical(roles: &ColumnRoles) -> Option<&str> {
    roles.categorical_keys().next()
}

/// Selected column when numeric, else the first numeric column.
fn primary_numeric<'a>(roles: &'a ColumnRoles, selected: Option<&str>) -> Option<&'a str> {
    match selected {
        Some(s) if roles.is_numeric(s) => roles.numeric_keys().find(|k| *k == s),
        _ => roles.numeric_keys().next(),
    }
}

fn secondary_numeric<'a>(roles: &'a ColumnRoles, primary: &str) -> Option<&'a str> {
    roles.numeric_keys().find(|k| *k != primary)
}

fn label_of(dataset: &Dataset, key: &str) -> String {
    dataset.display_name(key).unwrap_or(key).to_string()
}

fn column<'a>(dataset: &'a Dataset, key: &str) -> Result<&'a [Cell], TabStatError> {
    dataset.column(key).ok_or_else(|| TabStatError::ColumnNotFound {
        key: key.to_string(),
    })
}

// ── Scatter ───────────────────────────────────────────────────────────

/// Scatter-plot points with their axis labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScatterSeries {
    /// X column key, `None` when x is the 1-based row index.
    pub x_column: Option<String>,
    pub y_column: String,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<ScatterPoint>,
}

/// Label of the x axis when points are plotted against the row index.
pub const INDEX_LABEL: &str = "Index";

/// Scatter points with default settings.
pub fn scatter(dataset: &Dataset, selected: Option<&str>) -> Option<ScatterSeries> {
    scatter_with(dataset, selected, &AnalysisConfig::default())
}

/// Scatter points.
///
/// Y is the selected numeric column (or the first numeric column); X is the
/// next numeric column, or the 1-based row index when there is none. Rows
/// where either coordinate is not a number are dropped.
///
/// ```
/// use u_tabstat::composite::scatter;
/// use u_tabstat::dataset::Dataset;
///
/// let mut ds = Dataset::with_keys(&["h", "w"]).unwrap();
/// ds.push_row(vec!["170".into(), "65".into()]).unwrap();
/// ds.push_row(vec!["180".into(), "x".into()]).unwrap();
/// ds.push_row(vec!["160".into(), "55".into()]).unwrap();
///
/// let s = scatter(&ds, Some("w")).unwrap();
/// assert_eq!(s.x_column.as_deref(), Some("h"));
/// assert_eq!(s.points.len(), 2);
/// assert_eq!((s.points[0].x, s.points[0].y), (170.0, 65.0));
/// ```
pub fn scatter_with(
    dataset: &Dataset,
    selected: Option<&str>,
    config: &AnalysisConfig,
) -> Option<ScatterSeries> {
    if dataset.is_empty() {
        return None;
    }
    let roles = classify_columns_with(dataset, config);
    let y_key = primary_numeric(&roles, selected)?;
    let x_key = secondary_numeric(&roles, y_key);
    let ys = dataset.column(y_key)?;
    let policy = config.coercion;

    let points: Vec<ScatterPoint> = match x_key.and_then(|k| dataset.column(k)) {
        Some(xs) => xs
            .iter()
            .zip(ys)
            .filter_map(|(x, y)| {
                Some(ScatterPoint {
                    x: x.to_number(policy)?,
                    y: y.to_number(policy)?,
                })
            })
            .collect(),
        None => ys
            .iter()
            .enumerate()
            .filter_map(|(i, y)| {
                Some(ScatterPoint {
                    x: (i + 1) as f64,
                    y: y.to_number(policy)?,
                })
            })
            .collect(),
    };
    if points.is_empty() {
        return None;
    }
    debug!(x = ?x_key, y = y_key, points = points.len(), "built scatter");

    Some(ScatterSeries {
        x_column: x_key.map(str::to_string),
        y_column: y_key.to_string(),
        x_label: x_key.map_or_else(|| INDEX_LABEL.to_string(), |k| label_of(dataset, k)),
        y_label: label_of(dataset, y_key),
        points,
    })
}

// ── Mixed bar + line ──────────────────────────────────────────────────

/// One x position of a bar + line chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MixedRow {
    pub name: String,
    pub bar: f64,
    pub line: f64,
}

/// Bar + line chart data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MixedSeries {
    pub bar_column: String,
    /// Equal to `bar_column` when only one numeric column exists.
    pub line_column: String,
    pub category_column: Option<String>,
    pub rows: Vec<MixedRow>,
}

/// Bar + line data with default settings.
pub fn mixed(dataset: &Dataset, selected: Option<&str>) -> Option<MixedSeries> {
    mixed_with(dataset, selected, &AnalysisConfig::default())
}

/// Bar + line data.
///
/// With a categorical column, rows are per-category sums sorted by the bar
/// value, at most `max_categories`. Without one there is a row `#i` per
/// dataset row, where non-numeric cells plot as 0.
pub fn mixed_with(
    dataset: &Dataset,
    selected: Option<&str>,
    config: &AnalysisConfig,
) -> Option<MixedSeries> {
    if dataset.is_empty() {
        return None;
    }
    let roles = classify_columns_with(dataset, config);
    let bar_key = primary_numeric(&roles, selected)?;
    let line_key = secondary_numeric(&roles, bar_key).unwrap_or(bar_key);
    let bars = dataset.column(bar_key)?;
    let lines = dataset.column(line_key)?;
    let policy = config.coercion;
    let cat_key = first_categorical(&roles);

    let rows = match cat_key.and_then(|k| dataset.column(k)) {
        None => bars
            .iter()
            .zip(lines)
            .enumerate()
            .map(|(i, (b, l))| MixedRow {
                name: format!("#{}", i + 1),
                bar: b.to_number(policy).unwrap_or(0.0),
                line: l.to_number(policy).unwrap_or(0.0),
            })
            .collect(),
        Some(cats) => {
            let mut groups: Vec<MixedRow> = Vec::new();
            for ((c, b), l) in cats.iter().zip(bars).zip(lines) {
                let name = category_label(c);
                let idx = match groups.iter().position(|g| g.name == name) {
                    Some(i) => i,
                    None => {
                        groups.push(MixedRow {
                            name,
                            bar: 0.0,
                            line: 0.0,
                        });
                        groups.len() - 1
                    }
                };
                if let Some(v) = b.to_number(policy) {
                    groups[idx].bar += v;
                }
                if let Some(v) = l.to_number(policy) {
                    groups[idx].line += v;
                }
            }
            groups.sort_by(|a, b| b.bar.total_cmp(&a.bar));
            groups.truncate(config.max_categories);
            groups
        }
    };
    debug!(bar = bar_key, line = line_key, category = ?cat_key, "built mixed series");

    Some(MixedSeries {
        bar_column: bar_key.to_string(),
        line_column: line_key.to_string(),
        category_column: cat_key.map(str::to_string),
        rows,
    })
}

// ── Stacked ───────────────────────────────────────────────────────────

/// One stack: a label and one value per series column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackedRow {
    pub name: String,
    /// Aligned with [`StackedSeries::series_columns`].
    pub values: Vec<f64>,
}

impl StackedRow {
    /// Height of the whole stack.
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }
}

/// Stacked bar chart data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StackedSeries {
    pub series_columns: Vec<String>,
    /// `None` when rows are range buckets of the first series.
    pub category_column: Option<String>,
    pub rows: Vec<StackedRow>,
}

/// Stacked data with default settings.
pub fn stacked(dataset: &Dataset, selected: Option<&str>) -> Option<StackedSeries> {
    stacked_with(dataset, selected, &AnalysisConfig::default())
}

/// Stacked data.
///
/// Up to `stacked_series` numeric columns are stacked, the selected one
/// first. With a categorical column each row sums one category, sorted by
/// stack height and cut to `max_categories`. Without one, at least two
/// numeric columns are needed and rows are `stacked_bins` equal-width
/// ranges of the first series.
///
/// ```
/// use u_tabstat::composite::stacked;
/// use u_tabstat::dataset::Dataset;
///
/// let mut ds = Dataset::with_keys(&["team", "q1", "q2"]).unwrap();
/// ds.push_row(vec!["red".into(), 1.0.into(), 2.0.into()]).unwrap();
/// ds.push_row(vec!["blue".into(), 5.0.into(), 5.0.into()]).unwrap();
///
/// let s = stacked(&ds, Some("q2")).unwrap();
/// assert_eq!(s.series_columns, ["q2", "q1"]);
/// assert_eq!(s.rows[0].name, "blue");
/// assert_eq!(s.rows[0].values, [5.0, 5.0]);
/// ```
pub fn stacked_with(
    dataset: &Dataset,
    selected: Option<&str>,
    config: &AnalysisConfig,
) -> Option<StackedSeries> {
    if dataset.is_empty() {
        return None;
    }
    let roles = classify_columns_with(dataset, config);
    let numeric: Vec<&str> = roles.numeric_keys().collect();
    let cat_key = first_categorical(&roles);
    if cat_key.is_none() && numeric.len() < 2 {
        debug!("stacked series needs a category or two numeric columns");
        return None;
    }

    let mut chosen: Vec<&str> = Vec::with_capacity(config.stacked_series);
    if let Some(s) = selected.filter(|s| numeric.contains(s)) {
        chosen.push(s);
    }
    for k in &numeric {
        if chosen.len() >= config.stacked_series {
            break;
        }
        if !chosen.contains(k) {
            chosen.push(*k);
        }
    }
    chosen.truncate(config.stacked_series);
    if chosen.is_empty() {
        return None;
    }

    let series: Vec<&[Cell]> = chosen
        .iter()
        .map(|k| dataset.column(k))
        .collect::<Option<_>>()?;
    let policy = config.coercion;

    let rows = match cat_key.and_then(|k| dataset.column(k)) {
        Some(cats) => stack_by_category(cats, &series, policy, config.max_categories),
        None => stack_by_range(&series, policy, config.stacked_bins.max(1))?,
    };
    debug!(series = ?chosen, category = ?cat_key, rows = rows.len(), "built stacked series");

    Some(StackedSeries {
        series_columns: chosen.iter().map(|k| k.to_string()).collect(),
        category_column: cat_key.map(str::to_string),
        rows,
    })
}

fn stack_by_category(
    cats: &[Cell],
    series: &[&[Cell]],
    policy: CoercionPolicy,
    limit: usize,
) -> Vec<StackedRow> {
    let mut rows: Vec<StackedRow> = Vec::new();
    for (r, c) in cats.iter().enumerate() {
        let name = category_label(c);
        let idx = match rows.iter().position(|row| row.name == name) {
            Some(i) => i,
            None => {
                rows.push(StackedRow {
                    name,
                    values: vec![0.0; series.len()],
                });
                rows.len() - 1
            }
        };
        for (s, cells) in series.iter().enumerate() {
            if let Some(v) = cells.get(r).and_then(|cell| cell.to_number(policy)) {
                rows[idx].values[s] += v;
            }
        }
    }
    rows.sort_by(|a, b| b.total().total_cmp(&a.total()));
    rows.truncate(limit);
    rows
}

fn stack_by_range(series: &[&[Cell]], policy: CoercionPolicy, bins: usize) -> Option<Vec<StackedRow>> {
    let base: &[Cell] = series.first()?;
    let base_values = numeric_values(base, policy);
    if base_values.is_empty() {
        return None;
    }
    let min = base_values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = base_values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if min == max {
        let values = series
            .iter()
            .map(|cells| numeric_values(*cells, policy).iter().sum())
            .collect();
        return Some(vec![StackedRow {
            name: format_number(min),
            values,
        }]);
    }

    let width = (max - min) / bins as f64;
    let mut rows: Vec<StackedRow> = (0..bins)
        .map(|i| StackedRow {
            name: bucket_label(min + i as f64 * width, min + (i + 1) as f64 * width),
            values: vec![0.0; series.len()],
        })
        .collect();
    for (r, cell) in base.iter().enumerate() {
        let Some(v) = cell.to_number(policy) else {
            continue;
        };
        let idx = (((v - min) / width).floor() as usize).min(bins - 1);
        for (s, cells) in series.iter().enumerate() {
            if let Some(x) = cells.get(r).and_then(|c| c.to_number(policy)) {
                rows[idx].values[s] += x;
            }
        }
    }
    Some(rows)
}

// ── Regression ────────────────────────────────────────────────────────

/// Simple least-squares line `y = slope·x + intercept`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Regression {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination; 1 when y is constant.
    pub r_squared: f64,
    /// Number of (x, y) pairs used.
    pub n: usize,
    /// Observed x with the fitted y, in input order.
    pub fitted: Vec<ScatterPoint>,
}

impl Regression {
    /// Fitted value at `x`.
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Fits a line through the pairs where both values are numbers.
///
/// Returns `None` with fewer than two pairs or when every x is equal.
///
/// ```
/// use u_tabstat::coerce::CoercionPolicy;
/// use u_tabstat::composite::linear_regression;
///
/// let x = [1.0, 2.0, 3.0, 4.0];
/// let y = ["3", "5", "n/a", "9"];
/// let fit = linear_regression(&x, &y, CoercionPolicy::RawFirst).unwrap();
/// assert!((fit.slope - 2.0).abs() < 1e-12);
/// assert!((fit.intercept - 1.0).abs() < 1e-12);
/// assert_eq!(fit.n, 3);
/// ```
pub fn linear_regression<X: RawValue, Y: RawValue>(
    xs: &[X],
    ys: &[Y],
    policy: CoercionPolicy,
) -> Option<Regression> {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| Some((x.to_number(policy)?, y.to_number(policy)?)))
        .collect();
    let n = pairs.len();
    if n < 2 {
        return None;
    }
    let (px, py): (Vec<f64>, Vec<f64>) = pairs.iter().copied().unzip();
    let mean_x = stats::mean(&px)?;
    let mean_y = stats::mean(&py)?;

    let (mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0);
    for &(x, y) in &pairs {
        let (dx, dy) = (x - mean_x, y - mean_y);
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }
    if sxx == 0.0 {
        return None;
    }
    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;

    let ss_res: f64 = pairs
        .iter()
        .map(|&(x, y)| {
            let e = y - (slope * x + intercept);
            e * e
        })
        .sum();
    let r_squared = if syy == 0.0 { 1.0 } else { 1.0 - ss_res / syy };

    Some(Regression {
        slope,
        intercept,
        r_squared,
        n,
        fitted: pairs
            .iter()
            .map(|&(x, _)| ScatterPoint {
                x,
                y: slope * x + intercept,
            })
            .collect(),
    })
}

/// Fits `y_key` against `x_key`.
///
/// # Errors
///
/// [`TabStatError::ColumnNotFound`] when either key is unknown.
pub fn regression_for(
    dataset: &Dataset,
    x_key: &str,
    y_key: &str,
    config: &AnalysisConfig,
) -> Result<Option<Regression>, TabStatError> {
    let xs = column(dataset, x_key)?;
    let ys = column(dataset, y_key)?;
    let fit = linear_regression(xs, ys, config.coercion);
    debug!(x = x_key, y = y_key, fitted = fit.is_some(), "regression");
    Ok(fit)
}

// ── Heatmap ───────────────────────────────────────────────────────────

/// Values of every fully numeric column, one matrix row per column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

/// Heatmap matrix with default settings.
pub fn heatmap_matrix(dataset: &Dataset) -> Option<HeatmapMatrix> {
    heatmap_matrix_with(dataset, &AnalysisConfig::default())
}

/// Heatmap matrix over the columns whose cells all coerce.
///
/// Returns `None` when fewer than two such columns exist.
pub fn heatmap_matrix_with(dataset: &Dataset, config: &AnalysisConfig) -> Option<HeatmapMatrix> {
    let (columns, values): (Vec<String>, Vec<Vec<f64>>) = dataset
        .iter()
        .filter(|(_, cells)| is_fully_numeric(*cells, config.coercion))
        .map(|(def, cells)| (def.key.clone(), numeric_values(cells, config.coercion)))
        .unzip();
    if columns.len() < 2 {
        return None;
    }
    Some(HeatmapMatrix { columns, values })
}

// ── Tests ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(keys: &[&str], rows: Vec<Vec<Cell>>) -> Dataset {
        let mut ds = Dataset::with_keys(keys).unwrap();
        for r in rows {
            ds.push_row(r).unwrap();
        }
        ds
    }

    fn sales() -> Dataset {
        dataset(
            &["region", "units", "revenue"],
            vec![
                vec!["north".into(), 10.0.into(), 100.0.into()],
                vec!["south".into(), 4.0.into(), 60.0.into()],
                vec!["north".into(), 5.0.into(), 40.0.into()],
                vec![Cell::Null, 1.0.into(), "x".into()],
            ],
        )
    }

    // ── Scatter ──────────────────────────────────────────────────

    #[test]
    fn scatter_uses_selected_as_y() {
        let s = scatter(&sales(), Some("revenue")).unwrap();
        assert_eq!(s.y_column, "revenue");
        assert_eq!(s.x_column.as_deref(), Some("units"));
        // last row's revenue is not numeric
        assert_eq!(s.points.len(), 3);
    }

    #[test]
    fn scatter_falls_back_to_row_index() {
        let ds = dataset(
            &["name", "v"],
            vec![
                vec!["a".into(), "3".into()],
                vec!["b".into(), "?".into()],
                vec!["c".into(), "5".into()],
            ],
        );
        let s = scatter(&ds, Some("name")).unwrap();
        assert_eq!(s.y_column, "v");
        assert_eq!(s.x_column, None);
        assert_eq!(s.x_label, INDEX_LABEL);
        assert_eq!(
            s.points,
            vec![ScatterPoint { x: 1.0, y: 3.0 }, ScatterPoint { x: 3.0, y: 5.0 }]
        );
    }

    #[test]
    fn scatter_without_numeric_columns() {
        let ds = dataset(&["a"], vec![vec!["x".into()]]);
        assert_eq!(scatter(&ds, Some("a")), None);
    }

    // ── Mixed ────────────────────────────────────────────────────

    #[test]
    fn mixed_groups_by_category() {
        let m = mixed(&sales(), Some("revenue")).unwrap();
        assert_eq!(m.bar_column, "revenue");
        assert_eq!(m.line_column, "units");
        assert_eq!(m.category_column.as_deref(), Some("region"));
        assert_eq!(
            m.rows[0],
            MixedRow {
                name: "north".into(),
                bar: 140.0,
                line: 15.0
            }
        );
        assert_eq!(m.rows[1].name, "south");
        assert_eq!(m.rows[2].name, crate::dataset::EMPTY_LABEL);
        assert_eq!(m.rows[2].bar, 0.0);
    }

    #[test]
    fn mixed_without_category_indexes_rows() {
        let ds = dataset(
            &["a"],
            vec![vec![2.0.into()], vec!["bad".into()], vec![4.0.into()]],
        );
        let m = mixed(&ds, None).unwrap();
        assert_eq!(m.line_column, "a");
        let names: Vec<&str> = m.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["#1", "#2", "#3"]);
        assert_eq!(m.rows[1].bar, 0.0);
    }

    // ── Stacked ──────────────────────────────────────────────────

    #[test]
    fn stacked_by_category_sorted_by_total() {
        let s = stacked(&sales(), None).unwrap();
        assert_eq!(s.series_columns, ["units", "revenue"]);
        assert_eq!(s.rows[0].name, "north");
        assert_eq!(s.rows[0].values, [15.0, 140.0]);
        assert_eq!(s.rows[0].total(), 155.0);
    }

    #[test]
    fn stacked_by_range_without_category() {
        let rows = (0..12)
            .map(|i| vec![Cell::Number(i as f64), Cell::Number(1.0)])
            .collect();
        let ds = dataset(&["a", "b"], rows);
        let s = stacked(&ds, None).unwrap();
        assert_eq!(s.category_column, None);
        assert_eq!(s.rows.len(), 6);
        let ones: f64 = s.rows.iter().map(|r| r.values[1]).sum();
        assert_eq!(ones, 12.0);
        assert_eq!(s.rows[0].name, "[0 – 1.83)");
    }

    #[test]
    fn stacked_single_value_range() {
        let ds = dataset(
            &["a", "b"],
            vec![vec![2.0.into(), 1.0.into()], vec![2.0.into(), 3.0.into()]],
        );
        let s = stacked(&ds, None).unwrap();
        assert_eq!(s.rows.len(), 1);
        assert_eq!(s.rows[0].name, "2");
        assert_eq!(s.rows[0].values, [4.0, 4.0]);
    }

    #[test]
    fn stacked_needs_two_numeric_without_category() {
        let ds = dataset(&["a"], vec![vec![1.0.into()], vec![2.0.into()]]);
        assert_eq!(stacked(&ds, Some("a")), None);
    }

    #[test]
    fn stacked_caps_series_count() {
        let ds = dataset(
            &["a", "b", "c", "d"],
            vec![vec![1.0.into(), 2.0.into(), 3.0.into(), 4.0.into()]],
        );
        let s = stacked(&ds, Some("d")).unwrap();
        assert_eq!(s.series_columns, ["d", "a", "b"]);
    }

    // ── Regression ───────────────────────────────────────────────

    #[test]
    fn regression_perfect_line() {
        let x = [0.0, 1.0, 2.0];
        let y = [1.0, 3.0, 5.0];
        let fit = linear_regression(&x, &y, CoercionPolicy::RawFirst).unwrap();
        assert!((fit.slope - 2.0).abs() < 1e-12);
        assert!((fit.r_squared - 1.0).abs() < 1e-12);
        assert!((fit.predict(10.0) - 21.0).abs() < 1e-12);
        assert_eq!(fit.fitted.len(), 3);
    }

    #[test]
    fn regression_noisy_r_squared_below_one() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [2.0, 4.5, 5.5, 8.5, 9.0];
        let fit = linear_regression(&x, &y, CoercionPolicy::RawFirst).unwrap();
        assert!(fit.r_squared > 0.9 && fit.r_squared < 1.0);
    }

    #[test]
    fn regression_degenerate_inputs() {
        let p = CoercionPolicy::RawFirst;
        assert!(linear_regression(&[1.0], &[2.0], p).is_none());
        assert!(linear_regression(&[3.0, 3.0], &[1.0, 2.0], p).is_none());
        assert!(linear_regression(&["a", "b"], &[1.0, 2.0], p).is_none());
    }

    #[test]
    fn regression_for_unknown_column() {
        let err = regression_for(&sales(), "nope", "units", &AnalysisConfig::default());
        assert_eq!(
            err,
            Err(TabStatError::ColumnNotFound { key: "nope".into() })
        );
        let ok = regression_for(&sales(), "units", "revenue", &AnalysisConfig::default());
        assert_eq!(ok.unwrap().unwrap().n, 3);
    }

    // ── Heatmap ──────────────────────────────────────────────────

    #[test]
    fn heatmap_keeps_fully_numeric_columns() {
        let h = heatmap_matrix(&dataset(
            &["a", "b", "c"],
            vec![
                vec![1.0.into(), "x".into(), "2".into()],
                vec![3.0.into(), 1.0.into(), "4,5".into()],
            ],
        ))
        .unwrap();
        assert_eq!(h.columns, ["a", "c"]);
        assert_eq!(h.values, vec![vec![1.0, 3.0], vec![2.0, 4.5]]);
    }

    #[test]
    fn heatmap_needs_two_columns() {
        let ds = dataset(&["a", "b"], vec![vec![1.0.into(), "x".into()]]);
        assert_eq!(heatmap_matrix(&ds), None);
    }
}
