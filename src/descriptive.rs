//! Descriptive statistics over raw column values.
//!
//! Every function accepts a slice of raw values (anything implementing
//! [`RawValue`]), coerces them, and silently drops the ones that are not
//! numbers. When nothing usable remains the result is `None`, never zero
//! or NaN. Variance, standard deviation and coefficient of variation
//! additionally need at least two values.
//!
//! The kernels come from `u_numflow::stats`: compensated summation for the
//! mean, Welford's sample variance (denominator `n − 1`) and R-7 quantiles.
//! A percentile `p` in `[0, 100]` is the R-7 quantile at `p/100`, so for
//! `h = p/100 · (n−1)` the result lies between the `floor(h)`-th and the next
//! order statistic.
//!
//! Plain functions coerce with [`CoercionPolicy::default()`]. The grouped
//! results have `_with` variants taking a policy. For single statistics,
//! coerce first with [`numeric_values`] and pass the `f64` slice, which
//! reads the same under every policy.
//!
//! ```
//! use u_tabstat::descriptive::{mean, median, mode, percentile, variance};
//!
//! let data = ["2", "4", "4", "4", "5", "5", "7", "9"];
//! assert_eq!(mean(&data), Some(5.0));
//! assert_eq!(median(&data), Some(4.5));
//! assert_eq!(mode(&data), Some(vec![4.0]));
//! assert!((variance(&data).unwrap() - 32.0 / 7.0).abs() < 1e-12);
//! assert_eq!(percentile(&data, 0.0), Some(2.0));
//! assert_eq!(percentile(&data, 100.0), Some(9.0));
//! ```

use std::collections::HashMap;

use serde::{Serialize, Serializer};

use u_numflow::stats;

use crate::coerce::{numeric_values, CoercionPolicy, RawValue};

// ── Result types ──────────────────────────────────────────────────────

/// Mean, median and mode of a column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CentralTendency {
    pub mean: f64,
    pub median: f64,
    /// Most frequent values in ascending order; `None` when no value repeats.
    pub mode: Option<Vec<f64>>,
}

/// First, second and third quartile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Quartiles {
    pub q1: f64,
    pub q2: f64,
    pub q3: f64,
}

/// The 25th, 50th and 75th percentiles, as shown next to the quartiles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Percentiles {
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
}

/// Deciles D1 through D10 (percentiles 10, 20, …, 100).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Deciles {
    pub d1: f64,
    pub d2: f64,
    pub d3: f64,
    pub d4: f64,
    pub d5: f64,
    pub d6: f64,
    pub d7: f64,
    pub d8: f64,
    pub d9: f64,
    pub d10: f64,
}

impl Deciles {
    fn from_array(d: [f64; 10]) -> Self {
        Self {
            d1: d[0],
            d2: d[1],
            d3: d[2],
            d4: d[3],
            d5: d[4],
            d6: d[5],
            d7: d[6],
            d8: d[7],
            d9: d[8],
            d10: d[9],
        }
    }

    /// Returns the deciles in order, D1 first.
    pub fn to_array(&self) -> [f64; 10] {
        [
            self.d1, self.d2, self.d3, self.d4, self.d5, self.d6, self.d7, self.d8, self.d9,
            self.d10,
        ]
    }
}

/// Position measures: selected percentiles, quartiles and deciles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PositionMeasures {
    pub percentiles: Percentiles,
    pub quartiles: Quartiles,
    pub deciles: Deciles,
}

/// Spread of a column.
///
/// `range` needs one value; the other fields need two and are `None` otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dispersion {
    pub range: f64,
    pub variance: Option<f64>,
    pub standard_deviation: Option<f64>,
    /// Positive infinity when the mean is exactly zero.
    #[serde(serialize_with = "serialize_extended")]
    pub coefficient_of_variation: Option<f64>,
}

/// All descriptive statistics of a column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DescriptiveSummary {
    /// Number of values that coerced to numbers.
    pub count: usize,
    pub central: CentralTendency,
    pub position: PositionMeasures,
    pub dispersion: Dispersion,
}

/// Five-number summary with Tukey fences, as drawn by box plots.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxSummary {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    /// `q1 − 1.5·IQR`.
    pub lower_fence: f64,
    /// `q3 + 1.5·IQR`.
    pub upper_fence: f64,
    /// Smallest value inside the fences.
    pub lower_whisker: f64,
    /// Largest value inside the fences.
    pub upper_whisker: f64,
    /// Values outside the fences, ascending.
    pub outliers: Vec<f64>,
}

/// Writes infinities as `"Infinity"` / `"-Infinity"` so JSON keeps them apart from null.
fn serialize_extended<S: Serializer>(value: &Option<f64>, s: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) if v.is_infinite() => {
            s.serialize_str(if *v > 0.0 { "Infinity" } else { "-Infinity" })
        }
        Some(v) => s.serialize_f64(*v),
        None => s.serialize_none(),
    }
}

// ── Numeric kernels ───────────────────────────────────────────────────

fn sorted(xs: &[f64]) -> Vec<f64> {
    let mut s = xs.to_vec();
    s.sort_by(f64::total_cmp);
    s
}

fn mode_of(xs: &[f64]) -> Option<Vec<f64>> {
    let mut counts: HashMap<u64, usize> = HashMap::new();
    for &v in xs {
        // adding 0.0 folds -0 into +0
        *counts.entry((v + 0.0).to_bits()).or_insert(0) += 1;
    }
    let max = counts.values().copied().max()?;
    if max <= 1 {
        return None;
    }
    let mut modes: Vec<f64> = counts
        .into_iter()
        .filter(|&(_, c)| c == max)
        .map(|(bits, _)| f64::from_bits(bits))
        .collect();
    modes.sort_by(f64::total_cmp);
    Some(modes)
}

fn percentile_of_sorted(s: &[f64], p: f64) -> Option<f64> {
    if !(0.0..=100.0).contains(&p) {
        return None;
    }
    stats::quantile_sorted(s, p / 100.0)
}

fn cv_of(xs: &[f64]) -> Option<f64> {
    let sd = stats::std_dev(xs)?;
    let m = stats::mean(xs)?;
    if m == 0.0 {
        return Some(f64::INFINITY);
    }
    Some(sd / m.abs())
}

fn range_of(xs: &[f64]) -> Option<f64> {
    Some(stats::max(xs)? - stats::min(xs)?)
}

fn numbers<T: RawValue>(values: &[T]) -> Vec<f64> {
    numeric_values(values, CoercionPolicy::default())
}

// ── Central tendency ──────────────────────────────────────────────────

/// Arithmetic mean of the numeric values.
pub fn mean<T: RawValue>(values: &[T]) -> Option<f64> {
    stats::mean(&numbers(values))
}

/// Median: middle value, or the average of the two middle values.
pub fn median<T: RawValue>(values: &[T]) -> Option<f64> {
    stats::median(&numbers(values))
}

/// Values tied for the highest frequency, ascending.
///
/// Returns `None` when there are no values or no value occurs more than once.
///
/// ```
/// use u_tabstat::descriptive::mode;
///
/// assert_eq!(mode(&[1.0, 1.0, 2.0, 2.0, 3.0]), Some(vec![1.0, 2.0]));
/// assert_eq!(mode(&[1.0, 2.0, 3.0]), None);
/// ```
pub fn mode<T: RawValue>(values: &[T]) -> Option<Vec<f64>> {
    mode_of(&numbers(values))
}

/// Mean, median and mode together; `None` when there are no numeric values.
pub fn central_tendency<T: RawValue>(values: &[T]) -> Option<CentralTendency> {
    central_tendency_with(values, CoercionPolicy::default())
}

/// [`central_tendency`] under an explicit coercion policy.
pub fn central_tendency_with<T: RawValue>(
    values: &[T],
    policy: CoercionPolicy,
) -> Option<CentralTendency> {
    central_of(&numeric_values(values, policy))
}

fn central_of(xs: &[f64]) -> Option<CentralTendency> {
    Some(CentralTendency {
        mean: stats::mean(xs)?,
        median: stats::median(xs)?,
        mode: mode_of(xs),
    })
}

// ── Position ──────────────────────────────────────────────────────────

/// Interpolated `p`-th percentile, `p` in `[0, 100]`.
///
/// Returns `None` for empty input or `p` outside the range.
pub fn percentile<T: RawValue>(values: &[T], p: f64) -> Option<f64> {
    percentile_of_sorted(&sorted(&numbers(values)), p)
}

/// Percentiles 25, 50 and 75.
pub fn quartiles<T: RawValue>(values: &[T]) -> Option<Quartiles> {
    quartiles_of_sorted(&sorted(&numbers(values)))
}

fn quartiles_of_sorted(s: &[f64]) -> Option<Quartiles> {
    Some(Quartiles {
        q1: percentile_of_sorted(s, 25.0)?,
        q2: percentile_of_sorted(s, 50.0)?,
        q3: percentile_of_sorted(s, 75.0)?,
    })
}

/// Percentiles 10, 20, …, 100.
pub fn deciles<T: RawValue>(values: &[T]) -> Option<Deciles> {
    deciles_of_sorted(&sorted(&numbers(values)))
}

fn deciles_of_sorted(s: &[f64]) -> Option<Deciles> {
    let mut d = [0.0; 10];
    for (i, slot) in d.iter_mut().enumerate() {
        *slot = percentile_of_sorted(s, (i + 1) as f64 * 10.0)?;
    }
    Some(Deciles::from_array(d))
}

/// Percentiles, quartiles and deciles together.
pub fn position<T: RawValue>(values: &[T]) -> Option<PositionMeasures> {
    position_with(values, CoercionPolicy::default())
}

/// [`position`] under an explicit coercion policy.
pub fn position_with<T: RawValue>(values: &[T], policy: CoercionPolicy) -> Option<PositionMeasures> {
    position_of_sorted(&sorted(&numeric_values(values, policy)))
}

fn position_of_sorted(s: &[f64]) -> Option<PositionMeasures> {
    Some(PositionMeasures {
        percentiles: Percentiles {
            p25: percentile_of_sorted(s, 25.0)?,
            p50: percentile_of_sorted(s, 50.0)?,
            p75: percentile_of_sorted(s, 75.0)?,
        },
        quartiles: quartiles_of_sorted(s)?,
        deciles: deciles_of_sorted(s)?,
    })
}

// ── Dispersion ────────────────────────────────────────────────────────

/// Maximum minus minimum.
pub fn range<T: RawValue>(values: &[T]) -> Option<f64> {
    range_of(&numbers(values))
}

/// Sample variance (denominator `n − 1`); needs two values.
pub fn variance<T: RawValue>(values: &[T]) -> Option<f64> {
    stats::variance(&numbers(values))
}

/// Square root of the sample variance.
pub fn standard_deviation<T: RawValue>(values: &[T]) -> Option<f64> {
    stats::std_dev(&numbers(values))
}

/// Standard deviation over the absolute mean.
///
/// A mean of exactly zero yields positive infinity.
///
/// ```
/// use u_tabstat::descriptive::coefficient_of_variation;
///
/// assert_eq!(coefficient_of_variation(&[-1.0, 1.0]), Some(f64::INFINITY));
/// assert_eq!(coefficient_of_variation(&[5.0]), None);
/// ```
pub fn coefficient_of_variation<T: RawValue>(values: &[T]) -> Option<f64> {
    cv_of(&numbers(values))
}

/// Range, variance, standard deviation and coefficient of variation.
pub fn dispersion<T: RawValue>(values: &[T]) -> Option<Dispersion> {
    dispersion_with(values, CoercionPolicy::default())
}

/// [`dispersion`] under an explicit coercion policy.
pub fn dispersion_with<T: RawValue>(values: &[T], policy: CoercionPolicy) -> Option<Dispersion> {
    dispersion_of(&numeric_values(values, policy))
}

fn dispersion_of(xs: &[f64]) -> Option<Dispersion> {
    let variance = stats::variance(xs);
    Some(Dispersion {
        range: range_of(xs)?,
        variance,
        standard_deviation: variance.map(f64::sqrt),
        coefficient_of_variation: cv_of(xs),
    })
}

// ── Summaries ─────────────────────────────────────────────────────────

/// Computes every statistic at once with the default coercion policy.
pub fn describe<T: RawValue>(values: &[T]) -> Option<DescriptiveSummary> {
    describe_with(values, CoercionPolicy::default())
}

/// Computes every statistic at once.
///
/// ```
/// use u_tabstat::coerce::CoercionPolicy;
/// use u_tabstat::descriptive::describe_with;
///
/// let s = describe_with(&["10", "n/a", "20"], CoercionPolicy::RawFirst).unwrap();
/// assert_eq!(s.count, 2);
/// assert_eq!(s.central.mean, 15.0);
/// assert_eq!(s.dispersion.range, 10.0);
/// ```
pub fn describe_with<T: RawValue>(values: &[T], policy: CoercionPolicy) -> Option<DescriptiveSummary> {
    let xs = numeric_values(values, policy);
    let s = sorted(&xs);
    Some(DescriptiveSummary {
        count: xs.len(),
        central: central_of(&xs)?,
        position: position_of_sorted(&s)?,
        dispersion: dispersion_of(&xs)?,
    })
}

/// Box-plot summary using Tukey fences at 1.5·IQR.
pub fn box_summary<T: RawValue>(values: &[T]) -> Option<BoxSummary> {
    box_summary_with(values, CoercionPolicy::default())
}

/// [`box_summary`] under an explicit coercion policy.
///
/// ```
/// use u_tabstat::coerce::CoercionPolicy;
/// use u_tabstat::descriptive::box_summary_with;
///
/// let b = box_summary_with(&["1.5", "2.5", "3.5"], CoercionPolicy::NormalizedFirst).unwrap();
/// assert_eq!(b.median, 25.0);
/// ```
pub fn box_summary_with<T: RawValue>(values: &[T], policy: CoercionPolicy) -> Option<BoxSummary> {
    let s = sorted(&numeric_values(values, policy));
    let q = quartiles_of_sorted(&s)?;
    let iqr = q.q3 - q.q1;
    let lower_fence = q.q1 - 1.5 * iqr;
    let upper_fence = q.q3 + 1.5 * iqr;

    let inside = |v: &&f64| **v >= lower_fence && **v <= upper_fence;
    let lower_whisker = s.iter().find(inside).copied().unwrap_or(q.q1);
    let upper_whisker = s.iter().rev().find(inside).copied().unwrap_or(q.q3);
    let outliers = s
        .iter()
        .copied()
        .filter(|v| *v < lower_fence || *v > upper_fence)
        .collect();

    Some(BoxSummary {
        min: s[0],
        q1: q.q1,
        median: q.q2,
        q3: q.q3,
        max: s[s.len() - 1],
        lower_fence,
        upper_fence,
        lower_whisker,
        upper_whisker,
        outliers,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────
