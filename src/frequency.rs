//! Frequency distribution tables.
//!
//! - **Ungrouped**: one row per distinct stringified value, sorted in
//!   natural order (`"2"` before `"10"`).
//! - **Grouped**: numeric values split into Sturges' `k = ⌈1 + 3.322·log₁₀ n⌉`
//!   contiguous classes of equal width; the last class ends exactly at the
//!   maximum.
//!
//! Cumulative columns accumulate unrounded frequencies. Relative
//! frequencies are rounded to four decimals only when a row is emitted.
//!
//! ```
//! use u_tabstat::frequency::{grouped_table, ungrouped_table};
//!
//! let rows = ungrouped_table(&["b", "a", "b", "10", "2"]);
//! let values: Vec<&str> = rows.iter().map(|r| r.value.as_str()).collect();
//! assert_eq!(values, ["2", "10", "a", "b"]);
//! assert_eq!(rows.last().unwrap().cumulative_frequency, 5);
//!
//! let classes = grouped_table(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]).unwrap();
//! assert_eq!(classes.len(), 5);
//! assert_eq!(classes.last().unwrap().upper, 8.0);
//! ```

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::classify::is_fully_numeric;
use crate::coerce::{numeric_values, RawValue};
use crate::config::{AnalysisConfig, BoundaryMode};
use crate::dataset::EMPTY_LABEL;

/// One row of an ungrouped frequency table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UngroupedRow {
    pub value: String,
    pub absolute_frequency: usize,
    pub relative_frequency: f64,
    pub cumulative_frequency: usize,
    pub cumulative_relative_frequency: f64,
}

/// One class of a grouped frequency table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupedRow {
    /// `[lower - upper]` with two fixed decimals.
    pub interval: String,
    pub lower: f64,
    pub upper: f64,
    /// Midpoint of the class, rounded to two decimals.
    pub class_mark: f64,
    pub absolute_frequency: usize,
    pub relative_frequency: f64,
    pub cumulative_frequency: usize,
    pub cumulative_relative_frequency: f64,
}

pub(crate) fn round_to(v: f64, decimals: i32) -> f64 {
    let f = 10f64.powi(decimals);
    (v * f).round() / f
}

// ── Ungrouped ─────────────────────────────────────────────────────────

/// Builds the ungrouped table of a value sequence.
///
/// Values are keyed by their text form; nulls become `"(empty)"` while
/// empty strings stay as they are. Empty input gives an empty table.
pub fn ungrouped_table<T: RawValue>(values: &[T]) -> Vec<UngroupedRow> {
    if values.is_empty() {
        return Vec::new();
    }
    let n = values.len() as f64;

    let mut counts: HashMap<String, usize> = HashMap::new();
    for v in values {
        let key = v
            .to_label()
            .map(|l| l.into_owned())
            .unwrap_or_else(|| EMPTY_LABEL.to_string());
        *counts.entry(key).or_insert(0) += 1;
    }

    let mut distinct: Vec<(String, usize)> = counts.into_iter().collect();
    distinct.sort_by(|a, b| natural_cmp(&a.0, &b.0));

    let mut cum_count = 0usize;
    let mut cum_rel = 0.0f64;
    distinct
        .into_iter()
        .map(|(value, count)| {
            let rel = count as f64 / n;
            cum_count += count;
            cum_rel += rel;
            UngroupedRow {
                value,
                absolute_frequency: count,
                relative_frequency: round_to(rel, 4),
                cumulative_frequency: cum_count,
                cumulative_relative_frequency: round_to(cum_rel, 4),
            }
        })
        .collect()
}

// ── Natural ordering ──────────────────────────────────────────────────

#[derive(PartialEq, Eq, PartialOrd, Ord)]
enum CharClass {
    Symbol,
    Digit,
    Letter,
}

fn char_class(c: char) -> CharClass {
    if c.is_ascii_digit() {
        CharClass::Digit
    } else if c.is_alphabetic() {
        CharClass::Letter
    } else {
        CharClass::Symbol
    }
}

fn digit_run<'a>(s: &'a str) -> (&'a str, &'a str) {
    let end = s
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(s.len(), |(i, _)| i);
    s.split_at(end)
}

fn cmp_digit_runs(a: &str, b: &str) -> Ordering {
    let ta = a.trim_start_matches('0');
    let tb = b.trim_start_matches('0');
    ta.len()
        .cmp(&tb.len())
        .then_with(|| ta.cmp(tb))
        .then_with(|| a.len().cmp(&b.len()))
}

/// Natural string order: digit runs compare by numeric value, letters
/// compare case-insensitively, and symbols sort before digits, which sort
/// before letters. Case only breaks otherwise complete ties.
///
/// ```
/// use std::cmp::Ordering;
/// use u_tabstat::frequency::natural_cmp;
///
/// assert_eq!(natural_cmp("item2", "item10"), Ordering::Less);
/// assert_eq!(natural_cmp("B", "a"), Ordering::Greater);
/// assert_eq!(natural_cmp("007", "7"), Ordering::Greater);
/// ```
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (mut ra, mut rb) = (a, b);
    loop {
        let (ca, cb) = match (ra.chars().next(), rb.chars().next()) {
            (None, None) => break,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => (x, y),
        };
        let (ka, kb) = (char_class(ca), char_class(cb));
        if ka != kb {
            return ka.cmp(&kb);
        }
        if ka == CharClass::Digit {
            let (da, rest_a) = digit_run(ra);
            let (db, rest_b) = digit_run(rb);
            match cmp_digit_runs(da, db) {
                Ordering::Equal => {}
                other => return other,
            }
            ra = rest_a;
            rb = rest_b;
            continue;
        }
        let la = ca.to_lowercase();
        let lb = cb.to_lowercase();
        match la.cmp(lb) {
            Ordering::Equal => {}
            other => return other,
        }
        ra = &ra[ca.len_utf8()..];
        rb = &rb[cb.len_utf8()..];
    }
    // case-insensitively equal: lowercase sorts first
    b.cmp(a)
}

// ── Grouped ───────────────────────────────────────────────────────────

/// Sturges' class count `⌈1 + 3.322·log₁₀ n⌉`; zero for empty input.
///
/// ```
/// use u_tabstat::frequency::sturges_classes;
///
/// assert_eq!(sturges_classes(8), 5);
/// assert_eq!(sturges_classes(100), 8);
/// ```
pub fn sturges_classes(n: usize) -> usize {
    if n == 0 {
        return 0;
    }
    (1.0 + 3.322 * (n as f64).log10()).ceil() as usize
}

/// Equal-width contiguous class bounds over `[min, max]`.
///
/// Each class starts where the previous ended and the last class ends at
/// exactly `max`.
pub(crate) fn class_bounds(min: f64, max: f64, classes: usize) -> Vec<(f64, f64)> {
    let width = (max - min) / classes as f64;
    let mut bounds = Vec::with_capacity(classes);
    let mut start = min;
    for i in 0..classes {
        let end = if i + 1 == classes {
            max
        } else {
            min + (i + 1) as f64 * width
        };
        bounds.push((start, end));
        start = end;
    }
    bounds
}

/// Builds the grouped table with default settings.
pub fn grouped_table<T: RawValue>(values: &[T]) -> Option<Vec<GroupedRow>> {
    grouped_table_with(values, &AnalysisConfig::default())
}

/// Builds the grouped table.
///
/// Returns `None` unless every value coerces to a number, there are at
/// least two values, and the range is non-zero. With
/// [`BoundaryMode::Inclusive`] a value on a shared boundary is counted in
/// both classes, so frequencies may sum to more than `n`.
pub fn grouped_table_with<T: RawValue>(
    values: &[T],
    config: &AnalysisConfig,
) -> Option<Vec<GroupedRow>> {
    if !is_fully_numeric(values, config.coercion) {
        debug!(len = values.len(), "grouped table skipped: not fully numeric");
        return None;
    }
    let mut xs = numeric_values(values, config.coercion);
    xs.sort_by(f64::total_cmp);
    let n = xs.len();
    let (min, max) = (xs[0], xs[n - 1]);
    if n < 2 || max - min == 0.0 {
        debug!(n, "grouped table skipped: no spread");
        return None;
    }

    let k = sturges_classes(n);
    let bounds = class_bounds(min, max, k);
    let last = bounds.len() - 1;

    let mut cum_count = 0usize;
    let mut cum_rel = 0.0f64;
    let rows = bounds
        .into_iter()
        .enumerate()
        .map(|(i, (lower, upper))| {
            let count = xs
                .iter()
                .filter(|&&v| match config.boundary {
                    BoundaryMode::Inclusive => v >= lower && v <= upper,
                    BoundaryMode::HalfOpen if i == last => v >= lower && v <= upper,
                    BoundaryMode::HalfOpen => v >= lower && v < upper,
                })
                .count();
            let rel = count as f64 / n as f64;
            cum_count += count;
            cum_rel += rel;
            GroupedRow {
                interval: format!("[{lower:.2} - {upper:.2}]"),
                lower,
                upper,
                class_mark: round_to((lower + upper) / 2.0, 2),
                absolute_frequency: count,
                relative_frequency: round_to(rel, 4),
                cumulative_frequency: cum_count,
                cumulative_relative_frequency: round_to(cum_rel, 4),
            }
        })
        .collect();
    debug!(n, classes = k, "built grouped table");
    Some(rows)
}

// ── Tests ─────────────────────────────────────────────────────────────
