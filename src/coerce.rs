//! Numeric coercion of raw cell values.
//!
//! Spreadsheet cells arrive as numbers, strings in either decimal
//! convention (`"1.234,56"` or `"1234.56"`), or nulls. Coercion turns any of
//! them into a finite `f64` or `None`. It never fails and is deterministic
//! for a given [`CoercionPolicy`].
//!
//! # String handling
//!
//! After trimming, two readings of the text are tried:
//!
//! - **raw**: the text parsed as a plain `.`-decimal literal;
//! - **normalized**: every `.` stripped as a thousands separator and the
//!   first `,` turned into the decimal point.
//!
//! The policy decides which reading wins. As a last resort the longest
//! numeric prefix is taken (`"12 kg"` → `12`).
//!
//! ```
//! use u_tabstat::coerce::{coerce_str, CoercionPolicy};
//!
//! let p = CoercionPolicy::RawFirst;
//! assert_eq!(coerce_str("1234.5", p), Some(1234.5));
//! assert_eq!(coerce_str("1.234,5", p), Some(1234.5));
//! assert_eq!(coerce_str("3,14", p), Some(3.14));
//! assert_eq!(coerce_str("n/a", p), None);
//!
//! // Normalizing first reads "1234.5" as 12345.
//! assert_eq!(coerce_str("1234.5", CoercionPolicy::NormalizedFirst), Some(12345.0));
//! ```

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dataset::{format_number, Cell};

/// Order in which the raw and normalized readings of a string are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CoercionPolicy {
    /// Strict raw parse, then strict normalized parse, then raw prefix.
    ///
    /// Keeps `"1234.56"` intact while still reading `"1.234,56"` and `"3,5"`.
    #[default]
    RawFirst,
    /// Normalized prefix parse, then raw prefix parse.
    ///
    /// Always prefers the thousands-stripping reading, so `"1234.56"`
    /// becomes `123456`.
    NormalizedFirst,
}

/// Coerces a string under the given policy.
pub fn coerce_str(input: &str, policy: CoercionPolicy) -> Option<f64> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }
    match policy {
        CoercionPolicy::RawFirst => parse_strict(s)
            .or_else(|| parse_strict(&normalize(s)))
            .or_else(|| parse_prefix(s)),
        CoercionPolicy::NormalizedFirst => {
            parse_prefix(&normalize(s)).or_else(|| parse_prefix(s))
        }
    }
}

/// Coerces a cell with the default policy.
///
/// ```
/// use u_tabstat::coerce::coerce;
/// use u_tabstat::dataset::Cell;
///
/// assert_eq!(coerce(&Cell::Number(2.5)), Some(2.5));
/// assert_eq!(coerce(&Cell::from(" 7 ")), Some(7.0));
/// assert_eq!(coerce(&Cell::Null), None);
/// ```
pub fn coerce(cell: &Cell) -> Option<f64> {
    cell.to_number(CoercionPolicy::default())
}

/// Coerces every value, dropping the ones that are not numbers.
pub fn numeric_values<T: RawValue>(values: &[T], policy: CoercionPolicy) -> Vec<f64> {
    values.iter().filter_map(|v| v.to_number(policy)).collect()
}

/// Strips `.` thousands separators and turns the first `,` into a decimal point.
fn normalize(s: &str) -> String {
    s.replace('.', "").replacen(',', ".", 1)
}

fn parse_strict(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses the longest leading decimal literal: `[sign] digits [. digits] [e [sign] digits]`.
fn parse_prefix(s: &str) -> Option<f64> {
    let b = s.as_bytes();
    let mut i = 0;
    if i < b.len() && (b[i] == b'+' || b[i] == b'-') {
        i += 1;
    }
    let int_start = i;
    while i < b.len() && b[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;
    if i < b.len() && b[i] == b'.' {
        let mut j = i + 1;
        while j < b.len() && b[j].is_ascii_digit() {
            j += 1;
        }
        let frac = j - (i + 1);
        if digits + frac > 0 {
            digits += frac;
            i = j;
        }
    }
    if digits == 0 {
        return None;
    }
    if i < b.len() && (b[i] == b'e' || b[i] == b'E') {
        let mut j = i + 1;
        if j < b.len() && (b[j] == b'+' || b[j] == b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < b.len() && b[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }
    parse_strict(&s[..i])
}

// ── RawValue ──────────────────────────────────────────────────────────

/// Anything that can stand in for a raw cell: coercible to a number and
/// renderable as a category label.
///
/// Implemented for [`Cell`], plain numbers, strings, `Option`s of those,
/// and `serde_json::Value`, so statistics accept `&[Cell]`, `&[f64]` or
/// `&[&str]` alike.
pub trait RawValue {
    /// Numeric reading of the value, `None` when it is not a number.
    fn to_number(&self, policy: CoercionPolicy) -> Option<f64>;

    /// Category label of the value, `None` for null.
    fn to_label(&self) -> Option<Cow<'_, str>>;
}

impl RawValue for Cell {
    fn to_number(&self, policy: CoercionPolicy) -> Option<f64> {
        match self {
            Cell::Number(v) => v.is_finite().then_some(*v),
            Cell::Text(s) => coerce_str(s, policy),
            Cell::Null => None,
        }
    }

    fn to_label(&self) -> Option<Cow<'_, str>> {
        self.label()
    }
}

impl RawValue for f64 {
    fn to_number(&self, _policy: CoercionPolicy) -> Option<f64> {
        self.is_finite().then_some(*self)
    }

    fn to_label(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Owned(format_number(*self)))
    }
}

impl RawValue for i64 {
    fn to_number(&self, _policy: CoercionPolicy) -> Option<f64> {
        Some(*self as f64)
    }

    fn to_label(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Owned(self.to_string()))
    }
}

impl RawValue for i32 {
    fn to_number(&self, _policy: CoercionPolicy) -> Option<f64> {
        Some(f64::from(*self))
    }

    fn to_label(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Owned(self.to_string()))
    }
}

impl RawValue for str {
    fn to_number(&self, policy: CoercionPolicy) -> Option<f64> {
        coerce_str(self, policy)
    }

    fn to_label(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(self))
    }
}

impl RawValue for String {
    fn to_number(&self, policy: CoercionPolicy) -> Option<f64> {
        coerce_str(self, policy)
    }

    fn to_label(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(self.as_str()))
    }
}

impl RawValue for Value {
    fn to_number(&self, policy: CoercionPolicy) -> Option<f64> {
        match self {
            Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
            Value::String(s) => coerce_str(s, policy),
            _ => None,
        }
    }

    fn to_label(&self) -> Option<Cow<'_, str>> {
        match self {
            Value::Null => None,
            Value::String(s) => Some(Cow::Borrowed(s.as_str())),
            Value::Number(n) => Some(Cow::Owned(
                n.as_f64().map_or_else(|| n.to_string(), format_number),
            )),
            other => Some(Cow::Owned(other.to_string())),
        }
    }
}

impl<T: RawValue> RawValue for Option<T> {
    fn to_number(&self, policy: CoercionPolicy) -> Option<f64> {
        self.as_ref().and_then(|v| v.to_number(policy))
    }

    fn to_label(&self) -> Option<Cow<'_, str>> {
        self.as_ref().and_then(|v| v.to_label())
    }
}

impl<T: RawValue + ?Sized> RawValue for &T {
    fn to_number(&self, policy: CoercionPolicy) -> Option<f64> {
        (**self).to_number(policy)
    }

    fn to_label(&self) -> Option<Cow<'_, str>> {
        (**self).to_label()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────
