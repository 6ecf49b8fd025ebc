//! Column-major dataset of raw, loosely-typed cells.
//!
//! A [`Dataset`] is what the ingestion side hands over: an ordered list of
//! rows, each total over the declared columns, where a cell is a number, a
//! string, or null. No type is imposed at load time. Whether a column is
//! numeric is decided later by [`classify`](crate::classify), and it is
//! re-decided after every edit.
//!
//! # Example
//!
//! ```
//! use u_tabstat::dataset::{Cell, Dataset};
//!
//! let mut ds = Dataset::with_keys(&["city", "sales"]).unwrap();
//! ds.push_row(vec!["Lima".into(), "1.200,50".into()]).unwrap();
//! ds.push_row(vec!["Quito".into(), Cell::Number(980.0)]).unwrap();
//! assert_eq!(ds.row_count(), 2);
//! assert_eq!(ds.column_count(), 2);
//! assert_eq!(ds.cell(1, "sales"), Some(&Cell::Number(980.0)));
//! ```

use std::borrow::Cow;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::TabStatError;

/// Label used for null cells when values are grouped into categories.
pub const EMPTY_LABEL: &str = "(empty)";

// ── Cell ──────────────────────────────────────────────────────────────

/// A raw cell value as supplied by the ingestion side.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    /// Numeric cell, stored as read (may be non-finite).
    Number(f64),
    /// Any textual cell, including numbers formatted as text.
    Text(String),
    /// Missing cell (null or undefined on the ingestion side).
    Null,
}

impl Cell {
    /// Returns `true` for a missing cell.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the cell rendered as a category label, or `None` when null.
    ///
    /// Numbers use their shortest round-trip form, so `3.0` renders as `"3"`.
    pub fn label(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Number(v) => Some(Cow::Owned(format_number(*v))),
            Self::Text(s) => Some(Cow::Borrowed(s.as_str())),
            Self::Null => None,
        }
    }
}

/// Formats a number the way it is shown as a category label.
pub(crate) fn format_number(v: f64) -> String {
    if v == 0.0 {
        // folds -0 into 0
        "0".to_string()
    } else {
        v.to_string()
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<i64> for Cell {
    fn from(v: i64) -> Self {
        Self::Number(v as f64)
    }
}

impl From<i32> for Cell {
    fn from(v: i32) -> Self {
        Self::Number(f64::from(v))
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl From<&Value> for Cell {
    fn from(v: &Value) -> Self {
        match v {
            Value::Null => Self::Null,
            Value::Number(n) => n.as_f64().map_or(Self::Null, Self::Number),
            Value::String(s) => Self::Text(s.clone()),
            Value::Bool(b) => Self::Text(b.to_string()),
            other => Self::Text(other.to_string()),
        }
    }
}

// ── ColumnDef ─────────────────────────────────────────────────────────

/// A column identifier plus its display name.
///
/// Only `key` takes part in computation; `name` is carried for renderers
/// and exporters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub key: String,
    #[serde(default)]
    pub name: String,
}

impl ColumnDef {
    /// Creates a column definition with an explicit display name.
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
        }
    }

    /// Creates a column whose display name equals its key.
    pub fn keyed(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            name: key.clone(),
            key,
        }
    }
}

// ── Dataset ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct DatasetJson {
    columns: Vec<ColumnDef>,
    #[serde(default)]
    rows: Vec<Map<String, Value>>,
}

/// Rectangular dataset stored column by column.
///
/// Every column holds exactly [`row_count`](Self::row_count) cells. Row
/// order is preserved; it only matters for index-based fallbacks such as
/// scatter-against-row-position.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<ColumnDef>,
    cells: Vec<Vec<Cell>>,
    row_count: usize,
}

impl Dataset {
    /// Creates an empty dataset with the given columns.
    ///
    /// Fails if two columns share a key.
    pub fn new(columns: Vec<ColumnDef>) -> Result<Self, TabStatError> {
        let mut seen = HashSet::with_capacity(columns.len());
        for col in &columns {
            if !seen.insert(col.key.as_str()) {
                return Err(TabStatError::DuplicateColumn {
                    key: col.key.clone(),
                });
            }
        }
        let cells = vec![Vec::new(); columns.len()];
        Ok(Self {
            columns,
            cells,
            row_count: 0,
        })
    }

    /// Creates an empty dataset whose display names equal the keys.
    pub fn with_keys(keys: &[&str]) -> Result<Self, TabStatError> {
        Self::new(keys.iter().map(|k| ColumnDef::keyed(*k)).collect())
    }

    /// Decodes a dataset from `{"columns": [...], "rows": [{...}, ...]}`.
    ///
    /// Columns without a `name` use their key. Absent row keys become
    /// null cells; keys not declared as columns are ignored.
    ///
    /// ```
    /// use u_tabstat::dataset::{Cell, Dataset};
    ///
    /// let json = r#"{
    ///     "columns": [{"key": "col0", "name": "Region"}, {"key": "col1"}],
    ///     "rows": [{"col0": "North", "col1": 12}, {"col0": null}]
    /// }"#;
    /// let ds = Dataset::from_json_str(json).unwrap();
    /// assert_eq!(ds.row_count(), 2);
    /// assert_eq!(ds.display_name("col0"), Some("Region"));
    /// assert_eq!(ds.cell(1, "col1"), Some(&Cell::Null));
    /// ```
    pub fn from_json_str(input: &str) -> Result<Self, TabStatError> {
        let raw: DatasetJson = serde_json::from_str(input)?;
        Self::from_parts(raw)
    }

    /// Decodes a dataset from an already-parsed JSON value.
    pub fn from_json_value(value: Value) -> Result<Self, TabStatError> {
        let raw: DatasetJson = serde_json::from_value(value)?;
        Self::from_parts(raw)
    }

    fn from_parts(raw: DatasetJson) -> Result<Self, TabStatError> {
        let columns = raw
            .columns
            .into_iter()
            .map(|mut c| {
                if c.name.is_empty() {
                    c.name = c.key.clone();
                }
                c
            })
            .collect();
        let mut ds = Self::new(columns)?;
        for row in &raw.rows {
            ds.push_record(row);
        }
        Ok(ds)
    }

    /// Encodes the dataset in the same shape [`from_json_str`](Self::from_json_str) reads.
    ///
    /// Export collaborators consume this unchanged.
    pub fn to_json_value(&self) -> Value {
        let columns: Vec<Value> = self
            .columns
            .iter()
            .map(|c| serde_json::json!({ "key": c.key, "name": c.name }))
            .collect();
        let rows: Vec<Value> = (0..self.row_count)
            .map(|r| {
                let mut obj = Map::with_capacity(self.columns.len());
                for (col, cells) in self.columns.iter().zip(&self.cells) {
                    let v = match &cells[r] {
                        Cell::Number(n) => serde_json::Number::from_f64(*n)
                            .map_or(Value::Null, Value::Number),
                        Cell::Text(s) => Value::String(s.clone()),
                        Cell::Null => Value::Null,
                    };
                    obj.insert(col.key.clone(), v);
                }
                Value::Object(obj)
            })
            .collect();
        serde_json::json!({ "columns": columns, "rows": rows })
    }

    /// Appends a row given positionally, one cell per column.
    pub fn push_row(&mut self, row: Vec<Cell>) -> Result<(), TabStatError> {
        if row.len() != self.columns.len() {
            return Err(TabStatError::DimensionMismatch {
                expected: self.columns.len(),
                actual: row.len(),
            });
        }
        for (col, cell) in self.cells.iter_mut().zip(row) {
            col.push(cell);
        }
        self.row_count += 1;
        Ok(())
    }

    /// Appends a row given as a key → JSON value mapping.
    pub fn push_record(&mut self, record: &Map<String, Value>) {
        for (def, col) in self.columns.iter().zip(self.cells.iter_mut()) {
            col.push(record.get(&def.key).map_or(Cell::Null, Cell::from));
        }
        self.row_count += 1;
    }

    /// Replaces one cell, returning the previous value.
    ///
    /// Any column classification computed before the edit is stale afterwards.
    pub fn set_cell(&mut self, row: usize, key: &str, cell: Cell) -> Result<Cell, TabStatError> {
        let idx = self.require_column(key)?;
        if row >= self.row_count {
            return Err(TabStatError::RowOutOfBounds {
                row,
                rows: self.row_count,
            });
        }
        Ok(std::mem::replace(&mut self.cells[idx][row], cell))
    }

    /// Returns the number of rows.
    #[inline]
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Returns the number of columns.
    #[inline]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` if there are no rows or no columns to analyze.
    pub fn is_empty(&self) -> bool {
        self.row_count == 0 || self.columns.is_empty()
    }

    /// Returns the column definitions in declaration order.
    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    /// Returns the index of the column with the given key.
    pub fn column_index(&self, key: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.key == key)
    }

    fn require_column(&self, key: &str) -> Result<usize, TabStatError> {
        self.column_index(key)
            .ok_or_else(|| TabStatError::ColumnNotFound {
                key: key.to_string(),
            })
    }

    /// Returns all cells of a column, in row order.
    pub fn column(&self, key: &str) -> Option<&[Cell]> {
        self.column_index(key).map(|i| self.cells[i].as_slice())
    }

    /// Returns the display name for a column key.
    pub fn display_name(&self, key: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|c| c.key == key)
            .map(|c| c.name.as_str())
    }

    /// Returns a single cell.
    pub fn cell(&self, row: usize, key: &str) -> Option<&Cell> {
        self.column(key).and_then(|col| col.get(row))
    }

    /// Returns an iterator over (column, cells) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&ColumnDef, &[Cell])> {
        self.columns
            .iter()
            .zip(self.cells.iter().map(Vec::as_slice))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── Cell ─────────────────────────────────────────────────────

    #[test]
    fn cell_labels() {
        assert_eq!(Cell::Number(3.0).label().as_deref(), Some("3"));
        assert_eq!(Cell::Number(2.5).label().as_deref(), Some("2.5"));
        assert_eq!(Cell::Number(-0.0).label().as_deref(), Some("0"));
        assert_eq!(Cell::from("abc").label().as_deref(), Some("abc"));
        assert_eq!(Cell::Null.label(), None);
    }

    #[test]
    fn cell_from_json_values() {
        assert_eq!(Cell::from(&Value::Null), Cell::Null);
        assert_eq!(Cell::from(&serde_json::json!(4)), Cell::Number(4.0));
        assert_eq!(Cell::from(&serde_json::json!("x")), Cell::from("x"));
        assert_eq!(Cell::from(&serde_json::json!(true)), Cell::from("true"));
    }

    #[test]
    fn cell_from_option() {
        assert_eq!(Cell::from(None::<f64>), Cell::Null);
        assert_eq!(Cell::from(Some(1.5)), Cell::Number(1.5));
    }

    // ── Construction ─────────────────────────────────────────────

    #[test]
    fn empty_dataset() {
        let ds = Dataset::with_keys(&[]).unwrap();
        assert_eq!(ds.row_count(), 0);
        assert_eq!(ds.column_count(), 0);
        assert!(ds.is_empty());
    }

    #[test]
    fn columns_without_rows_is_empty() {
        let ds = Dataset::with_keys(&["a", "b"]).unwrap();
        assert!(ds.is_empty());
    }

    #[test]
    fn duplicate_keys_rejected() {
        let err = Dataset::with_keys(&["a", "a"]).unwrap_err();
        assert_eq!(err, TabStatError::DuplicateColumn { key: "a".into() });
    }

    #[test]
    fn push_row_length_mismatch() {
        let mut ds = Dataset::with_keys(&["a", "b"]).unwrap();
        let err = ds.push_row(vec![Cell::Number(1.0)]).unwrap_err();
        assert_eq!(
            err,
            TabStatError::DimensionMismatch {
                expected: 2,
                actual: 1
            }
        );
        assert_eq!(ds.row_count(), 0);
    }

    #[test]
    fn column_lookup() {
        let mut ds = Dataset::with_keys(&["x", "y"]).unwrap();
        ds.push_row(vec![1.0.into(), "a".into()]).unwrap();
        ds.push_row(vec![2.0.into(), Cell::Null]).unwrap();

        assert_eq!(ds.column_index("y"), Some(1));
        assert_eq!(ds.column("x").unwrap(), &[Cell::Number(1.0), Cell::Number(2.0)]);
        assert!(ds.column("missing").is_none());
        assert_eq!(ds.cell(1, "y"), Some(&Cell::Null));
        assert_eq!(ds.cell(5, "y"), None);
    }

    // ── Edits ────────────────────────────────────────────────────

    #[test]
    fn set_cell_replaces_value() {
        let mut ds = Dataset::with_keys(&["x"]).unwrap();
        ds.push_row(vec!["old".into()]).unwrap();
        let prev = ds.set_cell(0, "x", Cell::Number(9.0)).unwrap();
        assert_eq!(prev, Cell::from("old"));
        assert_eq!(ds.cell(0, "x"), Some(&Cell::Number(9.0)));
    }

    #[test]
    fn set_cell_errors() {
        let mut ds = Dataset::with_keys(&["x"]).unwrap();
        ds.push_row(vec![Cell::Null]).unwrap();
        assert_eq!(
            ds.set_cell(3, "x", Cell::Null),
            Err(TabStatError::RowOutOfBounds { row: 3, rows: 1 })
        );
        assert_eq!(
            ds.set_cell(0, "nope", Cell::Null),
            Err(TabStatError::ColumnNotFound { key: "nope".into() })
        );
    }

    // ── JSON boundary ────────────────────────────────────────────

    #[test]
    fn json_roundtrip_preserves_cells() {
        let json = r#"{
            "columns": [{"key": "c0", "name": "Name"}, {"key": "c1", "name": "Qty"}],
            "rows": [
                {"c0": "a", "c1": 1.5},
                {"c0": null, "c1": "2,5"},
                {"c1": 3, "extra": "ignored"}
            ]
        }"#;
        let ds = Dataset::from_json_str(json).unwrap();
        assert_eq!(ds.row_count(), 3);
        assert_eq!(ds.cell(2, "c0"), Some(&Cell::Null));
        assert_eq!(ds.cell(1, "c1"), Some(&Cell::from("2,5")));

        let back = Dataset::from_json_value(ds.to_json_value()).unwrap();
        assert_eq!(back, ds);
    }

    #[test]
    fn json_missing_name_defaults_to_key() {
        let ds = Dataset::from_json_str(r#"{"columns":[{"key":"k"}],"rows":[]}"#).unwrap();
        assert_eq!(ds.display_name("k"), Some("k"));
    }

    #[test]
    fn json_malformed_is_error() {
        assert!(matches!(
            Dataset::from_json_str("{\"rows\": []}"),
            Err(TabStatError::Json(_))
        ));
    }

    #[test]
    fn iter_pairs_columns_with_cells() {
        let mut ds = Dataset::with_keys(&["a", "b"]).unwrap();
        ds.push_row(vec![1.0.into(), 2.0.into()]).unwrap();
        let keys: Vec<&str> = ds.iter().map(|(c, cells)| {
            assert_eq!(cells.len(), 1);
            c.key.as_str()
        }).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }
}
