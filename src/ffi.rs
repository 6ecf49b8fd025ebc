//! C FFI bindings for u-tabstat.
//!
//! Exposes dataset handling, classification, chart series and column
//! profiles through a C-compatible interface.
//!
//! # Design
//!
//! - **Opaque handle**: `*mut TabStatDataset` owns a [`Dataset`]
//! - **JSON results**: analysis calls return a UTF-8 JSON string that the
//!   caller releases with `tabstat_string_free`
//! - **Optional configuration**: every analysis call accepts a JSON
//!   [`AnalysisConfig`] (partial objects allowed) or null for defaults
//! - **Integer error codes**: 0 = success, negative = error
//! - **Thread-local error message**: `tabstat_last_error()`
//!
//! # Safety
//!
//! All functions use `catch_unwind` to prevent panics from crossing the FFI boundary.
//! Null pointer arguments return error code -1 or a null result.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic;
use std::ptr;

use serde::Serialize;
use tracing::warn;

use crate::classify::{classify_columns_with, ColumnRole};
use crate::composite::regression_for;
use crate::config::AnalysisConfig;
use crate::dataset::{Cell, Dataset};
use crate::error::TabStatError;
use crate::profile::profile_column_with;
use crate::series::build_series_with;

// ── Error handling ────────────────────────────────────────────────────

/// Error codes returned by FFI functions.
pub const TABSTAT_OK: i32 = 0;
pub const TABSTAT_ERR_NULL_PTR: i32 = -1;
pub const TABSTAT_ERR_INVALID_INPUT: i32 = -2;
pub const TABSTAT_ERR_PARSE_FAILED: i32 = -3;
pub const TABSTAT_ERR_ANALYSIS_FAILED: i32 = -4;
pub const TABSTAT_ERR_PANIC: i32 = -99;

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    warn!(error = msg, "tabstat ffi call failed");
    LAST_ERROR.with(|cell| {
        *cell.borrow_mut() = CString::new(msg).ok();
    });
}

fn error_code(e: &TabStatError) -> i32 {
    match e {
        TabStatError::Json(_) => TABSTAT_ERR_PARSE_FAILED,
        _ => TABSTAT_ERR_INVALID_INPUT,
    }
}

fn fail(e: &TabStatError) -> i32 {
    set_last_error(&e.to_string());
    error_code(e)
}

/// Returns the last error message, or null if no error.
/// The returned string is valid until the next FFI call on this thread.
///
/// # Safety
/// The caller must not free the returned pointer.
#[no_mangle]
pub extern "C" fn tabstat_last_error() -> *const c_char {
    LAST_ERROR.with(|cell| {
        let borrow = cell.borrow();
        match borrow.as_ref() {
            Some(cstr) => cstr.as_ptr(),
            None => ptr::null(),
        }
    })
}

/// Clears the last error message.
#[no_mangle]
pub extern "C" fn tabstat_clear_error() {
    LAST_ERROR.with(|cell| {
        *cell.borrow_mut() = None;
    });
}

// ── Argument helpers ──────────────────────────────────────────────────

/// Borrows a required C string argument.
unsafe fn required_str<'a>(p: *const c_char, what: &str) -> Result<&'a str, i32> {
    if p.is_null() {
        set_last_error(&format!("null {what} pointer"));
        return Err(TABSTAT_ERR_NULL_PTR);
    }
    unsafe { CStr::from_ptr(p) }.to_str().map_err(|e| {
        set_last_error(&format!("invalid UTF-8 in {what}: {e}"));
        TABSTAT_ERR_INVALID_INPUT
    })
}

/// Borrows an optional C string argument; null maps to `None`.
unsafe fn optional_str<'a>(p: *const c_char, what: &str) -> Result<Option<&'a str>, i32> {
    if p.is_null() {
        return Ok(None);
    }
    unsafe { required_str(p, what) }.map(Some)
}

/// Decodes the configuration argument; null means defaults.
unsafe fn read_config(p: *const c_char) -> Result<AnalysisConfig, i32> {
    match unsafe { optional_str(p, "config_json") }? {
        None => Ok(AnalysisConfig::default()),
        Some(json) => serde_json::from_str(json).map_err(|e| fail(&TabStatError::from(e))),
    }
}

unsafe fn dataset_ref<'a>(handle: *const TabStatDataset) -> Result<&'a TabStatDataset, i32> {
    if handle.is_null() {
        set_last_error("null dataset handle");
        return Err(TABSTAT_ERR_NULL_PTR);
    }
    Ok(unsafe { &*handle })
}

/// Serializes a result into a caller-owned C string.
fn into_json_ptr<T: Serialize>(value: &T) -> Result<*mut c_char, i32> {
    let json = serde_json::to_string(value).map_err(|e| fail(&TabStatError::from(e)))?;
    CString::new(json).map(CString::into_raw).map_err(|e| {
        set_last_error(&format!("result contains NUL byte: {e}"));
        TABSTAT_ERR_ANALYSIS_FAILED
    })
}

/// Runs a JSON-producing call behind `catch_unwind`; errors become null.
fn json_call<F>(name: &str, f: F) -> *mut c_char
where
    F: FnOnce() -> Result<*mut c_char, i32> + panic::UnwindSafe,
{
    match panic::catch_unwind(f) {
        Ok(Ok(p)) => p,
        Ok(Err(_)) => ptr::null_mut(),
        Err(_) => {
            set_last_error(&format!("panic in {name}"));
            ptr::null_mut()
        }
    }
}

/// Frees a string returned by any `tabstat_*` JSON call.
///
/// # Safety
/// `s` must come from this library, or be null. It must not be used afterwards.
#[no_mangle]
pub unsafe extern "C" fn tabstat_string_free(s: *mut c_char) {
    if !s.is_null() {
        let _ = unsafe { CString::from_raw(s) };
    }
}

// ── Dataset handle ────────────────────────────────────────────────────

/// Opaque handle owning a dataset.
pub struct TabStatDataset {
    dataset: Dataset,
}

/// Creates a dataset from `{"columns": [...], "rows": [...]}` JSON.
///
/// # Safety
/// - `json` must be a valid null-terminated UTF-8 string.
/// - The returned handle must be freed with `tabstat_dataset_free`.
#[no_mangle]
pub unsafe extern "C" fn tabstat_dataset_from_json(json: *const c_char) -> *mut TabStatDataset {
    let result = panic::catch_unwind(|| {
        let json = match unsafe { required_str(json, "json") } {
            Ok(s) => s,
            Err(_) => return ptr::null_mut(),
        };
        match Dataset::from_json_str(json) {
            Ok(dataset) => Box::into_raw(Box::new(TabStatDataset { dataset })),
            Err(e) => {
                fail(&e);
                ptr::null_mut()
            }
        }
    });

    match result {
        Ok(p) => p,
        Err(_) => {
            set_last_error("panic in tabstat_dataset_from_json");
            ptr::null_mut()
        }
    }
}

/// Frees a dataset handle.
///
/// # Safety
/// `handle` must be a valid pointer from `tabstat_dataset_from_json`, or null.
#[no_mangle]
pub unsafe extern "C" fn tabstat_dataset_free(handle: *mut TabStatDataset) {
    if !handle.is_null() {
        let _ = unsafe { Box::from_raw(handle) };
    }
}

/// Returns the number of rows, or -1 for a null handle.
///
/// # Safety
/// `handle` must be a valid dataset handle or null.
#[no_mangle]
pub unsafe extern "C" fn tabstat_dataset_row_count(handle: *const TabStatDataset) -> i64 {
    match unsafe { dataset_ref(handle) } {
        Ok(h) => h.dataset.row_count() as i64,
        Err(_) => -1,
    }
}

/// Returns the number of columns, or -1 for a null handle.
///
/// # Safety
/// `handle` must be a valid dataset handle or null.
#[no_mangle]
pub unsafe extern "C" fn tabstat_dataset_col_count(handle: *const TabStatDataset) -> i64 {
    match unsafe { dataset_ref(handle) } {
        Ok(h) => h.dataset.column_count() as i64,
        Err(_) => -1,
    }
}

/// Replaces one cell. `cell_json` is any JSON scalar (`12`, `"3,5"`, `null`).
///
/// Returns 0 on success, negative on error.
///
/// # Safety
/// `handle` must be a valid dataset handle; `key` and `cell_json` valid
/// null-terminated UTF-8 strings.
#[no_mangle]
pub unsafe extern "C" fn tabstat_dataset_set_cell_json(
    handle: *mut TabStatDataset,
    row: u64,
    key: *const c_char,
    cell_json: *const c_char,
) -> i32 {
    let result = panic::catch_unwind(|| {
        if handle.is_null() {
            set_last_error("null dataset handle");
            return TABSTAT_ERR_NULL_PTR;
        }
        let key = match unsafe { required_str(key, "key") } {
            Ok(s) => s,
            Err(code) => return code,
        };
        let cell_json = match unsafe { required_str(cell_json, "cell_json") } {
            Ok(s) => s,
            Err(code) => return code,
        };
        let value: serde_json::Value = match serde_json::from_str(cell_json) {
            Ok(v) => v,
            Err(e) => return fail(&TabStatError::from(e)),
        };
        let row = match usize::try_from(row) {
            Ok(r) => r,
            Err(_) => return fail(&TabStatError::InvalidInput(format!("row {row} too large"))),
        };

        let h = unsafe { &mut *handle };
        match h.dataset.set_cell(row, key, Cell::from(&value)) {
            Ok(_) => TABSTAT_OK,
            Err(e) => fail(&e),
        }
    });

    match result {
        Ok(code) => code,
        Err(_) => {
            set_last_error("panic in tabstat_dataset_set_cell_json");
            TABSTAT_ERR_PANIC
        }
    }
}

// ── Analysis calls ────────────────────────────────────────────────────

#[derive(Serialize)]
struct RoleEntry<'a> {
    key: &'a str,
    role: ColumnRole,
}

/// Classifies every column. Returns `[{"key": .., "role": "numeric"|"categorical"}, ..]`.
///
/// # Safety
/// `handle` must be a valid dataset handle. `config_json` must be null or
/// a valid null-terminated UTF-8 string. Free the result with `tabstat_string_free`.
#[no_mangle]
pub unsafe extern "C" fn tabstat_classify_columns(
    handle: *const TabStatDataset,
    config_json: *const c_char,
) -> *mut c_char {
    json_call("tabstat_classify_columns", || {
        let h = unsafe { dataset_ref(handle) }?;
        let config = unsafe { read_config(config_json) }?;
        let roles = classify_columns_with(&h.dataset, &config);
        let entries: Vec<RoleEntry<'_>> = roles
            .iter()
            .map(|(key, role)| RoleEntry { key, role })
            .collect();
        into_json_ptr(&entries)
    })
}

/// Builds the chart series for `selected` (null selects nothing).
/// Returns `{"kind": .., "series": [{"name": .., "value": ..}, ..]}`.
///
/// # Safety
/// `handle` must be a valid dataset handle. `selected` and `config_json`
/// must be null or valid null-terminated UTF-8 strings.
#[no_mangle]
pub unsafe extern "C" fn tabstat_build_series(
    handle: *const TabStatDataset,
    selected: *const c_char,
    config_json: *const c_char,
) -> *mut c_char {
    json_call("tabstat_build_series", || {
        let h = unsafe { dataset_ref(handle) }?;
        let selected = unsafe { optional_str(selected, "selected") }?;
        let config = unsafe { read_config(config_json) }?;
        into_json_ptr(&build_series_with(&h.dataset, selected, &config))
    })
}

/// Profiles one column: role, statistics and frequency tables.
///
/// # Safety
/// `handle` must be a valid dataset handle; `key` a valid null-terminated
/// UTF-8 string; `config_json` null or valid UTF-8.
#[no_mangle]
pub unsafe extern "C" fn tabstat_profile_column(
    handle: *const TabStatDataset,
    key: *const c_char,
    config_json: *const c_char,
) -> *mut c_char {
    json_call("tabstat_profile_column", || {
        let h = unsafe { dataset_ref(handle) }?;
        let key = unsafe { required_str(key, "key") }?;
        let config = unsafe { read_config(config_json) }?;
        let profile = profile_column_with(&h.dataset, key, &config).map_err(|e| fail(&e))?;
        into_json_ptr(&profile)
    })
}

/// Fits `y_key` against `x_key` by least squares.
///
/// Returns the regression object, or the JSON literal `null` when fewer than
/// two numeric pairs exist or x is constant.
///
/// # Safety
/// `handle` must be a valid dataset handle; `x_key` and `y_key` valid
/// null-terminated UTF-8 strings; `config_json` null or valid UTF-8.
#[no_mangle]
pub unsafe extern "C" fn tabstat_regression(
    handle: *const TabStatDataset,
    x_key: *const c_char,
    y_key: *const c_char,
    config_json: *const c_char,
) -> *mut c_char {
    json_call("tabstat_regression", || {
        let h = unsafe { dataset_ref(handle) }?;
        let x_key = unsafe { required_str(x_key, "x_key") }?;
        let y_key = unsafe { required_str(y_key, "y_key") }?;
        let config = unsafe { read_config(config_json) }?;
        let fit = regression_for(&h.dataset, x_key, y_key, &config).map_err(|e| fail(&e))?;
        into_json_ptr(&fit)
    })
}

/// Returns the library version string.
#[no_mangle]
pub extern "C" fn tabstat_version() -> *const c_char {
    c"0.1.0".as_ptr()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    const SALES: &str = r#"{
        "columns": [{"key": "cat", "name": "Category"}, {"key": "val"}],
        "rows": [
            {"cat": "A", "val": "10"},
            {"cat": "A", "val": "5"},
            {"cat": "B", "val": "7"}
        ]
    }"#;

    fn load(json: &str) -> *mut TabStatDataset {
        let c = CString::new(json).unwrap();
        unsafe { tabstat_dataset_from_json(c.as_ptr()) }
    }

    /// Takes ownership of a returned JSON string and parses it.
    fn take_json(p: *mut c_char) -> Value {
        assert!(!p.is_null(), "call failed: {:?}", last_error());
        let s = unsafe { CStr::from_ptr(p) }.to_str().unwrap().to_string();
        unsafe { tabstat_string_free(p) };
        serde_json::from_str(&s).unwrap()
    }

    fn last_error() -> Option<String> {
        let p = tabstat_last_error();
        (!p.is_null()).then(|| unsafe { CStr::from_ptr(p) }.to_str().unwrap().to_string())
    }

    #[test]
    fn ffi_version() {
        let v = tabstat_version();
        let s = unsafe { CStr::from_ptr(v) }.to_str().unwrap();
        assert_eq!(s, "0.1.0");
    }

    #[test]
    fn ffi_error_lifecycle() {
        tabstat_clear_error();
        assert!(tabstat_last_error().is_null());

        set_last_error("test error");
        assert_eq!(last_error().as_deref(), Some("test error"));

        tabstat_clear_error();
        assert!(tabstat_last_error().is_null());
    }

    #[test]
    fn ffi_dataset_roundtrip() {
        let h = load(SALES);
        assert!(!h.is_null());
        assert_eq!(unsafe { tabstat_dataset_row_count(h) }, 3);
        assert_eq!(unsafe { tabstat_dataset_col_count(h) }, 2);
        unsafe { tabstat_dataset_free(h) };
    }

    #[test]
    fn ffi_dataset_null_and_bad_json() {
        let h = unsafe { tabstat_dataset_from_json(ptr::null()) };
        assert!(h.is_null());
        assert_eq!(unsafe { tabstat_dataset_row_count(ptr::null()) }, -1);

        tabstat_clear_error();
        let h = load("{not json");
        assert!(h.is_null());
        assert!(last_error().unwrap().starts_with("invalid JSON"));
    }

    #[test]
    fn ffi_build_series_cat_sum() {
        let h = load(SALES);
        let sel = CString::new("val").unwrap();
        let json = take_json(unsafe { tabstat_build_series(h, sel.as_ptr(), ptr::null()) });
        assert_eq!(json["kind"], "cat-sum");
        assert_eq!(json["series"][0]["name"], "A");
        assert_eq!(json["series"][0]["value"], 15.0);
        assert_eq!(json["series"][1]["value"], 7.0);

        let none = take_json(unsafe { tabstat_build_series(h, ptr::null(), ptr::null()) });
        assert_eq!(none["kind"], "empty");
        unsafe { tabstat_dataset_free(h) };
    }

    #[test]
    fn ffi_classify_with_config() {
        let h = load(SALES);
        let roles = take_json(unsafe { tabstat_classify_columns(h, ptr::null()) });
        assert_eq!(roles[0]["role"], "categorical");
        assert_eq!(roles[1]["role"], "numeric");

        let strict = CString::new(r#"{"numericThreshold": 1.5}"#).unwrap();
        let roles = take_json(unsafe { tabstat_classify_columns(h, strict.as_ptr()) });
        assert_eq!(roles[1]["role"], "categorical");

        let bad = CString::new(r#"{"sampleSize": "many"}"#).unwrap();
        let p = unsafe { tabstat_classify_columns(h, bad.as_ptr()) };
        assert!(p.is_null());
        unsafe { tabstat_dataset_free(h) };
    }

    #[test]
    fn ffi_set_cell_then_profile() {
        let h = load(SALES);
        let key = CString::new("val").unwrap();
        let cell = CString::new(r#""1.000,5""#).unwrap();
        let rc = unsafe { tabstat_dataset_set_cell_json(h, 2, key.as_ptr(), cell.as_ptr()) };
        assert_eq!(rc, TABSTAT_OK);

        let profile = take_json(unsafe { tabstat_profile_column(h, key.as_ptr(), ptr::null()) });
        assert_eq!(profile["role"], "numeric");
        assert_eq!(profile["statistics"]["dispersion"]["range"], 995.5);

        let rc = unsafe { tabstat_dataset_set_cell_json(h, 99, key.as_ptr(), cell.as_ptr()) };
        assert_eq!(rc, TABSTAT_ERR_INVALID_INPUT);
        unsafe { tabstat_dataset_free(h) };
    }

    #[test]
    fn ffi_profile_unknown_column() {
        let h = load(SALES);
        let key = CString::new("nope").unwrap();
        let p = unsafe { tabstat_profile_column(h, key.as_ptr(), ptr::null()) };
        assert!(p.is_null());
        assert_eq!(last_error().as_deref(), Some("column 'nope' not found"));
        unsafe { tabstat_dataset_free(h) };
    }

    #[test]
    fn ffi_regression() {
        let h = load(
            r#"{"columns": [{"key": "x"}, {"key": "y"}],
                "rows": [{"x": 1, "y": 3}, {"x": 2, "y": 5}, {"x": 3, "y": 7}]}"#,
        );
        let x = CString::new("x").unwrap();
        let y = CString::new("y").unwrap();
        let fit = take_json(unsafe { tabstat_regression(h, x.as_ptr(), y.as_ptr(), ptr::null()) });
        assert!((fit["slope"].as_f64().unwrap() - 2.0).abs() < 1e-12);
        assert_eq!(fit["n"], 3);

        unsafe { tabstat_dataset_free(h) };

        let flat = load(
            r#"{"columns": [{"key": "x"}, {"key": "y"}],
                "rows": [{"x": 1, "y": 3}, {"x": 1, "y": 5}]}"#,
        );
        let none = take_json(unsafe { tabstat_regression(flat, x.as_ptr(), y.as_ptr(), ptr::null()) });
        assert!(none.is_null());
        unsafe { tabstat_dataset_free(flat) };
    }

    #[test]
    fn ffi_null_handle_analysis() {
        let p = unsafe { tabstat_build_series(ptr::null(), ptr::null(), ptr::null()) };
        assert!(p.is_null());
        assert_eq!(last_error().as_deref(), Some("null dataset handle"));
    }
}
