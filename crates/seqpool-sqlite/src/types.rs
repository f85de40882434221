//! Conversions between `Value` and SQLite's storage classes.
//!
//! SQLite stores every value as INTEGER, REAL, TEXT, BLOB or NULL. Booleans
//! are bound as 0/1 integers and come back as `Value::BigInt`.

use crate::ffi;
use seqpool_core::Value;
use std::ffi::{CStr, c_int};

/// Bind a Value to a prepared statement parameter.
///
/// # Safety
/// - `stmt` must be a valid, non-null prepared statement handle
/// - `index` must be a valid 1-based parameter index
pub unsafe fn bind_value(stmt: *mut ffi::sqlite3_stmt, index: c_int, value: &Value) -> c_int {
    unsafe {
        match value {
            Value::Null => ffi::sqlite3_bind_null(stmt, index),

            Value::Bool(b) => ffi::sqlite3_bind_int(stmt, index, c_int::from(*b)),

            Value::Int(v) => ffi::sqlite3_bind_int(stmt, index, *v),

            Value::BigInt(v) => ffi::sqlite3_bind_int64(stmt, index, *v),

            Value::Double(v) => ffi::sqlite3_bind_double(stmt, index, *v),

            Value::Text(s) => {
                let bytes = s.as_bytes();
                ffi::sqlite3_bind_text(
                    stmt,
                    index,
                    bytes.as_ptr().cast(),
                    bytes.len() as c_int,
                    ffi::transient(),
                )
            }

            Value::Bytes(b) => ffi::sqlite3_bind_blob(
                stmt,
                index,
                b.as_ptr().cast(),
                b.len() as c_int,
                ffi::transient(),
            ),
        }
    }
}

/// Read the value of column `index` from the current row.
///
/// # Safety
/// `stmt` must be a valid statement positioned on a row (`SQLITE_ROW`).
pub unsafe fn read_column(stmt: *mut ffi::sqlite3_stmt, index: c_int) -> Value {
    unsafe {
        match ffi::sqlite3_column_type(stmt, index) {
            ffi::SQLITE_INTEGER => Value::BigInt(ffi::sqlite3_column_int64(stmt, index)),
            ffi::SQLITE_FLOAT => Value::Double(ffi::sqlite3_column_double(stmt, index)),
            ffi::SQLITE_TEXT => {
                let ptr = ffi::sqlite3_column_text(stmt, index);
                let len = ffi::sqlite3_column_bytes(stmt, index) as usize;
                if ptr.is_null() {
                    Value::Text(String::new())
                } else {
                    let bytes = std::slice::from_raw_parts(ptr, len);
                    Value::Text(String::from_utf8_lossy(bytes).into_owned())
                }
            }
            ffi::SQLITE_BLOB => {
                let ptr = ffi::sqlite3_column_blob(stmt, index);
                let len = ffi::sqlite3_column_bytes(stmt, index) as usize;
                if ptr.is_null() {
                    Value::Bytes(Vec::new())
                } else {
                    Value::Bytes(std::slice::from_raw_parts(ptr.cast::<u8>(), len).to_vec())
                }
            }
            _ => Value::Null,
        }
    }
}

/// Name of result column `index`.
///
/// # Safety
/// `stmt` must be a valid prepared statement.
pub unsafe fn column_name(stmt: *mut ffi::sqlite3_stmt, index: c_int) -> Option<String> {
    unsafe {
        let ptr = ffi::sqlite3_column_name(stmt, index);
        if ptr.is_null() {
            None
        } else {
            Some(CStr::from_ptr(ptr).to_string_lossy().into_owned())
        }
    }
}
