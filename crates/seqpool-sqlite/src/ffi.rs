//! The slice of the libsqlite3 C API the driver uses.
//!
//! Declarations come from `libsqlite3-sys`, which also compiles and links the
//! bundled SQLite. Only the items the driver needs are re-exported here so the
//! rest of the crate has one narrow place to look.

use std::ffi::{CStr, c_int};

pub use libsqlite3_sys::{sqlite3, sqlite3_destructor_type, sqlite3_stmt};

// Connection management
pub use libsqlite3_sys::{sqlite3_busy_timeout, sqlite3_open_v2};

// `libsqlite3-sys` leaves `sqlite3_close_v2` out of its bundled bindings; the
// symbol is still compiled into the bundled amalgamation, so declare it here.
unsafe extern "C" {
    pub fn sqlite3_close_v2(db: *mut sqlite3) -> c_int;
}

// Error handling
pub use libsqlite3_sys::{sqlite3_errcode, sqlite3_errmsg, sqlite3_errstr};

// Statements
pub use libsqlite3_sys::{
    sqlite3_clear_bindings, sqlite3_finalize, sqlite3_prepare_v2, sqlite3_reset, sqlite3_step,
};

// Parameter binding
pub use libsqlite3_sys::{
    sqlite3_bind_blob, sqlite3_bind_double, sqlite3_bind_int, sqlite3_bind_int64,
    sqlite3_bind_null, sqlite3_bind_text,
};

// Result columns
pub use libsqlite3_sys::{
    sqlite3_column_blob, sqlite3_column_bytes, sqlite3_column_count, sqlite3_column_double,
    sqlite3_column_int64, sqlite3_column_name, sqlite3_column_text, sqlite3_column_type,
};

// Execution helpers and metadata
pub use libsqlite3_sys::{
    sqlite3_changes, sqlite3_exec, sqlite3_free, sqlite3_get_autocommit,
    sqlite3_last_insert_rowid, sqlite3_libversion, sqlite3_libversion_number,
};

// Result codes
pub use libsqlite3_sys::{
    SQLITE_AUTH, SQLITE_BUSY, SQLITE_CONSTRAINT, SQLITE_DONE, SQLITE_ERROR, SQLITE_INTERRUPT,
    SQLITE_LOCKED, SQLITE_NOTFOUND, SQLITE_OK, SQLITE_PERM, SQLITE_ROW, SQLITE_TOOBIG,
};

// sqlite3_open_v2 flags
pub use libsqlite3_sys::{
    SQLITE_OPEN_CREATE, SQLITE_OPEN_FULLMUTEX, SQLITE_OPEN_MEMORY, SQLITE_OPEN_NOMUTEX,
    SQLITE_OPEN_PRIVATECACHE, SQLITE_OPEN_READONLY, SQLITE_OPEN_READWRITE,
    SQLITE_OPEN_SHAREDCACHE, SQLITE_OPEN_URI,
};

// Fundamental data types
pub use libsqlite3_sys::{SQLITE_BLOB, SQLITE_FLOAT, SQLITE_INTEGER, SQLITE_NULL, SQLITE_TEXT};

/// Destructor telling SQLite to copy bound text and blobs.
pub fn transient() -> sqlite3_destructor_type {
    libsqlite3_sys::SQLITE_TRANSIENT()
}

/// Get the SQLite library version as a string.
pub fn version() -> &'static str {
    // SAFETY: sqlite3_libversion returns a static string
    unsafe {
        let ptr = sqlite3_libversion();
        CStr::from_ptr(ptr).to_str().unwrap_or("unknown")
    }
}

/// Get the SQLite library version as a number.
pub fn version_number() -> i32 {
    // SAFETY: sqlite3_libversion_number is always safe to call
    unsafe { sqlite3_libversion_number() }
}

/// Convert an SQLite result code to a human-readable string.
pub fn error_string(code: c_int) -> &'static str {
    // SAFETY: sqlite3_errstr returns a static string
    unsafe {
        let ptr = sqlite3_errstr(code);
        CStr::from_ptr(ptr).to_str().unwrap_or("unknown error")
    }
}
