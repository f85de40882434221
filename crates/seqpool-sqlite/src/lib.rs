//! Embedded SQLite driver for seqpool.
//!
// FFI bindings require unsafe code
#![allow(unsafe_code)]
//!
//! Wraps libsqlite3 (bundled through `libsqlite3-sys`) behind the
//! `Connection` trait from seqpool-core, and plugs into `seqpool_pool::Pool`
//! through [`SqliteConnectionFactory`].
//!
//! # Example
//!
//! ```rust
//! use seqpool_core::{Connection, Value};
//! use seqpool_sqlite::SqliteConnection;
//!
//! let conn = SqliteConnection::open_memory().unwrap();
//! conn.execute_raw("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)").unwrap();
//! let id = conn
//!     .insert("INSERT INTO users (name) VALUES (?1)", &[Value::Text("Alice".into())])
//!     .unwrap();
//! assert_eq!(id, 1);
//! ```
//!
//! # Type Mapping
//!
//! | Value | SQLite storage class |
//! |-------|----------------------|
//! | `Bool` | INTEGER (0/1) |
//! | `Int`, `BigInt` | INTEGER |
//! | `Double` | REAL |
//! | `Text` | TEXT |
//! | `Bytes` | BLOB |
//! | `Null` | NULL |
//!
//! Integers always read back as `Value::BigInt`.
//!
//! # Shared in-memory databases
//!
//! [`SqliteConfig::shared_memory`] opens a named in-memory database through a
//! `file:` URI with a shared cache. Every connection opened with the same name
//! sees the same tables, and the database disappears when the last of them
//! closes.

pub mod connection;
pub mod factory;
pub mod ffi;
pub mod types;

pub use connection::{OpenFlags, SqliteConfig, SqliteConnection};
pub use factory::SqliteConnectionFactory;

/// Version of the linked SQLite library.
pub fn sqlite_version() -> &'static str {
    ffi::version()
}

/// Version of the linked SQLite library as a number (e.g. 3045000).
pub fn sqlite_version_number() -> i32 {
    ffi::version_number()
}
