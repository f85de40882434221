//! Core types and traits for seqpool.
//!
//! This crate provides the foundational abstractions shared by the other
//! seqpool crates:
//!
//! - `Connection` trait for synchronous database connections
//! - `ConnectionSource` trait for anything that hands out connections
//! - `DatabaseType` descriptors for SQL dialect quirks
//! - `TimeZone` for the database clock
//! - `Error` and `Result` used across the workspace

pub mod connection;
pub mod dialect;
pub mod error;
pub mod row;
pub mod timezone;
pub mod value;

pub use connection::{Connection, ConnectionSource, IsolationLevel};
pub use dialect::{DatabaseType, Product};
pub use error::{Error, Result};
pub use row::{FromValue, Row};
pub use timezone::TimeZone;
pub use value::Value;
