//! Database connection traits.
//!
//! - [`Connection`] - executes statements and manages transactions
//! - [`ConnectionSource`] - hands out connections together with the metadata
//!   the owning framework needs to talk to them
//! - [`IsolationLevel`] - SQL transaction isolation levels
//!
//! All operations are synchronous and run on the caller's thread.

use crate::dialect::DatabaseType;
use crate::error::Result;
use crate::row::Row;
use crate::timezone::TimeZone;
use crate::value::Value;

/// Transaction isolation level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IsolationLevel {
    /// Transactions can see uncommitted changes from others.
    ReadUncommitted,

    /// Transactions only see committed changes from others.
    #[default]
    ReadCommitted,

    /// Transactions see a consistent snapshot of the database.
    RepeatableRead,

    /// Transactions appear to execute sequentially.
    Serializable,
}

/// A database connection capable of executing queries.
///
/// Transactions are connection-scoped: [`begin`](Connection::begin) opens one,
/// and it stays open until [`commit`](Connection::commit) or
/// [`rollback`](Connection::rollback).
///
/// # Example
///
/// ```rust,ignore
/// conn.begin()?;
/// conn.execute("INSERT INTO logs (msg) VALUES (?1)", &[Value::Text("action".into())])?;
/// conn.commit()?;
/// ```
pub trait Connection: Send {
    /// Execute a query and return all rows.
    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>>;

    /// Execute a query and return the first row, if any.
    fn query_one(&self, sql: &str, params: &[Value]) -> Result<Option<Row>> {
        Ok(self.query(sql, params)?.into_iter().next())
    }

    /// Execute a statement (INSERT, UPDATE, DELETE) and return rows affected.
    fn execute(&self, sql: &str, params: &[Value]) -> Result<u64>;

    /// Execute an INSERT and return the last inserted ID.
    fn insert(&self, sql: &str, params: &[Value]) -> Result<i64>;

    /// Begin a transaction with the default isolation level.
    fn begin(&self) -> Result<()> {
        self.begin_with(IsolationLevel::default())
    }

    /// Begin a transaction with a specific isolation level.
    fn begin_with(&self, isolation: IsolationLevel) -> Result<()>;

    /// Commit the open transaction.
    fn commit(&self) -> Result<()>;

    /// Roll back the open transaction.
    fn rollback(&self) -> Result<()>;

    /// Whether a transaction is currently open.
    fn in_transaction(&self) -> bool;

    /// Check that the connection is still usable.
    fn ping(&self) -> Result<()>;
}

/// A source of connections to one database.
///
/// This is the capability the owning framework looks up by identifier: it
/// acquires connections and reports the dialect, clock and name of the
/// database behind them.
pub trait ConnectionSource: Send + Sync {
    /// The handle returned by [`acquire`](ConnectionSource::acquire).
    type Conn;

    /// Acquire a live connection.
    fn acquire(&self) -> Result<Self::Conn>;

    /// The dialect descriptor for the database.
    fn dialect(&self) -> &'static DatabaseType;

    /// The time zone the database stores timestamps in.
    fn timezone(&self) -> TimeZone;

    /// A fixed string naming this source.
    fn identifier(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_isolation() {
        assert_eq!(IsolationLevel::default(), IsolationLevel::ReadCommitted);
    }
}
