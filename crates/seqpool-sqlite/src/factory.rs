//! Pool integration: opens `SqliteConnection`s for `seqpool_pool::Pool`.

use crate::connection::{SqliteConfig, SqliteConnection};
use seqpool_core::{Connection, Result};
use seqpool_pool::ConnectionFactory;

/// Opens SQLite connections from a fixed config.
#[derive(Debug, Clone)]
pub struct SqliteConnectionFactory {
    config: SqliteConfig,
}

impl SqliteConnectionFactory {
    pub fn new(config: SqliteConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SqliteConfig {
        &self.config
    }
}

impl ConnectionFactory for SqliteConnectionFactory {
    type Connection = SqliteConnection;

    fn connect(&self) -> Result<SqliteConnection> {
        SqliteConnection::open(&self.config)
    }

    fn is_valid(&self, conn: &SqliteConnection) -> bool {
        conn.ping().is_ok()
    }

    fn recycle(&self, conn: &mut SqliteConnection) -> bool {
        if !conn.in_transaction() {
            return true;
        }
        // A borrower left a transaction open; undo it before the next checkout.
        match conn.rollback() {
            Ok(()) => {
                tracing::debug!(path = %conn.path(), "rolled back abandoned transaction");
                true
            }
            Err(e) => {
                tracing::warn!(path = %conn.path(), error = %e, "discarding connection");
                false
            }
        }
    }
}
