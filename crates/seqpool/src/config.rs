//! Connection manager configuration.
//!
//! Every field has a default, so a JSON document only needs the keys it
//! changes:
//!
//! ```json
//! { "url": "jdbc:sqlite:file:orders?mode=memory&cache=shared", "max_pool_size": 4 }
//! ```

use seqpool_core::error::ConfigError;
use seqpool_core::{Error, Result, TimeZone};
use seqpool_pool::PoolConfig;
use seqpool_sqlite::{OpenFlags, SqliteConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Driver name accepted by [`ConnectionManagerConfig::driver`].
pub const SQLITE_DRIVER: &str = "sqlite";

/// Settings for a [`ConnectionManager`](crate::ConnectionManager).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionManagerConfig {
    /// Database driver; only `sqlite` is supported
    pub driver: String,
    /// Connection string: `jdbc:sqlite:<path>`, `sqlite:<path>` or a bare path
    pub url: String,
    /// User name (accepted for compatibility, SQLite has no users)
    pub user: String,
    /// Password (accepted for compatibility, SQLite has no users)
    pub password: String,
    /// Pool name used in logs
    pub pool_name: String,
    /// Connections opened when the manager starts. These are never evicted,
    /// so at least one is required for an in-memory database, which is dropped
    /// when its last connection closes.
    pub initial_pool_size: usize,
    /// Upper bound on open connections
    pub max_pool_size: usize,
    /// Keep prepared statements per connection
    pub statement_pooling: bool,
    /// Statements cached per connection when pooling is on
    pub statement_cache_size: usize,
    /// How long a checkout may wait; 0 waits forever
    pub acquire_timeout_ms: u64,
    /// SQLite busy timeout
    pub busy_timeout_ms: u32,
    /// Time zone reported for the database
    pub time_zone: TimeZone,
    /// Identifier reported for the database
    pub database_identifier: String,
}

impl Default for ConnectionManagerConfig {
    fn default() -> Self {
        Self {
            driver: SQLITE_DRIVER.to_string(),
            url: "jdbc:sqlite:file:seqpool?mode=memory&cache=shared".to_string(),
            user: "sa".to_string(),
            password: String::new(),
            pool_name: "seqpool-memory".to_string(),
            initial_pool_size: 1,
            max_pool_size: 10,
            statement_pooling: true,
            statement_cache_size: 32,
            acquire_timeout_ms: 30_000,
            busy_timeout_ms: 5_000,
            time_zone: TimeZone::UTC,
            database_identifier: "SQLITE_MEMORY".to_string(),
        }
    }
}

impl ConnectionManagerConfig {
    /// Default settings pointed at `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Parse a JSON document. Missing keys take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn driver(mut self, driver: impl Into<String>) -> Self {
        self.driver = driver.into();
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    pub fn pool_name(mut self, name: impl Into<String>) -> Self {
        self.pool_name = name.into();
        self
    }

    pub fn initial_pool_size(mut self, n: usize) -> Self {
        self.initial_pool_size = n;
        self
    }

    pub fn max_pool_size(mut self, n: usize) -> Self {
        self.max_pool_size = n;
        self
    }

    pub fn statement_pooling(mut self, enabled: bool) -> Self {
        self.statement_pooling = enabled;
        self
    }

    pub fn statement_cache_size(mut self, n: usize) -> Self {
        self.statement_cache_size = n;
        self
    }

    pub fn acquire_timeout(mut self, ms: u64) -> Self {
        self.acquire_timeout_ms = ms;
        self
    }

    pub fn busy_timeout(mut self, ms: u32) -> Self {
        self.busy_timeout_ms = ms;
        self
    }

    pub fn time_zone(mut self, tz: TimeZone) -> Self {
        self.time_zone = tz;
        self
    }

    pub fn database_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.database_identifier = identifier.into();
        self
    }

    /// Check the settings without opening anything.
    pub fn validate(&self) -> Result<()> {
        if !self.driver.eq_ignore_ascii_case(SQLITE_DRIVER) {
            return Err(Error::config(format!(
                "unsupported driver '{}', expected '{}'",
                self.driver, SQLITE_DRIVER
            )));
        }
        if self.database_identifier.is_empty() {
            return Err(Error::config("database_identifier must not be empty"));
        }
        if self.is_in_memory()? && self.initial_pool_size == 0 {
            return Err(Error::config(
                "initial_pool_size must be at least 1 for an in-memory database",
            ));
        }
        self.pool_config().validate()
    }

    /// Whether [`url`](Self::url) names an in-memory database.
    pub fn is_in_memory(&self) -> Result<bool> {
        let path = self.database_path()?;
        Ok(path == ":memory:" || path.contains("mode=memory"))
    }

    /// The database path inside [`url`](Self::url), without any scheme prefix.
    pub fn database_path(&self) -> Result<&str> {
        let url = self.url.trim();
        let path = match url.strip_prefix("jdbc:") {
            Some(rest) => rest.strip_prefix("sqlite:").ok_or_else(|| {
                Error::config(format!("connection string '{}' is not a sqlite url", self.url))
            })?,
            None => url.strip_prefix("sqlite:").unwrap_or(url),
        };

        if path.is_empty() {
            return Err(Error::Config(ConfigError {
                message: format!("connection string '{}' names no database", self.url),
                source: None,
            }));
        }
        Ok(path)
    }

    /// Driver settings derived from this config.
    pub fn sqlite_config(&self) -> Result<SqliteConfig> {
        let path = self.database_path()?;
        let flags = OpenFlags {
            uri: path.starts_with("file:"),
            ..OpenFlags::create_read_write()
        };
        let cache = if self.statement_pooling {
            self.statement_cache_size
        } else {
            0
        };

        Ok(SqliteConfig::file(path)
            .flags(flags)
            .busy_timeout(self.busy_timeout_ms)
            .statement_cache(cache))
    }

    /// Pool settings derived from this config.
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig::new(self.max_pool_size)
            .name(self.pool_name.clone())
            .min_connections(self.initial_pool_size)
            .acquire_timeout(self.acquire_timeout_ms)
    }
}
