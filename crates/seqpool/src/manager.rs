//! The pooled connection manager and its process-wide holder.

use crate::config::ConnectionManagerConfig;
use seqpool_core::{ConnectionSource, DatabaseType, Result, TimeZone};
use seqpool_pool::{Pool, PoolStats, PooledConnection};
use seqpool_sqlite::SqliteConnectionFactory;
use std::sync::{Arc, Mutex};

/// A connection checked out of a [`ConnectionManager`]. Returned to the pool
/// on drop.
pub type ManagedConnection = PooledConnection<SqliteConnectionFactory>;

/// Loader for bulk inserts. The embedded database has none, so
/// [`ConnectionManager::create_bulk_loader`] never returns one.
#[derive(Debug)]
pub enum BulkLoader {}

/// Hands out pooled connections to one embedded database and reports fixed
/// metadata about it.
#[derive(Debug)]
pub struct ConnectionManager {
    config: ConnectionManagerConfig,
    pool: Pool<SqliteConnectionFactory>,
}

impl ConnectionManager {
    /// Validate `config` and open the pool. The configured initial
    /// connections are opened before this returns.
    #[tracing::instrument(level = "debug", skip(config), fields(pool = %config.pool_name, url = %config.url))]
    pub fn new(config: ConnectionManagerConfig) -> Result<Self> {
        config.validate()?;
        if !config.user.is_empty() || !config.password.is_empty() {
            tracing::debug!(user = %config.user, "sqlite ignores credentials");
        }

        let factory = SqliteConnectionFactory::new(config.sqlite_config()?);
        let pool = Pool::new(config.pool_config(), factory)?;

        tracing::info!(
            identifier = %config.database_identifier,
            max = config.max_pool_size,
            "connection manager ready"
        );
        Ok(Self { config, pool })
    }

    /// Check out a connection, waiting while the pool is exhausted.
    pub fn get_connection(&self) -> Result<ManagedConnection> {
        self.pool.acquire()
    }

    pub fn database_type(&self) -> &'static DatabaseType {
        DatabaseType::sqlite()
    }

    pub fn time_zone(&self) -> TimeZone {
        self.config.time_zone
    }

    pub fn database_identifier(&self) -> &str {
        &self.config.database_identifier
    }

    /// Always `None`: bulk loading is not supported.
    pub fn create_bulk_loader(&self) -> Option<BulkLoader> {
        None
    }

    pub fn stats(&self) -> PoolStats {
        self.pool.stats()
    }

    pub fn config(&self) -> &ConnectionManagerConfig {
        &self.config
    }

    /// Close the pool. Later checkouts fail.
    pub fn close(&self) {
        self.pool.close();
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }
}

impl ConnectionSource for ConnectionManager {
    type Conn = ManagedConnection;

    fn acquire(&self) -> Result<ManagedConnection> {
        self.get_connection()
    }

    fn dialect(&self) -> &'static DatabaseType {
        self.database_type()
    }

    fn timezone(&self) -> TimeZone {
        self.time_zone()
    }

    fn identifier(&self) -> &str {
        self.database_identifier()
    }
}

/// Owns at most one [`ConnectionManager`], created on first use.
///
/// Create one at startup and share it (e.g. in a `static` or an `Arc`).
/// Concurrent first calls to [`get_or_init`](Self::get_or_init) build a
/// single manager and all of them get the same `Arc`. If construction fails
/// the cell stays empty and the next call tries again.
#[derive(Debug)]
pub struct ManagerCell {
    config: ConnectionManagerConfig,
    slot: Mutex<Option<Arc<ConnectionManager>>>,
}

impl ManagerCell {
    pub const fn new(config: ConnectionManagerConfig) -> Self {
        Self {
            config,
            slot: Mutex::new(None),
        }
    }

    /// The shared manager, building it on the first call.
    pub fn get_or_init(&self) -> Result<Arc<ConnectionManager>> {
        self.get_or_init_with(|config| ConnectionManager::new(config.clone()))
    }

    /// Like [`get_or_init`](Self::get_or_init) but builds the manager with
    /// `init`, which runs only if the cell is empty.
    pub fn get_or_init_with<F>(&self, init: F) -> Result<Arc<ConnectionManager>>
    where
        F: FnOnce(&ConnectionManagerConfig) -> Result<ConnectionManager>,
    {
        let mut slot = self.slot.lock().unwrap();
        if let Some(manager) = slot.as_ref() {
            return Ok(Arc::clone(manager));
        }

        let manager = Arc::new(init(&self.config)?);
        *slot = Some(Arc::clone(&manager));
        Ok(manager)
    }

    /// The manager if it has been built.
    pub fn get(&self) -> Option<Arc<ConnectionManager>> {
        self.slot.lock().unwrap().clone()
    }

    /// Remove and close the current manager, if any. The next
    /// `get_or_init` builds a fresh one.
    pub fn reset(&self) -> Option<Arc<ConnectionManager>> {
        let taken = self.slot.lock().unwrap().take();
        if let Some(manager) = &taken {
            manager.close();
        }
        taken
    }

    pub fn config(&self) -> &ConnectionManagerConfig {
        &self.config
    }
}

impl Default for ManagerCell {
    fn default() -> Self {
        Self::new(ConnectionManagerConfig::default())
    }
}
