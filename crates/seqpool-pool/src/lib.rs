//! Connection pooling for seqpool.
//!
//! A bounded pool of reusable connections produced by a [`ConnectionFactory`].
//! Callers block in [`Pool::acquire`] while every connection is checked out
//! and the pool is at capacity; the wait ends when a connection is returned
//! or the configured acquire timeout elapses.
//!
//! Connections go back to the pool when their [`PooledConnection`] handle is
//! dropped.

use seqpool_core::error::{PoolError, PoolErrorKind};
use seqpool_core::{Error, Result};
use std::collections::VecDeque;
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Connection pool configuration.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Pool name used in logs
    pub name: String,
    /// Connections opened when the pool is created and kept while idle
    pub min_connections: usize,
    /// Maximum number of connections allowed
    pub max_connections: usize,
    /// Connection idle timeout in milliseconds (0 disables)
    pub idle_timeout_ms: u64,
    /// Maximum time to wait for a connection in milliseconds (0 waits forever)
    pub acquire_timeout_ms: u64,
    /// Maximum lifetime of a connection in milliseconds (0 disables)
    pub max_lifetime_ms: u64,
    /// Test connections before giving them out
    pub test_on_checkout: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            name: "seqpool".to_string(),
            min_connections: 1,
            max_connections: 10,
            idle_timeout_ms: 600_000,   // 10 minutes
            acquire_timeout_ms: 30_000, // 30 seconds
            max_lifetime_ms: 1_800_000, // 30 minutes
            test_on_checkout: true,
        }
    }
}

impl PoolConfig {
    /// Create a new pool configuration with the given max connections.
    pub fn new(max_connections: usize) -> Self {
        Self {
            max_connections,
            ..Default::default()
        }
    }

    /// Set the pool name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set minimum connections.
    pub fn min_connections(mut self, n: usize) -> Self {
        self.min_connections = n;
        self
    }

    /// Set idle timeout.
    pub fn idle_timeout(mut self, ms: u64) -> Self {
        self.idle_timeout_ms = ms;
        self
    }

    /// Set acquire timeout.
    pub fn acquire_timeout(mut self, ms: u64) -> Self {
        self.acquire_timeout_ms = ms;
        self
    }

    /// Set max lifetime.
    pub fn max_lifetime(mut self, ms: u64) -> Self {
        self.max_lifetime_ms = ms;
        self
    }

    /// Enable/disable test on checkout.
    pub fn test_on_checkout(mut self, enabled: bool) -> Self {
        self.test_on_checkout = enabled;
        self
    }

    /// Check the configuration for contradictions.
    pub fn validate(&self) -> Result<()> {
        if self.max_connections == 0 {
            return Err(config_error("max_connections must be at least 1"));
        }
        if self.min_connections > self.max_connections {
            return Err(config_error(format!(
                "min_connections ({}) exceeds max_connections ({})",
                self.min_connections, self.max_connections
            )));
        }
        Ok(())
    }

    fn duration(ms: u64) -> Option<Duration> {
        (ms > 0).then(|| Duration::from_millis(ms))
    }
}

/// Pool statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Total number of connections (active + idle)
    pub total_connections: usize,
    /// Number of idle connections
    pub idle_connections: usize,
    /// Number of active connections
    pub active_connections: usize,
    /// Number of pending acquire requests
    pub pending_requests: usize,
}

/// Opens and vets the connections a [`Pool`] manages.
pub trait ConnectionFactory: Send + Sync + 'static {
    type Connection: Send + 'static;

    /// Open a new connection.
    fn connect(&self) -> Result<Self::Connection>;

    /// Checkout test, run when `test_on_checkout` is set.
    fn is_valid(&self, _conn: &Self::Connection) -> bool {
        true
    }

    /// Prepare a returned connection for its next user. Returning `false`
    /// discards it.
    fn recycle(&self, _conn: &mut Self::Connection) -> bool {
        true
    }
}

struct Slot<C> {
    conn: C,
    created: Instant,
    idle_since: Instant,
}

struct PoolState<C> {
    idle: VecDeque<Slot<C>>,
    total: usize,
    pending: usize,
    closed: bool,
}

struct Shared<F: ConnectionFactory> {
    config: PoolConfig,
    factory: F,
    state: Mutex<PoolState<F::Connection>>,
    available: Condvar,
}

impl<F: ConnectionFactory> Shared<F> {
    fn lock(&self) -> MutexGuard<'_, PoolState<F::Connection>> {
        self.state.lock().unwrap()
    }

    fn expired(&self, created: Instant, now: Instant) -> bool {
        PoolConfig::duration(self.config.max_lifetime_ms)
            .is_some_and(|max| now.duration_since(created) >= max)
    }

    /// Give a slot back to the pool, or close it.
    fn release(&self, mut conn: F::Connection, created: Instant) {
        let now = Instant::now();
        let reusable = !self.expired(created, now) && self.factory.recycle(&mut conn);

        let mut state = self.lock();
        if state.closed || !reusable {
            state.total -= 1;
            drop(state);
            tracing::debug!(pool = %self.config.name, "closing returned connection");
            drop(conn);
        } else {
            state.idle.push_back(Slot {
                conn,
                created,
                idle_since: now,
            });
            drop(state);
        }
        self.available.notify_one();
    }

    fn forget(&self) {
        self.lock().total -= 1;
        self.available.notify_one();
    }
}

/// A bounded, blocking connection pool.
///
/// Cloning a `Pool` yields another handle to the same connections.
pub struct Pool<F: ConnectionFactory> {
    shared: Arc<Shared<F>>,
}

impl<F: ConnectionFactory> Clone for Pool<F> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<F: ConnectionFactory> std::fmt::Debug for Pool<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pool")
            .field("name", &self.shared.config.name)
            .field("stats", &self.stats())
            .finish()
    }
}

impl<F: ConnectionFactory> Pool<F> {
    /// Create a pool and open `min_connections` connections.
    ///
    /// The first connection failure is returned as-is; nothing is retried.
    #[tracing::instrument(level = "debug", skip_all, fields(pool = %config.name))]
    pub fn new(config: PoolConfig, factory: F) -> Result<Self> {
        config.validate()?;

        let now = Instant::now();
        let mut idle = VecDeque::with_capacity(config.max_connections);
        for _ in 0..config.min_connections {
            let conn = factory.connect()?;
            idle.push_back(Slot {
                conn,
                created: now,
                idle_since: now,
            });
        }

        tracing::info!(
            initial = config.min_connections,
            max = config.max_connections,
            "connection pool ready"
        );

        let total = idle.len();
        Ok(Self {
            shared: Arc::new(Shared {
                config,
                factory,
                state: Mutex::new(PoolState {
                    idle,
                    total,
                    pending: 0,
                    closed: false,
                }),
                available: Condvar::new(),
            }),
        })
    }

    /// Get the pool configuration.
    pub fn config(&self) -> &PoolConfig {
        &self.shared.config
    }

    /// Get the connection factory.
    pub fn factory(&self) -> &F {
        &self.shared.factory
    }

    /// Get the current pool statistics.
    pub fn stats(&self) -> PoolStats {
        let state = self.shared.lock();
        PoolStats {
            total_connections: state.total,
            idle_connections: state.idle.len(),
            active_connections: state.total - state.idle.len(),
            pending_requests: state.pending,
        }
    }

    /// Check if the pool is at capacity.
    pub fn at_capacity(&self) -> bool {
        self.shared.lock().total >= self.shared.config.max_connections
    }

    pub fn is_closed(&self) -> bool {
        self.shared.lock().closed
    }

    /// Check out a connection, blocking while the pool is exhausted.
    pub fn acquire(&self) -> Result<PooledConnection<F>> {
        let shared = &self.shared;
        let config = &shared.config;
        let deadline = PoolConfig::duration(config.acquire_timeout_ms).map(|t| Instant::now() + t);

        let mut state = shared.lock();
        loop {
            if state.closed {
                return Err(pool_error(PoolErrorKind::Closed, "pool is closed"));
            }

            if let Some(slot) = self.take_idle(&mut state) {
                if !config.test_on_checkout {
                    return Ok(self.wrap(slot.conn, slot.created));
                }
                drop(state);
                if shared.factory.is_valid(&slot.conn) {
                    return Ok(self.wrap(slot.conn, slot.created));
                }
                tracing::warn!(pool = %config.name, "discarding connection that failed checkout test");
                drop(slot);
                state = shared.lock();
                state.total -= 1;
                continue;
            }

            if state.total < config.max_connections {
                state.total += 1;
                drop(state);
                return match shared.factory.connect() {
                    Ok(conn) => {
                        tracing::debug!(pool = %config.name, "opened new pooled connection");
                        Ok(self.wrap(conn, Instant::now()))
                    }
                    Err(e) => {
                        shared.forget();
                        Err(e)
                    }
                };
            }

            state.pending += 1;
            match deadline {
                None => {
                    state = shared.available.wait(state).unwrap();
                }
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        state.pending -= 1;
                        return Err(pool_error(
                            PoolErrorKind::Timeout,
                            format!(
                                "timed out after {}ms waiting for a connection",
                                config.acquire_timeout_ms
                            ),
                        ));
                    }
                    state = shared.available.wait_timeout(state, deadline - now).unwrap().0;
                }
            }
            state.pending -= 1;
        }
    }

    /// Pop the most recently returned idle connection, closing any that
    /// outlived their idle timeout or lifetime.
    fn take_idle(&self, state: &mut PoolState<F::Connection>) -> Option<Slot<F::Connection>> {
        let config = &self.shared.config;
        let idle_timeout = PoolConfig::duration(config.idle_timeout_ms);
        let now = Instant::now();

        while let Some(slot) = state.idle.pop_back() {
            let stale = idle_timeout.is_some_and(|t| now.duration_since(slot.idle_since) >= t)
                && state.total > config.min_connections;
            if stale || self.shared.expired(slot.created, now) {
                state.total -= 1;
                continue;
            }
            return Some(slot);
        }
        None
    }

    fn wrap(&self, conn: F::Connection, created: Instant) -> PooledConnection<F> {
        PooledConnection {
            conn: Some(conn),
            created,
            shared: Arc::clone(&self.shared),
        }
    }

    /// Close the pool: idle connections are dropped now, checked-out ones
    /// when they are returned, and waiters fail with `PoolErrorKind::Closed`.
    pub fn close(&self) {
        let drained: Vec<_> = {
            let mut state = self.shared.lock();
            state.closed = true;
            let drained: Vec<_> = state.idle.drain(..).collect();
            state.total -= drained.len();
            drained
        };
        tracing::info!(pool = %self.shared.config.name, closed = drained.len(), "connection pool closed");
        drop(drained);
        self.shared.available.notify_all();
    }
}

/// A connection borrowed from the pool.
///
/// Dereferences to the underlying connection and returns it to the pool on
/// drop.
pub struct PooledConnection<F: ConnectionFactory> {
    conn: Option<F::Connection>,
    created: Instant,
    shared: Arc<Shared<F>>,
}

impl<F: ConnectionFactory> PooledConnection<F> {
    /// Remove the connection from the pool for good, freeing its slot.
    pub fn detach(mut self) -> F::Connection {
        let conn = self.conn.take().expect("connection present until drop");
        self.shared.forget();
        conn
    }
}

impl<F: ConnectionFactory> Deref for PooledConnection<F> {
    type Target = F::Connection;

    fn deref(&self) -> &Self::Target {
        self.conn.as_ref().expect("connection present until drop")
    }
}

impl<F: ConnectionFactory> DerefMut for PooledConnection<F> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.conn.as_mut().expect("connection present until drop")
    }
}

impl<F: ConnectionFactory> Drop for PooledConnection<F> {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.shared.release(conn, self.created);
        }
    }
}

impl<F: ConnectionFactory> std::fmt::Debug for PooledConnection<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledConnection")
            .field("pool", &self.shared.config.name)
            .finish_non_exhaustive()
    }
}

fn pool_error(kind: PoolErrorKind, message: impl Into<String>) -> Error {
    Error::Pool(PoolError {
        kind,
        message: message.into(),
        source: None,
    })
}

fn config_error(message: impl Into<String>) -> Error {
    pool_error(PoolErrorKind::Config, message)
}
