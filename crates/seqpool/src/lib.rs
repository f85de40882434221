//! seqpool - named id sequences and a pooled embedded-database connection
//! manager.
//!
//! Two independent pieces live here:
//!
//! - **Sequences**: named, thread-safe counters kept in process memory
//!   ([`SequenceCounter`], [`SequenceObjectFactory`],
//!   [`InMemorySequenceGenerator`]).
//! - **Connections**: a [`ConnectionManager`] that owns a bounded pool of
//!   connections to an embedded SQLite database and reports fixed metadata
//!   (dialect, time zone, identifier). [`ManagerCell`] holds the one manager a
//!   process shares.
//!
//! # Quick Start
//!
//! ```rust
//! use seqpool::prelude::*;
//!
//! let ids = SequenceObjectFactory::new();
//! assert_eq!(ids.sequence("Order", 100).next(), 100);
//!
//! let cell = ManagerCell::new(ConnectionManagerConfig::new(
//!     "jdbc:sqlite:file:quickstart?mode=memory&cache=shared",
//! ));
//! let manager = cell.get_or_init().unwrap();
//! let conn = manager.get_connection().unwrap();
//! conn.execute_raw("CREATE TABLE t (id INTEGER PRIMARY KEY)").unwrap();
//! assert_eq!(manager.database_identifier(), "SQLITE_MEMORY");
//! ```
//!
//! # Logging
//!
//! Everything logs through `tracing`. Install a subscriber to see it; the
//! library never installs one.

pub mod config;
pub mod manager;
pub mod registry;

pub use config::{ConnectionManagerConfig, SQLITE_DRIVER};
pub use manager::{BulkLoader, ConnectionManager, ManagedConnection, ManagerCell};
pub use registry::ConnectionManagerRegistry;

pub use seqpool_core::{
    Connection, ConnectionSource, DatabaseType, Error, IsolationLevel, Product, Result, Row,
    TimeZone, Value,
};
pub use seqpool_pool::{PoolConfig, PoolStats};
pub use seqpool_sequence::{
    DEFAULT_START_VALUE, InMemorySequenceGenerator, SequenceCounter, SequenceGenerator,
    SequenceObjectFactory, SequenceSource,
};
pub use seqpool_sqlite::{SqliteConfig, SqliteConnection};

/// Common imports.
///
/// ```rust
/// use seqpool::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        Connection, ConnectionManager, ConnectionManagerConfig, ConnectionManagerRegistry,
        ConnectionSource, DatabaseType, Error, InMemorySequenceGenerator, ManagerCell, Result,
        SequenceCounter, SequenceGenerator, SequenceObjectFactory, SequenceSource, TimeZone,
        Value,
    };
}
