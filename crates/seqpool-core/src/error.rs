//! Error types for seqpool operations.

use std::fmt;

/// The primary error type for all seqpool operations.
#[derive(Debug)]
pub enum Error {
    /// Connection-related errors (open, disconnect)
    Connection(ConnectionError),
    /// Query execution errors
    Query(QueryError),
    /// Type conversion errors
    Type(TypeError),
    /// Transaction errors
    Transaction(TransactionError),
    /// Pool errors
    Pool(PoolError),
    /// Configuration errors
    Config(ConfigError),
    /// Sequence errors
    Sequence(SequenceError),
    /// I/O errors
    Io(std::io::Error),
    /// Operation timed out
    Timeout,
    /// Serialization/deserialization errors
    Serde(String),
    /// Custom error with message
    Custom(String),
}

#[derive(Debug)]
pub struct ConnectionError {
    pub kind: ConnectionErrorKind,
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionErrorKind {
    /// Failed to establish connection
    Connect,
    /// Connection lost or unusable
    Disconnected,
    /// Connection pool exhausted
    PoolExhausted,
}

#[derive(Debug)]
pub struct QueryError {
    pub kind: QueryErrorKind,
    pub sql: Option<String>,
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryErrorKind {
    /// Syntax error in SQL
    Syntax,
    /// Constraint violation (unique, foreign key, etc.)
    Constraint,
    /// Table or column not found
    NotFound,
    /// Permission denied
    Permission,
    /// Data too large for column
    DataTruncation,
    /// Database busy or locked
    Busy,
    /// Interrupted
    Cancelled,
    /// Other database error
    Database,
}

#[derive(Debug)]
pub struct TypeError {
    pub expected: &'static str,
    pub actual: String,
    pub column: Option<String>,
}

#[derive(Debug)]
pub struct TransactionError {
    pub kind: TransactionErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionErrorKind {
    /// BEGIN while a transaction is open
    AlreadyActive,
    /// COMMIT or ROLLBACK without a transaction
    NotActive,
}

#[derive(Debug)]
pub struct PoolError {
    pub kind: PoolErrorKind,
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolErrorKind {
    /// Pool exhausted (no available connections)
    Exhausted,
    /// Connection checkout timeout
    Timeout,
    /// Pool is closed
    Closed,
    /// Configuration error
    Config,
}

#[derive(Debug)]
pub struct ConfigError {
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

#[derive(Debug)]
pub struct SequenceError {
    pub kind: SequenceErrorKind,
    pub sequence: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceErrorKind {
    /// A batch request asked for zero ids
    InvalidBatch,
    /// Advancing the counter would overflow i64
    Overflow,
    /// The configured step is below 1
    InvalidIncrement,
}

impl Error {
    /// Is this a retryable error (busy database, pool exhausted, timeouts)?
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Query(q) => matches!(q.kind, QueryErrorKind::Busy),
            Error::Pool(p) => matches!(p.kind, PoolErrorKind::Exhausted | PoolErrorKind::Timeout),
            Error::Connection(c) => matches!(c.kind, ConnectionErrorKind::PoolExhausted),
            Error::Timeout => true,
            _ => false,
        }
    }

    /// Is this a connection error that likely requires reconnection?
    pub fn is_connection_error(&self) -> bool {
        match self {
            Error::Connection(c) => matches!(
                c.kind,
                ConnectionErrorKind::Connect | ConnectionErrorKind::Disconnected
            ),
            Error::Io(_) => true,
            _ => false,
        }
    }

    /// Get the SQL that caused this error, if available
    pub fn sql(&self) -> Option<&str> {
        match self {
            Error::Query(q) => q.sql.as_deref(),
            _ => None,
        }
    }

    /// Shorthand for a configuration error without a source.
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(ConfigError {
            message: message.into(),
            source: None,
        })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Connection(e) => write!(f, "Connection error: {}", e.message),
            Error::Query(e) => write!(f, "Query error: {}", e.message),
            Error::Type(e) => {
                if let Some(col) = &e.column {
                    write!(
                        f,
                        "Type error in column '{}': expected {}, found {}",
                        col, e.expected, e.actual
                    )
                } else {
                    write!(f, "Type error: expected {}, found {}", e.expected, e.actual)
                }
            }
            Error::Transaction(e) => write!(f, "Transaction error: {}", e.message),
            Error::Pool(e) => write!(f, "Pool error: {}", e.message),
            Error::Config(e) => write!(f, "Configuration error: {}", e.message),
            Error::Sequence(e) => write!(f, "Sequence error on '{}': {}", e.sequence, e.message),
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Timeout => write!(f, "Operation timed out"),
            Error::Serde(msg) => write!(f, "Serialization error: {}", msg),
            Error::Custom(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Connection(e) => e
                .source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            Error::Query(e) => e
                .source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            Error::Pool(e) => e
                .source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            Error::Config(e) => e
                .source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.sql {
            Some(sql) => write!(f, "{} (sql: {})", self.message, sql),
            None => write!(f, "{}", self.message),
        }
    }
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serde(err.to_string())
    }
}

impl From<ConnectionError> for Error {
    fn from(err: ConnectionError) -> Self {
        Error::Connection(err)
    }
}

impl From<QueryError> for Error {
    fn from(err: QueryError) -> Self {
        Error::Query(err)
    }
}

impl From<TypeError> for Error {
    fn from(err: TypeError) -> Self {
        Error::Type(err)
    }
}

impl From<TransactionError> for Error {
    fn from(err: TransactionError) -> Self {
        Error::Transaction(err)
    }
}

impl From<PoolError> for Error {
    fn from(err: PoolError) -> Self {
        Error::Pool(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Config(err)
    }
}

impl From<SequenceError> for Error {
    fn from(err: SequenceError) -> Self {
        Error::Sequence(err)
    }
}

/// Result type alias for seqpool operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_and_connection_flags() {
        let busy = Error::Query(QueryError {
            kind: QueryErrorKind::Busy,
            sql: Some("UPDATE t SET x = 1".to_string()),
            message: "database is locked".to_string(),
            source: None,
        });
        assert!(busy.is_retryable());
        assert_eq!(busy.sql(), Some("UPDATE t SET x = 1"));

        let pool_timeout = Error::Pool(PoolError {
            kind: PoolErrorKind::Timeout,
            message: "timed out".to_string(),
            source: None,
        });
        assert!(pool_timeout.is_retryable());

        let closed = Error::Pool(PoolError {
            kind: PoolErrorKind::Closed,
            message: "closed".to_string(),
            source: None,
        });
        assert!(!closed.is_retryable());

        let lost = Error::Connection(ConnectionError {
            kind: ConnectionErrorKind::Disconnected,
            message: "lost connection".to_string(),
            source: None,
        });
        assert!(lost.is_connection_error());
        assert!(!lost.is_retryable());
    }

    #[test]
    fn display_includes_context() {
        let err = Error::Sequence(SequenceError {
            kind: SequenceErrorKind::InvalidBatch,
            sequence: "Order".to_string(),
            message: "count must be positive".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "Sequence error on 'Order': count must be positive"
        );

        assert_eq!(
            Error::config("unknown driver").to_string(),
            "Configuration error: unknown driver"
        );
    }

    #[test]
    fn serde_errors_convert() {
        let parse = serde_json::from_str::<u32>("not json").unwrap_err();
        let err: Error = parse.into();
        assert!(matches!(err, Error::Serde(_)));
    }
}
