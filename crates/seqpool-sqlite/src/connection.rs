//! SQLite connection implementation.
//!
//! Safe wrappers around SQLite's C API implementing the `Connection` trait
//! from seqpool-core, plus an optional per-connection prepared statement
//! cache.

// FFI code needs casts that match C types exactly
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::borrow_as_ptr)]
#![allow(clippy::if_not_else)]

use crate::ffi;
use crate::types;
use seqpool_core::error::{
    ConnectionError, ConnectionErrorKind, QueryError, QueryErrorKind, TransactionError,
    TransactionErrorKind,
};
use seqpool_core::row::ColumnInfo;
use seqpool_core::{Connection, Error, IsolationLevel, Result, Row, Value};
use std::collections::HashMap;
use std::ffi::{CStr, CString, c_int};
use std::ptr;
use std::sync::{Arc, Mutex, MutexGuard};

/// Configuration for opening SQLite connections.
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    /// Path to the database file, ":memory:", or a `file:` URI.
    pub path: String,
    /// Open flags (read-only, read-write, create, etc.)
    pub flags: OpenFlags,
    /// Busy timeout in milliseconds.
    pub busy_timeout_ms: u32,
    /// Prepared statements kept per connection (0 disables statement pooling).
    pub statement_cache_capacity: usize,
}

/// Flags controlling how the database is opened.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenFlags {
    /// Open for reading only.
    pub read_only: bool,
    /// Open for reading and writing.
    pub read_write: bool,
    /// Create the database if it doesn't exist.
    pub create: bool,
    /// Enable URI filename interpretation.
    pub uri: bool,
    /// Open in multi-thread mode (connections not shared between threads).
    pub no_mutex: bool,
    /// Open in serialized mode (connections can be shared).
    pub full_mutex: bool,
    /// Enable shared cache mode.
    pub shared_cache: bool,
    /// Disable shared cache mode.
    pub private_cache: bool,
}

impl OpenFlags {
    /// Create flags for read-only access.
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            ..Default::default()
        }
    }

    /// Create flags for read-write access with creation if needed.
    pub fn create_read_write() -> Self {
        Self {
            read_write: true,
            create: true,
            ..Default::default()
        }
    }

    fn to_sqlite_flags(self) -> c_int {
        let mut flags = 0;

        if self.read_only {
            flags |= ffi::SQLITE_OPEN_READONLY;
        }
        if self.read_write {
            flags |= ffi::SQLITE_OPEN_READWRITE;
        }
        if self.create {
            flags |= ffi::SQLITE_OPEN_CREATE;
        }
        if self.uri {
            flags |= ffi::SQLITE_OPEN_URI;
        }
        if self.no_mutex {
            flags |= ffi::SQLITE_OPEN_NOMUTEX;
        }
        if self.full_mutex {
            flags |= ffi::SQLITE_OPEN_FULLMUTEX;
        }
        if self.shared_cache {
            flags |= ffi::SQLITE_OPEN_SHAREDCACHE;
        }
        if self.private_cache {
            flags |= ffi::SQLITE_OPEN_PRIVATECACHE;
        }

        // Default to read-write if no mode specified
        if flags & (ffi::SQLITE_OPEN_READONLY | ffi::SQLITE_OPEN_READWRITE) == 0 {
            flags |= ffi::SQLITE_OPEN_READWRITE | ffi::SQLITE_OPEN_CREATE;
        }

        flags
    }
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            path: ":memory:".to_string(),
            flags: OpenFlags::create_read_write(),
            busy_timeout_ms: 5000,
            statement_cache_capacity: 0,
        }
    }
}

impl SqliteConfig {
    /// Config for a file-based database.
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Config for a private in-memory database.
    pub fn memory() -> Self {
        Self::default()
    }

    /// Config for a named in-memory database that every connection opened
    /// with the same name shares. The database lives while at least one such
    /// connection is open.
    pub fn shared_memory(name: &str) -> Self {
        Self {
            path: format!("file:{name}?mode=memory&cache=shared"),
            flags: OpenFlags {
                uri: true,
                ..OpenFlags::create_read_write()
            },
            ..Default::default()
        }
    }

    /// Set open flags.
    pub fn flags(mut self, flags: OpenFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Set busy timeout.
    pub fn busy_timeout(mut self, ms: u32) -> Self {
        self.busy_timeout_ms = ms;
        self
    }

    /// Keep up to `capacity` prepared statements per connection.
    pub fn statement_cache(mut self, capacity: usize) -> Self {
        self.statement_cache_capacity = capacity;
        self
    }
}

/// Prepared statements keyed by SQL text.
///
/// A statement is removed while in use and put back afterwards, so one
/// handle is never stepped by two callers.
struct StatementCache {
    capacity: usize,
    statements: HashMap<String, *mut ffi::sqlite3_stmt>,
    hits: u64,
}

/// Inner state of the SQLite connection, protected by a mutex.
struct SqliteInner {
    db: *mut ffi::sqlite3,
    in_transaction: bool,
    cache: StatementCache,
}

// SAFETY: the handle and its statements are only touched while the owning
// Mutex is held.
unsafe impl Send for SqliteInner {}

impl SqliteInner {
    /// Get a statement for `sql`, from the cache when possible.
    fn checkout(&mut self, sql: &str) -> Result<*mut ffi::sqlite3_stmt> {
        if let Some(stmt) = self.cache.statements.remove(sql) {
            self.cache.hits += 1;
            return Ok(stmt);
        }
        prepare_stmt(self.db, sql)
    }

    /// Hand a statement back after use: cache it if there is room,
    /// finalize it otherwise.
    fn checkin(&mut self, sql: &str, stmt: *mut ffi::sqlite3_stmt) {
        if self.cache.statements.len() < self.cache.capacity {
            // SAFETY: stmt is a valid statement owned by this connection
            unsafe {
                ffi::sqlite3_reset(stmt);
                ffi::sqlite3_clear_bindings(stmt);
            }
            self.cache.statements.insert(sql.to_string(), stmt);
        } else {
            // SAFETY: stmt is valid and not referenced elsewhere
            unsafe { ffi::sqlite3_finalize(stmt) };
        }
    }

    fn bind_all(&self, stmt: *mut ffi::sqlite3_stmt, sql: &str, params: &[Value]) -> Result<()> {
        for (i, param) in params.iter().enumerate() {
            // SAFETY: stmt is valid, index is 1-based
            let rc = unsafe { types::bind_value(stmt, (i + 1) as c_int, param) };
            if rc != ffi::SQLITE_OK {
                return Err(bind_error(self.db, sql, i + 1));
            }
        }
        Ok(())
    }
}

/// A connection to a SQLite database.
///
/// All access to the underlying handle goes through an internal mutex.
pub struct SqliteConnection {
    inner: Mutex<SqliteInner>,
    path: String,
}

impl SqliteConnection {
    /// Open a new SQLite connection with the given configuration.
    pub fn open(config: &SqliteConfig) -> Result<Self> {
        let c_path = CString::new(config.path.as_str()).map_err(|_| {
            Error::Connection(ConnectionError {
                kind: ConnectionErrorKind::Connect,
                message: "Invalid path: contains null byte".to_string(),
                source: None,
            })
        })?;

        let mut db: *mut ffi::sqlite3 = ptr::null_mut();
        let flags = config.flags.to_sqlite_flags();

        // SAFETY: We pass valid pointers and check the return value
        let rc = unsafe { ffi::sqlite3_open_v2(c_path.as_ptr(), &mut db, flags, ptr::null()) };

        if rc != ffi::SQLITE_OK {
            let msg = if !db.is_null() {
                // SAFETY: db is valid, errmsg returns a valid C string
                unsafe {
                    let msg = CStr::from_ptr(ffi::sqlite3_errmsg(db))
                        .to_string_lossy()
                        .into_owned();
                    ffi::sqlite3_close_v2(db);
                    msg
                }
            } else {
                ffi::error_string(rc).to_string()
            };

            return Err(Error::Connection(ConnectionError {
                kind: ConnectionErrorKind::Connect,
                message: format!("Failed to open database: {}", msg),
                source: None,
            }));
        }

        if config.busy_timeout_ms > 0 {
            // SAFETY: db is valid
            unsafe {
                ffi::sqlite3_busy_timeout(db, config.busy_timeout_ms as c_int);
            }
        }

        tracing::trace!(path = %config.path, "opened sqlite connection");

        Ok(Self {
            inner: Mutex::new(SqliteInner {
                db,
                in_transaction: false,
                cache: StatementCache {
                    capacity: config.statement_cache_capacity,
                    statements: HashMap::new(),
                    hits: 0,
                },
            }),
            path: config.path.clone(),
        })
    }

    /// Open a private in-memory database.
    pub fn open_memory() -> Result<Self> {
        Self::open(&SqliteConfig::memory())
    }

    /// Open a file-based database.
    pub fn open_file(path: impl Into<String>) -> Result<Self> {
        Self::open(&SqliteConfig::file(path))
    }

    /// Get the database path.
    pub fn path(&self) -> &str {
        &self.path
    }

    fn lock(&self) -> MutexGuard<'_, SqliteInner> {
        self.inner.lock().unwrap()
    }

    /// Execute SQL directly without preparing (for DDL, etc.)
    pub fn execute_raw(&self, sql: &str) -> Result<()> {
        let inner = self.lock();
        exec(inner.db, sql)
    }

    /// Get the last insert rowid.
    pub fn last_insert_rowid(&self) -> i64 {
        let inner = self.lock();
        // SAFETY: db is valid
        unsafe { ffi::sqlite3_last_insert_rowid(inner.db) }
    }

    /// Get the number of rows changed by the last statement.
    pub fn changes(&self) -> i32 {
        let inner = self.lock();
        // SAFETY: db is valid
        unsafe { ffi::sqlite3_changes(inner.db) }
    }

    /// Number of prepared statements currently cached.
    pub fn cached_statements(&self) -> usize {
        self.lock().cache.statements.len()
    }

    /// Number of executions served from the statement cache.
    pub fn statement_cache_hits(&self) -> u64 {
        self.lock().cache.hits
    }

    /// Whether SQLite itself reports an open transaction.
    pub fn is_autocommit(&self) -> bool {
        let inner = self.lock();
        // SAFETY: db is valid
        unsafe { ffi::sqlite3_get_autocommit(inner.db) != 0 }
    }

    /// Prepare and execute a query, returning all rows.
    fn query_sync(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        let mut inner = self.lock();
        let stmt = inner.checkout(sql)?;
        let result = fetch_rows(&inner, stmt, sql, params);
        inner.checkin(sql, stmt);
        result
    }

    /// Prepare and execute a statement, returning rows affected.
    fn execute_sync(&self, sql: &str, params: &[Value]) -> Result<u64> {
        let mut inner = self.lock();
        let stmt = inner.checkout(sql)?;
        let result = step_to_completion(&inner, stmt, sql, params);
        inner.checkin(sql, stmt);
        result
    }

    /// Execute an INSERT and return the last inserted rowid.
    fn insert_sync(&self, sql: &str, params: &[Value]) -> Result<i64> {
        self.execute_sync(sql, params)?;
        Ok(self.last_insert_rowid())
    }

    /// Begin a transaction.
    fn begin_sync(&self, isolation: IsolationLevel) -> Result<()> {
        let mut inner = self.lock();
        if inner.in_transaction {
            return Err(transaction_error(
                TransactionErrorKind::AlreadyActive,
                "Already in a transaction",
            ));
        }

        // SQLite has no isolation levels; approximate with lock modes
        let begin_sql = match isolation {
            IsolationLevel::Serializable => "BEGIN EXCLUSIVE",
            IsolationLevel::RepeatableRead | IsolationLevel::ReadCommitted => "BEGIN IMMEDIATE",
            IsolationLevel::ReadUncommitted => "BEGIN DEFERRED",
        };
        exec(inner.db, begin_sql)?;
        inner.in_transaction = true;
        tracing::trace!(path = %self.path, "BEGIN");
        Ok(())
    }

    fn finish_sync(&self, sql: &str) -> Result<()> {
        let mut inner = self.lock();
        if !inner.in_transaction {
            return Err(transaction_error(
                TransactionErrorKind::NotActive,
                "Not in a transaction",
            ));
        }
        let result = exec(inner.db, sql);
        // SAFETY: db is valid
        inner.in_transaction = unsafe { ffi::sqlite3_get_autocommit(inner.db) == 0 };
        tracing::trace!(path = %self.path, sql, "transaction finished");
        result
    }
}

impl Drop for SqliteConnection {
    fn drop(&mut self) {
        if let Ok(inner) = self.inner.get_mut() {
            for (_, stmt) in inner.cache.statements.drain() {
                // SAFETY: cached statements are valid and unused
                unsafe { ffi::sqlite3_finalize(stmt) };
            }
            if !inner.db.is_null() {
                // SAFETY: db is valid
                unsafe {
                    ffi::sqlite3_close_v2(inner.db);
                }
            }
        }
    }
}

impl std::fmt::Debug for SqliteConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteConnection")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl Connection for SqliteConnection {
    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        self.query_sync(sql, params)
    }

    fn execute(&self, sql: &str, params: &[Value]) -> Result<u64> {
        self.execute_sync(sql, params)
    }

    fn insert(&self, sql: &str, params: &[Value]) -> Result<i64> {
        self.insert_sync(sql, params)
    }

    fn begin_with(&self, isolation: IsolationLevel) -> Result<()> {
        self.begin_sync(isolation)
    }

    fn commit(&self) -> Result<()> {
        self.finish_sync("COMMIT")
    }

    fn rollback(&self) -> Result<()> {
        self.finish_sync("ROLLBACK")
    }

    fn in_transaction(&self) -> bool {
        self.lock().in_transaction
    }

    fn ping(&self) -> Result<()> {
        self.query_sync("SELECT 1", &[]).map(|_| ())
    }
}

// Helper functions

fn fetch_rows(
    inner: &SqliteInner,
    stmt: *mut ffi::sqlite3_stmt,
    sql: &str,
    params: &[Value],
) -> Result<Vec<Row>> {
    inner.bind_all(stmt, sql, params)?;

    // SAFETY: stmt is valid
    let col_count = unsafe { ffi::sqlite3_column_count(stmt) };
    let names = (0..col_count)
        // SAFETY: stmt is valid, i < col_count
        .map(|i| unsafe { types::column_name(stmt, i) }.unwrap_or_else(|| format!("col{}", i)))
        .collect();
    let columns = Arc::new(ColumnInfo::new(names));

    let mut rows = Vec::new();
    loop {
        // SAFETY: stmt is valid
        match unsafe { ffi::sqlite3_step(stmt) } {
            ffi::SQLITE_ROW => {
                let values = (0..col_count)
                    // SAFETY: stmt is positioned on a row
                    .map(|i| unsafe { types::read_column(stmt, i) })
                    .collect();
                rows.push(Row::with_columns(Arc::clone(&columns), values));
            }
            ffi::SQLITE_DONE => return Ok(rows),
            _ => return Err(step_error(inner.db, sql)),
        }
    }
}

fn step_to_completion(
    inner: &SqliteInner,
    stmt: *mut ffi::sqlite3_stmt,
    sql: &str,
    params: &[Value],
) -> Result<u64> {
    inner.bind_all(stmt, sql, params)?;

    // SAFETY: stmt is valid
    match unsafe { ffi::sqlite3_step(stmt) } {
        ffi::SQLITE_DONE | ffi::SQLITE_ROW => {
            // SAFETY: db is valid
            let changes = unsafe { ffi::sqlite3_changes(inner.db) };
            Ok(changes as u64)
        }
        _ => Err(step_error(inner.db, sql)),
    }
}

fn exec(db: *mut ffi::sqlite3, sql: &str) -> Result<()> {
    let c_sql = CString::new(sql).map_err(|_| null_byte_error(sql))?;
    let mut errmsg: *mut std::ffi::c_char = ptr::null_mut();

    // SAFETY: All pointers are valid
    let rc = unsafe { ffi::sqlite3_exec(db, c_sql.as_ptr(), None, ptr::null_mut(), &mut errmsg) };

    if rc != ffi::SQLITE_OK {
        let msg = if !errmsg.is_null() {
            // SAFETY: errmsg is a valid C string allocated by SQLite
            unsafe {
                let msg = CStr::from_ptr(errmsg).to_string_lossy().into_owned();
                ffi::sqlite3_free(errmsg.cast());
                msg
            }
        } else {
            ffi::error_string(rc).to_string()
        };

        return Err(Error::Query(QueryError {
            kind: error_code_to_kind(rc),
            sql: Some(sql.to_string()),
            message: msg,
            source: None,
        }));
    }

    Ok(())
}

fn prepare_stmt(db: *mut ffi::sqlite3, sql: &str) -> Result<*mut ffi::sqlite3_stmt> {
    let c_sql = CString::new(sql).map_err(|_| null_byte_error(sql))?;
    let mut stmt: *mut ffi::sqlite3_stmt = ptr::null_mut();

    // SAFETY: All pointers are valid
    let rc = unsafe {
        ffi::sqlite3_prepare_v2(
            db,
            c_sql.as_ptr(),
            c_sql.as_bytes().len() as c_int,
            &mut stmt,
            ptr::null_mut(),
        )
    };

    if rc != ffi::SQLITE_OK {
        return Err(last_error(db, sql, None));
    }
    if stmt.is_null() {
        return Err(Error::Query(QueryError {
            kind: QueryErrorKind::Syntax,
            sql: Some(sql.to_string()),
            message: "SQL contains no statement".to_string(),
            source: None,
        }));
    }

    Ok(stmt)
}

fn last_error(db: *mut ffi::sqlite3, sql: &str, kind: Option<QueryErrorKind>) -> Error {
    // SAFETY: db is valid
    let (msg, code) = unsafe {
        let msg = CStr::from_ptr(ffi::sqlite3_errmsg(db))
            .to_string_lossy()
            .into_owned();
        (msg, ffi::sqlite3_errcode(db))
    };

    Error::Query(QueryError {
        kind: kind.unwrap_or_else(|| error_code_to_kind(code)),
        sql: Some(sql.to_string()),
        message: msg,
        source: None,
    })
}

fn bind_error(db: *mut ffi::sqlite3, sql: &str, param_index: usize) -> Error {
    match last_error(db, sql, Some(QueryErrorKind::Database)) {
        Error::Query(mut q) => {
            q.message = format!("Failed to bind parameter {}: {}", param_index, q.message);
            Error::Query(q)
        }
        other => other,
    }
}

fn step_error(db: *mut ffi::sqlite3, sql: &str) -> Error {
    last_error(db, sql, None)
}

fn null_byte_error(sql: &str) -> Error {
    Error::Query(QueryError {
        kind: QueryErrorKind::Syntax,
        sql: Some(sql.to_string()),
        message: "SQL contains null byte".to_string(),
        source: None,
    })
}

fn transaction_error(kind: TransactionErrorKind, message: &str) -> Error {
    Error::Transaction(TransactionError {
        kind,
        message: message.to_string(),
    })
}

fn error_code_to_kind(code: c_int) -> QueryErrorKind {
    // Extended codes carry the primary code in the low byte
    match code & 0xff {
        ffi::SQLITE_CONSTRAINT => QueryErrorKind::Constraint,
        ffi::SQLITE_BUSY | ffi::SQLITE_LOCKED => QueryErrorKind::Busy,
        ffi::SQLITE_PERM | ffi::SQLITE_AUTH => QueryErrorKind::Permission,
        ffi::SQLITE_NOTFOUND => QueryErrorKind::NotFound,
        ffi::SQLITE_TOOBIG => QueryErrorKind::DataTruncation,
        ffi::SQLITE_INTERRUPT => QueryErrorKind::Cancelled,
        _ => QueryErrorKind::Database,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_table(config: &SqliteConfig) -> SqliteConnection {
        let conn = SqliteConnection::open(config).unwrap();
        conn.execute_raw("CREATE TABLE test (id INTEGER PRIMARY KEY, name TEXT, age INTEGER)")
            .unwrap();
        conn
    }

    #[test]
    fn test_open_memory() {
        let conn = SqliteConnection::open_memory().unwrap();
        assert_eq!(conn.path(), ":memory:");
        conn.ping().unwrap();
    }

    #[test]
    fn test_execute_raw() {
        let conn = with_table(&SqliteConfig::memory());
        conn.execute_raw("INSERT INTO test (name) VALUES ('Alice')")
            .unwrap();
        assert_eq!(conn.changes(), 1);
        assert_eq!(conn.last_insert_rowid(), 1);
    }

    #[test]
    fn test_parameterized_query() {
        let conn = with_table(&SqliteConfig::memory());
        let id = conn
            .insert(
                "INSERT INTO test (name, age) VALUES (?1, ?2)",
                &[Value::Text("Alice".to_string()), Value::Int(30)],
            )
            .unwrap();
        assert_eq!(id, 1);

        let rows = conn
            .query(
                "SELECT * FROM test WHERE name = ?1",
                &[Value::Text("Alice".to_string())],
            )
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get_named::<String>("name").unwrap(), "Alice");
        assert_eq!(rows[0].get_named::<i32>("age").unwrap(), 30);
    }

    #[test]
    fn test_null_and_blob_roundtrip() {
        let conn = SqliteConnection::open_memory().unwrap();
        conn.execute_raw("CREATE TABLE t (a TEXT, b BLOB, c REAL)")
            .unwrap();
        conn.execute(
            "INSERT INTO t VALUES (?1, ?2, ?3)",
            &[Value::Null, Value::Bytes(vec![1, 2, 3]), Value::Double(1.5)],
        )
        .unwrap();

        let row = conn.query_one("SELECT a, b, c FROM t", &[]).unwrap().unwrap();
        assert_eq!(row.get_named::<Option<String>>("a").unwrap(), None);
        assert_eq!(row.get_named::<Vec<u8>>("b").unwrap(), vec![1, 2, 3]);
        assert!((row.get_named::<f64>("c").unwrap() - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_transaction() {
        let conn = with_table(&SqliteConfig::memory());

        conn.begin().unwrap();
        assert!(conn.in_transaction());
        assert!(!conn.is_autocommit());
        conn.execute("INSERT INTO test (name) VALUES ('Alice')", &[])
            .unwrap();
        conn.rollback().unwrap();
        assert!(!conn.in_transaction());

        let rows = conn.query("SELECT * FROM test", &[]).unwrap();
        assert!(rows.is_empty());

        conn.begin().unwrap();
        conn.execute("INSERT INTO test (name) VALUES ('Bob')", &[])
            .unwrap();
        conn.commit().unwrap();

        let rows = conn.query("SELECT * FROM test", &[]).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_transaction_misuse() {
        let conn = SqliteConnection::open_memory().unwrap();
        match conn.commit() {
            Err(Error::Transaction(e)) => assert_eq!(e.kind, TransactionErrorKind::NotActive),
            other => panic!("expected transaction error, got {other:?}"),
        }

        conn.begin().unwrap();
        match conn.begin() {
            Err(Error::Transaction(e)) => {
                assert_eq!(e.kind, TransactionErrorKind::AlreadyActive);
            }
            other => panic!("expected transaction error, got {other:?}"),
        }
        conn.rollback().unwrap();
    }

    #[test]
    fn test_error_kinds() {
        let conn = with_table(&SqliteConfig::memory());
        conn.execute("INSERT INTO test (id, name) VALUES (1, 'a')", &[])
            .unwrap();

        match conn.execute("INSERT INTO test (id, name) VALUES (1, 'b')", &[]) {
            Err(Error::Query(q)) => assert_eq!(q.kind, QueryErrorKind::Constraint),
            other => panic!("expected constraint error, got {other:?}"),
        }

        let err = conn.query("SELEKT nonsense", &[]).unwrap_err();
        assert_eq!(err.sql(), Some("SELEKT nonsense"));
    }

    #[test]
    fn test_statement_cache_reuses_statements() {
        let conn = with_table(&SqliteConfig::memory().statement_cache(4));
        let insert = "INSERT INTO test (name, age) VALUES (?1, ?2)";

        for i in 0..3 {
            conn.execute(insert, &[Value::Text(format!("n{i}")), Value::Int(i)])
                .unwrap();
        }
        assert_eq!(conn.cached_statements(), 1);
        assert_eq!(conn.statement_cache_hits(), 2);

        // Bindings from the previous run must not leak into the next one.
        conn.execute("INSERT INTO test (name, age) VALUES (?1, ?2)", &[])
            .unwrap();
        let row = conn
            .query_one("SELECT name, age FROM test WHERE id = 4", &[])
            .unwrap()
            .unwrap();
        assert_eq!(row.get_named::<Option<String>>("name").unwrap(), None);
    }

    #[test]
    fn test_statement_cache_capacity_is_respected() {
        let conn = SqliteConnection::open(&SqliteConfig::memory().statement_cache(2)).unwrap();
        for n in 0..5 {
            conn.query(&format!("SELECT {n}"), &[]).unwrap();
        }
        assert_eq!(conn.cached_statements(), 2);
    }

    #[test]
    fn test_statement_cache_disabled() {
        let conn = SqliteConnection::open_memory().unwrap();
        conn.query("SELECT 1", &[]).unwrap();
        conn.query("SELECT 1", &[]).unwrap();
        assert_eq!(conn.cached_statements(), 0);
        assert_eq!(conn.statement_cache_hits(), 0);
    }

    #[test]
    fn test_failed_statement_can_run_again() {
        let conn = with_table(&SqliteConfig::memory().statement_cache(4));
        let sql = "INSERT INTO test (id, name) VALUES (?1, 'x')";
        conn.execute(sql, &[Value::BigInt(1)]).unwrap();
        assert!(conn.execute(sql, &[Value::BigInt(1)]).is_err());
        conn.execute(sql, &[Value::BigInt(2)]).unwrap();
        let rows = conn.query("SELECT id FROM test", &[]).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_shared_memory_is_visible_across_connections() {
        let config = SqliteConfig::shared_memory("seqpool_conn_test_shared");
        let a = SqliteConnection::open(&config).unwrap();
        let b = SqliteConnection::open(&config).unwrap();

        a.execute_raw("CREATE TABLE shared (v INTEGER)").unwrap();
        a.execute("INSERT INTO shared VALUES (?1)", &[Value::Int(7)])
            .unwrap();

        let row = b.query_one("SELECT v FROM shared", &[]).unwrap().unwrap();
        assert_eq!(row.get_as::<i64>(0).unwrap(), 7);
    }

    #[test]
    fn test_open_flags() {
        let flags = OpenFlags::read_only().to_sqlite_flags();
        assert_eq!(flags & ffi::SQLITE_OPEN_READONLY, ffi::SQLITE_OPEN_READONLY);
        assert_eq!(flags & ffi::SQLITE_OPEN_CREATE, 0);

        let flags = OpenFlags::default().to_sqlite_flags();
        assert_ne!(flags & ffi::SQLITE_OPEN_READWRITE, 0);
        assert_ne!(flags & ffi::SQLITE_OPEN_CREATE, 0);
    }
}
