//! Pooled connections against the shared in-memory database.

use seqpool::prelude::*;
use seqpool::PoolStats;
use seqpool_core::error::PoolErrorKind;
use std::thread;

fn manager(name: &str, max: usize) -> ConnectionManager {
    let config =
        ConnectionManagerConfig::new(format!("jdbc:sqlite:file:{name}?mode=memory&cache=shared"))
            .max_pool_size(max)
            .acquire_timeout(200);
    ConnectionManager::new(config).unwrap()
}

#[test]
fn writes_on_one_connection_are_visible_on_another() {
    let manager = manager("it_pool_roundtrip", 4);

    let writer = manager.get_connection().unwrap();
    writer
        .execute_raw("CREATE TABLE orders (id INTEGER PRIMARY KEY, item TEXT NOT NULL)")
        .unwrap();
    writer
        .insert(
            "INSERT INTO orders (id, item) VALUES (?1, ?2)",
            &[Value::BigInt(100), Value::Text("book".to_string())],
        )
        .unwrap();

    let reader = manager.get_connection().unwrap();
    let rows = reader
        .query("SELECT id, item FROM orders", &[])
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get_named::<i64>("id").unwrap(), 100);
    assert_eq!(rows[0].get_named::<String>("item").unwrap(), "book");
}

#[test]
fn exhausted_pool_times_out_then_recovers() {
    let manager = manager("it_pool_exhaust", 2);
    let a = manager.get_connection().unwrap();
    let b = manager.get_connection().unwrap();

    match manager.get_connection() {
        Err(Error::Pool(e)) => assert_eq!(e.kind, PoolErrorKind::Timeout),
        other => panic!("expected timeout, got {other:?}"),
    }

    drop(a);
    let c = manager.get_connection().unwrap();
    assert_eq!(
        manager.stats(),
        PoolStats {
            total_connections: 2,
            idle_connections: 0,
            active_connections: 2,
            pending_requests: 0,
        }
    );
    drop((b, c));
    assert_eq!(manager.stats().idle_connections, 2);
}

#[test]
fn blocked_checkout_wakes_on_return() {
    let config =
        ConnectionManagerConfig::new("jdbc:sqlite:file:it_pool_wake?mode=memory&cache=shared")
            .max_pool_size(1)
            .acquire_timeout(0);
    let manager = ConnectionManager::new(config).unwrap();
    let held = manager.get_connection().unwrap();

    thread::scope(|s| {
        let waiter = s.spawn(|| manager.get_connection().map(|c| c.ping().is_ok()));
        thread::sleep(std::time::Duration::from_millis(50));
        drop(held);
        assert!(waiter.join().unwrap().unwrap());
    });
}

#[test]
fn abandoned_transaction_is_rolled_back_on_return() {
    let manager = manager("it_pool_abandoned", 1);
    {
        let conn = manager.get_connection().unwrap();
        conn.execute_raw("CREATE TABLE t (v INTEGER)").unwrap();
        conn.begin().unwrap();
        conn.execute("INSERT INTO t VALUES (1)", &[]).unwrap();
    }

    let conn = manager.get_connection().unwrap();
    assert!(!conn.in_transaction());
    let row = conn
        .query_one("SELECT COUNT(*) FROM t", &[])
        .unwrap()
        .unwrap();
    assert_eq!(row.get_as::<i64>(0).unwrap(), 0);
}

#[test]
fn statement_pooling_follows_config() {
    let manager = manager("it_pool_statements", 1);
    let conn = manager.get_connection().unwrap();
    for _ in 0..3 {
        conn.query("SELECT 1", &[]).unwrap();
    }
    assert!(conn.cached_statements() >= 1);
    drop(conn);

    let config = ConnectionManagerConfig::new(
        "jdbc:sqlite:file:it_pool_no_statements?mode=memory&cache=shared",
    )
    .statement_pooling(false);
    let manager = ConnectionManager::new(config).unwrap();
    let conn = manager.get_connection().unwrap();
    conn.query("SELECT 1", &[]).unwrap();
    assert_eq!(conn.cached_statements(), 0);
}
