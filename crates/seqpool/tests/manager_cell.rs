//! Process-wide manager holder under concurrent first use.

use seqpool::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

fn config(name: &str) -> ConnectionManagerConfig {
    ConnectionManagerConfig::new(format!("jdbc:sqlite:file:{name}?mode=memory&cache=shared"))
}

#[test]
fn concurrent_first_use_builds_one_manager() {
    let cell = Arc::new(ManagerCell::new(config("it_cell_concurrent")));
    let inits = Arc::new(AtomicUsize::new(0));
    let barrier = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let cell = Arc::clone(&cell);
            let inits = Arc::clone(&inits);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                cell.get_or_init_with(|config| {
                    inits.fetch_add(1, Ordering::SeqCst);
                    ConnectionManager::new(config.clone())
                })
                .unwrap()
            })
        })
        .collect();

    let managers: Vec<Arc<ConnectionManager>> =
        handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(inits.load(Ordering::SeqCst), 1);
    for manager in &managers[1..] {
        assert!(Arc::ptr_eq(&managers[0], manager));
    }
    assert_eq!(managers[0].stats().total_connections, 1);
}

#[test]
fn failed_init_is_retried() {
    let cell = ManagerCell::new(config("it_cell_retry"));
    let err = cell
        .get_or_init_with(|_| Err(Error::config("database unavailable")))
        .unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert!(cell.get().is_none());

    let manager = cell.get_or_init().unwrap();
    assert!(Arc::ptr_eq(&manager, &cell.get_or_init().unwrap()));
}

#[test]
fn metadata_is_stable_across_calls() {
    let cell = ManagerCell::new(config("it_cell_metadata"));
    let manager = cell.get_or_init().unwrap();

    for _ in 0..3 {
        let again = cell.get_or_init().unwrap();
        assert!(std::ptr::eq(again.database_type(), manager.database_type()));
        assert_eq!(again.time_zone(), TimeZone::UTC);
        assert_eq!(again.database_identifier(), "SQLITE_MEMORY");
        assert!(again.create_bulk_loader().is_none());
    }
}

#[test]
fn usable_as_connection_source() {
    fn describe<S: ConnectionSource>(source: &S) -> String {
        format!("{}@{}", source.identifier(), source.timezone())
    }

    let cell = ManagerCell::new(config("it_cell_source").database_identifier("ORDERS"));
    let manager = cell.get_or_init().unwrap();
    assert_eq!(describe(&*manager), "ORDERS@UTC");

    let conn = manager.acquire().unwrap();
    conn.ping().unwrap();
}
