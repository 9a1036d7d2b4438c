//! Tests for ConnectionPool
//!
//! These tests verify:
//! - Config validation
//! - Round-robin connection selection
//! - Commands spread over every connection
//! - Pool-wide flush fans out and completes once

#[path = "../common/mod.rs"]
mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use common::{recv, wait_until, FakeServer};
use crossbeam::channel;
use mcpipe::{Client, CommandOptions, Config, ConnectionPool, McError, Status};

// =============================================================================
// Config Tests
// =============================================================================

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.host, "localhost");
    assert_eq!(config.port, 11211);
    assert_eq!(config.connections, 4);
    assert_eq!(config.addr(), "localhost:11211");
}

#[test]
fn test_zero_connections_rejected() {
    let config = Config::builder().connections(0).build();

    match ConnectionPool::connect(&config) {
        Err(McError::Config(_)) => {}
        Err(e) => panic!("Expected config error, got {}", e),
        Ok(_) => panic!("Expected config error, got a pool"),
    }
}

#[test]
fn test_empty_host_rejected() {
    let config = Config::builder().host("").build();

    assert!(matches!(config.validate(), Err(McError::Config(_))));
}

// =============================================================================
// Round-Robin Tests
// =============================================================================

#[test]
fn test_next_connection_round_robin() {
    let server = FakeServer::start();
    let pool = ConnectionPool::connect(&server.config(3)).unwrap();

    let ids: Vec<usize> = (0..7).map(|_| pool.next_connection().id()).collect();

    assert_eq!(ids, vec![0, 1, 2, 0, 1, 2, 0]);
    assert_eq!(pool.len(), 3);
    assert!(pool.connections().iter().all(|c| c.addr() == server.addr()));
}

#[test]
fn test_commands_spread_across_connections() {
    let server = FakeServer::start();
    let pool = ConnectionPool::connect(&server.config(3)).unwrap();
    let (tx, rx) = channel::unbounded();

    for i in 0..6 {
        let tx = tx.clone();
        pool.set(format!("k{}", i), "v", CommandOptions::raw(), move |s| {
            tx.send(s).unwrap()
        })
        .unwrap();
    }
    for _ in 0..6 {
        assert_eq!(recv(&rx), Status::Stored);
    }

    assert!(wait_until(|| server.accepted() == 3));
    for i in 0..6 {
        assert!(server.item(format!("k{}", i).as_bytes()).is_some());
    }
}

// =============================================================================
// Flush Fan-Out Tests
// =============================================================================

#[test]
fn test_flush_all_reaches_every_connection_and_completes_once() {
    let server = FakeServer::start();
    let pool = ConnectionPool::connect(&server.config(4)).unwrap();
    let fired = Arc::new(AtomicUsize::new(0));
    let (tx, rx) = channel::unbounded();

    let fired_clone = Arc::clone(&fired);
    pool.flush_all(move |status| {
        fired_clone.fetch_add(1, Ordering::SeqCst);
        tx.send(status).unwrap();
    })
    .unwrap();

    assert_eq!(recv(&rx), Status::Ok);
    thread::sleep(Duration::from_millis(50));
    assert_eq!(fired.load(Ordering::SeqCst), 1);

    let flushes = server
        .commands()
        .iter()
        .filter(|c| c.as_str() == "flush_all")
        .count();
    assert_eq!(flushes, 4);
}

#[test]
fn test_flush_all_noreply_reaches_every_connection() {
    let server = FakeServer::start();
    let pool = ConnectionPool::connect(&server.config(3)).unwrap();

    pool.flush_all_noreply().unwrap();

    assert!(wait_until(|| {
        server
            .commands()
            .iter()
            .filter(|c| c.as_str() == "flush_all noreply")
            .count()
            == 3
    }));
}
