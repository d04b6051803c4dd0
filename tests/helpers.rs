// Shared helpers for the integration tests.

use std::time::Duration;

use httptest::{Server, ServerBuilder};
use tempfile::TempDir;

use centinela::{list_history, AnalysisRecord, Config};

/// A config whose broker and result store live in `dir`.
///
/// Broker connection fails fast so a misconfigured test does not hang.
pub fn test_config(dir: &TempDir) -> Config {
    Config {
        queue_url: format!("sqlite://{}", dir.path().join("queue.db").display()),
        database_url: format!("sqlite://{}", dir.path().join("results.db").display()),
        broker_connect_attempts: 2,
        broker_connect_delay_secs: 0,
        fetch_timeout_secs: 5,
        ..Default::default()
    }
}

/// Polls the result store until it holds at least `count` records.
#[allow(dead_code)] // Not every test file waits on the store
pub async fn wait_for_records(config: &Config, count: usize) -> Vec<AnalysisRecord> {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(20);
    loop {
        let records = list_history(config, None, 100)
            .await
            .expect("history should be readable");
        if records.len() >= count {
            return records;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "expected {} records, found {}",
            count,
            records.len()
        );
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}

/// An `httptest` server bound to IPv4 loopback.
///
/// `Server::run` may pick `[::1]` depending on the host, and several scoring
/// assertions depend on the target being an IPv4 literal.
#[allow(dead_code)]
pub fn ipv4_server() -> Server {
    ServerBuilder::new()
        .bind_addr(([127, 0, 0, 1], 0).into())
        .run()
        .expect("bind IPv4 loopback")
}

/// A loopback port nothing listens on.
#[allow(dead_code)]
pub fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    listener.local_addr().expect("addr").port()
}
