//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use labbooker::clock::FixedClock;
use labbooker::config::ServerConfig;
use labbooker::http::{AppState, HttpServer};
use labbooker::policy::PolicyStore;
use labbooker::Shutdown;
use tokio::net::TcpListener;

/// Monday 2025-03-10 09:00 UTC, the frozen "now" of every test server.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap()
}

pub struct TestServer {
    pub addr: SocketAddr,
    pub client: reqwest::Client,
    shutdown: Shutdown,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start a server on an ephemeral port with the clock frozen at `at`.
pub async fn spawn_server_at(at: DateTime<Utc>) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let state = AppState::new(Arc::new(PolicyStore::new()), Arc::new(FixedClock(at)));
    let server = HttpServer::with_state(ServerConfig::default(), state);

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    // Listener is already bound; give the accept loop a moment to start.
    tokio::time::sleep(Duration::from_millis(50)).await;

    let client = reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap();

    TestServer { addr, client, shutdown }
}

pub async fn spawn_server() -> TestServer {
    spawn_server_at(now()).await
}
