//! Test server lifecycle management
//!
//! Each test gets an isolated server with its own content database.

use super::constants::*;
use super::fixtures::create_test_content_db;
use download_listing_server::listing::ListingSettings;
use download_listing_server::{
    make_app, open_content_db, RequestsLoggingLevel, ServerConfig, SqliteContentElementStore,
    SqliteDownloadRepository, SqlitePageTree,
};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Test server instance with an isolated content database
///
/// When dropped, the server gracefully shuts down and the temp dir is removed.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    // Private fields - keep resources alive until drop
    _temp_db_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a server with default listing settings `recursion_depth = 2`.
    pub async fn spawn() -> Self {
        Self::spawn_with_defaults([("recursion_depth", "2")].into_iter().collect()).await
    }

    pub async fn spawn_with_defaults(listing_defaults: ListingSettings) -> Self {
        let (temp_db_dir, db_path) =
            create_test_content_db().expect("Failed to create test content database");
        let conn = open_content_db(&db_path).expect("Failed to open content database");

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            port,
            requests_logging_level: RequestsLoggingLevel::None,
            content_cache_age_sec: CONTENT_CACHE_AGE_SEC,
            listing_defaults,
            ..Default::default()
        };

        let app = make_app(
            config,
            Arc::new(SqliteDownloadRepository::new(conn.clone())),
            Arc::new(SqlitePageTree::new(conn.clone())),
            Arc::new(SqliteContentElementStore::new(conn)),
        )
        .expect("Failed to build app");

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            _temp_db_dir: temp_db_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        reqwest::get(format!("{}{}", self.base_url, path))
            .await
            .expect("Request failed")
    }

    /// Waits for the server to become ready by polling the home endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
