//! Test server harness.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use roomlens::decompose::{HeuristicDecomposer, HeuristicKind};
use roomlens::gateway::{AppState, create_router_with_state};
use roomlens::matcher::ExplainableMatcher;
use roomlens::storage::{ImageStore, InMemoryMatchStore};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use super::fixtures::kitchen_embedder;

const STARTUP_WAIT_TIMEOUT_SECS: u64 = 5;
const STARTUP_POLL_INTERVAL_MS: u64 = 50;

#[derive(Debug, Clone)]
pub struct TestServerConfig {
    pub heuristic: HeuristicKind,
    pub max_upload_bytes: usize,
}

impl Default for TestServerConfig {
    fn default() -> Self {
        Self {
            heuristic: HeuristicKind::Pattern,
            max_upload_bytes: 1024 * 1024,
        }
    }
}

pub struct TestServer {
    pub addr: SocketAddr,
    pub upload_dir: PathBuf,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    _temp_dir: TempDir,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}/{}", self.addr, path.trim_start_matches('/'))
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServerStartupError {
    #[error("Server failed to start within timeout")]
    Timeout,
    #[error("Failed to bind to address: {0}")]
    BindError(#[from] std::io::Error),
    #[error("Server startup failed: {0}")]
    StartupFailed(String),
}

pub async fn wait_for_server_ready(
    addr: SocketAddr,
    timeout: Duration,
    interval: Duration,
) -> Result<(), ServerStartupError> {
    let start = std::time::Instant::now();

    loop {
        if start.elapsed() > timeout {
            return Err(ServerStartupError::Timeout);
        }

        match tokio::net::TcpStream::connect(addr).await {
            Ok(_) => return Ok(()),
            Err(_) => tokio::time::sleep(interval).await,
        }
    }
}

/// Spawns a server on an ephemeral port with a scripted embedder, a heuristic
/// decomposer and an in-memory store over a temp upload directory.
pub async fn spawn_test_server(config: TestServerConfig) -> Result<TestServer, ServerStartupError> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let temp_dir = TempDir::new()?;
    let upload_dir = temp_dir.path().join("uploads");

    let images = ImageStore::new(upload_dir.clone());
    images
        .ensure_root()
        .map_err(|e| ServerStartupError::StartupFailed(e.to_string()))?;

    let decomposer = HeuristicDecomposer::new(config.heuristic)
        .map_err(|e| ServerStartupError::StartupFailed(e.to_string()))?;
    let matcher = ExplainableMatcher::new(Arc::new(kitchen_embedder()), Arc::new(decomposer));

    let state = AppState::new(
        Arc::new(matcher),
        Arc::new(InMemoryMatchStore::new(images)),
        upload_dir.clone(),
        config.max_upload_bytes,
    );
    let app = create_router_with_state(state);

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .unwrap();
    });

    wait_for_server_ready(
        addr,
        Duration::from_secs(STARTUP_WAIT_TIMEOUT_SECS),
        Duration::from_millis(STARTUP_POLL_INTERVAL_MS),
    )
    .await?;

    Ok(TestServer {
        addr,
        upload_dir,
        _server_handle: server_handle,
        shutdown_tx: Some(shutdown_tx),
        _temp_dir: temp_dir,
    })
}
