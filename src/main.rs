//! RoomLens HTTP server entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use roomlens::config::Config;
use roomlens::decompose::{DecomposerConfig, build_decomposer};
use roomlens::embedding::ClipEmbedder;
use roomlens::gateway::{AppState, create_router_with_state};
use roomlens::matcher::ExplainableMatcher;
use roomlens::narrative::Narrator;
use roomlens::scoring::FeatureScorer;
use roomlens::storage::{ImageStore, InMemoryMatchStore};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::args().any(|arg| arg == "--health-check") {
        std::process::exit(run_health_check());
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;
    let addr: SocketAddr = config.socket_addr().parse()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        upload_dir = %config.upload_dir.display(),
        "RoomLens starting"
    );

    if config.model_dir.is_none() {
        tracing::warn!("No ROOMLENS_MODEL_DIR configured, running embedder in stub mode");
    }
    let embedder = ClipEmbedder::load(config.clip_config())?;

    let decomposer = build_decomposer(&DecomposerConfig::from_env())?;

    let matcher = ExplainableMatcher::new(Arc::new(embedder), decomposer)
        .with_scorer(FeatureScorer::new(config.thresholds))
        .with_narrator(Narrator::with_config(config.narrator_config()));

    let images = ImageStore::new(config.upload_dir.clone());
    images.ensure_root()?;
    let store = match &config.data_file {
        Some(path) => InMemoryMatchStore::open(images, path)?,
        None => {
            tracing::warn!("ROOMLENS_DATA_FILE is blank, match history is kept in memory only");
            InMemoryMatchStore::new(images)
        }
    };

    let state = AppState::new(
        Arc::new(matcher),
        Arc::new(store),
        config.upload_dir.clone(),
        config.max_upload_bytes,
    );

    let app = create_router_with_state(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("RoomLens shutdown complete");
    Ok(())
}

fn run_health_check() -> i32 {
    let port = std::env::var("ROOMLENS_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    let url = format!("http://127.0.0.1:{}/healthz", port);

    let Ok(rt) = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    else {
        return 1;
    };

    rt.block_on(async {
        let Ok(client) = reqwest::Client::builder()
            .timeout(Duration::from_secs(1))
            .build()
        else {
            return 1;
        };

        match client.get(&url).send().await {
            Ok(res) if res.status().is_success() => 0,
            _ => 1,
        }
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
