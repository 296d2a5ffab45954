mod analysis;
mod config;
mod errors;
mod extract;
mod llm_client;
mod report;
mod routes;
mod state;
mod storage;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::{LlmClient, LlmSettings};
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::{spawn_sweeper, FileStore};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log,
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume-match v{}", env!("CARGO_PKG_VERSION"));

    // Ephemeral upload store and its background sweep
    let store = Arc::new(
        FileStore::new(&config.upload_dir, config.file_ttl).with_context(|| {
            format!(
                "Failed to prepare upload directory {}",
                config.upload_dir.display()
            )
        })?,
    );
    let sweeper = spawn_sweeper(Arc::clone(&store), config.sweep_interval);
    info!(
        "File store at {} (ttl {}s, sweep every {}s)",
        store.dir().display(),
        config.file_ttl.as_secs(),
        config.sweep_interval.as_secs()
    );

    // Initialize LLM client
    let llm = LlmClient::new(LlmSettings {
        api_key: config.openai_api_key.clone(),
        base_url: config.openai_base_url.clone(),
        model: config.openai_model.clone(),
        timeout: config.llm_timeout,
    })
    .context("Failed to build HTTP client for the analysis service")?;
    if llm.has_credential() {
        info!("LLM client initialized (model: {})", llm.model());
    } else {
        warn!("OPENAI_API_KEY is not set; every analysis request will fail until it is configured");
    }

    let state = AppState {
        store,
        provider: Arc::new(llm),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.stop().await;
    info!("Shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
