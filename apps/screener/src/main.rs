mod analysis;
mod config;
mod dashboard;
mod errors;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::client::HttpAnalysisClient;
use crate::analysis::orchestrator::Orchestrator;
use crate::config::Config;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting screener gateway v{}", env!("CARGO_PKG_VERSION"));

    let client = HttpAnalysisClient::new(&config.analysis_service_url, config.request_timeout)?;
    info!(
        "Analysis client initialized (endpoint: {}, timeout: {}s)",
        client.endpoint(),
        config.request_timeout.as_secs()
    );

    let policy = config.submission_policy();
    info!(
        "Submission policy: max {} bytes per resume, min {} JD chars",
        policy.upload.max_size_bytes, policy.min_job_description_chars
    );

    let state = AppState {
        orchestrator: Orchestrator::new(Arc::new(client), policy),
    };

    let app = build_router(state, config.upload_body_limit_bytes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict to the dashboard origin once it is configurable

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
