//! Email Topics Service - Main Entry Point
//!
//! Clusters batches of emails into labeled topics over HTTP.

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use email_topics::config::Config;
use email_topics::handlers::{create_app, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before reading RUST_LOG or any service settings
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "email_topics=info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    info!("🚀 Starting Email Topics Service v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "📦 Embedding backend: {} ({}, {}D)",
        config.embedding_backend.as_str(),
        config.model_name,
        config.model_dimension
    );
    info!("🔧 Port: {}", config.port);

    let state = Arc::new(AppState::new(config.clone()));
    info!(
        "✅ Embeddings served by '{}' backend",
        state.orchestrator.backend()
    );

    let app = create_app(state);

    let ip = config
        .host
        .parse::<std::net::IpAddr>()
        .with_context(|| format!("invalid HOST: {}", config.host))?;
    let addr = SocketAddr::new(ip, config.port);
    info!("✅ Email Topics Service listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
