mod config;
mod errors;
mod layout;
mod llm_client;
mod optimization;
mod render;
mod routes;
mod state;
mod storage;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::layout::default_page_config;
use crate::llm_client::GeminiClient;
use crate::render::DocumentRenderer;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::FsDocumentStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CV Optimizer API v{}", env!("CARGO_PKG_VERSION"));

    // Output directory: created once if absent, never cleaned
    let store = FsDocumentStore::new(config.output_dir.clone()).with_context(|| {
        format!(
            "Failed to create output directory {}",
            config.output_dir.display()
        )
    })?;
    info!("Document store ready at {}", store.root().display());
    let store = Arc::new(store);

    // Initialize generator client
    let gemini = GeminiClient::new(config.gemini_settings())
        .context("Failed to build Gemini HTTP client")?;
    info!(
        "Gemini client initialized (model: {}, timeout: {}s, attempts: {})",
        gemini.model(),
        config.gemini_timeout_secs,
        config.gemini_max_attempts.max(1)
    );

    let page_config = default_page_config(config.pdf_font, config.pdf_font_size_pt);
    info!(
        "PDF page config: {:?} {}pt",
        page_config.font, page_config.font_size_pt
    );

    // Build app state
    let state = AppState {
        config: config.clone(),
        generator: Arc::new(gemini),
        store: store.clone(),
        renderer: DocumentRenderer::new(page_config, store),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
