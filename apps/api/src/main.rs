mod analysis;
mod chat;
mod config;
mod documents;
mod errors;
mod extraction;
mod llm_client;
mod models;
mod routes;
mod scoring;
mod session;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, ExtractionBackend};
use crate::extraction::{Extractor, KeywordExtractor, LlmExtractor};
use crate::llm_client::{LanguageModel, LlmClient};
use crate::routes::build_router;
use crate::session::SessionStore;
use crate::state::AppState;

const SESSION_SWEEP_SECS: u64 = 60;

#[tokio::main]
async fn main() -> Result<()> {
    // Configuration first: a missing API key stops startup here
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http=info",
                env!("CARGO_PKG_NAME"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Recruiter v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let llm: Arc<dyn LanguageModel> = Arc::new(LlmClient::new(&config)?);
    info!("LLM client initialized (model: {})", llm.model_name());

    let extractor: Arc<dyn Extractor> = match config.extraction_backend {
        ExtractionBackend::Llm => Arc::new(LlmExtractor(llm.clone())),
        ExtractionBackend::Keyword => Arc::new(KeywordExtractor),
    };
    info!("Extraction backend: {}", extractor.backend());

    let sessions = SessionStore::default();
    let _sweeper = sessions.spawn_sweeper(
        Duration::from_secs(SESSION_SWEEP_SECS),
        Duration::from_secs(config.session_idle_secs),
    );
    info!("Idle sessions expire after {}s", config.session_idle_secs);

    let state = AppState {
        sessions,
        llm,
        extractor,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
