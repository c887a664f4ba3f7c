mod analysis;
mod config;
mod db;
mod documents;
mod errors;
mod extraction;
mod llm_client;
mod matching;
mod models;
mod retry;
mod routes;
mod state;
mod storage;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::Mutex;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::{create_pool, migrate};
use crate::llm_client::LlmClient;
use crate::matching::reasoning::ReasoningMatcher;
use crate::matching::similarity::SimilarityMatcher;
use crate::matching::{MatchStrategy, StrategyKind};
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::BlobStore;

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

    info!("Starting resume match API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let pool = create_pool(&config.database_url).await?;
    migrate(&pool).await?;

    // Initialize blob store
    let store = BlobStore::from_config(&config).await;
    info!("Blob store client initialized");

    // Initialize LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone());
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Select the match engine backend from run configuration — never by which
    // implementation happens to be imported.
    let matcher: Arc<dyn MatchStrategy> = match config.match_strategy {
        StrategyKind::Similarity => Arc::new(SimilarityMatcher::new(config.score_threshold)),
        StrategyKind::Reasoning => Arc::new(ReasoningMatcher::new(llm.clone())),
    };
    info!("Match strategy: {}", matcher.name());

    // Build app state
    let state = AppState {
        db: pool,
        store,
        llm,
        config: config.clone(),
        matcher,
        run_lock: Arc::new(Mutex::new(())),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
