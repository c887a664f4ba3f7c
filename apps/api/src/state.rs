use std::sync::Arc;

use sqlx::PgPool;
use tokio::sync::Mutex;

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::matching::MatchStrategy;
use crate::storage::BlobStore;

/// Shared application state injected into all route handlers via Axum
/// extractors. Collaborators are explicit instances created once per process
/// — there is no lazily-initialized global service handle anywhere.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub store: BlobStore,
    pub llm: LlmClient,
    pub config: Config,
    /// Pluggable match engine backend, selected by `Config::match_strategy`.
    pub matcher: Arc<dyn MatchStrategy>,
    /// Exclusive "analysis in progress" marker. A second trigger while a run
    /// holds this gets 409 instead of interleaving writes into the result.
    pub run_lock: Arc<Mutex<()>>,
}
