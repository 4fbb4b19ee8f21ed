use std::sync::Arc;

use crate::config::Config;
use crate::extraction::Extractor;
use crate::llm_client::LanguageModel;
use crate::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    /// Hosted model used for chat (and for extraction when the LLM backend is selected).
    pub llm: Arc<dyn LanguageModel>,
    /// Pluggable extractor. Default: LlmExtractor. Swap via EXTRACTION_BACKEND.
    pub extractor: Arc<dyn Extractor>,
    pub config: Config,
}
