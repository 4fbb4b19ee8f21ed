use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service status, version and the active model backends.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "recruiter",
        "model": state.llm.model_name(),
        "extraction_backend": state.extractor.backend(),
        "sessions": state.sessions.len().await,
    }))
}
