use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::documents::DocumentError;
use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unreadable document: {0}")]
    Document(#[from] DocumentError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

impl AppError {
    /// Message safe to show a user inline on a rendered page.
    pub fn user_message(&self) -> String {
        match self {
            AppError::NotFound(msg) | AppError::Validation(msg) => msg.clone(),
            AppError::Document(e) => e.to_string(),
            AppError::Llm(e) => format!("The model API request failed: {e}"),
            AppError::Template(_) => "An internal server error occurred".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Document(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNREADABLE_DOCUMENT",
                e.to_string(),
            ),
            AppError::Llm(e) => {
                tracing::error!("LLM error: {e}");
                let status = match e {
                    LlmError::Http(err) if err.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
                    _ => StatusCode::BAD_GATEWAY,
                };
                (status, "LLM_ERROR", "The model API request failed".to_string())
            }
            AppError::Template(e) => {
                tracing::error!("Template error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "TEMPLATE_ERROR",
                    "A rendering error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
