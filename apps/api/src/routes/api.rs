//! JSON API handlers.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::{analyze, replace_job_description};
use crate::chat;
use crate::errors::AppError;
use crate::models::candidate::{Candidate, JobDescription, SkippedUpload};
use crate::models::conversation::ChatMessage;
use crate::routes::session_handle;
use crate::routes::upload::read_batch;
use crate::scoring::word_overlap_score;
use crate::session::Session;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SessionCreated {
    pub session_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct RankingResponse {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub job_description: Option<JobDescription>,
    pub candidates: Vec<Candidate>,
    pub skipped: Vec<SkippedUpload>,
}

impl RankingResponse {
    fn from_session(session: &Session) -> Self {
        Self {
            session_id: session.id,
            created_at: session.created_at,
            job_description: session.job.clone(),
            candidates: session.candidates.clone(),
            skipped: session.skipped.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
    pub transcript: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
pub struct TranscriptResponse {
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    pub resume: String,
    pub job_description: String,
}

#[derive(Debug, Serialize)]
pub struct ScoreResponse {
    pub match_score_percent: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionCreated>) {
    let (session_id, _) = state.sessions.create().await;
    (StatusCode::CREATED, Json(SessionCreated { session_id }))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.sessions.remove(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Session {id} not found")))
    }
}

/// POST /api/v1/sessions/:id/analyze
///
/// Multipart: one `job_description` file and any number of `resumes` files.
/// Replaces previous results and resets the conversation.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<RankingResponse>, AppError> {
    let handle = session_handle(&state, id).await?;
    let batch = read_batch(multipart).await?;
    let analysis = analyze(batch, state.extractor.as_ref()).await?;

    let mut session = handle.lock().await;
    session.apply_analysis(analysis);
    Ok(Json(RankingResponse::from_session(&session)))
}

/// PUT /api/v1/sessions/:id/job-description
///
/// Multipart: one `job_description` file. Rescores the existing candidates.
pub async fn handle_replace_job_description(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<RankingResponse>, AppError> {
    let handle = session_handle(&state, id).await?;
    let upload = read_batch(multipart)
        .await?
        .job_description
        .ok_or_else(|| AppError::Validation("A job description file is required".to_string()))?;

    let mut session = handle.lock().await;
    replace_job_description(&mut session, upload, state.extractor.as_ref()).await?;
    Ok(Json(RankingResponse::from_session(&session)))
}

/// GET /api/v1/sessions/:id/candidates
pub async fn handle_get_candidates(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RankingResponse>, AppError> {
    let handle = session_handle(&state, id).await?;
    let session = handle.lock().await;
    Ok(Json(RankingResponse::from_session(&session)))
}

/// GET /api/v1/sessions/:id/candidates/:candidate_id
pub async fn handle_get_candidate(
    State(state): State<AppState>,
    Path((id, candidate_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Candidate>, AppError> {
    let handle = session_handle(&state, id).await?;
    let session = handle.lock().await;
    session
        .candidate(candidate_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Candidate {candidate_id} not found")))
}

/// POST /api/v1/sessions/:id/chat
pub async fn handle_chat(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let handle = session_handle(&state, id).await?;
    let mut session = handle.lock().await;
    let reply = chat::ask(&mut session, &request.message, state.llm.as_ref()).await?;
    Ok(Json(ChatResponse {
        reply,
        transcript: session.conversation.messages().to_vec(),
    }))
}

/// GET /api/v1/sessions/:id/chat
pub async fn handle_get_chat(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TranscriptResponse>, AppError> {
    let handle = session_handle(&state, id).await?;
    let session = handle.lock().await;
    Ok(Json(TranscriptResponse {
        messages: session.conversation.messages().to_vec(),
    }))
}

/// DELETE /api/v1/sessions/:id/chat
pub async fn handle_clear_chat(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let handle = session_handle(&state, id).await?;
    chat::clear(&mut *handle.lock().await);
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/score
///
/// Word-overlap score between raw resume and job description text.
pub async fn handle_score(Json(request): Json<ScoreRequest>) -> Json<ScoreResponse> {
    let score = word_overlap_score(&request.resume, &request.job_description);
    Json(ScoreResponse {
        match_score_percent: format!("{score:.2}"),
    })
}
