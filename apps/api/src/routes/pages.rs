//! Server-rendered pages: upload form, ranking table, candidate details, chat.
//! Errors are shown inline on the page rather than as JSON.

use askama::Template;
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::analysis::analyze;
use crate::chat;
use crate::errors::AppError;
use crate::models::candidate::Candidate;
use crate::models::conversation::Role;
use crate::routes::upload::read_batch;
use crate::session::Session;
use crate::state::AppState;

const NO_EXPERIENCE: &str = "Could not automatically extract experience.";
const NO_EDUCATION: &str = "Could not automatically extract education.";
const NO_PROJECTS: &str = "No projects section found.";

#[derive(Template)]
#[template(path = "index.html")]
struct IndexPage {
    error: String,
}

#[derive(Template)]
#[template(path = "session.html")]
struct SessionPage {
    session_id: String,
    analyzed: bool,
    job_name: String,
    job_skills: String,
    rows: Vec<CandidateRow>,
    skipped: Vec<SkippedRow>,
    transcript: Vec<TranscriptRow>,
    error: String,
    model: String,
}

struct CandidateRow {
    rank: usize,
    name: String,
    skills: String,
    matched_skills: String,
    match_percentage: String,
    match_score: usize,
    experience: Vec<String>,
    education: Vec<String>,
    projects: Vec<String>,
}

struct SkippedRow {
    file_name: String,
    reason: String,
}

struct TranscriptRow {
    css_class: &'static str,
    speaker: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatForm {
    pub question: String,
}

fn or_placeholder(entries: &[String], placeholder: &str) -> Vec<String> {
    if entries.is_empty() {
        vec![placeholder.to_string()]
    } else {
        entries.to_vec()
    }
}

impl CandidateRow {
    fn new(rank: usize, candidate: &Candidate) -> Self {
        Self {
            rank,
            name: candidate.name.clone(),
            skills: candidate.profile.skills.join(", "),
            matched_skills: candidate.score.matched_skills.join(", "),
            match_percentage: format!("{:.2}", candidate.score.percentage),
            match_score: candidate.score.matched,
            experience: or_placeholder(&candidate.profile.experience, NO_EXPERIENCE),
            education: or_placeholder(&candidate.profile.education, NO_EDUCATION),
            projects: or_placeholder(&candidate.profile.projects, NO_PROJECTS),
        }
    }
}

impl SessionPage {
    fn from_session(session: &Session, model: &str) -> Self {
        Self {
            session_id: session.id.to_string(),
            analyzed: session.is_analyzed(),
            job_name: session
                .job
                .as_ref()
                .map(|j| j.name.clone())
                .unwrap_or_default(),
            job_skills: session
                .job
                .as_ref()
                .map(|j| j.profile.skills.join(", "))
                .unwrap_or_default(),
            rows: session
                .candidates
                .iter()
                .enumerate()
                .map(|(i, c)| CandidateRow::new(i + 1, c))
                .collect(),
            skipped: session
                .skipped
                .iter()
                .map(|s| SkippedRow {
                    file_name: s.file_name.clone(),
                    reason: s.reason.clone(),
                })
                .collect(),
            transcript: session
                .conversation
                .messages()
                .iter()
                .map(|m| match m.role {
                    Role::User => TranscriptRow {
                        css_class: "user",
                        speaker: "You",
                        content: m.content.clone(),
                    },
                    Role::Assistant => TranscriptRow {
                        css_class: "assistant",
                        speaker: "Assistant",
                        content: m.content.clone(),
                    },
                })
                .collect(),
            error: session.last_error.clone().unwrap_or_default(),
            model: model.to_string(),
        }
    }
}

fn render_index(status: StatusCode, error: String) -> Result<Response, AppError> {
    let page = IndexPage { error };
    Ok((status, Html(page.render()?)).into_response())
}

fn session_url(id: Uuid) -> String {
    format!("/sessions/{id}")
}

/// GET /
pub async fn index() -> Result<Response, AppError> {
    render_index(StatusCode::OK, String::new())
}

/// POST /analyze
///
/// Runs the analysis first and only creates a session when it succeeds.
pub async fn analyze_new(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let result = match read_batch(multipart).await {
        Ok(batch) => analyze(batch, state.extractor.as_ref()).await,
        Err(e) => Err(e),
    };
    let analysis = match result {
        Ok(analysis) => analysis,
        Err(e) => return render_index(StatusCode::UNPROCESSABLE_ENTITY, e.user_message()),
    };

    let (id, handle) = state.sessions.create().await;
    handle.lock().await.apply_analysis(analysis);
    Ok(Redirect::to(&session_url(id)).into_response())
}

/// GET /sessions/:id
pub async fn show_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let Some(handle) = state.sessions.get(id).await else {
        return render_index(
            StatusCode::NOT_FOUND,
            "That session no longer exists. Upload the documents again.".to_string(),
        );
    };
    let session = handle.lock().await;
    let page = SessionPage::from_session(&session, state.llm.model_name());
    Ok(Html(page.render()?).into_response())
}

/// POST /sessions/:id/analyze
pub async fn reanalyze(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let Some(handle) = state.sessions.get(id).await else {
        return Ok(Redirect::to("/").into_response());
    };
    let result = match read_batch(multipart).await {
        Ok(batch) => analyze(batch, state.extractor.as_ref()).await,
        Err(e) => Err(e),
    };

    let mut session = handle.lock().await;
    match result {
        Ok(analysis) => session.apply_analysis(analysis),
        Err(e) => session.last_error = Some(e.user_message()),
    }
    Ok(Redirect::to(&session_url(id)).into_response())
}

/// POST /sessions/:id/chat
pub async fn ask(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Form(form): Form<ChatForm>,
) -> Result<Response, AppError> {
    let Some(handle) = state.sessions.get(id).await else {
        return Ok(Redirect::to("/").into_response());
    };
    let mut session = handle.lock().await;
    if let Err(e) = chat::ask(&mut session, &form.question, state.llm.as_ref()).await {
        session.last_error = Some(e.user_message());
    }
    Ok(Redirect::to(&format!("{}#chat", session_url(id))).into_response())
}

/// POST /sessions/:id/chat/clear
pub async fn clear_chat(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    if let Some(handle) = state.sessions.get(id).await {
        chat::clear(&mut *handle.lock().await);
    }
    Ok(Redirect::to(&session_url(id)).into_response())
}
