//! Chat: free-text questions about the analyzed candidate pool.
//!
//! Each question is sent together with the full transcript and the candidate
//! dataset. The user turn is recorded before the call; the assistant turn only
//! when the call succeeds.

pub mod prompts;

use std::fmt::Write;

use tracing::{info, warn};

use crate::chat::prompts::chat_system_prompt;
use crate::errors::AppError;
use crate::llm_client::prompts::GROUNDING_INSTRUCTION;
use crate::llm_client::LanguageModel;
use crate::models::candidate::{Candidate, JobDescription};
use crate::models::conversation::{ChatMessage, Role};
use crate::session::Session;

pub async fn ask(
    session: &mut Session,
    question: &str,
    llm: &dyn LanguageModel,
) -> Result<String, AppError> {
    let question = question.trim();
    if question.is_empty() {
        return Err(AppError::Validation("Question cannot be empty".to_string()));
    }
    let Some(job) = session.job.as_ref() else {
        return Err(AppError::Validation(
            "Run an analysis before asking questions".to_string(),
        ));
    };

    let system = build_system_prompt(job, &session.candidates);
    session.conversation.push(ChatMessage::user(question));

    let turns = answered_turns(session.conversation.messages());
    let result = llm.generate(&system, &turns).await;
    match result {
        Ok(answer) => {
            info!(
                "Session {} chat answered by {} (question {})",
                session.id,
                llm.model_name(),
                session.conversation.count(Role::User)
            );
            session.conversation.push(ChatMessage::assistant(answer.clone()));
            session.last_error = None;
            Ok(answer)
        }
        Err(e) => {
            warn!("Session {} chat failed: {e}", session.id);
            let err = AppError::Llm(e);
            session.last_error = Some(err.user_message());
            Err(err)
        }
    }
}

pub fn clear(session: &mut Session) {
    session.conversation.clear();
    session.last_error = None;
}

pub fn build_system_prompt(job: &JobDescription, candidates: &[Candidate]) -> String {
    chat_system_prompt(
        GROUNDING_INSTRUCTION,
        &ranking_summary(candidates),
        &document_context(job, candidates),
    )
}

/// The turns sent to the model: the transcript minus user questions that never
/// got a reply, so roles strictly alternate and end with the newest question.
fn answered_turns(messages: &[ChatMessage]) -> Vec<ChatMessage> {
    let last = messages.len().saturating_sub(1);
    messages
        .iter()
        .enumerate()
        .filter(|(i, m)| {
            m.role == Role::Assistant
                || *i == last
                || messages.get(i + 1).is_some_and(|next| next.role == Role::Assistant)
        })
        .map(|(_, m)| m.clone())
        .collect()
}

fn ranking_summary(candidates: &[Candidate]) -> String {
    if candidates.is_empty() {
        return "No resumes were analyzed.".to_string();
    }
    let mut out = String::new();
    for (rank, c) in candidates.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. {} - match {:.2}% ({} skills matched); skills: {}",
            rank + 1,
            c.name,
            c.score.percentage,
            c.score.matched,
            c.profile.skills.join(", ")
        );
    }
    out.trim_end().to_string()
}

/// Job description text followed by every resume's text.
fn document_context(job: &JobDescription, candidates: &[Candidate]) -> String {
    let mut out = format!("**JOB DESCRIPTION:**\n{}", job.raw_text);
    for c in candidates {
        let _ = write!(out, "\n\n--- RESUME: {} ---\n{}", c.name, c.raw_text);
    }
    out
}
