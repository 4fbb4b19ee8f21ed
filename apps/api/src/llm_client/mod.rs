/// LLM Client: the single point of entry for all hosted model calls.
///
/// No other module may call the Gemini API directly. Extraction and chat go
/// through the `LanguageModel` trait so tests can swap in a scripted model.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{ApiKey, Config};
use crate::models::conversation::{ChatMessage, Role};

pub mod prompts;

const MAX_RETRIES: u32 = 3;
const BACKOFF_BASE: Duration = Duration::from_secs(1);
const TEMPERATURE: f32 = 0.2;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// A hosted generative model. `turns` alternate user and assistant messages
/// and must end with a user message.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(&self, system: &str, turns: &[ChatMessage]) -> Result<String, LlmError>;

    fn model_name(&self) -> &str;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: GeminiContent<'a>,
    contents: Vec<GeminiContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<ResponseCandidate>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseCandidate {
    pub content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
}

impl GenerateContentResponse {
    /// Concatenates the text parts of the first candidate.
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

/// Gemini `generateContent` client with retry on rate limits and server errors.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: ApiKey,
    api_base: String,
    model: String,
    backoff_base: Duration,
}

impl LlmClient {
    pub fn new(config: &Config) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.llm_timeout_secs))
                .build()?,
            api_key: config.gemini_api_key.clone(),
            api_base: config.gemini_api_base.clone(),
            model: config.gemini_model.clone(),
            backoff_base: BACKOFF_BASE,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }

    /// Makes a raw call to the Gemini API, returning the full response object.
    /// Retries on 429 (rate limit) and 5xx errors with exponential backoff.
    pub async fn call(
        &self,
        system: &str,
        turns: &[ChatMessage],
    ) -> Result<GenerateContentResponse, LlmError> {
        let request_body = build_request(system, turns);
        let url = self.endpoint();

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = self.backoff_base * (1 << (attempt - 1));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&url)
                .header("x-goog-api-key", self.api_key.expose())
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) if e.is_timeout() => return Err(LlmError::Http(e)),
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: parse_error_message(body),
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message: parse_error_message(body),
                });
            }

            let llm_response: GenerateContentResponse = response.json().await?;

            if let Some(usage) = &llm_response.usage_metadata {
                debug!(
                    "LLM call succeeded: model={}, prompt_tokens={}, output_tokens={}",
                    self.model, usage.prompt_token_count, usage.candidates_token_count
                );
            }

            return Ok(llm_response);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }
}

#[async_trait]
impl LanguageModel for LlmClient {
    async fn generate(&self, system: &str, turns: &[ChatMessage]) -> Result<String, LlmError> {
        let response = self.call(system, turns).await?;
        response.text().ok_or(LlmError::EmptyContent)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

fn build_request<'a>(system: &'a str, turns: &'a [ChatMessage]) -> GenerateContentRequest<'a> {
    GenerateContentRequest {
        system_instruction: GeminiContent {
            role: None,
            parts: vec![GeminiPart { text: system }],
        },
        contents: turns
            .iter()
            .map(|m| GeminiContent {
                role: Some(match m.role {
                    Role::User => "user",
                    Role::Assistant => "model",
                }),
                parts: vec![GeminiPart { text: &m.content }],
            })
            .collect(),
        generation_config: GenerationConfig {
            temperature: TEMPERATURE,
        },
    }
}

fn parse_error_message(body: String) -> String {
    serde_json::from_str::<GeminiError>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
pub mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// Replays canned replies in order and records every request it receives.
    #[derive(Default)]
    pub struct ScriptedModel {
        replies: Mutex<VecDeque<Result<String, LlmError>>>,
        pub requests: Mutex<Vec<(String, Vec<ChatMessage>)>>,
    }

    impl ScriptedModel {
        pub fn new(replies: Vec<Result<String, LlmError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl LanguageModel for ScriptedModel {
        async fn generate(
            &self,
            system: &str,
            turns: &[ChatMessage],
        ) -> Result<String, LlmError> {
            self.requests
                .lock()
                .unwrap()
                .push((system.to_string(), turns.to_vec()));
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(LlmError::EmptyContent))
        }

        fn model_name(&self) -> &str {
            "scripted"
        }
    }
}
