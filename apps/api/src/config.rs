use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

const DEFAULT_SECRETS_FILE: &str = "secrets.toml";
const PLACEHOLDER_API_KEY: &str = "YOUR_TOKEN_HERE";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_SESSION_IDLE_SECS: u64 = 60 * 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Gemini API key is not configured. Set GEMINI_API_KEY or add it to {0}")]
    MissingApiKey(String),

    #[error("Gemini API key is still the placeholder value. Replace it in the environment or {0}")]
    PlaceholderApiKey(String),

    #[error("Could not read secrets file {path}: {message}")]
    SecretsFile { path: String, message: String },

    #[error("{key} has an invalid value '{value}'")]
    Invalid { key: &'static str, value: String },
}

/// The hosted model API key. `Debug` and `Display` never print the value.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionBackend {
    Llm,
    Keyword,
}

/// Application configuration loaded from environment variables and the secrets file.
/// Startup fails if the API key is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: ApiKey,
    pub gemini_model: String,
    pub gemini_api_base: String,
    pub llm_timeout_secs: u64,
    pub extraction_backend: ExtractionBackend,
    pub max_upload_bytes: usize,
    /// Sessions untouched for this long are dropped.
    pub session_idle_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

#[derive(Debug, Deserialize)]
struct SecretsFile {
    #[serde(rename = "GEMINI_API_KEY")]
    gemini_api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secrets_path = PathBuf::from(
            lookup("SECRETS_FILE").unwrap_or_else(|| DEFAULT_SECRETS_FILE.to_string()),
        );

        let api_key = match lookup("GEMINI_API_KEY").filter(|k| !k.trim().is_empty()) {
            Some(key) => key,
            None => read_secrets_key(&secrets_path)?
                .ok_or_else(|| ConfigError::MissingApiKey(secrets_path.display().to_string()))?,
        };
        let gemini_api_key = validate_api_key(api_key, &secrets_path)?;

        let extraction_backend = match lookup("EXTRACTION_BACKEND").as_deref() {
            None | Some("llm") => ExtractionBackend::Llm,
            Some("keyword") => ExtractionBackend::Keyword,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "EXTRACTION_BACKEND",
                    value: other.to_string(),
                })
            }
        };

        Ok(Config {
            gemini_api_key,
            gemini_model: lookup("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            gemini_api_base: lookup("GEMINI_API_BASE")
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
                .trim_end_matches('/')
                .to_string(),
            llm_timeout_secs: parse_or(&lookup, "LLM_TIMEOUT_SECS", 120)?,
            extraction_backend,
            max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            session_idle_secs: parse_or(&lookup, "SESSION_IDLE_SECS", DEFAULT_SESSION_IDLE_SECS)?,
            port: parse_or(&lookup, "PORT", 8080)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}

/// Returns `Ok(None)` when the secrets file does not exist.
fn read_secrets_key(path: &Path) -> Result<Option<String>, ConfigError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(ConfigError::SecretsFile {
                path: path.display().to_string(),
                message: e.to_string(),
            })
        }
    };
    let secrets: SecretsFile = toml::from_str(&raw).map_err(|e| ConfigError::SecretsFile {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    Ok(secrets.gemini_api_key)
}

fn validate_api_key(key: String, secrets_path: &Path) -> Result<ApiKey, ConfigError> {
    let key = key.trim();
    if key.is_empty() {
        return Err(ConfigError::MissingApiKey(secrets_path.display().to_string()));
    }
    if key == PLACEHOLDER_API_KEY {
        return Err(ConfigError::PlaceholderApiKey(
            secrets_path.display().to_string(),
        ));
    }
    Ok(ApiKey(key.to_string()))
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Config {
            gemini_api_key: ApiKey("test-key".to_string()),
            gemini_model: "scripted".to_string(),
            gemini_api_base: "http://127.0.0.1:9".to_string(),
            llm_timeout_secs: 5,
            extraction_backend: ExtractionBackend::Keyword,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            session_idle_secs: DEFAULT_SESSION_IDLE_SECS,
            port: 0,
            rust_log: "debug".to_string(),
        }
    }
}
