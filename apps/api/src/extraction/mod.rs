//! Extraction: turns raw resume / job description text into a `Profile`.
//!
//! `LlmExtractor` asks the hosted model; `KeywordExtractor` is deterministic and
//! runs locally. `AppState` holds an `Arc<dyn Extractor>` chosen at startup.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::candidate::{Category, Profile};

pub mod keyword;
pub mod llm;
pub mod prompts;

pub use keyword::KeywordExtractor;
pub use llm::LlmExtractor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentRole {
    Resume,
    JobDescription,
}

#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, text: &str, role: DocumentRole) -> Result<Profile, AppError>;

    /// "llm" | "keyword"
    fn backend(&self) -> &'static str;
}

/// Trims entries, drops blanks and removes case-insensitive duplicates, keeping first spelling.
pub fn dedup_entries(entries: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .map(|e| e.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|e| !e.is_empty())
        .filter(|e| seen.insert(e.to_lowercase()))
        .collect()
}

/// Applies `dedup_entries` to every category.
pub fn tidy_profile(mut profile: Profile) -> Profile {
    for category in Category::ALL {
        let entries = std::mem::take(profile.get_mut(category));
        *profile.get_mut(category) = dedup_entries(entries);
    }
    profile
}
