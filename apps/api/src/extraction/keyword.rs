use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::AppError;
use crate::extraction::{tidy_profile, DocumentRole, Extractor};
use crate::models::candidate::Profile;

/// Skills recognised by the local extractor.
pub const PREDEFINED_SKILLS: &[&str] = &[
    "Python",
    "SQL",
    "Pandas",
    "NumPy",
    "Scikit-Learn",
    "PyTorch",
    "TensorFlow",
    "Machine Learning",
    "Data Visualization",
    "Deep Learning",
    "Tableau",
    "Excel",
    "Git",
    "GitHub",
    "FastAPI",
    "Streamlit",
    "NLP",
    "AI",
    "Data Science",
];

const EXPERIENCE_HEADINGS: &[&str] = &[
    "experience",
    "work experience",
    "professional experience",
    "employment",
    "employment history",
    "work history",
];

const OTHER_HEADINGS: &[&str] = &[
    "skills",
    "technical skills",
    "education",
    "projects",
    "personal projects",
    "portfolio",
    "summary",
    "profile",
    "objective",
    "certifications",
    "awards",
    "publications",
    "interests",
    "languages",
    "references",
];

const EDUCATION_KEYWORDS: &[&str] = &["university", "college", "institute"];

static SKILL_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    PREDEFINED_SKILLS
        .iter()
        .filter_map(|skill| {
            let pattern = format!(r"(?i)\b{}\b", regex::escape(skill).replace(' ', r"\s+"));
            Regex::new(&pattern).ok().map(|re| (*skill, re))
        })
        .collect()
});

static PROJECT_SECTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?is)(?:personal projects|projects|portfolio)\s*:?\s*\n(.*?)(?:\n\s*\n\s*(?:skills|experience|education)|$)",
    )
    .expect("project section pattern is valid")
});

/// Deterministic local extractor: vocabulary matching for skills and heading
/// heuristics for the other categories. No model call.
pub struct KeywordExtractor;

#[async_trait]
impl Extractor for KeywordExtractor {
    async fn extract(&self, text: &str, _role: DocumentRole) -> Result<Profile, AppError> {
        Ok(extract_profile(text))
    }

    fn backend(&self) -> &'static str {
        "keyword"
    }
}

pub fn extract_profile(text: &str) -> Profile {
    tidy_profile(Profile {
        skills: extract_skills(text),
        experience: extract_experience(text),
        education: extract_education(text),
        projects: extract_projects(text),
    })
}

/// Returns matched skills in vocabulary order, using the vocabulary's spelling.
pub fn extract_skills(text: &str) -> Vec<String> {
    SKILL_PATTERNS
        .iter()
        .filter(|(_, re)| re.is_match(text))
        .map(|(skill, _)| skill.to_string())
        .collect()
}

fn extract_experience(text: &str) -> Vec<String> {
    let mut in_section = false;
    let mut lines = Vec::new();
    for line in text.lines() {
        let heading = heading_key(line);
        if EXPERIENCE_HEADINGS.contains(&heading.as_str()) {
            in_section = true;
            continue;
        }
        if OTHER_HEADINGS.contains(&heading.as_str()) {
            in_section = false;
            continue;
        }
        if in_section {
            let entry = strip_bullet(line);
            if !entry.is_empty() {
                lines.push(format!("Worked at: {entry}"));
            }
        }
    }
    lines
}

fn extract_education(text: &str) -> Vec<String> {
    text.lines()
        .map(strip_bullet)
        .filter(|line| {
            let lower = line.to_lowercase();
            EDUCATION_KEYWORDS.iter().any(|k| lower.contains(k))
        })
        .map(|line| format!("Studied at: {line}"))
        .collect()
}

fn extract_projects(text: &str) -> Vec<String> {
    PROJECT_SECTION
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn heading_key(line: &str) -> String {
    line.trim().trim_end_matches(':').trim().to_lowercase()
}

fn strip_bullet(line: &str) -> &str {
    line.trim()
        .trim_start_matches(['-', '*', '•', '·'])
        .trim()
}
