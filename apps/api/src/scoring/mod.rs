//! Scoring: skill-overlap match percentage and candidate ranking.
//!
//! `percentage = |resume ∩ job| / |job| × 100` over normalized skill strings.
//! An empty job skill set scores 0, never NaN.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::candidate::{Candidate, JobDescription, MatchScore};

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").expect("word pattern is valid"));

/// Lowercases and collapses whitespace so "Machine  learning" == "machine learning".
pub fn normalize_skill(skill: &str) -> String {
    skill
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn skill_set(skills: &[String]) -> HashSet<String> {
    skills
        .iter()
        .map(|s| normalize_skill(s))
        .filter(|s| !s.is_empty())
        .collect()
}

pub fn match_score(resume_skills: &[String], job_skills: &[String]) -> MatchScore {
    let job_set = skill_set(job_skills);
    if job_set.is_empty() {
        return MatchScore::default();
    }
    let resume_set = skill_set(resume_skills);

    let mut seen = HashSet::new();
    let matched_skills: Vec<String> = job_skills
        .iter()
        .filter(|s| {
            let key = normalize_skill(s);
            resume_set.contains(&key) && seen.insert(key)
        })
        .cloned()
        .collect();

    let matched = matched_skills.len();
    MatchScore {
        matched,
        percentage: matched as f64 / job_set.len() as f64 * 100.0,
        matched_skills,
    }
}

/// Rescores every candidate against `job` and sorts by percentage, highest first.
/// The sort is stable: ties keep upload order.
pub fn rank_candidates(candidates: &mut [Candidate], job: &JobDescription) {
    for candidate in candidates.iter_mut() {
        candidate.score = match_score(&candidate.profile.skills, &job.profile.skills);
    }
    candidates.sort_by(|a, b| b.score.percentage.total_cmp(&a.score.percentage));
}

/// Share of the job description's distinct words that appear in the resume, 0 – 100.
pub fn word_overlap_score(resume: &str, job_description: &str) -> f64 {
    let words = |text: &str| -> HashSet<String> {
        WORD.find_iter(&text.to_lowercase())
            .map(|m| m.as_str().to_string())
            .collect()
    };
    let jd_words = words(job_description);
    if jd_words.is_empty() {
        return 0.0;
    }
    let resume_words = words(resume);
    let matching = resume_words.intersection(&jd_words).count();
    matching as f64 / jd_words.len() as f64 * 100.0
}
