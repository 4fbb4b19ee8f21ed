use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Structured fields extracted from a resume or job description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience: Vec<String>,
    #[serde(default)]
    pub education: Vec<String>,
    #[serde(default)]
    pub projects: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Skills,
    Experience,
    Education,
    Projects,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Skills,
        Category::Experience,
        Category::Education,
        Category::Projects,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Category::Skills => "skills",
            Category::Experience => "experience",
            Category::Education => "education",
            Category::Projects => "projects",
        }
    }
}

impl Profile {
    pub fn get_mut(&mut self, category: Category) -> &mut Vec<String> {
        match category {
            Category::Skills => &mut self.skills,
            Category::Experience => &mut self.experience,
            Category::Education => &mut self.education,
            Category::Projects => &mut self.projects,
        }
    }
}

/// Overlap between a candidate's skills and the current job description's skills.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchScore {
    /// Number of job-description skills found in the resume.
    pub matched: usize,
    /// 0.0 – 100.0
    pub percentage: f64,
    pub matched_skills: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing, default)]
    pub raw_text: String,
    pub profile: Profile,
    pub score: MatchScore,
}

impl Candidate {
    pub fn new(name: String, raw_text: String, profile: Profile) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            raw_text,
            profile,
            score: MatchScore::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDescription {
    pub name: String,
    #[serde(skip_serializing, default)]
    pub raw_text: String,
    pub profile: Profile,
}

/// An uploaded file that was not turned into a candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedUpload {
    pub file_name: String,
    pub reason: String,
}
