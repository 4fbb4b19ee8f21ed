use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use crate::errors::AppError;
use crate::extraction::prompts::{
    EXTRACTION_SYSTEM, JOB_DESCRIPTION_EXTRACTION_PROMPT, RESUME_EXTRACTION_PROMPT,
};
use crate::extraction::{tidy_profile, DocumentRole, Extractor};
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{strip_json_fences, LanguageModel};
use crate::models::candidate::{Category, Profile};
use crate::models::conversation::ChatMessage;

/// Extraction through the hosted model.
///
/// Model output is parsed best-effort: a field that is missing or has the
/// wrong shape becomes an empty list instead of failing the upload.
pub struct LlmExtractor(pub Arc<dyn LanguageModel>);

#[async_trait]
impl Extractor for LlmExtractor {
    async fn extract(&self, text: &str, role: DocumentRole) -> Result<Profile, AppError> {
        let template = match role {
            DocumentRole::Resume => RESUME_EXTRACTION_PROMPT,
            DocumentRole::JobDescription => JOB_DESCRIPTION_EXTRACTION_PROMPT,
        };
        let prompt = template.replace("{document_text}", text);
        let system = format!("{EXTRACTION_SYSTEM} {JSON_ONLY_SYSTEM}");

        let output = self
            .0
            .generate(&system, &[ChatMessage::user(prompt)])
            .await?;

        Ok(parse_profile(&output))
    }

    fn backend(&self) -> &'static str {
        "llm"
    }
}

/// Parses model output into a `Profile`, defaulting anything unreadable to empty.
pub fn parse_profile(output: &str) -> Profile {
    let Some(value) = parse_json_object(output) else {
        warn!("Model output was not a JSON object; using an empty profile");
        return Profile::default();
    };

    let mut profile = Profile::default();
    for category in Category::ALL {
        *profile.get_mut(category) = match value.get(category.key()) {
            Some(Value::Array(items)) => items.iter().filter_map(item_text).collect(),
            Some(Value::String(s)) if category == Category::Skills => {
                s.split(',').map(String::from).collect()
            }
            Some(Value::String(s)) => vec![s.clone()],
            Some(Value::Null) | None => Vec::new(),
            Some(other) => {
                warn!("Ignoring malformed '{}' field: {other}", category.key());
                Vec::new()
            }
        };
    }
    tidy_profile(profile)
}

fn parse_json_object(output: &str) -> Option<Value> {
    let text = strip_json_fences(output);
    if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(text) {
        return Some(value);
    }
    // Prose around the object: retry on the outermost braces.
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    match serde_json::from_str::<Value>(&text[start..=end]) {
        Ok(value @ Value::Object(_)) => Some(value),
        _ => None,
    }
}

fn item_text(item: &Value) -> Option<String> {
    match item {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::ScriptedModel;
    use crate::llm_client::LlmError;

    #[test]
    fn test_parse_full_object() {
        let profile = parse_profile(
            r#"{"skills": ["Python", "SQL"], "experience": ["Analyst at Acme"],
                "education": ["BSc, State University"], "projects": ["Churn model"]}"#,
        );
        assert_eq!(profile.skills, vec!["Python", "SQL"]);
        assert_eq!(profile.experience, vec!["Analyst at Acme"]);
        assert_eq!(profile.education, vec!["BSc, State University"]);
        assert_eq!(profile.projects, vec!["Churn model"]);
    }

    #[test]
    fn test_missing_and_malformed_fields_default_to_empty() {
        let profile = parse_profile(r#"{"skills": ["Git", 3, {"x": 1}, null], "experience": {"a": 1}}"#);
        assert_eq!(profile.skills, vec!["Git", "3"]);
        assert!(profile.experience.is_empty());
        assert!(profile.education.is_empty());
        assert!(profile.projects.is_empty());
    }

    #[test]
    fn test_comma_separated_skills_string() {
        let profile = parse_profile(r#"{"skills": "Python, SQL ,Tableau"}"#);
        assert_eq!(profile.skills, vec!["Python", "SQL", "Tableau"]);
    }

    #[test]
    fn test_object_wrapped_in_prose() {
        let profile = parse_profile("Here you go:\n{\"skills\": [\"Excel\"]}\nHope this helps!");
        assert_eq!(profile.skills, vec!["Excel"]);
    }

    #[test]
    fn test_unparseable_output_is_empty_profile() {
        assert_eq!(parse_profile("I cannot help with that."), Profile::default());
        assert_eq!(parse_profile("[\"Python\"]"), Profile::default());
    }

    #[tokio::test]
    async fn test_prompt_uses_role_template() {
        let model = Arc::new(ScriptedModel::new(vec![
            Ok(r#"{"skills": ["SQL"]}"#.into()),
            Ok(r#"{"skills": ["SQL", "Python"]}"#.into()),
        ]));
        let extractor = LlmExtractor(model.clone());

        let jd = extractor
            .extract("We need SQL", DocumentRole::JobDescription)
            .await
            .unwrap();
        let resume = extractor
            .extract("I know SQL and Python", DocumentRole::Resume)
            .await
            .unwrap();
        assert_eq!(jd.skills, vec!["SQL"]);
        assert_eq!(resume.skills, vec!["SQL", "Python"]);

        let requests = model.requests.lock().unwrap();
        assert!(requests[0].1[0].content.contains("JOB DESCRIPTION:\nWe need SQL"));
        assert!(requests[1].1[0].content.contains("RESUME:\nI know SQL and Python"));
        assert!(requests[0].0.contains("valid JSON only"));
    }

    #[tokio::test]
    async fn test_api_failure_is_an_error() {
        let model = Arc::new(ScriptedModel::new(vec![Err(LlmError::Api {
            status: 403,
            message: "API key not valid".into(),
        })]));
        let result = LlmExtractor(model)
            .extract("text", DocumentRole::Resume)
            .await;
        assert!(matches!(result, Err(AppError::Llm(LlmError::Api { status: 403, .. }))));
    }
}
