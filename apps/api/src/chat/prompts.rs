// Chat prompt templates.

/// System prompt for the recruiting assistant. Built in one pass so text inside
/// the documents is never treated as a placeholder.
pub fn chat_system_prompt(grounding_instruction: &str, ranking: &str, documents: &str) -> String {
    format!(
        r#"You are an expert AI recruiting assistant helping a recruiter compare candidates for one job.
{grounding_instruction}

**CANDIDATE RANKING (skill overlap with the job description):**
{ranking}

**CONTEXT:**
{documents}"#
    )
}
