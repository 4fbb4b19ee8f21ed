// Extraction prompt templates.

/// System prompt for structured extraction. Combined with `JSON_ONLY_SYSTEM`.
pub const EXTRACTION_SYSTEM: &str = "\
You are a precise recruiting data extractor. \
Extract structured information from resumes and job descriptions. \
Only report what the text states; never infer or invent entries.";

/// Resume extraction prompt. Replace `{document_text}` before sending.
pub const RESUME_EXTRACTION_PROMPT: &str = r#"Extract structured candidate data from the resume below.

Return a JSON object with this EXACT schema:
{
  "skills": ["Python", "SQL"],
  "experience": ["Data Analyst at Acme Corp (2021-2023): built churn dashboards"],
  "education": ["B.Sc. Computer Science, State University, 2020"],
  "projects": ["Resume ranker: FastAPI service scoring resumes against job descriptions"]
}

RULES:
1. "skills" lists individual technical or professional skills, one per item, using their common name ("Scikit-Learn", "Machine Learning").
2. "experience", "education" and "projects" hold one short highlight per entry.
3. Use an empty array when a section is absent.

RESUME:
{document_text}"#;

/// Job description extraction prompt. Replace `{document_text}` before sending.
pub const JOB_DESCRIPTION_EXTRACTION_PROMPT: &str = r#"Extract the requirements from the job description below.

Return a JSON object with this EXACT schema:
{
  "skills": ["Python", "SQL"],
  "experience": ["3+ years in data analysis"],
  "education": ["Bachelor's degree in a quantitative field"],
  "projects": []
}

RULES:
1. "skills" lists every skill, tool, language or framework the role asks for, one per item, using their common name.
2. "experience" and "education" hold the stated requirements, one per entry.
3. Use an empty array when a section is absent.

JOB DESCRIPTION:
{document_text}"#;
