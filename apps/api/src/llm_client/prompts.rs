// Shared prompt fragments.
// Each module that needs LLM calls defines its own prompts.rs alongside it.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Keeps answers tied to the uploaded documents.
pub const GROUNDING_INSTRUCTION: &str = "\
    Answer questions based ONLY on the context provided below. \
    Do not make up information. \
    If the answer is not in the context, say 'I could not find an answer in the provided documents.'";
