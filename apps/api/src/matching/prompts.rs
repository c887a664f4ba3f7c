// LLM prompt constants for the reasoning match backend.

/// System prompt for per-resume role assignment — enforces JSON-only output.
pub const MATCH_DECISION_SYSTEM: &str =
    "You are an expert technical recruiter assigning a candidate resume to at \
    most one of a fixed set of open roles. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT invent roles that are not in the provided list.";

/// Decision prompt template. Replace `{roles_json}` and `{resume_text}`.
pub const MATCH_DECISION_PROMPT_TEMPLATE: &str = r#"Below are the open roles, each with its structured job description, followed by one candidate resume.

Decide which single role is the best fit for this candidate, or that none fits.

Return a JSON object with this EXACT schema:
{
  "role": "<one role name from the list, verbatim, or null if none fits>",
  "score": <confidence between 0.0 and 1.0, or null if you cannot quantify it>,
  "explanation": "<one or two sentences justifying the decision>"
}

Rules:
- "role" MUST be copied verbatim from the role list or be null.
- If the resume does not contain enough information to judge fit, begin the
  explanation with the word "Insufficient".

OPEN ROLES:
{roles_json}

CANDIDATE RESUME:
{resume_text}"#;
