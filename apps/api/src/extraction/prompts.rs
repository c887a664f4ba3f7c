// LLM prompt constants for job-description structuring.

/// System prompt for JD structuring — enforces JSON-only output.
pub const JD_STRUCTURE_SYSTEM: &str =
    "You are an expert job description analyst. \
    Parse the text of a job description and extract key information. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// JD structuring prompt template. Replace `{jd_text}` before sending.
pub const JD_STRUCTURE_PROMPT_TEMPLATE: &str = r#"Parse the following job description and extract key information.

Return a JSON object with this EXACT schema — six keys, every value a string:
{
  "job_title": "Job title as extracted from the job description",
  "department": "Department or team for this job",
  "responsibilities": "Key responsibilities and tasks",
  "skills": "Technical and soft skills required",
  "experience": "Years and type of experience needed",
  "education": "Educational qualifications required"
}

Rules:
- Keep each value concise and directly answering its category.
- If a category is not mentioned in the text, use an empty string. An empty
  value is a valid answer, not an error.
- List-like values (responsibilities, skills) should separate items with
  semicolons.

JOB DESCRIPTION:
{jd_text}"#;
