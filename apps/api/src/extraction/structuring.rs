//! Structured Field Extractor — turns job-description plain text into a typed
//! record via one LLM call against a fixed 6-key schema.
//!
//! This function is total: LLM output is unreliable prose, so a response that
//! does not conform to the schema becomes a `Degraded` record carrying the
//! verbatim model output for audit. The degraded record flows downstream as
//! empty content; the JD is never dropped from the roles list and the batch
//! never crashes on one bad response.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::extraction::prompts::{JD_STRUCTURE_PROMPT_TEMPLATE, JD_STRUCTURE_SYSTEM};
use crate::llm_client::{strip_json_fences, LlmClient};

/// The structured fields of a job description. Any field may be empty —
/// absence of a category is a valid value, not an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JdFields {
    pub job_title: String,
    pub department: String,
    pub responsibilities: Vec<String>,
    pub skills: Vec<String>,
    pub experience: String,
    pub education: String,
}

/// Outcome of structuring one JD. `Degraded` keeps the raw model output so a
/// parse failure is auditable instead of silently vanishing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StructuredJd {
    Parsed { fields: JdFields },
    Degraded { error: String, raw_response: String },
}

impl StructuredJd {
    pub fn fields(&self) -> Option<&JdFields> {
        match self {
            StructuredJd::Parsed { fields } => Some(fields),
            StructuredJd::Degraded { .. } => None,
        }
    }

    /// Flat text rendering used by the similarity backend. A degraded record
    /// renders empty, so it attracts no matches but still occupies its role.
    pub fn text_blob(&self) -> String {
        match self {
            StructuredJd::Parsed { fields } => {
                let mut parts = vec![fields.job_title.clone(), fields.department.clone()];
                parts.extend(fields.responsibilities.iter().cloned());
                parts.extend(fields.skills.iter().cloned());
                parts.push(fields.experience.clone());
                parts.push(fields.education.clone());
                parts.retain(|p| !p.trim().is_empty());
                parts.join("\n")
            }
            StructuredJd::Degraded { .. } => String::new(),
        }
    }
}

/// The wire schema the model is instructed to return: six keys, all strings.
#[derive(Debug, Deserialize)]
struct RawJdSchema {
    job_title: String,
    department: String,
    responsibilities: String,
    skills: String,
    experience: String,
    education: String,
}

/// Structures one JD. Never fails: transport errors and malformed output both
/// produce a `Degraded` record.
pub async fn structure_jd(jd_text: &str, filename: &str, llm: &LlmClient) -> StructuredJd {
    let prompt = JD_STRUCTURE_PROMPT_TEMPLATE.replace("{jd_text}", jd_text);

    let raw = match llm.call(&prompt, JD_STRUCTURE_SYSTEM).await {
        Ok(response) => match response.text() {
            Some(text) => text.to_string(),
            None => {
                warn!("Structuring of '{filename}' returned empty content");
                String::new()
            }
        },
        Err(e) => {
            warn!("Structuring call for '{filename}' failed: {e}");
            return StructuredJd::Degraded {
                error: "parse failure".to_string(),
                raw_response: e.to_string(),
            };
        }
    };

    parse_structured_response(&raw)
}

/// Parses a model response against the 6-key schema. Total: non-conforming
/// output degrades, preserving the verbatim response.
pub fn parse_structured_response(raw: &str) -> StructuredJd {
    let text = strip_json_fences(raw);
    match serde_json::from_str::<RawJdSchema>(text) {
        Ok(schema) => StructuredJd::Parsed {
            fields: JdFields {
                job_title: schema.job_title.trim().to_string(),
                department: schema.department.trim().to_string(),
                responsibilities: split_list(&schema.responsibilities),
                skills: split_list(&schema.skills),
                experience: schema.experience.trim().to_string(),
                education: schema.education.trim().to_string(),
            },
        },
        Err(e) => {
            warn!("JD structuring output did not match schema: {e}");
            StructuredJd::Degraded {
                error: "parse failure".to_string(),
                raw_response: raw.to_string(),
            }
        }
    }
}

/// Splits a list-like schema value ("a; b; c" or one item per line) into items.
fn split_list(value: &str) -> Vec<String> {
    value
        .split(|c| c == ';' || c == '\n')
        .map(|s| s.trim().trim_start_matches('-').trim())
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFORMING: &str = r#"{
        "job_title": "Backend Engineer",
        "department": "Platform",
        "responsibilities": "Design services; Review code; Own deployments",
        "skills": "Rust; PostgreSQL; Kubernetes",
        "experience": "5+ years backend development",
        "education": "BSc in Computer Science or equivalent"
    }"#;

    #[test]
    fn test_conforming_response_parses_all_fields() {
        let structured = parse_structured_response(CONFORMING);
        let fields = structured.fields().expect("should parse");
        assert_eq!(fields.job_title, "Backend Engineer");
        assert_eq!(fields.responsibilities.len(), 3);
        assert_eq!(fields.skills, vec!["Rust", "PostgreSQL", "Kubernetes"]);
    }

    #[test]
    fn test_fenced_response_parses() {
        let fenced = format!("```json\n{CONFORMING}\n```");
        assert!(parse_structured_response(&fenced).fields().is_some());
    }

    #[test]
    fn test_empty_categories_are_valid_values() {
        let raw = r#"{
            "job_title": "Intern",
            "department": "",
            "responsibilities": "",
            "skills": "",
            "experience": "",
            "education": ""
        }"#;
        let structured = parse_structured_response(raw);
        let fields = structured.fields().expect("should parse");
        assert!(fields.department.is_empty());
        assert!(fields.responsibilities.is_empty());
    }

    #[test]
    fn test_non_json_response_degrades_with_raw_preserved() {
        let prose = "I'm sorry, I couldn't find a job description in that text.";
        match parse_structured_response(prose) {
            StructuredJd::Degraded {
                error,
                raw_response,
            } => {
                assert_eq!(error, "parse failure");
                assert_eq!(raw_response, prose);
            }
            StructuredJd::Parsed { .. } => panic!("prose must not parse"),
        }
    }

    #[test]
    fn test_degraded_record_renders_empty_blob() {
        let degraded = parse_structured_response("not json");
        assert!(degraded.text_blob().is_empty());
    }

    #[test]
    fn test_parsed_record_blob_contains_fields() {
        let blob = parse_structured_response(CONFORMING).text_blob();
        assert!(blob.contains("Backend Engineer"));
        assert!(blob.contains("Rust"));
    }

    #[test]
    fn test_structured_jd_serde_round_trip() {
        let structured = parse_structured_response(CONFORMING);
        let json = serde_json::to_string(&structured).unwrap();
        let back: StructuredJd = serde_json::from_str(&json).unwrap();
        assert_eq!(structured, back);
    }

    #[test]
    fn test_split_list_handles_newlines_and_bullets() {
        let items = split_list("- Design services\n- Review code\n");
        assert_eq!(items, vec!["Design services", "Review code"]);
    }
}
