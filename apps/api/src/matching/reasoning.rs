//! Reasoning backend — delegates each (resume, role set) comparison to an LLM
//! decision call that returns the chosen role, a confidence score, and a
//! free-text justification. Same output contract as the similarity backend.
//!
//! Failure containment: one resume's LLM failure (timeout, malformed output,
//! hallucinated role) degrades that resume to unmatched with a logged warning.
//! It never aborts the batch — `MatchEngineError` is reserved for failures of
//! the engine itself, not of a single document's call.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::llm_client::LlmClient;
use crate::matching::prompts::{MATCH_DECISION_PROMPT_TEMPLATE, MATCH_DECISION_SYSTEM};
use crate::matching::{
    MatchCandidate, MatchEngineError, MatchOutput, MatchStrategy, ResumeInput, ResumeRef,
    RoleProfile,
};

pub struct ReasoningMatcher {
    llm: LlmClient,
}

impl ReasoningMatcher {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

/// The wire schema the model is instructed to return per resume.
#[derive(Debug, Deserialize)]
pub struct RoleDecision {
    pub role: Option<String>,
    pub score: Option<f64>,
    #[serde(default)]
    pub explanation: String,
}

#[async_trait]
impl MatchStrategy for ReasoningMatcher {
    fn name(&self) -> &'static str {
        "reasoning"
    }

    async fn run(
        &self,
        roles: &[RoleProfile],
        resumes: &[ResumeInput],
    ) -> Result<MatchOutput, MatchEngineError> {
        let mut output = MatchOutput::with_roles(roles);
        let roles_json = render_roles(roles).map_err(|e| {
            MatchEngineError::Internal(format!("could not serialize role set: {e}"))
        })?;

        // Resumes are processed in pool order so candidate insertion order is
        // stable and documented, matching the tie-break contract.
        for resume in resumes {
            let prompt = MATCH_DECISION_PROMPT_TEMPLATE
                .replace("{roles_json}", &roles_json)
                .replace("{resume_text}", &resume.text);

            for role in roles {
                if let Some(tally) = output.tallies.get_mut(&role.role_name) {
                    tally.scored += 1;
                }
            }

            let decision: RoleDecision =
                match self.llm.call_json(&prompt, MATCH_DECISION_SYSTEM).await {
                    Ok(d) => d,
                    Err(e) => {
                        warn!(
                            "Decision call for '{}' failed, marking unmatched: {e}",
                            resume.filename
                        );
                        output.unmatched.push(resume.filename.clone());
                        continue;
                    }
                };

            match validate_decision(decision, roles) {
                Some((role_name, score, explanation)) => {
                    output.assign(MatchCandidate {
                        resume_filename: resume.filename.clone(),
                        resume: ResumeRef {
                            id: resume.id,
                            filename: resume.filename.clone(),
                        },
                        role: role_name,
                        score,
                        explanation,
                        metadata: json!({ "backend": "reasoning" }),
                    });
                }
                None => output.unmatched.push(resume.filename.clone()),
            }
        }

        info!(
            "Reasoning matching done: {} resumes, {} roles, {} unmatched",
            resumes.len(),
            roles.len(),
            output.unmatched.len()
        );
        Ok(output)
    }
}

/// Validates a model decision against the known role set.
/// Null or hallucinated roles yield `None` — the resume goes straight to
/// unmatched with no candidate record created anywhere. Scores outside [0,1]
/// are clamped.
pub fn validate_decision(
    decision: RoleDecision,
    roles: &[RoleProfile],
) -> Option<(String, Option<f64>, String)> {
    let role = decision.role?;
    if !roles.iter().any(|r| r.role_name == role) {
        warn!("Model chose unknown role '{role}', marking unmatched");
        return None;
    }
    let score = decision.score.map(|s| s.clamp(0.0, 1.0));
    Some((role, score, decision.explanation))
}

fn render_roles(roles: &[RoleProfile]) -> Result<String, serde_json::Error> {
    let entries: Vec<serde_json::Value> = roles
        .iter()
        .map(|r| {
            json!({
                "role": r.role_name,
                "fields": r.structured.fields(),
            })
        })
        .collect();
    serde_json::to_string_pretty(&entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::structuring::{JdFields, StructuredJd};
    use uuid::Uuid;

    fn role(name: &str) -> RoleProfile {
        RoleProfile {
            jd_id: Uuid::new_v4(),
            role_name: name.to_string(),
            structured: StructuredJd::Parsed {
                fields: JdFields::default(),
            },
        }
    }

    #[test]
    fn test_valid_decision_passes_through() {
        let decision: RoleDecision = serde_json::from_str(
            r#"{"role": "engineer.pdf", "score": 0.85, "explanation": "Strong Rust background."}"#,
        )
        .unwrap();
        let (name, score, explanation) =
            validate_decision(decision, &[role("engineer.pdf")]).unwrap();
        assert_eq!(name, "engineer.pdf");
        assert_eq!(score, Some(0.85));
        assert!(explanation.contains("Rust"));
    }

    #[test]
    fn test_null_role_means_unmatched() {
        let decision: RoleDecision =
            serde_json::from_str(r#"{"role": null, "score": null, "explanation": "No fit."}"#)
                .unwrap();
        assert!(validate_decision(decision, &[role("engineer.pdf")]).is_none());
    }

    #[test]
    fn test_hallucinated_role_means_unmatched() {
        let decision: RoleDecision = serde_json::from_str(
            r#"{"role": "astronaut.pdf", "score": 0.9, "explanation": "Great."}"#,
        )
        .unwrap();
        assert!(validate_decision(decision, &[role("engineer.pdf")]).is_none());
    }

    #[test]
    fn test_missing_score_is_the_no_score_sentinel() {
        let decision: RoleDecision =
            serde_json::from_str(r#"{"role": "engineer.pdf", "score": null}"#).unwrap();
        let (_, score, _) = validate_decision(decision, &[role("engineer.pdf")]).unwrap();
        assert!(score.is_none());
    }

    #[test]
    fn test_out_of_range_score_is_clamped() {
        let decision: RoleDecision = serde_json::from_str(
            r#"{"role": "engineer.pdf", "score": 1.7, "explanation": "x"}"#,
        )
        .unwrap();
        let (_, score, _) = validate_decision(decision, &[role("engineer.pdf")]).unwrap();
        assert_eq!(score, Some(1.0));
    }

    #[test]
    fn test_render_roles_lists_every_role_name() {
        let rendered = render_roles(&[role("a.pdf"), role("b.pdf")]).unwrap();
        assert!(rendered.contains("a.pdf"));
        assert!(rendered.contains("b.pdf"));
    }
}
