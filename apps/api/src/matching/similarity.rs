//! Similarity backend — token-frequency cosine between resume text and each
//! role's structured text blob. Pure Rust, fast, deterministic, no LLM call.
//!
//! Scores are in [0,1]. Each resume is assigned to the argmax role subject to
//! the configured minimum threshold; below threshold the resume is unmatched.
//! Tie-break: the first role in insertion order wins (strict `>` comparison).

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info};

use crate::matching::{
    MatchCandidate, MatchEngineError, MatchOutput, MatchStrategy, ResumeInput, ResumeRef,
    RoleProfile,
};

pub struct SimilarityMatcher {
    threshold: f64,
}

impl SimilarityMatcher {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

#[async_trait]
impl MatchStrategy for SimilarityMatcher {
    fn name(&self) -> &'static str {
        "similarity"
    }

    async fn run(
        &self,
        roles: &[RoleProfile],
        resumes: &[ResumeInput],
    ) -> Result<MatchOutput, MatchEngineError> {
        let mut output = MatchOutput::with_roles(roles);

        // Role term vectors are computed once per run.
        let role_vectors: Vec<HashMap<String, f64>> = roles
            .iter()
            .map(|r| term_frequencies(&r.structured.text_blob()))
            .collect();

        for resume in resumes {
            let resume_vector = term_frequencies(&resume.text);
            if resume_vector.is_empty() {
                debug!("Resume '{}' has no extractable terms", resume.filename);
                output.unmatched.push(resume.filename.clone());
                continue;
            }

            let scores: Vec<f64> = role_vectors
                .iter()
                .map(|rv| cosine_similarity(&resume_vector, rv))
                .collect();

            for role in roles {
                if let Some(tally) = output.tallies.get_mut(&role.role_name) {
                    tally.scored += 1;
                }
            }

            match best_above_threshold(&scores, self.threshold) {
                Some((idx, score)) => {
                    let role = &roles[idx];
                    output.assign(MatchCandidate {
                        resume_filename: resume.filename.clone(),
                        resume: ResumeRef {
                            id: resume.id,
                            filename: resume.filename.clone(),
                        },
                        role: role.role_name.clone(),
                        score: Some(score),
                        explanation: format!(
                            "Matched to {} based on cosine similarity score {:.2}",
                            role.role_name, score
                        ),
                        metadata: json!({
                            "backend": "similarity",
                            "threshold": self.threshold,
                            "considered_roles": roles.len(),
                        }),
                    });
                }
                None => output.unmatched.push(resume.filename.clone()),
            }
        }

        info!(
            "Similarity matching done: {} resumes, {} roles, {} unmatched",
            resumes.len(),
            roles.len(),
            output.unmatched.len()
        );
        Ok(output)
    }
}

/// Index and score of the best role at or above the threshold, or `None`.
/// Strict `>` keeps the first (insertion-order) role on exact score ties.
fn best_above_threshold(scores: &[f64], threshold: f64) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, &score) in scores.iter().enumerate() {
        if score < threshold {
            continue;
        }
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((idx, score)),
        }
    }
    best
}

/// Lowercased alphanumeric term frequencies. Single-character fragments are
/// dropped as noise.
fn term_frequencies(text: &str) -> HashMap<String, f64> {
    let mut counts: HashMap<String, f64> = HashMap::new();
    for token in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() > 1)
    {
        *counts.entry(token.to_lowercase()).or_insert(0.0) += 1.0;
    }
    counts
}

/// Cosine of two term-frequency vectors, in [0,1]. Zero when either is empty.
fn cosine_similarity(a: &HashMap<String, f64>, b: &HashMap<String, f64>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let dot: f64 = a
        .iter()
        .filter_map(|(term, &wa)| b.get(term).map(|&wb| wa * wb))
        .sum();
    let norm_a: f64 = a.values().map(|w| w * w).sum::<f64>().sqrt();
    let norm_b: f64 = b.values().map(|w| w * w).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        (dot / (norm_a * norm_b)).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::structuring::{JdFields, StructuredJd};
    use uuid::Uuid;

    fn role(name: &str, skills: &[&str]) -> RoleProfile {
        RoleProfile {
            jd_id: Uuid::new_v4(),
            role_name: name.to_string(),
            structured: StructuredJd::Parsed {
                fields: JdFields {
                    job_title: name.to_string(),
                    skills: skills.iter().map(|s| s.to_string()).collect(),
                    ..Default::default()
                },
            },
        }
    }

    fn resume(name: &str, text: &str) -> ResumeInput {
        ResumeInput {
            id: Uuid::new_v4(),
            filename: name.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_identical_texts_score_one() {
        let a = term_frequencies("rust postgres kubernetes");
        let score = cosine_similarity(&a, &a);
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_disjoint_texts_score_zero() {
        let a = term_frequencies("rust tokio axum");
        let b = term_frequencies("painting sculpture ceramics");
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn test_empty_vector_scores_zero() {
        let a = term_frequencies("");
        let b = term_frequencies("rust");
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn test_best_above_threshold_picks_argmax() {
        assert_eq!(best_above_threshold(&[0.2, 0.9, 0.6], 0.5), Some((1, 0.9)));
    }

    #[test]
    fn test_below_threshold_yields_none() {
        assert_eq!(best_above_threshold(&[0.2, 0.3], 0.5), None);
    }

    #[test]
    fn test_tie_break_keeps_first_role() {
        assert_eq!(best_above_threshold(&[0.8, 0.8], 0.5), Some((0, 0.8)));
    }

    // One role, one strong resume, one below-threshold resume.
    #[tokio::test]
    async fn test_threshold_splits_matched_and_unmatched() {
        let roles = vec![role(
            "engineer.pdf",
            &["rust", "postgres", "kubernetes", "tokio"],
        )];
        let resumes = vec![
            resume(
                "a.pdf",
                "engineer rust postgres kubernetes tokio engineer rust",
            ),
            resume("b.pdf", "watercolor gallery curation exhibitions"),
        ];

        let matcher = SimilarityMatcher::new(0.5);
        let out = matcher.run(&roles, &resumes).await.unwrap();

        let candidates = &out.matched["engineer.pdf"];
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].resume_filename, "a.pdf");
        assert!(candidates[0].score.unwrap() >= 0.5);
        assert_eq!(out.unmatched, vec!["b.pdf".to_string()]);
    }

    #[tokio::test]
    async fn test_empty_resume_goes_straight_to_unmatched() {
        let roles = vec![role("engineer.pdf", &["rust"])];
        let resumes = vec![resume("blank.pdf", "   ")];

        let matcher = SimilarityMatcher::new(0.5);
        let out = matcher.run(&roles, &resumes).await.unwrap();

        assert!(out.matched["engineer.pdf"].is_empty());
        assert_eq!(out.unmatched, vec!["blank.pdf".to_string()]);
    }

    #[tokio::test]
    async fn test_degraded_role_attracts_no_matches_but_keeps_its_key() {
        let mut roles = vec![role("engineer.pdf", &["rust", "tokio"])];
        roles.push(RoleProfile {
            jd_id: Uuid::new_v4(),
            role_name: "broken.pdf".to_string(),
            structured: StructuredJd::Degraded {
                error: "parse failure".to_string(),
                raw_response: "not json".to_string(),
            },
        });
        let resumes = vec![resume("a.pdf", "rust tokio rust tokio")];

        let matcher = SimilarityMatcher::new(0.5);
        let out = matcher.run(&roles, &resumes).await.unwrap();

        assert_eq!(out.matched["engineer.pdf"].len(), 1);
        assert!(out.matched["broken.pdf"].is_empty());
        assert!(out.matched.contains_key("broken.pdf"));
    }
}
