//! Match Engine — scores every (resume, role) pair and assigns each resume to
//! at most one best role, behind a single strategy trait.
//!
//! Two interchangeable backends share one output contract:
//! - `SimilarityMatcher`: token-frequency cosine, pure Rust, deterministic.
//! - `ReasoningMatcher`: per-resume LLM decision with a free-text justification.
//!
//! The backend is selected explicitly by `Config::match_strategy`, carried in
//! `AppState` as `Arc<dyn MatchStrategy>`.

pub mod analytics;
pub mod curation;
pub mod prompts;
pub mod reasoning;
pub mod similarity;

use std::collections::BTreeMap;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::extraction::structuring::StructuredJd;

/// A role to match against: one structured JD keyed by its original filename.
#[derive(Debug, Clone)]
pub struct RoleProfile {
    pub jd_id: Uuid,
    /// Role key used in all output mappings — the JD's original filename.
    pub role_name: String,
    pub structured: StructuredJd,
}

/// One resume in the pool, with text extracted once per run.
#[derive(Debug, Clone)]
pub struct ResumeInput {
    pub id: Uuid,
    pub filename: String,
    pub text: String,
}

/// Minimal resume identity carried inside a candidate record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeRef {
    pub id: Uuid,
    pub filename: String,
}

/// One scored (resume, role) pairing. Immutable once created.
/// `score` is `None` when the backend produced no numeric confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub resume_filename: String,
    pub resume: ResumeRef,
    pub role: String,
    pub score: Option<f64>,
    pub explanation: String,
    /// Raw backend metadata, passenger data for audit and display.
    pub metadata: serde_json::Value,
}

/// Raw per-role tallies produced alongside the candidate lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleTally {
    pub scored: u32,
    pub assigned: u32,
}

/// Engine output before curation. Candidate lists keep engine insertion order,
/// which is the documented tie-break order everywhere downstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchOutput {
    pub matched: BTreeMap<String, Vec<MatchCandidate>>,
    pub unmatched: Vec<String>,
    pub tallies: BTreeMap<String, RoleTally>,
}

/// An unexpected failure inside the scoring loop. Unlike per-document
/// degradation, this aborts the whole run: the engine's output shape is
/// required downstream and a partial result must never be persisted.
#[derive(Debug, Error)]
pub enum MatchEngineError {
    #[error("match engine internal error: {0}")]
    Internal(String),
}

/// The match strategy trait. Implement this to add a backend without touching
/// the pipeline, curation, or analytics code.
#[async_trait]
pub trait MatchStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run(
        &self,
        roles: &[RoleProfile],
        resumes: &[ResumeInput],
    ) -> Result<MatchOutput, MatchEngineError>;
}

/// Backend selector, parsed from run configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    Similarity,
    Reasoning,
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "similarity" => Ok(StrategyKind::Similarity),
            "reasoning" => Ok(StrategyKind::Reasoning),
            other => Err(format!("unknown match strategy '{other}'")),
        }
    }
}

impl MatchOutput {
    /// Initializes the mapping with every role present (empty lists), matching
    /// the engine contract that roles without candidates survive until
    /// curation prunes them.
    pub fn with_roles(roles: &[RoleProfile]) -> Self {
        let mut out = MatchOutput::default();
        for role in roles {
            out.matched.insert(role.role_name.clone(), Vec::new());
            out.tallies.insert(role.role_name.clone(), RoleTally::default());
        }
        out
    }

    pub fn assign(&mut self, candidate: MatchCandidate) {
        let role = candidate.role.clone();
        if let Some(tally) = self.tallies.get_mut(&role) {
            tally.assigned += 1;
        }
        self.matched.entry(role).or_default().push(candidate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_kind_parses_case_insensitively() {
        assert_eq!(
            "Similarity".parse::<StrategyKind>().unwrap(),
            StrategyKind::Similarity
        );
        assert_eq!(
            "reasoning".parse::<StrategyKind>().unwrap(),
            StrategyKind::Reasoning
        );
        assert!("cosine".parse::<StrategyKind>().is_err());
    }

    #[test]
    fn test_with_roles_seeds_every_role_key() {
        let roles = vec![
            RoleProfile {
                jd_id: Uuid::new_v4(),
                role_name: "engineer.pdf".to_string(),
                structured: crate::extraction::structuring::StructuredJd::Degraded {
                    error: "parse failure".to_string(),
                    raw_response: String::new(),
                },
            },
            RoleProfile {
                jd_id: Uuid::new_v4(),
                role_name: "designer.pdf".to_string(),
                structured: crate::extraction::structuring::StructuredJd::Degraded {
                    error: "parse failure".to_string(),
                    raw_response: String::new(),
                },
            },
        ];
        let out = MatchOutput::with_roles(&roles);
        assert_eq!(out.matched.len(), 2);
        assert!(out.matched.values().all(|v| v.is_empty()));
        assert_eq!(out.tallies.len(), 2);
    }
}
