//! Result Curator — post-processes raw engine output in two ordered passes.
//!
//! Pass 1 removes low-confidence candidates (explanation starts with the
//! "Insufficient" sentinel) onto a needs-review list. These resumes are
//! neither matched nor officially unmatched; they need human attention.
//! Pass 2 prunes roles whose candidate lists are now empty.
//!
//! Removal is collect-then-filter, never index deletion during iteration, so
//! multiple removals from one list preserve the relative order of survivors.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::matching::{MatchCandidate, MatchOutput};

/// Explanation prefix marking a low-confidence match.
pub const INSUFFICIENT_SENTINEL: &str = "Insufficient";

/// Curated engine output. `unmatched` is carried through unchanged from the
/// engine; `needs_review` is new.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CuratedOutput {
    pub matched: BTreeMap<String, Vec<MatchCandidate>>,
    pub unmatched: Vec<String>,
    pub needs_review: Vec<String>,
}

/// Runs both curation passes. Idempotent for a fixed raw input.
pub fn curate(raw: &MatchOutput) -> CuratedOutput {
    let mut needs_review = Vec::new();
    let mut matched: BTreeMap<String, Vec<MatchCandidate>> = BTreeMap::new();

    // Pass 1: insufficient-information filter, order-preserving.
    for (role, candidates) in &raw.matched {
        let mut kept = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if candidate.explanation.starts_with(INSUFFICIENT_SENTINEL) {
                needs_review.push(candidate.resume_filename.clone());
            } else {
                kept.push(candidate.clone());
            }
        }
        matched.insert(role.clone(), kept);
    }

    // Pass 2: empty-role pruning.
    matched.retain(|_, candidates| !candidates.is_empty());

    if !needs_review.is_empty() {
        info!(
            "Curation flagged {} resume(s) for review: {}",
            needs_review.len(),
            needs_review.join(", ")
        );
    }

    CuratedOutput {
        matched,
        unmatched: raw.unmatched.clone(),
        needs_review,
    }
}
