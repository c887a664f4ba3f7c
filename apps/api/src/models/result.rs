//! The persisted analysis result record. Created once per run, never mutated:
//! each run inserts a new row and history is preserved.

use std::collections::BTreeMap;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::matching::analytics::AnalyticsReport;
use crate::matching::MatchCandidate;

/// Raw database row. JSONB columns stay as `Value` at the sqlx boundary and
/// are decoded into typed structures by `MatchResultRecord::from_row`.
#[derive(Debug, Clone, FromRow)]
pub struct MatchResultRow {
    pub id: Uuid,
    pub matched: Value,
    pub unmatched: Value,
    pub needs_review: Value,
    pub analytics: Option<Value>,
    pub strategy: String,
    pub created_at: DateTime<Utc>,
}

/// The typed result record consumed by the display layer.
/// `analytics` may be absent when a run failed before producing it — callers
/// treat that as "no chart to render", not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResultRecord {
    pub id: Uuid,
    pub matched: BTreeMap<String, Vec<MatchCandidate>>,
    pub unmatched: Vec<String>,
    pub needs_review: Vec<String>,
    pub analytics: Option<AnalyticsReport>,
    pub strategy: String,
    pub created_at: DateTime<Utc>,
}

impl MatchResultRecord {
    pub fn from_row(row: MatchResultRow) -> anyhow::Result<Self> {
        Ok(Self {
            id: row.id,
            matched: serde_json::from_value(row.matched)
                .context("match_results.matched is not a role mapping")?,
            unmatched: serde_json::from_value(row.unmatched)
                .context("match_results.unmatched is not a filename list")?,
            needs_review: serde_json::from_value(row.needs_review)
                .context("match_results.needs_review is not a filename list")?,
            analytics: row
                .analytics
                .map(serde_json::from_value)
                .transpose()
                .context("match_results.analytics is not an analytics report")?,
            strategy: row.strategy,
            created_at: row.created_at,
        })
    }
}

/// Top-N candidates for one role, sorted by score descending. The sort is
/// stable, so candidates with equal scores keep engine insertion order, and
/// candidates without a score sort last. Score is the only sort key.
pub fn top_candidates(candidates: &[MatchCandidate], n: usize) -> Vec<MatchCandidate> {
    let mut sorted: Vec<MatchCandidate> = candidates.to_vec();
    sorted.sort_by(|a, b| {
        let a = a.score.unwrap_or(f64::NEG_INFINITY);
        let b = b.score.unwrap_or(f64::NEG_INFINITY);
        b.partial_cmp(&a).unwrap_or(std::cmp::Ordering::Equal)
    });
    sorted.truncate(n);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::ResumeRef;
    use serde_json::json;

    fn candidate(filename: &str, score: Option<f64>) -> MatchCandidate {
        MatchCandidate {
            resume_filename: filename.to_string(),
            resume: ResumeRef {
                id: Uuid::new_v4(),
                filename: filename.to_string(),
            },
            role: "engineer.pdf".to_string(),
            score,
            explanation: "fit".to_string(),
            metadata: json!({}),
        }
    }

    #[test]
    fn test_top_candidates_sorts_by_score_descending() {
        let pool = vec![
            candidate("low.pdf", Some(0.3)),
            candidate("high.pdf", Some(0.9)),
            candidate("mid.pdf", Some(0.6)),
        ];
        let top: Vec<String> = top_candidates(&pool, 3)
            .into_iter()
            .map(|c| c.resume_filename)
            .collect();
        assert_eq!(top, vec!["high.pdf", "mid.pdf", "low.pdf"]);
    }

    #[test]
    fn test_top_candidates_truncates_to_n() {
        let pool = vec![
            candidate("a.pdf", Some(0.9)),
            candidate("b.pdf", Some(0.8)),
            candidate("c.pdf", Some(0.7)),
        ];
        assert_eq!(top_candidates(&pool, 2).len(), 2);
    }

    #[test]
    fn test_equal_scores_keep_insertion_order() {
        let pool = vec![
            candidate("first.pdf", Some(0.8)),
            candidate("second.pdf", Some(0.8)),
            candidate("third.pdf", Some(0.8)),
        ];
        let top: Vec<String> = top_candidates(&pool, 3)
            .into_iter()
            .map(|c| c.resume_filename)
            .collect();
        assert_eq!(top, vec!["first.pdf", "second.pdf", "third.pdf"]);
    }

    #[test]
    fn test_unscored_candidates_sort_last() {
        let pool = vec![
            candidate("no_score.pdf", None),
            candidate("scored.pdf", Some(0.1)),
        ];
        let top: Vec<String> = top_candidates(&pool, 2)
            .into_iter()
            .map(|c| c.resume_filename)
            .collect();
        assert_eq!(top, vec!["scored.pdf", "no_score.pdf"]);
    }

    #[test]
    fn test_record_round_trips_byte_identically() {
        let mut matched = BTreeMap::new();
        matched.insert(
            "engineer.pdf".to_string(),
            vec![candidate("a.pdf", Some(0.9)), candidate("b.pdf", None)],
        );
        let record = MatchResultRecord {
            id: Uuid::new_v4(),
            matched,
            unmatched: vec!["c.pdf".to_string()],
            needs_review: vec!["d.pdf".to_string()],
            analytics: None,
            strategy: "similarity".to_string(),
            created_at: Utc::now(),
        };

        let bytes = serde_json::to_vec(&record).unwrap();
        let reloaded: MatchResultRecord = serde_json::from_slice(&bytes).unwrap();
        let bytes_again = serde_json::to_vec(&reloaded).unwrap();
        assert_eq!(record, reloaded);
        assert_eq!(bytes, bytes_again);
    }

    #[test]
    fn test_null_analytics_is_valid() {
        let row = MatchResultRow {
            id: Uuid::new_v4(),
            matched: json!({}),
            unmatched: json!([]),
            needs_review: json!([]),
            analytics: None,
            strategy: "similarity".to_string(),
            created_at: Utc::now(),
        };
        let record = MatchResultRecord::from_row(row).unwrap();
        assert!(record.analytics.is_none());
    }
}
