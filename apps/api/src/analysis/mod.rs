//! Analysis run — orchestrates one complete pipeline execution, from the
//! current document set to a persisted `MatchResult`.
//!
//! Flow: load documents → (parallel, bounded) fetch + extract + structure →
//! join barrier → match engine → curate → aggregate → INSERT result row.
//!
//! Containment rules: an unreadable document or a degraded structuring call
//! excludes/empties that one document and the batch continues. An error from
//! the match engine itself, or the run deadline expiring, aborts the run and
//! persists nothing.

pub mod handlers;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extraction::extract_text;
use crate::extraction::structuring::structure_jd;
use crate::matching::analytics::{aggregate, AnalyticsReport};
use crate::matching::curation::{curate, CuratedOutput};
use crate::matching::{MatchOutput, ResumeInput, RoleProfile};
use crate::models::document::{JobDescriptionRow, ResumeRow};
use crate::models::result::MatchResultRecord;
use crate::state::AppState;

/// Runs one analysis to completion under the exclusive run marker and the
/// configured deadline. On timeout the run fails cleanly — no partial result
/// row is left behind.
pub async fn run_analysis(state: &AppState) -> Result<MatchResultRecord, AppError> {
    let guard = state.run_lock.clone();
    let _guard = guard.try_lock().map_err(|_| AppError::AnalysisInProgress)?;

    let deadline = Duration::from_secs(state.config.run_timeout_secs);
    match tokio::time::timeout(deadline, execute_run(state)).await {
        Ok(result) => result,
        Err(_) => {
            warn!("Analysis run exceeded {}s deadline, aborting", deadline.as_secs());
            Err(AppError::RunTimeout)
        }
    }
}

async fn execute_run(state: &AppState) -> Result<MatchResultRecord, AppError> {
    let jds: Vec<JobDescriptionRow> =
        sqlx::query_as("SELECT * FROM job_descriptions ORDER BY created_at ASC")
            .fetch_all(&state.db)
            .await?;
    let resumes: Vec<ResumeRow> = sqlx::query_as("SELECT * FROM resumes ORDER BY created_at ASC")
        .fetch_all(&state.db)
        .await?;

    if jds.is_empty() {
        return Err(AppError::Validation(
            "No job descriptions uploaded. Add at least one JD before running analysis.".into(),
        ));
    }
    if resumes.is_empty() {
        return Err(AppError::Validation(
            "No resumes uploaded. Add resumes before running analysis.".into(),
        ));
    }

    info!(
        "Starting analysis run: {} JDs, {} resumes, strategy={}",
        jds.len(),
        resumes.len(),
        state.matcher.name()
    );

    // Per-document work is independent, so it runs under a bounded pool; the
    // reduction below only starts after both joins complete.
    let roles = build_role_profiles(state, jds).await?;
    let pool = build_resume_pool(state, resumes).await?;

    if roles.is_empty() {
        return Err(AppError::Validation(
            "Every job description failed extraction; nothing to match against.".into(),
        ));
    }

    let raw = state.matcher.run(&roles, &pool).await?;
    let (curated, analytics) = finalize(&raw);

    let record = MatchResultRecord {
        id: Uuid::new_v4(),
        matched: curated.matched,
        unmatched: curated.unmatched,
        needs_review: curated.needs_review,
        analytics: Some(analytics),
        strategy: state.matcher.name().to_string(),
        created_at: Utc::now(),
    };
    persist(state, &record).await?;

    info!(
        "Analysis run {} complete: {} roles matched, {} unmatched, {} need review",
        record.id,
        record.matched.len(),
        record.unmatched.len(),
        record.needs_review.len()
    );
    Ok(record)
}

/// The reduction step: curation then aggregation, after the join barrier.
pub fn finalize(raw: &MatchOutput) -> (CuratedOutput, AnalyticsReport) {
    let curated = curate(raw);
    let analytics = aggregate(&curated);
    (curated, analytics)
}

/// Fetches, extracts and structures every JD under the concurrency bound.
/// An unreadable or unfetchable JD is excluded from the role set with a
/// warning; a degraded structuring result keeps its role with empty content.
/// Input order is restored after the join so role insertion order is stable.
async fn build_role_profiles(
    state: &AppState,
    jds: Vec<JobDescriptionRow>,
) -> Result<Vec<RoleProfile>, AppError> {
    let semaphore = Arc::new(Semaphore::new(state.config.max_concurrent_docs));
    let mut set: JoinSet<(usize, Option<RoleProfile>)> = JoinSet::new();

    for (idx, jd) in jds.into_iter().enumerate() {
        let semaphore = semaphore.clone();
        let store = state.store.clone();
        let llm = state.llm.clone();
        set.spawn(async move {
            let _permit = semaphore.acquire_owned().await.expect("semaphore closed");

            let bytes = match store.fetch(&jd.blob_key).await {
                Ok(b) => b,
                Err(e) => {
                    warn!("Skipping JD '{}': {e}", jd.original_filename);
                    return (idx, None);
                }
            };
            let text = match extract_text(&bytes, &jd.original_filename) {
                Ok(t) => t,
                Err(e) => {
                    warn!("Skipping JD '{}': {e}", jd.original_filename);
                    return (idx, None);
                }
            };
            let structured = structure_jd(&text, &jd.original_filename, &llm).await;
            (
                idx,
                Some(RoleProfile {
                    jd_id: jd.id,
                    role_name: jd.original_filename,
                    structured,
                }),
            )
        });
    }

    let mut indexed = Vec::new();
    while let Some(joined) = set.join_next().await {
        let (idx, profile) = joined
            .map_err(|e| AppError::Internal(anyhow::anyhow!("JD worker panicked: {e}")))?;
        if let Some(profile) = profile {
            indexed.push((idx, profile));
        }
    }
    indexed.sort_by_key(|(idx, _)| *idx);
    Ok(indexed.into_iter().map(|(_, p)| p).collect())
}

/// Fetches and extracts every resume under the concurrency bound. Text is
/// extracted once here and reused for the whole run. Unreadable resumes are
/// excluded with a warning.
async fn build_resume_pool(
    state: &AppState,
    resumes: Vec<ResumeRow>,
) -> Result<Vec<ResumeInput>, AppError> {
    let semaphore = Arc::new(Semaphore::new(state.config.max_concurrent_docs));
    let mut set: JoinSet<(usize, Option<ResumeInput>)> = JoinSet::new();

    for (idx, resume) in resumes.into_iter().enumerate() {
        let semaphore = semaphore.clone();
        let store = state.store.clone();
        set.spawn(async move {
            let _permit = semaphore.acquire_owned().await.expect("semaphore closed");

            let bytes = match store.fetch(&resume.blob_key).await {
                Ok(b) => b,
                Err(e) => {
                    warn!("Skipping resume '{}': {e}", resume.original_filename);
                    return (idx, None);
                }
            };
            match extract_text(&bytes, &resume.original_filename) {
                Ok(text) => (
                    idx,
                    Some(ResumeInput {
                        id: resume.id,
                        filename: resume.original_filename,
                        text,
                    }),
                ),
                Err(e) => {
                    warn!("Skipping resume '{}': {e}", resume.original_filename);
                    (idx, None)
                }
            }
        });
    }

    let mut indexed = Vec::new();
    while let Some(joined) = set.join_next().await {
        let (idx, input) = joined
            .map_err(|e| AppError::Internal(anyhow::anyhow!("resume worker panicked: {e}")))?;
        if let Some(input) = input {
            indexed.push((idx, input));
        }
    }
    indexed.sort_by_key(|(idx, _)| *idx);
    Ok(indexed.into_iter().map(|(_, r)| r).collect())
}

async fn persist(state: &AppState, record: &MatchResultRecord) -> Result<(), AppError> {
    let matched = serde_json::to_value(&record.matched)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("serialize matched: {e}")))?;
    let unmatched = serde_json::to_value(&record.unmatched)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("serialize unmatched: {e}")))?;
    let needs_review = serde_json::to_value(&record.needs_review)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("serialize needs_review: {e}")))?;
    let analytics = record
        .analytics
        .as_ref()
        .map(serde_json::to_value)
        .transpose()
        .map_err(|e| AppError::Internal(anyhow::anyhow!("serialize analytics: {e}")))?;

    sqlx::query(
        r#"
        INSERT INTO match_results
            (id, matched, unmatched, needs_review, analytics, strategy, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(record.id)
    .bind(matched)
    .bind(unmatched)
    .bind(needs_review)
    .bind(analytics)
    .bind(&record.strategy)
    .bind(record.created_at)
    .execute(&state.db)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::{MatchCandidate, ResumeRef, RoleTally};
    use serde_json::json;
    use std::collections::BTreeMap;

    fn candidate(filename: &str, role: &str, explanation: &str) -> MatchCandidate {
        MatchCandidate {
            resume_filename: filename.to_string(),
            resume: ResumeRef {
                id: Uuid::new_v4(),
                filename: filename.to_string(),
            },
            role: role.to_string(),
            score: Some(0.8),
            explanation: explanation.to_string(),
            metadata: json!({}),
        }
    }

    /// End-to-end reduction: curation feeds aggregation, counts reflect only
    /// survivors, and the resume partition invariant holds.
    #[test]
    fn test_finalize_composes_curation_and_aggregation() {
        let mut matched = BTreeMap::new();
        matched.insert(
            "engineer.pdf".to_string(),
            vec![
                candidate("a.pdf", "engineer.pdf", "Strong match"),
                candidate("b.pdf", "engineer.pdf", "Insufficient data to assess fit"),
            ],
        );
        matched.insert(
            "intern.pdf".to_string(),
            vec![candidate("c.pdf", "intern.pdf", "Insufficient history")],
        );
        let raw = MatchOutput {
            matched,
            unmatched: vec!["d.pdf".to_string()],
            tallies: BTreeMap::from([("engineer.pdf".to_string(), RoleTally::default())]),
        };

        let (curated, analytics) = finalize(&raw);

        // intern.pdf emptied by the filter and pruned; engineer.pdf keeps a.pdf.
        assert!(!curated.matched.contains_key("intern.pdf"));
        assert_eq!(curated.matched["engineer.pdf"].len(), 1);
        assert_eq!(curated.needs_review.len(), 2);
        assert_eq!(curated.unmatched, vec!["d.pdf".to_string()]);

        assert_eq!(analytics.per_role.len(), 1);
        assert_eq!(analytics.per_role["engineer.pdf"].applied_count, 1);
        assert_eq!(analytics.total_applications, 1);
    }

    #[test]
    fn test_finalize_of_empty_output_is_empty() {
        let (curated, analytics) = finalize(&MatchOutput::default());
        assert!(curated.matched.is_empty());
        assert!(analytics.per_role.is_empty());
        assert_eq!(analytics.total_applications, 0);
    }
}
