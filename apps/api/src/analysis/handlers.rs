use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::run_analysis;
use crate::errors::AppError;
use crate::matching::MatchCandidate;
use crate::models::result::{top_candidates, MatchResultRecord, MatchResultRow};
use crate::state::AppState;

#[derive(Serialize)]
pub struct RunResponse {
    pub result_id: Uuid,
    pub matched_roles: usize,
    pub unmatched: Vec<String>,
    /// Resumes removed as low-confidence — surfaced here, not persisted as
    /// matched or unmatched. They require human attention.
    pub needs_review: Vec<String>,
}

/// POST /api/v1/analysis
pub async fn handle_run_analysis(
    State(state): State<AppState>,
) -> Result<Json<RunResponse>, AppError> {
    let record = run_analysis(&state).await?;
    Ok(Json(RunResponse {
        result_id: record.id,
        matched_roles: record.matched.len(),
        unmatched: record.unmatched,
        needs_review: record.needs_review,
    }))
}

/// GET /api/v1/results/:id
pub async fn handle_get_result(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MatchResultRecord>, AppError> {
    let record = load_result(&state, id).await?;
    Ok(Json(record))
}

#[derive(Deserialize)]
pub struct TopQuery {
    pub role: String,
    pub count: Option<usize>,
}

#[derive(Serialize)]
pub struct TopResponse {
    pub result_id: Uuid,
    pub role: String,
    pub candidates: Vec<MatchCandidate>,
}

/// GET /api/v1/results/:id/top?role=...&count=N
///
/// Top N candidates for a role, sorted by score descending, stable on engine
/// insertion order. Defaults to 5 when `count` is omitted.
pub async fn handle_top_candidates(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<TopQuery>,
) -> Result<Json<TopResponse>, AppError> {
    let record = load_result(&state, id).await?;
    let candidates = record.matched.get(&query.role).ok_or_else(|| {
        AppError::NotFound(format!("Role '{}' not present in result {id}", query.role))
    })?;

    Ok(Json(TopResponse {
        result_id: id,
        role: query.role,
        candidates: top_candidates(candidates, query.count.unwrap_or(5)),
    }))
}

async fn load_result(state: &AppState, id: Uuid) -> Result<MatchResultRecord, AppError> {
    let row: Option<MatchResultRow> = sqlx::query_as("SELECT * FROM match_results WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?;
    let row = row.ok_or_else(|| AppError::NotFound(format!("Result {id} not found")))?;
    MatchResultRecord::from_row(row).map_err(AppError::Internal)
}
