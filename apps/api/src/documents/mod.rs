//! Document management — upload, list and delete JD/resume documents.
//!
//! Upload order matters: bytes go to the blob store first and the database
//! row is only inserted after the upload succeeds, so a failed upload never
//! leaves a dangling record. Delete removes the blob first and keeps the row
//! when the blob delete fails, surfacing the storage error to the caller.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::document::{JobDescriptionRow, ResumeRow};
use crate::state::AppState;

#[derive(Debug, Clone, Copy)]
pub enum DocumentKind {
    JobDescription,
    Resume,
}

impl DocumentKind {
    fn table(&self) -> &'static str {
        match self {
            DocumentKind::JobDescription => "job_descriptions",
            DocumentKind::Resume => "resumes",
        }
    }

    fn blob_prefix(&self) -> &'static str {
        match self {
            DocumentKind::JobDescription => "jds",
            DocumentKind::Resume => "resumes",
        }
    }
}

/// Per-file upload result. Multi-file uploads report each file individually
/// so one bad file does not hide the others.
#[derive(Debug, Serialize)]
pub struct UploadOutcome {
    pub filename: String,
    pub id: Option<Uuid>,
    pub error: Option<String>,
}

/// POST /api/v1/jds (multipart)
pub async fn handle_upload_jds(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<Vec<UploadOutcome>>, AppError> {
    upload_from_multipart(&state, DocumentKind::JobDescription, multipart).await
}

/// POST /api/v1/resumes (multipart, accepts multiple files)
pub async fn handle_upload_resumes(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<Vec<UploadOutcome>>, AppError> {
    upload_from_multipart(&state, DocumentKind::Resume, multipart).await
}

/// GET /api/v1/jds
pub async fn handle_list_jds(
    State(state): State<AppState>,
) -> Result<Json<Vec<JobDescriptionRow>>, AppError> {
    let rows = sqlx::query_as("SELECT * FROM job_descriptions ORDER BY created_at ASC")
        .fetch_all(&state.db)
        .await?;
    Ok(Json(rows))
}

/// GET /api/v1/resumes
pub async fn handle_list_resumes(
    State(state): State<AppState>,
) -> Result<Json<Vec<ResumeRow>>, AppError> {
    let rows = sqlx::query_as("SELECT * FROM resumes ORDER BY created_at ASC")
        .fetch_all(&state.db)
        .await?;
    Ok(Json(rows))
}

/// DELETE /api/v1/jds/:id
pub async fn handle_delete_jd(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    delete_document(&state, DocumentKind::JobDescription, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/resumes/:id
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    delete_document(&state, DocumentKind::Resume, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn upload_from_multipart(
    state: &AppState,
    kind: DocumentKind,
    mut multipart: Multipart,
) -> Result<Json<Vec<UploadOutcome>>, AppError> {
    let mut outcomes = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let Some(filename) = field.file_name().map(String::from) else {
            continue;
        };
        let content_type = field
            .content_type()
            .unwrap_or("application/pdf")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Could not read '{filename}': {e}")))?;

        match store_document(state, kind, &filename, bytes, &content_type).await {
            Ok(id) => outcomes.push(UploadOutcome {
                filename,
                id: Some(id),
                error: None,
            }),
            Err(e) => {
                warn!("Upload of '{filename}' failed: {e}");
                outcomes.push(UploadOutcome {
                    filename,
                    id: None,
                    error: Some(e.to_string()),
                });
            }
        }
    }

    if outcomes.is_empty() {
        return Err(AppError::Validation(
            "No file fields found in the upload".to_string(),
        ));
    }
    Ok(Json(outcomes))
}

async fn store_document(
    state: &AppState,
    kind: DocumentKind,
    filename: &str,
    bytes: bytes::Bytes,
    content_type: &str,
) -> Result<Uuid, AppError> {
    let exists: bool = sqlx::query_scalar(&format!(
        "SELECT EXISTS(SELECT 1 FROM {} WHERE original_filename = $1)",
        kind.table()
    ))
    .bind(filename)
    .fetch_one(&state.db)
    .await?;
    if exists {
        return Err(AppError::Validation(format!(
            "A document with the filename '{filename}' already exists"
        )));
    }

    let id = Uuid::new_v4();
    let blob_key = format!("{}/{}/{}", kind.blob_prefix(), id, filename);

    // Blob first; the row only exists once the upload succeeded.
    state.store.store(&blob_key, bytes, content_type).await?;

    sqlx::query(&format!(
        "INSERT INTO {} (id, original_filename, blob_key) VALUES ($1, $2, $3)",
        kind.table()
    ))
    .bind(id)
    .bind(filename)
    .bind(&blob_key)
    .execute(&state.db)
    .await?;

    info!("Uploaded {} '{filename}' as {id}", kind.table());
    Ok(id)
}

async fn delete_document(
    state: &AppState,
    kind: DocumentKind,
    id: Uuid,
) -> Result<(), AppError> {
    let blob_key: Option<String> = sqlx::query_scalar(&format!(
        "SELECT blob_key FROM {} WHERE id = $1",
        kind.table()
    ))
    .bind(id)
    .fetch_optional(&state.db)
    .await?;
    let blob_key =
        blob_key.ok_or_else(|| AppError::NotFound(format!("Document {id} not found")))?;

    // Blob delete failure keeps the row so the document stays visible and the
    // operation can be retried.
    state.store.delete(&blob_key).await?;

    sqlx::query(&format!("DELETE FROM {} WHERE id = $1", kind.table()))
        .bind(id)
        .execute(&state.db)
        .await?;

    info!("Deleted {} document {id}", kind.table());
    Ok(())
}
