use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A stored job description document. The structured record is computed per
/// run, not persisted here; this row only anchors identity and the blob.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobDescriptionRow {
    pub id: Uuid,
    pub original_filename: String,
    pub blob_key: String,
    pub created_at: DateTime<Utc>,
}

/// A stored resume document. Raw text is extracted lazily, once per run.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub original_filename: String,
    pub blob_key: String,
    pub created_at: DateTime<Utc>,
}
