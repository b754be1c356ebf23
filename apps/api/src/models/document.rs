use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct GeneratedDocumentRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub job_id: String,
    /// "cover_letter" | "custom_resume"
    pub kind: String,
    pub content: String,
    pub simulated: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
