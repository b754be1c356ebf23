use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CandidateProfileRow {
    pub user_id: Uuid,
    pub cv_text: String,
    pub preferences_text: String,
    pub cv_s3_key: Option<String>,
    pub updated_at: DateTime<Utc>,
}
