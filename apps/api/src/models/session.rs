use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MatchSessionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub cv_text: String,
    pub preferences_text: String,
    /// StructuredProfile snapshot every job in the session was scored against,
    /// or null when there were no listings.
    pub structured_profile: Value,
    /// Model name, or "simulation".
    pub ai_backend: String,
    pub matched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MatchedJobRow {
    pub id: Uuid,
    pub match_session_id: Uuid,
    pub job_id: String,
    pub job_title: String,
    pub company_name: String,
    pub score: i16,
    pub rank: i32,
    pub reason: String,
    pub insights: String,
    pub tips: String,
    pub created_at: DateTime<Utc>,
}

/// One line of a user's match history.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MatchSessionSummaryRow {
    pub id: Uuid,
    pub matched_at: DateTime<Utc>,
    pub ai_backend: String,
    pub job_count: i64,
    pub top_score: Option<i16>,
}
