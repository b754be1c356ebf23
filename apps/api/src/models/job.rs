use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::matching::models::JobRecord;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct JobListingRow {
    pub id: String,
    pub job_title: String,
    pub company_name: String,
    pub description: Option<String>,
    pub level: Option<String>,
    pub location: Option<String>,
    pub industry: Option<String>,
    pub application_url: Option<String>,
    pub flexibility: Option<String>,
    pub salary_range: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<JobListingRow> for JobRecord {
    fn from(row: JobListingRow) -> Self {
        JobRecord {
            id: row.id,
            title: row.job_title,
            company: row.company_name,
            description: row.description,
            level: row.level,
            location: row.location,
            industry: row.industry,
            application_url: row.application_url,
            flexibility: row.flexibility,
            salary_range: row.salary_range,
        }
    }
}
