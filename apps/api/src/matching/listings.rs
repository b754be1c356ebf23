use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use sqlx::PgPool;
use tracing::info;

use crate::errors::AppError;
use crate::matching::models::JobRecord;
use crate::models::job::JobListingRow;

/// `[start, end)` of a UTC calendar day.
pub fn day_bounds(day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = day.and_time(NaiveTime::MIN).and_utc();
    let end = day
        .checked_add_days(Days::new(1))
        .map(|next| next.and_time(NaiveTime::MIN).and_utc())
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    (start, end)
}

/// Listings created during the current UTC day, oldest first.
pub async fn fetch_todays_jobs(pool: &PgPool) -> Result<Vec<JobRecord>, AppError> {
    let today = Utc::now().date_naive();
    let (start, end) = day_bounds(today);

    let rows = sqlx::query_as::<_, JobListingRow>(
        r#"
        SELECT *
        FROM job_listings
        WHERE created_at >= $1 AND created_at < $2
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    info!("Fetched {} job listings for {today}", rows.len());
    Ok(rows.into_iter().map(JobRecord::from).collect())
}

pub async fn fetch_job(pool: &PgPool, job_id: &str) -> Result<JobRecord, AppError> {
    sqlx::query_as::<_, JobListingRow>("SELECT * FROM job_listings WHERE id = $1")
        .bind(job_id)
        .fetch_optional(pool)
        .await?
        .map(JobRecord::from)
        .ok_or_else(|| AppError::NotFound(format!("Job listing {job_id} not found")))
}
