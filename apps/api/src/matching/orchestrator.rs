//! Runs one matching pass end to end and persists it as a match session.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::engine::AiEngine;
use crate::matching::insights::split_bullets;
use crate::matching::listings::fetch_todays_jobs;
use crate::matching::matcher::match_jobs;
use crate::matching::models::{JobRecord, MatchResult, StructuredProfile};
use crate::matching::profile::extract_user_profile;
use crate::models::session::{MatchSessionRow, MatchSessionSummaryRow, MatchedJobRow};
use crate::profile::store::{get_profile, upsert_profile};

pub const NO_LISTINGS_REASON: &str =
    "No new job listings found for today. Matching cannot proceed with current day's data.";

#[derive(Debug, Deserialize)]
pub struct MatchRequest {
    pub user_id: Uuid,
    #[serde(default)]
    pub cv_text: Option<String>,
    #[serde(default)]
    pub preferences_text: Option<String>,
    #[serde(default)]
    pub max_jobs: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct MatchedJobView {
    #[serde(flatten)]
    pub row: MatchedJobRow,
    pub insights_list: Vec<String>,
}

impl From<MatchedJobRow> for MatchedJobView {
    fn from(row: MatchedJobRow) -> Self {
        let insights_list = split_bullets(&row.insights);
        MatchedJobView { row, insights_list }
    }
}

#[derive(Debug, Serialize)]
pub struct MatchSessionDetail {
    pub session: MatchSessionRow,
    pub matched_jobs: Vec<MatchedJobView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_match_reason: Option<String>,
}

/// POST /api/v1/matches, minus the HTTP.
///
/// 1. Resolve CV and preferences from the request, falling back to the stored profile
/// 2. Reject an empty CV
/// 3. Fetch today's listings
/// 4. Extract the structured profile and match, only when there are listings
/// 5. Store session + matched jobs in one transaction
pub async fn run_match(
    pool: &PgPool,
    engine: &AiEngine,
    default_max_jobs: usize,
    request: MatchRequest,
) -> Result<MatchSessionDetail, AppError> {
    let MatchRequest {
        user_id,
        cv_text,
        preferences_text,
        max_jobs,
    } = request;

    let cv_text = non_blank(cv_text);
    let preferences_text = non_blank(preferences_text);

    let stored = get_profile(pool, user_id).await?;
    let resolved_cv = cv_text
        .clone()
        .or_else(|| stored.as_ref().map(|p| p.cv_text.clone()))
        .unwrap_or_default();
    let resolved_preferences = preferences_text
        .clone()
        .or_else(|| stored.as_ref().map(|p| p.preferences_text.clone()))
        .unwrap_or_default();

    if cv_text.is_some() || preferences_text.is_some() {
        upsert_profile(
            pool,
            user_id,
            cv_text.as_deref(),
            preferences_text.as_deref(),
        )
        .await?;
    }

    if resolved_cv.trim().is_empty() {
        return Err(AppError::Validation(
            "Your CV is empty. Please update your profile before matching jobs.".to_string(),
        ));
    }

    let jobs = fetch_todays_jobs(pool).await?;
    let no_match_reason = jobs.is_empty().then(|| NO_LISTINGS_REASON.to_string());

    let max_jobs = max_jobs.unwrap_or(default_max_jobs);
    let scored = score_listings(
        engine,
        &resolved_cv,
        &resolved_preferences,
        &jobs,
        max_jobs,
    )
    .await;
    let (profile, results) = match &scored {
        Some((profile, results)) => (Some(profile), results.as_slice()),
        None => (None, &[][..]),
    };

    let (session, matched_jobs) = persist_session(
        pool,
        NewSession {
            user_id,
            cv_text: &resolved_cv,
            preferences_text: &resolved_preferences,
            profile,
            ai_backend: &engine.backend_label(),
        },
        results,
    )
    .await?;

    info!(
        "Match session {} stored for user {user_id} with {} jobs",
        session.id,
        matched_jobs.len()
    );

    Ok(MatchSessionDetail {
        session,
        matched_jobs: matched_jobs.into_iter().map(MatchedJobView::from).collect(),
        no_match_reason,
    })
}

/// Extracts the profile and scores `jobs` against it. With no listings there
/// is nothing to score, so no AI call is made and the session keeps no
/// profile snapshot.
pub(crate) async fn score_listings(
    engine: &AiEngine,
    cv_text: &str,
    preferences_text: &str,
    jobs: &[JobRecord],
    max_jobs: usize,
) -> Option<(StructuredProfile, Vec<MatchResult>)> {
    if jobs.is_empty() {
        info!("No listings today, skipping profile extraction");
        return None;
    }

    let profile = extract_user_profile(engine, cv_text, preferences_text).await;
    let results = match_jobs(engine, &profile, jobs, Some(max_jobs)).await;
    Some((profile, results))
}

/// Pairs each result with its position. Rank orders equal scores when the
/// session is read back.
fn ranked(results: &[MatchResult]) -> impl Iterator<Item = (i32, &MatchResult)> {
    (0..).zip(results)
}

const SESSION_JOBS_QUERY: &str = r#"
        SELECT *
        FROM matched_jobs
        WHERE match_session_id = $1
        ORDER BY score DESC, rank ASC
        "#;

struct NewSession<'a> {
    user_id: Uuid,
    cv_text: &'a str,
    preferences_text: &'a str,
    profile: Option<&'a StructuredProfile>,
    ai_backend: &'a str,
}

async fn persist_session(
    pool: &PgPool,
    new: NewSession<'_>,
    results: &[MatchResult],
) -> Result<(MatchSessionRow, Vec<MatchedJobRow>), AppError> {
    let structured_profile =
        serde_json::to_value(new.profile).context("Failed to serialize structured profile")?;

    let mut tx = pool.begin().await?;

    let session = sqlx::query_as::<_, MatchSessionRow>(
        r#"
        INSERT INTO match_sessions
            (id, user_id, cv_text, preferences_text, structured_profile, ai_backend)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(new.user_id)
    .bind(new.cv_text)
    .bind(new.preferences_text)
    .bind(&structured_profile)
    .bind(new.ai_backend)
    .fetch_one(&mut *tx)
    .await?;

    let mut matched_jobs = Vec::with_capacity(results.len());
    for (rank, result) in ranked(results) {
        let row = sqlx::query_as::<_, MatchedJobRow>(
            r#"
            INSERT INTO matched_jobs
                (id, match_session_id, job_id, job_title, company_name,
                 score, rank, reason, insights, tips)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(session.id)
        .bind(&result.job.id)
        .bind(&result.job.title)
        .bind(&result.job.company)
        .bind(i16::from(result.score))
        .bind(rank)
        .bind(&result.reason)
        .bind(&result.insights)
        .bind(&result.tips)
        .fetch_one(&mut *tx)
        .await?;
        matched_jobs.push(row);
    }

    tx.commit().await?;
    Ok((session, matched_jobs))
}

/// Session detail with jobs best-first. Sessions of other users are not found.
pub async fn get_session(
    pool: &PgPool,
    user_id: Uuid,
    session_id: Uuid,
) -> Result<MatchSessionDetail, AppError> {
    let session = sqlx::query_as::<_, MatchSessionRow>(
        "SELECT * FROM match_sessions WHERE id = $1 AND user_id = $2",
    )
    .bind(session_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Match session {session_id} not found")))?;

    let matched_jobs = sqlx::query_as::<_, MatchedJobRow>(SESSION_JOBS_QUERY)
        .bind(session_id)
        .fetch_all(pool)
        .await?;

    Ok(MatchSessionDetail {
        session,
        matched_jobs: matched_jobs.into_iter().map(MatchedJobView::from).collect(),
        no_match_reason: None,
    })
}

/// Most recent first.
pub async fn list_sessions(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<MatchSessionSummaryRow>, AppError> {
    Ok(sqlx::query_as::<_, MatchSessionSummaryRow>(
        r#"
        SELECT s.id, s.matched_at, s.ai_backend,
               COUNT(m.id) AS job_count,
               MAX(m.score) AS top_score
        FROM match_sessions s
        LEFT JOIN matched_jobs m ON m.match_session_id = s.id
        WHERE s.user_id = $1
        GROUP BY s.id
        ORDER BY s.matched_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
