use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::profile::CandidateProfileRow;

pub async fn get_profile(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Option<CandidateProfileRow>, AppError> {
    Ok(
        sqlx::query_as::<_, CandidateProfileRow>(
            "SELECT * FROM candidate_profiles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?,
    )
}

/// Inserts or updates the profile. `None` leaves the stored value alone
/// (or empty for a new profile).
pub async fn upsert_profile(
    pool: &PgPool,
    user_id: Uuid,
    cv_text: Option<&str>,
    preferences_text: Option<&str>,
) -> Result<CandidateProfileRow, AppError> {
    Ok(sqlx::query_as::<_, CandidateProfileRow>(
        r#"
        INSERT INTO candidate_profiles (user_id, cv_text, preferences_text, updated_at)
        VALUES ($1, COALESCE($2, ''), COALESCE($3, ''), now())
        ON CONFLICT (user_id) DO UPDATE SET
            cv_text = COALESCE($2, candidate_profiles.cv_text),
            preferences_text = COALESCE($3, candidate_profiles.preferences_text),
            updated_at = now()
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(cv_text)
    .bind(preferences_text)
    .fetch_one(pool)
    .await?)
}

/// Replaces the CV with text pulled from an uploaded file.
pub async fn set_uploaded_cv(
    pool: &PgPool,
    user_id: Uuid,
    cv_text: &str,
    s3_key: &str,
) -> Result<CandidateProfileRow, AppError> {
    Ok(sqlx::query_as::<_, CandidateProfileRow>(
        r#"
        INSERT INTO candidate_profiles (user_id, cv_text, cv_s3_key, updated_at)
        VALUES ($1, $2, $3, now())
        ON CONFLICT (user_id) DO UPDATE SET
            cv_text = EXCLUDED.cv_text,
            cv_s3_key = EXCLUDED.cv_s3_key,
            updated_at = now()
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(cv_text)
    .bind(s3_key)
    .fetch_one(pool)
    .await?)
}
