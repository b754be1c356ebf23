use axum::{
    extract::{Multipart, Query, State},
    Json,
};
use bytes::Bytes;
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::models::StructuredProfile;
use crate::matching::profile::extract_user_profile;
use crate::models::profile::CandidateProfileRow;
use crate::profile::cv_upload::{extract_pdf_text, looks_like_pdf, store_cv_pdf};
use crate::profile::store::{get_profile, set_uploaded_cv, upsert_profile};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Deserialize)]
pub struct ProfileUpdateRequest {
    pub user_id: Uuid,
    #[serde(default)]
    pub cv_text: Option<String>,
    #[serde(default)]
    pub preferences_text: Option<String>,
}

#[derive(Deserialize)]
pub struct ExtractProfileRequest {
    #[serde(default)]
    pub cv_text: String,
    #[serde(default)]
    pub preferences_text: String,
}

/// GET /api/v1/profile
pub async fn handle_get_profile(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<CandidateProfileRow>, AppError> {
    get_profile(&state.db, params.user_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("No profile for user {}", params.user_id)))
}

/// PUT /api/v1/profile
pub async fn handle_update_profile(
    State(state): State<AppState>,
    Json(req): Json<ProfileUpdateRequest>,
) -> Result<Json<CandidateProfileRow>, AppError> {
    if req.cv_text.is_none() && req.preferences_text.is_none() {
        return Err(AppError::Validation(
            "Provide cv_text and/or preferences_text".to_string(),
        ));
    }
    let row = upsert_profile(
        &state.db,
        req.user_id,
        req.cv_text.as_deref(),
        req.preferences_text.as_deref(),
    )
    .await?;
    Ok(Json(row))
}

/// POST /api/v1/profile/extract
/// Preview only; nothing is stored.
pub async fn handle_extract_profile(
    State(state): State<AppState>,
    Json(req): Json<ExtractProfileRequest>,
) -> Json<StructuredProfile> {
    Json(extract_user_profile(&state.engine, &req.cv_text, &req.preferences_text).await)
}

/// POST /api/v1/profile/cv
/// Multipart fields: `user_id`, `cv_file` (PDF).
pub async fn handle_upload_cv(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<CandidateProfileRow>, AppError> {
    let mut user_id: Option<Uuid> = None;
    let mut cv_file: Option<Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "user_id" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid user_id field: {e}")))?;
                let parsed = Uuid::parse_str(text.trim())
                    .map_err(|_| AppError::Validation("user_id must be a UUID".to_string()))?;
                user_id = Some(parsed);
            }
            "cv_file" => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid cv_file field: {e}")))?;
                cv_file = Some(data);
            }
            _ => {}
        }
    }

    let user_id = user_id.ok_or_else(|| AppError::Validation("Missing user_id".to_string()))?;
    let cv_file = cv_file.ok_or_else(|| AppError::Validation("Missing cv_file".to_string()))?;

    if !looks_like_pdf(&cv_file) {
        return Err(AppError::Validation(
            "Only PDF files are allowed".to_string(),
        ));
    }

    let cv_text = extract_pdf_text(cv_file.clone()).await?;
    let s3_key = store_cv_pdf(&state.s3, &state.config.s3_bucket, user_id, cv_file).await?;
    let row = set_uploaded_cv(&state.db, user_id, &cv_text, &s3_key).await?;

    Ok(Json(row))
}
