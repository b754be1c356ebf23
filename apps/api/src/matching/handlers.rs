use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::documents::{list_documents, write_document, DocumentResponse};
use crate::matching::orchestrator::{
    get_session, list_sessions, run_match, MatchRequest, MatchSessionDetail,
};
use crate::matching::writer::DocumentKind;
use crate::models::document::GeneratedDocumentRow;
use crate::models::session::MatchSessionSummaryRow;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Deserialize)]
pub struct DocumentRequest {
    pub user_id: Uuid,
}

/// POST /api/v1/matches
pub async fn handle_run_match(
    State(state): State<AppState>,
    Json(req): Json<MatchRequest>,
) -> Result<Json<MatchSessionDetail>, AppError> {
    let detail = run_match(
        &state.db,
        &state.engine,
        state.config.max_jobs_to_process,
        req,
    )
    .await?;
    Ok(Json(detail))
}

/// GET /api/v1/matches
pub async fn handle_list_matches(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<MatchSessionSummaryRow>>, AppError> {
    Ok(Json(list_sessions(&state.db, params.user_id).await?))
}

/// GET /api/v1/matches/:session_id
pub async fn handle_get_match(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<MatchSessionDetail>, AppError> {
    Ok(Json(get_session(&state.db, params.user_id, session_id).await?))
}

/// POST /api/v1/jobs/:job_id/cover-letter
pub async fn handle_cover_letter(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    Json(req): Json<DocumentRequest>,
) -> Result<Json<DocumentResponse>, AppError> {
    let response = write_document(
        &state.db,
        &state.engine,
        req.user_id,
        &job_id,
        DocumentKind::CoverLetter,
    )
    .await?;
    Ok(Json(response))
}

/// POST /api/v1/jobs/:job_id/custom-resume
pub async fn handle_custom_resume(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    Json(req): Json<DocumentRequest>,
) -> Result<Json<DocumentResponse>, AppError> {
    let response = write_document(
        &state.db,
        &state.engine,
        req.user_id,
        &job_id,
        DocumentKind::CustomResume,
    )
    .await?;
    Ok(Json(response))
}

/// GET /api/v1/jobs/:job_id/documents
pub async fn handle_list_documents(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<GeneratedDocumentRow>>, AppError> {
    Ok(Json(list_documents(&state.db, params.user_id, &job_id).await?))
}
