pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::matching::handlers as matching;
use crate::profile::cv_upload::MAX_CV_BYTES;
use crate::profile::handlers as profile;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Matching
        .route(
            "/api/v1/matches",
            post(matching::handle_run_match).get(matching::handle_list_matches),
        )
        .route("/api/v1/matches/:session_id", get(matching::handle_get_match))
        // Candidate profile
        .route(
            "/api/v1/profile",
            get(profile::handle_get_profile).put(profile::handle_update_profile),
        )
        .route("/api/v1/profile/extract", post(profile::handle_extract_profile))
        .route(
            "/api/v1/profile/cv",
            post(profile::handle_upload_cv).layer(DefaultBodyLimit::max(MAX_CV_BYTES)),
        )
        // Per-job documents
        .route(
            "/api/v1/jobs/:job_id/cover-letter",
            post(matching::handle_cover_letter),
        )
        .route(
            "/api/v1/jobs/:job_id/custom-resume",
            post(matching::handle_custom_resume),
        )
        .route(
            "/api/v1/jobs/:job_id/documents",
            get(matching::handle_list_documents),
        )
        .with_state(state)
}
