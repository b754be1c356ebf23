use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Service version plus which AI backend is answering.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "jobmatch-api",
        "ai_backend": state.engine.backend_label(),
        "simulation": state.engine.is_simulated(),
        "simulation_reason": state.engine.simulation_reason().map(|r| r.to_string()),
    }))
}
