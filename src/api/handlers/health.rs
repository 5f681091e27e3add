use crate::{AppState, types::HealthResponse};
use axum::{Json, extract::State};

/// Health check
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service status", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let ready = state.assistant.is_ready();

    Json(HealthResponse {
        // Search needs an index; report degraded until one is loaded
        status: if ready { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        vector_store_ready: ready,
        document_count: state.assistant.document_count(),
        embedding_model: state.assistant.embedder().model_name().to_string(),
        llm_model: state.assistant.llm_model().to_string(),
    })
}
