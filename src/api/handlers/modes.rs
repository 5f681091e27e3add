use crate::rag::prompt::{AssistantMode, ModeInfo};
use axum::Json;

/// Describe the answer modes with example questions.
#[utoipa::path(
    get,
    path = "/api/modes",
    responses(
        (status = 200, description = "Available answer modes", body = Vec<ModeInfo>)
    ),
    tag = "chat"
)]
pub async fn list_modes() -> Json<Vec<ModeInfo>> {
    Json(AssistantMode::ALL.iter().map(AssistantMode::info).collect())
}
