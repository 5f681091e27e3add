use std::time::Instant;

use crate::{
    AppState,
    types::{AppError, Result, SearchRequest, SearchResponse},
};
use axum::{Json, extract::State};

use super::{resolve_strategy, resolve_top_k};

/// Retrieve matching chunks without generating an answer.
#[utoipa::path(
    post,
    path = "/api/search",
    request_body = SearchRequest,
    responses(
        (status = 200, description = "Search results", body = SearchResponse),
        (status = 400, description = "Invalid request"),
        (status = 503, description = "Vector store not built")
    ),
    tag = "search"
)]
pub async fn search(
    State(state): State<AppState>,
    Json(payload): Json<SearchRequest>,
) -> Result<Json<SearchResponse>> {
    let start = Instant::now();

    let query = payload.query.trim();
    if query.is_empty() {
        return Err(AppError::InvalidInput("Query cannot be empty".into()));
    }

    let config = state.config_manager.config();
    let top_k = resolve_top_k(payload.top_k, config.rag.top_k)?;
    let strategy = resolve_strategy(payload.strategy.as_deref(), config.rag.strategy)?;
    let filters = payload.filters.unwrap_or_default();

    let results = state
        .assistant
        .search(query, top_k, &filters, strategy)
        .await?;

    Ok(Json(SearchResponse {
        total: results.len(),
        results,
        strategy,
        duration_ms: start.elapsed().as_millis() as u64,
    }))
}
