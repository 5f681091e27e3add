//! Vector index (re)build.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::{
    AppState,
    corpus::process_corpus,
    types::{AppError, BuildIndexResponse, Result},
};
use axum::{Json, extract::State};

/// Clears the build flag however the build ends.
struct BuildGuard(Arc<AtomicBool>);

impl Drop for BuildGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Process the corpus and rebuild the vector store. At most one build runs
/// at a time.
pub async fn rebuild_index(state: &AppState) -> Result<BuildIndexResponse> {
    if state
        .building
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_err()
    {
        return Err(AppError::Conflict(
            "An index build is already running".into(),
        ));
    }
    let _guard = BuildGuard(state.building.clone());

    let start = Instant::now();
    let config = state.config_manager.config();

    let (acts, chunks) = tokio::task::spawn_blocking(move || process_corpus(&config))
        .await
        .map_err(|e| AppError::Internal(format!("Corpus processing task failed: {}", e)))??;

    let chunk_count = state.assistant.build_vector_store(chunks).await?;
    let act_count = acts.len();
    *state.acts.write() = acts;

    let duration_ms = start.elapsed().as_millis() as u64;
    tracing::info!(acts = act_count, chunks = chunk_count, duration_ms, "Index rebuilt");

    Ok(BuildIndexResponse {
        acts: act_count,
        chunks: chunk_count,
        duration_ms,
    })
}

/// Rebuild the vector index from the corpus CSV
#[utoipa::path(
    post,
    path = "/api/index/build",
    responses(
        (status = 200, description = "Index rebuilt", body = BuildIndexResponse),
        (status = 409, description = "A build is already running"),
        (status = 500, description = "Corpus or index error")
    ),
    tag = "index"
)]
pub async fn build_index(State(state): State<AppState>) -> Result<Json<BuildIndexResponse>> {
    Ok(Json(rebuild_index(&state).await?))
}
