use crate::{
    AppState,
    rag::{assistant::ChatQuery, prompt::AssistantMode},
    types::{AppError, ChatMessage, ChatRequest, ChatResponse, Result},
};
use axum::{Json, extract::State};
use uuid::Uuid;

use super::{resolve_strategy, resolve_top_k};

/// Ask the legal assistant a question
#[utoipa::path(
    post,
    path = "/api/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Answer with its sources", body = ChatResponse),
        (status = 400, description = "Invalid input"),
        (status = 503, description = "Vector store not built")
    ),
    tag = "chat"
)]
pub async fn chat(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    let message = payload.message.trim();
    if message.is_empty() {
        return Err(AppError::InvalidInput("Message cannot be empty".into()));
    }

    let config = state.config_manager.config();
    let top_k = resolve_top_k(payload.top_k, config.rag.top_k)?;
    let strategy = resolve_strategy(payload.strategy.as_deref(), config.rag.strategy)?;
    // Unknown modes answer in general mode
    let mode = payload
        .mode
        .as_deref()
        .map(AssistantMode::parse_lenient)
        .unwrap_or_default();
    let filters = payload.filters.unwrap_or_default();

    let conversation_id = payload
        .conversation_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    // History is a snapshot taken before answering. Concurrent questions on
    // one conversation each see the turns completed before they started.
    let history = state
        .conversations
        .recent(&conversation_id, config.rag.history_window);

    let answer = state
        .assistant
        .chat(ChatQuery {
            message,
            mode,
            top_k,
            filters: &filters,
            strategy,
            history: &history,
        })
        .await?;

    state.conversations.append_turn(
        &conversation_id,
        ChatMessage::user(message),
        ChatMessage::assistant(answer.response.clone(), answer.sources.clone()),
    );

    tracing::info!(
        conversation_id = %conversation_id,
        mode = %answer.mode,
        sources = answer.sources.len(),
        "Answered question"
    );

    Ok(Json(ChatResponse {
        response: answer.response,
        sources: answer.sources,
        conversation_id,
        mode: answer.mode,
    }))
}
