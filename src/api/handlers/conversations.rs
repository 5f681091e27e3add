//! Conversation history handlers.
//!
//! Conversations are created implicitly by `POST /api/chat`.

use crate::{
    AppState,
    types::{AppError, ChatMessage, Result},
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use utoipa::ToSchema;

/// Full conversation with messages.
#[derive(Debug, Serialize, ToSchema)]
pub struct ConversationDetails {
    /// Conversation identifier
    pub id: String,
    /// Messages in the conversation, oldest first
    pub messages: Vec<ChatMessage>,
}

/// Get a conversation with all messages.
#[utoipa::path(
    get,
    path = "/api/conversations/{id}",
    params(
        ("id" = String, Path, description = "Conversation ID")
    ),
    responses(
        (status = 200, description = "Conversation details", body = ConversationDetails),
        (status = 404, description = "Conversation not found")
    ),
    tag = "conversations"
)]
pub async fn get_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ConversationDetails>> {
    let messages = state
        .conversations
        .history(&id)
        .ok_or_else(|| AppError::NotFound(format!("Conversation {} not found", id)))?;

    Ok(Json(ConversationDetails { id, messages }))
}

/// Delete a conversation.
#[utoipa::path(
    delete,
    path = "/api/conversations/{id}",
    params(
        ("id" = String, Path, description = "Conversation ID")
    ),
    responses(
        (status = 204, description = "Conversation deleted"),
        (status = 404, description = "Conversation not found")
    ),
    tag = "conversations"
)]
pub async fn delete_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    if !state.conversations.clear(&id) {
        return Err(AppError::NotFound(format!("Conversation {} not found", id)));
    }
    Ok(StatusCode::NO_CONTENT)
}
