//! API request handlers.
//!
//! This module contains all HTTP request handlers organized by functionality.

/// Question answering.
pub mod chat;
/// Conversation history handlers.
pub mod conversations;
/// Corpus statistics, recent acts and topic browsing.
pub mod corpus;
/// Service health.
pub mod health;
/// Vector index (re)build.
pub mod index;
/// Answer mode descriptions.
pub mod modes;
/// Retrieval without generation.
pub mod search;

use crate::rag::search::SearchStrategy;
use crate::types::{AppError, Result};
use crate::utils::toml_config::MAX_TOP_K;

/// Validate a requested `top_k`, falling back to the configured default.
pub(crate) fn resolve_top_k(requested: Option<usize>, default: usize) -> Result<usize> {
    let top_k = requested.unwrap_or(default);
    if !(1..=MAX_TOP_K).contains(&top_k) {
        return Err(AppError::InvalidInput(format!(
            "top_k must be between 1 and {}",
            MAX_TOP_K
        )));
    }
    Ok(top_k)
}

/// Parse a requested strategy, falling back to the configured default.
pub(crate) fn resolve_strategy(
    requested: Option<&str>,
    default: SearchStrategy,
) -> Result<SearchStrategy> {
    match requested.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => s.parse(),
        None => Ok(default),
    }
}
