//! # Adalat - Bangladesh legal assistant server
//!
//! A retrieval-augmented question-answering server over the Bangladesh legal
//! corpus. Acts are loaded from a CSV export, split into overview and section
//! chunks, embedded into a flat vector index and searched semantically,
//! lexically (BM25) or both. Answers come from an LLM (Gemini by default)
//! prompted in one of five modes.
//!
//! ## Overview
//!
//! Adalat can be used in two ways:
//!
//! 1. **As a standalone server** - Run the `adalat-server` binary
//! 2. **As a library** - Import the pipeline pieces into your own project
//!
//! ### Basic Example
//!
//! ```rust,ignore
//! use adalat::{AdalatConfig, LegalAssistant, LLMClientFactory};
//! use adalat::rag::{embeddings::build_embedder, prompt::AssistantMode, search::SearchFilters};
//! use std::sync::Arc;
//!
//! let config = AdalatConfig::load("adalat.toml")?;
//! let embedder = build_embedder(&config.rag)?;
//! let llm = LLMClientFactory::from_config(&config)?.create_default().await?;
//! let assistant = LegalAssistant::new(embedder, Arc::from(llm), &config.rag.vector_store_path);
//!
//! assistant.load_vector_store().await?;
//! let hits = assistant
//!     .search("bail for non-bailable offences", 5, &SearchFilters::default(), config.rag.strategy)
//!     .await?;
//! let answer = assistant
//!     .generate_response("bail for non-bailable offences", &hits, AssistantMode::Lawyer, &[])
//!     .await;
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `openai` | OpenAI-compatible LLM provider |
//! | `ollama` | Ollama local inference |
//! | `local-embeddings` | fastembed ONNX sentence embeddings |
//! | `swagger-ui` | Interactive API docs at `/swagger-ui` |
//!
//! ## Modules
//!
//! - [`api`] - REST API handlers and routes
//! - [`cli`] - Command-line interface
//! - [`corpus`] - CSV loading, cleaning, chunking, statistics and topics
//! - [`llm`] - LLM client implementations
//! - [`memory`] - Conversation history
//! - [`rag`] - Embeddings, vector store, search, prompts and the assistant
//! - [`types`] - Common types and error handling
//! - [`utils`] - TOML configuration with hot reload

#![cfg_attr(docsrs, feature(doc_cfg))]

/// HTTP API handlers and routes.
pub mod api;
/// Command-line interface.
pub mod cli;
/// Legal corpus ingestion and analytics.
pub mod corpus;
/// LLM provider clients and abstractions.
pub mod llm;
/// Conversation memory.
pub mod memory;
/// Retrieval Augmented Generation (RAG) components.
pub mod rag;
/// Core types (requests, responses, errors).
pub mod types;
/// Configuration utilities.
pub mod utils;

// Re-export commonly used types
pub use corpus::ActRecord;
pub use llm::{LLMClient, LLMClientFactory, Provider};
pub use memory::ConversationStore;
pub use rag::assistant::LegalAssistant;
pub use types::{AppError, Result};
pub use utils::toml_config::{AdalatConfig, AdalatConfigManager};

use parking_lot::RwLock;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// TOML configuration with hot-reload support
    pub config_manager: Arc<AdalatConfigManager>,
    /// Retrieval and generation over the vector store
    pub assistant: Arc<LegalAssistant>,
    /// In-memory conversation histories
    pub conversations: Arc<ConversationStore>,
    /// Acts from the last processed corpus, for statistics and topics
    pub acts: Arc<RwLock<Vec<ActRecord>>>,
    /// Set while an index build is running
    pub building: Arc<AtomicBool>,
}

impl AppState {
    pub fn new(
        config_manager: Arc<AdalatConfigManager>,
        assistant: Arc<LegalAssistant>,
        acts: Vec<ActRecord>,
    ) -> Self {
        Self {
            config_manager,
            assistant,
            conversations: Arc::new(ConversationStore::new()),
            acts: Arc::new(RwLock::new(acts)),
            building: Arc::new(AtomicBool::new(false)),
        }
    }
}
