//! The legal assistant: retrieval plus generation over one vector store.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{error, info, warn};

use super::embeddings::Embedder;
use super::prompt::{build_context, build_prompt, AssistantMode};
use super::search::{LegalVectorStore, SearchFilters, SearchStrategy};
use crate::llm::LLMClient;
use crate::types::{AppError, ChatMessage, ProcessedChunk, Result, SearchHit};

/// Reply used when the model returns nothing.
pub const EMPTY_RESPONSE_REPLY: &str =
    "I apologize, but I couldn't generate a response. Please try rephrasing your question.";

const ERROR_REPLY_PREFIX: &str = "I encountered an error while processing your request: ";

/// One question with its retrieval options.
#[derive(Debug, Clone)]
pub struct ChatQuery<'a> {
    pub message: &'a str,
    pub mode: AssistantMode,
    pub top_k: usize,
    pub filters: &'a SearchFilters,
    pub strategy: SearchStrategy,
    pub history: &'a [ChatMessage],
}

#[derive(Debug, Clone)]
pub struct ChatAnswer {
    pub response: String,
    pub sources: Vec<SearchHit>,
    pub mode: AssistantMode,
}

pub struct LegalAssistant {
    store: RwLock<LegalVectorStore>,
    embedder: Arc<dyn Embedder>,
    llm: Arc<dyn LLMClient>,
    vector_store_path: PathBuf,
}

impl LegalAssistant {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        llm: Arc<dyn LLMClient>,
        vector_store_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store: RwLock::new(LegalVectorStore::empty(embedder.dimensions())),
            embedder,
            llm,
            vector_store_path: vector_store_path.into(),
        }
    }

    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.embedder
    }

    pub fn llm_model(&self) -> &str {
        self.llm.model_name()
    }

    pub fn vector_store_path(&self) -> &Path {
        &self.vector_store_path
    }

    pub fn is_ready(&self) -> bool {
        self.store.read().is_ready()
    }

    /// Number of indexed chunks.
    pub fn document_count(&self) -> usize {
        self.store.read().len()
    }

    /// Load the persisted store. `Ok(false)` when there is none or it must be
    /// rebuilt for the current embedder. Unreadable files are logged and
    /// treated as missing.
    pub async fn load_vector_store(&self) -> Result<bool> {
        match LegalVectorStore::load(&self.vector_store_path, self.embedder.as_ref()).await {
            Ok(Some(store)) => {
                *self.store.write() = store;
                Ok(true)
            }
            Ok(None) => Ok(false),
            Err(e) => {
                warn!(
                    path = %self.vector_store_path.display(),
                    error = %e,
                    "Saved vector store is unreadable; rebuild required"
                );
                Ok(false)
            }
        }
    }

    /// Embed `chunks`, persist the result and swap it in. Searches keep using
    /// the previous store until the swap.
    pub async fn build_vector_store(&self, chunks: Vec<ProcessedChunk>) -> Result<usize> {
        if chunks.is_empty() {
            return Err(AppError::Corpus("No chunks to index".to_string()));
        }

        let embedder = self.embedder.clone();
        let store = tokio::task::spawn_blocking(move || {
            LegalVectorStore::build(chunks, embedder.as_ref())
        })
        .await
        .map_err(|e| AppError::Internal(format!("Index build task failed: {}", e)))??;

        store.save(&self.vector_store_path).await?;

        let count = store.len();
        *self.store.write() = store;
        info!(chunks = count, "Vector store ready");
        Ok(count)
    }

    /// Retrieve up to `top_k` chunks passing `filters`.
    pub async fn search(
        &self,
        query: &str,
        top_k: usize,
        filters: &SearchFilters,
        strategy: SearchStrategy,
    ) -> Result<Vec<SearchHit>> {
        if !self.is_ready() {
            return Err(AppError::IndexNotBuilt);
        }

        let query_vector = match strategy {
            SearchStrategy::Bm25 => None,
            SearchStrategy::Semantic | SearchStrategy::Hybrid => {
                let embedder = self.embedder.clone();
                let text = query.to_string();
                let vector = tokio::task::spawn_blocking(move || embedder.embed_one(&text))
                    .await
                    .map_err(|e| AppError::Internal(format!("Embedding task failed: {}", e)))??;
                Some(vector)
            }
        };

        self.store
            .read()
            .search(query, query_vector, top_k, filters, strategy)
    }

    /// Ask the LLM. Never fails: an empty reply or a provider error becomes a
    /// user-facing message.
    pub async fn generate_response(
        &self,
        query: &str,
        hits: &[SearchHit],
        mode: AssistantMode,
        history: &[ChatMessage],
    ) -> String {
        let context = build_context(hits);
        let prompt = build_prompt(mode, query, &context, history);

        match self.llm.generate(&prompt).await {
            Ok(text) if text.trim().is_empty() => {
                warn!(model = self.llm.model_name(), "LLM returned an empty response");
                EMPTY_RESPONSE_REPLY.to_string()
            }
            Ok(text) => text,
            Err(e) => {
                error!(model = self.llm.model_name(), error = %e, "LLM generation failed");
                format!("{}{}", ERROR_REPLY_PREFIX, e)
            }
        }
    }

    /// Search then answer. Retrieval errors propagate; generation errors are
    /// folded into the reply.
    pub async fn chat(&self, query: ChatQuery<'_>) -> Result<ChatAnswer> {
        let sources = self
            .search(query.message, query.top_k, query.filters, query.strategy)
            .await?;

        let response = self
            .generate_response(query.message, &sources, query.mode, query.history)
            .await;

        Ok(ChatAnswer {
            response,
            sources,
            mode: query.mode,
        })
    }
}
