//! Retrieval Augmented Generation (RAG) Pipeline
//!
//! # Module Structure
//!
//! - [`rag::embeddings`](crate::rag::embeddings) - Embedders (feature hashing, fastembed)
//! - [`rag::cache`](crate::rag::cache) - LRU embedding cache
//! - [`rag::search`](crate::rag::search) - Vector store, filters, BM25 and hybrid search
//! - [`rag::prompt`](crate::rag::prompt) - Answer modes and prompt templates
//! - [`rag::assistant`](crate::rag::assistant) - Retrieval plus generation
//!
//! # RAG Pipeline
//!
//! 1. **Ingestion** - Acts are cleaned and chunked (`corpus`)
//! 2. **Storage** - Chunks are embedded into a flat inner-product index
//! 3. **Retrieval** - The query is embedded; candidates are ranked, then filtered
//! 4. **Generation** - The LLM answers from a mode-specific prompt
//!
//! # Example
//!
//! ```ignore
//! use adalat::rag::{assistant::LegalAssistant, prompt::AssistantMode};
//!
//! let assistant = LegalAssistant::new(embedder, llm, &config.rag.vector_store_path);
//! assistant.load_vector_store().await?;
//! let hits = assistant.search("punishment for theft", 5, &filters, strategy).await?;
//! let answer = assistant
//!     .generate_response("punishment for theft", &hits, AssistantMode::Simple, &[])
//!     .await;
//! ```

pub mod assistant;
pub mod cache;
pub mod embeddings;
pub mod prompt;
pub mod search;
