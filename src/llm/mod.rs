//! LLM provider clients
//!
//! The assistant talks to one [`LLMClient`]. Which implementation backs it
//! comes from `[llm].provider` in `adalat.toml`:
//!
//! - `gemini` (default) - Google Gemini over its REST API
//! - `openai` - needs the `openai` feature
//! - `ollama` - needs the `ollama` feature
//!
//! ```ignore
//! use adalat::llm::LLMClientFactory;
//!
//! let client = LLMClientFactory::from_config(&config)?.create_default().await?;
//! let answer = client.generate("What is the Penal Code?").await?;
//! ```

/// Core LLM client trait and provider selection.
pub mod client;
pub mod gemini;

#[cfg(feature = "ollama")]
pub mod ollama;

#[cfg(feature = "openai")]
pub mod openai;

pub use client::{LLMClient, LLMClientFactory, Provider, UnconfiguredClient};
pub use gemini::GeminiClient;
