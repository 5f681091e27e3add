//! HTTP API Handlers and Routes
//!
//! The REST API layer, built on axum.
//!
//! # API Endpoints
//!
//! ## Web UI
//! - `GET /` - Single-page question form
//!
//! ## Chat and search
//! - `POST /api/chat` - Ask a question, get an answer with sources
//! - `POST /api/search` - Retrieval only
//! - `GET /api/modes` - Answer modes with example questions
//!
//! ## Conversations
//! - `GET /api/conversations/{id}` - Conversation history
//! - `DELETE /api/conversations/{id}` - Forget a conversation
//!
//! ## Corpus
//! - `GET /api/stats` - Corpus statistics
//! - `GET /api/acts/recent?limit=10` - Newest acts
//! - `GET /api/topics` - Act counts per area of law
//! - `GET /api/topics/{name}?limit=10` - Acts in one area of law
//!
//! ## Index and health
//! - `POST /api/index/build` - Rebuild the vector index (409 while one runs)
//! - `GET /api/health` - Health check
//!
//! # OpenAPI Documentation
//!
//! The OpenAPI document is served at `/api/openapi.json`. With the
//! `swagger-ui` feature, interactive docs are at `/swagger-ui/`.

/// Request and response handlers for all API endpoints.
pub mod handlers;
/// Router configuration and route definitions.
pub mod routes;

pub use routes::{create_router, ApiDoc};
