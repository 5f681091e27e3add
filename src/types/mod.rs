use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::rag::prompt::AssistantMode;
use crate::rag::search::{SearchFilters, SearchStrategy};

// ============= Corpus Types =============

/// Kind of retrievable unit produced from an act.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChunkType {
    /// Act-level summary (title, number, year, status, preamble).
    Overview,
    /// A single section of an act, or one part of a long section.
    Section,
}

impl std::fmt::Display for ChunkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChunkType::Overview => write!(f, "overview"),
            ChunkType::Section => write!(f, "section"),
        }
    }
}

/// Metadata carried by every chunk, copied from its act row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChunkMetadata {
    pub act_id: String,
    pub act_title: String,
    #[serde(default)]
    pub act_title_bengali: String,
    #[serde(default)]
    pub act_number: String,
    /// Year as it appears in the corpus; may be non-numeric.
    pub act_year: String,
    #[serde(default)]
    pub publication_date: String,
    #[serde(default)]
    pub is_repealed: bool,
    #[serde(default)]
    pub repealed_by: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub total_sections: u32,
    #[serde(default = "default_language")]
    pub language_detected: String,
    /// 1-based position of the section in the act (section chunks only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_number: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter: Option<String>,
}

pub(crate) fn default_language() -> String {
    "unknown".to_string()
}

/// Zero code points of the decimal digit blocks found in the corpus:
/// ASCII, Arabic-Indic, Extended Arabic-Indic, Devanagari and Bengali.
const DIGIT_ZEROS: [u32; 5] = [0x30, 0x660, 0x6F0, 0x966, 0x9E6];

fn decimal_digit(c: char) -> Option<u32> {
    let code = c as u32;
    DIGIT_ZEROS
        .iter()
        .find(|&&zero| (zero..zero + 10).contains(&code))
        .map(|zero| code - zero)
}

/// Parse a year only when the text is entirely decimal digits.
///
/// Bengali numerals count, so `"১৯৭২"` is 1972.
pub fn parse_numeric_year(text: &str) -> Option<i32> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    text.chars().try_fold(0i32, |acc, c| {
        let digit = decimal_digit(c)?;
        acc.checked_mul(10)?.checked_add(digit as i32)
    })
}

impl ChunkMetadata {
    /// Numeric act year, if the stored year is all digits.
    pub fn year(&self) -> Option<i32> {
        parse_numeric_year(&self.act_year)
    }
}

/// A retrievable unit of text with its act metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProcessedChunk {
    pub chunk_id: String,
    pub chunk_type: ChunkType,
    pub content: String,
    pub metadata: ChunkMetadata,
}

/// A chunk returned by retrieval together with its score.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SearchHit {
    pub chunk_id: String,
    pub chunk_type: ChunkType,
    pub content: String,
    pub metadata: ChunkMetadata,
    /// Cosine similarity for semantic search, BM25 or fused score otherwise.
    pub score: f32,
}

impl SearchHit {
    pub fn from_chunk(chunk: &ProcessedChunk, score: f32) -> Self {
        Self {
            chunk_id: chunk.chunk_id.clone(),
            chunk_type: chunk.chunk_type,
            content: chunk.content.clone(),
            metadata: chunk.metadata.clone(),
            score,
        }
    }
}

// ============= API Request/Response Types =============

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChatRequest {
    /// The legal question.
    pub message: String,
    /// Answer style: general, lawyer, argument, research or simple.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<SearchFilters>,
    /// Number of documents to retrieve (1-20).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    /// Continue an existing conversation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChatResponse {
    pub response: String,
    pub sources: Vec<SearchHit>,
    pub conversation_id: String,
    pub mode: AssistantMode,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<SearchFilters>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SearchResponse {
    pub results: Vec<SearchHit>,
    pub total: usize,
    pub strategy: SearchStrategy,
    pub duration_ms: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Whether a vector store is loaded and searchable.
    pub vector_store_ready: bool,
    pub document_count: usize,
    pub embedding_model: String,
    pub llm_model: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BuildIndexResponse {
    pub acts: usize,
    pub chunks: usize,
    pub duration_ms: u64,
}

// ============= Conversation Types =============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// Documents the assistant answer was grounded on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<SearchHit>>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            timestamp: Utc::now(),
            sources: None,
        }
    }

    pub fn assistant(content: impl Into<String>, sources: Vec<SearchHit>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
            sources: Some(sources),
        }
    }
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Corpus error: {0}")]
    Corpus(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("Vector store is not built. Build the index before searching.")]
    IndexNotBuilt,

    #[error("LLM error: {0}")]
    LLM(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<adalat_vector::Error> for AppError {
    fn from(err: adalat_vector::Error) -> Self {
        AppError::VectorStore(err.to_string())
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;

        let status = match &self {
            AppError::Corpus(_)
            | AppError::Embedding(_)
            | AppError::VectorStore(_)
            | AppError::Config(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::IndexNotBuilt => StatusCode::SERVICE_UNAVAILABLE,
            AppError::LLM(_) => StatusCode::BAD_GATEWAY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
        };

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "Request failed");
        }

        let body = serde_json::json!({
            "error": self.to_string()
        });

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
