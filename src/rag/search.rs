//! Retrieval over the processed corpus.
//!
//! [`LegalVectorStore`] owns the chunks, their flat embedding index and a BM25
//! index over the same chunks. Three strategies are available:
//! - **Semantic**: inner product of L2-normalised embeddings (cosine)
//! - **BM25**: lexical matching on chunk content
//! - **Hybrid**: both rankings fused with weighted reciprocal-rank fusion
//!
//! Every strategy ranks a window of `top_k * 2` candidates, drops those that
//! fail the [`SearchFilters`], and keeps the first `top_k` survivors. The
//! window is not refilled, so heavy filtering can return fewer than `top_k`
//! hits.

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use adalat_vector::{persistence, FlatIndex};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

use super::embeddings::Embedder;
use crate::types::{AppError, ChunkMetadata, ProcessedChunk, Result, SearchHit};

/// Embedding batch size during builds.
const EMBED_BATCH: usize = 256;

/// Manifest written next to the index.
const MANIFEST_FILE: &str = "store.json";

// ============================================================================
// Strategy
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SearchStrategy {
    #[default]
    Semantic,
    Bm25,
    Hybrid,
}

impl FromStr for SearchStrategy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "semantic" | "dense" | "vector" => Ok(Self::Semantic),
            "bm25" | "lexical" | "keyword" => Ok(Self::Bm25),
            "hybrid" | "rrf" => Ok(Self::Hybrid),
            _ => Err(AppError::InvalidInput(format!(
                "Unknown search strategy: {}. Use: semantic, bm25, hybrid",
                s
            ))),
        }
    }
}

impl std::fmt::Display for SearchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Semantic => write!(f, "semantic"),
            Self::Bm25 => write!(f, "bm25"),
            Self::Hybrid => write!(f, "hybrid"),
        }
    }
}

// ============================================================================
// Filters
// ============================================================================

/// Inclusive year range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

/// Metadata constraints applied after ranking.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SearchFilters {
    /// Acts with a non-numeric year are never excluded by this filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_range: Option<YearRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_repealed: Option<bool>,
    /// Exact match against `language_detected`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Any keyword must occur in the act title, ignoring case.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
}

impl SearchFilters {
    pub fn is_empty(&self) -> bool {
        self.year_range.is_none()
            && self.is_repealed.is_none()
            && self.language.is_none()
            && self.keywords.as_ref().map_or(true, |k| k.is_empty())
    }

    pub fn matches(&self, meta: &ChunkMetadata) -> bool {
        if let (Some(range), Some(year)) = (self.year_range, meta.year()) {
            if year < range.start || year > range.end {
                return false;
            }
        }

        if let Some(repealed) = self.is_repealed {
            if meta.is_repealed != repealed {
                return false;
            }
        }

        if let Some(language) = &self.language {
            if &meta.language_detected != language {
                return false;
            }
        }

        if let Some(keywords) = self.keywords.as_ref().filter(|k| !k.is_empty()) {
            let title = meta.act_title.to_lowercase();
            if !keywords.iter().any(|k| title.contains(&k.to_lowercase())) {
                return false;
            }
        }

        true
    }
}

// ============================================================================
// BM25
// ============================================================================

/// Okapi BM25 over chunk positions.
#[derive(Debug, Clone)]
pub struct Bm25Index {
    k1: f32,
    b: f32,
    /// term -> (position, term frequency)
    postings: HashMap<String, Vec<(usize, u32)>>,
    doc_lengths: Vec<u32>,
    avg_length: f32,
}

impl Default for Bm25Index {
    fn default() -> Self {
        Self {
            k1: 1.2,
            b: 0.75,
            postings: HashMap::new(),
            doc_lengths: Vec::new(),
            avg_length: 0.0,
        }
    }
}

impl Bm25Index {
    pub fn tokenize(text: &str) -> Vec<String> {
        text.to_lowercase()
            .split(|c: char| !(c.is_alphanumeric() || ('\u{0980}'..='\u{09FF}').contains(&c)))
            .filter(|t| t.chars().count() > 1)
            .map(str::to_string)
            .collect()
    }

    pub fn build<'a>(texts: impl IntoIterator<Item = &'a str>) -> Self {
        let mut index = Self::default();
        for (position, text) in texts.into_iter().enumerate() {
            let tokens = Self::tokenize(text);
            index.doc_lengths.push(tokens.len() as u32);

            let mut counts: HashMap<String, u32> = HashMap::new();
            for token in tokens {
                *counts.entry(token).or_insert(0) += 1;
            }
            for (term, tf) in counts {
                index.postings.entry(term).or_default().push((position, tf));
            }
        }

        let total: u64 = index.doc_lengths.iter().map(|&l| l as u64).sum();
        index.avg_length = if index.doc_lengths.is_empty() {
            0.0
        } else {
            total as f32 / index.doc_lengths.len() as f32
        };
        index
    }

    pub fn len(&self) -> usize {
        self.doc_lengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doc_lengths.is_empty()
    }

    fn idf(&self, doc_freq: usize) -> f32 {
        let n = self.doc_lengths.len() as f32;
        let df = doc_freq as f32;
        ((n - df + 0.5) / (df + 0.5) + 1.0).ln()
    }

    /// Up to `k` `(position, score)` pairs with a positive score, best first.
    pub fn search(&self, query: &str, k: usize) -> Vec<(usize, f32)> {
        if k == 0 || self.is_empty() {
            return Vec::new();
        }

        let mut terms = Self::tokenize(query);
        terms.sort();
        terms.dedup();

        let mut scores: HashMap<usize, f32> = HashMap::new();
        for term in &terms {
            let Some(postings) = self.postings.get(term) else {
                continue;
            };
            let idf = self.idf(postings.len());
            for &(position, tf) in postings {
                let tf = tf as f32;
                let len_norm = if self.avg_length > 0.0 {
                    self.doc_lengths[position] as f32 / self.avg_length
                } else {
                    1.0
                };
                let score =
                    idf * tf * (self.k1 + 1.0) / (tf + self.k1 * (1.0 - self.b + self.b * len_norm));
                *scores.entry(position).or_insert(0.0) += score;
            }
        }

        let mut ranked: Vec<(usize, f32)> = scores.into_iter().filter(|(_, s)| *s > 0.0).collect();
        sort_ranked(&mut ranked);
        ranked.truncate(k);
        ranked
    }
}

fn sort_ranked(ranked: &mut [(usize, f32)]) {
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });
}

// ============================================================================
// Reciprocal Rank Fusion
// ============================================================================

/// Weighted RRF: each list contributes `weight / (k + rank + 1)` per item.
#[derive(Debug, Clone, Copy)]
pub struct RrfFusion {
    k: f32,
}

impl Default for RrfFusion {
    fn default() -> Self {
        Self { k: 60.0 }
    }
}

impl RrfFusion {
    pub fn with_k(k: f32) -> Self {
        Self { k }
    }

    pub fn fuse(&self, lists: &[(&[(usize, f32)], f32)]) -> Vec<(usize, f32)> {
        let mut fused: HashMap<usize, f32> = HashMap::new();
        for (list, weight) in lists {
            for (rank, (position, _)) in list.iter().enumerate() {
                *fused.entry(*position).or_insert(0.0) += weight / (self.k + rank as f32 + 1.0);
            }
        }
        let mut ranked: Vec<(usize, f32)> = fused.into_iter().collect();
        sort_ranked(&mut ranked);
        ranked
    }
}

/// Semantic / lexical weights for hybrid search.
pub const HYBRID_WEIGHTS: (f32, f32) = (0.7, 0.3);

// ============================================================================
// Vector store
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreManifest {
    embedding_model: String,
    dimensions: usize,
    chunks: usize,
    built_at: DateTime<Utc>,
}

/// Chunks plus their semantic and lexical indices.
pub struct LegalVectorStore {
    chunks: Vec<ProcessedChunk>,
    index: FlatIndex,
    lexical: Bm25Index,
    embedding_model: String,
    built_at: Option<DateTime<Utc>>,
}

impl LegalVectorStore {
    /// An empty store; every search fails with `IndexNotBuilt`.
    pub fn empty(dimensions: usize) -> Self {
        Self {
            chunks: Vec::new(),
            index: FlatIndex::new(dimensions),
            lexical: Bm25Index::default(),
            embedding_model: String::new(),
            built_at: None,
        }
    }

    /// Embed every chunk and index it. CPU bound; call from a blocking task.
    pub fn build(chunks: Vec<ProcessedChunk>, embedder: &dyn Embedder) -> Result<Self> {
        info!(chunks = chunks.len(), model = embedder.model_name(), "Building vector store");

        let mut index = FlatIndex::new(embedder.dimensions());
        for batch in chunks.chunks(EMBED_BATCH) {
            let texts: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();
            let mut vectors = embedder.embed(&texts)?;
            for v in vectors.iter_mut() {
                adalat_vector::normalize_l2(v);
            }
            index.add_batch(vectors)?;
        }

        let lexical = Bm25Index::build(chunks.iter().map(|c| c.content.as_str()));

        info!(vectors = index.len(), "Vector store built");
        Ok(Self {
            chunks,
            index,
            lexical,
            embedding_model: embedder.model_name().to_string(),
            built_at: Some(Utc::now()),
        })
    }

    pub fn is_ready(&self) -> bool {
        !self.chunks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }

    pub fn built_at(&self) -> Option<DateTime<Utc>> {
        self.built_at
    }

    pub fn chunks(&self) -> &[ProcessedChunk] {
        &self.chunks
    }

    /// Rank, filter and truncate.
    ///
    /// `query_vector` must be the embedded query for the semantic and hybrid
    /// strategies; it is normalised here.
    pub fn search(
        &self,
        query: &str,
        query_vector: Option<Vec<f32>>,
        top_k: usize,
        filters: &SearchFilters,
        strategy: SearchStrategy,
    ) -> Result<Vec<SearchHit>> {
        if !self.is_ready() {
            return Err(AppError::IndexNotBuilt);
        }
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let window = top_k.saturating_mul(2);
        let semantic = |vector: Option<Vec<f32>>| -> Result<Vec<(usize, f32)>> {
            let mut vector = vector.ok_or_else(|| {
                AppError::Embedding("query embedding required for semantic search".to_string())
            })?;
            adalat_vector::normalize_l2(&mut vector);
            Ok(self.index.search(&vector, window)?)
        };

        let candidates = match strategy {
            SearchStrategy::Semantic => semantic(query_vector)?,
            SearchStrategy::Bm25 => self.lexical.search(query, window),
            SearchStrategy::Hybrid => {
                let dense = semantic(query_vector)?;
                let sparse = self.lexical.search(query, window);
                let mut fused = RrfFusion::default().fuse(&[
                    (dense.as_slice(), HYBRID_WEIGHTS.0),
                    (sparse.as_slice(), HYBRID_WEIGHTS.1),
                ]);
                fused.truncate(window);
                fused
            }
        };

        Ok(candidates
            .into_iter()
            .filter_map(|(position, score)| {
                let chunk = self.chunks.get(position)?;
                filters
                    .matches(&chunk.metadata)
                    .then(|| SearchHit::from_chunk(chunk, score))
            })
            .take(top_k)
            .collect())
    }

    /// Persist index, chunks and manifest into `dir`.
    pub async fn save(&self, dir: &Path) -> Result<()> {
        persistence::save(dir, &self.index, &self.chunks).await?;

        let manifest = StoreManifest {
            embedding_model: self.embedding_model.clone(),
            dimensions: self.index.dimensions(),
            chunks: self.chunks.len(),
            built_at: self.built_at.unwrap_or_else(Utc::now),
        };
        let json = serde_json::to_string_pretty(&manifest)
            .map_err(|e| AppError::VectorStore(format!("Failed to serialize manifest: {}", e)))?;
        persistence::write_atomic(&dir.join(MANIFEST_FILE), json.as_bytes())
            .await
            .map_err(|e| AppError::VectorStore(format!("Failed to write manifest: {}", e)))?;

        info!(path = %dir.display(), chunks = self.chunks.len(), "Vector store saved");
        Ok(())
    }

    /// Load a saved store built with `embedder`'s model.
    ///
    /// Returns `Ok(None)` when nothing is saved or the saved store was built
    /// by a different embedding model or dimension.
    pub async fn load(dir: &Path, embedder: &dyn Embedder) -> Result<Option<Self>> {
        let manifest_path = dir.join(MANIFEST_FILE);
        let manifest: Option<StoreManifest> = match tokio::fs::read(&manifest_path).await {
            Ok(bytes) => Some(serde_json::from_slice(&bytes).map_err(|e| {
                AppError::VectorStore(format!("Failed to parse {}: {}", MANIFEST_FILE, e))
            })?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                return Err(AppError::VectorStore(format!(
                    "Failed to read {}: {}",
                    manifest_path.display(),
                    e
                )))
            }
        };

        let Some((index, chunks)) = persistence::load::<ProcessedChunk>(dir).await? else {
            return Ok(None);
        };

        let Some(manifest) = manifest else {
            warn!(path = %dir.display(), "Vector store has no manifest; rebuild required");
            return Ok(None);
        };

        if manifest.embedding_model != embedder.model_name()
            || index.dimensions() != embedder.dimensions()
        {
            warn!(
                stored = %manifest.embedding_model,
                current = embedder.model_name(),
                "Vector store was built with a different embedding model; rebuild required"
            );
            return Ok(None);
        }

        let lexical = Bm25Index::build(chunks.iter().map(|c| c.content.as_str()));
        info!(path = %dir.display(), chunks = chunks.len(), "Vector store loaded");

        Ok(Some(Self {
            chunks,
            index,
            lexical,
            embedding_model: manifest.embedding_model,
            built_at: Some(manifest.built_at),
        }))
    }
}
