//! Text embedders
//!
//! Two implementations sit behind the [`Embedder`] trait:
//!
//! - [`HashingEmbedder`] (default) needs no model download. Tokens are hashed
//!   into signed buckets, so it captures lexical overlap only.
//! - `FastEmbedder` (feature `local-embeddings`) runs an ONNX sentence model
//!   through fastembed.
//!
//! Either can be wrapped in a [`CachedEmbedder`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::cache::{cache_key, EmbeddingCache, LruEmbeddingCache, NoOpCache};
use crate::types::{AppError, Result};
use crate::utils::toml_config::RagConfig;

pub trait Embedder: Send + Sync {
    /// Identifier stored with a built index; a mismatch forces a rebuild.
    fn model_name(&self) -> &str;

    fn dimensions(&self) -> usize;

    /// Embed a batch, preserving order.
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        self.embed(&[text.to_string()])?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Embedding("embedder returned no vector".to_string()))
    }
}

/// Which embedder to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedderKind {
    #[default]
    Hashing,
    FastEmbed,
}

// ============= Hashing =============

/// Feature-hashing embedder over lower-cased word tokens.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    model_name: String,
    dimensions: usize,
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Result<Self> {
        if dimensions == 0 {
            return Err(AppError::Embedding(
                "embedding dimensions must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            model_name: format!("hashing-sha256-{}", dimensions),
            dimensions,
        })
    }

    fn is_token_char(c: char) -> bool {
        // Bengali vowel signs are combining marks, not alphanumeric
        c.is_alphanumeric() || ('\u{0980}'..='\u{09FF}').contains(&c)
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        let lowered = text.to_lowercase();

        for token in lowered
            .split(|c: char| !Self::is_token_char(c))
            .filter(|t| !t.is_empty())
        {
            let digest = Sha256::digest(token.as_bytes());
            let mut bucket_bytes = [0u8; 8];
            bucket_bytes.copy_from_slice(&digest[..8]);
            let bucket = (u64::from_le_bytes(bucket_bytes) % self.dimensions as u64) as usize;
            let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        adalat_vector::normalize_l2(&mut vector);
        vector
    }
}

impl Embedder for HashingEmbedder {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}

// ============= FastEmbed =============

#[cfg(feature = "local-embeddings")]
pub use local::FastEmbedder;

#[cfg(feature = "local-embeddings")]
mod local {
    use std::str::FromStr;

    use fastembed::{EmbeddingModel, TextEmbedding, TextInitOptions};
    use parking_lot::Mutex;

    use super::Embedder;
    use crate::types::{AppError, Result};

    /// ONNX sentence embedder; the model is loaded once and shared.
    pub struct FastEmbedder {
        model_name: String,
        dimensions: usize,
        inner: Mutex<TextEmbedding>,
    }

    impl FastEmbedder {
        /// Load a model by its code, e.g. `sentence-transformers/all-MiniLM-L6-v2`.
        pub fn try_new(model: &str) -> Result<Self> {
            let label = model.trim();
            let embedding_model = EmbeddingModel::from_str(label).map_err(|e| {
                AppError::Embedding(format!("unknown fastembed model `{}`: {}", label, e))
            })?;

            let info = TextEmbedding::get_model_info(&embedding_model).map_err(|e| {
                AppError::Embedding(format!("no metadata for model `{}`: {}", label, e))
            })?;
            let dimensions = info.dim;

            let text_embedding = TextEmbedding::try_new(TextInitOptions::new(embedding_model))
                .map_err(|e| {
                    AppError::Embedding(format!("failed to load model `{}`: {}", label, e))
                })?;

            tracing::info!(model = label, dimensions, "Loaded fastembed model");

            Ok(Self {
                model_name: label.to_string(),
                dimensions,
                inner: Mutex::new(text_embedding),
            })
        }
    }

    impl Embedder for FastEmbedder {
        fn model_name(&self) -> &str {
            &self.model_name
        }

        fn dimensions(&self) -> usize {
            self.dimensions
        }

        fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            if texts.is_empty() {
                return Ok(Vec::new());
            }
            let mut model = self.inner.lock();
            model
                .embed(texts.to_vec(), None)
                .map_err(|e| AppError::Embedding(format!("fastembed inference failed: {}", e)))
        }
    }
}

// ============= Caching =============

/// Serves repeated texts from an [`EmbeddingCache`]; only misses reach the
/// wrapped embedder.
pub struct CachedEmbedder {
    inner: Arc<dyn Embedder>,
    cache: Arc<dyn EmbeddingCache>,
}

impl CachedEmbedder {
    pub fn new(inner: Arc<dyn Embedder>, cache: Arc<dyn EmbeddingCache>) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &Arc<dyn EmbeddingCache> {
        &self.cache
    }
}

impl Embedder for CachedEmbedder {
    fn model_name(&self) -> &str {
        self.inner.model_name()
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let model = self.inner.model_name();
        let keys: Vec<String> = texts.iter().map(|t| cache_key(t, model)).collect();

        let mut results: Vec<Option<Vec<f32>>> = keys.iter().map(|k| self.cache.get(k)).collect();

        let missing: Vec<usize> = results
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_none())
            .map(|(i, _)| i)
            .collect();

        if !missing.is_empty() {
            let batch: Vec<String> = missing.iter().map(|&i| texts[i].clone()).collect();
            let computed = self.inner.embed(&batch)?;
            if computed.len() != batch.len() {
                return Err(AppError::Embedding(format!(
                    "embedder returned {} vectors for {} texts",
                    computed.len(),
                    batch.len()
                )));
            }
            for (i, vector) in missing.into_iter().zip(computed) {
                self.cache.insert(keys[i].clone(), vector.clone());
                results[i] = Some(vector);
            }
        }

        Ok(results.into_iter().flatten().collect())
    }
}

/// Build the configured embedder wrapped in a cache.
pub fn build_embedder(config: &RagConfig) -> Result<Arc<dyn Embedder>> {
    let inner: Arc<dyn Embedder> = match config.embedder {
        EmbedderKind::Hashing => Arc::new(HashingEmbedder::new(config.dimensions)?),
        #[cfg(feature = "local-embeddings")]
        EmbedderKind::FastEmbed => Arc::new(FastEmbedder::try_new(&config.embedding_model)?),
        #[cfg(not(feature = "local-embeddings"))]
        EmbedderKind::FastEmbed => {
            return Err(AppError::Config(
                "embedder = \"fastembed\" requires the `local-embeddings` feature".to_string(),
            ))
        }
    };

    let cache: Arc<dyn EmbeddingCache> = if config.cache_max_bytes == 0 {
        Arc::new(NoOpCache::default())
    } else {
        Arc::new(LruEmbeddingCache::new(config.cache_max_bytes))
    };

    Ok(Arc::new(CachedEmbedder::new(inner, cache)))
}
