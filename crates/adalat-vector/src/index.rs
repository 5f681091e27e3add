//! Exhaustive inner-product index.

use serde::{Deserialize, Serialize};

use crate::distance::dot_product;
use crate::error::{Error, Result};

/// A flat index that scores every stored vector against the query.
///
/// Positions are assigned in insertion order starting at 0 and never change,
/// so callers can keep payloads in a parallel `Vec`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlatIndex {
    dimensions: usize,
    vectors: Vec<Vec<f32>>,
}

impl FlatIndex {
    /// Create an empty index for vectors of the given dimensionality.
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            vectors: Vec::new(),
        }
    }

    /// Vector dimensionality accepted by this index.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Number of stored vectors.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Whether the index holds no vectors.
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    fn validate(&self, vector: &[f32]) -> Result<()> {
        if self.dimensions == 0 {
            return Err(Error::Configuration(
                "index dimensions must be greater than zero".to_string(),
            ));
        }
        if vector.len() != self.dimensions {
            return Err(Error::DimensionMismatch {
                expected: self.dimensions,
                actual: vector.len(),
            });
        }
        if vector.iter().any(|x| !x.is_finite()) {
            return Err(Error::InvalidVector(
                "vector contains NaN or infinite values".to_string(),
            ));
        }
        Ok(())
    }

    /// Append a vector and return its position.
    pub fn add(&mut self, vector: Vec<f32>) -> Result<usize> {
        self.validate(&vector)?;
        self.vectors.push(vector);
        Ok(self.vectors.len() - 1)
    }

    /// Append many vectors. Nothing is added if any of them is invalid.
    pub fn add_batch(&mut self, vectors: Vec<Vec<f32>>) -> Result<()> {
        for v in &vectors {
            self.validate(v)?;
        }
        self.vectors.extend(vectors);
        Ok(())
    }

    /// Return up to `k` `(position, score)` pairs, best first.
    ///
    /// Equal scores are ordered by position.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>> {
        if k == 0 || self.vectors.is_empty() {
            return Ok(Vec::new());
        }
        self.validate(query)?;

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(pos, v)| (pos, dot_product(v, query)))
            .collect();

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        scored.truncate(k);
        Ok(scored)
    }
}
