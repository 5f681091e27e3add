//! # adalat-vector
//!
//! An exact (brute force) inner-product vector index for small and medium
//! corpora, with JSON persistence of vectors and their payloads.
//!
//! Vectors are expected to be L2-normalised before they are added, which makes
//! the inner product equal to cosine similarity. [`normalize_l2`] is provided
//! for that purpose.
//!
//! ## Quick Start
//!
//! ```rust
//! use adalat_vector::{normalize_l2, FlatIndex};
//!
//! let mut index = FlatIndex::new(3);
//!
//! let mut a = vec![1.0, 0.0, 0.0];
//! let mut b = vec![0.7, 0.7, 0.0];
//! normalize_l2(&mut a);
//! normalize_l2(&mut b);
//! index.add(a).unwrap();
//! index.add(b).unwrap();
//!
//! let mut query = vec![1.0, 0.1, 0.0];
//! normalize_l2(&mut query);
//! let hits = index.search(&query, 1).unwrap();
//! assert_eq!(hits[0].0, 0);
//! ```
//!
//! ## Layout on disk
//!
//! ```text
//! {dir}/index.json     dimensions + vectors
//! {dir}/payloads.json  one caller-defined payload per vector, same order
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod distance;
pub mod error;
pub mod index;
pub mod persistence;

pub use distance::{cosine_similarity, dot_product, normalize_l2};
pub use error::{Error, Result};
pub use index::FlatIndex;
