//! Vector index abstraction.
//!
//! The [`VectorIndex`] trait is the seam between the retriever and the
//! nearest-neighbor backend. The only backend today is
//! [`InMemoryIndex`], a brute-force cosine scan, which is plenty for a
//! single policy document of a few hundred passages.

pub mod memory;

pub use memory::InMemoryIndex;

use crate::models::RetrievedPassage;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum IndexError {
    #[error("expected {passages} vectors, got {vectors}")]
    CountMismatch { passages: usize, vectors: usize },
    #[error("vector {index} has {actual} dimensions, expected {expected}")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },
    #[error("query vector has {actual} dimensions, index has {expected}")]
    QueryDimensionMismatch { expected: usize, actual: usize },
}

/// Read-only nearest-neighbor lookup over embedded passages.
pub trait VectorIndex: Send + Sync {
    /// Number of indexed passages.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dimensionality shared by every stored vector (0 when empty).
    fn dims(&self) -> usize;

    /// Return up to `k` passages ordered by descending similarity to
    /// `query`; equal scores keep passage order.
    fn nearest(&self, query: &[f32], k: usize) -> Result<Vec<RetrievedPassage>, IndexError>;
}
