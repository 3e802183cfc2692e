//! Brute-force in-memory [`VectorIndex`].
//!
//! Stores one vector per passage and scores every vector against the
//! query with [`cosine_similarity`]. Built once, never mutated.

use std::cmp::Ordering;

use crate::embedding::cosine_similarity;
use crate::models::{Passage, RetrievedPassage};

use super::{IndexError, VectorIndex};

#[derive(Debug)]
pub struct InMemoryIndex {
    passages: Vec<Passage>,
    vectors: Vec<Vec<f32>>,
    dims: usize,
}

impl InMemoryIndex {
    /// Pair each passage with its vector.
    ///
    /// Fails unless there is exactly one vector per passage and every
    /// vector has the same length.
    pub fn build(passages: Vec<Passage>, vectors: Vec<Vec<f32>>) -> Result<Self, IndexError> {
        if passages.len() != vectors.len() {
            return Err(IndexError::CountMismatch {
                passages: passages.len(),
                vectors: vectors.len(),
            });
        }

        let dims = vectors.first().map(|v| v.len()).unwrap_or(0);
        for (index, v) in vectors.iter().enumerate() {
            if v.len() != dims {
                return Err(IndexError::DimensionMismatch {
                    index,
                    expected: dims,
                    actual: v.len(),
                });
            }
        }

        Ok(Self {
            passages,
            vectors,
            dims,
        })
    }
}

impl VectorIndex for InMemoryIndex {
    fn len(&self) -> usize {
        self.passages.len()
    }

    fn dims(&self) -> usize {
        self.dims
    }

    fn nearest(&self, query: &[f32], k: usize) -> Result<Vec<RetrievedPassage>, IndexError> {
        if self.passages.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        if query.len() != self.dims {
            return Err(IndexError::QueryDimensionMismatch {
                expected: self.dims,
                actual: query.len(),
            });
        }

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(i, v)| (i, cosine_similarity(query, v)))
            .collect();

        // Descending score, then ascending position
        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(i, score)| {
                let p = &self.passages[i];
                RetrievedPassage {
                    index: p.index,
                    page: p.page,
                    score,
                    text: p.text.clone(),
                }
            })
            .collect())
    }
}
