//! Feature-hashing embedder.
//!
//! Each lowercase alphanumeric token is hashed with SHA-256 into one of
//! `dims` buckets; the bucket counts are then L2-normalized. Texts that
//! share vocabulary land close together under cosine similarity, which is
//! enough for keyword-level retrieval without any model download.

use anyhow::Result;
use async_trait::async_trait;
use sha2::{Digest, Sha256};

use super::Embedder;

pub(crate) const DEFAULT_DIMS: usize = 512;

/// Deterministic bag-of-words embedder.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dims: usize,
}

impl HashEmbedder {
    pub fn new(dims: usize) -> Self {
        Self { dims: dims.max(1) }
    }

    /// Embed one text synchronously.
    pub fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dims];
        let lowered = text.to_lowercase();

        for token in lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            vector[self.bucket(token)] += 1.0;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in vector.iter_mut() {
                *x /= norm;
            }
        }
        vector
    }

    fn bucket(&self, token: &str) -> usize {
        let digest = Sha256::digest(token.as_bytes());
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest[..8]);
        (u64::from_le_bytes(head) % self.dims as u64) as usize
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIMS)
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    fn model_name(&self) -> &str {
        "hash"
    }

    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::cosine_similarity;

    #[test]
    fn test_vectors_have_configured_dims_and_unit_norm() {
        let e = HashEmbedder::new(128);
        let v = e.embed_one("Employees receive 20 vacation days annually.");
        assert_eq!(v.len(), 128);
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_empty_text_is_zero_vector() {
        let e = HashEmbedder::default();
        let v = e.embed_one("  ... ");
        assert_eq!(v.len(), DEFAULT_DIMS);
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_case_and_punctuation_are_ignored() {
        let e = HashEmbedder::default();
        assert_eq!(e.embed_one("Remote WORK!"), e.embed_one("remote work"));
    }

    #[test]
    fn test_shared_vocabulary_scores_higher() {
        let e = HashEmbedder::default();
        let query = e.embed_one("How many vacation days do I get?");
        let remote = e.embed_one("Remote work is allowed up to 3 days per week.");
        let vacation = e.embed_one("Employees receive 20 vacation days annually.");
        assert!(cosine_similarity(&query, &vacation) > cosine_similarity(&query, &remote));
    }

    #[test]
    fn test_zero_dims_clamped_to_one() {
        assert_eq!(HashEmbedder::new(0).dims(), 1);
    }

    #[tokio::test]
    async fn test_embed_batch_preserves_order() {
        let e = HashEmbedder::new(64);
        let texts = vec!["alpha".to_string(), "beta".to_string()];
        let out = e.embed(&texts).await.unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], e.embed_one("alpha"));
        assert_eq!(out[1], e.embed_one("beta"));
    }
}
