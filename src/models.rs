//! Core data models used throughout the retrieval pipeline.
//!
//! These types represent the policy document, the passages it is split
//! into, and the ranked passages returned from a query.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// The loaded source document. Immutable once constructed.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    pub id: String,
    pub path: PathBuf,
    pub content_type: String,
    /// Extracted text, one entry per page (1 page for plain-text files
    /// without form feeds).
    pub pages: Vec<String>,
    /// SHA-256 of the raw file bytes.
    pub hash: String,
    pub loaded_at: DateTime<Utc>,
}

impl Document {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// A contiguous chunk of a document page; the unit of retrieval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Passage {
    /// Position in the passage sequence, starting at 0.
    pub index: usize,
    /// Source page, starting at 1.
    pub page: usize,
    /// Byte offset of the first character of `text` within its page.
    pub offset: usize,
    pub text: String,
    /// SHA-256 of `text`.
    pub hash: String,
}

/// A passage returned by a query, with its similarity to the query.
#[derive(Debug, Clone, Serialize)]
pub struct RetrievedPassage {
    pub index: usize,
    pub page: usize,
    /// Cosine similarity in `[-1.0, 1.0]`; higher is nearer.
    pub score: f32,
    pub text: String,
}
