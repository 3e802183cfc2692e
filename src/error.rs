//! Error taxonomy for the retrieval core.
//!
//! The core reports failures as [`RetrieverError`] and never logs, retries,
//! or swallows them. Adapters (CLI, MCP, HTTP) decide how each variant is
//! surfaced to their own callers.

use std::path::PathBuf;

/// Failures reported by [`PolicyRetriever`](crate::retriever::PolicyRetriever).
#[derive(Debug, thiserror::Error)]
pub enum RetrieverError {
    /// The source document is missing, unreadable, unparseable, or its
    /// passages could not be embedded. Only raised by `initialize`.
    #[error("ingestion failed for {}: {reason}", path.display())]
    IngestionFailure { path: PathBuf, reason: String },

    /// Empty query text or `k == 0`. Raised before any embedding work.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// A query arrived before ingestion completed and the retriever runs
    /// with the fail-fast ingestion policy.
    #[error("retriever is not ready: no policy document has been ingested")]
    NotReady,

    /// `initialize` was called on a retriever that already holds an index.
    #[error("retriever is already initialized")]
    AlreadyInitialized,

    /// The embedder failed, or returned a vector the index cannot score.
    #[error("embedding failed: {0}")]
    Embedding(String),
}

impl RetrieverError {
    /// Machine-readable code used by the HTTP and MCP adapters.
    pub fn code(&self) -> &'static str {
        match self {
            RetrieverError::IngestionFailure { .. } => "ingestion_failure",
            RetrieverError::InvalidQuery(_) => "invalid_query",
            RetrieverError::NotReady => "not_ready",
            RetrieverError::AlreadyInitialized => "already_initialized",
            RetrieverError::Embedding(_) => "embedding_failed",
        }
    }
}
