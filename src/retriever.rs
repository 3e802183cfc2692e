//! The policy retriever: ingest one document, answer similarity queries.
//!
//! A [`PolicyRetriever`] starts out uninitialized. [`initialize`] ingests
//! the document and installs the finished corpus in one step; after that
//! the retriever is read-only and can be shared behind an `Arc` and
//! queried concurrently through `&self`.
//!
//! [`initialize`]: PolicyRetriever::initialize
//!
//! ```rust,no_run
//! # use std::sync::Arc;
//! # use hr_policy_agent::config::ChunkingConfig;
//! # use hr_policy_agent::embedding::HashEmbedder;
//! # use hr_policy_agent::retriever::{IngestionPolicy, PolicyRetriever};
//! # async fn demo() -> Result<(), hr_policy_agent::error::RetrieverError> {
//! let mut retriever = PolicyRetriever::new(
//!     Arc::new(HashEmbedder::default()),
//!     ChunkingConfig::default(),
//!     64,
//!     IngestionPolicy::FailFast,
//! );
//! retriever.initialize("hr_policy.pdf".as_ref()).await?;
//! let context = retriever.query_text("How many vacation days do I get?", 3).await?;
//! # let _ = context;
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::ChunkingConfig;
use crate::embedding::{embed_query, Embedder};
use crate::error::RetrieverError;
use crate::index::VectorIndex;
use crate::ingest::{ingest, Corpus};
use crate::models::RetrievedPassage;

/// What queries do before a document has been ingested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestionPolicy {
    /// Queries fail with [`RetrieverError::NotReady`].
    FailFast,
    /// Queries succeed with an empty result.
    Degraded,
}

impl IngestionPolicy {
    pub fn from_fail_flag(fail_on_ingestion_error: bool) -> Self {
        if fail_on_ingestion_error {
            IngestionPolicy::FailFast
        } else {
            IngestionPolicy::Degraded
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Readiness {
    Uninitialized,
    Ready,
}

/// Point-in-time description of the retriever, for health endpoints and
/// the `ingest` command.
#[derive(Debug, Clone, Serialize)]
pub struct RetrieverStats {
    pub readiness: Readiness,
    pub policy: IngestionPolicy,
    pub embedding_model: String,
    pub dims: usize,
    pub passages: usize,
    pub pages: usize,
    pub document_path: Option<PathBuf>,
    pub document_hash: Option<String>,
    pub loaded_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

pub struct PolicyRetriever {
    embedder: Arc<dyn Embedder>,
    chunking: ChunkingConfig,
    batch_size: usize,
    policy: IngestionPolicy,
    corpus: Option<Corpus>,
    last_error: Option<String>,
}

impl PolicyRetriever {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        chunking: ChunkingConfig,
        batch_size: usize,
        policy: IngestionPolicy,
    ) -> Self {
        Self {
            embedder,
            chunking,
            batch_size,
            policy,
            corpus: None,
            last_error: None,
        }
    }

    /// Ingest the document at `path` and become ready.
    ///
    /// On failure the retriever stays uninitialized with no index at all;
    /// the failure reason is kept for [`stats`](Self::stats).
    pub async fn initialize(&mut self, path: &Path) -> Result<(), RetrieverError> {
        if self.corpus.is_some() {
            return Err(RetrieverError::AlreadyInitialized);
        }

        match ingest(path, self.embedder.as_ref(), &self.chunking, self.batch_size).await {
            Ok(corpus) => {
                self.corpus = Some(corpus);
                self.last_error = None;
                Ok(())
            }
            Err(e) => {
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Return up to `k` passages, most similar first.
    ///
    /// Input is validated before the embedder is touched.
    pub async fn query(&self, text: &str, k: usize) -> Result<Vec<RetrievedPassage>, RetrieverError> {
        if k == 0 {
            return Err(RetrieverError::InvalidQuery("k must be >= 1".to_string()));
        }
        if text.trim().is_empty() {
            return Err(RetrieverError::InvalidQuery(
                "query text must not be empty".to_string(),
            ));
        }

        let corpus = match &self.corpus {
            Some(c) => c,
            None => {
                return match self.policy {
                    IngestionPolicy::FailFast => Err(RetrieverError::NotReady),
                    IngestionPolicy::Degraded => Ok(Vec::new()),
                }
            }
        };

        if corpus.index.is_empty() {
            return Ok(Vec::new());
        }

        let query_vec = embed_query(self.embedder.as_ref(), text)
            .await
            .map_err(|e| RetrieverError::Embedding(e.to_string()))?;

        corpus
            .index
            .nearest(&query_vec, k)
            .map_err(|e| RetrieverError::Embedding(e.to_string()))
    }

    /// [`query`](Self::query), with passage texts joined by newlines.
    pub async fn query_text(&self, text: &str, k: usize) -> Result<String, RetrieverError> {
        let passages = self.query(text, k).await?;
        Ok(passages
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n"))
    }

    pub fn readiness(&self) -> Readiness {
        if self.corpus.is_some() {
            Readiness::Ready
        } else {
            Readiness::Uninitialized
        }
    }

    pub fn is_ready(&self) -> bool {
        self.readiness() == Readiness::Ready
    }

    pub fn policy(&self) -> IngestionPolicy {
        self.policy
    }

    /// Number of indexed passages (0 when uninitialized).
    pub fn passage_count(&self) -> usize {
        self.corpus.as_ref().map(|c| c.passage_count()).unwrap_or(0)
    }

    pub fn stats(&self) -> RetrieverStats {
        let doc = self.corpus.as_ref().map(|c| &c.document);
        RetrieverStats {
            readiness: self.readiness(),
            policy: self.policy,
            embedding_model: self.embedder.model_name().to_string(),
            dims: self.embedder.dims(),
            passages: self.passage_count(),
            pages: doc.map(|d| d.page_count()).unwrap_or(0),
            document_path: doc.map(|d| d.path.clone()),
            document_hash: doc.map(|d| d.hash.clone()),
            loaded_at: doc.map(|d| d.loaded_at),
            last_error: self.last_error.clone(),
        }
    }
}
