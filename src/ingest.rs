//! Ingestion pipeline.
//!
//! read → extract → chunk → embed (batched) → index. The result is a
//! [`Corpus`], assembled entirely before it is handed back so a failure
//! at any stage leaves nothing half-built behind.

use std::path::Path;

use chrono::Utc;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::chunk::chunk_pages;
use crate::config::ChunkingConfig;
use crate::embedding::Embedder;
use crate::error::RetrieverError;
use crate::extract::{content_type_for, extract_pages};
use crate::index::{InMemoryIndex, VectorIndex};
use crate::models::Document;

/// A fully ingested document and its index.
#[derive(Debug)]
pub struct Corpus {
    pub document: Document,
    pub index: InMemoryIndex,
}

impl Corpus {
    pub fn passage_count(&self) -> usize {
        self.index.len()
    }
}

/// Read and extract the document at `path`.
pub fn load_document(path: &Path) -> Result<Document, RetrieverError> {
    let fail = |reason: String| RetrieverError::IngestionFailure {
        path: path.to_path_buf(),
        reason,
    };

    if !path.exists() {
        return Err(fail("file does not exist".to_string()));
    }
    if !path.is_file() {
        return Err(fail("not a regular file".to_string()));
    }

    let content_type = content_type_for(path).ok_or_else(|| {
        fail(format!(
            "unsupported file type '{}' (expected .pdf, .txt or .md)",
            path.extension()
                .map(|e| e.to_string_lossy().into_owned())
                .unwrap_or_default()
        ))
    })?;

    let bytes = std::fs::read(path).map_err(|e| fail(format!("read failed: {}", e)))?;
    let pages = extract_pages(&bytes, content_type).map_err(|e| fail(e.to_string()))?;

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let hash = format!("{:x}", hasher.finalize());

    Ok(Document {
        id: Uuid::new_v4().to_string(),
        path: path.to_path_buf(),
        content_type: content_type.to_string(),
        pages,
        hash,
        loaded_at: Utc::now(),
    })
}

/// Chunk, embed, and index an already-loaded document.
///
/// Passages are embedded `batch_size` at a time. Every batch must come
/// back with one vector per passage, each of `embedder.dims()` length.
pub async fn build_corpus(
    document: Document,
    embedder: &dyn Embedder,
    chunking: &ChunkingConfig,
    batch_size: usize,
) -> Result<Corpus, RetrieverError> {
    let fail = |reason: String| RetrieverError::IngestionFailure {
        path: document.path.clone(),
        reason,
    };

    let passages = chunk_pages(
        &document.pages,
        chunking.max_tokens,
        chunking.overlap_tokens,
    );

    let mut vectors = Vec::with_capacity(passages.len());
    for batch in passages.chunks(batch_size.max(1)) {
        let texts: Vec<String> = batch.iter().map(|p| p.text.clone()).collect();
        let batch_vectors = embedder
            .embed(&texts)
            .await
            .map_err(|e| fail(format!("embedding failed: {}", e)))?;

        if batch_vectors.len() != texts.len() {
            return Err(fail(format!(
                "embedder returned {} vectors for {} passages",
                batch_vectors.len(),
                texts.len()
            )));
        }
        if let Some(bad) = batch_vectors.iter().find(|v| v.len() != embedder.dims()) {
            return Err(fail(format!(
                "embedder returned a {}-dimensional vector, expected {}",
                bad.len(),
                embedder.dims()
            )));
        }
        vectors.extend(batch_vectors);
    }

    let index = InMemoryIndex::build(passages, vectors).map_err(|e| fail(e.to_string()))?;

    Ok(Corpus { document, index })
}

/// [`load_document`] followed by [`build_corpus`].
pub async fn ingest(
    path: &Path,
    embedder: &dyn Embedder,
    chunking: &ChunkingConfig,
    batch_size: usize,
) -> Result<Corpus, RetrieverError> {
    let document = load_document(path)?;
    build_corpus(document, embedder, chunking, batch_size).await
}
