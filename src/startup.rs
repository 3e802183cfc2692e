//! Config-driven construction of the retriever.
//!
//! This is where the ingestion failure policy is applied: with
//! `retrieval.fail_on_ingestion_error = true` a failed ingest aborts
//! startup, otherwise it is logged and an uninitialized retriever is
//! returned so the process can keep serving (empty) answers.

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::config::Config;
use crate::embedding::create_embedder;
use crate::retriever::{IngestionPolicy, PolicyRetriever};

pub async fn build_retriever(config: &Config) -> Result<PolicyRetriever> {
    let embedder = create_embedder(&config.embedding)
        .context("Failed to create embedding provider")?;
    let policy = IngestionPolicy::from_fail_flag(config.retrieval.fail_on_ingestion_error);

    let mut retriever = PolicyRetriever::new(
        embedder,
        config.chunking.clone(),
        config.embedding.batch_size,
        policy,
    );

    let path = &config.document.path;
    info!(
        path = %path.display(),
        provider = %config.embedding.provider,
        "ingesting policy document"
    );

    match retriever.initialize(path).await {
        Ok(()) => {
            let stats = retriever.stats();
            info!(
                passages = stats.passages,
                pages = stats.pages,
                model = %stats.embedding_model,
                dims = stats.dims,
                "policy document ready"
            );
        }
        Err(e) => match policy {
            IngestionPolicy::FailFast => {
                return Err(anyhow::Error::new(e).context("Policy document ingestion failed"));
            }
            IngestionPolicy::Degraded => {
                warn!(error = %e, "policy document ingestion failed; serving empty results");
            }
        },
    }

    Ok(retriever)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retriever::Readiness;

    fn config(doc: &std::path::Path, fail: bool) -> Config {
        let mut cfg = Config::for_document(doc);
        cfg.embedding.provider = "hash".to_string();
        cfg.retrieval.fail_on_ingestion_error = fail;
        cfg
    }

    #[tokio::test]
    async fn test_fatal_policy_aborts_on_missing_document() {
        let err = build_retriever(&config("/nonexistent/policy.pdf".as_ref(), true))
            .await
            .err()
            .unwrap();
        assert!(format!("{:#}", err).contains("does not exist"));
    }

    #[tokio::test]
    async fn test_degraded_policy_keeps_running() {
        let r = build_retriever(&config("/nonexistent/policy.pdf".as_ref(), false))
            .await
            .unwrap();
        assert_eq!(r.readiness(), Readiness::Uninitialized);
        assert!(r.query("vacation", 3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_builds_ready_retriever() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("policy.md");
        std::fs::write(&path, "# Leave\n\nEmployees receive 20 vacation days annually.").unwrap();
        let r = build_retriever(&config(&path, true)).await.unwrap();
        assert!(r.is_ready());
        assert_eq!(r.passage_count(), 1);
    }
}
