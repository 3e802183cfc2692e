//! End-to-end retrieval through the public library API.

mod common;

use std::fs;
use std::sync::Arc;

use hr_policy_agent::config::{load_config, ChunkingConfig};
use hr_policy_agent::embedding::HashEmbedder;
use hr_policy_agent::error::RetrieverError;
use hr_policy_agent::retriever::{IngestionPolicy, PolicyRetriever, Readiness};
use hr_policy_agent::startup::build_retriever;
use tempfile::TempDir;

use common::{minimal_pdf, setup_text_env, REMOTE, VACATION};

#[tokio::test]
async fn test_config_driven_two_passage_scenario() {
    let (_tmp, config_path) = setup_text_env();
    let cfg = load_config(&config_path).unwrap();
    let retriever = build_retriever(&cfg).await.unwrap();

    assert_eq!(retriever.readiness(), Readiness::Ready);
    assert_eq!(retriever.passage_count(), 2);

    let hits = retriever
        .query("How many vacation days do I get?", 1)
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].text, VACATION);

    let hits = retriever.query("irrelevant nonsense text", 2).await.unwrap();
    assert_eq!(hits.len(), 2);
}

#[tokio::test]
async fn test_full_ranking_is_non_increasing_and_prefix_stable() {
    let (_tmp, config_path) = setup_text_env();
    let cfg = load_config(&config_path).unwrap();
    let retriever = build_retriever(&cfg).await.unwrap();

    let all = retriever.query("remote work policy", 50).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].text, REMOTE);
    for pair in all.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }

    let top = retriever.query("remote work policy", 1).await.unwrap();
    assert_eq!(top[0].index, all[0].index);
}

#[tokio::test]
async fn test_concurrent_queries_share_one_retriever() {
    let (_tmp, config_path) = setup_text_env();
    let cfg = load_config(&config_path).unwrap();
    let retriever = Arc::new(build_retriever(&cfg).await.unwrap());

    let mut handles = Vec::new();
    for _ in 0..8 {
        let r = retriever.clone();
        handles.push(tokio::spawn(async move {
            r.query_text("vacation days", 1).await.unwrap()
        }));
    }
    for h in handles {
        assert_eq!(h.await.unwrap(), VACATION);
    }
}

#[tokio::test]
async fn test_pdf_pages_become_page_tagged_passages() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("hr_policy_document.pdf");
    fs::write(
        &path,
        minimal_pdf(&[
            "Remote work is allowed up to 3 days per week.",
            "Employees receive 20 vacation days annually.",
        ]),
    )
    .unwrap();

    let mut retriever = PolicyRetriever::new(
        Arc::new(HashEmbedder::default()),
        ChunkingConfig::default(),
        64,
        IngestionPolicy::FailFast,
    );
    retriever.initialize(&path).await.unwrap();

    let stats = retriever.stats();
    assert_eq!(stats.pages, 2);
    assert_eq!(stats.passages, 2);

    let hits = retriever.query("vacation days", 1).await.unwrap();
    assert_eq!(hits[0].page, 2);
    assert!(hits[0].text.contains("vacation"));
}

#[tokio::test]
async fn test_corrupt_pdf_is_ingestion_failure() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("broken.pdf");
    fs::write(&path, b"%PDF-1.4\nthis is not really a pdf").unwrap();

    let mut retriever = PolicyRetriever::new(
        Arc::new(HashEmbedder::default()),
        ChunkingConfig::default(),
        64,
        IngestionPolicy::FailFast,
    );
    let err = retriever.initialize(&path).await.unwrap_err();
    assert!(matches!(err, RetrieverError::IngestionFailure { .. }));
    assert_eq!(retriever.readiness(), Readiness::Uninitialized);
}

#[tokio::test]
async fn test_degraded_startup_serves_empty_answers() {
    let tmp = TempDir::new().unwrap();
    let config_path = common::write_config(tmp.path(), "missing.pdf", false);
    let cfg = load_config(&config_path).unwrap();

    let retriever = build_retriever(&cfg).await.unwrap();
    assert_eq!(retriever.readiness(), Readiness::Uninitialized);
    assert!(retriever.stats().last_error.unwrap().contains("does not exist"));
    assert_eq!(retriever.query_text("vacation", 3).await.unwrap(), "");
}

#[tokio::test]
async fn test_fatal_startup_reports_missing_document() {
    let tmp = TempDir::new().unwrap();
    let config_path = common::write_config(tmp.path(), "missing.pdf", true);
    let cfg = load_config(&config_path).unwrap();

    let err = build_retriever(&cfg).await.err().unwrap();
    let msg = format!("{:#}", err);
    assert!(msg.contains("missing.pdf"), "unexpected error: {}", msg);
}
