//! TOML configuration loading and validation.
//!
//! A single file configures the policy document, the chunker, retrieval,
//! the embedding provider, and the HTTP bind address. Relative document
//! paths are resolved against the directory containing the config file.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub document: DocumentConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DocumentConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChunkingConfig {
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
    #[serde(default = "default_overlap")]
    pub overlap_tokens: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
            overlap_tokens: default_overlap(),
        }
    }
}

fn default_max_tokens() -> usize {
    1000
}
fn default_overlap() -> usize {
    50
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    /// Default number of passages returned per query.
    #[serde(default = "default_k")]
    pub k: usize,
    /// Abort startup when the document cannot be ingested. When false the
    /// process keeps running and queries return empty results.
    #[serde(default = "default_fail_on_ingestion_error")]
    pub fail_on_ingestion_error: bool,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            k: default_k(),
            fail_on_ingestion_error: default_fail_on_ingestion_error(),
        }
    }
}

fn default_k() -> usize {
    3
}
fn default_fail_on_ingestion_error() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub dims: Option<usize>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Base URL for the Ollama provider.
    #[serde(default)]
    pub url: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            dims: None,
            batch_size: default_batch_size(),
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
            url: None,
        }
    }
}

fn default_provider() -> String {
    "local".to_string()
}
fn default_batch_size() -> usize {
    64
}
fn default_max_retries() -> u32 {
    5
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8000".to_string()
}

impl Config {
    /// A config with defaults everywhere, pointing at `document`.
    pub fn for_document(document: impl Into<PathBuf>) -> Self {
        Self {
            document: DocumentConfig {
                path: document.into(),
            },
            chunking: ChunkingConfig::default(),
            retrieval: RetrievalConfig::default(),
            embedding: EmbeddingConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let mut config = parse_config(&content)?;

    if config.document.path.is_relative() {
        if let Some(dir) = path.parent() {
            config.document.path = dir.join(&config.document.path);
        }
    }

    Ok(config)
}

/// Parse and validate config text. Paths are left as written.
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.document.path.as_os_str().is_empty() {
        anyhow::bail!("document.path must not be empty");
    }

    if config.chunking.max_tokens == 0 {
        anyhow::bail!("chunking.max_tokens must be > 0");
    }
    if config.chunking.overlap_tokens >= config.chunking.max_tokens {
        anyhow::bail!("chunking.overlap_tokens must be < chunking.max_tokens");
    }

    if config.retrieval.k == 0 {
        anyhow::bail!("retrieval.k must be >= 1");
    }

    if config.embedding.batch_size == 0 {
        anyhow::bail!("embedding.batch_size must be > 0");
    }
    if config.embedding.dims == Some(0) {
        anyhow::bail!("embedding.dims must be > 0");
    }

    match config.embedding.provider.as_str() {
        "local" | "hash" => {}
        "openai" | "ollama" => {
            if config.embedding.model.is_none() {
                anyhow::bail!(
                    "embedding.model must be specified when provider is '{}'",
                    config.embedding.provider
                );
            }
            if config.embedding.dims.is_none() {
                anyhow::bail!(
                    "embedding.dims must be specified when provider is '{}'",
                    config.embedding.provider
                );
            }
        }
        other => anyhow::bail!(
            "Unknown embedding provider: '{}'. Must be local, openai, ollama, or hash.",
            other
        ),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let cfg = parse_config("[document]\npath = \"policy.pdf\"\n").unwrap();
        assert_eq!(cfg.document.path, PathBuf::from("policy.pdf"));
        assert_eq!(cfg.chunking.max_tokens, 1000);
        assert_eq!(cfg.chunking.overlap_tokens, 50);
        assert_eq!(cfg.retrieval.k, 3);
        assert!(cfg.retrieval.fail_on_ingestion_error);
        assert_eq!(cfg.embedding.provider, "local");
        assert_eq!(cfg.server.bind, "127.0.0.1:8000");
    }

    #[test]
    fn test_full_config_parses() {
        let cfg = parse_config(
            r#"
[document]
path = "/srv/hr/policy.pdf"

[chunking]
max_tokens = 200
overlap_tokens = 20

[retrieval]
k = 5
fail_on_ingestion_error = false

[embedding]
provider = "ollama"
model = "nomic-embed-text"
dims = 768
url = "http://ollama:11434"

[server]
bind = "0.0.0.0:9000"
"#,
        )
        .unwrap();
        assert_eq!(cfg.chunking.max_tokens, 200);
        assert_eq!(cfg.retrieval.k, 5);
        assert!(!cfg.retrieval.fail_on_ingestion_error);
        assert_eq!(cfg.embedding.dims, Some(768));
        assert_eq!(cfg.embedding.url.as_deref(), Some("http://ollama:11434"));
        assert_eq!(cfg.server.bind, "0.0.0.0:9000");
    }

    #[test]
    fn test_rejects_zero_k() {
        let err = parse_config("[document]\npath = \"p.pdf\"\n[retrieval]\nk = 0\n").unwrap_err();
        assert!(err.to_string().contains("retrieval.k"));
    }

    #[test]
    fn test_rejects_overlap_not_below_max() {
        let err = parse_config(
            "[document]\npath = \"p.pdf\"\n[chunking]\nmax_tokens = 10\noverlap_tokens = 10\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("overlap_tokens"));
    }

    #[test]
    fn test_rejects_unknown_provider() {
        let err = parse_config("[document]\npath = \"p.pdf\"\n[embedding]\nprovider = \"magic\"\n")
            .unwrap_err();
        assert!(err.to_string().contains("Unknown embedding provider"));
    }

    #[test]
    fn test_remote_provider_requires_model_and_dims() {
        let err = parse_config("[document]\npath = \"p.pdf\"\n[embedding]\nprovider = \"openai\"\n")
            .unwrap_err();
        assert!(err.to_string().contains("embedding.model"));

        let err = parse_config(
            "[document]\npath = \"p.pdf\"\n[embedding]\nprovider = \"openai\"\nmodel = \"text-embedding-3-small\"\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("embedding.dims"));
    }

    #[test]
    fn test_missing_document_section_fails() {
        assert!(parse_config("[retrieval]\nk = 3\n").is_err());
    }

    #[test]
    fn test_relative_document_path_resolves_against_config_dir() {
        let tmp = tempfile::TempDir::new().unwrap();
        let cfg_path = tmp.path().join("hr-policy.toml");
        std::fs::write(&cfg_path, "[document]\npath = \"docs/policy.pdf\"\n").unwrap();

        let cfg = load_config(&cfg_path).unwrap();
        assert_eq!(cfg.document.path, tmp.path().join("docs/policy.pdf"));
    }

    #[test]
    fn test_absolute_document_path_is_kept() {
        let tmp = tempfile::TempDir::new().unwrap();
        let cfg_path = tmp.path().join("hr-policy.toml");
        std::fs::write(&cfg_path, "[document]\npath = \"/srv/policy.pdf\"\n").unwrap();

        let cfg = load_config(&cfg_path).unwrap();
        assert_eq!(cfg.document.path, PathBuf::from("/srv/policy.pdf"));
    }

    #[test]
    fn test_example_config_is_valid() {
        let cfg = parse_config(include_str!("../config/hr-policy.example.toml")).unwrap();
        assert_eq!(cfg.embedding.model.as_deref(), Some("all-minilm-l6-v2"));
        assert_eq!(cfg.retrieval.k, 3);
    }

    #[test]
    fn test_missing_config_file_reports_path() {
        let err = load_config(Path::new("/nonexistent/hr-policy.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/hr-policy.toml"));
    }
}
