//! # HR Policy Agent
//!
//! Retrieval over a single HR policy document, for LLM agents.
//!
//! At startup the document is read, split into passages, embedded, and
//! indexed in memory. Each question is embedded with the same model and
//! answered with the *k* most similar passages. The CLI, the MCP server,
//! and the REST API are thin callers of that one query.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌──────────────┐   ┌───────────────┐
//! │  Document  │──▶│ Chunk+Embed  │──▶│ InMemoryIndex │
//! │ PDF/TXT/MD │   │  (ingest)    │   │   (cosine)    │
//! └────────────┘   └──────────────┘   └───────┬───────┘
//!                                             │
//!                      ┌──────────────────────┼──────────────┐
//!                      ▼                      ▼              ▼
//!                 ┌──────────┐         ┌──────────┐    ┌──────────┐
//!                 │   CLI    │         │   MCP    │    │   REST   │
//!                 │(hr-policy│         │stdio/http│    │  (axum)  │
//!                 └──────────┘         └──────────┘    └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! hr-policy ingest
//! hr-policy query "How many vacation days do I get?" --k 2
//! hr-policy serve mcp
//! hr-policy serve http
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`error`] | Retriever error taxonomy |
//! | [`models`] | Core data types |
//! | [`extract`] | Per-page text extraction |
//! | [`chunk`] | Passage splitting |
//! | [`embedding`] | Embedding provider abstraction |
//! | [`index`] | Vector index abstraction |
//! | [`ingest`] | Ingestion pipeline |
//! | [`retriever`] | The policy retriever |
//! | [`startup`] | Config-driven retriever construction |
//! | [`prompt`] | LLM prompt template |
//! | [`mcp`] | MCP server adapter |
//! | [`server`] | REST server |
//! | [`logging`] | Tracing setup |

pub mod chunk;
pub mod config;
pub mod embedding;
pub mod error;
pub mod extract;
pub mod index;
pub mod ingest;
pub mod logging;
pub mod mcp;
pub mod models;
pub mod prompt;
pub mod retriever;
pub mod server;
pub mod startup;
