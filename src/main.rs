//! # HR Policy Agent CLI (`hr-policy`)
//!
//! Ingests the HR policy document named in the config file and answers
//! questions about it from the command line, over MCP, or over HTTP.
//!
//! ## Usage
//!
//! ```bash
//! hr-policy --config ./config/hr-policy.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `hr-policy ingest` | Ingest the document and print corpus stats |
//! | `hr-policy query "<text>"` | Print the passages most relevant to a question |
//! | `hr-policy prompt "<text>"` | Print the LLM prompt for a question |
//! | `hr-policy serve mcp` | Serve MCP over stdio |
//! | `hr-policy serve http` | Serve the REST API and MCP (streamable HTTP) |
//!
//! ## Claude Desktop / Cursor Integration
//!
//! ```json
//! {
//!   "mcpServers": {
//!     "hr-policy": {
//!       "command": "hr-policy",
//!       "args": ["--config", "/path/to/hr-policy.toml", "serve", "mcp"]
//!     }
//!   }
//! }
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use hr_policy_agent::config;
use hr_policy_agent::logging::init_logging;
use hr_policy_agent::mcp::{serve_stdio, PolicyMcpServer};
use hr_policy_agent::prompt::build_llm_prompt;
use hr_policy_agent::retriever::Readiness;
use hr_policy_agent::server;
use hr_policy_agent::startup::build_retriever;

/// HR Policy Agent: answers HR policy questions from a policy document.
#[derive(Parser)]
#[command(
    name = "hr-policy",
    about = "HR Policy Agent: retrieval over a company HR policy document",
    version,
    long_about = "Loads one HR policy document (PDF, text, or Markdown), splits it into \
    passages, embeds them, and answers questions by returning the most similar passages. \
    The same retrieval is exposed as an MCP tool and prompt and as a small REST API."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/hr-policy.toml")]
    config: PathBuf,

    /// Log level used when `RUST_LOG` is not set. Logs go to stderr.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest the policy document and print what was indexed.
    ///
    /// Exits non-zero if ingestion fails, regardless of
    /// `retrieval.fail_on_ingestion_error`.
    Ingest {
        /// Print stats as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Retrieve the passages most relevant to a question.
    Query {
        /// The question.
        text: String,

        /// Number of passages (defaults to `retrieval.k`).
        #[arg(long)]
        k: Option<usize>,

        /// Print passages with page numbers and scores as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the LLM prompt for a question, including retrieved context.
    Prompt {
        /// The question.
        text: String,

        /// Number of context passages (defaults to `retrieval.k`).
        #[arg(long)]
        k: Option<usize>,
    },

    /// Start a server.
    Serve {
        #[command(subcommand)]
        service: ServeService,
    },
}

#[derive(Subcommand)]
enum ServeService {
    /// MCP over stdin/stdout.
    Mcp,
    /// REST API plus MCP streamable HTTP at `/mcp`, on `[server].bind`.
    Http,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Ingest { json } => {
            let retriever = build_retriever(&cfg).await?;
            let stats = retriever.stats();
            if stats.readiness != Readiness::Ready {
                anyhow::bail!(
                    "Ingestion failed: {}",
                    stats.last_error.as_deref().unwrap_or("unknown error")
                );
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("Ingested {}", cfg.document.path.display());
                println!("  pages:     {}", stats.pages);
                println!("  passages:  {}", stats.passages);
                println!("  model:     {} ({} dims)", stats.embedding_model, stats.dims);
                if let Some(hash) = &stats.document_hash {
                    println!("  sha256:    {}", hash);
                }
            }
        }
        Commands::Query { text, k, json } => {
            let retriever = build_retriever(&cfg).await?;
            let k = k.unwrap_or(cfg.retrieval.k);
            let passages = retriever.query(&text, k).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&passages)?);
            } else {
                for p in &passages {
                    println!("{}", p.text);
                }
            }
        }
        Commands::Prompt { text, k } => {
            let retriever = build_retriever(&cfg).await?;
            let k = k.unwrap_or(cfg.retrieval.k);
            let context = retriever.query_text(&text, k).await?;
            println!("{}", build_llm_prompt(&text, &context));
        }
        Commands::Serve { service } => {
            let retriever = Arc::new(build_retriever(&cfg).await?);
            match service {
                ServeService::Mcp => {
                    serve_stdio(PolicyMcpServer::new(retriever, cfg.retrieval.k)).await?;
                }
                ServeService::Http => {
                    server::run_server(&cfg.server.bind, retriever, cfg.retrieval.k).await?;
                }
            }
        }
    }

    Ok(())
}
