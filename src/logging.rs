//! Tracing subscriber setup.
//!
//! Logs always go to stderr: stdout carries MCP JSON-RPC in stdio mode
//! and command output everywhere else.

use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_level` applies. Calling
/// this twice is harmless (the second call is ignored).
pub fn init_logging(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
