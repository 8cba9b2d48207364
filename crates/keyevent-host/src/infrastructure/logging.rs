//! Tracing subscriber setup for the host binary.
//!
//! Logs go to stderr.  Stdout carries only replay verdicts, and a log line
//! emitted from the channel's delivery worker never waits on the stdout lock.

use tracing_subscriber::EnvFilter;

/// Filter from `RUST_LOG`, else `configured_level`, else `info`.
pub fn env_filter(configured_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(configured_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global fmt subscriber writing to stderr.
pub fn init(configured_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(configured_level))
        .with_writer(std::io::stderr)
        .init();
}
