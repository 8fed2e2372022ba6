//! Binary crate for the `cityweather` service.
//!
//! This crate focuses on:
//! - Parsing CLI arguments and merging them over the config file
//! - Logging setup
//! - Serving the cached snapshot over HTTP

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();
    init_tracing(cmd.level.as_deref());
    cmd.run().await
}

/// `--level` wins over `RUST_LOG`; both fall back to `info`.
fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
