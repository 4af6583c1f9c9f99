//! CLI entry point for handlefetch.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use handlefetch::{HttpClient, HttpRetriever, Pipeline, PipelineConfig, RetryPolicy};
use tokio::io::BufReader;
use tracing::{debug, info};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help and --version work without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    // stdout carries the record stream, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    let client = HttpClient::new_with_timeouts(
        Duration::from_secs(args.connect_timeout),
        Duration::from_secs(args.read_timeout),
    )
    .context("failed to build HTTP client")?;

    let retry_policy = RetryPolicy::with_max_attempts(args.max_retries)
        .with_max_elapsed(Duration::from_secs(args.max_elapsed));
    let retriever = Arc::new(HttpRetriever::new(client, retry_policy));

    let config = PipelineConfig::new(usize::from(args.workers))?;
    let pipeline = Pipeline::new(config, retriever, args.prefix);

    let summary = pipeline
        .run(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await?;

    info!(
        emitted = summary.emitted,
        skipped = summary.skipped,
        "handlefetch complete"
    );

    Ok(())
}
