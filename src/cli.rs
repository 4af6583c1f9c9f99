//! CLI argument definitions using clap derive macros.

use clap::Parser;

use handlefetch::fetch::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use handlefetch::{
    DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_ELAPSED, DEFAULT_PREFIX, MAX_WORKERS, default_workers,
};

/// Resolve handle identifiers to their registered URL locations.
///
/// Reads one identifier (or full handle API address) per line from stdin and
/// writes one tab-separated record per identifier to stdout:
/// status, elapsed seconds, epoch, address, locations.
#[derive(Parser, Debug)]
#[command(name = "handlefetch")]
#[command(author, version, about)]
pub struct Args {
    /// Base address prepended to identifiers that do not already start with it
    #[arg(short = 'p', long, env = "HANDLEFETCH_PREFIX", default_value = DEFAULT_PREFIX)]
    pub prefix: String,

    /// Number of concurrent workers (1-1024, default: available parallelism)
    #[arg(short = 'w', long, env = "HANDLEFETCH_WORKERS", default_value_t = default_worker_count(), value_parser = clap::value_parser!(u16).range(1..=1024))]
    pub workers: u16,

    /// Maximum attempts per request, including the first (1-100)
    #[arg(short = 'r', long, env = "HANDLEFETCH_MAX_RETRIES", default_value_t = DEFAULT_MAX_ATTEMPTS, value_parser = clap::value_parser!(u32).range(1..=100))]
    pub max_retries: u32,

    /// Wall-clock retry budget per request in seconds
    #[arg(long, env = "HANDLEFETCH_MAX_ELAPSED", default_value_t = DEFAULT_MAX_ELAPSED.as_secs(), value_parser = clap::value_parser!(u64).range(1..))]
    pub max_elapsed: u64,

    /// HTTP connect timeout in seconds
    #[arg(long, env = "HANDLEFETCH_CONNECT_TIMEOUT", default_value_t = CONNECT_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..))]
    pub connect_timeout: u64,

    /// HTTP read timeout in seconds
    #[arg(long, env = "HANDLEFETCH_READ_TIMEOUT", default_value_t = READ_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..))]
    pub read_timeout: u64,

    /// Increase log verbosity on stderr (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error log output
    #[arg(short, long)]
    pub quiet: bool,
}

/// Host parallelism, capped to the accepted `--workers` range.
fn default_worker_count() -> u16 {
    u16::try_from(default_workers().min(MAX_WORKERS)).unwrap_or(1)
}
