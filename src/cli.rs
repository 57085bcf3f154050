//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use solr_fetch::config::{DEFAULT_OUTPUT_DIR, DEFAULT_SERVER_URL};
use solr_fetch::download::constants::{DEFAULT_BUFFER_SIZE, MAX_WORKERS};

/// Retrieve the latest index data from a Solr server.
///
/// Discovers the live index generation through the replication handler and
/// downloads every file of that generation into the output directory.
#[derive(Parser, Debug)]
#[command(name = "solr-fetch")]
#[command(author, version, about)]
pub struct Args {
    /// Location of the Solr server (ie: http://localhost:8983/solr)
    #[arg(short = 'l', long = "location", default_value = DEFAULT_SERVER_URL)]
    pub location: String,

    /// Output location of the downloaded index
    #[arg(short = 'o', long = "output", default_value = DEFAULT_OUTPUT_DIR)]
    pub output: PathBuf,

    /// Path to a file indicating that all files downloaded successfully (not written yet)
    #[arg(short = 's', long = "success-file")]
    pub success_file: Option<PathBuf>,

    /// Concurrent transfer workers (default: half the available CPUs)
    #[arg(short = 'w', long, value_parser = clap::value_parser!(u16).range(1..=MAX_WORKERS as i64))]
    pub workers: Option<u16>,

    /// Per-worker transfer buffer in bytes (1024-16777216)
    #[arg(long, default_value_t = DEFAULT_BUFFER_SIZE as u32, value_parser = clap::value_parser!(u32).range(1024..=16_777_216))]
    pub buffer_size: u32,

    /// Connect timeout in seconds (0 disables)
    #[arg(long, default_value_t = 30)]
    pub connect_timeout: u64,

    /// Overall per-request timeout in seconds, including the transfer (0 = none)
    #[arg(long, default_value_t = 0)]
    pub request_timeout: u64,

    /// Write a JSON report of every transfer outcome to this path
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}
