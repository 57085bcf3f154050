//! CLI entry point for solr-fetch.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use solr_fetch::{FetchConfig, default_worker_count, fetch_index};
use tracing::{debug, error, info};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();
    init_tracing(&args);
    debug!(?args, "CLI arguments parsed");

    if let Err(err) = run(args).await {
        error!("{err:#}");
        std::process::exit(1);
    }
}

fn init_tracing(args: &Args) {
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

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run(args: Args) -> Result<()> {
    let report_path = args.report.clone();
    let config = config_from_args(args);

    let report = fetch_index(&config).await?;

    let failed = report.non_success().count();
    info!(
        files = report.len(),
        non_success = failed,
        bytes = report.total_bytes(),
        "fetch finished"
    );

    if let Some(path) = report_path {
        report
            .write_json(&path)
            .await
            .with_context(|| format!("unable to write report to {}", path.display()))?;
        info!(path = %path.display(), "report written");
    }

    Ok(())
}

fn config_from_args(args: Args) -> FetchConfig {
    let worker_count = args.workers.map_or_else(default_worker_count, usize::from);
    let seconds = |secs: u64| (secs > 0).then(|| Duration::from_secs(secs));

    let mut config = FetchConfig::new(args.location, args.output)
        .with_worker_count(worker_count)
        .with_buffer_size(args.buffer_size as usize)
        .with_timeouts(seconds(args.connect_timeout), seconds(args.request_timeout));
    config.success_marker = args.success_file;
    config
}
