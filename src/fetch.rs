//! End-to-end fetch: discover the live generation, then transfer its files.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::config::FetchConfig;
use crate::download::{DownloadError, EngineError, FetchReport, HttpClient, TransferScheduler};
use crate::replication::{IndexResolver, ReplicationError};

/// Any failure that ends a fetch run.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Discovery failed; nothing was downloaded.
    #[error(transparent)]
    Replication(#[from] ReplicationError),

    /// A file transfer failed; the run was aborted.
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// The scheduler configuration is out of range.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The output directory could not be created.
    #[error("unable to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Fetches the complete file set of the server's current index generation
/// into `config.output_dir`.
///
/// The server root is validated before the output directory is touched or
/// any request is sent.
///
/// # Errors
///
/// Returns the first [`FetchError`] from any stage; there is no partial
/// success.
#[instrument(skip(config), fields(server = %config.base_url, output_dir = %config.output_dir.display()))]
pub async fn fetch_index(config: &FetchConfig) -> Result<FetchReport, FetchError> {
    let client = HttpClient::with_timeouts(config.connect_timeout, config.request_timeout)
        .map_err(FetchError::Client)?;
    let resolver = IndexResolver::new(client.clone(), &config.base_url)?;
    let scheduler = TransferScheduler::new(
        client,
        config.output_dir.clone(),
        config.worker_count,
        config.buffer_size,
    )?;

    if let Some(marker) = &config.success_marker {
        debug!(path = %marker.display(), "success marker path accepted but not written");
    }

    prepare_output_dir(&config.output_dir).await?;

    info!("beginning fetch of index");
    let resolved = resolver.resolve().await?;
    let report = scheduler.run(resolved.download_jobs()).await?;

    info!(
        version = resolved.identity.version(),
        generation = resolved.identity.generation(),
        files = report.len(),
        bytes = report.total_bytes(),
        "index fetch complete"
    );
    Ok(report)
}

/// Creates `path` and any missing parents (owner-only on Unix).
///
/// # Errors
///
/// Returns [`FetchError::OutputDir`] if creation fails.
pub async fn prepare_output_dir(path: &Path) -> Result<(), FetchError> {
    let mut builder = tokio::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(0o700);

    builder
        .create(path)
        .await
        .map_err(|source| FetchError::OutputDir {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_prepare_output_dir_creates_parents() {
        let dir = tempfile::TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b").join("index");
        prepare_output_dir(&nested).await.unwrap();
        assert!(nested.is_dir());
        // Existing directory is fine.
        prepare_output_dir(&nested).await.unwrap();
    }

    #[tokio::test]
    async fn test_prepare_output_dir_fails_over_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("occupied");
        std::fs::write(&file, b"x").unwrap();
        let err = prepare_output_dir(&file.join("index")).await.unwrap_err();
        assert!(matches!(err, FetchError::OutputDir { .. }));
    }

    #[tokio::test]
    async fn test_fetch_rejects_bad_url_before_creating_output() {
        let dir = tempfile::TempDir::new().unwrap();
        let output = dir.path().join("never-created");
        let config = FetchConfig::new("not a url", &output);

        let err = fetch_index(&config).await.unwrap_err();
        assert!(matches!(
            err,
            FetchError::Replication(ReplicationError::InvalidUrl { .. })
        ));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_fetch_rejects_zero_workers() {
        let dir = tempfile::TempDir::new().unwrap();
        let config =
            FetchConfig::new("http://localhost:8983/solr", dir.path()).with_worker_count(0);
        let err = fetch_index(&config).await.unwrap_err();
        assert!(matches!(
            err,
            FetchError::Engine(EngineError::InvalidWorkerCount { value: 0 })
        ));
    }
}
