//! Error types for the transfer of index files.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while transferring one index file.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Network-level error (connection refused, reset, body read failure).
    #[error("network error downloading {url}: {source}")]
    Network {
        /// The URL that failed to download.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// File system error (create, write, flush).
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The server advertised a name that would escape the output directory.
    #[error("refusing unsafe index file name '{name}'")]
    UnsafeFileName {
        /// The name as advertised.
        name: String,
    },

    /// A worker task panicked or was cancelled.
    #[error("transfer worker failed: {reason}")]
    Worker {
        /// Join failure detail.
        reason: String,
    },
}

impl DownloadError {
    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an unsafe file name error.
    pub fn unsafe_file_name(name: impl Into<String>) -> Self {
        Self::UnsafeFileName { name: name.into() }
    }

    /// Creates a worker failure from a task join error.
    pub fn worker(error: &tokio::task::JoinError) -> Self {
        Self::Worker {
            reason: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_error_io_display() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let error = DownloadError::io(PathBuf::from("/var/lib/solr/data/_0.cfs"), io_error);
        let msg = error.to_string();
        assert!(msg.contains("/var/lib/solr/data/_0.cfs"), "Expected path in: {msg}");
        assert!(msg.contains("access denied"), "Expected cause in: {msg}");
    }

    #[test]
    fn test_download_error_unsafe_name_display() {
        let error = DownloadError::unsafe_file_name("../etc/passwd");
        assert!(error.to_string().contains("../etc/passwd"));
    }
}
