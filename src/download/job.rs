//! Values carried on the job and outcome channels.

use serde::Serialize;
use url::Url;

/// One file to transfer; consumed by exactly one worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadJob {
    file_name: String,
    source_url: Url,
}

impl DownloadJob {
    #[must_use]
    pub fn new(file_name: impl Into<String>, source_url: Url) -> Self {
        Self {
            file_name: file_name.into(),
            source_url,
        }
    }

    /// Name of the file on the server, reused verbatim locally.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    #[must_use]
    pub fn source_url(&self) -> &Url {
        &self.source_url
    }
}

/// Result of one completed transfer. The bytes are already on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadOutcome {
    pub file_name: String,
    pub source_url: String,
    /// HTTP status of the content response.
    pub status: u16,
    pub bytes_written: u64,
}

impl DownloadOutcome {
    /// Whether the server answered the content request with a 2xx status.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
