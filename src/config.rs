//! Run configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::download::constants::{CONNECT_TIMEOUT_SECS, DEFAULT_BUFFER_SIZE};
use crate::download::default_worker_count;

/// Placeholder server root used when none is given.
pub const DEFAULT_SERVER_URL: &str = "http://172.20.20.20:8983/solr";

/// Default destination of the fetched index.
pub const DEFAULT_OUTPUT_DIR: &str = "/var/lib/solr/data";

/// Everything one fetch needs; built once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    /// Server root; `replication` is appended to its path.
    pub base_url: String,
    pub output_dir: PathBuf,
    pub worker_count: usize,
    /// Per-worker transfer buffer in bytes.
    pub buffer_size: usize,
    pub connect_timeout: Option<Duration>,
    /// Overall per-request timeout, covering the body transfer.
    pub request_timeout: Option<Duration>,
    /// Accepted for compatibility; never written.
    pub success_marker: Option<PathBuf>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SERVER_URL.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            worker_count: default_worker_count(),
            buffer_size: DEFAULT_BUFFER_SIZE,
            connect_timeout: Some(Duration::from_secs(CONNECT_TIMEOUT_SECS)),
            request_timeout: None,
            success_marker: None,
        }
    }
}

impl FetchConfig {
    /// Defaults with the given server root and output directory.
    #[must_use]
    pub fn new(base_url: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_url: base_url.into(),
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    #[must_use]
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    #[must_use]
    pub fn with_timeouts(
        mut self,
        connect_timeout: Option<Duration>,
        request_timeout: Option<Duration>,
    ) -> Self {
        self.connect_timeout = connect_timeout;
        self.request_timeout = request_timeout;
        self
    }
}
