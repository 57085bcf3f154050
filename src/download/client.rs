//! HTTP transport shared by discovery and file transfer.
//!
//! One `HttpClient` is built per run and cloned into every worker, so all
//! requests share a connection pool.

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use futures_util::{Stream, StreamExt};
use reqwest::{Client, Response};
use tokio::fs::File;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tracing::{debug, instrument};
use url::Url;

use super::constants::CONNECT_TIMEOUT_SECS;
use super::error::DownloadError;
use super::job::{DownloadJob, DownloadOutcome};
use crate::user_agent;

/// HTTP client for the replication endpoint.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

/// Memory accounting for one streamed copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferStats {
    /// Total bytes written to the sink.
    pub bytes_written: u64,
    /// Capacity of the write buffer used for the copy.
    pub buffer_capacity: usize,
    /// Most bytes ever held in that buffer at once.
    pub peak_buffered: usize,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    /// Creates a client with the default connect timeout and no overall
    /// request timeout.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        Self::with_timeouts(Some(Duration::from_secs(CONNECT_TIMEOUT_SECS)), None)
            .expect("failed to build HTTP client with static configuration")
    }

    /// Creates a client with explicit timeouts; `None` disables a timeout.
    ///
    /// # Errors
    ///
    /// Returns the builder error if the TLS backend cannot be initialised.
    pub fn with_timeouts(
        connect_timeout: Option<Duration>,
        request_timeout: Option<Duration>,
    ) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder()
            .user_agent(user_agent::default_user_agent())
            .gzip(true);
        if let Some(timeout) = connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Issues a GET; the status code is not interpreted here.
    ///
    /// # Errors
    ///
    /// Returns the transport error if no response was received.
    pub async fn get(&self, url: &Url) -> Result<Response, reqwest::Error> {
        self.client.get(url.clone()).send().await
    }

    /// Transfers one job's file into `output_dir`, overwriting any file of
    /// the same name.
    ///
    /// The local file is created before the request is sent. The body is
    /// streamed through a write buffer of `buffer_size` bytes, so memory per
    /// transfer does not depend on the file's size. A non-2xx status is not
    /// an error; it is reported on the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError`] if the name is unsafe, the file cannot be
    /// created or written, or the transport fails. The partial file is
    /// removed on failure, and also when the transfer is cancelled.
    #[instrument(skip(self, job, output_dir), fields(file = job.file_name()))]
    pub async fn download_to_file(
        &self,
        job: &DownloadJob,
        output_dir: &Path,
        buffer_size: usize,
    ) -> Result<DownloadOutcome, DownloadError> {
        let file_path = local_path(output_dir, job.file_name())?;
        let file = File::create(&file_path)
            .await
            .map_err(|e| DownloadError::io(file_path.clone(), e))?;
        let partial = PartialFile::new(file_path);

        let url = job.source_url().as_str();
        let (status, stats) = self
            .fetch_into(job.source_url(), file, buffer_size, partial.path())
            .await?;

        debug!(
            path = %partial.path().display(),
            status,
            bytes = stats.bytes_written,
            "transfer complete"
        );
        partial.keep();

        Ok(DownloadOutcome {
            file_name: job.file_name().to_string(),
            source_url: url.to_string(),
            status,
            bytes_written: stats.bytes_written,
        })
    }

    /// Sends the GET and streams the body into `file`, consuming it.
    async fn fetch_into(
        &self,
        url: &Url,
        file: File,
        buffer_size: usize,
        file_path: &Path,
    ) -> Result<(u16, TransferStats), DownloadError> {
        let response = self
            .get(url)
            .await
            .map_err(|e| DownloadError::network(url.as_str(), e))?;
        let status = response.status().as_u16();

        let stats =
            stream_to_file(response.bytes_stream(), file, buffer_size, url.as_str(), file_path)
                .await?;
        Ok((status, stats))
    }

    /// Returns a reference to the underlying reqwest client.
    #[must_use]
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

/// Streams `body` into `sink` through a fixed-capacity write buffer.
///
/// Chunks larger than the buffer are written straight through, so the
/// buffer never grows past `buffer_size`.
///
/// # Errors
///
/// Returns [`DownloadError::Network`] if a body chunk fails and
/// [`DownloadError::Io`] if writing or flushing fails.
pub async fn stream_to_file<S, B, W>(
    body: S,
    sink: W,
    buffer_size: usize,
    url: &str,
    file_path: &Path,
) -> Result<TransferStats, DownloadError>
where
    S: Stream<Item = Result<B, reqwest::Error>>,
    B: AsRef<[u8]>,
    W: AsyncWrite + Unpin,
{
    let mut body = std::pin::pin!(body);
    let mut writer = BufWriter::with_capacity(buffer_size, sink);
    let mut bytes_written: u64 = 0;
    let mut peak_buffered = 0;

    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(|e| DownloadError::network(url, e))?;
        let chunk = chunk.as_ref();

        writer
            .write_all(chunk)
            .await
            .map_err(|e| DownloadError::io(file_path.to_path_buf(), e))?;

        bytes_written += chunk.len() as u64;
        peak_buffered = peak_buffered.max(writer.buffer().len());
    }

    writer
        .flush()
        .await
        .map_err(|e| DownloadError::io(file_path.to_path_buf(), e))?;

    Ok(TransferStats {
        bytes_written,
        buffer_capacity: buffer_size,
        peak_buffered,
    })
}

/// Resolves a server file name to a path directly inside `output_dir`.
fn local_path(output_dir: &Path, name: &str) -> Result<PathBuf, DownloadError> {
    if name.contains(['/', '\\']) {
        return Err(DownloadError::unsafe_file_name(name));
    }
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(output_dir.join(name)),
        _ => Err(DownloadError::unsafe_file_name(name)),
    }
}

/// A freshly truncated target file that is removed on drop unless kept.
///
/// Dropping covers both an error return and cancellation of the worker task
/// mid-transfer, so no truncated file outlives a failed run.
struct PartialFile {
    path: PathBuf,
    keep: bool,
}

impl PartialFile {
    fn new(path: PathBuf) -> Self {
        Self { path, keep: false }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn keep(mut self) {
        self.keep = true;
    }
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        if self.keep {
            return;
        }
        debug!(path = %self.path.display(), "removing partial file");
        // Drop cannot await; the unlink is a single metadata operation.
        let _ = std::fs::remove_file(&self.path);
    }
}
