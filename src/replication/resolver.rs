//! Index discovery: which generation is live, and which files make it up.

use std::collections::HashSet;

use tracing::{debug, info, instrument};
use url::Url;

use super::endpoint::ReplicationEndpoint;
use super::error::ReplicationError;
use super::response::{
    FILE_LIST_COMMAND, INDEX_VERSION_COMMAND, IndexFileDescriptor, decode_file_list,
    decode_index_version,
};
use super::status::ServerStatus;
use crate::download::{DownloadJob, HttpClient};

const INDEX_VERSION_FIELD: &str = "indexversion";
const GENERATION_FIELD: &str = "generation";
const FILE_LIST_GROUP: &str = "filelist";

/// One snapshot of the server's index as seen at discovery time.
///
/// Version and generation only travel together; every URL after discovery
/// is derived from this value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexIdentity {
    endpoint: ReplicationEndpoint,
    version: String,
    generation: String,
}

impl IndexIdentity {
    #[must_use]
    pub fn new(
        endpoint: ReplicationEndpoint,
        version: impl Into<String>,
        generation: impl Into<String>,
    ) -> Self {
        Self {
            endpoint,
            version: version.into(),
            generation: generation.into(),
        }
    }

    #[must_use]
    pub fn endpoint(&self) -> &ReplicationEndpoint {
        &self.endpoint
    }

    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    #[must_use]
    pub fn generation(&self) -> &str {
        &self.generation
    }

    #[must_use]
    pub fn file_list_url(&self) -> Url {
        self.endpoint.file_list_url(&self.version, &self.generation)
    }

    #[must_use]
    pub fn file_content_url(&self, file_name: &str) -> Url {
        self.endpoint
            .file_content_url(&self.version, &self.generation, file_name)
    }
}

/// A consistent identity plus its file set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIndex {
    pub identity: IndexIdentity,
    pub files: Vec<IndexFileDescriptor>,
}

impl ResolvedIndex {
    /// One job per file, in file-list order, all bound to the same identity.
    #[must_use]
    pub fn download_jobs(&self) -> Vec<DownloadJob> {
        self.files
            .iter()
            .map(|file| DownloadJob::new(&file.name, self.identity.file_content_url(&file.name)))
            .collect()
    }
}

/// Runs the two discovery requests against one replication endpoint.
#[derive(Debug, Clone)]
pub struct IndexResolver {
    client: HttpClient,
    endpoint: ReplicationEndpoint,
}

impl IndexResolver {
    /// Creates a resolver for `server_root`.
    ///
    /// # Errors
    ///
    /// Returns [`ReplicationError::InvalidUrl`] if `server_root` is malformed.
    pub fn new(client: HttpClient, server_root: &str) -> Result<Self, ReplicationError> {
        Ok(Self {
            client,
            endpoint: ReplicationEndpoint::parse(server_root)?,
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &ReplicationEndpoint {
        &self.endpoint
    }

    /// Discovers the live generation, then its file list.
    ///
    /// There is no partial result: any failure in either step is returned
    /// and the file-list request is never sent after a failed version step.
    ///
    /// # Errors
    ///
    /// Returns [`ReplicationError`] on transport failure, undecodable body,
    /// non-zero header status, or a response missing required fields.
    #[instrument(skip(self), fields(endpoint = %self.endpoint.as_url()))]
    pub async fn resolve(&self) -> Result<ResolvedIndex, ReplicationError> {
        let identity = self.current_identity().await?;
        let files = self.file_list(&identity).await?;

        info!(
            version = identity.version(),
            generation = identity.generation(),
            files = files.len(),
            "resolved index file set"
        );

        Ok(ResolvedIndex { identity, files })
    }

    /// Step 1: `command=indexversion`.
    async fn current_identity(&self) -> Result<IndexIdentity, ReplicationError> {
        let body = self.fetch_body(self.endpoint.index_version_url()).await?;
        let decoded = decode_index_version(&body)?;
        ensure_success(INDEX_VERSION_COMMAND, &decoded.header.status())?;

        let version = decoded.long(INDEX_VERSION_FIELD).ok_or_else(|| {
            ReplicationError::malformed(INDEX_VERSION_COMMAND, "missing 'indexversion'")
        })?;
        let generation = decoded.long(GENERATION_FIELD).ok_or_else(|| {
            ReplicationError::malformed(INDEX_VERSION_COMMAND, "missing 'generation'")
        })?;

        debug!(version, generation, "discovered index version");
        Ok(IndexIdentity::new(
            self.endpoint.clone(),
            version,
            generation,
        ))
    }

    /// Step 2: `command=filelist` for exactly the discovered identity.
    async fn file_list(
        &self,
        identity: &IndexIdentity,
    ) -> Result<Vec<IndexFileDescriptor>, ReplicationError> {
        let body = self.fetch_body(identity.file_list_url()).await?;
        let decoded = decode_file_list(&body)?;
        ensure_success(FILE_LIST_COMMAND, &decoded.header.status())?;

        let group = decoded.group(FILE_LIST_GROUP).ok_or_else(|| {
            ReplicationError::malformed(FILE_LIST_COMMAND, "no 'filelist' group in response")
        })?;

        validate_file_names(&group.files)?;
        Ok(group.files.clone())
    }

    async fn fetch_body(&self, url: Url) -> Result<String, ReplicationError> {
        let response = self
            .client
            .get(&url)
            .await
            .map_err(|e| ReplicationError::transport(url.as_str(), e))?;
        debug!(url = %url, status = response.status().as_u16(), "discovery response");
        response
            .text()
            .await
            .map_err(|e| ReplicationError::transport(url.as_str(), e))
    }
}

/// Every entry needs a name, and no two entries may share one: each name
/// becomes one local file owned by exactly one worker.
fn validate_file_names(files: &[IndexFileDescriptor]) -> Result<(), ReplicationError> {
    let mut seen = HashSet::with_capacity(files.len());
    for (position, file) in files.iter().enumerate() {
        if file.name.is_empty() {
            return Err(ReplicationError::malformed(
                FILE_LIST_COMMAND,
                format!("file entry {position} has no name"),
            ));
        }
        if !seen.insert(file.name.as_str()) {
            return Err(ReplicationError::malformed(
                FILE_LIST_COMMAND,
                format!("file '{}' is listed more than once", file.name),
            ));
        }
    }
    Ok(())
}

fn ensure_success(command: &'static str, status: &ServerStatus) -> Result<(), ReplicationError> {
    match status {
        ServerStatus::Success => Ok(()),
        ServerStatus::Failure(code) => Err(ReplicationError::protocol_status(command, code.clone())),
    }
}
