//! Query URL construction for the replication command protocol.
//!
//! All three commands hang off the same sub-resource: the server root's
//! existing path with `replication` appended.

use url::Url;

use super::error::ReplicationError;

/// Path segment of the replication handler below the server root.
const REPLICATION_SEGMENT: &str = "replication";

const PARAM_COMMAND: &str = "command";
const PARAM_INDEX_VERSION: &str = "indexversion";
const PARAM_GENERATION: &str = "generation";
const PARAM_WRITER_TYPE: &str = "wt";
const PARAM_FILE: &str = "file";

const COMMAND_INDEX_VERSION: &str = "indexversion";
const COMMAND_FILE_LIST: &str = "filelist";
const COMMAND_FILE_CONTENT: &str = "filecontent";

/// Raw byte streaming writer; anything else wraps the content.
const WRITER_FILE_STREAM: &str = "filestream";

/// The replication sub-resource of one server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicationEndpoint {
    url: Url,
}

impl ReplicationEndpoint {
    /// Parses a server root URL and derives its replication endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ReplicationError::InvalidUrl`] when the root is not an
    /// absolute `http`/`https` URL.
    pub fn parse(server_root: &str) -> Result<Self, ReplicationError> {
        let root = Url::parse(server_root.trim())
            .map_err(|e| ReplicationError::invalid_url(server_root, e.to_string()))?;

        if !matches!(root.scheme(), "http" | "https") {
            return Err(ReplicationError::invalid_url(
                server_root,
                format!("unsupported scheme '{}'", root.scheme()),
            ));
        }
        if root.cannot_be_a_base() || root.host_str().is_none() {
            return Err(ReplicationError::invalid_url(server_root, "missing host"));
        }

        let mut url = root;
        let joined = format!("{}/{REPLICATION_SEGMENT}", url.path().trim_end_matches('/'));
        url.set_path(&joined);
        url.set_fragment(None);

        Ok(Self { url })
    }

    /// The endpoint without any command parameters.
    #[must_use]
    pub fn as_url(&self) -> &Url {
        &self.url
    }

    /// `?command=indexversion`
    #[must_use]
    pub fn index_version_url(&self) -> Url {
        self.with_params(&[(PARAM_COMMAND, COMMAND_INDEX_VERSION)])
    }

    /// `?command=filelist&indexversion=<v>&generation=<g>`
    #[must_use]
    pub fn file_list_url(&self, version: &str, generation: &str) -> Url {
        self.with_params(&[
            (PARAM_COMMAND, COMMAND_FILE_LIST),
            (PARAM_INDEX_VERSION, version),
            (PARAM_GENERATION, generation),
        ])
    }

    /// `?command=filecontent&wt=filestream&indexversion=<v>&generation=<g>&file=<name>`
    #[must_use]
    pub fn file_content_url(&self, version: &str, generation: &str, file_name: &str) -> Url {
        self.with_params(&[
            (PARAM_COMMAND, COMMAND_FILE_CONTENT),
            (PARAM_WRITER_TYPE, WRITER_FILE_STREAM),
            (PARAM_INDEX_VERSION, version),
            (PARAM_GENERATION, generation),
            (PARAM_FILE, file_name),
        ])
    }

    /// Appends `params` after any caller-supplied query pairs, dropping
    /// caller pairs that share a key with the protocol's own.
    fn with_params(&self, params: &[(&str, &str)]) -> Url {
        let retained: Vec<(String, String)> = self
            .url
            .query_pairs()
            .filter(|(key, _)| !params.iter().any(|(name, _)| key == name))
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        let mut url = self.url.clone();
        url.set_query(None);
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &retained {
                pairs.append_pair(key, value);
            }
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }
        url
    }
}
