//! Client side of the replication discovery protocol.
//!
//! Discovery is two requests against `<root>/replication`:
//!
//! 1. `command=indexversion` reports the live index version and generation
//! 2. `command=filelist` lists the files of exactly that version/generation
//!
//! File content is then fetched with `command=filecontent`, built from the
//! same [`IndexIdentity`].
//!
//! # Example
//!
//! ```no_run
//! use solr_fetch::download::HttpClient;
//! use solr_fetch::replication::IndexResolver;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let resolver = IndexResolver::new(HttpClient::new(), "http://localhost:8983/solr")?;
//! let resolved = resolver.resolve().await?;
//! println!(
//!     "generation {} has {} files",
//!     resolved.identity.generation(),
//!     resolved.files.len()
//! );
//! # Ok(())
//! # }
//! ```

mod endpoint;
mod error;
mod resolver;
mod response;
mod status;

pub use endpoint::ReplicationEndpoint;
pub use error::ReplicationError;
pub use resolver::{IndexIdentity, IndexResolver, ResolvedIndex};
pub use response::{
    FileGroup, FileListResponse, HeaderEntry, IndexFileDescriptor, IndexVersionResponse,
    ResponseHeader, decode_file_list, decode_index_version,
};
pub use status::ServerStatus;
