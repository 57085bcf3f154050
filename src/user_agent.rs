//! User-Agent string sent with every replication request.

/// Default User-Agent (identifies the tool and its version to the server).
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("solr-fetch/{version} (index-replication-client)")
}
