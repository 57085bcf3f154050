//! Error types for index discovery against the replication endpoint.

use thiserror::Error;

/// Errors that can occur while discovering the current index generation.
#[derive(Debug, Error)]
pub enum ReplicationError {
    /// The server root URL is malformed; raised before any request is sent.
    #[error("invalid server URL '{url}': {reason}")]
    InvalidUrl {
        /// The URL as supplied.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Network-level failure (DNS, connection refused, body read, timeout).
    #[error("transport error requesting {url}: {source}")]
    Transport {
        /// The request URL.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The response header carried a non-zero status.
    #[error("server reported status '{code}' for command '{command}'")]
    ProtocolStatus {
        /// The replication command that was rejected.
        command: &'static str,
        /// The raw status value from the response header.
        code: String,
    },

    /// The body is not well-formed XML.
    #[error("failed to decode {command} response: {reason}")]
    Decode {
        /// The replication command whose response failed to decode.
        command: &'static str,
        /// Parser detail.
        reason: String,
    },

    /// Well-formed XML that lacks a field the protocol requires.
    #[error("malformed {command} response: {reason}")]
    MalformedResponse {
        /// The replication command whose response was incomplete.
        command: &'static str,
        /// What was missing.
        reason: String,
    },
}

impl ReplicationError {
    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Creates a transport error from a reqwest error.
    pub fn transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Transport {
            url: url.into(),
            source,
        }
    }

    /// Creates a protocol status error.
    pub fn protocol_status(command: &'static str, code: impl Into<String>) -> Self {
        Self::ProtocolStatus {
            command,
            code: code.into(),
        }
    }

    /// Creates a decode error.
    pub fn decode(command: &'static str, reason: impl Into<String>) -> Self {
        Self::Decode {
            command,
            reason: reason.into(),
        }
    }

    /// Creates a malformed response error.
    pub fn malformed(command: &'static str, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            command,
            reason: reason.into(),
        }
    }
}
