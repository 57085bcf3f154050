//! Solr Fetch Library
//!
//! Retrieves the complete file set of the index generation currently live on
//! a Solr replication endpoint and writes it into a local directory.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`replication`] - Query URLs, response decoding, and index discovery
//! - [`download`] - HTTP transport, worker pool, and outcome collection
//! - [`config`] - Run configuration
//! - [`fetch`] - The discover-then-transfer pipeline

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod download;
pub mod fetch;
pub mod replication;
mod user_agent;

// Re-export commonly used types
pub use config::FetchConfig;
pub use download::{
    DownloadError, DownloadJob, DownloadOutcome, EngineError, FetchReport, HttpClient,
    TransferScheduler, default_worker_count,
};
pub use fetch::{FetchError, fetch_index};
pub use replication::{
    IndexFileDescriptor, IndexIdentity, IndexResolver, ReplicationError, ResolvedIndex,
    ServerStatus,
};
