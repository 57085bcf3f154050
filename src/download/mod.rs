//! Concurrent transfer of index files to local storage.
//!
//! # Features
//!
//! - Fixed-size worker pool fed by a bounded job channel
//! - Streaming copies through a fixed-capacity buffer (memory does not grow
//!   with file size)
//! - One [`DownloadOutcome`] per transferred file, collected into a
//!   [`FetchReport`]
//! - Fail-fast: the first failed transfer aborts the run
//!
//! # Example
//!
//! ```no_run
//! use solr_fetch::download::{DownloadJob, HttpClient, TransferScheduler};
//! use url::Url;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let scheduler = TransferScheduler::new(HttpClient::new(), "./index", 2, 64 * 1024)?;
//! let job = DownloadJob::new(
//!     "segments_d",
//!     Url::parse("http://localhost:8983/solr/replication?command=filecontent&wt=filestream&indexversion=1&generation=2&file=segments_d")?,
//! );
//! let report = scheduler.run(vec![job]).await?;
//! println!("transferred {} files", report.len());
//! # Ok(())
//! # }
//! ```

mod client;
mod collector;
pub mod constants;
mod engine;
mod error;
mod job;

pub use client::{HttpClient, TransferStats, stream_to_file};
pub use collector::{FetchReport, collect_outcomes};
pub use engine::{EngineError, TransferRun, TransferScheduler, default_worker_count};
pub use error::DownloadError;
pub use job::{DownloadJob, DownloadOutcome};
