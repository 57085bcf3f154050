//! Transfer scheduler: a fixed pool of workers draining a bounded job queue.
//!
//! # Concurrency Model
//!
//! - One producer task pushes [`DownloadJob`]s into a job channel whose
//!   capacity equals the worker count
//! - `worker_count` persistent workers share the receiving end and process
//!   one job at a time each
//! - Workers send a [`DownloadOutcome`] per finished job on the outcome
//!   channel
//! - A completion tracker joins every worker; once all have exited, the
//!   last outcome sender is gone and the outcome channel closes
//!
//! Each worker writes a distinct file name, so the output directory needs
//! no locking.
//!
//! # Failure Policy
//!
//! The completion tracker is the only place that decides what a failed
//! transfer means for the run. It aborts every remaining worker and the
//! producer on the first failure, so no further queued job is started, and
//! waits for the aborted workers to unwind so their partial files are gone
//! before the failure is returned.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, instrument, warn};

use super::collector::{FetchReport, collect_outcomes};
use super::constants::{MAX_BUFFER_SIZE, MAX_WORKERS, MIN_BUFFER_SIZE, OUTCOME_CHANNEL_CAPACITY};
use super::{DownloadError, DownloadJob, DownloadOutcome, HttpClient};

/// Minimum allowed worker count.
const MIN_WORKERS: usize = 1;

/// Error type for scheduler construction.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Invalid worker count provided.
    #[error("invalid worker count {value}: must be between {MIN_WORKERS} and {MAX_WORKERS}")]
    InvalidWorkerCount {
        /// The invalid value that was provided.
        value: usize,
    },

    /// Invalid transfer buffer size provided.
    #[error(
        "invalid buffer size {value}: must be between {MIN_BUFFER_SIZE} and {MAX_BUFFER_SIZE} bytes"
    )]
    InvalidBufferSize {
        /// The invalid value that was provided.
        value: usize,
    },
}

/// Half the host's parallelism, never less than one.
#[must_use]
pub fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get() / 2)
        .unwrap_or(MIN_WORKERS)
        .clamp(MIN_WORKERS, MAX_WORKERS)
}

/// Bounded worker pool for index file transfers.
#[derive(Debug, Clone)]
pub struct TransferScheduler {
    client: HttpClient,
    output_dir: PathBuf,
    worker_count: usize,
    buffer_size: usize,
}

/// Handles to a running transfer.
#[derive(Debug)]
pub struct TransferRun {
    /// Closes once every worker has exited.
    pub outcomes: mpsc::Receiver<DownloadOutcome>,
    /// Resolves to the number of completed jobs, or the first failure.
    pub completion: JoinHandle<Result<usize, DownloadError>>,
    /// Resolves to the number of jobs enqueued.
    pub enqueued: JoinHandle<usize>,
}

impl TransferRun {
    /// Drains the outcome channel, then waits for the completion tracker.
    ///
    /// # Errors
    ///
    /// Returns the first transfer failure reported by any worker.
    pub async fn finish(self) -> Result<FetchReport, DownloadError> {
        let report = collect_outcomes(self.outcomes).await;
        let completed = self
            .completion
            .await
            .map_err(|e| DownloadError::worker(&e))??;
        let enqueued = self.enqueued.await.map_err(|e| DownloadError::worker(&e))?;

        debug!(enqueued, completed, collected = report.len(), "transfer run finished");
        Ok(report)
    }
}

impl TransferScheduler {
    /// Creates a scheduler writing into `output_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] if `worker_count` or `buffer_size` is out of
    /// range.
    #[instrument(level = "debug", skip(client, output_dir))]
    pub fn new(
        client: HttpClient,
        output_dir: impl Into<PathBuf>,
        worker_count: usize,
        buffer_size: usize,
    ) -> Result<Self, EngineError> {
        if !(MIN_WORKERS..=MAX_WORKERS).contains(&worker_count) {
            return Err(EngineError::InvalidWorkerCount {
                value: worker_count,
            });
        }
        if !(MIN_BUFFER_SIZE..=MAX_BUFFER_SIZE).contains(&buffer_size) {
            return Err(EngineError::InvalidBufferSize { value: buffer_size });
        }

        Ok(Self {
            client,
            output_dir: output_dir.into(),
            worker_count,
            buffer_size,
        })
    }

    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    #[must_use]
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Spawns the producer, the workers, and the completion tracker.
    ///
    /// Must be called inside a Tokio runtime.
    #[must_use]
    pub fn start(&self, jobs: Vec<DownloadJob>) -> TransferRun {
        let (job_tx, job_rx) = mpsc::channel::<DownloadJob>(self.worker_count);
        let (outcome_tx, outcome_rx) = mpsc::channel(OUTCOME_CHANNEL_CAPACITY);
        let job_rx = Arc::new(Mutex::new(job_rx));

        info!(
            jobs = jobs.len(),
            workers = self.worker_count,
            buffer_size = self.buffer_size,
            "starting transfers"
        );

        let mut workers = JoinSet::new();
        for worker_id in 0..self.worker_count {
            workers.spawn(run_worker(
                worker_id,
                Arc::clone(&job_rx),
                outcome_tx.clone(),
                self.client.clone(),
                self.output_dir.clone(),
                self.buffer_size,
            ));
        }
        // Workers hold the only senders; the channel closes when they exit.
        drop(outcome_tx);

        let producer = tokio::spawn(enqueue_jobs(job_tx, jobs));
        let producer_abort = producer.abort_handle();
        let completion = tokio::spawn(await_completion(workers, producer_abort));

        TransferRun {
            outcomes: outcome_rx,
            completion,
            enqueued: producer,
        }
    }

    /// Transfers every job and collects one outcome per job.
    ///
    /// # Errors
    ///
    /// Returns the first [`DownloadError`] from any worker; remaining jobs
    /// are not started.
    #[instrument(skip(self, jobs), fields(output_dir = %self.output_dir.display()))]
    pub async fn run(&self, jobs: Vec<DownloadJob>) -> Result<FetchReport, DownloadError> {
        self.start(jobs).finish().await
    }
}

async fn enqueue_jobs(jobs_tx: mpsc::Sender<DownloadJob>, jobs: Vec<DownloadJob>) -> usize {
    let mut enqueued = 0;
    for job in jobs {
        debug!(file = job.file_name(), "queueing transfer");
        if jobs_tx.send(job).await.is_err() {
            // Every worker is gone; the tracker already has the reason.
            break;
        }
        enqueued += 1;
    }
    enqueued
}

async fn run_worker(
    worker_id: usize,
    jobs: Arc<Mutex<mpsc::Receiver<DownloadJob>>>,
    outcomes: mpsc::Sender<DownloadOutcome>,
    client: HttpClient,
    output_dir: PathBuf,
    buffer_size: usize,
) -> Result<usize, DownloadError> {
    let mut completed = 0;
    loop {
        let next = jobs.lock().await.recv().await;
        let Some(job) = next else {
            break;
        };

        let outcome = client
            .download_to_file(&job, &output_dir, buffer_size)
            .await?;
        completed += 1;

        if outcomes.send(outcome).await.is_err() {
            warn!(worker_id, "outcome channel closed; stopping worker");
            break;
        }
    }
    debug!(worker_id, completed, "worker finished");
    Ok(completed)
}

async fn await_completion(
    mut workers: JoinSet<Result<usize, DownloadError>>,
    producer: tokio::task::AbortHandle,
) -> Result<usize, DownloadError> {
    let mut completed = 0;
    while let Some(joined) = workers.join_next().await {
        let result = joined
            .map_err(|e| DownloadError::worker(&e))
            .and_then(|worker| worker);
        match result {
            Ok(count) => completed += count,
            Err(e) => {
                warn!(error = %e, "transfer failed; aborting remaining workers");
                producer.abort();
                workers.shutdown().await;
                return Err(e);
            }
        }
    }
    Ok(completed)
}
