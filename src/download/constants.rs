//! Constants for the download module (timeouts, buffering).

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default per-worker transfer buffer (64 KiB).
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Smallest accepted transfer buffer (1 KiB).
pub const MIN_BUFFER_SIZE: usize = 1024;

/// Largest accepted transfer buffer (16 MiB).
pub const MAX_BUFFER_SIZE: usize = 16 * 1024 * 1024;

/// Capacity of the outcome channel between workers and the collector.
pub const OUTCOME_CHANNEL_CAPACITY: usize = 1000;

/// Upper bound on the worker pool.
pub const MAX_WORKERS: usize = 256;
