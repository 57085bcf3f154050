//! Result collection for a transfer run.

use std::path::Path;

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::DownloadOutcome;

/// Every outcome of one run, in completion order.
///
/// Completion order is nondeterministic; nothing is deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FetchReport {
    outcomes: Vec<DownloadOutcome>,
}

impl FetchReport {
    #[must_use]
    pub fn outcomes(&self) -> &[DownloadOutcome] {
        &self.outcomes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Outcomes whose content response was not 2xx.
    pub fn non_success(&self) -> impl Iterator<Item = &DownloadOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.is_success())
    }

    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.outcomes.iter().map(|outcome| outcome.bytes_written).sum()
    }

    /// Writes the report as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the file cannot be written.
    pub async fn write_json(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_vec_pretty(self).map_err(std::io::Error::other)?;
        tokio::fs::write(path, json).await
    }
}

impl FromIterator<DownloadOutcome> for FetchReport {
    fn from_iter<I: IntoIterator<Item = DownloadOutcome>>(iter: I) -> Self {
        Self {
            outcomes: iter.into_iter().collect(),
        }
    }
}

/// Drains `outcomes` until every sender is gone, logging each as it arrives.
pub async fn collect_outcomes(mut outcomes: mpsc::Receiver<DownloadOutcome>) -> FetchReport {
    let mut collected = Vec::new();
    while let Some(outcome) = outcomes.recv().await {
        if outcome.is_success() {
            info!(
                url = %outcome.source_url,
                status = outcome.status,
                bytes = outcome.bytes_written,
                "downloaded {}",
                outcome.file_name
            );
        } else {
            warn!(
                url = %outcome.source_url,
                status = outcome.status,
                bytes = outcome.bytes_written,
                "server returned non-success status for {}",
                outcome.file_name
            );
        }
        collected.push(outcome);
    }
    FetchReport {
        outcomes: collected,
    }
}
