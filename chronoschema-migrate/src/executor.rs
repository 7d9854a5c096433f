//! Sequential batch execution with per-batch failure isolation.

use std::time::Instant;

use tracing::{debug, warn};

use crate::batch::Batch;
use crate::connection::SqlConnection;

/// Outcome of a single batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    /// 1-based position of the batch in its script.
    pub index: usize,
    /// Error reported by the server, if the batch failed.
    pub error: Option<String>,
}

impl BatchOutcome {
    /// Check if the batch succeeded.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Per-batch outcomes for one script.
#[derive(Debug, Clone, Default)]
pub struct ExecutionReport {
    /// Outcomes in execution order.
    pub outcomes: Vec<BatchOutcome>,
    /// Total duration in milliseconds.
    pub duration_ms: i64,
}

impl ExecutionReport {
    /// Number of batches that were submitted.
    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    /// The batches that failed.
    pub fn failures(&self) -> impl Iterator<Item = &BatchOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    /// Number of failed batches.
    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    /// Check if every batch succeeded.
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(BatchOutcome::is_success)
    }

    /// Get a summary of the report.
    pub fn summary(&self) -> String {
        let failed = self.failure_count();
        if failed == 0 {
            format!("{} batches OK in {}ms", self.attempted(), self.duration_ms)
        } else {
            format!(
                "{} of {} batches failed in {}ms",
                failed,
                self.attempted(),
                self.duration_ms
            )
        }
    }
}

/// Execute `batches` in order on `conn`.
///
/// Every batch is attempted. A failing batch is logged with its position and
/// recorded in the report, then execution moves on to the next one. Nothing
/// is rolled back.
pub async fn execute(conn: &mut dyn SqlConnection, batches: &[Batch]) -> ExecutionReport {
    let start = Instant::now();
    let total = batches.len();
    let mut outcomes = Vec::with_capacity(total);

    debug!(batches = total, "Executing batches");

    for (i, batch) in batches.iter().enumerate() {
        let index = i + 1;
        let error = match conn.execute(batch.sql()).await {
            Ok(()) => {
                debug!(batch = index, total, "Batch OK");
                None
            }
            Err(e) => {
                warn!(batch = index, total, error = %e, "Batch failed");
                Some(e.to_string())
            }
        };
        outcomes.push(BatchOutcome { index, error });
    }

    ExecutionReport {
        outcomes,
        duration_ms: start.elapsed().as_millis() as i64,
    }
}
