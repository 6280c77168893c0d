//! Per-job outcomes and batch aggregates.

use std::time::Duration;

use crate::engine::Conversion;
use crate::queue::{JobStatus, TaskQueue};

/// Final record for one job.
#[derive(Debug, Clone)]
pub struct JobRecord {
    pub id: String,
    pub status: JobStatus,
    pub attempts: u32,
    pub error: Option<String>,
    pub outcome: Option<Conversion>,
}

/// Result of a whole batch run. A run with partial failures still
/// produces a normal report; the breakdown tells the story.
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// Per-job records in enqueue order.
    pub jobs: Vec<JobRecord>,
    pub submitted: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Pages across all successful conversions.
    pub pages_processed: u64,
    /// Wall time of the batch.
    pub elapsed: Duration,
}

impl BatchReport {
    pub(crate) fn from_queue(queue: &TaskQueue, elapsed: Duration) -> Self {
        let jobs: Vec<JobRecord> = queue
            .jobs()
            .map(|job| JobRecord {
                id: job.id().to_owned(),
                status: job.status(),
                attempts: job.attempts(),
                error: job.error().map(str::to_owned),
                outcome: job.outcome().cloned(),
            })
            .collect();
        let succeeded = jobs
            .iter()
            .filter(|j| j.status == JobStatus::Succeeded)
            .count();
        let failed = jobs.iter().filter(|j| j.status == JobStatus::Failed).count();
        let pages_processed = jobs
            .iter()
            .filter_map(|j| j.outcome.as_ref())
            .map(|c| u64::from(c.pages_processed))
            .sum();
        Self {
            submitted: jobs.len(),
            succeeded,
            failed,
            pages_processed,
            elapsed,
            jobs,
        }
    }

    /// True when every submitted job reached Succeeded.
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0 && self.succeeded == self.submitted
    }

    /// Jobs never admitted (a stopped batch leaves these Pending).
    pub fn not_run(&self) -> usize {
        self.submitted - self.succeeded - self.failed
    }
}
