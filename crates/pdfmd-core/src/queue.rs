//! Batch task queue: job state machine and FIFO admission order.
//!
//! One queue exists per batch run and is owned by the scheduler control
//! loop for its whole lifetime; workers never touch it. Status moves
//! monotonically Pending → Running → {Succeeded, Failed}, with the single
//! exception of the bounded Failed → Pending retry re-enqueue.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::engine::Conversion;

/// Status of one conversion job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
}

/// Violation of the queue's transition contract. Only ever caused by a
/// bug in the scheduler, never by job input; callers treat it as fatal.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("job {id} already enqueued")]
    DuplicateJob { id: String },
    #[error("unknown job id {id}")]
    UnknownJob { id: String },
    #[error("job {id}: cannot {action} while {status:?}")]
    InvalidTransition {
        id: String,
        action: &'static str,
        status: JobStatus,
    },
    #[error("worker finished without reporting its job: {detail}")]
    WorkerLost { detail: String },
}

/// One unit of work: a single source document conversion.
#[derive(Debug, Clone)]
pub struct Job {
    id: String,
    source_path: PathBuf,
    output_dir: PathBuf,
    status: JobStatus,
    attempts: u32,
    error: Option<String>,
    outcome: Option<Conversion>,
}

impl Job {
    /// The job id is the source path; ids must be unique within a batch.
    pub fn new(source_path: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        let source_path = source_path.into();
        Self {
            id: source_path.to_string_lossy().into_owned(),
            source_path,
            output_dir: output_dir.into(),
            status: JobStatus::Pending,
            attempts: 0,
            error: None,
            outcome: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    /// Times the job has been dispatched (1 after the first admission).
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn outcome(&self) -> Option<&Conversion> {
        self.outcome.as_ref()
    }

    /// Short display name for progress messages.
    pub fn file_name(&self) -> String {
        self.source_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.id.clone())
    }
}

/// Insertion-ordered job collection with FIFO admission.
#[derive(Debug, Default)]
pub struct TaskQueue {
    jobs: Vec<Job>,
    by_id: HashMap<String, usize>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a job; ids must be unique.
    pub fn enqueue(&mut self, job: Job) -> Result<(), ProtocolError> {
        if self.by_id.contains_key(job.id()) {
            return Err(ProtocolError::DuplicateJob {
                id: job.id().to_owned(),
            });
        }
        self.by_id.insert(job.id().to_owned(), self.jobs.len());
        self.jobs.push(job);
        Ok(())
    }

    /// Oldest Pending job, atomically marked Running with its attempt
    /// counter incremented. Strict FIFO by enqueue order.
    pub fn next_pending(&mut self) -> Option<&Job> {
        let job = self
            .jobs
            .iter_mut()
            .find(|j| j.status == JobStatus::Pending)?;
        job.status = JobStatus::Running;
        job.attempts += 1;
        Some(job)
    }

    /// Transition a Running job to Succeeded.
    pub fn complete(&mut self, id: &str, outcome: Conversion) -> Result<(), ProtocolError> {
        let job = self.get_mut(id)?;
        if job.status != JobStatus::Running {
            return Err(ProtocolError::InvalidTransition {
                id: id.to_owned(),
                action: "complete",
                status: job.status,
            });
        }
        job.status = JobStatus::Succeeded;
        job.outcome = Some(outcome);
        Ok(())
    }

    /// Transition a Running job to Failed, recording its error.
    pub fn fail(&mut self, id: &str, error: String) -> Result<(), ProtocolError> {
        let job = self.get_mut(id)?;
        if job.status != JobStatus::Running {
            return Err(ProtocolError::InvalidTransition {
                id: id.to_owned(),
                action: "fail",
                status: job.status,
            });
        }
        job.status = JobStatus::Failed;
        job.error = Some(error);
        Ok(())
    }

    /// Failed → Pending for the single permitted retry. The recorded error
    /// is cleared; the attempt counter keeps counting across dispatches.
    pub fn requeue_for_retry(&mut self, id: &str) -> Result<(), ProtocolError> {
        let job = self.get_mut(id)?;
        if job.status != JobStatus::Failed {
            return Err(ProtocolError::InvalidTransition {
                id: id.to_owned(),
                action: "requeue",
                status: job.status,
            });
        }
        job.status = JobStatus::Pending;
        job.error = None;
        Ok(())
    }

    pub fn pending_count(&self) -> usize {
        self.count(JobStatus::Pending)
    }

    pub fn running_count(&self) -> usize {
        self.count(JobStatus::Running)
    }

    /// Jobs not yet terminal (Pending + Running).
    pub fn remaining_count(&self) -> usize {
        self.pending_count() + self.running_count()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// All jobs in enqueue order.
    pub fn jobs(&self) -> impl Iterator<Item = &Job> {
        self.jobs.iter()
    }

    fn count(&self, status: JobStatus) -> usize {
        self.jobs.iter().filter(|j| j.status == status).count()
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut Job, ProtocolError> {
        let index = *self
            .by_id
            .get(id)
            .ok_or_else(|| ProtocolError::UnknownJob { id: id.to_owned() })?;
        Ok(&mut self.jobs[index])
    }
}
