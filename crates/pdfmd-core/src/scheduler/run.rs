//! Batch control loop: admission, completion handling, budget retuning.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::engine::{Conversion, ConversionEngine, ConvertOptions, JobError};
use crate::error::BatchError;
use crate::pressure::PressureThresholds;
use crate::queue::{ProtocolError, TaskQueue};
use crate::reclaim::ReclaimGuard;
use crate::retry::{classify, FailureKind, RetryDecision, RetryPolicy};
use crate::telemetry::{HostTelemetry, TelemetrySource};

use super::budget::WorkerBudget;
use super::control::BatchControl;
use super::progress::ProgressUpdate;
use super::report::BatchReport;

/// Scheduler configuration for one batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Upper bound on concurrent conversions. Zero is a configuration
    /// error; resolve auto-detection before constructing the runner.
    pub max_workers: usize,
    /// Base output directory, created (and thereby write-checked) before
    /// the first dispatch when set.
    pub output_root: Option<PathBuf>,
    pub convert: ConvertOptions,
    pub thresholds: PressureThresholds,
    pub retry: RetryPolicy,
    /// Per-job detail at info level when set, debug otherwise. Scoped to
    /// this runner, never a process-global level change.
    pub verbose: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            max_workers: 1,
            output_root: None,
            convert: ConvertOptions::default(),
            thresholds: PressureThresholds::default(),
            retry: RetryPolicy::default(),
            verbose: false,
        }
    }
}

/// What a worker reports back to the control loop.
struct JobCompletion {
    id: String,
    attempt: u32,
    result: Result<Conversion, JobError>,
}

/// Runs one batch of conversion jobs under a live worker budget.
pub struct BatchRunner {
    engine: Arc<dyn ConversionEngine>,
    telemetry: Box<dyn TelemetrySource>,
    options: BatchOptions,
    progress_tx: Option<mpsc::Sender<ProgressUpdate>>,
    control: Option<Arc<BatchControl>>,
}

impl BatchRunner {
    pub fn new(engine: Arc<dyn ConversionEngine>, options: BatchOptions) -> Self {
        Self {
            engine,
            telemetry: Box::new(HostTelemetry),
            options,
            progress_tx: None,
            control: None,
        }
    }

    /// Substitute the telemetry source (tests inject scripted pressure).
    pub fn with_telemetry(mut self, telemetry: Box<dyn TelemetrySource>) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Receive one `ProgressUpdate` per terminal job transition on a
    /// bounded channel. A dropped receiver never fails the batch.
    pub fn with_progress(mut self, tx: mpsc::Sender<ProgressUpdate>) -> Self {
        self.progress_tx = Some(tx);
        self
    }

    /// Attach a stop-admitting cancellation token.
    pub fn with_control(mut self, control: Arc<BatchControl>) -> Self {
        self.control = Some(control);
        self
    }

    /// Run the batch to completion. Per-job failures land in the report;
    /// only configuration and queue-contract errors abort the run.
    pub async fn run(mut self, mut queue: TaskQueue) -> Result<BatchReport, BatchError> {
        self.validate()?;
        let started = Instant::now();
        let total = queue.len();
        let mut completed = 0usize;

        let sample = self.telemetry.sample();
        let level = self.options.thresholds.classify(sample.system_used_pct);
        let mut budget = WorkerBudget::new(self.options.max_workers, level);
        tracing::info!(
            jobs = total,
            workers = budget.current(),
            ?level,
            system_pct = %format_args!("{:.1}", sample.system_used_pct),
            "starting batch"
        );

        let mut join_set: JoinSet<JobCompletion> = JoinSet::new();

        loop {
            self.admit_up_to_budget(&mut queue, &mut join_set, &budget);

            if join_set.is_empty() {
                break;
            }

            let Some(joined) = join_set.join_next().await else {
                break;
            };
            let completion = joined.map_err(|e| {
                // Worker wrappers contain panics at the job boundary, so a
                // lost worker means the scheduler itself is broken.
                ProtocolError::WorkerLost {
                    detail: e.to_string(),
                }
            })?;

            if let Some(description) = self.handle_completion(&mut queue, completion)? {
                completed += 1;
                self.notify_progress(completed, total, description).await;
            }

            let sample = self.telemetry.sample();
            let level = self.options.thresholds.classify(sample.system_used_pct);
            let workers = budget.retune(level);
            tracing::debug!(
                ?level,
                workers,
                in_flight = join_set.len(),
                system_pct = %format_args!("{:.1}", sample.system_used_pct),
                "budget retuned"
            );
        }

        let report = BatchReport::from_queue(&queue, started.elapsed());
        tracing::info!(
            succeeded = report.succeeded,
            failed = report.failed,
            not_run = report.not_run(),
            secs = %format_args!("{:.1}", report.elapsed.as_secs_f64()),
            "batch finished"
        );
        Ok(report)
    }

    fn validate(&self) -> Result<(), BatchError> {
        if self.options.max_workers == 0 {
            return Err(BatchError::Config("max_workers must be at least 1".into()));
        }
        self.options
            .thresholds
            .validate()
            .map_err(BatchError::Config)?;
        if let Some(root) = &self.options.output_root {
            std::fs::create_dir_all(root).map_err(|e| {
                BatchError::Config(format!("output root {} unusable: {}", root.display(), e))
            })?;
        }
        Ok(())
    }

    /// Admit pending jobs until the in-flight count reaches the current
    /// budget, the queue runs dry, or a stop was requested.
    fn admit_up_to_budget(
        &self,
        queue: &mut TaskQueue,
        join_set: &mut JoinSet<JobCompletion>,
        budget: &WorkerBudget,
    ) {
        while join_set.len() < budget.current() {
            if self
                .control
                .as_ref()
                .is_some_and(|c| c.stop_requested())
            {
                tracing::debug!(pending = queue.pending_count(), "stop requested, no new admissions");
                break;
            }
            let Some(job) = queue.next_pending() else {
                break;
            };
            let id = job.id().to_owned();
            let source = job.source_path().to_owned();
            let output_dir = job.output_dir().to_owned();
            let attempt = job.attempts();
            let engine = Arc::clone(&self.engine);
            let options = self.options.convert.clone();
            let verbose = self.options.verbose;
            join_set.spawn(run_one_job(
                engine, id, source, output_dir, attempt, options, verbose,
            ));
        }
    }

    /// Record a completion in the queue. Returns the progress description
    /// when the job reached a terminal state (a retry re-enqueue is not
    /// terminal and produces no notification).
    fn handle_completion(
        &self,
        queue: &mut TaskQueue,
        completion: JobCompletion,
    ) -> Result<Option<String>, ProtocolError> {
        let JobCompletion {
            id,
            attempt,
            result,
        } = completion;
        let name = display_name(&id);
        match result {
            Ok(conversion) => {
                if self.options.verbose {
                    tracing::info!(
                        job = %id,
                        pages = conversion.pages_processed,
                        secs = %format_args!("{:.1}", conversion.duration.as_secs_f64()),
                        "converted"
                    );
                } else {
                    tracing::debug!(job = %id, "converted");
                }
                let description =
                    format!("converted {} ({} pages)", name, conversion.pages_processed);
                queue.complete(&id, conversion)?;
                Ok(Some(description))
            }
            Err(err) => {
                let kind = classify(&err);
                if kind == FailureKind::ResourceExhaustion {
                    // The resample right after this completion tightens
                    // admissions; nothing to retry under the same pressure.
                    tracing::warn!(job = %id, "allocation failure during conversion");
                }
                queue.fail(&id, err.to_string())?;
                match self.options.retry.decide(attempt, kind) {
                    RetryDecision::Retry => {
                        tracing::info!(job = %id, attempt, "transient failure, re-enqueueing");
                        queue.requeue_for_retry(&id)?;
                        Ok(None)
                    }
                    RetryDecision::NoRetry => {
                        tracing::warn!(job = %id, attempt, error = %err, "job failed");
                        Ok(Some(format!("failed {}: {}", name, err)))
                    }
                }
            }
        }
    }

    async fn notify_progress(&self, completed: usize, total: usize, description: String) {
        let Some(tx) = &self.progress_tx else {
            return;
        };
        let update = ProgressUpdate {
            completed,
            total,
            description,
        };
        // Bounded send: waits for channel space, never for the consumer's
        // rendering. A dropped receiver is not an error.
        let _ = tx.send(update).await;
    }
}

/// Runs one conversion attempt on a blocking thread and reports back.
/// Failure containment happens here, at the job boundary: this future
/// never panics and always yields a completion.
async fn run_one_job(
    engine: Arc<dyn ConversionEngine>,
    id: String,
    source: PathBuf,
    output_dir: PathBuf,
    attempt: u32,
    options: ConvertOptions,
    verbose: bool,
) -> JobCompletion {
    if verbose {
        tracing::info!(job = %id, attempt, "converting");
    } else {
        tracing::debug!(job = %id, attempt, "converting");
    }

    let job_id = id.clone();
    let handle = tokio::task::spawn_blocking(move || {
        let _reclaim = ReclaimGuard::new(&job_id);
        prepare_output_dirs(&output_dir)?;
        engine.convert(&source, &output_dir, &options)
    });
    let result = match handle.await {
        Ok(result) => result,
        Err(join_err) => Err(JobError::Engine(format!(
            "conversion panicked: {join_err}"
        ))),
    };
    JobCompletion {
        id,
        attempt,
        result,
    }
}

/// Create the job's output directory and the `images/` subdirectory the
/// engine writes extracted figures into. Idempotent: sibling jobs may
/// share a parent directory.
fn prepare_output_dirs(output_dir: &Path) -> Result<(), JobError> {
    std::fs::create_dir_all(output_dir.join("images"))?;
    Ok(())
}

/// File name of the source for progress messages; the id is its path.
fn display_name(id: &str) -> String {
    Path::new(id)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| id.to_owned())
}
