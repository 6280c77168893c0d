//! Memory-adaptive batch scheduler.
//!
//! Owns the task queue and the worker budget, keeps up to `current`
//! conversions in flight, and re-tunes the budget from live memory
//! telemetry after every completion. Admission decisions are serialized
//! through the one control loop; workers only report results back.

mod budget;
mod control;
mod progress;
mod report;
mod run;

pub use budget::{recommend_workers, WorkerBudget};
pub use control::BatchControl;
pub use progress::ProgressUpdate;
pub use report::{BatchReport, JobRecord};
pub use run::{BatchOptions, BatchRunner};
