//! Batch-level fatal errors.

use thiserror::Error;

use crate::queue::ProtocolError;

/// Errors that abort a whole batch. Per-job failures never surface here;
/// they are recorded in the batch report instead.
#[derive(Debug, Error)]
pub enum BatchError {
    /// Invalid configuration detected before any job is dispatched.
    #[error("configuration: {0}")]
    Config(String),
    /// Internal queue-contract violation; a bug, not a user error.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
