//! Stop-admitting batch cancellation.

use std::sync::atomic::{AtomicBool, Ordering};

/// Cooperative cancellation for a batch run. Requesting a stop prevents
/// new admissions; jobs already in flight run to completion. There is no
/// hard kill of an in-flight conversion.
#[derive(Debug, Default)]
pub struct BatchControl {
    stop: AtomicBool,
}

impl BatchControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that no further jobs be admitted.
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }
}
