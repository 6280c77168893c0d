//! Batch progress notifications.
//!
//! The control loop owns the `completed` accumulator and sends one update
//! per terminal job transition over a bounded channel; consumers (e.g.
//! the CLI printer task) drain it at their own pace.

/// One completion notification, success or failure alike.
#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    /// Jobs finished so far (terminal states only); non-decreasing across
    /// a batch.
    pub completed: usize,
    /// Jobs submitted for the batch; fixed for its lifetime.
    pub total: usize,
    /// Human-readable description of the job that just finished.
    pub description: String,
}

impl ProgressUpdate {
    /// Fraction complete in [0.0, 1.0].
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        (self.completed as f64 / self.total as f64).min(1.0)
    }

    /// True for the last notification of an uncancelled batch.
    pub fn is_final(&self) -> bool {
        self.completed == self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fraction_and_final_flag() {
        let update = ProgressUpdate {
            completed: 2,
            total: 5,
            description: "converted a.pdf".into(),
        };
        assert!((update.fraction() - 0.4).abs() < 1e-9);
        assert!(!update.is_final());

        let last = ProgressUpdate {
            completed: 5,
            total: 5,
            description: "converted e.pdf".into(),
        };
        assert!(last.is_final());
        assert!((last.fraction() - 1.0).abs() < 1e-9);
    }
}
