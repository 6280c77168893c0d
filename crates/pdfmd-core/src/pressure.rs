//! Memory pressure classification.
//!
//! Maps a system memory utilization percentage to one of four ordinal
//! levels. The ranges are contiguous and non-overlapping, so every
//! percentage lands in exactly one level and the same reading always
//! classifies the same way.

use serde::{Deserialize, Serialize};

/// Ordinal pressure level derived from system memory utilization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PressureLevel {
    /// Plenty of headroom; full concurrency is safe.
    Low,
    /// Normal operating range.
    Medium,
    /// Constrained; new admissions should back off.
    High,
    /// Near exhaustion; serialize all new work.
    Critical,
}

/// Classification cut points in percent of system memory in use.
/// Loaded from the optional `[pressure]` config section; defaults:
/// Low below 50, Medium in [50, 75), High in [75, 90), Critical at 90
/// and above.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PressureThresholds {
    /// Readings below this classify as Low.
    pub medium_pct: f64,
    /// Readings below this (and at or above `medium_pct`) classify as Medium.
    pub high_pct: f64,
    /// Readings below this (and at or above `high_pct`) classify as High;
    /// anything at or above it is Critical.
    pub critical_pct: f64,
}

impl Default for PressureThresholds {
    fn default() -> Self {
        Self {
            medium_pct: 50.0,
            high_pct: 75.0,
            critical_pct: 90.0,
        }
    }
}

impl PressureThresholds {
    /// Classify a system memory utilization percentage.
    pub fn classify(&self, system_used_pct: f64) -> PressureLevel {
        if system_used_pct < self.medium_pct {
            PressureLevel::Low
        } else if system_used_pct < self.high_pct {
            PressureLevel::Medium
        } else if system_used_pct < self.critical_pct {
            PressureLevel::High
        } else {
            PressureLevel::Critical
        }
    }

    /// Thresholds must be strictly increasing and inside [0, 100].
    pub fn validate(&self) -> Result<(), String> {
        if !(self.medium_pct < self.high_pct && self.high_pct < self.critical_pct) {
            return Err(format!(
                "pressure thresholds must be strictly increasing: {} / {} / {}",
                self.medium_pct, self.high_pct, self.critical_pct
            ));
        }
        if self.medium_pct < 0.0 || self.critical_pct > 100.0 {
            return Err(format!(
                "pressure thresholds must lie in [0, 100]: {} / {} / {}",
                self.medium_pct, self.high_pct, self.critical_pct
            ));
        }
        Ok(())
    }
}
