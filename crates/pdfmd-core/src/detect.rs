//! Host resource detection for the default worker count.

use crate::telemetry;

/// Assumed peak memory per concurrent conversion. Layout analysis on a
/// large scanned document spikes well past a gigabyte; four leaves
/// headroom for the rest of the process.
const WORKER_HEADROOM_BYTES: u64 = 4 << 30;

/// Default `max_workers` for this host: one per core, capped so the whole
/// pool fits in physical memory at the assumed per-worker peak.
pub fn default_max_workers() -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    let memory_cap = telemetry::total_memory_bytes()
        .map(|total| (total / WORKER_HEADROOM_BYTES) as usize)
        .unwrap_or(cores);
    cores.min(memory_cap).max(1)
}
