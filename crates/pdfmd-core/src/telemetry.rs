//! Host memory telemetry: process RSS and system-wide utilization.
//!
//! Samples come from `/proc` on Linux; both reads are plain file reads
//! that complete without blocking on anything external. When the host
//! query fails (or on platforms without a probe) the sampler returns a
//! sentinel reading that classifies as Medium, so telemetry loss neither
//! opens the floodgates nor serializes the batch.

use std::time::Instant;

/// Sentinel system utilization, mid-Medium under the default thresholds.
pub const SENTINEL_SYSTEM_PCT: f64 = 60.0;

/// Point-in-time memory reading. Produced on demand, never stored beyond
/// the budget decision it feeds.
#[derive(Debug, Clone, Copy)]
pub struct MemorySample {
    /// When the sample was taken.
    pub sampled_at: Instant,
    /// Resident set size of this process in bytes.
    pub process_rss_bytes: u64,
    /// System-wide memory utilization in percent, [0, 100].
    pub system_used_pct: f64,
}

impl MemorySample {
    /// Fail-safe sample used when the host query fails.
    pub fn sentinel() -> Self {
        Self {
            sampled_at: Instant::now(),
            process_rss_bytes: 0,
            system_used_pct: SENTINEL_SYSTEM_PCT,
        }
    }
}

/// Source of memory samples. The scheduler holds one per batch run;
/// tests substitute scripted sources.
pub trait TelemetrySource: Send {
    fn sample(&mut self) -> MemorySample;
}

/// Live telemetry from the host OS.
#[derive(Debug, Default)]
pub struct HostTelemetry;

impl TelemetrySource for HostTelemetry {
    fn sample(&mut self) -> MemorySample {
        match read_host_sample() {
            Some(sample) => sample,
            None => {
                tracing::debug!("host memory query failed, using sentinel sample");
                MemorySample::sentinel()
            }
        }
    }
}

/// Total physical memory reported by the host, if known.
#[cfg(target_os = "linux")]
pub fn total_memory_bytes() -> Option<u64> {
    let meminfo = std::fs::read_to_string("/proc/meminfo").ok()?;
    parse_meminfo_kib(&meminfo, "MemTotal:").map(|kib| kib.saturating_mul(1024))
}

#[cfg(not(target_os = "linux"))]
pub fn total_memory_bytes() -> Option<u64> {
    None
}

#[cfg(target_os = "linux")]
fn read_host_sample() -> Option<MemorySample> {
    let meminfo = std::fs::read_to_string("/proc/meminfo").ok()?;
    let total = parse_meminfo_kib(&meminfo, "MemTotal:")?;
    let available = parse_meminfo_kib(&meminfo, "MemAvailable:")?;
    if total == 0 {
        return None;
    }
    let used = total.saturating_sub(available);
    Some(MemorySample {
        sampled_at: Instant::now(),
        process_rss_bytes: process_rss_bytes()?,
        system_used_pct: used as f64 / total as f64 * 100.0,
    })
}

#[cfg(not(target_os = "linux"))]
fn read_host_sample() -> Option<MemorySample> {
    None
}

/// Parse one `Key:  12345 kB` line out of `/proc/meminfo`.
fn parse_meminfo_kib(meminfo: &str, key: &str) -> Option<u64> {
    meminfo
        .lines()
        .find(|line| line.starts_with(key))?
        .split_whitespace()
        .nth(1)?
        .parse()
        .ok()
}

#[cfg(target_os = "linux")]
fn process_rss_bytes() -> Option<u64> {
    let statm = std::fs::read_to_string("/proc/self/statm").ok()?;
    let rss_pages: u64 = statm.split_whitespace().nth(1)?.parse().ok()?;
    let page_size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if page_size <= 0 {
        return None;
    }
    Some(rss_pages.saturating_mul(page_size as u64))
}
