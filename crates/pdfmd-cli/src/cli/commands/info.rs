//! `pdfmd info` – detected host resources and the worker budget table.

use anyhow::Result;

use pdfmd_core::detect;
use pdfmd_core::pressure::{PressureLevel, PressureThresholds};
use pdfmd_core::scheduler::recommend_workers;
use pdfmd_core::telemetry::{self, HostTelemetry, TelemetrySource};

pub fn run_info() -> Result<()> {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    println!("CPU cores:        {cores}");

    match telemetry::total_memory_bytes() {
        Some(total) => println!("Total memory:     {:.1} GiB", total as f64 / (1u64 << 30) as f64),
        None => println!("Total memory:     unknown"),
    }

    let sample = HostTelemetry.sample();
    let thresholds = PressureThresholds::default();
    let level = thresholds.classify(sample.system_used_pct);
    println!(
        "System memory:    {:.1}% used ({:?} pressure)",
        sample.system_used_pct, level
    );
    println!(
        "Process RSS:      {:.1} MiB",
        sample.process_rss_bytes as f64 / (1u64 << 20) as f64
    );

    let max_workers = detect::default_max_workers();
    println!("Default workers:  {max_workers}");
    println!();
    println!("Worker budget at each pressure level:");
    for level in [
        PressureLevel::Low,
        PressureLevel::Medium,
        PressureLevel::High,
        PressureLevel::Critical,
    ] {
        println!(
            "  {:<9} {}",
            format!("{level:?}"),
            recommend_workers(level, max_workers)
        );
    }
    Ok(())
}
