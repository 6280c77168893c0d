//! `pdfmd batch` – convert every PDF under the given inputs.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use pdfmd_core::config::{self, PdfmdConfig};
use pdfmd_core::detect;
use pdfmd_core::engine::ConvertOptions;
use pdfmd_core::queue::{Job, JobStatus, TaskQueue};
use pdfmd_core::retry::RetryPolicy;
use pdfmd_core::scheduler::{BatchOptions, BatchReport, BatchRunner, ProgressUpdate};
use tokio::sync::mpsc;

use crate::engine::CommandEngine;

pub async fn run_batch(
    inputs: Vec<PathBuf>,
    output: Option<PathBuf>,
    workers: Option<usize>,
    recursive: bool,
    verbose: bool,
) -> Result<()> {
    let sources = collect_sources(&inputs, recursive)?;
    anyhow::ensure!(!sources.is_empty(), "no PDF files found in the given inputs");
    let report = run_conversion_batch(sources, output, workers, verbose).await?;
    print_summary(&report);
    Ok(())
}

/// Shared batch driver used by `convert` and `batch`: load config, build
/// the queue, run the scheduler with a progress printer attached.
pub(super) async fn run_conversion_batch(
    sources: Vec<PathBuf>,
    output: Option<PathBuf>,
    workers: Option<usize>,
    verbose: bool,
) -> Result<BatchReport> {
    let cfg = config::load_or_init()?;
    let max_workers = resolve_max_workers(workers, &cfg);
    let output_root = output.or_else(|| cfg.output_root.clone());

    let mut queue = TaskQueue::new();
    for source in &sources {
        let out_dir = resolve_output_dir(source, output_root.as_deref());
        queue.enqueue(Job::new(source.clone(), out_dir))?;
    }
    tracing::info!(
        jobs = queue.len(),
        workers = max_workers,
        "submitting batch"
    );

    let engine = Arc::new(CommandEngine::new(cfg.converter_command.clone()));
    let options = BatchOptions {
        max_workers,
        output_root,
        convert: convert_options(&cfg),
        thresholds: cfg.pressure.unwrap_or_default(),
        retry: RetryPolicy {
            max_attempts: cfg.retry.map(|r| r.max_attempts).unwrap_or(2),
        },
        verbose,
    };

    let (progress_tx, progress_rx) = mpsc::channel::<ProgressUpdate>(16);
    let printer = tokio::spawn(print_progress(progress_rx));

    let report = BatchRunner::new(engine, options)
        .with_progress(progress_tx)
        .run(queue)
        .await
        .context("batch run failed")?;
    let _ = printer.await;
    Ok(report)
}

/// CLI flag wins, then a non-zero config value, then host detection.
fn resolve_max_workers(flag: Option<usize>, cfg: &PdfmdConfig) -> usize {
    flag.unwrap_or(if cfg.max_workers > 0 {
        cfg.max_workers
    } else {
        detect::default_max_workers()
    })
}

fn convert_options(cfg: &PdfmdConfig) -> ConvertOptions {
    match &cfg.convert {
        Some(c) => ConvertOptions {
            extract_images: c.extract_images,
            ocr: c.ocr,
        },
        None => ConvertOptions::default(),
    }
}

/// Expand files and directories into a sorted, deduplicated PDF list.
fn collect_sources(inputs: &[PathBuf], recursive: bool) -> Result<Vec<PathBuf>> {
    let mut sources = Vec::new();
    for input in inputs {
        if input.is_dir() {
            scan_dir(input, recursive, &mut sources)
                .with_context(|| format!("scanning {}", input.display()))?;
        } else if is_pdf(input) {
            anyhow::ensure!(input.is_file(), "no such file: {}", input.display());
            sources.push(input.clone());
        } else {
            anyhow::bail!("not a PDF file or directory: {}", input.display());
        }
    }
    sources.sort();
    sources.dedup();
    Ok(sources)
}

fn scan_dir(dir: &Path, recursive: bool, sources: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            if recursive {
                scan_dir(&path, recursive, sources)?;
            }
        } else if is_pdf(&path) {
            sources.push(path);
        }
    }
    Ok(())
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Output lands in `<root>/<stem>_md/`, or next to the source when no
/// root is configured.
fn resolve_output_dir(source: &Path, output_root: Option<&Path>) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    let dir_name = format!("{stem}_md");
    match output_root {
        Some(root) => root.join(dir_name),
        None => source
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(dir_name),
    }
}

async fn print_progress(mut rx: mpsc::Receiver<ProgressUpdate>) {
    while let Some(update) = rx.recv().await {
        println!("[{}/{}] {}", update.completed, update.total, update.description);
    }
}

pub(super) fn print_summary(report: &BatchReport) {
    println!();
    println!(
        "Batch finished in {:.1}s: {} succeeded, {} failed of {} submitted",
        report.elapsed.as_secs_f64(),
        report.succeeded,
        report.failed,
        report.submitted
    );
    if report.pages_processed > 0 {
        println!("Pages processed: {}", report.pages_processed);
    }
    if report.not_run() > 0 {
        println!("Not run (batch stopped early): {}", report.not_run());
    }
    for job in report.jobs.iter().filter(|j| j.status == JobStatus::Failed) {
        println!(
            "  FAILED {} (attempt {}): {}",
            job.id,
            job.attempts,
            job.error.as_deref().unwrap_or("unknown error")
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn collects_pdfs_from_files_and_directories() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.pdf"), b"").unwrap();
        fs::write(dir.path().join("b.PDF"), b"").unwrap();
        fs::write(dir.path().join("notes.txt"), b"").unwrap();
        let nested = dir.path().join("nested");
        fs::create_dir(&nested).unwrap();
        fs::write(nested.join("c.pdf"), b"").unwrap();

        let flat = collect_sources(&[dir.path().to_path_buf()], false).unwrap();
        assert_eq!(flat.len(), 2);

        let deep = collect_sources(&[dir.path().to_path_buf()], true).unwrap();
        assert_eq!(deep.len(), 3);

        // Passing the same file twice dedups.
        let a = dir.path().join("a.pdf");
        let twice = collect_sources(&[a.clone(), a], false).unwrap();
        assert_eq!(twice.len(), 1);

        // Non-PDF files are rejected outright.
        assert!(collect_sources(&[dir.path().join("notes.txt")], false).is_err());
    }

    #[test]
    fn output_dir_follows_source_or_root() {
        let source = Path::new("/data/in/report.pdf");
        assert_eq!(
            resolve_output_dir(source, None),
            PathBuf::from("/data/in/report_md")
        );
        assert_eq!(
            resolve_output_dir(source, Some(Path::new("/data/out"))),
            PathBuf::from("/data/out/report_md")
        );
    }

    #[test]
    fn worker_resolution_order() {
        let mut cfg = PdfmdConfig::default();
        assert_eq!(resolve_max_workers(Some(3), &cfg), 3);
        cfg.max_workers = 5;
        assert_eq!(resolve_max_workers(None, &cfg), 5);
        cfg.max_workers = 0;
        assert!(resolve_max_workers(None, &cfg) >= 1);
        // An explicit zero is passed through for the scheduler to reject.
        assert_eq!(resolve_max_workers(Some(0), &cfg), 0);
    }
}
