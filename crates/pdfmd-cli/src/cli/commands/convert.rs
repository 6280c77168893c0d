//! `pdfmd convert` – convert a single PDF.

use anyhow::Result;
use std::path::PathBuf;

use super::batch::{print_summary, run_conversion_batch};

pub async fn run_convert(source: PathBuf, output: Option<PathBuf>, verbose: bool) -> Result<()> {
    anyhow::ensure!(source.is_file(), "no such file: {}", source.display());
    let report = run_conversion_batch(vec![source], output, Some(1), verbose).await?;
    print_summary(&report);
    anyhow::ensure!(report.all_succeeded(), "conversion failed");
    Ok(())
}
