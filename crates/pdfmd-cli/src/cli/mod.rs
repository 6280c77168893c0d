//! CLI for the pdfmd batch converter.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::{run_batch, run_convert, run_info, run_show_config};

/// Top-level CLI for the pdfmd batch converter.
#[derive(Debug, Parser)]
#[command(name = "pdfmd")]
#[command(about = "pdfmd: memory-adaptive batch PDF to Markdown conversion", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,

    /// Log per-job detail at info level.
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Convert a single PDF.
    Convert {
        /// Source PDF path.
        source: PathBuf,

        /// Output directory root (default: alongside the source).
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Convert every PDF found in the given files and directories.
    Batch {
        /// PDF files and/or directories to scan.
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory root (default: alongside each source).
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Maximum concurrent conversions (default: config, else auto-detect).
        #[arg(long, value_name = "N")]
        workers: Option<usize>,

        /// Recurse into subdirectories.
        #[arg(long, short = 'r')]
        recursive: bool,
    },

    /// Show detected host resources and the worker budget table.
    Info,

    /// Print the effective configuration and its path.
    Config,
}

pub async fn run_from_args() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        CliCommand::Convert { source, output } => run_convert(source, output, cli.verbose).await,
        CliCommand::Batch {
            inputs,
            output,
            workers,
            recursive,
        } => run_batch(inputs, output, workers, recursive, cli.verbose).await,
        CliCommand::Info => run_info(),
        CliCommand::Config => run_show_config(),
    }
}
