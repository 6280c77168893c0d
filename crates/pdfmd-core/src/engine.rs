//! Conversion engine contract.
//!
//! The engine is an external collaborator: the scheduler creates its
//! output directories, invokes it on a blocking thread, and contains its
//! failures at the job boundary, but never looks inside the conversion.

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

/// Options passed through to the engine for one conversion.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Extract embedded images into the `images/` subdirectory.
    pub extract_images: bool,
    /// Run OCR over scanned pages.
    pub ocr: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            extract_images: true,
            ocr: true,
        }
    }
}

/// Outcome of one successful conversion.
#[derive(Debug, Clone)]
pub struct Conversion {
    /// The generated markdown file.
    pub output_path: PathBuf,
    /// Pages the engine processed (0 when the engine cannot report it).
    pub pages_processed: u32,
    /// Wall time of the conversion itself.
    pub duration: Duration,
}

/// Error raised by one conversion job. Every variant is contained at the
/// job boundary and recorded against that job; none aborts the batch.
#[derive(Debug, Error)]
pub enum JobError {
    /// Output-path I/O failure from scheduler-side file operations.
    #[error("i/o: {0}")]
    Io(#[from] std::io::Error),
    /// Allocation failure during conversion.
    #[error("resource exhaustion: {0}")]
    ResourceExhaustion(String),
    /// Engine-reported domain failure (unreadable input, parse error,
    /// converter panic).
    #[error("engine: {0}")]
    Engine(String),
}

/// A document conversion engine. Implementations are expected to block;
/// the scheduler always invokes them on a dedicated blocking thread.
pub trait ConversionEngine: Send + Sync {
    fn convert(
        &self,
        source: &Path,
        output_dir: &Path,
        options: &ConvertOptions,
    ) -> Result<Conversion, JobError>;
}
