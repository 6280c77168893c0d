//! External converter invocation.
//!
//! The conversion itself is out of pdfmd's hands: this engine shells out
//! to a converter command and maps its exit status onto the engine
//! contract. The scheduler has already created the output directory (and
//! its `images/` subdirectory) before this runs.

use std::path::Path;
use std::process::Command;
use std::time::Instant;

use pdfmd_core::engine::{Conversion, ConversionEngine, ConvertOptions, JobError};

/// Converter used when `converter_command` is not configured.
const DEFAULT_CONVERTER: &str = "docling";

/// Engine that runs an external PDF→Markdown converter. The command
/// receives the source path and output directory as its final two
/// arguments and is expected to write `<stem>.md` into the directory.
pub struct CommandEngine {
    command: String,
}

impl CommandEngine {
    pub fn new(command: Option<String>) -> Self {
        Self {
            command: command.unwrap_or_else(|| DEFAULT_CONVERTER.to_string()),
        }
    }
}

impl ConversionEngine for CommandEngine {
    fn convert(
        &self,
        source: &Path,
        output_dir: &Path,
        options: &ConvertOptions,
    ) -> Result<Conversion, JobError> {
        let started = Instant::now();

        let mut parts = self.command.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| JobError::Engine("empty converter command".into()))?;
        let mut cmd = Command::new(program);
        cmd.args(parts);
        if !options.ocr {
            cmd.arg("--no-ocr");
        }
        if !options.extract_images {
            cmd.arg("--no-images");
        }
        cmd.arg(source).arg(output_dir);

        // A missing converter binary is an engine problem, not an
        // output-path one; keep it out of the retryable I/O class.
        let output = cmd
            .output()
            .map_err(|e| JobError::Engine(format!("spawn {program}: {e}")))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(JobError::Engine(format!(
                "{program} exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        let output_path = output_dir.join(format!("{stem}.md"));
        if !output_path.is_file() {
            return Err(JobError::Engine(format!(
                "{program} reported success but produced no {}",
                output_path.display()
            )));
        }

        Ok(Conversion {
            output_path,
            // The generic command contract has no page count channel.
            pages_processed: 0,
            duration: started.elapsed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn maps_exit_status_and_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("doc.pdf");
        let out_dir = dir.path().join("doc_md");
        fs::create_dir_all(&out_dir).unwrap();

        // `true` succeeds but writes nothing: contract violation.
        let engine = CommandEngine::new(Some("true".into()));
        let err = engine
            .convert(&source, &out_dir, &ConvertOptions::default())
            .unwrap_err();
        assert!(matches!(err, JobError::Engine(_)));

        // A failing command surfaces its status.
        let engine = CommandEngine::new(Some("false".into()));
        let err = engine
            .convert(&source, &out_dir, &ConvertOptions::default())
            .unwrap_err();
        assert!(err.to_string().contains("exited with"));

        // A missing binary is an engine error, not retryable I/O.
        let engine = CommandEngine::new(Some("pdfmd-no-such-converter".into()));
        let err = engine
            .convert(&source, &out_dir, &ConvertOptions::default())
            .unwrap_err();
        assert!(matches!(err, JobError::Engine(_)));
    }

    #[test]
    fn finds_the_generated_markdown() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("doc.pdf");
        let out_dir = dir.path().join("doc_md");
        fs::create_dir_all(&out_dir).unwrap();
        fs::write(out_dir.join("doc.md"), "# stub").unwrap();

        let engine = CommandEngine::new(Some("true".into()));
        let conversion = engine
            .convert(&source, &out_dir, &ConvertOptions::default())
            .unwrap();
        assert_eq!(conversion.output_path, out_dir.join("doc.md"));
    }
}
