//! Global configuration loaded from `~/.config/pdfmd/config.toml`.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::pressure::PressureThresholds;

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per job (including the first).
    pub max_attempts: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_attempts: 2 }
    }
}

/// Conversion options passed through to the engine (optional section).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertConfig {
    /// Extract embedded images into each job's `images/` subdirectory.
    pub extract_images: bool,
    /// Run OCR over scanned pages.
    pub ocr: bool,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            extract_images: true,
            ocr: true,
        }
    }
}

/// Global configuration for batch conversion runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfmdConfig {
    /// Maximum concurrent conversion workers. 0 means auto-detect from
    /// host cores and memory at startup.
    pub max_workers: usize,
    /// Base directory for conversion output. Unset: next to each source.
    #[serde(default)]
    pub output_root: Option<PathBuf>,
    /// External converter command; the source path and output directory
    /// are appended as its final two arguments.
    #[serde(default)]
    pub converter_command: Option<String>,
    /// Optional pressure thresholds; built-in defaults when missing.
    #[serde(default)]
    pub pressure: Option<PressureThresholds>,
    /// Optional retry policy; built-in single-retry default when missing.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
    /// Optional conversion settings.
    #[serde(default)]
    pub convert: Option<ConvertConfig>,
}

impl Default for PdfmdConfig {
    fn default() -> Self {
        Self {
            max_workers: 0,
            output_root: None,
            converter_command: None,
            pressure: None,
            retry: None,
            convert: None,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("pdfmd")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<PdfmdConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = PdfmdConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: PdfmdConfig = toml::from_str(&data)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = PdfmdConfig::default();
        assert_eq!(cfg.max_workers, 0);
        assert!(cfg.output_root.is_none());
        assert!(cfg.converter_command.is_none());
        assert!(cfg.pressure.is_none());
        assert!(cfg.retry.is_none());
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = PdfmdConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: PdfmdConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.max_workers, cfg.max_workers);
        assert_eq!(parsed.output_root, cfg.output_root);
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            max_workers = 6
            output_root = "/data/markdown"
            converter_command = "docling --to md"
        "#;
        let cfg: PdfmdConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.max_workers, 6);
        assert_eq!(cfg.output_root, Some(PathBuf::from("/data/markdown")));
        assert_eq!(cfg.converter_command.as_deref(), Some("docling --to md"));
        assert!(cfg.pressure.is_none());
    }

    #[test]
    fn config_toml_pressure_and_retry_sections() {
        let toml = r#"
            max_workers = 0

            [pressure]
            medium_pct = 40.0
            high_pct = 70.0
            critical_pct = 85.0

            [retry]
            max_attempts = 3

            [convert]
            extract_images = false
            ocr = true
        "#;
        let cfg: PdfmdConfig = toml::from_str(toml).unwrap();
        let pressure = cfg.pressure.unwrap();
        assert!((pressure.medium_pct - 40.0).abs() < 1e-9);
        assert!((pressure.critical_pct - 85.0).abs() < 1e-9);
        assert_eq!(cfg.retry.unwrap().max_attempts, 3);
        let convert = cfg.convert.unwrap();
        assert!(!convert.extract_images);
        assert!(convert.ocr);
    }
}
