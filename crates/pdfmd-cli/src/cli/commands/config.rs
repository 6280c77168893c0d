//! `pdfmd config` – print the effective configuration.

use anyhow::Result;

use pdfmd_core::config;

pub fn run_show_config() -> Result<()> {
    let path = config::config_path()?;
    let cfg = config::load_or_init()?;
    println!("# {}", path.display());
    print!("{}", toml::to_string_pretty(&cfg)?);
    Ok(())
}
