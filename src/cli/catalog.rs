use anyhow::Result;
use std::path::PathBuf;

use crate::config::Config;
use crate::docs::write_catalog;

pub fn run(config: &Config, output: Option<PathBuf>) -> Result<()> {
    let output = output.unwrap_or_else(|| config.paths.catalog_file.clone());
    let report = write_catalog(config, &output)?;
    report.print();
    Ok(())
}
