use anyhow::{bail, Result};

use crate::config::Config;
use crate::scaffold::scaffold_all;

/// Fill in missing scaffold files across every existing contribution.
pub fn run(config: &Config) -> Result<()> {
    if !config.paths.contrib_dir.exists() {
        println!(
            "The directory '{}' does not exist.",
            config.paths.contrib_dir.display()
        );
        return Ok(());
    }

    let reports = scaffold_all(config)?;
    let mut failed = 0;
    for report in &reports {
        if report.is_noop() {
            println!("{}: complete", report.contribution);
            continue;
        }
        println!("{}:", report.contribution);
        report.print();
        failed += report.failures().count();
    }

    if failed > 0 {
        bail!("{} scaffold step(s) failed", failed);
    }
    Ok(())
}
