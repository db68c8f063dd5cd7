use anyhow::{bail, Result};
use tracing::info;

use crate::config::Config;
use crate::error::ContribError;
use crate::scaffold::Scaffolder;
use crate::util::is_valid_contribution_name;

pub fn run(
    config: &Config,
    name: &str,
    description: Option<String>,
    dependencies: Vec<String>,
) -> Result<()> {
    if !is_valid_contribution_name(name) {
        bail!(ContribError::InvalidName(name.to_string()));
    }

    info!("Initializing contribution {}", name);
    let report = Scaffolder::new(config)
        .with_description(description)
        .with_dependencies(dependencies)
        .scaffold(name)?;
    report.print();

    if report.has_failures() {
        bail!(
            "{} scaffold step(s) failed for {}",
            report.failures().count(),
            name
        );
    }

    println!("Contribution {} is ready.", name);
    Ok(())
}
