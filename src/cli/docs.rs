use anyhow::{bail, Result};

use crate::config::Config;
use crate::docs::PageGenerator;
use crate::error::ContribError;
use crate::util::is_valid_contribution_name;

/// Generate the documentation pages of one contribution.
pub fn run(config: &Config, name: &str) -> Result<()> {
    if !is_valid_contribution_name(name) {
        bail!(ContribError::InvalidName(name.to_string()));
    }

    let docs = PageGenerator::new(config).generate(name)?;
    for module in &docs.modules {
        println!("Generated Markdown file for module {}.{}", name, module);
    }
    println!("Generated {}", docs.readme.display());
    if !docs.had_metadata {
        println!(
            "Note: no {} found for {}",
            config.metadata_format().file_name(),
            name
        );
    }
    Ok(())
}
