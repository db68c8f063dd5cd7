use anyhow::{bail, Result};

use crate::config::Config;
use crate::error::ContribError;
use crate::util::is_valid_contribution_name;
use crate::validator::{print_results, ContributionValidator};

/// Validate one contribution, or all of them when `name` is `None`.
pub fn run(config: &Config, name: Option<&str>) -> Result<()> {
    let validator = ContributionValidator::new(config);

    let results = match name {
        Some(name) => {
            if !is_valid_contribution_name(name) {
                bail!(ContribError::InvalidName(name.to_string()));
            }
            if !config.contribution_dir(name).is_dir() {
                bail!(ContribError::UnknownContribution {
                    name: name.to_string(),
                    root: config.paths.contrib_dir.clone(),
                });
            }
            vec![validator.validate(name)]
        }
        None => validator.validate_all()?.results,
    };

    print_results(&results);

    let invalid = results.iter().filter(|r| !r.is_valid()).count();
    if invalid > 0 {
        bail!("{} contribution(s) failed validation", invalid);
    }
    Ok(())
}
