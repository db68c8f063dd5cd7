use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::Config;
use crate::metadata::{read_metadata, Metadata};
use crate::util::list_subdirs;

#[derive(Debug, Clone, Default)]
pub struct CatalogReport {
    pub path: PathBuf,
    pub listed: Vec<String>,
    /// Contributions left out, with the reason
    pub skipped: Vec<(String, String)>,
}

impl CatalogReport {
    pub fn print(&self) {
        for (name, reason) in &self.skipped {
            println!("Skipped {}: {}", name, reason);
        }
        println!(
            "Generated catalog: {} ({} contributions)",
            self.path.display(),
            self.listed.len()
        );
    }
}

/// Render one catalog section, titled with the declared name when there is
/// one. Only present fields get a line.
pub fn catalog_entry(dir_name: &str, metadata: &Metadata) -> String {
    let title = metadata
        .name
        .as_deref()
        .filter(|n| !n.trim().is_empty())
        .unwrap_or(dir_name);
    let version = metadata.version.as_deref().unwrap_or("unversioned");
    let mut entry = format!("## {} ({})\n\n", title, version);

    let fields = [
        ("Description", metadata.description.as_deref()),
        ("Date", metadata.date.as_deref()),
        ("Contact", metadata.contact.as_deref()),
        ("License", metadata.license.as_deref()),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            entry.push_str(&format!("**{}**: {}\n\n", label, value));
        }
    }
    if let Some(deps) = &metadata.dependencies {
        if !deps.is_empty() {
            entry.push_str(&format!("**Dependencies**: {}\n\n", deps.join(", ")));
        }
    }

    entry.push_str("---\n\n");
    entry
}

/// Write a single page describing every contribution with readable metadata.
pub fn write_catalog(config: &Config, output: &Path) -> Result<CatalogReport> {
    let names = list_subdirs(&config.paths.contrib_dir)?;
    let format = config.metadata_format();

    let mut report = CatalogReport {
        path: output.to_path_buf(),
        ..Default::default()
    };
    let mut page = String::from("# Contributions\n\n");

    for name in &names {
        match read_metadata(&config.metadata_path(name), format) {
            Ok(Some(metadata)) => {
                page.push_str(&catalog_entry(name, &metadata));
                report.listed.push(name.clone());
            }
            Ok(None) => {
                warn!("No {} in {}", format.file_name(), name);
                report
                    .skipped
                    .push((name.clone(), format!("no {}", format.file_name())));
            }
            Err(e) => {
                warn!("Skipping {}: {}", name, e);
                report.skipped.push((name.clone(), e.to_string()));
            }
        }
    }

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    fs::write(output, page).with_context(|| format!("Failed to write {}", output.display()))?;
    info!("Generated catalog: {}", output.display());
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{parse_metadata, MetadataFormat};
    use tempfile::TempDir;

    #[test]
    fn test_catalog_entry_present_fields_only() {
        let metadata = parse_metadata(
            "name: foo\nversion: 2.0.0\ndescription: Does foo\ndependencies:\n  - numpy\n  - xarray\n",
            MetadataFormat::Yaml,
        )
        .unwrap()
        .unwrap();
        let entry = catalog_entry("foo", &metadata);
        assert!(entry.starts_with("## foo (2.0.0)\n"));
        assert!(entry.contains("**Description**: Does foo"));
        assert!(entry.contains("**Dependencies**: numpy, xarray"));
        assert!(!entry.contains("**Date**"));
        assert!(!entry.contains("**Contact**"));
        assert!(entry.ends_with("---\n\n"));
    }

    #[test]
    fn test_catalog_entry_title_falls_back_to_directory() {
        let declared = parse_metadata(
            "name: Ocean Solver\nversion: 1.0.0\n",
            MetadataFormat::Yaml,
        )
        .unwrap()
        .unwrap();
        assert!(catalog_entry("ocean_solver", &declared).starts_with("## Ocean Solver (1.0.0)\n"));

        let unnamed = parse_metadata("version: 1.0.0\n", MetadataFormat::Yaml)
            .unwrap()
            .unwrap();
        assert!(catalog_entry("ocean_solver", &unnamed).starts_with("## ocean_solver (1.0.0)\n"));
    }

    #[test]
    fn test_write_catalog_skips_unreadable() {
        let tmp = TempDir::new().unwrap();
        let config = Config::rooted_at(tmp.path());
        for (name, content) in [
            ("alpha", Some("[project]\nname = \"alpha\"\nversion = \"1.0.0\"\n")),
            ("beta", Some("[project\n")),
            ("gamma", None),
        ] {
            fs::create_dir_all(config.contribution_dir(name)).unwrap();
            if let Some(content) = content {
                fs::write(config.metadata_path(name), content).unwrap();
            }
        }

        let output = config.paths.catalog_file.clone();
        let report = write_catalog(&config, &output).unwrap();
        assert_eq!(report.listed, vec!["alpha"]);
        let skipped: Vec<_> = report.skipped.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(skipped, vec!["beta", "gamma"]);

        let page = fs::read_to_string(&output).unwrap();
        assert!(page.starts_with("# Contributions\n\n## alpha (1.0.0)\n"));
        assert!(!page.contains("beta"));
    }

    #[test]
    fn test_write_catalog_empty_tree() {
        let tmp = TempDir::new().unwrap();
        let config = Config::rooted_at(tmp.path());
        let output = tmp.path().join("out").join("list.md");

        let report = write_catalog(&config, &output).unwrap();
        assert!(report.listed.is_empty());
        assert_eq!(fs::read_to_string(&output).unwrap(), "# Contributions\n\n");
    }
}
