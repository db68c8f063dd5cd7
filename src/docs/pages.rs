use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{ContribError, Result};
use crate::metadata::{read_metadata, Metadata};
use crate::util::is_valid_contribution_name;

const RULE_WIDTH: usize = 40;

/// Pages written for one contribution.
#[derive(Debug, Clone)]
pub struct GeneratedDocs {
    pub contribution: String,
    pub readme: PathBuf,
    /// Module base names, in the order they were documented
    pub modules: Vec<String>,
    pub had_metadata: bool,
}

/// Per-contribution documentation: a README summary plus one page per code
/// module. Output files are overwritten on every run.
pub struct PageGenerator<'a> {
    config: &'a Config,
}

impl<'a> PageGenerator<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    pub fn generate(&self, name: &str) -> Result<GeneratedDocs> {
        if !is_valid_contribution_name(name) {
            return Err(ContribError::InvalidName(name.to_string()));
        }

        let source_dir = self.config.contribution_dir(name);
        if !source_dir.is_dir() {
            return Err(ContribError::UnknownContribution {
                name: name.to_string(),
                root: self.config.paths.contrib_dir.clone(),
            });
        }

        let doc_dir = self.config.docs_contribution_dir(name);
        fs::create_dir_all(&doc_dir).map_err(|e| ContribError::io(&doc_dir, e))?;

        // A malformed descriptor stops here, before the README exists
        let metadata = read_metadata(
            &self.config.metadata_path(name),
            self.config.metadata_format(),
        )?;

        let modules = self.module_names(&source_dir)?;
        for module in &modules {
            let page = doc_dir.join(format!("{}.md", module));
            write_page(&page, &self.module_page(name, module))?;
            info!("Generated Markdown file: {}", page.display());
        }

        let readme = doc_dir.join("README.md");
        write_page(
            &readme,
            &self.readme_page(name, metadata.as_ref(), &modules, &source_dir),
        )?;
        info!("Generated Markdown file: {}", readme.display());

        Ok(GeneratedDocs {
            contribution: name.to_string(),
            readme,
            modules,
            had_metadata: metadata.is_some(),
        })
    }

    /// Base names of the code modules in `source_dir`, sorted, without the
    /// package marker.
    pub fn module_names(&self, source_dir: &Path) -> Result<Vec<String>> {
        let layout = &self.config.layout;
        let suffix = format!(".{}", layout.module_extension);

        let entries = fs::read_dir(source_dir).map_err(|e| ContribError::io(source_dir, e))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| ContribError::io(source_dir, e))?;
            if !entry.path().is_file() {
                continue;
            }
            let file_name = entry.file_name().to_string_lossy().into_owned();
            if file_name == layout.package_marker {
                continue;
            }
            if let Some(stem) = file_name.strip_suffix(&suffix) {
                if !stem.is_empty() {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        debug!("Found {} modules in {}", names.len(), source_dir.display());
        Ok(names)
    }

    pub fn module_page(&self, name: &str, module: &str) -> String {
        format!(
            "# {name}.{module}\n::: {ns}.{name}.{module}\n",
            ns = self.config.layout.module_namespace,
        )
    }

    pub fn readme_page(
        &self,
        name: &str,
        metadata: Option<&Metadata>,
        modules: &[String],
        source_dir: &Path,
    ) -> String {
        let mut page = format!("# {}\n", name);
        page.push_str("![pylint](./badges/pylint.svg)");
        page.push_str("![pytest](./badges/coverage.svg)\n\n");

        match metadata {
            Some(metadata) => {
                page.push_str("| Key | Value |\n|-----|-------|\n");
                for (key, value) in metadata.table_rows() {
                    page.push_str(&format!(
                        "| {} | {} |\n",
                        escape_cell(&key),
                        escape_cell(&value)
                    ));
                }
            }
            None => page.push_str(&format!(
                "No {} found in {}.\n",
                self.config.metadata_format().file_name(),
                source_dir.display()
            )),
        }

        page.push('\n');
        page.push_str(&"-".repeat(RULE_WIDTH));
        page.push('\n');

        for module in modules {
            page.push_str(&format!("- [{m}](./{m}.md)\n", m = module));
        }
        page
    }
}

fn write_page(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|e| ContribError::io(path, e))
}

fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|").replace('\n', " ")
}
