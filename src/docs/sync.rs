use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::pages::PageGenerator;
use crate::config::Config;
use crate::util::{join_names, list_subdirs, TreeDiff};

pub const INDEX_HEADER: &str = "# Index of Contributions";

/// Removes one orphaned doc directory tree.
pub type RemoveDir = fn(&Path) -> io::Result<()>;

fn remove_tree(path: &Path) -> io::Result<()> {
    fs::remove_dir_all(path)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// Remove orphans, report missing doc directories, rebuild the index
    ListOnly,
    /// Same, but (re)generate the pages of every contribution first
    Full,
}

#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub source: BTreeSet<String>,
    pub docs_before: BTreeSet<String>,
    pub removed: Vec<String>,
    pub failed_removals: Vec<(String, String)>,
    pub missing: BTreeSet<String>,
    pub generated: Vec<String>,
    pub failed_generations: Vec<(String, String)>,
    /// Entries linked from the index, in index order
    pub indexed: Vec<String>,
    pub index_path: PathBuf,
}

impl SyncReport {
    pub fn has_failures(&self) -> bool {
        self.failure_count() > 0
    }

    pub fn failure_count(&self) -> usize {
        self.failed_removals.len() + self.failed_generations.len()
    }

    pub fn print(&self) {
        println!("Subdirectories in contrib: {}", join_names(&self.source));
        println!("Subdirectories in docs: {}", join_names(&self.docs_before));

        for name in &self.removed {
            println!("Removed obsolete directory: {}", name);
        }
        for (name, err) in &self.failed_removals {
            println!("Failed to remove obsolete directory {}: {}", name, err);
        }

        println!(
            "Directories in contrib missing in docs: {}",
            join_names(&self.missing)
        );

        for name in &self.generated {
            println!("Generated docs for {}", name);
        }
        for (name, err) in &self.failed_generations {
            println!("Failed to generate docs for {}: {}", name, err);
        }

        println!(
            "Generated index file: {} ({} entries)",
            self.index_path.display(),
            self.indexed.len()
        );
    }
}

/// Reconciles the generated docs tree with the contribution source tree.
pub struct DocSynchronizer<'a> {
    config: &'a Config,
    remove_dir: RemoveDir,
}

impl<'a> DocSynchronizer<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            remove_dir: remove_tree,
        }
    }

    /// Replace the orphan removal step (defaults to `fs::remove_dir_all`).
    pub fn with_remover(mut self, remove_dir: RemoveDir) -> Self {
        self.remove_dir = remove_dir;
        self
    }

    pub fn run(&self, mode: SyncMode) -> Result<SyncReport> {
        let contrib_dir = &self.config.paths.contrib_dir;
        let docs_dir = &self.config.paths.docs_dir;

        let source = list_subdirs(contrib_dir)
            .with_context(|| format!("Failed to list {}", contrib_dir.display()))?;
        let docs = list_subdirs(docs_dir)
            .with_context(|| format!("Failed to list {}", docs_dir.display()))?;
        let diff = TreeDiff::between(&source, &docs);

        let mut report = SyncReport {
            source: source.clone(),
            docs_before: docs,
            missing: diff.missing.clone(),
            index_path: self.config.index_path(),
            ..Default::default()
        };

        for orphan in &diff.orphans {
            let path = self.config.docs_contribution_dir(orphan);
            info!("Removing obsolete directory: {}", path.display());
            match (self.remove_dir)(&path) {
                Ok(()) => report.removed.push(orphan.clone()),
                Err(e) => {
                    warn!("Failed to remove {}: {}", path.display(), e);
                    report.failed_removals.push((orphan.clone(), e.to_string()));
                }
            }
        }

        if !diff.missing.is_empty() {
            info!(
                "Directories in contrib missing in docs: {}",
                join_names(&diff.missing)
            );
        }

        let valid = match mode {
            SyncMode::ListOnly => diff.valid,
            SyncMode::Full => {
                let generator = PageGenerator::new(self.config);
                for name in &source {
                    match generator.generate(name) {
                        Ok(_) => report.generated.push(name.clone()),
                        Err(e) => {
                            warn!("Failed to generate docs for {}: {}", name, e);
                            report.failed_generations.push((name.clone(), e.to_string()));
                        }
                    }
                }
                source
            }
        };

        report.indexed = self.write_index(&valid)?;
        info!("Generated index file: {}", report.index_path.display());
        Ok(report)
    }

    /// Write the index page linking the README of each entry in `valid`
    /// that exists on disk. Returns the linked entries.
    pub fn write_index(&self, valid: &BTreeSet<String>) -> Result<Vec<String>> {
        let docs_dir = &self.config.paths.docs_dir;
        fs::create_dir_all(docs_dir)
            .with_context(|| format!("Failed to create {}", docs_dir.display()))?;

        let mut content = format!("{}\n\n", INDEX_HEADER);
        let mut indexed = Vec::new();
        for name in valid {
            let readme = self.config.docs_contribution_dir(name).join("README.md");
            if readme.exists() {
                content.push_str(&format!("- [{n}](./{n}/README.md)\n", n = name));
                indexed.push(name.clone());
            } else {
                warn!("Skipping {} in index: {} not found", name, readme.display());
            }
        }

        let index_path = self.config.index_path();
        fs::write(&index_path, content)
            .with_context(|| format!("Failed to write {}", index_path.display()))?;
        Ok(indexed)
    }
}
