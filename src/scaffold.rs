//! Scaffold writer: creates the standard files of a contribution.
//!
//! Every step checks its own target and writes only when it is absent, so
//! running the scaffolder on a complete contribution changes nothing. Steps
//! do not depend on one another; a failing step is recorded and the next one
//! still runs.

use anyhow::Result;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::metadata::Descriptor;
use crate::util::list_subdirs;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaffoldItem {
    Readme,
    Metadata,
    PackageMarker,
    MainModule,
    TestsDir,
    TestModule,
    TestConfig,
}

impl fmt::Display for ScaffoldItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ScaffoldItem::Readme => "README",
            ScaffoldItem::Metadata => "metadata",
            ScaffoldItem::PackageMarker => "package marker",
            ScaffoldItem::MainModule => "main module",
            ScaffoldItem::TestsDir => "tests directory",
            ScaffoldItem::TestModule => "test module",
            ScaffoldItem::TestConfig => "test config",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Created,
    AlreadyExists,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct ScaffoldStep {
    pub item: ScaffoldItem,
    pub path: PathBuf,
    pub outcome: StepOutcome,
}

#[derive(Debug, Clone)]
pub struct ScaffoldReport {
    pub contribution: String,
    pub steps: Vec<ScaffoldStep>,
}

impl ScaffoldReport {
    pub fn created(&self) -> impl Iterator<Item = &ScaffoldStep> {
        self.steps
            .iter()
            .filter(|s| s.outcome == StepOutcome::Created)
    }

    pub fn failures(&self) -> impl Iterator<Item = &ScaffoldStep> {
        self.steps
            .iter()
            .filter(|s| matches!(s.outcome, StepOutcome::Failed(_)))
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }

    /// True when nothing had to be written.
    pub fn is_noop(&self) -> bool {
        self.steps
            .iter()
            .all(|s| s.outcome == StepOutcome::AlreadyExists)
    }

    pub fn print(&self) {
        for step in &self.steps {
            match &step.outcome {
                StepOutcome::Created => println!("Created {}", step.path.display()),
                StepOutcome::AlreadyExists => {
                    println!("{} already exists in {}", step.item, step.path.display())
                }
                StepOutcome::Failed(err) => {
                    println!("Failed to create {}: {}", step.path.display(), err)
                }
            }
        }
    }
}

const CONFTEST_TEMPLATE: &str = r#""""
Pytest configuration file for the test suite.

This file ensures that the root directory of the project is added to the
PYTHONPATH, allowing the test suite to import the contribution modules.
"""

import sys
import os

sys.path.insert(0, os.path.abspath(os.path.join(os.path.dirname(__file__), '..')))
"#;

pub struct Scaffolder<'a> {
    config: &'a Config,
    description: Option<String>,
    dependencies: Vec<String>,
    date: String,
}

impl<'a> Scaffolder<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            description: None,
            dependencies: Vec::new(),
            date: chrono::Local::now().format("%Y-%m-%d").to_string(),
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description.filter(|d| !d.trim().is_empty());
        self
    }

    pub fn with_dependencies(mut self, dependencies: Vec<String>) -> Self {
        self.dependencies = dependencies;
        self
    }

    /// Date written into descriptors that carry one (defaults to today).
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }

    /// Ensure every standard file of `name` exists.
    ///
    /// Only the contribution directory itself is a hard prerequisite; if it
    /// cannot be created the error is returned and no step runs.
    pub fn scaffold(&self, name: &str) -> Result<ScaffoldReport> {
        let root = self.config.contribution_dir(name);
        fs::create_dir_all(&root)?;
        debug!("Scaffolding {} in {}", name, root.display());

        let layout = &self.config.layout;
        let tests_dir = root.join("tests");

        let mut steps = vec![
            self.write_step(ScaffoldItem::Readme, root.join("README.md"), || {
                Ok(self.readme(name))
            }),
            self.write_step(
                ScaffoldItem::Metadata,
                root.join(self.config.metadata_format().file_name()),
                || self.descriptor(name),
            ),
            self.write_step(
                ScaffoldItem::PackageMarker,
                root.join(&layout.package_marker),
                || Ok(format!("\"\"\" {} \"\"\"\n", name)),
            ),
            self.write_step(
                ScaffoldItem::MainModule,
                root.join(layout.main_module_file(name)),
                || Ok(format!("\"\"\"{} contribution {}\"\"\"\n", layout.project_name, name)),
            ),
            Self::dir_step(ScaffoldItem::TestsDir, tests_dir.clone()),
            self.write_step(
                ScaffoldItem::TestModule,
                tests_dir.join(layout.test_module_file(name)),
                || Ok(format!("\"\"\"tests for contribution {}\"\"\"\n", name)),
            ),
        ];
        if layout.write_conftest {
            steps.push(self.write_step(
                ScaffoldItem::TestConfig,
                tests_dir.join("conftest.py"),
                || Ok(CONFTEST_TEMPLATE.to_string()),
            ));
        }

        Ok(ScaffoldReport {
            contribution: name.to_string(),
            steps,
        })
    }

    fn readme(&self, name: &str) -> String {
        match &self.description {
            Some(description) => format!("# {}\n{}\n", name, description),
            None => format!("# {}\n", name),
        }
    }

    fn descriptor(&self, name: &str) -> Result<String> {
        let meta = &self.config.metadata;
        Descriptor {
            name,
            description: self.description.as_deref().unwrap_or(name),
            version: &meta.version,
            license: &meta.license,
            author_name: &meta.author_name,
            author_email: &meta.author_email,
            date: &self.date,
            dependencies: &self.dependencies,
        }
        .render(meta.format)
    }

    fn write_step<F>(&self, item: ScaffoldItem, path: PathBuf, content: F) -> ScaffoldStep
    where
        F: FnOnce() -> Result<String>,
    {
        let outcome = match write_if_absent(&path, content) {
            Ok(true) => {
                info!("Created {}", path.display());
                StepOutcome::Created
            }
            Ok(false) => StepOutcome::AlreadyExists,
            Err(e) => {
                warn!("Failed to create {}: {}", path.display(), e);
                StepOutcome::Failed(e.to_string())
            }
        };
        ScaffoldStep {
            item,
            path,
            outcome,
        }
    }

    fn dir_step(item: ScaffoldItem, path: PathBuf) -> ScaffoldStep {
        let outcome = if path.is_dir() {
            StepOutcome::AlreadyExists
        } else {
            match fs::create_dir_all(&path) {
                Ok(()) => {
                    info!("Created {}/", path.display());
                    StepOutcome::Created
                }
                Err(e) => {
                    warn!("Failed to create {}: {}", path.display(), e);
                    StepOutcome::Failed(e.to_string())
                }
            }
        };
        ScaffoldStep {
            item,
            path,
            outcome,
        }
    }
}

/// Write `content()` to `path` unless something is already there.
/// Returns whether a file was written. Nothing is written if `content` fails.
fn write_if_absent<F>(path: &Path, content: F) -> Result<bool>
where
    F: FnOnce() -> Result<String>,
{
    if path.exists() {
        return Ok(false);
    }
    fs::write(path, content()?)?;
    Ok(true)
}

/// Run the scaffolder on every existing contribution directory.
///
/// A missing contribution root is reported and yields no reports.
pub fn scaffold_all(config: &Config) -> Result<Vec<ScaffoldReport>> {
    let root = &config.paths.contrib_dir;
    if !root.exists() {
        warn!("The directory '{}' does not exist.", root.display());
        return Ok(Vec::new());
    }

    let scaffolder = Scaffolder::new(config);
    let mut reports = Vec::new();
    for name in list_subdirs(root)? {
        reports.push(scaffolder.scaffold(&name)?);
    }
    Ok(reports)
}
