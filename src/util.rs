//! Shared utilities for walking the contribution and documentation trees

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::error::{ContribError, Result};

static CONTRIBUTION_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9_]+$").expect("contribution name pattern is valid"));

/// Contribution names may only contain lowercase ASCII letters, digits and
/// underscores, and must not be empty.
pub fn is_valid_contribution_name(name: &str) -> bool {
    CONTRIBUTION_NAME.is_match(name)
}

/// List the names of the immediate subdirectories of `path`.
///
/// A missing `path` yields an empty set: a tree that does not exist yet is
/// treated as "nothing present". Plain files are ignored. Symlinks are
/// followed, so a link to a directory counts as a directory.
pub fn list_subdirs(path: &Path) -> Result<BTreeSet<String>> {
    if !path.exists() {
        return Ok(BTreeSet::new());
    }

    let entries = fs::read_dir(path).map_err(|e| ContribError::io(path, e))?;
    let mut names = BTreeSet::new();
    for entry in entries {
        let entry = entry.map_err(|e| ContribError::io(path, e))?;
        if entry.path().is_dir() {
            names.insert(entry.file_name().to_string_lossy().into_owned());
        }
    }
    Ok(names)
}

/// Set algebra between the source tree and the generated docs tree.
///
/// Computed once and shared by the cleanup and the reporting paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeDiff {
    /// In docs but not in source: to be removed.
    pub orphans: BTreeSet<String>,
    /// In source but not in docs: reported.
    pub missing: BTreeSet<String>,
    /// In both trees.
    pub valid: BTreeSet<String>,
}

impl TreeDiff {
    pub fn between(source: &BTreeSet<String>, docs: &BTreeSet<String>) -> Self {
        Self {
            orphans: docs.difference(source).cloned().collect(),
            missing: source.difference(docs).cloned().collect(),
            valid: source.intersection(docs).cloned().collect(),
        }
    }
}

/// Join a set of names for a one-line status message.
pub fn join_names<'a, I>(names: I) -> String
where
    I: IntoIterator<Item = &'a String>,
{
    let joined = names
        .into_iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if joined.is_empty() {
        "(none)".to_string()
    } else {
        joined
    }
}
