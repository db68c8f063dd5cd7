use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced by the library layer.
///
/// Absent files and directories are not errors here: readers return `None`
/// or an empty set for those, and only content that exists but cannot be
/// used ends up in this enum.
#[derive(Error, Debug)]
pub enum ContribError {
    #[error("Invalid contribution name '{0}': only lowercase letters, digits and underscores are allowed")]
    InvalidName(String),

    #[error("The contribution '{name}' does not exist in '{}'", root.display())]
    UnknownContribution { name: String, root: PathBuf },

    #[error("Failed to parse {}: {message}", path.display())]
    MalformedMetadata { path: PathBuf, message: String },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ContribError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ContribError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ContribError>;
