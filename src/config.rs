use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::metadata::MetadataFormat;

/// Name of the per-repository config file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "contribkit.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub metadata: MetadataConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Root of the contribution source tree (default: "./contrib")
    #[serde(default = "default_contrib_dir")]
    pub contrib_dir: PathBuf,

    /// Root of the generated documentation tree (default: "./docs/contrib")
    #[serde(default = "default_docs_dir")]
    pub docs_dir: PathBuf,

    /// Output of the `catalog` command (default: "./contributions-list.md")
    #[serde(default = "default_catalog_file")]
    pub catalog_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            contrib_dir: default_contrib_dir(),
            docs_dir: default_docs_dir(),
            catalog_file: default_catalog_file(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataConfig {
    /// Descriptor format: "pyproject" or "yaml" (default: "pyproject")
    #[serde(default)]
    pub format: MetadataFormat,

    /// Optional: Override the fields every contribution must declare.
    /// If not specified, uses the format default:
    /// - pyproject: name, description, contact, version, license
    /// - yaml: name, description, date, contact, version, license
    #[serde(default)]
    pub required_fields: Option<Vec<String>>,

    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default = "default_license")]
    pub license: String,

    #[serde(default = "default_author_name")]
    pub author_name: String,

    #[serde(default = "default_author_email")]
    pub author_email: String,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            format: MetadataFormat::default(),
            required_fields: None,
            version: default_version(),
            license: default_license(),
            author_name: default_author_name(),
            author_email: default_author_email(),
        }
    }
}

impl MetadataConfig {
    /// Required fields, using the format default if not configured
    pub fn get_required_fields(&self) -> Vec<String> {
        match &self.required_fields {
            Some(fields) => fields.clone(),
            None => self.format.default_required_fields(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Extension of code modules, without the dot (default: "py")
    #[serde(default = "default_module_extension")]
    pub module_extension: String,

    /// Package marker file, never documented as a module (default: "__init__.py")
    #[serde(default = "default_package_marker")]
    pub package_marker: String,

    /// Import namespace used in doc directives (default: "contrib")
    #[serde(default = "default_module_namespace")]
    pub module_namespace: String,

    /// Project name used in generated module stubs (default: "ocean4dvarnet")
    #[serde(default = "default_project_name")]
    pub project_name: String,

    /// Prefix of the generated test module (default: "test_")
    #[serde(default = "default_test_prefix")]
    pub test_prefix: String,

    /// Also scaffold tests/conftest.py (default: true)
    #[serde(default = "default_true")]
    pub write_conftest: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            module_extension: default_module_extension(),
            package_marker: default_package_marker(),
            module_namespace: default_module_namespace(),
            project_name: default_project_name(),
            test_prefix: default_test_prefix(),
            write_conftest: true,
        }
    }
}

impl LayoutConfig {
    pub fn main_module_file(&self, name: &str) -> String {
        format!("{}.{}", name, self.module_extension)
    }

    pub fn test_module_file(&self, name: &str) -> String {
        format!("{}{}.{}", self.test_prefix, name, self.module_extension)
    }
}

fn default_contrib_dir() -> PathBuf {
    PathBuf::from("./contrib")
}

fn default_docs_dir() -> PathBuf {
    PathBuf::from("./docs/contrib")
}

fn default_catalog_file() -> PathBuf {
    PathBuf::from("./contributions-list.md")
}

fn default_version() -> String {
    "1.0.0".to_string()
}

fn default_license() -> String {
    "CeCILL-C FREE SOFTWARE LICENSE AGREEMENT".to_string()
}

fn default_author_name() -> String {
    "Contributor Name".to_string()
}

fn default_author_email() -> String {
    "contributor1@example.com".to_string()
}

fn default_module_extension() -> String {
    "py".to_string()
}

fn default_package_marker() -> String {
    "__init__.py".to_string()
}

fn default_module_namespace() -> String {
    "contrib".to_string()
}

fn default_project_name() -> String {
    "ocean4dvarnet".to_string()
}

fn default_test_prefix() -> String {
    "test_".to_string()
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a specific path, or use the default search path
    pub fn load_with_path(path: Option<String>) -> Result<Self> {
        // An explicit path must load
        if let Some(config_path) = path {
            debug!("Loading config from explicit path: {}", config_path);
            return Self::load_from_path(&config_path)
                .with_context(|| format!("Failed to load config from {}", config_path));
        }

        // Per-repo config in the working directory
        if Path::new(CONFIG_FILE_NAME).exists() {
            match Self::load_from_path(CONFIG_FILE_NAME) {
                Ok(config) => {
                    debug!("Loaded config from ./{}", CONFIG_FILE_NAME);
                    return Ok(config);
                }
                Err(e) => warn!("Ignoring ./{}: {:#}", CONFIG_FILE_NAME, e),
            }
        }

        debug!("Using default config");
        Ok(Self::default())
    }

    fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn metadata_format(&self) -> MetadataFormat {
        self.metadata.format
    }

    pub fn contribution_dir(&self, name: &str) -> PathBuf {
        self.paths.contrib_dir.join(name)
    }

    pub fn docs_contribution_dir(&self, name: &str) -> PathBuf {
        self.paths.docs_dir.join(name)
    }

    pub fn metadata_path(&self, name: &str) -> PathBuf {
        self.contribution_dir(name)
            .join(self.metadata.format.file_name())
    }

    pub fn index_path(&self) -> PathBuf {
        self.paths.docs_dir.join("index.md")
    }

    /// Point both trees at `root/contrib` and `root/docs/contrib`.
    pub fn rooted_at(root: &Path) -> Self {
        let mut config = Self::default();
        config.paths.contrib_dir = root.join("contrib");
        config.paths.docs_dir = root.join("docs").join("contrib");
        config.paths.catalog_file = root.join("contributions-list.md");
        config
    }
}
