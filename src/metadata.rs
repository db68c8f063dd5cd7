//! Contribution metadata: reading, the typed record, and descriptor templates.
//!
//! Two on-disk formats are supported. The default is the `[project]` table of
//! a `pyproject.toml`; the legacy format is a flat `metadatas.yml` mapping.
//! Both are parsed into the same [`Metadata`] record, which keeps the fields
//! the tooling understands as typed optionals and everything else in a side
//! table so nothing read from disk is lost.

use anyhow::bail;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

use crate::error::{ContribError, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataFormat {
    /// `pyproject.toml`, `[project]` table
    #[default]
    Pyproject,
    /// `metadatas.yml`, top-level mapping
    Yaml,
}

impl MetadataFormat {
    pub fn as_str(&self) -> &str {
        match self {
            MetadataFormat::Pyproject => "pyproject",
            MetadataFormat::Yaml => "yaml",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            MetadataFormat::Pyproject => "pyproject.toml",
            MetadataFormat::Yaml => "metadatas.yml",
        }
    }

    /// Fields a contribution must declare when no explicit list is configured.
    /// The legacy YAML descriptor also carries a creation date.
    pub fn default_required_fields(&self) -> Vec<String> {
        let fields: &[&str] = match self {
            MetadataFormat::Pyproject => &["name", "description", "contact", "version", "license"],
            MetadataFormat::Yaml => &[
                "name",
                "description",
                "date",
                "contact",
                "version",
                "license",
            ],
        };
        fields.iter().map(|f| f.to_string()).collect()
    }
}

impl FromStr for MetadataFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "pyproject" | "toml" => Ok(MetadataFormat::Pyproject),
            "yaml" | "yml" | "legacy" => Ok(MetadataFormat::Yaml),
            _ => bail!("Unknown metadata format: {}", s),
        }
    }
}

/// A value read from a metadata file, independent of the source format.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    List(Vec<MetadataValue>),
    Table(Vec<(String, MetadataValue)>),
}

impl MetadataValue {
    fn get(&self, key: &str) -> Option<&MetadataValue> {
        match self {
            MetadataValue::Table(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::Null => Ok(()),
            MetadataValue::Bool(b) => write!(f, "{}", b),
            MetadataValue::Integer(i) => write!(f, "{}", i),
            MetadataValue::Float(x) => write!(f, "{}", x),
            MetadataValue::Text(s) => write!(f, "{}", s),
            MetadataValue::List(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "{}", parts.join(", "))
            }
            MetadataValue::Table(entries) => {
                let parts: Vec<String> = entries
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k, v))
                    .collect();
                write!(f, "{}", parts.join(", "))
            }
        }
    }
}

impl From<serde_yaml::Value> for MetadataValue {
    fn from(value: serde_yaml::Value) -> Self {
        use serde_yaml::Value;
        match value {
            Value::Null => MetadataValue::Null,
            Value::Bool(b) => MetadataValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => MetadataValue::Integer(i),
                None => MetadataValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => MetadataValue::Text(s),
            Value::Sequence(items) => {
                MetadataValue::List(items.into_iter().map(MetadataValue::from).collect())
            }
            Value::Mapping(map) => MetadataValue::Table(
                map.into_iter()
                    .map(|(k, v)| (yaml_key(k), MetadataValue::from(v)))
                    .collect(),
            ),
            Value::Tagged(tagged) => MetadataValue::from(tagged.value),
        }
    }
}

impl From<toml::Value> for MetadataValue {
    fn from(value: toml::Value) -> Self {
        use toml::Value;
        match value {
            Value::String(s) => MetadataValue::Text(s),
            Value::Integer(i) => MetadataValue::Integer(i),
            Value::Float(x) => MetadataValue::Float(x),
            Value::Boolean(b) => MetadataValue::Bool(b),
            Value::Datetime(dt) => MetadataValue::Text(dt.to_string()),
            Value::Array(items) => {
                MetadataValue::List(items.into_iter().map(MetadataValue::from).collect())
            }
            Value::Table(table) => MetadataValue::Table(
                table
                    .into_iter()
                    .map(|(k, v)| (k, MetadataValue::from(v)))
                    .collect(),
            ),
        }
    }
}

fn yaml_key(key: serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s,
        other => MetadataValue::from(other).to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Author {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Parsed contribution metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    pub name: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub contact: Option<String>,
    pub version: Option<String>,
    pub license: Option<String>,
    pub dependencies: Option<Vec<String>>,
    pub authors: Option<Vec<Author>>,
    /// Keys the tooling does not interpret, kept verbatim.
    pub extra: BTreeMap<String, MetadataValue>,
}

impl Metadata {
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, MetadataValue)>,
    {
        let mut metadata = Metadata::default();
        for (key, value) in entries {
            match key.as_str() {
                "name" => metadata.name = Some(value.to_string()),
                "description" => metadata.description = Some(value.to_string()),
                "date" => metadata.date = Some(value.to_string()),
                "contact" => metadata.contact = Some(value.to_string()),
                "version" => metadata.version = Some(value.to_string()),
                "license" => metadata.license = Some(license_text(&value)),
                "dependencies" => metadata.dependencies = Some(dependency_list(&value)),
                "authors" => match author_list(&value) {
                    Some(authors) => metadata.authors = Some(authors),
                    None => {
                        metadata.extra.insert(key.clone(), value);
                    }
                },
                _ => {
                    metadata.extra.insert(key.clone(), value);
                }
            }
        }
        metadata
    }

    /// Every key present in the source file.
    pub fn keys(&self) -> BTreeSet<String> {
        let known = [
            ("name", self.name.is_some()),
            ("description", self.description.is_some()),
            ("date", self.date.is_some()),
            ("contact", self.contact.is_some()),
            ("version", self.version.is_some()),
            ("license", self.license.is_some()),
            ("dependencies", self.dependencies.is_some()),
            ("authors", self.authors.is_some()),
        ];
        known
            .iter()
            .filter(|(_, present)| *present)
            .map(|(key, _)| key.to_string())
            .chain(self.extra.keys().cloned())
            .collect()
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.keys().contains(key)
    }

    /// Key/value pairs for display, known fields first in a fixed order,
    /// then unrecognized keys sorted by name.
    pub fn table_rows(&self) -> Vec<(String, String)> {
        let mut rows = Vec::new();
        let text_fields = [
            ("name", &self.name),
            ("description", &self.description),
            ("version", &self.version),
            ("license", &self.license),
            ("date", &self.date),
            ("contact", &self.contact),
        ];
        for (key, value) in text_fields {
            if let Some(value) = value {
                rows.push((key.to_string(), value.clone()));
            }
        }
        if let Some(authors) = &self.authors {
            let names: Vec<&str> = authors.iter().map(|a| a.name.as_str()).collect();
            rows.push(("authors".to_string(), names.join(", ")));
        }
        if let Some(deps) = &self.dependencies {
            rows.push(("dependencies".to_string(), deps.join(", ")));
        }
        for (key, value) in &self.extra {
            rows.push((key.clone(), value.to_string()));
        }
        rows
    }
}

// `license = { text = "MIT" }` is the PEP 621 table form
fn license_text(value: &MetadataValue) -> String {
    match value.get("text") {
        Some(text) => text.to_string(),
        None => value.to_string(),
    }
}

fn dependency_list(value: &MetadataValue) -> Vec<String> {
    match value {
        MetadataValue::Null => Vec::new(),
        MetadataValue::Text(s) if s.trim().is_empty() => Vec::new(),
        MetadataValue::List(items) => items
            .iter()
            .map(|v| v.to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        other => vec![other.to_string()],
    }
}

fn author_list(value: &MetadataValue) -> Option<Vec<Author>> {
    let MetadataValue::List(items) = value else {
        return None;
    };
    items
        .iter()
        .map(|item| match item {
            MetadataValue::Table(_) => Some(Author {
                name: item.get("name").map(|v| v.to_string()).unwrap_or_default(),
                email: item.get("email").map(|v| v.to_string()),
            }),
            MetadataValue::Text(name) => Some(Author {
                name: name.clone(),
                email: None,
            }),
            _ => None,
        })
        .collect()
}

/// Parse metadata content. `Ok(None)` means the content holds no metadata
/// section (a `pyproject.toml` without `[project]`); `Err` carries the parser
/// message for malformed content.
pub fn parse_metadata(
    content: &str,
    format: MetadataFormat,
) -> std::result::Result<Option<Metadata>, String> {
    match format {
        MetadataFormat::Yaml => {
            let doc: serde_yaml::Value =
                serde_yaml::from_str(content).map_err(|e| e.to_string())?;
            match doc {
                serde_yaml::Value::Mapping(map) => Ok(Some(Metadata::from_entries(
                    map.into_iter()
                        .map(|(k, v)| (yaml_key(k), MetadataValue::from(v))),
                ))),
                serde_yaml::Value::Null => Err("expected a key/value mapping, found an empty document".to_string()),
                _ => Err("expected a key/value mapping at the top level".to_string()),
            }
        }
        MetadataFormat::Pyproject => {
            let mut doc: toml::Table = toml::from_str(content).map_err(|e| e.to_string())?;
            match doc.remove("project") {
                None => Ok(None),
                Some(toml::Value::Table(project)) => Ok(Some(Metadata::from_entries(
                    project
                        .into_iter()
                        .map(|(k, v)| (k, MetadataValue::from(v))),
                ))),
                Some(_) => Err("the 'project' key is not a table".to_string()),
            }
        }
    }
}

/// Read a metadata file. An absent file is `Ok(None)`, not an error.
pub fn read_metadata(path: &Path, format: MetadataFormat) -> Result<Option<Metadata>> {
    if !path.exists() {
        debug!("No metadata file at {}", path.display());
        return Ok(None);
    }

    let content = fs::read_to_string(path).map_err(|e| ContribError::io(path, e))?;
    parse_metadata(&content, format).map_err(|message| ContribError::MalformedMetadata {
        path: path.to_path_buf(),
        message,
    })
}

/// Field values for a freshly scaffolded metadata descriptor.
#[derive(Debug, Clone)]
pub struct Descriptor<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub version: &'a str,
    pub license: &'a str,
    pub author_name: &'a str,
    pub author_email: &'a str,
    pub date: &'a str,
    pub dependencies: &'a [String],
}

#[derive(Serialize)]
struct PyprojectFile<'a> {
    project: ProjectTable<'a>,
}

#[derive(Serialize)]
struct ProjectTable<'a> {
    name: &'a str,
    description: &'a str,
    version: &'a str,
    license: &'a str,
    contact: &'a str,
    dependencies: &'a [String],
    authors: Vec<Author>,
}

#[derive(Serialize)]
struct LegacyMetadata<'a> {
    name: &'a str,
    description: &'a str,
    date: &'a str,
    contact: &'a str,
    version: &'a str,
    license: &'a str,
    dependencies: LegacyDependencies<'a>,
}

/// The legacy template writes `dependencies: ""` when there are none.
#[derive(Serialize)]
#[serde(untagged)]
enum LegacyDependencies<'a> {
    Empty(&'static str),
    List(&'a [String]),
}

impl Descriptor<'_> {
    pub fn render(&self, format: MetadataFormat) -> anyhow::Result<String> {
        let rendered = match format {
            MetadataFormat::Pyproject => toml::to_string(&PyprojectFile {
                project: ProjectTable {
                    name: self.name,
                    description: self.description,
                    version: self.version,
                    license: self.license,
                    contact: self.author_email,
                    dependencies: self.dependencies,
                    authors: vec![Author {
                        name: self.author_name.to_string(),
                        email: Some(self.author_email.to_string()),
                    }],
                },
            })?,
            MetadataFormat::Yaml => serde_yaml::to_string(&LegacyMetadata {
                name: self.name,
                description: self.description,
                date: self.date,
                contact: self.author_email,
                version: self.version,
                license: self.license,
                dependencies: if self.dependencies.is_empty() {
                    LegacyDependencies::Empty("")
                } else {
                    LegacyDependencies::List(self.dependencies)
                },
            })?,
        };
        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const VALID_YAML: &str = r#"name: "Valid Contribution"
description: "A valid contribution for testing."
date: "2025-04-01"
contact: "test@example.com"
version: "1.0.0"
license: "MIT"
dependencies: ["dependency1", "dependency2"]
"#;

    fn descriptor<'a>(deps: &'a [String]) -> Descriptor<'a> {
        Descriptor {
            name: "module1",
            description: "module1",
            version: "1.0.0",
            license: "CeCILL-C FREE SOFTWARE LICENSE AGREEMENT",
            author_name: "Contributor Name",
            author_email: "contributor1@example.com",
            date: "2025-04-01",
            dependencies: deps,
        }
    }

    #[test]
    fn test_format_from_str_aliases() {
        assert_eq!(
            MetadataFormat::from_str("pyproject").unwrap(),
            MetadataFormat::Pyproject
        );
        assert_eq!(
            MetadataFormat::from_str("TOML").unwrap(),
            MetadataFormat::Pyproject
        );
        assert_eq!(MetadataFormat::from_str("yml").unwrap(), MetadataFormat::Yaml);
        assert_eq!(
            MetadataFormat::from_str("legacy").unwrap(),
            MetadataFormat::Yaml
        );
        assert!(MetadataFormat::from_str("json").is_err());
    }

    #[test]
    fn test_default_required_fields_differ_on_date() {
        assert!(!MetadataFormat::Pyproject
            .default_required_fields()
            .contains(&"date".to_string()));
        assert!(MetadataFormat::Yaml
            .default_required_fields()
            .contains(&"date".to_string()));
    }

    #[test]
    fn test_parse_yaml_metadata() {
        let metadata = parse_metadata(VALID_YAML, MetadataFormat::Yaml)
            .unwrap()
            .unwrap();
        assert_eq!(metadata.name.as_deref(), Some("Valid Contribution"));
        assert_eq!(metadata.date.as_deref(), Some("2025-04-01"));
        assert_eq!(metadata.license.as_deref(), Some("MIT"));
        assert_eq!(
            metadata.dependencies,
            Some(vec!["dependency1".to_string(), "dependency2".to_string()])
        );
        assert!(metadata.extra.is_empty());
    }

    #[test]
    fn test_parse_yaml_unquoted_date_and_empty_dependencies() {
        let content = "name: foo\ndate: 2025-04-01\ndependencies: \"\"\n";
        let metadata = parse_metadata(content, MetadataFormat::Yaml)
            .unwrap()
            .unwrap();
        assert_eq!(metadata.date.as_deref(), Some("2025-04-01"));
        assert_eq!(metadata.dependencies, Some(vec![]));
        assert!(metadata.has_key("dependencies"));
    }

    #[test]
    fn test_parse_yaml_rejects_non_mapping() {
        assert!(parse_metadata("- a\n- b\n", MetadataFormat::Yaml).is_err());
        assert!(parse_metadata("", MetadataFormat::Yaml).is_err());
        assert!(parse_metadata("name: [unclosed\n", MetadataFormat::Yaml).is_err());
    }

    #[test]
    fn test_parse_pyproject_metadata() {
        let content = r#"
[build-system]
requires = ["setuptools"]

[project]
name = "test-package"
version = "1.0.0"
license = { text = "BSD-3-Clause" }
authors = [{ name = "Jane Doe", email = "jane@example.com" }]
dependencies = ["numpy", "torch"]
readme = "README.md"
"#;
        let metadata = parse_metadata(content, MetadataFormat::Pyproject)
            .unwrap()
            .unwrap();
        assert_eq!(metadata.name.as_deref(), Some("test-package"));
        assert_eq!(metadata.license.as_deref(), Some("BSD-3-Clause"));
        let authors = metadata.authors.as_ref().unwrap();
        assert_eq!(authors[0].name, "Jane Doe");
        assert_eq!(authors[0].email.as_deref(), Some("jane@example.com"));
        assert_eq!(
            metadata.extra.get("readme"),
            Some(&MetadataValue::Text("README.md".to_string()))
        );
        assert!(!metadata.has_key("build-system"));
    }

    #[test]
    fn test_parse_pyproject_without_project_section() {
        let content = "[tool.black]\nline-length = 100\n";
        assert_eq!(
            parse_metadata(content, MetadataFormat::Pyproject).unwrap(),
            None
        );
    }

    #[test]
    fn test_parse_pyproject_malformed() {
        assert!(parse_metadata("[project\nname = ", MetadataFormat::Pyproject).is_err());
        assert!(parse_metadata("project = 3\n", MetadataFormat::Pyproject).is_err());
    }

    #[test]
    fn test_keys_reflect_present_fields_only() {
        let metadata =
            parse_metadata("[project]\nname = \"incomplete\"\n", MetadataFormat::Pyproject)
                .unwrap()
                .unwrap();
        let keys: Vec<String> = metadata.keys().into_iter().collect();
        assert_eq!(keys, vec!["name".to_string()]);
    }

    #[test]
    fn test_table_rows_formats_authors_and_lists() {
        let content = r#"
[project]
name = "demo"
authors = [{ name = "Ada", email = "ada@example.com" }, { name = "Grace" }]
dependencies = ["numpy", "xarray"]
keywords = ["ocean", "4dvar"]
"#;
        let metadata = parse_metadata(content, MetadataFormat::Pyproject)
            .unwrap()
            .unwrap();
        let rows = metadata.table_rows();
        assert_eq!(
            rows,
            vec![
                ("name".to_string(), "demo".to_string()),
                ("authors".to_string(), "Ada, Grace".to_string()),
                ("dependencies".to_string(), "numpy, xarray".to_string()),
                ("keywords".to_string(), "ocean, 4dvar".to_string()),
            ]
        );
    }

    #[test]
    fn test_non_list_authors_kept_in_side_table() {
        let metadata = parse_metadata("authors: someone\n", MetadataFormat::Yaml)
            .unwrap()
            .unwrap();
        assert!(metadata.authors.is_none());
        assert!(metadata.has_key("authors"));
    }

    #[test]
    fn test_read_metadata_missing_file() {
        let tmp = TempDir::new().unwrap();
        let result = read_metadata(&tmp.path().join("pyproject.toml"), MetadataFormat::Pyproject);
        assert!(result.unwrap().is_none());
    }

    #[test]
    fn test_read_metadata_malformed_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("metadatas.yml");
        fs::write(&path, "name: \"unterminated\n  - : :\n").unwrap();
        let err = read_metadata(&path, MetadataFormat::Yaml).unwrap_err();
        assert!(matches!(err, ContribError::MalformedMetadata { .. }));
    }

    #[test]
    fn test_pyproject_descriptor_reads_back() {
        let deps = vec!["numpy".to_string(), "torch".to_string()];
        let content = descriptor(&deps).render(MetadataFormat::Pyproject).unwrap();
        assert!(content.contains("[project]"));
        assert!(content.contains("name = \"module1\""));
        assert!(content.contains("version = \"1.0.0\""));
        assert!(content.contains("license = \"CeCILL-C FREE SOFTWARE LICENSE AGREEMENT\""));

        let metadata = parse_metadata(&content, MetadataFormat::Pyproject)
            .unwrap()
            .unwrap();
        assert_eq!(metadata.contact.as_deref(), Some("contributor1@example.com"));
        let authors = metadata.authors.unwrap();
        assert_eq!(authors[0].name, "Contributor Name");
        assert_eq!(authors[0].email.as_deref(), Some("contributor1@example.com"));
        assert_eq!(metadata.dependencies.unwrap(), deps);
    }

    #[test]
    fn test_yaml_descriptor_reads_back() {
        let content = descriptor(&[]).render(MetadataFormat::Yaml).unwrap();
        let metadata = parse_metadata(&content, MetadataFormat::Yaml)
            .unwrap()
            .unwrap();
        assert_eq!(metadata.date.as_deref(), Some("2025-04-01"));
        assert_eq!(metadata.dependencies, Some(vec![]));
        for field in MetadataFormat::Yaml.default_required_fields() {
            assert!(metadata.has_key(&field), "missing {}", field);
        }
    }

    #[test]
    fn test_descriptor_keeps_special_characters() {
        let deps = vec!["numpy>=1.0 ; python_version > \"3.8\"".to_string()];
        for description in [
            "says \"hi\" \\ bye",
            "line one\rline two",
            "bell\u{7}",
            "tab\there\nand newline",
        ] {
            let mut d = descriptor(&deps);
            d.description = description;
            for format in [MetadataFormat::Pyproject, MetadataFormat::Yaml] {
                let content = d.render(format).unwrap();
                let metadata = parse_metadata(&content, format).unwrap().unwrap();
                assert_eq!(metadata.description.as_deref(), Some(description));
                assert_eq!(metadata.dependencies.as_ref(), Some(&deps));
            }
        }
    }
}
