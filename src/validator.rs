use anyhow::Result;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::ContribError;
use crate::metadata::{read_metadata, Metadata};
use crate::util::list_subdirs;

/// Required fields absent from `metadata`, in the order of `required`.
pub fn missing_fields(metadata: &Metadata, required: &[String]) -> Vec<String> {
    let keys = metadata.keys();
    required
        .iter()
        .filter(|field| !keys.contains(field.as_str()))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// Every required field is present
    Valid,
    /// The metadata file is readable but lacks these fields
    MissingFields(Vec<String>),
    /// No metadata file, or no metadata section in it
    MissingMetadata,
    /// The metadata file could not be read or parsed
    Malformed(String),
}

#[derive(Debug, Clone)]
pub struct ContribValidation {
    pub contribution: String,
    pub verdict: Verdict,
}

impl ContribValidation {
    pub fn is_valid(&self) -> bool {
        self.verdict == Verdict::Valid
    }

    /// Required fields reported missing. Empty unless the verdict is
    /// `MissingFields`.
    pub fn missing(&self) -> &[String] {
        match &self.verdict {
            Verdict::MissingFields(fields) => fields,
            _ => &[],
        }
    }

    pub fn message(&self) -> String {
        match &self.verdict {
            Verdict::Valid => format!("Metadata for {} is valid.", self.contribution),
            Verdict::MissingFields(fields) => format!(
                "Missing required fields in {}: {}",
                self.contribution,
                fields.join(", ")
            ),
            Verdict::MissingMetadata => {
                format!("Missing contribution info file in {}", self.contribution)
            }
            Verdict::Malformed(err) => {
                format!("Error parsing metadata in {}: {}", self.contribution, err)
            }
        }
    }
}

/// Results of validating every contribution. Never short-circuited.
#[derive(Debug, Clone, Default)]
pub struct BatchValidation {
    pub results: Vec<ContribValidation>,
}

impl BatchValidation {
    pub fn all_valid(&self) -> bool {
        self.results.iter().all(ContribValidation::is_valid)
    }

    pub fn invalid(&self) -> impl Iterator<Item = &ContribValidation> {
        self.results.iter().filter(|r| !r.is_valid())
    }
}

pub struct ContributionValidator<'a> {
    config: &'a Config,
    required: Vec<String>,
}

impl<'a> ContributionValidator<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            required: config.metadata.get_required_fields(),
        }
    }

    pub fn required_fields(&self) -> &[String] {
        &self.required
    }

    pub fn check(&self, metadata: &Metadata) -> Verdict {
        let missing = missing_fields(metadata, &self.required);
        if missing.is_empty() {
            Verdict::Valid
        } else {
            Verdict::MissingFields(missing)
        }
    }

    /// Validate a single contribution by name.
    pub fn validate(&self, name: &str) -> ContribValidation {
        let path = self.config.metadata_path(name);
        debug!("Validating {}", path.display());

        let verdict = match read_metadata(&path, self.config.metadata_format()) {
            Ok(Some(metadata)) => self.check(&metadata),
            Ok(None) => Verdict::MissingMetadata,
            Err(ContribError::MalformedMetadata { message, .. }) => {
                warn!("Malformed metadata in {}: {}", name, message);
                Verdict::Malformed(message)
            }
            Err(e) => {
                warn!("Could not read metadata for {}: {}", name, e);
                Verdict::Malformed(e.to_string())
            }
        };

        ContribValidation {
            contribution: name.to_string(),
            verdict,
        }
    }

    /// Validate every contribution directory. A failure never stops the
    /// remaining checks.
    pub fn validate_all(&self) -> Result<BatchValidation> {
        let names = list_subdirs(&self.config.paths.contrib_dir)?;
        let results = names.iter().map(|name| self.validate(name)).collect();
        Ok(BatchValidation { results })
    }
}

pub fn print_results(results: &[ContribValidation]) {
    if results.is_empty() {
        println!("No contributions found.");
        return;
    }

    for result in results {
        let mark = if result.is_valid() { "ok" } else { "FAIL" };
        println!("[{}] {}", mark, result.message());
    }

    let invalid = results.iter().filter(|r| !r.is_valid()).count();
    println!(
        "\nSummary: {} valid, {} invalid",
        results.len() - invalid,
        invalid
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{parse_metadata, MetadataFormat};
    use std::fs;
    use tempfile::TempDir;

    fn required(fields: &[&str]) -> Vec<String> {
        fields.iter().map(|f| f.to_string()).collect()
    }

    #[test]
    fn test_missing_fields_is_exact_difference() {
        let metadata = parse_metadata(
            "name: a\nversion: 1.0.0\nextra: x\n",
            MetadataFormat::Yaml,
        )
        .unwrap()
        .unwrap();
        let r = required(&["name", "description", "date", "version", "license"]);
        assert_eq!(
            missing_fields(&metadata, &r),
            vec!["description", "date", "license"]
        );
    }

    #[test]
    fn test_missing_fields_empty_when_complete() {
        let metadata = parse_metadata(
            "name: a\ndescription: b\ncontact: c\nversion: d\nlicense: e\n",
            MetadataFormat::Yaml,
        )
        .unwrap()
        .unwrap();
        let r = MetadataFormat::Pyproject.default_required_fields();
        assert!(missing_fields(&metadata, &r).is_empty());
    }

    #[test]
    fn test_present_but_empty_field_counts_as_present() {
        let metadata = parse_metadata("name: \"\"\ncontact:\n", MetadataFormat::Yaml)
            .unwrap()
            .unwrap();
        assert!(missing_fields(&metadata, &required(&["name", "contact"])).is_empty());
    }

    #[test]
    fn test_validate_missing_metadata_file() {
        let tmp = TempDir::new().unwrap();
        let config = Config::rooted_at(tmp.path());
        fs::create_dir_all(config.contribution_dir("empty")).unwrap();

        let result = ContributionValidator::new(&config).validate("empty");
        assert_eq!(result.verdict, Verdict::MissingMetadata);
        assert!(!result.is_valid());
        assert!(result.message().contains("Missing contribution info file"));
    }

    #[test]
    fn test_validate_incomplete_pyproject() {
        let tmp = TempDir::new().unwrap();
        let config = Config::rooted_at(tmp.path());
        fs::create_dir_all(config.contribution_dir("incomplete")).unwrap();
        fs::write(
            config.metadata_path("incomplete"),
            "[project]\nname = \"incomplete\"\n",
        )
        .unwrap();

        let result = ContributionValidator::new(&config).validate("incomplete");
        assert_eq!(
            result.missing(),
            &["description", "contact", "version", "license"]
        );
        assert!(result.message().starts_with("Missing required fields in incomplete"));
    }

    #[test]
    fn test_validate_malformed_yaml() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::rooted_at(tmp.path());
        config.metadata.format = MetadataFormat::Yaml;
        fs::create_dir_all(config.contribution_dir("broken")).unwrap();
        fs::write(config.metadata_path("broken"), "name: [oops\n").unwrap();

        let result = ContributionValidator::new(&config).validate("broken");
        assert!(matches!(result.verdict, Verdict::Malformed(_)));
    }

    #[test]
    fn test_validate_all_is_exhaustive() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::rooted_at(tmp.path());
        config.metadata.format = MetadataFormat::Yaml;

        // a_broken sorts first and must not stop the others
        fs::create_dir_all(config.contribution_dir("a_broken")).unwrap();
        fs::write(config.metadata_path("a_broken"), "name: [oops\n").unwrap();
        fs::create_dir_all(config.contribution_dir("b_missing")).unwrap();
        fs::create_dir_all(config.contribution_dir("c_valid")).unwrap();
        fs::write(
            config.metadata_path("c_valid"),
            "name: \"valid_contrib\"\ndescription: \"A valid contribution\"\ndate: \"2025-04-01\"\ncontact: \"contributor1@example.com\"\nversion: \"1.0.0\"\nlicense: \"CeCILL-C FREE SOFTWARE LICENSE AGREEMENT\"\ndependencies: \"\"\n",
        )
        .unwrap();

        let batch = ContributionValidator::new(&config).validate_all().unwrap();
        assert_eq!(batch.results.len(), 3);
        assert!(!batch.all_valid());
        assert_eq!(batch.invalid().count(), 2);
        assert!(batch.results[2].is_valid());
    }

    #[test]
    fn test_validate_all_missing_root_is_vacuously_valid() {
        let tmp = TempDir::new().unwrap();
        let config = Config::rooted_at(tmp.path());
        let batch = ContributionValidator::new(&config).validate_all().unwrap();
        assert!(batch.results.is_empty());
        assert!(batch.all_valid());
    }
}
