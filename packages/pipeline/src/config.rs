//! Pipeline configuration.
//!
//! Everything a batch run needs is passed in explicitly through
//! [`PipelineConfig`]. It can be loaded from a TOML file; every key is
//! optional and falls back to the defaults below.
//!
//! ```toml
//! documents_dir = "./certificates"
//! reference = "clients.csv"
//! catalog = "courses.csv"
//! output = "compiled_data.csv"
//! join = "name-or-certificate"
//! absent_marker = "N/A"
//! ```

use std::path::{Path, PathBuf};

use cert_roster_certificate_models::JoinStrategy;
use serde::Deserialize;

use crate::PipelineError;
use crate::export::ExportOptions;
use crate::source::{DirectorySource, DocumentSource, FileListSource};

/// Default export path.
pub const DEFAULT_OUTPUT: &str = "compiled_data.csv";

/// Configuration for one batch run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
#[allow(clippy::struct_excessive_bools)]
pub struct PipelineConfig {
    /// Directory scanned for `.pdf` files.
    pub documents_dir: Option<PathBuf>,
    /// Explicit PDF files, used instead of `documents_dir`.
    pub documents: Vec<PathBuf>,
    /// Reference roster file.
    pub reference: Option<PathBuf>,
    /// Unit catalog file (course name, unit code).
    pub catalog: Option<PathBuf>,
    /// Export path. Overwritten on every run.
    pub output: PathBuf,
    /// How records are matched against the roster.
    pub join: JoinStrategy,
    /// Written in place of fields that could not be located.
    pub absent_marker: String,
    /// Export the text trailing each unit code.
    pub include_descriptions: bool,
    /// Export the originating document of each row.
    pub include_source: bool,
    /// Reference columns used when no roster could be loaded.
    pub fallback_reference_columns: Vec<String>,
    /// Field delimiter of the roster and catalog files.
    pub delimiter: char,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            documents_dir: None,
            documents: Vec::new(),
            reference: None,
            catalog: None,
            output: PathBuf::from(DEFAULT_OUTPUT),
            join: JoinStrategy::default(),
            absent_marker: String::new(),
            include_descriptions: false,
            include_source: false,
            fallback_reference_columns: vec!["DOB".to_owned(), "Email".to_owned()],
            delimiter: ',',
        }
    }
}

impl PipelineConfig {
    /// Parses a configuration from TOML.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] if the TOML is malformed or has
    /// unknown keys.
    pub fn from_toml(toml_str: &str) -> Result<Self, PipelineError> {
        toml::from_str(toml_str).map_err(|e| PipelineError::Config(e.to_string()))
    }

    /// Loads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Io`] if the file cannot be read, or the
    /// errors of [`Self::from_toml`].
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let toml_str = std::fs::read_to_string(path)?;
        log::debug!("Loaded configuration from {}", path.display());
        Self::from_toml(&toml_str)
    }

    /// The delimiter as a single byte.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] if the delimiter is not ASCII.
    pub fn delimiter_byte(&self) -> Result<u8, PipelineError> {
        u8::try_from(self.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| {
                PipelineError::Config(format!(
                    "delimiter must be a single ASCII character, got {:?}",
                    self.delimiter
                ))
            })
    }

    /// Builds the document source described by this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] if both or neither of
    /// `documents_dir` and `documents` are set.
    pub fn document_source(&self) -> Result<Box<dyn DocumentSource>, PipelineError> {
        match (&self.documents_dir, self.documents.is_empty()) {
            (Some(dir), true) => Ok(Box::new(DirectorySource::new(dir.clone()))),
            (None, false) => Ok(Box::new(FileListSource::new(self.documents.clone()))),
            (Some(_), false) => Err(PipelineError::Config(
                "set either documents_dir or documents, not both".to_owned(),
            )),
            (None, true) => Err(PipelineError::Config(
                "no documents configured (set documents_dir or documents)".to_owned(),
            )),
        }
    }

    /// Export options implied by this configuration. The `Course Name`
    /// column is present whenever a catalog is configured.
    #[must_use]
    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            absent_marker: self.absent_marker.clone(),
            include_descriptions: self.include_descriptions,
            include_unit_names: self.catalog.is_some(),
            include_source: self.include_source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_uses_defaults() {
        let config = PipelineConfig::from_toml("").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.output, PathBuf::from("compiled_data.csv"));
        assert_eq!(config.fallback_reference_columns, ["DOB", "Email"]);
        assert_eq!(config.delimiter_byte().unwrap(), b',');
    }

    #[test]
    fn parses_full_config() {
        let config = PipelineConfig::from_toml(
            r#"
            documents_dir = "./certificates"
            reference = "database.csv"
            catalog = "courses.csv"
            output = "certificates.csv"
            join = "name-or-certificate"
            absent_marker = "N/A"
            include_descriptions = true
            delimiter = ";"
            "#,
        )
        .unwrap();

        assert_eq!(config.join, JoinStrategy::NameOrCertificate);
        assert_eq!(config.absent_marker, "N/A");
        assert_eq!(config.delimiter_byte().unwrap(), b';');
        let options = config.export_options();
        assert!(options.include_descriptions);
        assert!(options.include_unit_names);
        assert!(!options.include_source);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(
            PipelineConfig::from_toml("pdf_directory = \"x\""),
            Err(PipelineError::Config(_))
        ));
    }

    #[test]
    fn non_ascii_delimiter_is_rejected() {
        let config = PipelineConfig {
            delimiter: '§',
            ..PipelineConfig::default()
        };
        assert!(config.delimiter_byte().is_err());
    }

    #[test]
    fn document_source_requires_exactly_one_input() {
        assert!(PipelineConfig::default().document_source().is_err());

        let both = PipelineConfig {
            documents_dir: Some(PathBuf::from("certs")),
            documents: vec![PathBuf::from("a.pdf")],
            ..PipelineConfig::default()
        };
        assert!(both.document_source().is_err());

        let files = PipelineConfig {
            documents: vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")],
            ..PipelineConfig::default()
        };
        assert_eq!(files.document_source().unwrap().label(), "2 selected file(s)");
    }
}
