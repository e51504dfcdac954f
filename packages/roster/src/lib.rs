#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Reference roster loading and certificate cross-referencing.
//!
//! The roster is a delimited text file with at least a `Name` column. It is
//! loaded in full into a [`ReferenceTable`] and joined against extracted
//! certificate records with [`join::enrich`], a left join that never drops
//! an extracted record. The optional unit catalog (unit code to course
//! name) is loaded by [`catalog::load_unit_catalog`].

pub mod catalog;
pub mod join;

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use cert_roster_certificate_models::{
    CERTIFICATE_NUMBER_COLUMN, JoinStrategy, KEY_COLUMNS, NAME_COLUMN,
};

pub use catalog::load_unit_catalog;
pub use join::{enrich, enrich_without_reference};

/// Errors that can occur while loading roster files.
#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    /// The file does not exist.
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    /// A required column is missing.
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// CSV parsing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The reference roster: a header row plus string cells.
///
/// Every row has exactly one cell per header. Name uniqueness is not
/// enforced; lookups resolve to the first matching row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl ReferenceTable {
    /// Builds a table, padding or truncating rows to the header width.
    #[must_use]
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Self { headers, rows }
    }

    /// Parses a delimited roster from `reader`. Headers and cells are
    /// trimmed; short rows are padded with empty cells.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::Csv`] if the input is not valid delimited
    /// text.
    pub fn from_reader<R: Read>(reader: R, delimiter: u8) -> Result<Self, RosterError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().trim_start_matches('\u{feff}').to_owned())
            .collect();

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            rows.push(record.iter().map(|v| v.trim().to_owned()).collect());
        }

        Ok(Self::new(headers, rows))
    }

    /// Loads the roster file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::NotFound`] if the file does not exist, or the
    /// errors of [`Self::from_reader`].
    pub fn load(path: &Path, delimiter: u8) -> Result<Self, RosterError> {
        if !path.exists() {
            return Err(RosterError::NotFound(path.to_path_buf()));
        }

        let table = Self::from_reader(File::open(path)?, delimiter)?;

        log::info!(
            "Loaded {} roster row(s) with columns [{}] from {}",
            table.len(),
            table.headers.join(", "),
            path.display()
        );

        Ok(table)
    }

    /// Column headers in file order.
    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Data rows in file order.
    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of data rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no data rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the first column named `name`.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Key columns `strategy` joins on that this roster lacks.
    #[must_use]
    pub fn missing_key_columns(&self, strategy: JoinStrategy) -> Vec<&'static str> {
        let keys: &[&'static str] = match strategy {
            JoinStrategy::Name => &[NAME_COLUMN],
            JoinStrategy::NameOrCertificate => &[NAME_COLUMN, CERTIFICATE_NUMBER_COLUMN],
        };
        keys.iter()
            .copied()
            .filter(|key| self.column_index(key).is_none())
            .collect()
    }

    /// Indices of the columns copied onto enriched rows: every column that
    /// is not a join key.
    #[must_use]
    pub fn reference_column_indices(&self) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .filter(|(_, h)| !KEY_COLUMNS.contains(&h.as_str()))
            .map(|(i, _)| i)
            .collect()
    }

    /// Names of the columns copied onto enriched rows.
    #[must_use]
    pub fn reference_columns(&self) -> Vec<String> {
        self.reference_column_indices()
            .into_iter()
            .map(|i| self.headers[i].clone())
            .collect()
    }
}
