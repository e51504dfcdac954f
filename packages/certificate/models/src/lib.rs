#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Certificate record types shared across the certificate roster toolchain.
//!
//! A certificate PDF is reduced to one [`ExtractedRecord`] per competency
//! unit it lists. Records are then widened with roster columns into
//! [`EnrichedRecord`]s, collected in an [`EnrichedTable`] that knows the
//! order of its reference columns.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Export header for the holder name. Also the roster's join key column.
pub const NAME_COLUMN: &str = "Name";
/// Export header for the certificate number. Also the roster's secondary
/// key column.
pub const CERTIFICATE_NUMBER_COLUMN: &str = "Certificate Number";
/// Export header for the issue date.
pub const ISSUE_DATE_COLUMN: &str = "Date of Issue";
/// Export header for the competency unit code.
pub const UNIT_CODE_COLUMN: &str = "Course Code";
/// Export header for the free text trailing a unit code.
pub const UNIT_DESCRIPTION_COLUMN: &str = "Unit Description";
/// Export header for the catalog display name of a unit code.
pub const UNIT_NAME_COLUMN: &str = "Course Name";
/// Export header for the originating document identifier.
pub const SOURCE_COLUMN: &str = "Source";

/// Roster headers that act as join keys and are therefore never copied
/// into the reference columns of an enriched row.
pub const KEY_COLUMNS: &[&str] = &[NAME_COLUMN, CERTIFICATE_NUMBER_COLUMN];

/// One competency unit found in one certificate document.
///
/// Every record produced from the same document carries identical
/// `holder_name`, `certificate_number` and `issue_date` values. Fields that
/// could not be located are `None` and are rendered through an absent
/// marker at output time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedRecord {
    /// Identifier of the document the record was extracted from (usually
    /// the file name).
    pub source_id: String,
    /// Holder name following `This is a statement that:`.
    pub holder_name: Option<String>,
    /// Token following `Certificate Number:`.
    pub certificate_number: Option<String>,
    /// Issue date in its textual `D[D]-MMM-YY` form.
    pub issue_date: Option<String>,
    /// Competency unit code (e.g. `RIIWHS201E`).
    pub unit_code: String,
    /// Text trailing the unit code on its line. Empty when none.
    pub unit_description: String,
    /// Display name from the unit catalog. Empty when the code is unknown
    /// or no catalog was supplied.
    pub unit_name: String,
}

impl ExtractedRecord {
    /// Holder name, or `marker` when it was not found.
    #[must_use]
    pub fn holder_name_or<'a>(&'a self, marker: &'a str) -> &'a str {
        self.holder_name.as_deref().unwrap_or(marker)
    }

    /// Certificate number, or `marker` when it was not found.
    #[must_use]
    pub fn certificate_number_or<'a>(&'a self, marker: &'a str) -> &'a str {
        self.certificate_number.as_deref().unwrap_or(marker)
    }

    /// Issue date, or `marker` when it was not found.
    #[must_use]
    pub fn issue_date_or<'a>(&'a self, marker: &'a str) -> &'a str {
        self.issue_date.as_deref().unwrap_or(marker)
    }
}

/// An [`ExtractedRecord`] widened with the reference columns of the roster
/// row it was joined to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedRecord {
    /// The extracted certificate fields.
    pub record: ExtractedRecord,
    /// One value per [`EnrichedTable::reference_columns`] entry, in the same
    /// order. All empty strings when no roster row matched.
    pub reference: Vec<String>,
    /// Whether a roster row matched this record.
    pub matched: bool,
}

/// The result of cross-referencing extracted records against a roster.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichedTable {
    /// Roster columns appended to every row, in roster file order.
    pub reference_columns: Vec<String>,
    /// Enriched rows, in extraction order.
    pub rows: Vec<EnrichedRecord>,
}

impl EnrichedTable {
    /// Number of rows in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of rows that matched a roster row.
    #[must_use]
    pub fn matched_count(&self) -> usize {
        self.rows.iter().filter(|row| row.matched).count()
    }

    /// Looks up a reference column value for the row at `index`.
    ///
    /// Returns `None` if the row or the column does not exist.
    #[must_use]
    pub fn reference_value(&self, index: usize, column: &str) -> Option<&str> {
        let position = self.reference_columns.iter().position(|c| c == column)?;
        self.rows
            .get(index)
            .and_then(|row| row.reference.get(position))
            .map(String::as_str)
    }
}

/// Lookup from competency unit code to its display name.
///
/// Unknown codes resolve to an empty name rather than an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitCatalog {
    names: BTreeMap<String, String>,
}

impl UnitCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            names: BTreeMap::new(),
        }
    }

    /// Adds or replaces the display name for `code`.
    pub fn insert(&mut self, code: impl Into<String>, name: impl Into<String>) {
        self.names.insert(code.into(), name.into());
    }

    /// Display name for `code`, or `""` if the code is not in the catalog.
    #[must_use]
    pub fn name_for(&self, code: &str) -> &str {
        self.names.get(code).map_or("", String::as_str)
    }

    /// Number of codes in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the catalog has no codes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl FromIterator<(String, String)> for UnitCatalog {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}

/// How extracted records are matched against roster rows.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum JoinStrategy {
    /// Match when the holder name equals the roster `Name`.
    #[default]
    Name,
    /// Match when either the holder name equals the roster `Name` or the
    /// certificate number equals the roster `Certificate Number`.
    NameOrCertificate,
}

impl JoinStrategy {
    /// All strategies, in menu order.
    pub const ALL: &[Self] = &[Self::Name, Self::NameOrCertificate];

    /// Human-readable label for prompts.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "Holder name",
            Self::NameOrCertificate => "Holder name or certificate number",
        }
    }
}
