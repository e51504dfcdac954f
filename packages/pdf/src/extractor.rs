//! Turns certificate text into one record per competency unit.

use cert_roster_certificate_models::{ExtractedRecord, UnitCatalog};

use crate::fields::{find_units, locate_fields};

/// Extracts [`ExtractedRecord`]s from certificate text, optionally naming
/// units through a [`UnitCatalog`].
#[derive(Debug, Clone, Default)]
pub struct FieldExtractor {
    catalog: Option<UnitCatalog>,
}

impl FieldExtractor {
    /// Creates an extractor without a unit catalog.
    #[must_use]
    pub const fn new() -> Self {
        Self { catalog: None }
    }

    /// Names units through `catalog`.
    #[must_use]
    pub fn with_catalog(mut self, catalog: UnitCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Whether a unit catalog is attached.
    #[must_use]
    pub const fn has_catalog(&self) -> bool {
        self.catalog.is_some()
    }

    /// Extracts one record per unit code found in `text`.
    ///
    /// Header fields are located once and copied onto every record. A
    /// document without unit codes yields no records at all, even when its
    /// header fields were found.
    #[must_use]
    pub fn extract(&self, source_id: &str, text: &str) -> Vec<ExtractedRecord> {
        let units = find_units(text);
        if units.is_empty() {
            log::debug!("[{source_id}] No unit codes found, emitting no records");
            return Vec::new();
        }

        let fields = locate_fields(text);
        log::debug!(
            "[{source_id}] name={:?} certificate={:?} issued={:?} units={} catalog={}",
            fields.holder_name,
            fields.certificate_number,
            fields.issue_date,
            units.len(),
            self.has_catalog()
        );

        units
            .into_iter()
            .map(|unit| ExtractedRecord {
                source_id: source_id.to_owned(),
                holder_name: fields.holder_name.clone(),
                certificate_number: fields.certificate_number.clone(),
                issue_date: fields.issue_date.clone(),
                unit_name: self
                    .catalog
                    .as_ref()
                    .map(|c| c.name_for(&unit.code).to_owned())
                    .unwrap_or_default(),
                unit_code: unit.code,
                unit_description: unit.description,
            })
            .collect()
    }
}
