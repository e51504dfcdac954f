//! Unit catalog loading.
//!
//! The catalog file has a header row and two columns: the course display
//! name first, the unit code second. Later rows override earlier rows with
//! the same code.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use cert_roster_certificate_models::UnitCatalog;

use crate::RosterError;

/// Parses a unit catalog from `reader`.
///
/// # Errors
///
/// Returns [`RosterError::MissingColumn`] if the header has fewer than two
/// columns, or [`RosterError::Csv`] if the input is malformed.
pub fn parse_unit_catalog<R: Read>(
    reader: R,
    delimiter: u8,
) -> Result<UnitCatalog, RosterError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(reader);

    if reader.headers()?.len() < 2 {
        return Err(RosterError::MissingColumn(
            "unit catalog needs a name column and a code column".to_owned(),
        ));
    }

    let mut catalog = UnitCatalog::new();

    for result in reader.records() {
        let record = result?;
        let name = record.get(0).unwrap_or("").trim();
        let code = record.get(1).unwrap_or("").trim();
        if code.is_empty() {
            continue;
        }
        catalog.insert(code, name);
    }

    Ok(catalog)
}

/// Loads the unit catalog at `path`.
///
/// # Errors
///
/// Returns [`RosterError::NotFound`] if the file does not exist, or the
/// errors of [`parse_unit_catalog`].
pub fn load_unit_catalog(path: &Path, delimiter: u8) -> Result<UnitCatalog, RosterError> {
    if !path.exists() {
        return Err(RosterError::NotFound(path.to_path_buf()));
    }

    let catalog = parse_unit_catalog(File::open(path)?, delimiter)?;
    log::info!(
        "Loaded {} unit name(s) from {}",
        catalog.len(),
        path.display()
    );

    Ok(catalog)
}
