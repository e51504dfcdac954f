//! Delimited-text export of an [`EnrichedTable`].
//!
//! Column order: `Name, Certificate Number, Date of Issue, Course Code`,
//! then the optional `Unit Description` and `Course Name` columns, then the
//! reference columns, then the optional `Source` column.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use cert_roster_certificate_models::{
    CERTIFICATE_NUMBER_COLUMN, EnrichedRecord, EnrichedTable, ISSUE_DATE_COLUMN, NAME_COLUMN,
    SOURCE_COLUMN, UNIT_CODE_COLUMN, UNIT_DESCRIPTION_COLUMN, UNIT_NAME_COLUMN,
};

use crate::PipelineError;

/// Which optional columns to write and how to render absent fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportOptions {
    /// Written in place of a field that could not be located.
    pub absent_marker: String,
    /// Include the `Unit Description` column.
    pub include_descriptions: bool,
    /// Include the `Course Name` column.
    pub include_unit_names: bool,
    /// Include the trailing `Source` column.
    pub include_source: bool,
}

/// Header row for `table` under `options`.
#[must_use]
pub fn header(table: &EnrichedTable, options: &ExportOptions) -> Vec<String> {
    let mut columns: Vec<String> = [
        NAME_COLUMN,
        CERTIFICATE_NUMBER_COLUMN,
        ISSUE_DATE_COLUMN,
        UNIT_CODE_COLUMN,
    ]
    .iter()
    .map(|&c| c.to_owned())
    .collect();

    if options.include_descriptions {
        columns.push(UNIT_DESCRIPTION_COLUMN.to_owned());
    }
    if options.include_unit_names {
        columns.push(UNIT_NAME_COLUMN.to_owned());
    }
    columns.extend(table.reference_columns.iter().cloned());
    if options.include_source {
        columns.push(SOURCE_COLUMN.to_owned());
    }

    columns
}

/// Cell values of one row, aligned with [`header`].
#[must_use]
pub fn row_values(row: &EnrichedRecord, options: &ExportOptions) -> Vec<String> {
    let marker = options.absent_marker.as_str();
    let record = &row.record;

    let mut values = vec![
        record.holder_name_or(marker).to_owned(),
        record.certificate_number_or(marker).to_owned(),
        record.issue_date_or(marker).to_owned(),
        record.unit_code.clone(),
    ];

    if options.include_descriptions {
        values.push(record.unit_description.clone());
    }
    if options.include_unit_names {
        values.push(record.unit_name.clone());
    }
    values.extend(row.reference.iter().cloned());
    if options.include_source {
        values.push(record.source_id.clone());
    }

    values
}

fn write_table<W: Write>(
    writer: &mut csv::Writer<W>,
    table: &EnrichedTable,
    options: &ExportOptions,
) -> Result<(), csv::Error> {
    writer.write_record(header(table, options))?;
    for row in &table.rows {
        writer.write_record(row_values(row, options))?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes `table` to `path` as comma-separated UTF-8, replacing any
/// existing file.
///
/// # Errors
///
/// Returns [`PipelineError::Output`] if the file cannot be created or
/// written.
pub fn write_csv(
    table: &EnrichedTable,
    path: &Path,
    options: &ExportOptions,
) -> Result<(), PipelineError> {
    let output_error = |source: csv::Error| PipelineError::Output {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(|e| output_error(e.into()))?;
    let mut writer = csv::Writer::from_writer(file);
    write_table(&mut writer, table, options).map_err(output_error)?;

    log::info!("Wrote {} row(s) to {}", table.len(), path.display());

    Ok(())
}

/// Renders `table` as comma-separated UTF-8 bytes, the form offered for
/// download.
///
/// # Errors
///
/// Returns [`PipelineError::Csv`] if serialization fails.
pub fn to_csv_bytes(
    table: &EnrichedTable,
    options: &ExportOptions,
) -> Result<Vec<u8>, PipelineError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    write_table(&mut writer, table, options)?;
    writer
        .into_inner()
        .map_err(|e| PipelineError::Io(e.into_error()))
}
