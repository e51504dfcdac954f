#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Certificate batch pipeline.
//!
//! One pipeline serves every input mode: a [`source::DocumentSource`]
//! (directory scan, explicit file list, or in-memory uploads) feeds
//! documents to [`aggregate::collect_records`], the records are joined
//! against the reference roster, and the result is exported with
//! [`export::write_csv`]. [`run_batch`] chains all of it from a
//! [`config::PipelineConfig`].
//!
//! Only an empty batch or a failure to write the export is fatal. Every
//! other problem (unreadable documents, missing roster, missing catalog)
//! is logged, recorded in the [`BatchReport`], and bypassed.

pub mod aggregate;
pub mod config;
pub mod export;
pub mod progress;
pub mod source;

use std::path::PathBuf;
use std::sync::Arc;

use cert_roster_certificate_models::{EnrichedTable, ExtractedRecord, UnitCatalog};
use cert_roster_pdf::FieldExtractor;
use cert_roster_roster::{ReferenceTable, RosterError, enrich, enrich_without_reference};

use crate::aggregate::{CancelToken, DocumentFailure, collect_records};
use crate::config::PipelineConfig;
use crate::progress::ProgressCallback;
use crate::source::DocumentSource;

/// Errors that abort a batch run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The document source yielded no documents.
    #[error("No documents to process in {0}")]
    NoDocuments(String),

    /// The document source could not be enumerated.
    #[error("Document source error: {0}")]
    Source(String),

    /// The configuration is invalid.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Writing the export failed.
    #[error("Failed to write {}: {source}", path.display())]
    Output {
        /// The export path.
        path: PathBuf,
        /// The underlying write error.
        #[source]
        source: csv::Error,
    },

    /// CSV serialization failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// What happened during a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Description of the document source.
    pub source_label: String,
    /// Documents enumerated by the source.
    pub documents_seen: usize,
    /// Documents that produced text.
    pub documents_processed: usize,
    /// Documents that produced text but no unit codes.
    pub documents_without_units: Vec<String>,
    /// Documents skipped because their text could not be produced.
    pub failures: Vec<DocumentFailure>,
    /// Rows in the final table.
    pub records: usize,
    /// Rows that matched a roster row.
    pub matched: usize,
    /// Whether the batch was cancelled before every document was read.
    pub cancelled: bool,
    /// Non-fatal problems with the roster or catalog.
    pub warnings: Vec<String>,
    /// Where the export was written, if it was.
    pub output: Option<PathBuf>,
}

/// The enriched table of a batch run plus its report.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    /// The cross-referenced records.
    pub table: EnrichedTable,
    /// What happened along the way.
    pub report: BatchReport,
}

fn load_catalog(
    config: &PipelineConfig,
    delimiter: u8,
    warnings: &mut Vec<String>,
) -> Option<UnitCatalog> {
    let path = config.catalog.as_ref()?;
    match cert_roster_roster::load_unit_catalog(path, delimiter) {
        Ok(catalog) => Some(catalog),
        Err(e) => {
            let warning = format!("Unit catalog unavailable, course names left empty: {e}");
            log::warn!("{warning}");
            warnings.push(warning);
            Some(UnitCatalog::new())
        }
    }
}

/// Joins `records` against the configured roster, degrading to empty
/// fallback reference columns when the roster is missing, unreadable or
/// has no header row.
fn cross_reference(
    records: Vec<ExtractedRecord>,
    config: &PipelineConfig,
    delimiter: u8,
    warnings: &mut Vec<String>,
) -> EnrichedTable {
    let Some(path) = &config.reference else {
        log::info!("No reference roster configured, reference columns left empty");
        return enrich_without_reference(records, &config.fallback_reference_columns);
    };

    match ReferenceTable::load(path, delimiter) {
        Ok(table) if table.headers().is_empty() => {
            let warning = format!("Reference roster {} has no header row", path.display());
            log::warn!("{warning}");
            warnings.push(warning);
            enrich_without_reference(records, &config.fallback_reference_columns)
        }
        Ok(table) => {
            if table.is_empty() {
                let warning = format!("Reference roster {} has no rows", path.display());
                log::warn!("{warning}");
                warnings.push(warning);
            }
            for column in table.missing_key_columns(config.join) {
                let warning = format!(
                    "Reference roster {} has no '{column}' column, nothing will match on it",
                    path.display()
                );
                log::warn!("{warning}");
                warnings.push(warning);
            }
            enrich(records, &table, config.join)
        }
        Err(e) => {
            let warning = match &e {
                RosterError::NotFound(_) => format!("Reference roster missing: {e}"),
                _ => format!("Reference roster unreadable: {e}"),
            };
            log::warn!("{warning}");
            warnings.push(warning);
            enrich_without_reference(records, &config.fallback_reference_columns)
        }
    }
}

/// Extracts, aggregates and cross-references every document of `source`
/// without writing an export.
///
/// # Errors
///
/// Returns [`PipelineError::NoDocuments`] if the source is empty, and
/// [`PipelineError::Source`] or [`PipelineError::Config`] if the source or
/// delimiter is unusable.
pub fn process(
    config: &PipelineConfig,
    source: &dyn DocumentSource,
    progress: &Arc<dyn ProgressCallback>,
    cancel: Option<&CancelToken>,
) -> Result<BatchOutcome, PipelineError> {
    let delimiter = config.delimiter_byte()?;
    let label = source.label();
    let documents = source.documents()?;

    if documents.is_empty() {
        return Err(PipelineError::NoDocuments(label));
    }

    log::info!("Processing {} document(s) from {label}", documents.len());

    let mut report = BatchReport {
        source_label: label,
        documents_seen: documents.len(),
        ..BatchReport::default()
    };

    let mut extractor = FieldExtractor::new();
    if let Some(catalog) = load_catalog(config, delimiter, &mut report.warnings) {
        extractor = extractor.with_catalog(catalog);
    }

    let collection = collect_records(documents, &extractor, progress, cancel);
    progress.finish(format!(
        "{} record(s) from {} document(s)",
        collection.records.len(),
        collection.documents_processed
    ));

    let table = cross_reference(collection.records, config, delimiter, &mut report.warnings);

    report.documents_processed = collection.documents_processed;
    report.documents_without_units = collection.documents_without_units;
    report.failures = collection.failures;
    report.cancelled = collection.cancelled;
    report.records = table.len();
    report.matched = table.matched_count();

    Ok(BatchOutcome { table, report })
}

/// Runs a full batch and writes the export to `config.output`.
///
/// # Errors
///
/// Returns the errors of [`process`], or [`PipelineError::Output`] if the
/// export cannot be written.
pub fn run_batch(
    config: &PipelineConfig,
    source: &dyn DocumentSource,
    progress: &Arc<dyn ProgressCallback>,
    cancel: Option<&CancelToken>,
) -> Result<BatchOutcome, PipelineError> {
    let mut outcome = process(config, source, progress, cancel)?;

    export::write_csv(&outcome.table, &config.output, &config.export_options())?;
    outcome.report.output = Some(config.output.clone());

    log::info!(
        "Batch complete: {} row(s), {} matched, {} document(s) skipped",
        outcome.report.records,
        outcome.report.matched,
        outcome.report.failures.len()
    );

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use super::*;
    use crate::progress::null_progress;
    use crate::source::MemorySource;

    const JANE: &str = "This is a statement that: Jane Doe Certificate Number: ABC-123 Date of Issue: 5-Mar-24 ... RIIWHS201E Work Safely ... RIIMPO318F Operate Plant";

    fn config_in(dir: &Path) -> PipelineConfig {
        PipelineConfig {
            output: dir.join("out.csv"),
            ..PipelineConfig::default()
        }
    }

    #[test]
    fn jane_doe_is_enriched_from_roster() {
        let dir = tempfile::tempdir().unwrap();
        let roster = dir.path().join("clients.csv");
        fs::write(&roster, "Name,DOB,Email\nJane Doe,1990-01-01,jane@example.com\n").unwrap();

        let config = PipelineConfig {
            reference: Some(roster),
            ..config_in(dir.path())
        };
        let source = MemorySource::new().with_text("jane.pdf", JANE);

        let outcome = run_batch(&config, &source, &null_progress(), None).unwrap();
        assert_eq!(outcome.table.len(), 2);

        let written = fs::read_to_string(dir.path().join("out.csv")).unwrap();
        assert_eq!(
            written,
            "Name,Certificate Number,Date of Issue,Course Code,DOB,Email\n\
             Jane Doe,ABC-123,5-Mar-24,RIIWHS201E,1990-01-01,jane@example.com\n\
             Jane Doe,ABC-123,5-Mar-24,RIIMPO318F,1990-01-01,jane@example.com\n"
        );
        assert_eq!(outcome.report.matched, 2);
        assert!(outcome.report.warnings.is_empty());
        assert_eq!(outcome.report.output, Some(dir.path().join("out.csv")));
    }

    #[test]
    fn missing_roster_degrades_to_empty_reference_columns() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig {
            reference: Some(dir.path().join("missing.csv")),
            ..config_in(dir.path())
        };
        let source = MemorySource::new().with_text("jane.pdf", JANE);

        let outcome = run_batch(&config, &source, &null_progress(), None).unwrap();
        assert_eq!(outcome.table.len(), 2);
        for i in 0..2 {
            assert_eq!(outcome.table.reference_value(i, "DOB"), Some(""));
            assert_eq!(outcome.table.reference_value(i, "Email"), Some(""));
        }
        assert_eq!(outcome.report.warnings.len(), 1);
    }

    #[test]
    fn empty_roster_degrades_to_empty_reference_columns() {
        let dir = tempfile::tempdir().unwrap();
        let roster = dir.path().join("clients.csv");
        fs::write(&roster, "Name,DOB,Email\n").unwrap();
        let config = PipelineConfig {
            reference: Some(roster),
            ..config_in(dir.path())
        };
        let source = MemorySource::new().with_text("jane.pdf", JANE);

        let outcome = process(&config, &source, &null_progress(), None).unwrap();
        assert_eq!(outcome.table.len(), 2);
        assert_eq!(outcome.table.reference_value(1, "Email"), Some(""));
        assert_eq!(outcome.report.matched, 0);
        assert_eq!(outcome.report.output, None);
    }

    #[test]
    fn zero_byte_roster_uses_fallback_columns() {
        let dir = tempfile::tempdir().unwrap();
        let roster = dir.path().join("clients.csv");
        fs::write(&roster, "").unwrap();
        let config = PipelineConfig {
            reference: Some(roster),
            ..config_in(dir.path())
        };
        let source = MemorySource::new().with_text("jane.pdf", JANE);

        let outcome = run_batch(&config, &source, &null_progress(), None).unwrap();
        assert_eq!(outcome.table.reference_columns, ["DOB", "Email"]);
        for i in 0..2 {
            assert_eq!(outcome.table.reference_value(i, "DOB"), Some(""));
            assert_eq!(outcome.table.reference_value(i, "Email"), Some(""));
        }
        assert_eq!(outcome.report.warnings.len(), 1);

        let written = fs::read_to_string(dir.path().join("out.csv")).unwrap();
        assert_eq!(
            written.lines().next(),
            Some("Name,Certificate Number,Date of Issue,Course Code,DOB,Email")
        );
    }

    #[test]
    fn roster_without_name_column_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let roster = dir.path().join("clients.csv");
        fs::write(&roster, "Email
jane@example.com
").unwrap();
        let config = PipelineConfig {
            reference: Some(roster),
            ..config_in(dir.path())
        };
        let source = MemorySource::new().with_text("jane.pdf", JANE);

        let outcome = process(&config, &source, &null_progress(), None).unwrap();
        assert_eq!(outcome.report.matched, 0);
        assert_eq!(outcome.report.warnings.len(), 1);
        assert!(outcome.report.warnings[0].contains("'Name'"));
    }

    #[test]
    fn catalog_fills_course_names() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = dir.path().join("courses.csv");
        fs::write(&catalog, "Course Name,Unit Code\nWork safely,RIIWHS201E\n").unwrap();
        let config = PipelineConfig {
            catalog: Some(catalog),
            ..config_in(dir.path())
        };
        let source = MemorySource::new().with_text("jane.pdf", JANE);

        run_batch(&config, &source, &null_progress(), None).unwrap();
        let written = fs::read_to_string(dir.path().join("out.csv")).unwrap();
        let lines: Vec<_> = written.lines().collect();
        assert_eq!(
            lines[0],
            "Name,Certificate Number,Date of Issue,Course Code,Course Name,DOB,Email"
        );
        assert_eq!(lines[1], "Jane Doe,ABC-123,5-Mar-24,RIIWHS201E,Work safely,,");
        assert_eq!(lines[2], "Jane Doe,ABC-123,5-Mar-24,RIIMPO318F,,,");
    }

    #[test]
    fn directory_of_pdfs_is_exported() {
        let dir = tempfile::tempdir().unwrap();
        let certificates = dir.path().join("certificates");
        fs::create_dir(&certificates).unwrap();
        fs::write(
            certificates.join("jane_doe.pdf"),
            include_bytes!("../../pdf/fixtures/jane_doe.pdf"),
        )
        .unwrap();
        let roster = dir.path().join("clients.csv");
        fs::write(&roster, "Name,DOB,Email\nJane Doe,1990-01-01,jane@example.com\n").unwrap();

        let config = PipelineConfig {
            documents_dir: Some(certificates),
            reference: Some(roster),
            ..config_in(dir.path())
        };
        let source = config.document_source().unwrap();

        let outcome = run_batch(&config, source.as_ref(), &null_progress(), None).unwrap();
        assert_eq!(outcome.report.documents_processed, 1);
        assert!(outcome.report.failures.is_empty());

        let written = fs::read_to_string(dir.path().join("out.csv")).unwrap();
        assert_eq!(
            written,
            "Name,Certificate Number,Date of Issue,Course Code,DOB,Email\n\
             Jane Doe,ABC-123,5-Mar-24,RIIWHS201E,1990-01-01,jane@example.com\n\
             Jane Doe,ABC-123,5-Mar-24,RIIMPO318F,1990-01-01,jane@example.com\n"
        );
    }

    #[test]
    fn empty_source_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = run_batch(
            &config_in(dir.path()),
            &MemorySource::new(),
            &null_progress(),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::NoDocuments(_)));
        assert!(!dir.path().join("out.csv").exists());
    }

    #[test]
    fn unreadable_document_does_not_abort_batch() {
        let dir = tempfile::tempdir().unwrap();
        let source = MemorySource::new()
            .with_pdf("broken.pdf", b"%PDF-garbage".to_vec())
            .with_text("jane.pdf", JANE);

        let outcome = run_batch(&config_in(dir.path()), &source, &null_progress(), None).unwrap();
        assert_eq!(outcome.report.documents_seen, 2);
        assert_eq!(outcome.report.documents_processed, 1);
        assert_eq!(outcome.report.failures[0].id, "broken.pdf");
        assert_eq!(outcome.table.len(), 2);
    }
}
