#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! PDF text extraction and certificate field location.
//!
//! Certificate PDFs are read with pure-Rust text extraction
//! ([`pdf_extract`]), which returns every page concatenated with line
//! breaks preserved. The text is then handed to a [`FieldExtractor`] that
//! locates the labeled header fields and every competency unit code.

pub mod extractor;
pub mod fields;

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

pub use extractor::FieldExtractor;
pub use fields::{DocumentFields, UnitMatch, find_units, locate_fields};

/// Errors specific to PDF text extraction.
#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    /// PDF text extraction failed.
    #[error("PDF extraction error: {0}")]
    Extraction(String),

    /// The PDF was read but contains no text (e.g. a scanned image).
    #[error("PDF contains no extractable text")]
    NoText,

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Extracts the text of every page of an in-memory PDF.
///
/// `pdf_extract` panics on some malformed documents instead of returning
/// an error, so the call runs under [`panic::catch_unwind`].
///
/// # Errors
///
/// Returns [`PdfError::Extraction`] if the document cannot be parsed and
/// [`PdfError::NoText`] if it yields only whitespace.
pub fn extract_text_from_mem(bytes: &[u8]) -> Result<String, PdfError> {
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem(bytes)
    }));

    let text = match result {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => {
            return Err(PdfError::Extraction(format!(
                "failed to extract text from PDF: {e}"
            )));
        }
        Err(_) => {
            return Err(PdfError::Extraction(
                "PDF extraction panicked (malformed document)".to_owned(),
            ));
        }
    };

    if text.trim().is_empty() {
        return Err(PdfError::NoText);
    }

    log::debug!("Extracted {} characters of text", text.len());

    Ok(text)
}

/// Reads the PDF at `path` and extracts its text.
///
/// # Errors
///
/// Returns [`PdfError::Io`] if the file cannot be read, otherwise the
/// errors of [`extract_text_from_mem`].
pub fn extract_text_from_path(path: &Path) -> Result<String, PdfError> {
    let bytes = std::fs::read(path)?;
    log::debug!("Read {} bytes from {}", bytes.len(), path.display());
    extract_text_from_mem(&bytes)
}
