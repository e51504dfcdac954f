//! Pluggable document sources.
//!
//! A [`DocumentSource`] enumerates the documents of one batch, in the order
//! they will be processed. Reading a document's text is deferred until the
//! aggregator gets to it, so an unreadable file only fails its own entry.

use std::path::{Path, PathBuf};

use cert_roster_pdf::{PdfError, extract_text_from_mem, extract_text_from_path};

use crate::PipelineError;

/// Where a document's content comes from.
#[derive(Debug, Clone)]
pub enum DocumentContent {
    /// A PDF file on disk.
    Path(PathBuf),
    /// PDF bytes already in memory (e.g. an upload).
    Pdf(Vec<u8>),
    /// Text that has already been extracted.
    Text(String),
}

impl DocumentContent {
    /// Produces the document's plain text.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError`] if the PDF cannot be read or yields no text.
    pub fn text(&self) -> Result<String, PdfError> {
        match self {
            Self::Path(path) => extract_text_from_path(path),
            Self::Pdf(bytes) => extract_text_from_mem(bytes),
            Self::Text(text) => Ok(text.clone()),
        }
    }
}

/// One document of a batch.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// Identifier used in logs, failure reports and the `Source` column.
    pub id: String,
    /// The document's content.
    pub content: DocumentContent,
}

/// Enumerates the documents of a batch.
pub trait DocumentSource {
    /// Human-readable description for log messages (e.g. the directory).
    fn label(&self) -> String;

    /// Lists the documents to process, in processing order.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Source`] if the documents cannot be
    /// enumerated.
    fn documents(&self) -> Result<Vec<SourceDocument>, PipelineError>;
}

fn file_id(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}

/// Every `.pdf` file directly inside a directory, sorted by file name.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    /// Creates a source scanning `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl DocumentSource for DirectorySource {
    fn label(&self) -> String {
        self.dir.display().to_string()
    }

    fn documents(&self) -> Result<Vec<SourceDocument>, PipelineError> {
        let entries = std::fs::read_dir(&self.dir).map_err(|e| {
            PipelineError::Source(format!("cannot read {}: {e}", self.dir.display()))
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry?.path();
            let is_pdf = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
            if is_pdf && path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();

        log::debug!("Found {} PDF(s) in {}", paths.len(), self.dir.display());

        Ok(paths
            .into_iter()
            .map(|path| SourceDocument {
                id: file_id(&path),
                content: DocumentContent::Path(path),
            })
            .collect())
    }
}

/// An explicit list of PDF files, processed in the given order.
#[derive(Debug, Clone)]
pub struct FileListSource {
    paths: Vec<PathBuf>,
}

impl FileListSource {
    /// Creates a source over `paths`.
    #[must_use]
    pub const fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }
}

impl DocumentSource for FileListSource {
    fn label(&self) -> String {
        format!("{} selected file(s)", self.paths.len())
    }

    fn documents(&self) -> Result<Vec<SourceDocument>, PipelineError> {
        Ok(self
            .paths
            .iter()
            .map(|path| SourceDocument {
                id: file_id(path),
                content: DocumentContent::Path(path.clone()),
            })
            .collect())
    }
}

/// Documents held in memory, such as uploaded files.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    documents: Vec<SourceDocument>,
}

impl MemorySource {
    /// Creates an empty source.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            documents: Vec::new(),
        }
    }

    /// Adds an in-memory PDF.
    #[must_use]
    pub fn with_pdf(mut self, id: &str, bytes: Vec<u8>) -> Self {
        self.documents.push(SourceDocument {
            id: id.to_owned(),
            content: DocumentContent::Pdf(bytes),
        });
        self
    }

    /// Adds a document whose text is already extracted.
    #[must_use]
    pub fn with_text(mut self, id: &str, text: &str) -> Self {
        self.documents.push(SourceDocument {
            id: id.to_owned(),
            content: DocumentContent::Text(text.to_owned()),
        });
        self
    }
}

impl DocumentSource for MemorySource {
    fn label(&self) -> String {
        format!("{} uploaded document(s)", self.documents.len())
    }

    fn documents(&self) -> Result<Vec<SourceDocument>, PipelineError> {
        Ok(self.documents.clone())
    }
}
