//! Batch aggregation: runs the field extractor over every document and
//! concatenates the records.
//!
//! Documents are processed one at a time in input order, and each
//! document's records keep their discovery order. A document whose text
//! cannot be produced is recorded as a [`DocumentFailure`] and skipped.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use cert_roster_certificate_models::ExtractedRecord;
use cert_roster_pdf::FieldExtractor;

use crate::progress::ProgressCallback;
use crate::source::SourceDocument;

/// Shared flag that stops a batch before its next document.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Creates a token that has not been cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Documents already processed keep their
    /// records.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A document that was skipped because its text could not be produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFailure {
    /// The document identifier.
    pub id: String,
    /// Why the document could not be read.
    pub reason: String,
}

/// Records gathered from a batch, plus what happened to each document.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    /// All records, in document order then discovery order.
    pub records: Vec<ExtractedRecord>,
    /// Documents that produced text.
    pub documents_processed: usize,
    /// Documents that produced text but no unit codes.
    pub documents_without_units: Vec<String>,
    /// Documents that were skipped.
    pub failures: Vec<DocumentFailure>,
    /// Whether the batch stopped early because of a [`CancelToken`].
    pub cancelled: bool,
}

/// Extracts and concatenates records from already-extracted `(id, text)`
/// pairs, preserving input order.
#[must_use]
pub fn aggregate(
    documents: &[(String, String)],
    extractor: &FieldExtractor,
) -> Vec<ExtractedRecord> {
    documents
        .iter()
        .flat_map(|(id, text)| extractor.extract(id, text))
        .collect()
}

/// Reads and extracts every document in `documents`.
///
/// Unreadable documents are logged, reported in
/// [`Collection::failures`], and skipped. When `cancel` is raised, no
/// further documents are started.
#[must_use]
pub fn collect_records(
    documents: Vec<SourceDocument>,
    extractor: &FieldExtractor,
    progress: &Arc<dyn ProgressCallback>,
    cancel: Option<&CancelToken>,
) -> Collection {
    let total = documents.len();
    let mut collection = Collection::default();

    progress.set_total(total as u64);

    for (i, doc) in documents.into_iter().enumerate() {
        if cancel.is_some_and(CancelToken::is_cancelled) {
            log::warn!("Batch cancelled after {i}/{total} document(s)");
            collection.cancelled = true;
            break;
        }

        progress.start_document(&doc.id);

        match doc.content.text() {
            Ok(text) => {
                let records = extractor.extract(&doc.id, &text);
                log::info!(
                    "[{}/{total}] {}: {} record(s)",
                    i + 1,
                    doc.id,
                    records.len()
                );
                progress.document_done(Some(records.len()));
                if records.is_empty() {
                    collection.documents_without_units.push(doc.id);
                }
                collection.documents_processed += 1;
                collection.records.extend(records);
            }
            Err(e) => {
                log::warn!("[{}/{total}] Skipping {}: {e}", i + 1, doc.id);
                progress.document_done(None);
                collection.failures.push(DocumentFailure {
                    id: doc.id,
                    reason: e.to_string(),
                });
            }
        }
    }

    collection
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::progress::null_progress;
    use crate::source::DocumentContent;

    #[derive(Default)]
    struct RecordingProgress {
        events: Mutex<Vec<String>>,
    }

    impl ProgressCallback for RecordingProgress {
        fn set_total(&self, documents: u64) {
            self.events.lock().unwrap().push(format!("total {documents}"));
        }

        fn start_document(&self, id: &str) {
            self.events.lock().unwrap().push(format!("start {id}"));
        }

        fn document_done(&self, records: Option<usize>) {
            self.events.lock().unwrap().push(format!("done {records:?}"));
        }

        fn finish(&self, summary: String) {
            self.events.lock().unwrap().push(summary);
        }
    }

    fn text_doc(id: &str, text: &str) -> SourceDocument {
        SourceDocument {
            id: id.to_owned(),
            content: DocumentContent::Text(text.to_owned()),
        }
    }

    #[test]
    fn aggregate_preserves_document_and_unit_order() {
        let documents = vec![
            (
                "b.pdf".to_string(),
                "This is a statement that: Bea\nRIIB2 RIIA1".to_string(),
            ),
            ("empty.pdf".to_string(), "no units here".to_string()),
            (
                "a.pdf".to_string(),
                "This is a statement that: Al\nRIIC3\nRIID4".to_string(),
            ),
        ];
        let records = aggregate(&documents, &FieldExtractor::new());
        let seen: Vec<_> = records
            .iter()
            .map(|r| (r.source_id.as_str(), r.unit_code.as_str()))
            .collect();
        assert_eq!(
            seen,
            vec![
                ("b.pdf", "RIIB2"),
                ("b.pdf", "RIIA1"),
                ("a.pdf", "RIIC3"),
                ("a.pdf", "RIID4"),
            ]
        );
    }

    #[test]
    fn unreadable_documents_are_skipped_and_reported() {
        let documents = vec![
            text_doc("good.pdf", "RIIWHS201E"),
            SourceDocument {
                id: "corrupt.pdf".to_owned(),
                content: DocumentContent::Pdf(b"not a pdf".to_vec()),
            },
            text_doc("nounits.pdf", "This is a statement that: Nobody"),
            text_doc("also-good.pdf", "RIIMPO318F"),
        ];

        let collection = collect_records(documents, &FieldExtractor::new(), &null_progress(), None);
        assert_eq!(collection.records.len(), 2);
        assert_eq!(collection.documents_processed, 3);
        assert_eq!(collection.documents_without_units, vec!["nounits.pdf"]);
        assert_eq!(collection.failures.len(), 1);
        assert_eq!(collection.failures[0].id, "corrupt.pdf");
        assert!(!collection.cancelled);
    }

    #[test]
    fn cancelled_batch_starts_no_documents() {
        let cancel = CancelToken::new();
        cancel.cancel();

        let collection = collect_records(
            vec![text_doc("a.pdf", "RIIWHS201E")],
            &FieldExtractor::new(),
            &null_progress(),
            Some(&cancel),
        );
        assert!(collection.cancelled);
        assert!(collection.records.is_empty());
        assert_eq!(collection.documents_processed, 0);
    }

    #[test]
    fn progress_sees_every_document() {
        let recorder = Arc::new(RecordingProgress::default());
        let progress: Arc<dyn ProgressCallback> = recorder.clone();
        let documents = vec![
            text_doc("a.pdf", "RIIWHS201E RIIMPO318F"),
            SourceDocument {
                id: "b.pdf".to_owned(),
                content: DocumentContent::Pdf(Vec::new()),
            },
        ];

        let _ = collect_records(documents, &FieldExtractor::new(), &progress, None);

        assert_eq!(
            *recorder.events.lock().unwrap(),
            ["total 2", "start a.pdf", "done Some(2)", "start b.pdf", "done None"]
        );
    }
}
