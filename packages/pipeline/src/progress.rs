//! Per-document progress reporting for batch runs.
//!
//! The aggregator announces each document before reading it and reports how
//! many records it produced afterwards. Rendering (terminal bars, nothing
//! at all) is up to the [`ProgressCallback`] implementation handed in by
//! the caller.

use std::sync::Arc;

/// Receives progress events from a batch run.
///
/// Shared through an `Arc`, so implementations must be `Send + Sync`.
pub trait ProgressCallback: Send + Sync {
    /// Called once with the number of documents in the batch.
    fn set_total(&self, documents: u64);

    /// Called before the document `id` is read.
    fn start_document(&self, id: &str);

    /// Called after a document was handled. `records` is `None` when the
    /// document was skipped.
    fn document_done(&self, records: Option<usize>);

    /// Called once with a summary after the last document.
    fn finish(&self, summary: String);
}

/// Ignores every progress event.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _documents: u64) {}
    fn start_document(&self, _id: &str) {}
    fn document_done(&self, _records: Option<usize>) {}
    fn finish(&self, _summary: String) {}
}

/// Shared [`NullProgress`].
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
