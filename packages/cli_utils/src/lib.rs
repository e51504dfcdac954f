#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Terminal plumbing for the certificate roster binaries.
//!
//! [`init_logger`] installs `pretty_env_logger` behind
//! `indicatif-log-bridge` so log lines do not tear the progress bars, and
//! [`DocumentProgress`] renders batch progress as an `indicatif` bar.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use cert_roster_pipeline::progress::ProgressCallback;
use indicatif::{ProgressBar, ProgressStyle};

pub use indicatif::MultiProgress;

const SPINNER_TEMPLATE: &str = "{spinner:.cyan} {msg}";
const BAR_TEMPLATE: &str =
    "  {prefix:.bold} {wide_bar:.cyan/dim} {pos}/{len} docs [{eta}] {msg}";

/// Progress bar over the documents of one batch.
///
/// Shows a spinner until the document count is known. The bar prefix keeps
/// a running total of extracted records and the number of skipped
/// documents.
pub struct DocumentProgress {
    bar: ProgressBar,
    records: AtomicUsize,
    skipped: AtomicUsize,
}

impl DocumentProgress {
    /// Adds a new bar to `multi`.
    #[must_use]
    pub fn new(multi: &MultiProgress, message: &str) -> Arc<dyn ProgressCallback> {
        let bar = multi.add(ProgressBar::new_spinner());
        bar.enable_steady_tick(Duration::from_millis(100));
        bar.set_style(
            ProgressStyle::with_template(SPINNER_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.to_owned());

        Arc::new(Self {
            bar,
            records: AtomicUsize::new(0),
            skipped: AtomicUsize::new(0),
        })
    }

    fn refresh_prefix(&self) {
        let records = self.records.load(Ordering::Relaxed);
        let skipped = self.skipped.load(Ordering::Relaxed);
        if skipped == 0 {
            self.bar.set_prefix(format!("{records} record(s)"));
        } else {
            self.bar
                .set_prefix(format!("{records} record(s), {skipped} skipped"));
        }
    }
}

impl ProgressCallback for DocumentProgress {
    fn set_total(&self, documents: u64) {
        self.bar.set_length(documents);
        self.bar.set_position(0);
        self.bar.set_style(
            ProgressStyle::with_template(BAR_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("##-"),
        );
        self.refresh_prefix();
    }

    fn start_document(&self, id: &str) {
        self.bar.set_message(id.to_owned());
    }

    fn document_done(&self, records: Option<usize>) {
        match records {
            Some(n) => {
                self.records.fetch_add(n, Ordering::Relaxed);
            }
            None => {
                self.skipped.fetch_add(1, Ordering::Relaxed);
            }
        }
        self.refresh_prefix();
        self.bar.inc(1);
    }

    fn finish(&self, summary: String) {
        self.bar.finish_with_message(summary);
    }
}

/// Installs the global logger (level from `RUST_LOG`) and returns the
/// [`MultiProgress`] every progress bar must be added to.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    let logger = pretty_env_logger::formatted_builder()
        .parse_env("RUST_LOG")
        .build();
    let level = logger.filter();

    if indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .is_ok()
    {
        log::set_max_level(level);
    }

    multi
}
