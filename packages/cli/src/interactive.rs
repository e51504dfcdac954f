//! Interactive batch run.
//!
//! Prompts for the certificate inputs, the roster, the optional unit
//! catalog, the export path and the join strategy, then asks for
//! confirmation before processing. The resulting table is shown once the
//! export has been written.

use std::path::PathBuf;
use std::time::Instant;

use cert_roster_certificate_models::JoinStrategy;
use cert_roster_cli_utils::{DocumentProgress, MultiProgress};
use cert_roster_pipeline::config::{DEFAULT_OUTPUT, PipelineConfig};
use dialoguer::{Confirm, Input, Select};

use crate::display::{render_report, render_table};

/// How the certificates are supplied.
enum InputMode {
    Directory,
    Files,
}

impl InputMode {
    const ALL: &[Self] = &[Self::Directory, Self::Files];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Directory => "Scan a directory for PDFs",
            Self::Files => "Choose individual PDF files",
        }
    }
}

/// Prompts for an optional path; empty input means `None`.
fn prompt_optional_path(
    prompt: &str,
    default: &str,
) -> Result<Option<PathBuf>, dialoguer::Error> {
    let input: String = Input::new()
        .with_prompt(prompt)
        .default(default.to_string())
        .allow_empty(true)
        .interact_text()?;
    let trimmed = input.trim();
    Ok((!trimmed.is_empty()).then(|| PathBuf::from(trimmed)))
}

/// Runs the interactive flow.
///
/// # Errors
///
/// Returns an error if a prompt fails or the batch cannot be completed
/// (no documents, unwritable export).
pub fn run(multi: &MultiProgress) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = PipelineConfig::default();

    // --- 1. Certificates ---
    let mode_labels: Vec<&str> = InputMode::ALL.iter().map(InputMode::label).collect();
    let mode = Select::new()
        .with_prompt("Where are the certificates?")
        .items(&mode_labels)
        .default(0)
        .interact()?;

    match InputMode::ALL[mode] {
        InputMode::Directory => {
            let dir: String = Input::new()
                .with_prompt("Certificate directory")
                .default("./certificates".to_string())
                .interact_text()?;
            config.documents_dir = Some(PathBuf::from(dir.trim()));
        }
        InputMode::Files => {
            let files: String = Input::new()
                .with_prompt("PDF files (comma-separated)")
                .interact_text()?;
            config.documents = files
                .split(',')
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map(PathBuf::from)
                .collect();
        }
    }

    // --- 2. Roster, catalog and export ---
    config.reference = prompt_optional_path("Reference roster (empty for none)", "clients.csv")?;
    config.catalog = prompt_optional_path("Unit catalog (empty for none)", "")?;

    let output: String = Input::new()
        .with_prompt("Export path")
        .default(DEFAULT_OUTPUT.to_string())
        .interact_text()?;
    config.output = PathBuf::from(output.trim());

    if config.reference.is_some() {
        let join_labels: Vec<&str> = JoinStrategy::ALL.iter().map(|j| j.label()).collect();
        let join = Select::new()
            .with_prompt("Match roster rows by")
            .items(&join_labels)
            .default(0)
            .interact()?;
        config.join = JoinStrategy::ALL[join];
    }

    // --- 3. Confirm ---
    let source = config.document_source()?;
    let documents = source.documents()?.len();
    if documents == 0 {
        println!("No PDFs found in {}.", source.label());
        return Ok(());
    }

    let proceed = Confirm::new()
        .with_prompt(format!(
            "Process {documents} PDF(s) and overwrite {}?",
            config.output.display()
        ))
        .default(true)
        .interact()?;
    if !proceed {
        println!("Cancelled.");
        return Ok(());
    }

    // --- 4. Run ---
    let start = Instant::now();
    let progress = DocumentProgress::new(multi, "Reading certificates");
    let outcome = cert_roster_pipeline::run_batch(&config, source.as_ref(), &progress, None)?;

    log::info!("Batch finished in {:.1}s", start.elapsed().as_secs_f64());

    println!();
    print!("{}", render_report(&outcome.report));
    println!();
    print!(
        "{}",
        render_table(&outcome.table, &config.export_options(), usize::MAX)
    );

    Ok(())
}
