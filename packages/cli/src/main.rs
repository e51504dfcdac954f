#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for the certificate roster toolchain.
//!
//! `cert_roster run` processes a batch of certificate PDFs and writes the
//! cross-referenced export, `cert_roster inspect` prints the fields found
//! in individual PDFs, and running without a subcommand starts the
//! interactive prompts.
//!
//! Logging goes through [`cert_roster_cli_utils::init_logger`]; set
//! `RUST_LOG=debug` to see per-document field matches.

mod display;
mod interactive;

use std::path::{Path, PathBuf};

use cert_roster_certificate_models::JoinStrategy;
use cert_roster_cli_utils::DocumentProgress;
use cert_roster_pipeline::config::PipelineConfig;
use clap::{Args, Parser, Subcommand};

use crate::display::{render_report, render_table};

/// Rows shown by `run --show` before truncating.
const SHOW_LIMIT: usize = 50;

#[derive(Parser)]
#[command(
    name = "cert_roster",
    about = "Extract training certificate fields from PDFs and cross-reference them against a roster"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a batch of certificate PDFs and write the export
    Run(RunArgs),
    /// Print the fields found in each PDF without exporting anything
    Inspect {
        /// PDF files to inspect
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[derive(Args)]
#[allow(clippy::struct_excessive_bools)]
struct RunArgs {
    /// TOML configuration file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory scanned for `.pdf` files
    #[arg(long, conflicts_with = "files")]
    dir: Option<PathBuf>,
    /// Individual PDF files, processed in the given order
    files: Vec<PathBuf>,
    /// Reference roster (delimited text with a `Name` column)
    #[arg(long)]
    reference: Option<PathBuf>,
    /// Unit catalog (course name, unit code)
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// Export path (overwritten)
    #[arg(long)]
    output: Option<PathBuf>,
    /// Roster matching: `name` or `name-or-certificate`
    #[arg(long)]
    join: Option<JoinStrategy>,
    /// Text written for fields that could not be found
    #[arg(long)]
    absent_marker: Option<String>,
    /// Field delimiter of the roster and catalog files
    #[arg(long)]
    delimiter: Option<char>,
    /// Export the text following each unit code
    #[arg(long)]
    descriptions: bool,
    /// Export the originating file of each row
    #[arg(long)]
    source_column: bool,
    /// Print the resulting table
    #[arg(long)]
    show: bool,
}

impl RunArgs {
    /// Builds the pipeline configuration: file values first, then flags.
    fn into_config(self) -> Result<(PipelineConfig, bool), Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::load(path)?,
            None => PipelineConfig::default(),
        };

        if let Some(dir) = self.dir {
            config.documents_dir = Some(dir);
            config.documents.clear();
        } else if !self.files.is_empty() {
            config.documents_dir = None;
            config.documents = self.files;
        }
        if self.reference.is_some() {
            config.reference = self.reference;
        }
        if self.catalog.is_some() {
            config.catalog = self.catalog;
        }
        if let Some(output) = self.output {
            config.output = output;
        }
        if let Some(join) = self.join {
            config.join = join;
        }
        if let Some(marker) = self.absent_marker {
            config.absent_marker = marker;
        }
        if let Some(delimiter) = self.delimiter {
            config.delimiter = delimiter;
        }
        config.include_descriptions |= self.descriptions;
        config.include_source |= self.source_column;

        Ok((config, self.show))
    }
}

fn inspect(path: &Path) {
    let text = match cert_roster_pdf::extract_text_from_path(path) {
        Ok(text) => text,
        Err(e) => {
            log::error!("Error processing file {}: {e}", path.display());
            return;
        }
    };

    let fields = cert_roster_pdf::locate_fields(&text);
    let units = cert_roster_pdf::find_units(&text);
    let show = |value: Option<&str>| value.unwrap_or("None").to_owned();

    println!("{}", path.display());
    println!("  Name:               {}", show(fields.holder_name.as_deref()));
    println!(
        "  Certificate Number: {}",
        show(fields.certificate_number.as_deref())
    );
    println!("  Date of Issue:      {}", show(fields.issue_date.as_deref()));
    println!("  Units ({}):", units.len());
    for unit in &units {
        println!("    {:<12} {}", unit.code, unit.description);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = cert_roster_cli_utils::init_logger();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        return interactive::run(&multi);
    };

    match command {
        Commands::Run(args) => {
            let (config, show) = args.into_config()?;
            let source = config.document_source()?;
            let progress = DocumentProgress::new(&multi, "Reading certificates");

            let outcome = cert_roster_pipeline::run_batch(&config, source.as_ref(), &progress, None)
                .inspect_err(|e| log::error!("Batch failed: {e}"))?;

            print!("{}", render_report(&outcome.report));
            if show {
                println!();
                print!(
                    "{}",
                    render_table(&outcome.table, &config.export_options(), SHOW_LIMIT)
                );
            }
        }
        Commands::Inspect { files } => {
            for path in &files {
                inspect(path);
            }
        }
    }

    Ok(())
}
