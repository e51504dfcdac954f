//! Terminal rendering of batch results.

use std::fmt::Write as _;

use cert_roster_certificate_models::EnrichedTable;
use cert_roster_pipeline::BatchReport;
use cert_roster_pipeline::export::{ExportOptions, header, row_values};

/// Renders `table` as left-aligned columns, showing at most `limit` rows.
#[must_use]
pub fn render_table(table: &EnrichedTable, options: &ExportOptions, limit: usize) -> String {
    let head = header(table, options);
    let rows: Vec<Vec<String>> = table
        .rows
        .iter()
        .take(limit)
        .map(|row| row_values(row, options))
        .collect();

    let mut widths: Vec<usize> = head.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (width, value) in widths.iter_mut().zip(row) {
            *width = (*width).max(value.chars().count());
        }
    }

    let mut out = String::new();
    write_row(&mut out, &head, &widths);
    out.push_str(&"-".repeat(widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1)));
    out.push('\n');
    for row in &rows {
        write_row(&mut out, row, &widths);
    }

    if table.len() > limit {
        let _ = writeln!(out, "... {} more row(s)", table.len() - limit);
    }

    out
}

fn write_row(out: &mut String, values: &[String], widths: &[usize]) {
    let line = values
        .iter()
        .zip(widths)
        .map(|(value, &width)| format!("{value:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}

/// Renders the end-of-batch summary.
#[must_use]
pub fn render_report(report: &BatchReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Source:     {}", report.source_label);
    let _ = writeln!(
        out,
        "Documents:  {} processed, {} skipped, {} without units (of {})",
        report.documents_processed,
        report.failures.len(),
        report.documents_without_units.len(),
        report.documents_seen
    );
    let _ = writeln!(
        out,
        "Rows:       {} ({} matched the roster)",
        report.records, report.matched
    );
    if let Some(path) = &report.output {
        let _ = writeln!(out, "Output:     {}", path.display());
    }
    if report.cancelled {
        out.push_str("Batch was cancelled before every document was read\n");
    }
    for failure in &report.failures {
        let _ = writeln!(out, "  skipped {}: {}", failure.id, failure.reason);
    }
    for warning in &report.warnings {
        let _ = writeln!(out, "  warning: {warning}");
    }

    out
}
