//! Left join of extracted certificate records against the roster.
//!
//! Every extracted record survives the join. A record that matches no
//! roster row gets an empty string in every reference column. When several
//! roster rows match, the one appearing first in the file is used.

use std::collections::HashMap;

use cert_roster_certificate_models::{
    CERTIFICATE_NUMBER_COLUMN, EnrichedRecord, EnrichedTable, ExtractedRecord, JoinStrategy,
    NAME_COLUMN,
};

use crate::ReferenceTable;

/// First-occurrence lookup of roster rows by key value.
struct RosterIndex<'a> {
    by_name: HashMap<&'a str, usize>,
    by_certificate: HashMap<&'a str, usize>,
}

impl<'a> RosterIndex<'a> {
    fn build(table: &'a ReferenceTable, strategy: JoinStrategy) -> Self {
        let by_name = key_index(table, NAME_COLUMN);
        let by_certificate = match strategy {
            JoinStrategy::Name => HashMap::new(),
            JoinStrategy::NameOrCertificate => key_index(table, CERTIFICATE_NUMBER_COLUMN),
        };
        Self {
            by_name,
            by_certificate,
        }
    }

    /// Row index of the first roster row matching either key.
    fn lookup(&self, record: &ExtractedRecord) -> Option<usize> {
        let by_name = record
            .holder_name
            .as_deref()
            .and_then(|name| self.by_name.get(name).copied());
        let by_certificate = record
            .certificate_number
            .as_deref()
            .and_then(|number| self.by_certificate.get(number).copied());

        match (by_name, by_certificate) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}

fn key_index<'a>(table: &'a ReferenceTable, column: &str) -> HashMap<&'a str, usize> {
    let mut index = HashMap::new();

    let Some(col) = table.column_index(column) else {
        log::debug!("Roster has no '{column}' column to index");
        return index;
    };

    for (i, row) in table.rows().iter().enumerate() {
        let key = row[col].as_str();
        if !key.is_empty() {
            index.entry(key).or_insert(i);
        }
    }

    index
}

/// Joins `records` against `table` using `strategy`.
///
/// The output has exactly one row per input record, in input order. Its
/// reference columns are the roster's non-key columns.
#[must_use]
pub fn enrich(
    records: Vec<ExtractedRecord>,
    table: &ReferenceTable,
    strategy: JoinStrategy,
) -> EnrichedTable {
    let index = RosterIndex::build(table, strategy);
    let columns = table.reference_column_indices();

    let rows: Vec<EnrichedRecord> = records
        .into_iter()
        .map(|record| match index.lookup(&record) {
            Some(row) => {
                let cells = &table.rows()[row];
                EnrichedRecord {
                    reference: columns.iter().map(|&c| cells[c].clone()).collect(),
                    matched: true,
                    record,
                }
            }
            None => EnrichedRecord {
                reference: vec![String::new(); columns.len()],
                matched: false,
                record,
            },
        })
        .collect();

    let enriched = EnrichedTable {
        reference_columns: table.reference_columns(),
        rows,
    };

    log::info!(
        "Cross-referenced {} record(s) by {strategy}: {} matched, {} unmatched",
        enriched.len(),
        enriched.matched_count(),
        enriched.len() - enriched.matched_count()
    );

    enriched
}

/// Widens `records` with empty `columns`, for when no roster is available.
#[must_use]
pub fn enrich_without_reference(
    records: Vec<ExtractedRecord>,
    columns: &[String],
) -> EnrichedTable {
    let rows = records
        .into_iter()
        .map(|record| EnrichedRecord {
            record,
            reference: vec![String::new(); columns.len()],
            matched: false,
        })
        .collect();

    EnrichedTable {
        reference_columns: columns.to_vec(),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: Option<&str>, certificate: Option<&str>, code: &str) -> ExtractedRecord {
        ExtractedRecord {
            source_id: "cert.pdf".to_string(),
            holder_name: name.map(str::to_string),
            certificate_number: certificate.map(str::to_string),
            issue_date: Some("5-Mar-24".to_string()),
            unit_code: code.to_string(),
            unit_description: String::new(),
            unit_name: String::new(),
        }
    }

    fn roster(csv: &str) -> ReferenceTable {
        ReferenceTable::from_reader(csv.as_bytes(), b',').unwrap()
    }

    #[test]
    fn matches_by_name_and_keeps_every_record() {
        let table = roster("Name,DOB,Email\nJane Doe,1990-01-01,jane@example.com\n");
        let records = vec![
            record(Some("Jane Doe"), Some("ABC-123"), "RIIWHS201E"),
            record(Some("Jane Doe"), Some("ABC-123"), "RIIMPO318F"),
            record(Some("John Smith"), None, "RIIHAU412A"),
        ];

        let enriched = enrich(records, &table, JoinStrategy::Name);
        assert_eq!(enriched.len(), 3);
        assert_eq!(enriched.reference_columns, ["DOB", "Email"]);
        assert_eq!(enriched.rows[0].reference, ["1990-01-01", "jane@example.com"]);
        assert_eq!(enriched.rows[1].reference, ["1990-01-01", "jane@example.com"]);
        assert_eq!(enriched.rows[1].record.unit_code, "RIIMPO318F");
        assert!(!enriched.rows[2].matched);
        assert_eq!(enriched.rows[2].reference, ["", ""]);
    }

    #[test]
    fn empty_roster_keeps_columns_and_rows() {
        let table = roster("Name,DOB,Email\n");
        let enriched = enrich(
            vec![record(Some("Jane Doe"), None, "RIIWHS201E")],
            &table,
            JoinStrategy::Name,
        );
        assert_eq!(enriched.len(), 1);
        assert_eq!(enriched.reference_value(0, "DOB"), Some(""));
        assert_eq!(enriched.reference_value(0, "Email"), Some(""));
    }

    #[test]
    fn duplicate_names_use_first_row() {
        let table = roster("Name,Email\nJane Doe,first@example.com\nJane Doe,second@example.com\n");
        for _ in 0..3 {
            let enriched = enrich(
                vec![record(Some("Jane Doe"), None, "RIIWHS201E")],
                &table,
                JoinStrategy::Name,
            );
            assert_eq!(enriched.reference_value(0, "Email"), Some("first@example.com"));
        }
    }

    #[test]
    fn name_strategy_ignores_certificate_numbers() {
        let table = roster("Name,Certificate Number,Email\nJ. Doe,ABC-123,jane@example.com\n");
        let enriched = enrich(
            vec![record(Some("Jane Doe"), Some("ABC-123"), "RIIWHS201E")],
            &table,
            JoinStrategy::Name,
        );
        assert!(!enriched.rows[0].matched);
        assert_eq!(enriched.reference_columns, ["Email"]);
    }

    #[test]
    fn name_or_certificate_matches_either_key() {
        let table = roster(
            "Name,Certificate Number,DOB,Email\nJ. Doe,ABC-123,1990-01-01,jane@example.com\nJohn Smith,XYZ-9,1985-06-30,john@example.com\n",
        );
        let records = vec![
            record(Some("Jane Doe"), Some("ABC-123"), "RIIWHS201E"),
            record(Some("John Smith"), Some("unknown"), "RIIWHS201E"),
            record(None, None, "RIIWHS201E"),
        ];

        let enriched = enrich(records, &table, JoinStrategy::NameOrCertificate);
        assert_eq!(enriched.reference_value(0, "Email"), Some("jane@example.com"));
        assert_eq!(enriched.reference_value(1, "Email"), Some("john@example.com"));
        assert_eq!(enriched.reference_value(2, "Email"), Some(""));
        assert_eq!(enriched.matched_count(), 2);
    }

    #[test]
    fn name_or_certificate_prefers_earliest_matching_row() {
        let table = roster(
            "Name,Certificate Number,Email\nSomeone Else,ABC-123,cert@example.com\nJane Doe,OTHER,name@example.com\n",
        );
        let enriched = enrich(
            vec![record(Some("Jane Doe"), Some("ABC-123"), "RIIWHS201E")],
            &table,
            JoinStrategy::NameOrCertificate,
        );
        assert_eq!(enriched.reference_value(0, "Email"), Some("cert@example.com"));
    }

    #[test]
    fn absent_name_never_matches_blank_roster_name() {
        let table = roster("Name,Email\n,blank@example.com\n");
        let enriched = enrich(vec![record(None, None, "RIIWHS201E")], &table, JoinStrategy::Name);
        assert!(!enriched.rows[0].matched);
    }

    #[test]
    fn roster_without_name_column_matches_nothing() {
        let table = roster("Email\njane@example.com\n");
        let enriched = enrich(
            vec![record(Some("Jane Doe"), None, "RIIWHS201E")],
            &table,
            JoinStrategy::Name,
        );
        assert_eq!(enriched.len(), 1);
        assert_eq!(enriched.reference_value(0, "Email"), Some(""));
    }

    #[test]
    fn enrich_without_reference_fills_fallback_columns() {
        let columns = vec!["DOB".to_string(), "Email".to_string()];
        let enriched =
            enrich_without_reference(vec![record(Some("Jane Doe"), None, "RIIWHS201E")], &columns);
        assert_eq!(enriched.reference_columns, columns);
        assert_eq!(enriched.rows[0].reference, ["", ""]);
        assert_eq!(enriched.matched_count(), 0);
    }
}
