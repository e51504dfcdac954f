//! Label-based field location in certificate text.
//!
//! Each header field is found by the first match of its label pattern;
//! unit codes are collected from every line in discovery order. A field
//! whose pattern does not match is simply `None`.

use std::sync::LazyLock;

use regex::Regex;

/// Label introducing the holder name.
pub const HOLDER_LABEL: &str = "This is a statement that:";
/// Label introducing the certificate number.
pub const CERTIFICATE_LABEL: &str = "Certificate Number:";
/// Label introducing the issue date.
pub const ISSUE_DATE_LABEL: &str = "Date of Issue:";

/// Labels that end a holder name printed on the same line as other fields.
const NAME_BOUNDARIES: &[&str] = &["Certificate Number", "Date of Issue", HOLDER_LABEL];

static HOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"This is a statement that:\s*(.+)").unwrap_or_else(|_| unreachable!())
});

static CERTIFICATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Certificate Number:\s*(\S+)").unwrap_or_else(|_| unreachable!())
});

static ISSUE_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Date of Issue:\s*([0-9]{1,2}-[A-Za-z]{3}-[0-9]{2})")
        .unwrap_or_else(|_| unreachable!())
});

static UNIT_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"RII[A-Z]+[0-9]+[A-Z]?").unwrap_or_else(|_| unreachable!()));

/// Header fields shared by every unit of one certificate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentFields {
    /// Holder name, trimmed.
    pub holder_name: Option<String>,
    /// Certificate number token.
    pub certificate_number: Option<String>,
    /// Issue date in `D[D]-MMM-YY` form.
    pub issue_date: Option<String>,
}

/// A competency unit code and the text that follows it on its line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitMatch {
    /// The unit code (e.g. `RIIWHS201E`).
    pub code: String,
    /// Text after the code up to the next code on the same line or the end
    /// of the line, trimmed.
    pub description: String,
}

/// Locates the holder name, certificate number and issue date in `text`.
#[must_use]
pub fn locate_fields(text: &str) -> DocumentFields {
    DocumentFields {
        holder_name: locate_holder_name(text),
        certificate_number: first_capture(&CERTIFICATE_RE, text),
        issue_date: first_capture(&ISSUE_DATE_RE, text),
    }
}

/// Finds every unit code in `text`, in the order they appear.
#[must_use]
pub fn find_units(text: &str) -> Vec<UnitMatch> {
    let mut units = Vec::new();

    for line in text.lines() {
        let matches: Vec<_> = UNIT_CODE_RE.find_iter(line).collect();
        for (i, m) in matches.iter().enumerate() {
            let end = matches.get(i + 1).map_or(line.len(), regex::Match::start);
            units.push(UnitMatch {
                code: m.as_str().to_owned(),
                description: line[m.end()..end].trim().to_owned(),
            });
        }
    }

    log::debug!("Found {} unit code(s)", units.len());

    units
}

fn first_capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_owned())
        .filter(|s| !s.is_empty())
}

fn locate_holder_name(text: &str) -> Option<String> {
    let captured = HOLDER_RE.captures(text)?.get(1)?.as_str();

    let end = NAME_BOUNDARIES
        .iter()
        .filter_map(|label| captured.find(label))
        .min()
        .unwrap_or(captured.len());

    let name = captured[..end].trim();
    (!name.is_empty()).then(|| name.to_owned())
}
