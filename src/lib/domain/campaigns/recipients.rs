//! CSV recipient parsing

use std::collections::HashMap;

use csv::ReaderBuilder;

use crate::domain::{campaigns::errors::CsvParseError, comms::EmailAddress};

const EMAIL_ALIASES: [&str; 3] = ["email", "e", "email address"];
const NAME_ALIASES: [&str; 3] = ["name", "full name", "first name"];
const SUBJECT_HEADER: &str = "subject";

/// One validated CSV row, ready for template expansion
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecipientRecord {
    /// The recipient address
    pub email: EmailAddress,

    /// The recipient's name, when a name column held one
    pub name: Option<String>,

    /// A per-recipient subject, when a subject column held one
    pub subject_override: Option<String>,

    /// Every other column, keyed by its normalized header
    pub custom_fields: HashMap<String, String>,
}

/// Row accounting for one parse pass
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParseSummary {
    /// Rows read from the CSV
    pub total: usize,

    /// Rows admitted with a valid email
    pub valid: usize,

    /// Rows rejected for a missing or invalid email
    pub invalid: usize,
}

/// The outcome of parsing a CSV
#[derive(Clone, Debug)]
pub struct ParsedRecipients {
    /// The admitted recipients, in row order
    pub records: Vec<RecipientRecord>,

    /// Row accounting
    pub summary: ParseSummary,
}

/// Parse raw CSV text into recipient records.
///
/// Headers are trimmed and lowercased before matching. Several header
/// aliases are recognized for the email and name columns; the first alias
/// with a non-empty value wins per row. A `subject` column becomes a
/// per-recipient subject, and every other column becomes a custom field.
///
/// A row whose email is missing or fails validation is rejected and
/// counted, never fatal. Only an unreadable header row fails the parse.
pub fn parse_recipients(csv_text: &str) -> Result<ParsedRecipients, CsvParseError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| CsvParseError::Malformed(e.to_string()))?
        .iter()
        .map(|header| header.trim().to_lowercase())
        .collect::<Vec<_>>();

    let mut records = Vec::new();
    let mut summary = ParseSummary::default();

    for row in reader.records() {
        summary.total += 1;

        let Ok(row) = row else {
            summary.invalid += 1;
            continue;
        };

        let cells: HashMap<&str, &str> = headers
            .iter()
            .map(String::as_str)
            .zip(row.iter())
            .collect();

        let first_non_empty = |aliases: &[&str]| {
            aliases
                .iter()
                .find_map(|alias| cells.get(alias).filter(|cell| !cell.is_empty()))
                .map(|cell| cell.to_string())
        };

        let email = first_non_empty(&EMAIL_ALIASES).and_then(|raw| EmailAddress::new(&raw).ok());

        let Some(email) = email else {
            summary.invalid += 1;
            continue;
        };

        let custom_fields = cells
            .iter()
            .filter(|(header, _)| {
                !EMAIL_ALIASES.contains(header)
                    && !NAME_ALIASES.contains(header)
                    && **header != SUBJECT_HEADER
            })
            .map(|(header, cell)| (header.to_string(), cell.to_string()))
            .collect();

        records.push(RecipientRecord {
            email,
            name: first_non_empty(&NAME_ALIASES),
            subject_override: first_non_empty(&[SUBJECT_HEADER]),
            custom_fields,
        });

        summary.valid += 1;
    }

    Ok(ParsedRecipients { records, summary })
}
