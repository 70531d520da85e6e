// Ticket table import from CSV.
//
// Purpose
// - Read a ticket export from a help desk (or our own ticket table export) into import rows.
//
// Responsibilities
// - Parse RFC 4180 style CSV: quoted fields, doubled quotes, embedded commas and newlines.
// - Locate the id, subject and status columns by case-insensitive header variants.
//
// Boundaries
// - A missing required column rejects the whole file. Matching rows to tickets is
//   the event store's job.

use crate::modules::time_tracking::application::event_store::ImportRow;
use thiserror::Error;

const ID_HEADERS: &[&str] = &["id", "ticket id", "ticket", "ticket_id", "#", "ticketkey", "ticket key", "key"];
const SUBJECT_HEADERS: &[&str] = &["subject", "title", "summary"];
const STATUS_HEADERS: &[&str] = &["status", "state"];
const CLIENT_HEADERS: &[&str] = &["client", "organization", "organisation"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CsvImportError {
    #[error("the file is empty")]
    Empty,

    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<&'static str>),
}

/// Splits CSV text into records of fields. Blank lines are dropped.
pub fn parse_csv(text: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.trim_start_matches('\u{feff}').chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
            }
            _ => field.push(c),
        }
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }

    records.retain(|record| record.iter().any(|field| !field.trim().is_empty()));
    records
}

fn find_column(headers: &[String], variants: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|header| variants.contains(&header.trim().to_lowercase().as_str()))
}

pub fn parse_ticket_table(text: &str) -> Result<Vec<ImportRow>, CsvImportError> {
    let mut records = parse_csv(text).into_iter();
    let headers = records.next().ok_or(CsvImportError::Empty)?;

    let id = find_column(&headers, ID_HEADERS);
    let subject = find_column(&headers, SUBJECT_HEADERS);
    let status = find_column(&headers, STATUS_HEADERS);
    let (Some(id), Some(subject), Some(status)) = (id, subject, status) else {
        let missing = [("id", id), ("subject", subject), ("status", status)]
            .into_iter()
            .filter(|(_, column)| column.is_none())
            .map(|(name, _)| name)
            .collect();
        return Err(CsvImportError::MissingColumns(missing));
    };
    let client = find_column(&headers, CLIENT_HEADERS);

    let cell = |record: &[String], index: usize| record.get(index).cloned().unwrap_or_default();
    Ok(records
        .map(|record| ImportRow {
            id: cell(&record, id),
            subject: cell(&record, subject),
            status: cell(&record, status),
            client: client.map(|index| cell(&record, index)),
        })
        .collect())
}
