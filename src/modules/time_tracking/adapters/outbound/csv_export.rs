// CSV export of logged time and of the ticket table.
//
// Every text field is double quoted with inner quotes doubled. Minutes are bare integers.

use crate::modules::time_tracking::core::ticket::Ticket;
use crate::modules::time_tracking::core::time_block::TimeBlock;
use crate::shared::core::primitives::minutes_between;
use chrono::SecondsFormat;
use std::collections::HashMap;

pub const LOGS_FILE_NAME: &str = "ticket-time-logs.csv";
pub const TICKETS_FILE_NAME: &str = "tickets.csv";

const LOG_COLUMNS: [&str; 6] = ["Start", "End", "Minutes", "TicketKey", "Title", "Notes"];
const TICKET_COLUMNS: [&str; 4] = ["Id", "Subject", "Status", "Client"];

pub fn csv_escape(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// One row per block, oldest first. `Title` is the owning ticket's title.
pub fn build_logs_csv(tickets: &[Ticket], blocks: &[TimeBlock]) -> String {
    let titles: HashMap<&str, &str> = tickets
        .iter()
        .map(|ticket| (ticket.id.as_str(), ticket.title.as_str()))
        .collect();
    let mut sorted: Vec<&TimeBlock> = blocks.iter().collect();
    sorted.sort_by_key(|block| block.start);

    let mut rows = vec![LOG_COLUMNS.join(",")];
    rows.extend(sorted.into_iter().map(|block| {
        [
            csv_escape(&block.start.to_rfc3339_opts(SecondsFormat::Millis, true)),
            csv_escape(&block.end.to_rfc3339_opts(SecondsFormat::Millis, true)),
            minutes_between(block.start, block.end).to_string(),
            csv_escape(&block.ticket_key),
            csv_escape(titles.get(block.ticket_id.as_str()).copied().unwrap_or_default()),
            csv_escape(&block.notes),
        ]
        .join(",")
    }));
    rows.join("\n")
}

/// The ticket table in the shape the importer reads back.
pub fn build_tickets_csv(tickets: &[Ticket]) -> String {
    let mut rows = vec![TICKET_COLUMNS.join(",")];
    rows.extend(tickets.iter().map(|ticket| {
        [
            csv_escape(&ticket.key),
            csv_escape(&ticket.title),
            csv_escape(ticket.status.as_str()),
            csv_escape(&ticket.client),
        ]
        .join(",")
    }));
    rows.join("\n")
}
