// Record normalizer.
//
// Purpose
// - Turn loosely shaped ticket and time-block records into canonical ones.
//
// Responsibilities
// - Time blocks: reject unparsable timestamps, `end <= start` and missing ticket references.
// - Tickets: never reject, fill defaults.
//
// Boundaries
// - Pure functions. The caller decides what to persist.

use crate::modules::time_tracking::core::ticket::{RawTicket, Ticket, TicketStatus};
use crate::modules::time_tracking::core::time_block::{RawTimeBlock, TimeBlock};
use crate::shared::core::primitives::generate_id;
use chrono::{DateTime, Utc};

pub const UNTITLED: &str = "Untitled";

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// `"key — title"`, or whichever half is present, or `"Untitled"`.
pub fn normalize_title(ticket_key: &str, title: &str) -> String {
    let key = ticket_key.trim();
    let title = title.trim();
    match (key.is_empty(), title.is_empty()) {
        (true, true) => UNTITLED.to_string(),
        (false, false) => format!("{key} — {title}"),
        (false, true) => key.to_string(),
        (true, false) => title.to_string(),
    }
}

/// Pulls a ticket number out of a pasted URL or label.
///
/// `.../tickets/4711` wins, then a trailing run of at least four digits,
/// otherwise the trimmed input is returned as is.
pub fn extract_ticket_key(raw: &str) -> String {
    let input = raw.trim();
    if input.is_empty() {
        return String::new();
    }

    let lowered = input.to_ascii_lowercase();
    if let Some(index) = lowered.find("tickets/") {
        let digits: String = input[index + "tickets/".len()..]
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        if !digits.is_empty() {
            return digits;
        }
    }

    let without_tail = input.trim_end_matches(|c: char| !c.is_ascii_digit());
    let digits_len = without_tail
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_digit())
        .count();
    if digits_len >= 4 {
        return without_tail[without_tail.len() - digits_len..].to_string();
    }

    input.to_string()
}

pub fn normalize_ticket(raw: RawTicket) -> Ticket {
    Ticket {
        id: non_empty(raw.id).unwrap_or_else(generate_id),
        key: non_empty(raw.key).unwrap_or_default(),
        title: non_empty(raw.title).unwrap_or_default(),
        status: raw
            .status
            .as_deref()
            .map(TicketStatus::parse)
            .unwrap_or_default(),
        client: non_empty(raw.client).unwrap_or_default(),
        note: raw.note.unwrap_or_default(),
        color: non_empty(raw.color),
    }
}

/// Returns `None` when the record cannot be a valid time block.
pub fn normalize_event(raw: RawTimeBlock, now: DateTime<Utc>) -> Option<TimeBlock> {
    let start = raw.start.as_ref()?.parse()?;
    let end = raw.end.as_ref()?.parse()?;
    if end <= start {
        return None;
    }
    let ticket_id = non_empty(raw.ticket_id)?;
    let ticket_key = non_empty(raw.ticket_key).unwrap_or_default();
    let title = non_empty(raw.title).unwrap_or_else(|| normalize_title(&ticket_key, ""));
    let created_at = raw.created_at.and_then(|t| t.parse()).unwrap_or(now);
    let updated_at = raw.updated_at.and_then(|t| t.parse()).unwrap_or(created_at);

    Some(TimeBlock {
        id: non_empty(raw.id).unwrap_or_else(generate_id),
        ticket_id,
        ticket_key,
        title,
        start,
        end,
        notes: raw.notes.unwrap_or_default(),
        created_at,
        updated_at,
    })
}

#[cfg(test)]
mod normalize_tests {
    use super::*;
    use crate::shared::core::primitives::RawTimestamp;
    use crate::tests::fixtures::time_blocks::at;
    use rstest::{fixture, rstest};

    #[fixture]
    fn raw_block() -> RawTimeBlock {
        RawTimeBlock {
            id: Some("e-1".into()),
            ticket_id: Some("t-1".into()),
            ticket_key: Some("4711".into()),
            start: Some(at(10, 0).into()),
            end: Some(at(10, 30).into()),
            ..RawTimeBlock::default()
        }
    }

    #[rstest]
    #[case("4711", "Fix login", "4711 — Fix login")]
    #[case("  4711 ", "", "4711")]
    #[case("", "Fix login", "Fix login")]
    #[case(" ", " ", "Untitled")]
    fn it_should_normalize_titles(#[case] key: &str, #[case] title: &str, #[case] expected: &str) {
        assert_eq!(normalize_title(key, title), expected);
    }

    #[rstest]
    #[case("https://acme.zendesk.com/agent/tickets/98765", "98765")]
    #[case("https://acme.zendesk.com/agent/Tickets/12?foo", "12")]
    #[case("Ticket #123456 (urgent)", "123456")]
    #[case("ABC-12", "ABC-12")]
    #[case("  ", "")]
    fn it_should_extract_ticket_keys(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(extract_ticket_key(input), expected);
    }

    #[rstest]
    fn it_should_fill_ticket_defaults() {
        let ticket = normalize_ticket(RawTicket::default());
        assert!(!ticket.id.is_empty());
        assert_eq!(ticket.key, "");
        assert_eq!(ticket.status, TicketStatus::Open);
        assert_eq!(ticket.client, "");
        assert_eq!(ticket.note, "");
        assert_eq!(ticket.color, None);
    }

    #[rstest]
    fn it_should_keep_provided_ticket_fields() {
        let ticket = normalize_ticket(RawTicket {
            id: Some("t-9".into()),
            key: Some("4711".into()),
            status: Some("Closed".into()),
            color: Some("  ".into()),
            ..RawTicket::default()
        });
        assert_eq!(ticket.id, "t-9");
        assert_eq!(ticket.status, TicketStatus::Closed);
        assert_eq!(ticket.color, None);
    }

    #[rstest]
    fn it_should_normalize_a_valid_event(raw_block: RawTimeBlock) {
        let block = normalize_event(raw_block, at(9, 0)).unwrap();
        assert_eq!(block.id, "e-1");
        assert_eq!(block.title, "4711");
        assert_eq!(block.notes, "");
        assert_eq!(block.created_at, at(9, 0));
        assert_eq!(block.updated_at, at(9, 0));
        assert!(block.end > block.start);
    }

    #[rstest]
    fn it_should_generate_an_id_when_missing(mut raw_block: RawTimeBlock) {
        raw_block.id = None;
        let block = normalize_event(raw_block, at(9, 0)).unwrap();
        assert!(!block.id.is_empty());
    }

    #[rstest]
    fn it_should_default_the_title_to_untitled(mut raw_block: RawTimeBlock) {
        raw_block.ticket_key = None;
        let block = normalize_event(raw_block, at(9, 0)).unwrap();
        assert_eq!(block.title, UNTITLED);
    }

    #[rstest]
    #[case(at(10, 30), at(10, 30))]
    #[case(at(11, 0), at(10, 0))]
    fn it_should_reject_non_positive_intervals(
        mut raw_block: RawTimeBlock,
        #[case] start: DateTime<Utc>,
        #[case] end: DateTime<Utc>,
    ) {
        raw_block.start = Some(start.into());
        raw_block.end = Some(end.into());
        assert_eq!(normalize_event(raw_block, at(9, 0)), None);
    }

    #[rstest]
    fn it_should_reject_unparsable_timestamps(mut raw_block: RawTimeBlock) {
        raw_block.end = Some(RawTimestamp::Text("soon".into()));
        assert_eq!(normalize_event(raw_block, at(9, 0)), None);
    }

    #[rstest]
    fn it_should_reject_missing_timestamps(mut raw_block: RawTimeBlock) {
        raw_block.start = None;
        assert_eq!(normalize_event(raw_block, at(9, 0)), None);
    }

    #[rstest]
    fn it_should_reject_a_missing_ticket_reference(mut raw_block: RawTimeBlock) {
        raw_block.ticket_id = Some(" ".into());
        assert_eq!(normalize_event(raw_block, at(9, 0)), None);
    }

    #[rstest]
    fn it_should_keep_stored_audit_timestamps(mut raw_block: RawTimeBlock) {
        raw_block.created_at = Some(at(7, 0).into());
        raw_block.updated_at = Some(at(8, 0).into());
        let block = normalize_event(raw_block, at(9, 0)).unwrap();
        assert_eq!(block.created_at, at(7, 0));
        assert_eq!(block.updated_at, at(8, 0));
    }
}
