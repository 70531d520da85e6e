// Ticket list view: filtered rows with time totals, ready for any front end to draw.

use crate::modules::time_tracking::core::filter::{TicketFilters, filter_tickets};
use crate::modules::time_tracking::core::normalize::{UNTITLED, normalize_title};
use crate::modules::time_tracking::core::ticket::{Ticket, TicketStatus};
use crate::modules::time_tracking::core::time_block::TimeBlock;
use crate::modules::time_tracking::core::totals::{format_minutes, ticket_totals};
use serde::Serialize;
use std::collections::HashSet;

const ZENDESK_TICKET_URL: &str = "https://zendesk.com/agent/tickets/";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketRow {
    pub id: String,
    pub key: String,
    pub title: String,
    pub client: String,
    pub status: TicketStatus,
    pub color: Option<String>,
    pub total_minutes: i64,
    pub total_label: String,
    pub active: bool,
    pub collapsed: bool,
    /// Active and not collapsed; the note editor is shown.
    pub expanded: bool,
    pub note: String,
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketListView {
    /// Every ticket, before filtering.
    pub total_count: usize,
    pub rows: Vec<TicketRow>,
}

fn zendesk_link(key: &str) -> Option<String> {
    (!key.is_empty() && key.chars().all(|c| c.is_ascii_digit())).then(|| format!("{ZENDESK_TICKET_URL}{key}"))
}

pub fn render_ticket_list(
    tickets: &[Ticket],
    blocks: &[TimeBlock],
    filters: &TicketFilters,
    active_ticket_id: Option<&str>,
    collapsed: &HashSet<String>,
) -> TicketListView {
    let totals = ticket_totals(blocks);
    let rows = filter_tickets(tickets, filters)
        .into_iter()
        .map(|ticket| {
            let total_minutes = totals.get(&ticket.id).copied().unwrap_or(0);
            let active = active_ticket_id == Some(ticket.id.as_str());
            let is_collapsed = collapsed.contains(&ticket.id);
            TicketRow {
                id: ticket.id.clone(),
                key: if ticket.key.is_empty() { UNTITLED.to_string() } else { ticket.key.clone() },
                title: if ticket.title.is_empty() {
                    normalize_title(&ticket.key, "")
                } else {
                    ticket.title.clone()
                },
                client: ticket.client.clone(),
                status: ticket.status.clone(),
                color: ticket.color.clone(),
                total_minutes,
                total_label: format_minutes(total_minutes),
                active,
                collapsed: is_collapsed,
                expanded: active && !is_collapsed,
                note: ticket.note.clone(),
                link: zendesk_link(&ticket.key),
            }
        })
        .collect();

    TicketListView {
        total_count: tickets.len(),
        rows,
    }
}
