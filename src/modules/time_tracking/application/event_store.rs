// Event store owns the ticket and time-block collections.
//
// Purpose
// - Single source of truth for tickets, time blocks and the active ticket.
//
// Responsibilities
// - Normalize every incoming record, upsert it by id, and queue a snapshot for storage.
// - Keep every time block attached to an existing ticket.
// - Gate destructive ticket deletion behind a user confirmation.
//
// Boundaries
// - Synchronous. Storage writes are queued, never awaited.
// - No calendar concerns; the calendar adapter mirrors this state.

use crate::modules::time_tracking::application::persistence::{LoadedState, PersistenceQueue, Snapshot};
use crate::modules::time_tracking::core::normalize::{
    UNTITLED, extract_ticket_key, normalize_event, normalize_ticket, normalize_title,
};
use crate::modules::time_tracking::core::ports::UserPrompt;
use crate::modules::time_tracking::core::settings::TrackerSettings;
use crate::modules::time_tracking::core::snap::Interval;
use crate::modules::time_tracking::core::ticket::{RawTicket, Ticket, TicketPatch};
use crate::modules::time_tracking::core::time_block::{RawTimeBlock, TimeBlock, TimeBlockPatch};
use crate::shared::core::primitives::{add_minutes, snap_to_minutes};
use crate::shared::core::upsert::{Placement, find_by_id, upsert_by_id};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum DeleteOutcome {
    NotFound,
    Cancelled,
    #[serde(rename_all = "camelCase")]
    Deleted { removed_time_block_ids: Vec<String> },
}

/// One row of an imported ticket table, as read from its matched columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportRow {
    pub id: String,
    pub subject: String,
    pub status: String,
    pub client: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub skipped: usize,
}

fn present(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

pub struct EventStore {
    tickets: Vec<Ticket>,
    time_blocks: Vec<TimeBlock>,
    active_ticket_id: Option<String>,
    settings: TrackerSettings,
    persistence: PersistenceQueue,
}

impl EventStore {
    pub fn new(settings: TrackerSettings, persistence: PersistenceQueue) -> Self {
        Self {
            tickets: Vec::new(),
            time_blocks: Vec::new(),
            active_ticket_id: None,
            settings,
            persistence,
        }
    }

    /// Seeds the store from storage and writes back collections the loader had to repair.
    pub fn from_loaded(loaded: LoadedState, settings: TrackerSettings, persistence: PersistenceQueue) -> Self {
        let store = Self {
            active_ticket_id: loaded.tickets.first().map(|ticket| ticket.id.clone()),
            tickets: loaded.tickets,
            time_blocks: loaded.time_blocks,
            settings,
            persistence,
        };
        if loaded.tickets_repaired {
            store.persist_tickets();
        }
        if loaded.time_blocks_repaired {
            store.persist_time_blocks();
        }
        store
    }

    pub fn tickets(&self) -> &[Ticket] {
        &self.tickets
    }

    pub fn time_blocks(&self) -> &[TimeBlock] {
        &self.time_blocks
    }

    pub fn ticket(&self, id: &str) -> Option<&Ticket> {
        find_by_id(&self.tickets, id)
    }

    pub fn time_block(&self, id: &str) -> Option<&TimeBlock> {
        find_by_id(&self.time_blocks, id)
    }

    pub fn active_ticket_id(&self) -> Option<&str> {
        self.active_ticket_id.as_deref()
    }

    pub fn active_ticket(&self) -> Option<&Ticket> {
        self.active_ticket_id.as_deref().and_then(|id| self.ticket(id))
    }

    pub fn settings(&self) -> &TrackerSettings {
        &self.settings
    }

    fn persist_tickets(&self) {
        self.persistence.enqueue(Snapshot::Tickets(self.tickets.clone()));
    }

    fn persist_time_blocks(&self) {
        self.persistence.enqueue(Snapshot::TimeBlocks(self.time_blocks.clone()));
    }

    pub fn add_ticket(&mut self, raw: RawTicket) -> Ticket {
        let ticket = normalize_ticket(raw);
        upsert_by_id(&mut self.tickets, ticket.clone(), Placement::Front);
        self.active_ticket_id = Some(ticket.id.clone());
        self.persist_tickets();
        tracing::debug!(ticket_id = %ticket.id, key = %ticket.key, "ticket added");
        ticket
    }

    /// Creates a ticket from what the user typed into the new-ticket form.
    pub fn create_ticket(&mut self, key_input: &str, title: &str) -> Option<Ticket> {
        let key = extract_ticket_key(key_input);
        let title = title.trim();
        if key.is_empty() && title.is_empty() {
            tracing::debug!("ignoring empty ticket form");
            return None;
        }
        Some(self.add_ticket(RawTicket {
            key: Some(key),
            title: Some(title.to_string()),
            ..RawTicket::default()
        }))
    }

    pub fn update_ticket(&mut self, patch: &TicketPatch) -> Option<Ticket> {
        let ticket = self.tickets.iter_mut().find(|ticket| ticket.id == patch.id)?;
        if !ticket.apply(patch) {
            return Some(ticket.clone());
        }
        let updated = ticket.clone();
        self.refresh_ticket_keys(&updated);
        self.persist_tickets();
        tracing::debug!(ticket_id = %updated.id, "ticket updated");
        Some(updated)
    }

    fn refresh_ticket_keys(&mut self, ticket: &Ticket) {
        let mut touched = false;
        for block in self.time_blocks.iter_mut().filter(|block| block.ticket_id == ticket.id) {
            if block.ticket_key != ticket.key {
                block.ticket_key = ticket.key.clone();
                touched = true;
            }
        }
        if touched {
            self.persist_time_blocks();
        }
    }

    pub fn select_ticket(&mut self, id: &str) -> bool {
        if self.ticket(id).is_none() {
            return false;
        }
        self.active_ticket_id = Some(id.to_string());
        true
    }

    /// Without a range the block starts at `now` snapped to the grid and lasts the default duration.
    pub fn add_time_block(
        &mut self,
        ticket_id: &str,
        range: Option<Interval>,
        now: DateTime<Utc>,
    ) -> Option<TimeBlock> {
        let Some(ticket) = self.ticket(ticket_id) else {
            tracing::debug!(ticket_id, "cannot add a time block to an unknown ticket");
            return None;
        };
        let (start, end) = match range {
            Some(range) => (range.start, range.end),
            None => {
                let start = snap_to_minutes(now, self.settings.now_snap_minutes);
                let Some(end) = add_minutes(start, self.settings.default_block_minutes) else {
                    tracing::debug!(ticket_id, %start, "default block would end outside the calendar");
                    return None;
                };
                (start, end)
            }
        };
        let raw = RawTimeBlock {
            ticket_id: Some(ticket.id.clone()),
            ticket_key: Some(ticket.key.clone()),
            title: Some(normalize_title(&ticket.key, &ticket.title)),
            start: Some(start.into()),
            end: Some(end.into()),
            created_at: Some(now.into()),
            updated_at: Some(now.into()),
            ..RawTimeBlock::default()
        };
        let block = normalize_event(raw, now)?;
        upsert_by_id(&mut self.time_blocks, block.clone(), Placement::Back);
        self.persist_time_blocks();
        tracing::debug!(block_id = %block.id, ticket_id, "time block added");
        Some(block)
    }

    pub fn update_time_block(&mut self, patch: &TimeBlockPatch, now: DateTime<Utc>) -> Option<TimeBlock> {
        let result = self.merge_time_block(patch, now);
        self.persist_time_blocks();
        result
    }

    fn merge_time_block(&mut self, patch: &TimeBlockPatch, now: DateTime<Utc>) -> Option<TimeBlock> {
        let existing = self.time_block(&patch.id);
        let mut raw = patch.merge_into(existing);
        let ticket_id = raw.ticket_id.clone().unwrap_or_default();
        let Some(ticket) = self.ticket(&ticket_id) else {
            tracing::debug!(block_id = %patch.id, ticket_id, "dropping time block of unknown ticket");
            return None;
        };
        raw.ticket_key = Some(ticket.key.clone());
        raw.updated_at = Some(now.into());

        let Some(block) = normalize_event(raw, now) else {
            tracing::debug!(block_id = %patch.id, "dropping invalid time block update");
            return None;
        };
        upsert_by_id(&mut self.time_blocks, block.clone(), Placement::Back);
        tracing::debug!(block_id = %block.id, start = %block.start, end = %block.end, "time block updated");
        Some(block)
    }

    pub fn remove_time_block(&mut self, id: &str) -> bool {
        let before = self.time_blocks.len();
        self.time_blocks.retain(|block| block.id != id);
        let removed = self.time_blocks.len() != before;
        if removed {
            self.persist_time_blocks();
            tracing::debug!(block_id = id, "time block removed");
        }
        removed
    }

    pub fn delete_ticket(&mut self, id: &str, prompt: &dyn UserPrompt) -> DeleteOutcome {
        let Some(ticket) = self.ticket(id) else {
            return DeleteOutcome::NotFound;
        };
        let label = if ticket.key.is_empty() { UNTITLED } else { ticket.key.as_str() };
        if !prompt.confirm(&format!("Delete ticket {label} and all its logs?")) {
            tracing::debug!(ticket_id = id, "ticket deletion cancelled");
            return DeleteOutcome::Cancelled;
        }

        self.tickets.retain(|ticket| ticket.id != id);
        let (removed, kept): (Vec<TimeBlock>, Vec<TimeBlock>) = std::mem::take(&mut self.time_blocks)
            .into_iter()
            .partition(|block| block.ticket_id == id);
        self.time_blocks = kept;
        if self.active_ticket_id.as_deref() == Some(id) || self.active_ticket().is_none() {
            self.active_ticket_id = self.tickets.first().map(|ticket| ticket.id.clone());
        }
        self.persist_tickets();
        self.persist_time_blocks();

        let removed_time_block_ids: Vec<String> = removed.into_iter().map(|block| block.id).collect();
        tracing::info!(ticket_id = id, removed = removed_time_block_ids.len(), "ticket deleted");
        DeleteOutcome::Deleted { removed_time_block_ids }
    }

    /// Matches rows by extracted key, then by raw id; only present fields that differ are written.
    pub fn import_from_table(&mut self, rows: Vec<ImportRow>) -> ImportSummary {
        let mut summary = ImportSummary::default();
        for row in rows {
            let key = extract_ticket_key(&row.id);
            let raw_id = row.id.trim();
            let subject = row.subject.trim();
            if key.is_empty() && subject.is_empty() {
                summary.skipped += 1;
                continue;
            }

            let by_key = self
                .tickets
                .iter()
                .position(|ticket| !key.is_empty() && ticket.key == key);
            let by_id = || self.tickets.iter().position(|ticket| !raw_id.is_empty() && ticket.id == raw_id);

            match by_key.or_else(by_id) {
                Some(index) => {
                    // A row matched by its id carries no key of its own.
                    let key = if by_key.is_none() && key == raw_id { None } else { present(&key) };
                    let patch = TicketPatch {
                        id: self.tickets[index].id.clone(),
                        key,
                        title: present(subject),
                        status: present(&row.status),
                        client: row.client.as_deref().and_then(present),
                        ..TicketPatch::default()
                    };
                    if self.tickets[index].apply(&patch) {
                        let updated = self.tickets[index].clone();
                        self.refresh_ticket_keys(&updated);
                        summary.updated += 1;
                    } else {
                        summary.unchanged += 1;
                    }
                }
                None => {
                    let ticket = normalize_ticket(RawTicket {
                        key: Some(key),
                        title: Some(subject.to_string()),
                        status: present(&row.status),
                        client: row.client.clone(),
                        ..RawTicket::default()
                    });
                    upsert_by_id(&mut self.tickets, ticket, Placement::Front);
                    summary.created += 1;
                }
            }
        }

        if summary.created + summary.updated > 0 {
            self.persist_tickets();
        }
        if self.active_ticket().is_none() {
            self.active_ticket_id = self.tickets.first().map(|ticket| ticket.id.clone());
        }
        tracing::info!(
            created = summary.created,
            updated = summary.updated,
            unchanged = summary.unchanged,
            skipped = summary.skipped,
            "ticket table imported"
        );
        summary
    }
}
