// Calendar adapter binds the event store to a calendar widget.
//
// Purpose
// - Translate widget gestures into store mutations.
// - Keep the widget's visual blocks consistent with the store after every mutation.
//
// Responsibilities
// - Snap dragged and resized blocks against every other block on the widget.
// - Track the selected block by id.
// - Validate editor saves and report problems through the user prompt.
//
// Boundaries
// - Holds only transient visual state. Every handle is reset to the store's record,
//   or removed when the store rejected the change.

use crate::modules::time_tracking::application::event_store::{DeleteOutcome, EventStore};
use crate::modules::time_tracking::core::colors::event_colors;
use crate::modules::time_tracking::core::ports::{
    CalendarEvent, CalendarWidget, PROP_NOTES, PROP_TICKET_ID, PROP_TICKET_KEY, TimeBlockHandle, UserPrompt,
};
use crate::modules::time_tracking::core::snap::{Interval, SnapMode, snap_interval};
use crate::modules::time_tracking::core::ticket::Ticket;
use crate::modules::time_tracking::core::time_block::{TimeBlock, TimeBlockPatch};
use crate::shared::core::primitives::{add_minutes, parse_timestamp};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

pub const SELECT_TICKET_FIRST: &str = "Select a ticket first to add a time block.";
pub const INVALID_TIMES: &str = "Please enter valid start and end times.";
pub const END_BEFORE_START: &str = "End time must be after the start time.";
pub const MISSING_TITLE: &str = "Please enter a title for the event.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum GestureOutcome {
    Created { block: TimeBlock },
    Updated { block: TimeBlock, snapped: bool },
    Removed { id: String },
    /// The store refused the change and the widget was reset.
    Reverted { id: String },
    Rejected { message: String },
    Ignored,
}

/// Everything the external editor needs to show one block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorRequest {
    pub id: String,
    pub ticket_id: String,
    pub ticket_key: String,
    pub ticket_title: String,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub notes: String,
}

/// What the editor sends back; times are the raw form inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorSave {
    pub id: String,
    pub title: String,
    pub start: String,
    pub end: String,
    pub notes: String,
}

pub fn to_calendar_event(block: &TimeBlock, ticket: Option<&Ticket>) -> CalendarEvent {
    let seed = if block.ticket_key.is_empty() { &block.ticket_id } else { &block.ticket_key };
    let color = ticket.and_then(|ticket| ticket.color.as_deref());
    CalendarEvent {
        id: block.id.clone(),
        title: block.title.clone(),
        start: block.start,
        end: block.end,
        extended_props: BTreeMap::from([
            (PROP_TICKET_ID.to_string(), block.ticket_id.clone()),
            (PROP_TICKET_KEY.to_string(), block.ticket_key.clone()),
            (PROP_NOTES.to_string(), block.notes.clone()),
        ]),
        colors: event_colors(seed, color),
    }
}

fn reset_handle<H: TimeBlockHandle>(handle: &mut H, block: &TimeBlock) {
    handle.set_start(block.start);
    handle.set_end(block.end);
    handle.set_title(block.title.clone());
    handle.set_extended_prop(PROP_TICKET_ID, block.ticket_id.clone());
    handle.set_extended_prop(PROP_TICKET_KEY, block.ticket_key.clone());
    handle.set_extended_prop(PROP_NOTES, block.notes.clone());
}

pub struct CalendarAdapter<W: CalendarWidget> {
    widget: W,
    selected_event_id: Option<String>,
}

impl<W: CalendarWidget> CalendarAdapter<W> {
    pub fn new(widget: W) -> Self {
        Self {
            widget,
            selected_event_id: None,
        }
    }

    pub fn widget(&self) -> &W {
        &self.widget
    }

    pub fn selected_event_id(&self) -> Option<&str> {
        self.selected_event_id.as_deref()
    }

    /// Draws every stored block onto an empty widget.
    pub fn mount(&mut self, store: &EventStore) {
        for block in store.time_blocks() {
            self.widget.add_event(to_calendar_event(block, store.ticket(&block.ticket_id)));
        }
        tracing::debug!(count = store.time_blocks().len(), "calendar mounted");
    }

    /// Full sync: adds missing blocks, resets drifted ones, removes the ones the store no longer has.
    pub fn reconcile(&mut self, store: &EventStore) {
        let known: HashSet<&str> = store.time_blocks().iter().map(|block| block.id.as_str()).collect();
        let stale: Vec<String> = self
            .widget
            .events()
            .into_iter()
            .map(|handle| handle.id().to_string())
            .filter(|id| !known.contains(id.as_str()))
            .collect();
        for id in &stale {
            self.widget.remove_event(id);
            self.forget_selection(id);
        }
        for block in store.time_blocks() {
            match self.widget.event_mut(&block.id) {
                Some(handle) => reset_handle(handle, block),
                None => self.widget.add_event(to_calendar_event(block, store.ticket(&block.ticket_id))),
            }
        }
    }

    /// Redraws a ticket's blocks so color changes show up.
    pub fn redraw_ticket(&mut self, store: &EventStore, ticket_id: &str) {
        let ticket = store.ticket(ticket_id);
        for block in store.time_blocks().iter().filter(|block| block.ticket_id == ticket_id) {
            self.widget.remove_event(&block.id);
            self.widget.add_event(to_calendar_event(block, ticket));
        }
    }

    fn sync_block(&mut self, store: &EventStore, id: &str) {
        match store.time_block(id) {
            Some(block) => match self.widget.event_mut(id) {
                Some(handle) => reset_handle(handle, block),
                None => self.widget.add_event(to_calendar_event(block, store.ticket(&block.ticket_id))),
            },
            None => {
                self.widget.remove_event(id);
                self.forget_selection(id);
            }
        }
    }

    fn forget_selection(&mut self, id: &str) {
        if self.selected_event_id.as_deref() == Some(id) {
            self.selected_event_id = None;
        }
    }

    pub fn on_event_click(&mut self, id: &str) -> bool {
        if self.widget.event(id).is_none() {
            return false;
        }
        self.selected_event_id = Some(id.to_string());
        true
    }

    pub fn clear_selection(&mut self) {
        self.selected_event_id = None;
    }

    pub fn on_event_unmount(&mut self, id: &str) {
        self.forget_selection(id);
    }

    pub fn on_range_select(
        &mut self,
        store: &mut EventStore,
        range: Interval,
        prompt: &dyn UserPrompt,
        now: DateTime<Utc>,
    ) -> GestureOutcome {
        self.clear_selection();
        let Some(ticket_id) = store.active_ticket_id().map(str::to_string) else {
            prompt.alert(SELECT_TICKET_FIRST);
            return GestureOutcome::Rejected {
                message: SELECT_TICKET_FIRST.to_string(),
            };
        };
        self.create_block(store, &ticket_id, Some(range), now)
    }

    /// A ticket dragged from the list onto the grid at `at`.
    pub fn on_external_drop(
        &mut self,
        store: &mut EventStore,
        ticket_id: &str,
        at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> GestureOutcome {
        let Some(end) = add_minutes(at, store.settings().default_block_minutes) else {
            return GestureOutcome::Ignored;
        };
        self.create_block(store, ticket_id, Interval::new(at, end), now)
    }

    /// The list's "add log" button: a default block starting now.
    pub fn add_log(&mut self, store: &mut EventStore, ticket_id: &str, now: DateTime<Utc>) -> GestureOutcome {
        self.create_block(store, ticket_id, None, now)
    }

    fn create_block(
        &mut self,
        store: &mut EventStore,
        ticket_id: &str,
        range: Option<Interval>,
        now: DateTime<Utc>,
    ) -> GestureOutcome {
        match store.add_time_block(ticket_id, range, now) {
            Some(block) => {
                self.widget.add_event(to_calendar_event(&block, store.ticket(ticket_id)));
                GestureOutcome::Created { block }
            }
            None => GestureOutcome::Ignored,
        }
    }

    /// The widget moved the block to `start..end`; snap it and write it back.
    pub fn on_event_drop(
        &mut self,
        store: &mut EventStore,
        id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> GestureOutcome {
        let Some(handle) = self.widget.event_mut(id) else {
            return GestureOutcome::Ignored;
        };
        handle.set_start(start);
        handle.set_end(end);
        self.commit_gesture(store, id, SnapMode::Move, now)
    }

    pub fn on_event_resize(
        &mut self,
        store: &mut EventStore,
        id: &str,
        start_delta: Duration,
        end_delta: Duration,
        now: DateTime<Utc>,
    ) -> GestureOutcome {
        let Some(handle) = self.widget.event_mut(id) else {
            return GestureOutcome::Ignored;
        };
        let (Some(start), Some(end)) = (handle.start(), handle.end()) else {
            self.sync_block(store, id);
            return GestureOutcome::Reverted { id: id.to_string() };
        };
        let (Some(start), Some(end)) = (start.checked_add_signed(start_delta), end.checked_add_signed(end_delta)) else {
            self.sync_block(store, id);
            return GestureOutcome::Reverted { id: id.to_string() };
        };
        handle.set_start(start);
        handle.set_end(end);
        let mode = SnapMode::from_resize_deltas(start_delta, end_delta);
        self.commit_gesture(store, id, mode, now)
    }

    fn siblings(&self, id: &str) -> Vec<Interval> {
        self.widget
            .events()
            .into_iter()
            .filter(|handle| handle.id() != id)
            .filter_map(|handle| Interval::new(handle.start()?, handle.end()?))
            .collect()
    }

    fn commit_gesture(&mut self, store: &mut EventStore, id: &str, mode: SnapMode, now: DateTime<Utc>) -> GestureOutcome {
        let siblings = self.siblings(id);
        let Some(handle) = self.widget.event_mut(id) else {
            return GestureOutcome::Ignored;
        };
        let Some(start) = handle.start() else {
            self.sync_block(store, id);
            return GestureOutcome::Reverted { id: id.to_string() };
        };
        let Some(end) = handle
            .end()
            .or_else(|| add_minutes(start, store.settings().default_block_minutes))
        else {
            self.sync_block(store, id);
            return GestureOutcome::Reverted { id: id.to_string() };
        };

        let (start, end, snapped) = match Interval::new(start, end) {
            Some(candidate) => {
                let result = snap_interval(candidate, &siblings, mode, store.settings().snap_threshold());
                (result.start, result.end, result.snapped)
            }
            None => (start, end, false),
        };
        handle.set_start(start);
        handle.set_end(end);
        if snapped {
            tracing::debug!(block_id = id, ?mode, %start, %end, "block snapped");
        }

        let patch = TimeBlockPatch {
            id: id.to_string(),
            ticket_id: handle.extended_prop(PROP_TICKET_ID).map(str::to_string),
            title: Some(handle.title().to_string()),
            start: Some(start),
            end: Some(end),
            notes: handle.extended_prop(PROP_NOTES).map(str::to_string),
        };
        let outcome = match store.update_time_block(&patch, now) {
            Some(block) => GestureOutcome::Updated { block, snapped },
            None => GestureOutcome::Reverted { id: id.to_string() },
        };
        self.sync_block(store, id);
        outcome
    }

    pub fn on_event_open(&self, store: &EventStore, id: &str) -> Option<EditorRequest> {
        let block = store.time_block(id)?;
        let ticket_title = store
            .ticket(&block.ticket_id)
            .map(|ticket| ticket.title.clone())
            .unwrap_or_default();
        Some(EditorRequest {
            id: block.id.clone(),
            ticket_id: block.ticket_id.clone(),
            ticket_key: block.ticket_key.clone(),
            ticket_title,
            title: block.title.clone(),
            start: block.start,
            end: block.end,
            notes: block.notes.clone(),
        })
    }

    pub fn on_editor_save(
        &mut self,
        store: &mut EventStore,
        save: &EditorSave,
        prompt: &dyn UserPrompt,
        now: DateTime<Utc>,
    ) -> GestureOutcome {
        let reject = |message: &str| {
            prompt.alert(message);
            GestureOutcome::Rejected {
                message: message.to_string(),
            }
        };
        let (Some(start), Some(end)) = (parse_timestamp(&save.start), parse_timestamp(&save.end)) else {
            return reject(INVALID_TIMES);
        };
        if end <= start {
            return reject(END_BEFORE_START);
        }
        let title = save.title.trim();
        if title.is_empty() {
            return reject(MISSING_TITLE);
        }
        if store.time_block(&save.id).is_none() {
            return GestureOutcome::Ignored;
        }

        let patch = TimeBlockPatch {
            id: save.id.clone(),
            title: Some(title.to_string()),
            start: Some(start),
            end: Some(end),
            notes: Some(save.notes.clone()),
            ..TimeBlockPatch::default()
        };
        let outcome = match store.update_time_block(&patch, now) {
            Some(block) => GestureOutcome::Updated { block, snapped: false },
            None => GestureOutcome::Reverted { id: save.id.clone() },
        };
        self.sync_block(store, &save.id);
        outcome
    }

    pub fn on_editor_delete(&mut self, store: &mut EventStore, id: &str) -> GestureOutcome {
        if !store.remove_time_block(id) {
            return GestureOutcome::Ignored;
        }
        self.sync_block(store, id);
        GestureOutcome::Removed { id: id.to_string() }
    }

    pub fn delete_ticket(&mut self, store: &mut EventStore, ticket_id: &str, prompt: &dyn UserPrompt) -> DeleteOutcome {
        let outcome = store.delete_ticket(ticket_id, prompt);
        if let DeleteOutcome::Deleted { removed_time_block_ids } = &outcome {
            for id in removed_time_block_ids {
                self.sync_block(store, id);
            }
        }
        outcome
    }
}
