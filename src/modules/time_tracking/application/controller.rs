// Application controller: the single owner of the tracker's runtime state.
//
// Purpose
// - Construct the store, calendar adapter, filters and error banner once and route
//   every user action through them.
//
// Responsibilities
// - Keep the calendar mirror and ticket list consistent after each action.
// - Persist user settings when filters change.
// - Collect unexpected failures in the error banner.
//
// Boundaries
// - No transport concerns. The HTTP shell holds the controller behind one mutex.

use crate::modules::time_tracking::adapters::inbound::csv_import::parse_ticket_table;
use crate::modules::time_tracking::adapters::outbound::csv_export::{build_logs_csv, build_tickets_csv};
use crate::modules::time_tracking::application::calendar_adapter::{
    CalendarAdapter, EditorRequest, EditorSave, GestureOutcome,
};
use crate::modules::time_tracking::application::error_banner::ErrorBanner;
use crate::modules::time_tracking::application::errors::ApplicationError;
use crate::modules::time_tracking::application::event_store::{DeleteOutcome, EventStore, ImportSummary};
use crate::modules::time_tracking::application::persistence::{PersistenceQueue, Snapshot};
use crate::modules::time_tracking::application::ticket_list::{TicketListView, render_ticket_list};
use crate::modules::time_tracking::core::filter::TicketFilters;
use crate::modules::time_tracking::core::ports::{CalendarWidget, UserPrompt};
use crate::modules::time_tracking::core::settings::UserSettings;
use crate::modules::time_tracking::core::snap::Interval;
use crate::modules::time_tracking::core::ticket::{Ticket, TicketPatch};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::collections::HashSet;

/// Filter changes from the ticket list toolbar; absent fields stay as they are.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterUpdate {
    pub status_filters: Option<Vec<String>>,
    pub client_filter: Option<String>,
    pub theme_preset_id: Option<String>,
}

pub struct AppController<W: CalendarWidget> {
    store: EventStore,
    calendar: CalendarAdapter<W>,
    user_settings: UserSettings,
    search_term: String,
    collapsed: HashSet<String>,
    errors: ErrorBanner,
    persistence: PersistenceQueue,
}

impl<W: CalendarWidget> AppController<W> {
    pub fn new(store: EventStore, widget: W, user_settings: UserSettings, persistence: PersistenceQueue) -> Self {
        let mut calendar = CalendarAdapter::new(widget);
        calendar.mount(&store);
        Self {
            store,
            calendar,
            user_settings,
            search_term: String::new(),
            collapsed: HashSet::new(),
            errors: ErrorBanner::default(),
            persistence,
        }
    }

    pub fn store(&self) -> &EventStore {
        &self.store
    }

    pub fn calendar(&self) -> &CalendarAdapter<W> {
        &self.calendar
    }

    pub fn user_settings(&self) -> &UserSettings {
        &self.user_settings
    }

    pub fn errors(&self) -> &ErrorBanner {
        &self.errors
    }

    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }

    pub fn report_error(&mut self, prefix: &str, error: &dyn std::fmt::Display) {
        self.errors.report(prefix, error);
    }

    pub fn filters(&self) -> TicketFilters {
        TicketFilters {
            statuses: self.user_settings.status_filters.clone(),
            client: self.user_settings.client_filter.clone(),
            search: self.search_term.clone(),
        }
    }

    pub fn ticket_list(&self) -> TicketListView {
        render_ticket_list(
            self.store.tickets(),
            self.store.time_blocks(),
            &self.filters(),
            self.store.active_ticket_id(),
            &self.collapsed,
        )
    }

    pub fn update_filters(&mut self, update: FilterUpdate) -> &UserSettings {
        if let Some(statuses) = update.status_filters {
            self.user_settings.status_filters = statuses
                .into_iter()
                .map(|status| status.trim().to_lowercase())
                .filter(|status| !status.is_empty())
                .collect();
        }
        if let Some(client) = update.client_filter {
            self.user_settings.client_filter = client.trim().to_string();
        }
        if let Some(theme) = update.theme_preset_id {
            self.user_settings.theme_preset_id = theme;
        }
        self.persistence.enqueue(Snapshot::Settings(self.user_settings.clone()));
        &self.user_settings
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn set_search_term(&mut self, term: &str) {
        self.search_term = term.to_string();
    }

    pub fn create_ticket(&mut self, key_input: &str, title: &str) -> Option<Ticket> {
        self.store.create_ticket(key_input, title)
    }

    pub fn update_ticket(&mut self, patch: &TicketPatch) -> Result<Ticket, ApplicationError> {
        let ticket = self
            .store
            .update_ticket(patch)
            .ok_or_else(|| ApplicationError::ticket_not_found(&patch.id))?;
        self.calendar.redraw_ticket(&self.store, &ticket.id);
        Ok(ticket)
    }

    /// Selecting the active ticket again toggles its note section.
    pub fn select_ticket(&mut self, id: &str) -> Result<(), ApplicationError> {
        if self.store.active_ticket_id() == Some(id) {
            if !self.collapsed.remove(id) {
                self.collapsed.insert(id.to_string());
            }
            return Ok(());
        }
        if !self.store.select_ticket(id) {
            return Err(ApplicationError::ticket_not_found(id));
        }
        self.collapsed.remove(id);
        Ok(())
    }

    pub fn delete_ticket(&mut self, id: &str, prompt: &dyn UserPrompt) -> DeleteOutcome {
        let outcome = self.calendar.delete_ticket(&mut self.store, id, prompt);
        if matches!(outcome, DeleteOutcome::Deleted { .. }) {
            self.collapsed.remove(id);
        }
        outcome
    }

    pub fn add_log(&mut self, ticket_id: &str, now: DateTime<Utc>) -> GestureOutcome {
        self.calendar.add_log(&mut self.store, ticket_id, now)
    }

    pub fn select_range(&mut self, range: Interval, prompt: &dyn UserPrompt, now: DateTime<Utc>) -> GestureOutcome {
        self.calendar.on_range_select(&mut self.store, range, prompt, now)
    }

    pub fn click_event(&mut self, id: &str) -> bool {
        self.calendar.on_event_click(id)
    }

    pub fn drop_event(&mut self, id: &str, start: DateTime<Utc>, end: DateTime<Utc>, now: DateTime<Utc>) -> GestureOutcome {
        self.calendar.on_event_drop(&mut self.store, id, start, end, now)
    }

    pub fn resize_event(
        &mut self,
        id: &str,
        start_delta: Duration,
        end_delta: Duration,
        now: DateTime<Utc>,
    ) -> GestureOutcome {
        self.calendar
            .on_event_resize(&mut self.store, id, start_delta, end_delta, now)
    }

    pub fn drop_ticket(&mut self, ticket_id: &str, at: DateTime<Utc>, now: DateTime<Utc>) -> GestureOutcome {
        self.calendar.on_external_drop(&mut self.store, ticket_id, at, now)
    }

    pub fn open_editor(&self, id: &str) -> Option<EditorRequest> {
        self.calendar.on_event_open(&self.store, id)
    }

    pub fn save_editor(&mut self, save: &EditorSave, prompt: &dyn UserPrompt, now: DateTime<Utc>) -> GestureOutcome {
        self.calendar.on_editor_save(&mut self.store, save, prompt, now)
    }

    pub fn delete_event(&mut self, id: &str) -> GestureOutcome {
        self.calendar.on_editor_delete(&mut self.store, id)
    }

    pub fn export_logs_csv(&self) -> String {
        build_logs_csv(self.store.tickets(), self.store.time_blocks())
    }

    pub fn export_tickets_csv(&self) -> String {
        build_tickets_csv(self.store.tickets())
    }

    pub fn import_tickets_csv(&mut self, text: &str) -> Result<ImportSummary, ApplicationError> {
        let rows = parse_ticket_table(text)?;
        let summary = self.store.import_from_table(rows);
        self.calendar.reconcile(&self.store);
        Ok(summary)
    }
}
