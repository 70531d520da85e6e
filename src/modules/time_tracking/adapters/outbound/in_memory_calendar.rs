// In memory implementation of the CalendarWidget port.
//
// Purpose
// - Hold the visual mirror for the HTTP shell, which hands it to the front end as JSON.
// - Exercise the calendar adapter in tests without a real grid.

use crate::modules::time_tracking::core::colors::EventColors;
use crate::modules::time_tracking::core::ports::{CalendarEvent, CalendarWidget, TimeBlockHandle};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEventHandle {
    id: String,
    title: String,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    extended_props: BTreeMap<String, String>,
    #[serde(flatten)]
    colors: EventColors,
}

impl CalendarEventHandle {
    pub fn colors(&self) -> &EventColors {
        &self.colors
    }

    /// Drops the end, as the grid does for blocks dragged out of the all-day row.
    pub fn clear_end(&mut self) {
        self.end = None;
    }
}

impl From<CalendarEvent> for CalendarEventHandle {
    fn from(event: CalendarEvent) -> Self {
        Self {
            id: event.id,
            title: event.title,
            start: Some(event.start),
            end: Some(event.end),
            extended_props: event.extended_props,
            colors: event.colors,
        }
    }
}

impl TimeBlockHandle for CalendarEventHandle {
    fn id(&self) -> &str {
        &self.id
    }

    fn start(&self) -> Option<DateTime<Utc>> {
        self.start
    }

    fn end(&self) -> Option<DateTime<Utc>> {
        self.end
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn extended_prop(&self, key: &str) -> Option<&str> {
        self.extended_props.get(key).map(String::as_str)
    }

    fn set_extended_prop(&mut self, key: &str, value: String) {
        self.extended_props.insert(key.to_string(), value);
    }

    fn set_start(&mut self, start: DateTime<Utc>) {
        self.start = Some(start);
    }

    fn set_end(&mut self, end: DateTime<Utc>) {
        self.end = Some(end);
    }

    fn set_title(&mut self, title: String) {
        self.title = title;
    }
}

#[derive(Debug, Default)]
pub struct InMemoryCalendarWidget {
    events: Vec<CalendarEventHandle>,
}

impl InMemoryCalendarWidget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl CalendarWidget for InMemoryCalendarWidget {
    type Handle = CalendarEventHandle;

    fn add_event(&mut self, event: CalendarEvent) {
        let handle = CalendarEventHandle::from(event);
        match self.events.iter().position(|existing| existing.id == handle.id) {
            Some(index) => self.events[index] = handle,
            None => self.events.push(handle),
        }
    }

    fn remove_event(&mut self, id: &str) -> bool {
        let before = self.events.len();
        self.events.retain(|handle| handle.id != id);
        self.events.len() != before
    }

    fn event(&self, id: &str) -> Option<&CalendarEventHandle> {
        self.events.iter().find(|handle| handle.id == id)
    }

    fn event_mut(&mut self, id: &str) -> Option<&mut CalendarEventHandle> {
        self.events.iter_mut().find(|handle| handle.id == id)
    }

    fn events(&self) -> Vec<&CalendarEventHandle> {
        self.events.iter().collect()
    }
}
