// Ports define what the tracker needs from the outside world, without implementing it.
//
// Purpose
// - Describe the calendar widget, its per-block handles, and the user prompt as traits.
//
// Boundaries
// - No concrete widget here. Adapters implement these traits in the adapters layer.
// - The widget only mirrors the store. It is never the source of truth.

use crate::modules::time_tracking::core::colors::EventColors;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

pub const PROP_TICKET_ID: &str = "ticketId";
pub const PROP_TICKET_KEY: &str = "ticketKey";
pub const PROP_NOTES: &str = "notes";

/// What the widget is asked to draw for one time block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub extended_props: BTreeMap<String, String>,
    #[serde(flatten)]
    pub colors: EventColors,
}

/// A mutable visual block owned by the widget.
pub trait TimeBlockHandle {
    fn id(&self) -> &str;
    fn start(&self) -> Option<DateTime<Utc>>;
    fn end(&self) -> Option<DateTime<Utc>>;
    fn title(&self) -> &str;
    fn extended_prop(&self, key: &str) -> Option<&str>;
    fn set_extended_prop(&mut self, key: &str, value: String);
    fn set_start(&mut self, start: DateTime<Utc>);
    fn set_end(&mut self, end: DateTime<Utc>);
    fn set_title(&mut self, title: String);
}

pub trait CalendarWidget {
    type Handle: TimeBlockHandle;

    fn add_event(&mut self, event: CalendarEvent);
    fn remove_event(&mut self, id: &str) -> bool;
    fn event(&self, id: &str) -> Option<&Self::Handle>;
    fn event_mut(&mut self, id: &str) -> Option<&mut Self::Handle>;
    fn events(&self) -> Vec<&Self::Handle>;
}

/// Blocking confirmations and notices shown to the user.
pub trait UserPrompt {
    fn confirm(&self, message: &str) -> bool;
    fn alert(&self, message: &str);
}
