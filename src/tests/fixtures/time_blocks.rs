// Shared test fixtures for time blocks.
// Compiled only under cfg(test) through `src/lib.rs`.

use crate::modules::time_tracking::core::time_block::TimeBlock;
use chrono::{DateTime, TimeZone, Utc};

/// 2024-03-04 at `hour:minute` UTC.
pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 4, hour, minute, 0).unwrap()
}

pub struct TimeBlockBuilder {
    inner: TimeBlock,
}

impl Default for TimeBlockBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(dead_code)]
impl TimeBlockBuilder {
    pub fn new() -> Self {
        Self {
            inner: TimeBlock {
                id: "block-fixed-0001".to_string(),
                ticket_id: "ticket-fixed-0001".to_string(),
                ticket_key: "123456".to_string(),
                title: "123456 — Printer on fire".to_string(),
                start: at(10, 0),
                end: at(10, 30),
                notes: String::new(),
                created_at: at(8, 0),
                updated_at: at(8, 0),
            },
        }
    }

    pub fn id(mut self, v: impl Into<String>) -> Self {
        self.inner.id = v.into();
        self
    }

    pub fn ticket_id(mut self, v: impl Into<String>) -> Self {
        self.inner.ticket_id = v.into();
        self
    }

    pub fn ticket_key(mut self, v: impl Into<String>) -> Self {
        self.inner.ticket_key = v.into();
        self
    }

    pub fn title(mut self, v: impl Into<String>) -> Self {
        self.inner.title = v.into();
        self
    }

    pub fn start(mut self, v: DateTime<Utc>) -> Self {
        self.inner.start = v;
        self
    }

    pub fn end(mut self, v: DateTime<Utc>) -> Self {
        self.inner.end = v;
        self
    }

    pub fn span(self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.start(start).end(end)
    }

    pub fn notes(mut self, v: impl Into<String>) -> Self {
        self.inner.notes = v.into();
        self
    }

    pub fn build(self) -> TimeBlock {
        self.inner
    }
}
