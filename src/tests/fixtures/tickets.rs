// Shared test fixtures for tickets.
// Compiled only under cfg(test) through `src/lib.rs`.

use crate::modules::time_tracking::core::ticket::{Ticket, TicketStatus};

pub struct TicketBuilder {
    inner: Ticket,
}

impl Default for TicketBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(dead_code)]
impl TicketBuilder {
    pub fn new() -> Self {
        Self {
            inner: Ticket {
                id: "ticket-fixed-0001".to_string(),
                key: "123456".to_string(),
                title: "Printer on fire".to_string(),
                status: TicketStatus::Open,
                client: String::new(),
                note: String::new(),
                color: None,
            },
        }
    }

    pub fn id(mut self, v: impl Into<String>) -> Self {
        self.inner.id = v.into();
        self
    }

    pub fn key(mut self, v: impl Into<String>) -> Self {
        self.inner.key = v.into();
        self
    }

    pub fn title(mut self, v: impl Into<String>) -> Self {
        self.inner.title = v.into();
        self
    }

    pub fn status(mut self, v: TicketStatus) -> Self {
        self.inner.status = v;
        self
    }

    pub fn client(mut self, v: impl Into<String>) -> Self {
        self.inner.client = v.into();
        self
    }

    pub fn note(mut self, v: impl Into<String>) -> Self {
        self.inner.note = v.into();
        self
    }

    pub fn color(mut self, v: impl Into<String>) -> Self {
        self.inner.color = Some(v.into());
        self
    }

    pub fn build(self) -> Ticket {
        self.inner
    }
}
