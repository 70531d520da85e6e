use crate::shared::core::upsert::Identified;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TicketStatus {
    #[default]
    Open,
    InProgress,
    Closed,
    Other(String),
}

impl TicketStatus {
    /// Case-insensitive; blank input means `Open`, unknown values are kept lowercased.
    pub fn parse(value: &str) -> Self {
        let normalized = value.trim().to_lowercase();
        match normalized.as_str() {
            "" | "open" => TicketStatus::Open,
            "in-progress" | "in progress" | "in_progress" | "inprogress" => TicketStatus::InProgress,
            "closed" => TicketStatus::Closed,
            _ => TicketStatus::Other(normalized),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TicketStatus::Open => "open",
            TicketStatus::InProgress => "in-progress",
            TicketStatus::Closed => "closed",
            TicketStatus::Other(value) => value,
        }
    }
}

impl From<String> for TicketStatus {
    fn from(value: String) -> Self {
        TicketStatus::parse(&value)
    }
}

impl From<TicketStatus> for String {
    fn from(value: TicketStatus) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: String,
    pub key: String,
    pub title: String,
    pub status: TicketStatus,
    pub client: String,
    pub note: String,
    pub color: Option<String>,
}

impl Identified for Ticket {
    fn id(&self) -> &str {
        &self.id
    }
}

/// A ticket as found in storage, forms or imports; every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawTicket {
    pub id: Option<String>,
    pub key: Option<String>,
    pub title: Option<String>,
    pub status: Option<String>,
    pub client: Option<String>,
    pub note: Option<String>,
    pub color: Option<String>,
}

/// Edit-form changes. `None` leaves the field untouched; an empty color clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TicketPatch {
    pub id: String,
    pub key: Option<String>,
    pub title: Option<String>,
    pub status: Option<String>,
    pub client: Option<String>,
    pub note: Option<String>,
    pub color: Option<String>,
}

impl Ticket {
    /// Applies the patch and reports whether anything changed.
    pub fn apply(&mut self, patch: &TicketPatch) -> bool {
        let before = self.clone();
        if let Some(key) = &patch.key {
            self.key = key.trim().to_string();
        }
        if let Some(title) = &patch.title {
            self.title = title.trim().to_string();
        }
        if let Some(status) = &patch.status {
            self.status = TicketStatus::parse(status);
        }
        if let Some(client) = &patch.client {
            self.client = client.trim().to_string();
        }
        if let Some(note) = &patch.note {
            self.note = note.clone();
        }
        if let Some(color) = &patch.color {
            let color = color.trim();
            self.color = (!color.is_empty()).then(|| color.to_string());
        }
        *self != before
    }
}
