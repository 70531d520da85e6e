use crate::shared::core::primitives::{RawTimestamp, minutes_between};
use crate::shared::core::upsert::Identified;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A logged interval of work on one ticket. `end` is always after `start`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeBlock {
    pub id: String,
    pub ticket_id: String,
    pub ticket_key: String,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TimeBlock {
    pub fn duration_minutes(&self) -> i64 {
        minutes_between(self.start, self.end)
    }
}

impl Identified for TimeBlock {
    fn id(&self) -> &str {
        &self.id
    }
}

/// A time block as found in storage or coming back from the calendar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawTimeBlock {
    pub id: Option<String>,
    pub ticket_id: Option<String>,
    pub ticket_key: Option<String>,
    pub title: Option<String>,
    pub start: Option<RawTimestamp>,
    pub end: Option<RawTimestamp>,
    pub notes: Option<String>,
    pub created_at: Option<RawTimestamp>,
    pub updated_at: Option<RawTimestamp>,
}

impl From<&TimeBlock> for RawTimeBlock {
    fn from(block: &TimeBlock) -> Self {
        Self {
            id: Some(block.id.clone()),
            ticket_id: Some(block.ticket_id.clone()),
            ticket_key: Some(block.ticket_key.clone()),
            title: Some(block.title.clone()),
            start: Some(block.start.into()),
            end: Some(block.end.into()),
            notes: Some(block.notes.clone()),
            created_at: Some(block.created_at.into()),
            updated_at: Some(block.updated_at.into()),
        }
    }
}

/// Partial update for a time block, keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimeBlockPatch {
    pub id: String,
    pub ticket_id: Option<String>,
    pub title: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl TimeBlockPatch {
    /// Overlays the patch on `base`, or builds a raw record from the patch alone.
    pub fn merge_into(&self, base: Option<&TimeBlock>) -> RawTimeBlock {
        let mut raw = base.map(RawTimeBlock::from).unwrap_or_default();
        raw.id = Some(self.id.clone());
        if let Some(ticket_id) = &self.ticket_id {
            raw.ticket_id = Some(ticket_id.clone());
        }
        if let Some(title) = &self.title {
            raw.title = Some(title.clone());
        }
        if let Some(start) = self.start {
            raw.start = Some(start.into());
        }
        if let Some(end) = self.end {
            raw.end = Some(end.into());
        }
        if let Some(notes) = &self.notes {
            raw.notes = Some(notes.clone());
        }
        raw
    }
}
