// Persistence of the tracker's collections into the key-value store.
//
// Purpose
// - Load the collections once at startup, tolerating absent or malformed data.
// - Write snapshots in the background so mutations never wait on storage.
//
// Responsibilities
// - The queue side hands snapshots to an unbounded channel and never fails.
// - The writer drains the channel, keeps only the latest snapshot per key in a
//   batch, and logs failed writes. In-memory state stays authoritative.
// - When the tickets document cannot be read, stored time blocks are kept as they are and
//   nothing is written back at startup.
//
// Boundaries
// - No domain decisions. Records are normalized with the core normalizer.

use crate::modules::time_tracking::application::errors::ApplicationError;
use crate::modules::time_tracking::core::normalize::{normalize_event, normalize_ticket};
use crate::modules::time_tracking::core::settings::UserSettings;
use crate::modules::time_tracking::core::ticket::{RawTicket, Ticket};
use crate::modules::time_tracking::core::time_block::{RawTimeBlock, TimeBlock};
use crate::shared::core::upsert::{Placement, Upserted, upsert_by_id};
use crate::shared::infrastructure::key_value_store::{KeyValueStore, StoreKey};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

#[derive(Debug, Clone, PartialEq)]
pub enum Snapshot {
    Tickets(Vec<Ticket>),
    TimeBlocks(Vec<TimeBlock>),
    Settings(UserSettings),
}

impl Snapshot {
    pub fn key(&self) -> StoreKey {
        match self {
            Snapshot::Tickets(_) => StoreKey::Tickets,
            Snapshot::TimeBlocks(_) => StoreKey::TimeBlocks,
            Snapshot::Settings(_) => StoreKey::Settings,
        }
    }

    pub fn encode(&self) -> Result<String, ApplicationError> {
        let encoded = match self {
            Snapshot::Tickets(tickets) => serde_json::to_string(tickets),
            Snapshot::TimeBlocks(blocks) => serde_json::to_string(blocks),
            Snapshot::Settings(settings) => serde_json::to_string(settings),
        };
        encoded.map_err(|source| ApplicationError::Encode {
            key: self.key().as_str(),
            source,
        })
    }
}

/// Sending half of the persistence channel. A detached queue drops every snapshot.
#[derive(Debug, Clone, Default)]
pub struct PersistenceQueue {
    sender: Option<UnboundedSender<Snapshot>>,
}

impl PersistenceQueue {
    pub fn channel() -> (Self, UnboundedReceiver<Snapshot>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender: Some(sender) }, receiver)
    }

    pub fn detached() -> Self {
        Self::default()
    }

    pub fn enqueue(&self, snapshot: Snapshot) {
        let Some(sender) = &self.sender else {
            return;
        };
        let key = snapshot.key().as_str();
        if sender.send(snapshot).is_err() {
            tracing::warn!(key, "persistence writer stopped, keeping the change in memory only");
        }
    }
}

pub struct PersistenceWriter {
    store: Arc<dyn KeyValueStore>,
    receiver: UnboundedReceiver<Snapshot>,
}

impl PersistenceWriter {
    pub fn new(store: Arc<dyn KeyValueStore>, receiver: UnboundedReceiver<Snapshot>) -> Self {
        Self { store, receiver }
    }

    pub async fn write(&self, snapshot: &Snapshot) -> Result<(), ApplicationError> {
        let value = snapshot.encode()?;
        self.store.set(snapshot.key(), value).await?;
        Ok(())
    }

    /// Runs until every queue handle is dropped.
    pub async fn run(mut self) {
        while let Some(first) = self.receiver.recv().await {
            let mut batch = vec![first];
            while let Ok(next) = self.receiver.try_recv() {
                batch.push(next);
            }
            for snapshot in latest_per_key(batch) {
                let key = snapshot.key().as_str();
                match self.write(&snapshot).await {
                    Ok(()) => tracing::debug!(key, "snapshot written"),
                    Err(error) => tracing::warn!(key, %error, "storage write failed, keeping the change in memory only"),
                }
            }
        }
        tracing::debug!("persistence writer finished");
    }
}

fn latest_per_key(batch: Vec<Snapshot>) -> Vec<Snapshot> {
    let mut latest: Vec<Snapshot> = Vec::with_capacity(3);
    for snapshot in batch {
        latest.retain(|kept| kept.key() != snapshot.key());
        latest.push(snapshot);
    }
    latest
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedState {
    pub tickets: Vec<Ticket>,
    pub time_blocks: Vec<TimeBlock>,
    pub settings: UserSettings,
    /// Stored tickets needed ids, deduplication or dropping; write them back.
    pub tickets_repaired: bool,
    pub time_blocks_repaired: bool,
}

/// How a stored collection came back from the key-value store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadStatus {
    Absent,
    Read,
    /// The read failed or the document is not a JSON array. What is stored must stay untouched.
    Unreadable,
}

struct StoredRecords<T> {
    records: Vec<T>,
    skipped: usize,
    status: ReadStatus,
}

impl<T> StoredRecords<T> {
    fn empty(status: ReadStatus) -> Self {
        Self {
            records: Vec::new(),
            skipped: 0,
            status,
        }
    }
}

async fn read_records<T: DeserializeOwned>(store: &dyn KeyValueStore, key: StoreKey) -> StoredRecords<T> {
    let text = match store.get(key).await {
        Ok(Some(text)) => text,
        Ok(None) => return StoredRecords::empty(ReadStatus::Absent),
        Err(error) => {
            tracing::warn!(key = key.as_str(), %error, "storage read failed, starting empty");
            return StoredRecords::empty(ReadStatus::Unreadable);
        }
    };
    let values: Vec<serde_json::Value> = match serde_json::from_str(&text) {
        Ok(values) => values,
        Err(error) => {
            tracing::warn!(key = key.as_str(), %error, "stored data is malformed, starting empty");
            return StoredRecords::empty(ReadStatus::Unreadable);
        }
    };

    let mut skipped = 0;
    let records = values
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(error) => {
                tracing::debug!(key = key.as_str(), %error, "skipping unreadable record");
                skipped += 1;
                None
            }
        })
        .collect();
    StoredRecords {
        records,
        skipped,
        status: ReadStatus::Read,
    }
}

async fn read_settings(store: &dyn KeyValueStore) -> UserSettings {
    match store.get(StoreKey::Settings).await {
        Ok(Some(text)) => serde_json::from_str(&text).unwrap_or_else(|error| {
            tracing::warn!(%error, "stored settings are malformed, using defaults");
            UserSettings::default()
        }),
        Ok(None) => UserSettings::default(),
        Err(error) => {
            tracing::warn!(%error, "settings read failed, using defaults");
            UserSettings::default()
        }
    }
}

pub async fn load_state(store: &dyn KeyValueStore, now: DateTime<Utc>) -> LoadedState {
    let stored_tickets = read_records::<RawTicket>(store, StoreKey::Tickets).await;
    let tickets_unreadable = stored_tickets.status == ReadStatus::Unreadable;
    let mut tickets_repaired = stored_tickets.skipped > 0;
    let mut tickets: Vec<Ticket> = Vec::with_capacity(stored_tickets.records.len());
    for raw in stored_tickets.records {
        let missing_id = raw.id.as_deref().is_none_or(|id| id.trim().is_empty());
        let replaced = upsert_by_id(&mut tickets, normalize_ticket(raw), Placement::Back) == Upserted::Replaced;
        tickets_repaired |= missing_id || replaced;
    }
    if tickets_repaired {
        tracing::info!(count = tickets.len(), "stored tickets were repaired");
    }

    let ticket_ids: HashSet<&str> = tickets.iter().map(|ticket| ticket.id.as_str()).collect();
    let stored_blocks = read_records::<RawTimeBlock>(store, StoreKey::TimeBlocks).await;
    let mut time_blocks_repaired = stored_blocks.skipped > 0;
    let mut time_blocks: Vec<TimeBlock> = Vec::with_capacity(stored_blocks.records.len());
    for raw in stored_blocks.records {
        let Some(block) = normalize_event(raw, now) else {
            tracing::debug!("dropping invalid stored time block");
            time_blocks_repaired = true;
            continue;
        };
        if !tickets_unreadable && !ticket_ids.contains(block.ticket_id.as_str()) {
            tracing::debug!(block_id = %block.id, ticket_id = %block.ticket_id, "dropping time block of unknown ticket");
            time_blocks_repaired = true;
            continue;
        }
        if upsert_by_id(&mut time_blocks, block, Placement::Back) == Upserted::Replaced {
            time_blocks_repaired = true;
        }
    }

    if tickets_unreadable {
        tracing::warn!(
            time_blocks = time_blocks.len(),
            "stored tickets are unreadable, keeping every time block and writing nothing back"
        );
        tickets_repaired = false;
        time_blocks_repaired = false;
    }

    let settings = read_settings(store).await;
    tracing::info!(tickets = tickets.len(), time_blocks = time_blocks.len(), "state loaded");

    LoadedState {
        tickets,
        time_blocks,
        settings,
        tickets_repaired,
        time_blocks_repaired,
    }
}
