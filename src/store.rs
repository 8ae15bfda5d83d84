use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rusqlite::Connection;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::db::queries;
use crate::models::{BookingDraft, SCHEMA_VERSION};

/// The single slot every funnel instance shares.
pub const STORAGE_KEY: &str = "booking_draft_v2";

/// Fired on every committed write so other open funnels ("tabs") can adopt
/// the change. `writer` identifies the originating store handle; consumers
/// drop their own echoes.
#[derive(Debug, Clone)]
pub enum StoreEvent {
    Saved { writer: Uuid, draft: BookingDraft },
    Cleared { writer: Uuid },
}

impl StoreEvent {
    pub fn writer(&self) -> Uuid {
        match self {
            StoreEvent::Saved { writer, .. } => *writer,
            StoreEvent::Cleared { writer } => *writer,
        }
    }
}

/// Translates BookingDraft ⇄ the persisted JSON slot.
///
/// Persistence is an optimization, not a correctness requirement: write
/// failures are logged and swallowed, never raised to the caller.
pub struct DraftStore {
    db: Arc<Mutex<Connection>>,
    events: broadcast::Sender<StoreEvent>,
    writer_id: Uuid,
    persist_gen: Arc<AtomicU64>,
    debounce: Duration,
}

impl DraftStore {
    /// One handle per funnel instance; handles sharing `db` and `events`
    /// behave like browser tabs over the same storage key.
    pub fn open(
        db: Arc<Mutex<Connection>>,
        events: broadcast::Sender<StoreEvent>,
        debounce: Duration,
    ) -> Self {
        Self {
            db,
            events,
            writer_id: Uuid::new_v4(),
            persist_gen: Arc::new(AtomicU64::new(0)),
            debounce,
        }
    }

    pub fn writer_id(&self) -> Uuid {
        self.writer_id
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Read the slot. Absent or unparsable slots yield `None`. A stale
    /// `schemaVersion` re-seeds the slot with a fresh draft that keeps only
    /// the old vehicle type, and returns that seeded draft, so the same
    /// invalid blob is never parsed twice.
    pub fn load(&self) -> Option<BookingDraft> {
        let raw = {
            let db = self.db.lock().unwrap();
            match queries::get_slot(&db, STORAGE_KEY) {
                Ok(raw) => raw?,
                Err(err) => {
                    tracing::warn!("failed to read draft slot: {err:#}");
                    return None;
                }
            }
        };

        let value: serde_json::Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("discarding unparsable persisted draft: {err}");
                return None;
            }
        };

        let version = value
            .get("schemaVersion")
            .and_then(|v| v.as_u64())
            .unwrap_or(0);
        if version != SCHEMA_VERSION as u64 {
            let vehicle_type = value
                .get("vehicleType")
                .and_then(|v| v.as_str())
                .unwrap_or("");
            let fresh = BookingDraft::seeded(vehicle_type);
            tracing::info!(
                old_version = version,
                "stale draft schema, keeping vehicle type only"
            );
            self.save_now(&fresh);
            return Some(fresh);
        }

        match serde_json::from_value::<BookingDraft>(value) {
            Ok(mut draft) => {
                draft.normalize();
                Some(draft)
            }
            Err(err) => {
                tracing::warn!("discarding malformed persisted draft: {err}");
                None
            }
        }
    }

    /// Write immediately, superseding any pending debounced write.
    pub fn save_now(&self, draft: &BookingDraft) {
        self.persist_gen.fetch_add(1, Ordering::SeqCst);
        Self::write(&self.db, &self.events, self.writer_id, draft);
    }

    /// Debounced write: rapid increment/decrement clicks coalesce into one
    /// commit after a quiet period. A newer schedule, `save_now`, or `clear`
    /// supersedes anything still queued.
    pub fn schedule_save(&self, draft: &BookingDraft) {
        let token = self.persist_gen.fetch_add(1, Ordering::SeqCst) + 1;
        let persist_gen = Arc::clone(&self.persist_gen);
        let db = Arc::clone(&self.db);
        let events = self.events.clone();
        let writer = self.writer_id;
        let draft = draft.clone();
        let debounce = self.debounce;

        tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            if persist_gen.load(Ordering::SeqCst) == token {
                Self::write(&db, &events, writer, &draft);
            }
        });
    }

    /// Drop any queued write without committing it.
    pub fn cancel_pending(&self) {
        self.persist_gen.fetch_add(1, Ordering::SeqCst);
    }

    /// Remove the slot. Used at reset/confirmation time only.
    pub fn clear(&self) {
        self.cancel_pending();
        {
            let db = self.db.lock().unwrap();
            if let Err(err) = queries::delete_slot(&db, STORAGE_KEY) {
                tracing::warn!("failed to clear draft slot: {err:#}");
            }
        }
        let _ = self.events.send(StoreEvent::Cleared {
            writer: self.writer_id,
        });
    }

    fn write(
        db: &Mutex<Connection>,
        events: &broadcast::Sender<StoreEvent>,
        writer: Uuid,
        draft: &BookingDraft,
    ) {
        let json = match serde_json::to_string(draft) {
            Ok(json) => json,
            Err(err) => {
                tracing::warn!("failed to serialize draft: {err}");
                return;
            }
        };
        {
            let db = db.lock().unwrap();
            if let Err(err) = queries::put_slot(&db, STORAGE_KEY, &json) {
                tracing::warn!("failed to save draft slot: {err:#}");
                return;
            }
        }
        let _ = events.send(StoreEvent::Saved {
            writer,
            draft: draft.clone(),
        });
    }
}
