use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveDate, Utc};

use crate::models::{BookingDraft, CustomerInfo, LineItem, VehicleInfo};
use crate::store::DraftStore;

struct Inner {
    draft: BookingDraft,
    /// Receipt snapshot after a confirmation. In-memory only, gone on
    /// restart, so a stale receipt can never resurface.
    last_confirmed: Option<BookingDraft>,
    last_local_write: Option<DateTime<Utc>>,
}

/// Single source of truth for the in-progress booking within this funnel
/// instance. All mutations go through here; everything else reads snapshots
/// or derived values.
pub struct DraftManager {
    store: Arc<DraftStore>,
    inner: Mutex<Inner>,
}

impl DraftManager {
    /// Rehydrate from the store, or start empty.
    pub fn open(store: Arc<DraftStore>) -> Self {
        let draft = store.load().unwrap_or_default();
        Self {
            store,
            inner: Mutex::new(Inner {
                draft,
                last_confirmed: None,
                last_local_write: None,
            }),
        }
    }

    pub fn snapshot(&self) -> BookingDraft {
        self.inner.lock().unwrap().draft.clone()
    }

    pub fn last_confirmed(&self) -> Option<BookingDraft> {
        self.inner.lock().unwrap().last_confirmed.clone()
    }

    pub fn total_price(&self) -> f64 {
        self.inner.lock().unwrap().draft.total_price()
    }

    pub fn total_duration_minutes(&self) -> u32 {
        self.inner.lock().unwrap().draft.total_duration_minutes()
    }

    pub fn set_vehicle_type(&self, vehicle_type: &str) {
        self.mutate(|d| d.vehicle_type = vehicle_type.to_string());
    }

    pub fn set_customer_info(&self, info: CustomerInfo) {
        self.mutate(|d| d.customer_info = info);
    }

    pub fn set_vehicle_info(&self, info: VehicleInfo) {
        self.mutate(|d| d.vehicle_info = info);
    }

    /// Record the chosen slot: the naive calendar date for the picker, the
    /// display label, and the concrete instant the backend will receive.
    pub fn set_schedule(&self, date: NaiveDate, label: &str, start_at: DateTime<Utc>) {
        self.mutate(|d| {
            d.selected_date = Some(date);
            d.selected_time_label = label.to_string();
            d.start_at = Some(start_at);
        });
    }

    /// Changing the date invalidates any previously chosen slot.
    pub fn clear_schedule(&self) {
        self.mutate(|d| {
            d.selected_date = None;
            d.selected_time_label = String::new();
            d.start_at = None;
        });
    }

    pub fn toggle_service(&self, item: LineItem) {
        self.mutate(|d| d.toggle_service(item));
    }

    pub fn toggle_addon(&self, item: LineItem) {
        self.mutate(|d| d.toggle_addon(item));
    }

    pub fn increment_service(&self, id: &str) {
        self.mutate(|d| d.increment_service(id));
    }

    pub fn decrement_service(&self, id: &str) {
        self.mutate(|d| d.decrement_service(id));
    }

    pub fn increment_addon(&self, id: &str) {
        self.mutate(|d| d.increment_addon(id));
    }

    pub fn decrement_addon(&self, id: &str) {
        self.mutate(|d| d.decrement_addon(id));
    }

    /// Back to a brand-new idle draft; the persisted slot and any receipt
    /// are dropped.
    pub fn reset(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.draft = BookingDraft::new();
        inner.last_confirmed = None;
        inner.last_local_write = Some(inner.draft.updated_at);
        // Clearing inside the lock also supersedes any queued debounced
        // save, so stale data cannot resurrect after the reset.
        self.store.clear();
    }

    /// Snapshot the working draft as the receipt, clear persistence, and
    /// start a fresh idle draft, all under one lock so no reader ever sees
    /// the old and new drafts at once. Returns the snapshot.
    pub fn confirm(&self) -> BookingDraft {
        let mut inner = self.inner.lock().unwrap();
        let snapshot = inner.draft.clone();
        inner.last_confirmed = Some(snapshot.clone());
        inner.draft = BookingDraft::new();
        inner.last_local_write = Some(inner.draft.updated_at);
        self.store.clear();
        snapshot
    }

    /// Adopt a change another funnel instance wrote to the shared slot.
    /// Last-writer-wins, no merge; never persisted back (that would echo).
    /// Only the synchronizer calls this.
    pub(crate) fn adopt_external(&self, external: Option<BookingDraft>) {
        let mut inner = self.inner.lock().unwrap();
        match external {
            Some(mut draft) => {
                if let Some(last) = inner.last_local_write {
                    if draft.updated_at < last {
                        tracing::debug!("ignoring external draft older than our last write");
                        return;
                    }
                }
                draft.normalize();
                inner.draft = draft;
            }
            None => {
                inner.draft = BookingDraft::new();
            }
        }
    }

    fn mutate(&self, apply: impl FnOnce(&mut BookingDraft)) {
        let mut inner = self.inner.lock().unwrap();
        apply(&mut inner.draft);
        inner.draft.normalize();
        inner.draft.touch();
        inner.last_local_write = Some(inner.draft.updated_at);
        // Scheduled while still holding the lock so queued writes can never
        // reorder against a later mutation's write.
        self.store.schedule_save(&inner.draft);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::models::DraftStatus;
    use crate::store::StoreEvent;
    use std::time::Duration;
    use tokio::sync::broadcast;

    fn manager() -> (DraftManager, Arc<DraftStore>) {
        let conn = db::init_db(":memory:").unwrap();
        let (tx, _) = broadcast::channel::<StoreEvent>(32);
        let store = Arc::new(DraftStore::open(
            Arc::new(Mutex::new(conn)),
            tx,
            Duration::from_millis(10),
        ));
        (DraftManager::open(Arc::clone(&store)), store)
    }

    fn item(id: &str, price: f64) -> LineItem {
        LineItem::new(id, id, price)
    }

    #[tokio::test]
    async fn test_mutations_flip_status_and_persist() {
        let (manager, store) = manager();
        assert_eq!(manager.snapshot().status, DraftStatus::Idle);

        manager.set_vehicle_type("sedan");
        let snap = manager.snapshot();
        assert_eq!(snap.status, DraftStatus::InProgress);
        assert_eq!(snap.vehicle_type, "sedan");

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(store.load().unwrap().vehicle_type, "sedan");
    }

    #[tokio::test]
    async fn test_confirm_clears_draft_and_keeps_receipt() {
        let (manager, store) = manager();
        manager.set_vehicle_type("suv");
        manager.toggle_service(item("suv-detail-full", 225.0));
        manager.toggle_addon(item("suv-addon-engine", 90.0));

        let snapshot = manager.confirm();
        assert_eq!(snapshot.total_price(), 315.0);

        // Working draft is fresh and idle, slot is gone
        let after = manager.snapshot();
        assert_eq!(after.status, DraftStatus::Idle);
        assert!(after.selected_services.is_empty());
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(store.load().is_none());

        // The receipt survives in memory only
        let receipt = manager.last_confirmed().unwrap();
        assert_eq!(receipt.total_price(), 315.0);
        assert_eq!(receipt.selected_services.len(), 1);
    }

    #[tokio::test]
    async fn test_confirm_supersedes_pending_save() {
        let (manager, store) = manager();
        manager.toggle_service(item("wash", 50.0));
        manager.confirm();

        // The debounced save queued by the toggle must not fire afterwards
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(store.load().is_none());
    }

    #[tokio::test]
    async fn test_reset_drops_receipt() {
        let (manager, store) = manager();
        manager.toggle_service(item("wash", 50.0));
        manager.confirm();
        assert!(manager.last_confirmed().is_some());

        manager.reset();
        assert!(manager.last_confirmed().is_none());
        assert_eq!(manager.snapshot().status, DraftStatus::Idle);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(store.load().is_none());
    }

    #[tokio::test]
    async fn test_schedule_roundtrip() {
        let (manager, _store) = manager();
        let date: NaiveDate = "2025-09-03".parse().unwrap();
        let start: DateTime<Utc> = "2025-09-03T18:00:00Z".parse().unwrap();
        manager.set_schedule(date, "2:00 PM", start);

        let snap = manager.snapshot();
        assert_eq!(snap.selected_date, Some(date));
        assert_eq!(snap.selected_time_label, "2:00 PM");
        assert_eq!(snap.start_at, Some(start));
        assert!(snap.schedule_complete());

        manager.clear_schedule();
        assert!(!manager.snapshot().schedule_complete());
    }

    #[tokio::test]
    async fn test_adopt_external_skips_stale_drafts() {
        let (manager, _store) = manager();
        manager.set_vehicle_type("truck");
        let local = manager.snapshot();

        let mut stale = BookingDraft::new();
        stale.vehicle_type = "coupe".to_string();
        stale.updated_at = local.updated_at - chrono::Duration::seconds(60);
        manager.adopt_external(Some(stale));
        assert_eq!(manager.snapshot().vehicle_type, "truck");

        let mut newer = BookingDraft::new();
        newer.vehicle_type = "coupe".to_string();
        newer.updated_at = local.updated_at + chrono::Duration::seconds(60);
        manager.adopt_external(Some(newer));
        assert_eq!(manager.snapshot().vehicle_type, "coupe");
    }

    #[tokio::test]
    async fn test_adopt_external_clear_resets() {
        let (manager, _store) = manager();
        manager.toggle_service(item("wash", 50.0));
        manager.adopt_external(None);
        let snap = manager.snapshot();
        assert_eq!(snap.status, DraftStatus::Idle);
        assert!(snap.selected_services.is_empty());
    }
}
