//! Authoritative in-memory roster.
//!
//! The store is fed from two places: a one-shot full roster pull at session
//! start ([`RosterStore::initialize`]) and a stream of single-record push
//! updates for the rest of the session ([`RosterStore::apply_update`]).
//! Every write bumps a revision counter published on a `watch` channel so
//! observers can tell the snapshot changed.

use std::collections::HashMap;

use tokio::sync::watch;
use tracing::{debug, info, warn};
use wellwatch_types::{StaffId, StaffRecord};

/// Load status of the roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterStatus {
    /// Initial fetch has not resolved yet.
    Pending,
    /// Initial fetch succeeded.
    Ready,
    /// Initial fetch failed; the store holds only what push updates added.
    Unavailable(String),
}

/// The current snapshot of every staff member's latest metrics.
///
/// At most one record per id exists at any time. Updates are last-write-wins
/// by arrival order: an incoming record always replaces the stored one, even
/// if its `last_update` is not newer.
#[derive(Debug)]
pub struct RosterStore {
    records: HashMap<StaffId, StaffRecord>,
    status: RosterStatus,
    revision: u64,
    changed: watch::Sender<u64>,
}

impl Default for RosterStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RosterStore {
    /// Create an empty store in the `Pending` state.
    pub fn new() -> Self {
        let (changed, _) = watch::channel(0);
        Self {
            records: HashMap::new(),
            status: RosterStatus::Pending,
            revision: 0,
            changed,
        }
    }

    /// Replace the entire snapshot with the result of the initial fetch.
    pub fn initialize(&mut self, records: Vec<StaffRecord>) {
        self.records = records.into_iter().map(|r| (r.id, r)).collect();
        self.status = RosterStatus::Ready;
        info!(staff = self.records.len(), "Roster initialized");
        self.bump();
    }

    /// Record that the initial fetch failed.
    pub fn mark_unavailable(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        warn!(%reason, "Roster unavailable");
        self.status = RosterStatus::Unavailable(reason);
        self.bump();
    }

    /// Insert or wholesale-replace the record with the same id.
    pub fn apply_update(&mut self, record: StaffRecord) {
        debug!(id = record.id, stress = %record.stress_level, "Applying roster update");
        self.records.insert(record.id, record);
        self.bump();
    }

    /// All current records. Order is unspecified.
    pub fn snapshot(&self) -> impl Iterator<Item = &StaffRecord> {
        self.records.values()
    }

    pub fn get(&self, id: StaffId) -> Option<&StaffRecord> {
        self.records.get(&id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn status(&self) -> &RosterStatus {
        &self.status
    }

    /// Number of writes applied so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Subscribe to "snapshot changed" notifications.
    ///
    /// The receiver carries the revision counter; it changes on every write.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changed.subscribe()
    }

    fn bump(&mut self) {
        self.revision += 1;
        self.changed.send_replace(self.revision);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn record(id: StaffId, name: &str, hr: u32) -> StaffRecord {
        StaffRecord::new(id, name, "Nurse").with_heart_rate(hr)
    }

    #[test]
    fn initialize_replaces_everything() {
        let mut store = RosterStore::new();
        store.apply_update(record(9, "Early", 70));
        store.initialize(vec![record(1, "A", 60), record(2, "B", 65)]);

        assert_eq!(store.len(), 2);
        assert!(store.get(9).is_none());
        assert_eq!(store.status(), &RosterStatus::Ready);
    }

    #[test]
    fn update_inserts_unseen_id() {
        let mut store = RosterStore::new();
        store.initialize(vec![record(1, "A", 60)]);
        store.apply_update(record(2, "B", 80));

        assert_eq!(store.len(), 2);
        assert_eq!(store.get(2).unwrap().current_heart_rate, Some(80));
    }

    #[test]
    fn repeated_updates_keep_one_record_with_last_fields() {
        let mut store = RosterStore::new();
        store.initialize(vec![record(1, "A", 60)]);

        for hr in [61, 90, 75, 110] {
            store.apply_update(record(1, "A", hr));
        }

        assert_eq!(store.len(), 1);
        assert_eq!(store.snapshot().filter(|r| r.id == 1).count(), 1);
        assert_eq!(store.get(1).unwrap().current_heart_rate, Some(110));
    }

    #[test]
    fn update_replaces_wholesale_not_field_merge() {
        let mut store = RosterStore::new();
        store.initialize(vec![record(1, "A", 60).with_mwi(70.0)]);
        store.apply_update(record(1, "A", 62));

        let stored = store.get(1).unwrap();
        assert_eq!(stored.current_heart_rate, Some(62));
        assert_eq!(stored.mental_wellness_index, None);
    }

    #[test]
    fn older_timestamp_still_wins() {
        let t = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let mut store = RosterStore::new();
        store.initialize(vec![record(1, "A", 60).with_last_update(t)]);
        store.apply_update(record(1, "A", 99).with_last_update(t - Duration::seconds(30)));

        let stored = store.get(1).unwrap();
        assert_eq!(stored.current_heart_rate, Some(99));
        assert_eq!(stored.last_update, Some(t - Duration::seconds(30)));
    }

    #[test]
    fn unavailable_keeps_store_empty() {
        let mut store = RosterStore::new();
        store.mark_unavailable("connection refused");
        assert!(store.is_empty());
        assert_eq!(
            store.status(),
            &RosterStatus::Unavailable("connection refused".to_string())
        );
    }

    #[test]
    fn subscribers_see_every_write() {
        let mut store = RosterStore::new();
        let mut rx = store.subscribe();
        assert!(!rx.has_changed().unwrap());

        store.initialize(vec![record(1, "A", 60)]);
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), 1);

        store.apply_update(record(1, "A", 61));
        store.apply_update(record(2, "B", 61));
        assert_eq!(*rx.borrow_and_update(), 3);
        assert_eq!(store.revision(), 3);
    }
}
