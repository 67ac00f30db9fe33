//! Local task store.
//!
//! Ordered list of [`TaskRecord`]s plus the currently selected task. Every
//! mutation goes through a named method and ends with a call to the
//! [`SyncHook`], so persistence never sees a half-applied change.
//!
//! The store itself is synchronous. The session shares it between pollers
//! behind a `tokio::sync::Mutex`; each poller patches only its own record, so
//! concurrent updates to different tasks never overwrite each other.
//!
//! The sync hook runs inline, under that lock. [`StorageSync`] does blocking
//! file I/O, but only when the terminal subset or the selection changed;
//! progress ticks of in-flight tasks do not touch the disk.

mod counts;
mod persist;

pub use counts::TaskCounts;
pub use persist::{NoSync, Restored, SELECTED_KEY, StorageSync, SyncHook, TASKS_KEY, restore};

use std::sync::Arc;

use tracing::debug;

use crate::domain::{BackendTaskId, ClientError, LocalTaskId, TaskRecord, TaskStatus};
use crate::ports::Storage;

pub struct TaskStore {
    records: Vec<TaskRecord>,
    selected: Option<LocalTaskId>,
    sync: Box<dyn SyncHook>,
}

impl TaskStore {
    /// Empty store that persists nothing.
    pub fn in_memory() -> Self {
        Self::with_sync(Box::new(NoSync))
    }

    pub fn with_sync(sync: Box<dyn SyncHook>) -> Self {
        Self {
            records: Vec::new(),
            selected: None,
            sync,
        }
    }

    /// Load the terminal tasks saved in `storage` and keep mirroring into it.
    pub fn open(storage: Arc<dyn Storage>) -> Result<Self, ClientError> {
        let Restored { records, selected } = restore(storage.as_ref())?;
        debug!(restored = records.len(), "task store opened");
        Ok(Self {
            records,
            selected,
            sync: Box::new(StorageSync::new(storage)),
        })
    }

    /// All records in insertion order.
    pub fn list(&self) -> &[TaskRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: LocalTaskId) -> Option<&TaskRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn find_by_backend_id(&self, backend_id: &BackendTaskId) -> Option<&TaskRecord> {
        self.records
            .iter()
            .find(|r| r.backend_id.as_ref() == Some(backend_id))
    }

    /// Resolve user input to a local id.
    ///
    /// Accepts a (case-insensitive) prefix of the local id, with or without
    /// the `local-` prefix, or an exact backend id.
    pub fn resolve(&self, query: &str) -> Result<LocalTaskId, ClientError> {
        let query = query.trim();
        let by_backend = BackendTaskId::new(query);
        if let Some(record) = self.find_by_backend_id(&by_backend) {
            return Ok(record.id);
        }

        let mut matches = self.records.iter().filter(|r| r.id.matches_prefix(query));
        match (matches.next(), matches.next()) {
            (Some(record), None) => Ok(record.id),
            (Some(_), Some(_)) => Err(ClientError::AmbiguousTaskId(query.to_string())),
            (None, _) => Err(ClientError::TaskNotFound(query.to_string())),
        }
    }

    /// Append a record, or replace the one with the same id in place.
    pub fn upsert(&mut self, record: TaskRecord) {
        match self.records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record,
            None => self.records.push(record),
        }
        self.changed();
    }

    /// Apply `f` to a single record.
    ///
    /// Returns `false` (and touches nothing) when the record is gone, e.g.
    /// because it was deleted while a request was in flight.
    pub fn update<F>(&mut self, id: LocalTaskId, f: F) -> bool
    where
        F: FnOnce(&mut TaskRecord),
    {
        let Some(record) = self.records.iter_mut().find(|r| r.id == id) else {
            return false;
        };
        f(record);
        self.changed();
        true
    }

    /// Like [`update`](Self::update), for transitions that can be refused.
    pub fn try_update<F, T>(&mut self, id: LocalTaskId, f: F) -> Result<T, ClientError>
    where
        F: FnOnce(&mut TaskRecord) -> Result<T, ClientError>,
    {
        let record = self
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| ClientError::TaskNotFound(id.to_string()))?;
        let out = f(record)?;
        self.changed();
        Ok(out)
    }

    /// Remove a record. Clears the selection if it pointed at it.
    pub fn delete(&mut self, id: LocalTaskId) -> Option<TaskRecord> {
        let index = self.records.iter().position(|r| r.id == id)?;
        let removed = self.records.remove(index);
        if self.selected == Some(id) {
            self.selected = None;
        }
        self.changed();
        Some(removed)
    }

    /// Remove everything and clear the selection.
    pub fn clear(&mut self) -> Vec<TaskRecord> {
        let removed = std::mem::take(&mut self.records);
        self.selected = None;
        self.changed();
        removed
    }

    pub fn selected(&self) -> Option<LocalTaskId> {
        self.selected
    }

    pub fn selected_record(&self) -> Option<&TaskRecord> {
        self.selected.and_then(|id| self.get(id))
    }

    /// Change the selection. Selecting an unknown id is an error.
    pub fn select(&mut self, id: Option<LocalTaskId>) -> Result<(), ClientError> {
        if let Some(id) = id {
            if self.get(id).is_none() {
                return Err(ClientError::TaskNotFound(id.to_string()));
            }
        }
        self.selected = id;
        self.changed();
        Ok(())
    }

    /// Completed records, in list order.
    pub fn completed(&self) -> impl Iterator<Item = &TaskRecord> {
        self.records
            .iter()
            .filter(|r| r.status == TaskStatus::Completed && r.result.is_some())
    }

    pub fn counts(&self) -> TaskCounts {
        TaskCounts::tally(&self.records)
    }

    fn changed(&self) {
        self.sync.sync(&self.records, self.selected);
    }
}

impl std::fmt::Debug for TaskStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskStore")
            .field("records", &self.records.len())
            .field("selected", &self.selected)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::VerificationResult;
    use crate::impls::InMemoryStorage;
    use chrono::Utc;
    use serde_json::json;
    use ulid::Ulid;

    fn pending(name: &str) -> TaskRecord {
        TaskRecord::new(LocalTaskId::from_ulid(Ulid::new()), name, "application/pdf", Utc::now())
    }

    fn completed(name: &str, decision: &str) -> TaskRecord {
        let mut r = pending(name);
        r.mark_submitted(BackendTaskId::new(format!("b-{name}")), Utc::now());
        r.mark_completed(
            VerificationResult::from_json(json!({ "decision": decision, "confidence": 0.9 })),
            Utc::now(),
        );
        r
    }

    #[test]
    fn upsert_appends_then_replaces_in_place() {
        let mut store = TaskStore::in_memory();
        let a = pending("a.pdf");
        let b = pending("b.pdf");
        store.upsert(a.clone());
        store.upsert(b.clone());

        let mut a2 = a.clone();
        a2.mark_failed("nope", Utc::now());
        store.upsert(a2);

        let names: Vec<_> = store.list().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a.pdf", "b.pdf"]);
        assert_eq!(store.get(a.id).unwrap().status, TaskStatus::Error);
    }

    #[test]
    fn update_on_missing_record_is_a_no_op() {
        let mut store = TaskStore::in_memory();
        let ghost = LocalTaskId::from_ulid(Ulid::new());
        let touched = store.update(ghost, |r| r.mark_failed("x", Utc::now()));
        assert!(!touched);
        assert!(store.is_empty());
    }

    #[test]
    fn updates_to_different_records_do_not_interfere() {
        let mut store = TaskStore::in_memory();
        let a = pending("a.pdf");
        let b = pending("b.pdf");
        store.upsert(a.clone());
        store.upsert(b.clone());

        store.update(a.id, |r| r.mark_progress(Some(30), None, Utc::now()));
        store.update(b.id, |r| r.mark_progress(Some(70), None, Utc::now()));

        assert_eq!(store.get(a.id).unwrap().progress, Some(30));
        assert_eq!(store.get(b.id).unwrap().progress, Some(70));
    }

    #[test]
    fn deleting_selected_record_clears_selection() {
        let mut store = TaskStore::in_memory();
        let a = pending("a.pdf");
        let b = pending("b.pdf");
        store.upsert(a.clone());
        store.upsert(b.clone());

        store.select(Some(b.id)).unwrap();
        store.delete(a.id);
        assert_eq!(store.selected(), Some(b.id));

        store.delete(b.id);
        assert_eq!(store.selected(), None);
        assert!(store.delete(b.id).is_none());
    }

    #[test]
    fn selecting_unknown_id_fails() {
        let mut store = TaskStore::in_memory();
        let err = store.select(Some(LocalTaskId::from_ulid(Ulid::new()))).unwrap_err();
        assert!(matches!(err, ClientError::TaskNotFound(_)));
    }

    #[test]
    fn resolve_by_prefix_and_backend_id() {
        let mut store = TaskStore::in_memory();
        let a = completed("a.pdf", "ACCEPT");
        store.upsert(a.clone());

        let full = a.id.to_string();
        assert_eq!(store.resolve(&full).unwrap(), a.id);
        assert_eq!(store.resolve(&full["local-".len()..][..8]).unwrap(), a.id);
        assert_eq!(store.resolve("b-a.pdf").unwrap(), a.id);
        assert!(matches!(store.resolve("zzzz"), Err(ClientError::TaskNotFound(_))));
    }

    #[test]
    fn resolve_reports_ambiguity() {
        let mut store = TaskStore::in_memory();
        let ts = 1_700_000_000_000u64;
        let a = TaskRecord::new(LocalTaskId::from_ulid(Ulid::from_parts(ts, 1)), "a.pdf", "application/pdf", Utc::now());
        let b = TaskRecord::new(LocalTaskId::from_ulid(Ulid::from_parts(ts, 2)), "b.pdf", "application/pdf", Utc::now());
        store.upsert(a.clone());
        store.upsert(b);

        let shared = &a.id.to_string()["local-".len()..][..10];
        assert!(matches!(store.resolve(shared), Err(ClientError::AmbiguousTaskId(_))));
    }

    #[test]
    fn counts_by_status_and_decision() {
        let mut store = TaskStore::in_memory();
        store.upsert(pending("p.pdf"));
        store.upsert(completed("a.pdf", "ACCEPT"));
        store.upsert(completed("r.pdf", "REJECT"));
        store.upsert(completed("v.pdf", "REVIEW"));

        let counts = store.counts();
        assert_eq!(counts.pending, 1);
        assert_eq!(counts.completed, 3);
        assert_eq!((counts.accept, counts.review, counts.reject), (1, 1, 1));
        assert_eq!(counts.total(), 4);
        assert_eq!(counts.in_flight(), 1);
        assert_eq!(store.completed().count(), 3);
    }

    #[test]
    fn persisted_state_is_terminal_subset_and_reloads_exactly() {
        let storage: Arc<dyn Storage> = Arc::new(InMemoryStorage::new());
        let mut store = TaskStore::open(storage.clone()).unwrap();

        let in_flight = pending("busy.pdf");
        let done = completed("done.pdf", "ACCEPT");
        let mut failed = pending("bad.pdf");
        failed.mark_failed("Processing failed", Utc::now());

        store.upsert(in_flight.clone());
        store.upsert(done.clone());
        store.upsert(failed.clone());
        store.select(Some(done.id)).unwrap();

        let reopened = TaskStore::open(storage.clone()).unwrap();
        assert_eq!(reopened.list(), &[done.clone(), failed.clone()]);
        assert_eq!(reopened.selected(), Some(done.id));

        // Reopening does not resurrect the in-flight record or re-poll it.
        assert!(reopened.get(in_flight.id).is_none());
    }

    #[test]
    fn clear_empties_persisted_state() {
        let storage: Arc<dyn Storage> = Arc::new(InMemoryStorage::new());
        let mut store = TaskStore::open(storage.clone()).unwrap();
        let done = completed("done.pdf", "ACCEPT");
        store.upsert(done.clone());
        store.select(Some(done.id)).unwrap();

        store.clear();

        let reopened = TaskStore::open(storage).unwrap();
        assert!(reopened.is_empty());
        assert_eq!(reopened.selected(), None);
    }

    fn persisted_ids(storage: &Arc<dyn Storage>) -> Vec<LocalTaskId> {
        restore(storage.as_ref()).unwrap().records.iter().map(|r| r.id).collect()
    }

    #[test]
    fn deleting_terminal_record_removes_it_from_storage() {
        let storage: Arc<dyn Storage> = Arc::new(InMemoryStorage::new());
        let mut store = TaskStore::open(storage.clone()).unwrap();
        let keep = completed("keep.pdf", "ACCEPT");
        let gone = completed("gone.pdf", "REJECT");
        store.upsert(keep.clone());
        store.upsert(gone.clone());
        store.select(Some(gone.id)).unwrap();
        assert_eq!(persisted_ids(&storage), vec![keep.id, gone.id]);

        store.delete(gone.id);

        assert_eq!(persisted_ids(&storage), vec![keep.id]);
        assert_eq!(storage.get(SELECTED_KEY).unwrap(), None);
    }

    #[test]
    fn retried_record_leaves_storage_until_it_finishes_again() {
        let storage: Arc<dyn Storage> = Arc::new(InMemoryStorage::new());
        let mut store = TaskStore::open(storage.clone()).unwrap();
        let done = completed("done.pdf", "REVIEW");
        store.upsert(done.clone());
        assert_eq!(persisted_ids(&storage), vec![done.id]);

        store.try_update(done.id, |r| r.begin_retry(Utc::now())).unwrap();
        assert!(persisted_ids(&storage).is_empty());

        store.update(done.id, |r| {
            r.mark_completed(VerificationResult::from_json(json!({ "decision": "ACCEPT" })), Utc::now())
        });
        let reopened = TaskStore::open(storage.clone()).unwrap();
        let record = reopened.get(done.id).unwrap();
        assert_eq!(record.status, TaskStatus::Completed);
        assert_eq!(record.retry_count, 1);
    }
}
