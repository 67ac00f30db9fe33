//! Mirroring the task list into persistent storage.
//!
//! Only terminal records (`completed` / `error`) are written: an in-flight
//! task cannot resume polling after a restart, so persisting it would only
//! leave a record stuck in `processing` forever.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use crate::domain::{ClientError, LocalTaskId, TaskRecord};
use crate::ports::Storage;

/// Key holding the serialized terminal task list.
pub const TASKS_KEY: &str = "claimcheck.tasks";

/// Key holding the selected local task id.
pub const SELECTED_KEY: &str = "claimcheck.selected";

/// Called by the store after every mutation.
pub trait SyncHook: Send + Sync {
    fn sync(&self, records: &[TaskRecord], selected: Option<LocalTaskId>);
}

/// Does nothing. For stores that should not outlive the process.
pub struct NoSync;

impl SyncHook for NoSync {
    fn sync(&self, _records: &[TaskRecord], _selected: Option<LocalTaskId>) {}
}

/// Writes the terminal subset and the selection to a [`Storage`].
///
/// Failures are logged, not propagated: a full disk should not stop a
/// running upload from finishing.
///
/// The last written state is remembered and unchanged state is not written
/// again, so progress updates of in-flight tasks cost no I/O.
pub struct StorageSync {
    storage: Arc<dyn Storage>,
    written: Mutex<Option<Written>>,
}

#[derive(PartialEq)]
struct Written {
    tasks: String,
    selected: Option<LocalTaskId>,
}

impl StorageSync {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            written: Mutex::new(None),
        }
    }

    fn write(&self, records: &[TaskRecord], selected: Option<LocalTaskId>) -> Result<(), ClientError> {
        let terminal: Vec<&TaskRecord> = records.iter().filter(|r| r.status.is_terminal()).collect();
        let next = Written {
            tasks: serde_json::to_string(&terminal)?,
            selected,
        };

        let mut written = self.written.lock().unwrap_or_else(|p| p.into_inner());
        let previous = written.take();
        if previous.as_ref() == Some(&next) {
            *written = previous;
            return Ok(());
        }
        if previous.as_ref().map(|w| &w.tasks) != Some(&next.tasks) {
            self.storage.set(TASKS_KEY, &next.tasks)?;
        }
        if previous.as_ref().map(|w| w.selected) != Some(next.selected) {
            match selected {
                Some(id) => self.storage.set(SELECTED_KEY, &id.to_string())?,
                None => self.storage.remove(SELECTED_KEY)?,
            }
        }
        debug!(persisted = terminal.len(), "task list synced");
        *written = Some(next);
        Ok(())
    }
}

impl SyncHook for StorageSync {
    fn sync(&self, records: &[TaskRecord], selected: Option<LocalTaskId>) {
        if let Err(e) = self.write(records, selected) {
            warn!(error = ?e, "failed to persist task list");
        }
    }
}

/// State read back at startup.
#[derive(Debug, Default)]
pub struct Restored {
    pub records: Vec<TaskRecord>,
    pub selected: Option<LocalTaskId>,
}

/// Load the persisted task list, keeping only consistent terminal records.
///
/// Unreadable content is discarded with a warning rather than failing
/// startup; storage I/O errors are returned.
pub fn restore(storage: &dyn Storage) -> Result<Restored, ClientError> {
    let records = match storage.get(TASKS_KEY)? {
        None => Vec::new(),
        Some(json) => match serde_json::from_str::<Vec<TaskRecord>>(&json) {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "discarding unreadable task list");
                Vec::new()
            }
        },
    };

    let mut seen = HashSet::new();
    let records: Vec<TaskRecord> = records
        .into_iter()
        .filter(|r| r.status.is_terminal() && r.is_consistent())
        .filter(|r| seen.insert(r.id))
        .collect();

    let selected = storage
        .get(SELECTED_KEY)?
        .and_then(|s| s.trim().parse::<LocalTaskId>().ok())
        .filter(|id| records.iter().any(|r| r.id == *id));

    Ok(Restored { records, selected })
}
