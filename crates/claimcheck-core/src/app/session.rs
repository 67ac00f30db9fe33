//! Session: the client facade.
//!
//! Wires the uploader, the pollers and the task store together and exposes
//! the user-level operations (upload, retry, delete, clear, select, preview).

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::domain::{BackendTaskId, ClientError, LocalTaskId, TaskRecord, UploadFile};
use crate::ports::{Backend, Clock, HealthReport, IdGenerator, SystemClock, UlidGenerator};
use crate::store::{TaskCounts, TaskStore};

use super::poller::{PollerSet, SharedStore, StatusPoller};
use super::uploader::{UploadOutcome, Uploader};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Builds a [`Session`].
///
/// # Example
/// ```ignore
/// let session = Session::builder(Arc::new(backend))
///     .store(TaskStore::open(storage)?)
///     .poll_interval(Duration::from_millis(500))
///     .build();
/// ```
pub struct SessionBuilder {
    backend: Arc<dyn Backend>,
    store: Option<TaskStore>,
    clock: Arc<dyn Clock>,
    ids: Option<Arc<dyn IdGenerator>>,
    poll_interval: Duration,
}

impl SessionBuilder {
    pub fn store(mut self, store: TaskStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn build(self) -> Session {
        let store: SharedStore = Arc::new(Mutex::new(self.store.unwrap_or_else(TaskStore::in_memory)));
        let ids = self
            .ids
            .unwrap_or_else(|| Arc::new(UlidGenerator::new(SystemClock)));
        let uploader = Uploader::new(
            Arc::clone(&self.backend),
            Arc::clone(&store),
            Arc::clone(&self.clock),
            ids,
        );
        let poller = StatusPoller::new(
            Arc::clone(&self.backend),
            Arc::clone(&store),
            Arc::clone(&self.clock),
            self.poll_interval,
        );
        Session {
            backend: self.backend,
            store,
            clock: self.clock,
            uploader,
            poller,
            pollers: Mutex::new(PollerSet::new()),
        }
    }
}

pub struct Session {
    backend: Arc<dyn Backend>,
    store: SharedStore,
    clock: Arc<dyn Clock>,
    uploader: Uploader,
    poller: StatusPoller,
    pollers: Mutex<PollerSet>,
}

impl Session {
    pub fn builder(backend: Arc<dyn Backend>) -> SessionBuilder {
        SessionBuilder {
            backend,
            store: None,
            clock: Arc::new(SystemClock),
            ids: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Upload a file and start polling it when the backend accepts it.
    pub async fn upload(&self, file: UploadFile) -> Result<UploadOutcome, ClientError> {
        let outcome = self.uploader.upload(&file).await?;
        if let Some(backend_id) = &outcome.backend_id {
            self.start_polling(outcome.id, backend_id.clone(), 0).await;
        }
        Ok(outcome)
    }

    /// Re-run a finished task on the backend.
    ///
    /// The record goes back to `processing` before the request is sent, so
    /// any poller still running for the previous attempt is already stale.
    /// If the backend refuses, the record ends in `error` and the error is
    /// returned.
    pub async fn retry(&self, id: LocalTaskId) -> Result<(), ClientError> {
        let now = self.clock.now();
        let (backend_id, generation) = self.store.lock().await.try_update(id, |r| {
            r.begin_retry(now)?;
            let backend_id = r.backend_id.clone().ok_or(ClientError::NotSubmitted(r.id))?;
            Ok((backend_id, r.retry_count))
        })?;
        self.pollers.lock().await.cancel(&backend_id);
        info!(task = %id, backend_id = %backend_id, attempt = generation, "retrying");

        if let Err(e) = self.backend.retry(&backend_id).await {
            warn!(task = %id, error = %e, "retry refused");
            let message = e.task_message();
            let now = self.clock.now();
            self.store.lock().await.update(id, |r| {
                if r.retry_count == generation {
                    r.mark_failed(message, now);
                }
            });
            return Err(e);
        }

        self.start_polling(id, backend_id, generation).await;
        Ok(())
    }

    /// Remove a task locally and ask the backend to forget it.
    ///
    /// The backend delete is best effort: failures are logged only.
    pub async fn delete(&self, id: LocalTaskId) -> Result<TaskRecord, ClientError> {
        let removed = self
            .store
            .lock()
            .await
            .delete(id)
            .ok_or_else(|| ClientError::TaskNotFound(id.to_string()))?;

        if let Some(backend_id) = &removed.backend_id {
            self.pollers.lock().await.cancel(backend_id);
            if let Err(e) = self.backend.delete_task(backend_id).await {
                warn!(task = %id, backend_id = %backend_id, error = %e, "backend delete failed");
            }
        }
        info!(task = %id, "task deleted");
        Ok(removed)
    }

    /// Stop all polling and remove every task. Returns how many were removed.
    pub async fn clear(&self) -> usize {
        self.pollers.lock().await.cancel_all();
        let removed = self.store.lock().await.clear();
        info!(removed = removed.len(), "task list cleared");
        removed.len()
    }

    pub async fn select(&self, id: LocalTaskId) -> Result<(), ClientError> {
        self.store.lock().await.select(Some(id))
    }

    pub async fn selected(&self) -> Option<TaskRecord> {
        self.store.lock().await.selected_record().cloned()
    }

    /// Snapshot of every record, in upload order.
    pub async fn tasks(&self) -> Vec<TaskRecord> {
        self.store.lock().await.list().to_vec()
    }

    pub async fn task(&self, id: LocalTaskId) -> Option<TaskRecord> {
        self.store.lock().await.get(id).cloned()
    }

    /// Completed records with a result, in upload order.
    pub async fn completed(&self) -> Vec<TaskRecord> {
        self.store.lock().await.completed().cloned().collect()
    }

    /// Resolve a full id, id prefix or backend id.
    pub async fn resolve(&self, query: &str) -> Result<LocalTaskId, ClientError> {
        self.store.lock().await.resolve(query)
    }

    pub async fn counts(&self) -> TaskCounts {
        self.store.lock().await.counts()
    }

    /// Original file bytes, for preview.
    ///
    /// A file the server no longer has is [`ClientError::FileUnavailable`];
    /// the record is left untouched.
    pub async fn preview(&self, id: LocalTaskId) -> Result<Vec<u8>, ClientError> {
        let backend_id = self.backend_id(id).await?;
        self.backend.file(&backend_id).await
    }

    pub async fn health(&self) -> Result<HealthReport, ClientError> {
        self.backend.health().await
    }

    /// Number of pollers still running.
    pub async fn active_pollers(&self) -> usize {
        self.pollers.lock().await.active()
    }

    /// Wait until every poller has reached a terminal state (or was cancelled).
    pub async fn wait_idle(&self) {
        loop {
            let handles = self.pollers.lock().await.take_all();
            if handles.is_empty() {
                break;
            }
            for handle in handles {
                handle.join().await;
            }
        }
    }

    /// Cancel every poller and wait for them to exit.
    pub async fn shutdown(&self) {
        let handles = {
            let mut pollers = self.pollers.lock().await;
            let handles = pollers.take_all();
            for handle in &handles {
                handle.cancel();
            }
            handles
        };
        for handle in handles {
            handle.join().await;
        }
    }

    async fn backend_id(&self, id: LocalTaskId) -> Result<BackendTaskId, ClientError> {
        let store = self.store.lock().await;
        let record = store
            .get(id)
            .ok_or_else(|| ClientError::TaskNotFound(id.to_string()))?;
        record.backend_id.clone().ok_or(ClientError::NotSubmitted(id))
    }

    async fn start_polling(&self, id: LocalTaskId, backend_id: BackendTaskId, generation: u32) {
        let handle = self.poller.spawn(id, backend_id.clone(), generation);
        self.pollers.lock().await.insert(backend_id, handle);
    }
}
