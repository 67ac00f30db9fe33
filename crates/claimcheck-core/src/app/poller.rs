//! Status poller: one tokio task per in-flight backend task.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::domain::{BackendTaskId, LocalTaskId, RemoteStatus, TaskRecord};
use crate::ports::{Backend, Clock};
use crate::store::TaskStore;

pub type SharedStore = Arc<Mutex<TaskStore>>;

/// Fallback message when the backend reports `error` without details.
pub const DEFAULT_FAILURE: &str = "Processing failed";

/// Handle to a running poll loop.
/// - `cancel()` stops it; no record update is applied after that.
/// - dropping the handle detaches the loop, it keeps running to a terminal state.
pub struct PollHandle {
    cancel_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl PollHandle {
    pub fn cancel(&self) {
        // receiver may already be gone if the loop finished
        let _ = self.cancel_tx.send(true);
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait for the loop to exit.
    pub async fn join(self) {
        let _ = self.join.await;
    }
}

/// Active pollers keyed by backend id. At most one per key.
#[derive(Default)]
pub struct PollerSet {
    handles: HashMap<BackendTaskId, PollHandle>,
}

impl PollerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a poller, cancelling any previous one for the same task.
    /// Finished handles are dropped on the way.
    pub fn insert(&mut self, backend_id: BackendTaskId, handle: PollHandle) {
        self.handles.retain(|_, h| !h.is_finished());
        if let Some(previous) = self.handles.insert(backend_id, handle) {
            previous.cancel();
        }
    }

    /// Cancel and forget the poller for `backend_id`. Returns whether one existed.
    pub fn cancel(&mut self, backend_id: &BackendTaskId) -> bool {
        match self.handles.remove(backend_id) {
            Some(handle) => {
                handle.cancel();
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&mut self) {
        for (_, handle) in self.handles.drain() {
            handle.cancel();
        }
    }

    /// Number of pollers still running.
    pub fn active(&mut self) -> usize {
        self.handles.retain(|_, h| !h.is_finished());
        self.handles.len()
    }

    pub fn contains(&self, backend_id: &BackendTaskId) -> bool {
        self.handles.contains_key(backend_id)
    }

    /// Hand every handle to the caller, e.g. to wait on them.
    pub fn take_all(&mut self) -> Vec<PollHandle> {
        self.handles.drain().map(|(_, h)| h).collect()
    }
}

impl Drop for PollerSet {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

/// Spawns poll loops that write into a shared [`TaskStore`].
#[derive(Clone)]
pub struct StatusPoller {
    backend: Arc<dyn Backend>,
    store: SharedStore,
    clock: Arc<dyn Clock>,
    interval: Duration,
}

impl StatusPoller {
    pub fn new(
        backend: Arc<dyn Backend>,
        store: SharedStore,
        clock: Arc<dyn Clock>,
        interval: Duration,
    ) -> Self {
        Self {
            backend,
            store,
            clock,
            interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start polling `backend_id` on behalf of record `task`.
    ///
    /// `generation` is the record's `retry_count` at start; updates are only
    /// applied while the record still has that count.
    pub fn spawn(&self, task: LocalTaskId, backend_id: BackendTaskId, generation: u32) -> PollHandle {
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let poll = PollLoop {
            backend: Arc::clone(&self.backend),
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
            interval: self.interval,
            task,
            backend_id,
            generation,
            cancel_rx,
        };
        let join = tokio::spawn(poll.run());
        PollHandle { cancel_tx, join }
    }
}

/// Resolves once cancellation is requested. A dropped handle detaches the
/// loop instead of cancelling it.
async fn cancel_signal(rx: &mut watch::Receiver<bool>) {
    if rx.wait_for(|cancelled| *cancelled).await.is_err() {
        std::future::pending::<()>().await;
    }
}

struct PollLoop {
    backend: Arc<dyn Backend>,
    store: SharedStore,
    clock: Arc<dyn Clock>,
    interval: Duration,
    task: LocalTaskId,
    backend_id: BackendTaskId,
    generation: u32,
    cancel_rx: watch::Receiver<bool>,
}

enum Tick {
    Continue,
    Stop,
}

impl PollLoop {
    async fn run(mut self) {
        debug!(task = %self.task, backend_id = %self.backend_id, generation = self.generation, "poller started");
        loop {
            tokio::select! {
                _ = cancel_signal(&mut self.cancel_rx) => break,
                _ = tokio::time::sleep(self.interval) => {}
            }

            match self.tick().await {
                Some(Tick::Continue) => {}
                Some(Tick::Stop) | None => break,
            }
        }
        debug!(task = %self.task, backend_id = %self.backend_id, "poller stopped");
    }

    /// One status request. `None` means cancelled mid-request.
    async fn tick(&mut self) -> Option<Tick> {
        let backend = Arc::clone(&self.backend);
        let status = tokio::select! {
            _ = cancel_signal(&mut self.cancel_rx) => return None,
            status = backend.status(&self.backend_id) => status,
        };

        let report = match status {
            Ok(report) => report,
            Err(e) => {
                let message = e.task_message();
                info!(task = %self.task, error = %message, "status request failed");
                self.apply(|r, now| r.mark_failed(message, now)).await;
                return Some(Tick::Stop);
            }
        };
        debug!(task = %self.task, status = ?report.status, progress = ?report.progress, "poll");

        match report.status {
            RemoteStatus::Completed => {
                let result = tokio::select! {
                    _ = cancel_signal(&mut self.cancel_rx) => return None,
                    result = backend.result(&self.backend_id) => result,
                };
                match result {
                    Ok(result) => {
                        info!(task = %self.task, decision = ?result.decision, "task completed");
                        self.apply(|r, now| r.mark_completed(result, now)).await;
                    }
                    Err(e) => {
                        let message = e.task_message();
                        info!(task = %self.task, error = %message, "result request failed");
                        self.apply(|r, now| r.mark_failed(message, now)).await;
                    }
                }
                Some(Tick::Stop)
            }
            RemoteStatus::Error => {
                let message = report
                    .error
                    .filter(|e| !e.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_FAILURE.to_string());
                info!(task = %self.task, error = %message, "backend reported failure");
                self.apply(|r, now| r.mark_failed(message, now)).await;
                Some(Tick::Stop)
            }
            RemoteStatus::Pending | RemoteStatus::Processing | RemoteStatus::Unknown => {
                let progress = report.progress_percent();
                let stage = report.stage;
                let applied = self.apply(|r, now| r.mark_progress(progress, stage, now)).await;
                Some(if applied { Tick::Continue } else { Tick::Stop })
            }
        }
    }

    fn cancelled(&self) -> bool {
        *self.cancel_rx.borrow()
    }

    /// Patch this loop's record under the store lock.
    ///
    /// Skipped when cancelled, when the record is gone, or when a retry has
    /// moved the record to a newer generation.
    async fn apply<F>(&self, f: F) -> bool
    where
        F: FnOnce(&mut TaskRecord, chrono::DateTime<chrono::Utc>),
    {
        let mut store = self.store.lock().await;
        if self.cancelled() {
            return false;
        }
        let current = store
            .get(self.task)
            .is_some_and(|r| r.retry_count == self.generation);
        if !current {
            debug!(task = %self.task, generation = self.generation, "dropping stale poll update");
            return false;
        }
        let now = self.clock.now();
        store.update(self.task, |r| f(r, now))
    }
}
