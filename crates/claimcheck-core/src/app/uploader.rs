//! Upload coordinator.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::upload::check_extension;
use crate::domain::{BackendTaskId, ClientError, LocalTaskId, TaskRecord, UploadFile};
use crate::ports::{Backend, Clock, IdGenerator};

use super::poller::SharedStore;

/// What happened to an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    pub id: LocalTaskId,
    /// Set when the backend accepted the file. `None` means the record is
    /// now in `error` (or was deleted while the upload was in flight).
    pub backend_id: Option<BackendTaskId>,
}

impl UploadOutcome {
    pub fn accepted(&self) -> bool {
        self.backend_id.is_some()
    }
}

/// Creates task records and submits files.
#[derive(Clone)]
pub struct Uploader {
    backend: Arc<dyn Backend>,
    store: SharedStore,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl Uploader {
    pub fn new(
        backend: Arc<dyn Backend>,
        store: SharedStore,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            backend,
            store,
            clock,
            ids,
        }
    }

    /// Submit one file.
    ///
    /// Flow:
    /// 1. refuse unsupported extensions (no record is created)
    /// 2. insert a `pending` record with stage `Uploading...` and select it
    /// 3. POST the file
    /// 4. success: `processing` with the backend id; failure: `error`
    ///
    /// Only step 1 returns `Err`; upload failures end up on the record.
    pub async fn upload(&self, file: &UploadFile) -> Result<UploadOutcome, ClientError> {
        check_extension(&file.name)?;

        let id = self.ids.generate_task_id();
        {
            let mut store = self.store.lock().await;
            store.upsert(TaskRecord::new(id, &file.name, &file.mime_type, self.clock.now()));
            store.select(Some(id))?;
        }
        info!(task = %id, file = %file.name, bytes = file.bytes.len(), "uploading");

        match self.backend.upload(file).await {
            Ok(receipt) => {
                let backend_id = receipt.task_id;
                let now = self.clock.now();
                let present = self
                    .store
                    .lock()
                    .await
                    .update(id, |r| r.mark_submitted(backend_id.clone(), now));
                if !present {
                    info!(task = %id, backend_id = %backend_id, "record removed during upload");
                    if let Err(e) = self.backend.delete_task(&backend_id).await {
                        warn!(task = %id, backend_id = %backend_id, error = %e, "backend delete failed");
                    }
                    return Ok(UploadOutcome { id, backend_id: None });
                }
                info!(task = %id, backend_id = %backend_id, "upload accepted");
                Ok(UploadOutcome {
                    id,
                    backend_id: Some(backend_id),
                })
            }
            Err(e) => {
                warn!(task = %id, error = %e, "upload failed");
                let message = e.task_message();
                let now = self.clock.now();
                self.store
                    .lock()
                    .await
                    .update(id, |r| r.mark_failed(message, now));
                Ok(UploadOutcome { id, backend_id: None })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::testing::{Call, ScriptedBackend};
    use crate::domain::TaskStatus;
    use crate::domain::task::STAGE_UPLOADING;
    use crate::ports::{SystemClock, UlidGenerator};
    use crate::store::TaskStore;
    use tokio::sync::Mutex;

    fn uploader(backend: Arc<ScriptedBackend>) -> (Uploader, SharedStore) {
        let store: SharedStore = Arc::new(Mutex::new(TaskStore::in_memory()));
        let uploader = Uploader::new(
            backend,
            Arc::clone(&store),
            Arc::new(SystemClock),
            Arc::new(UlidGenerator::new(SystemClock)),
        );
        (uploader, store)
    }

    #[tokio::test]
    async fn unsupported_file_creates_no_record() {
        let backend = Arc::new(ScriptedBackend::new());
        let (uploader, store) = uploader(Arc::clone(&backend));

        let err = uploader
            .upload(&UploadFile::new("notes.txt", b"hi".to_vec()))
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::UnsupportedFileType { .. }));
        assert!(store.lock().await.is_empty());
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn record_is_pending_while_upload_is_in_flight() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.hold_uploads();
        let (uploader, store) = uploader(Arc::clone(&backend));

        let task = tokio::spawn({
            let uploader = uploader.clone();
            async move {
                uploader
                    .upload(&UploadFile::new("claim.pdf", b"%PDF".to_vec()))
                    .await
            }
        });

        // Wait until the request reaches the backend.
        while backend.calls().is_empty() {
            tokio::task::yield_now().await;
        }
        {
            let store = store.lock().await;
            let record = &store.list()[0];
            assert_eq!(record.status, TaskStatus::Pending);
            assert_eq!(record.stage.as_deref(), Some(STAGE_UPLOADING));
            assert_eq!(store.selected(), Some(record.id));
        }

        backend.release_uploads();
        let outcome = task.await.unwrap().unwrap();
        assert_eq!(outcome.backend_id, Some(BackendTaskId::new("task-1")));

        let store = store.lock().await;
        let record = store.get(outcome.id).unwrap();
        assert_eq!(record.status, TaskStatus::Processing);
        assert_eq!(record.backend_id, Some(BackendTaskId::new("task-1")));
        assert_eq!(backend.calls(), vec![Call::Upload("claim.pdf".into())]);
    }

    #[tokio::test]
    async fn rejected_upload_marks_record_failed() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.fail_uploads("File too large");
        let (uploader, store) = uploader(Arc::clone(&backend));

        let outcome = uploader
            .upload(&UploadFile::new("scan.png", vec![0; 16]))
            .await
            .unwrap();

        assert!(!outcome.accepted());
        let store = store.lock().await;
        let record = store.get(outcome.id).unwrap();
        assert_eq!(record.status, TaskStatus::Error);
        assert_eq!(record.error.as_deref(), Some("File too large"));
        assert_eq!(record.mime_type, "image/png");
    }

    #[rstest::rstest]
    #[case(false)]
    #[case(true)]
    #[tokio::test]
    async fn record_deleted_during_upload_releases_backend_task(#[case] delete_fails: bool) {
        let backend = Arc::new(ScriptedBackend::new());
        backend.hold_uploads();
        if delete_fails {
            backend.fail_deletes("Task not found");
        }
        let (uploader, store) = uploader(Arc::clone(&backend));

        let task = tokio::spawn({
            let uploader = uploader.clone();
            async move {
                uploader
                    .upload(&UploadFile::new("claim.pdf", b"%PDF".to_vec()))
                    .await
            }
        });
        while backend.calls().is_empty() {
            tokio::task::yield_now().await;
        }
        let id = store.lock().await.list()[0].id;
        store.lock().await.delete(id);

        backend.release_uploads();
        let outcome = task.await.unwrap().unwrap();

        assert_eq!(outcome, UploadOutcome { id, backend_id: None });
        assert!(store.lock().await.is_empty());
        assert_eq!(
            backend.calls(),
            vec![Call::Upload("claim.pdf".into()), Call::Delete("task-1".into())]
        );
    }
}
