//! Scripted in-memory [`Backend`] for poller and session tests.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Semaphore;

use crate::domain::{BackendTaskId, ClientError, RemoteStatus, UploadFile, VerificationResult};
use crate::ports::{Backend, HealthReport, StatusReport, UploadReceipt};

/// Recorded request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Upload(String),
    Status(String),
    Result(String),
    Retry(String),
    Delete(String),
    File(String),
    Health,
}

#[derive(Clone)]
enum Scripted<T> {
    Ok(T),
    Fail(u16, String),
}

impl<T: Clone> Scripted<T> {
    fn resolve(&self) -> Result<T, ClientError> {
        match self {
            Scripted::Ok(v) => Ok(v.clone()),
            Scripted::Fail(status, detail) => Err(ClientError::Status {
                status: *status,
                detail: detail.clone(),
            }),
        }
    }
}

#[derive(Default)]
struct Script {
    uploaded: u32,
    upload_failure: Option<String>,
    retry_failure: Option<String>,
    delete_failure: Option<String>,
    statuses: HashMap<String, VecDeque<Scripted<StatusReport>>>,
    last_status: HashMap<String, Scripted<StatusReport>>,
    results: HashMap<String, Value>,
    files: HashMap<String, Vec<u8>>,
    calls: Vec<Call>,
}

/// Backend whose answers are queued up front.
///
/// - uploads get ids `task-1`, `task-2`, ...
/// - status answers pop from a per-task queue; the last one repeats;
///   with nothing queued the task is `processing`
#[derive(Default)]
pub struct ScriptedBackend {
    script: Mutex<Script>,
    upload_gate: Mutex<Option<Arc<Semaphore>>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub fn push_status(&self, id: &str, report: StatusReport) {
        self.script()
            .statuses
            .entry(id.to_string())
            .or_default()
            .push_back(Scripted::Ok(report));
    }

    pub fn push_status_failure(&self, id: &str, status: u16, detail: &str) {
        self.script()
            .statuses
            .entry(id.to_string())
            .or_default()
            .push_back(Scripted::Fail(status, detail.to_string()));
    }

    /// Shorthand: `completed` on the next status request, with this result.
    pub fn complete_with(&self, id: &str, result: Value) {
        self.push_status(id, StatusReport::new(RemoteStatus::Completed));
        self.set_result(id, result);
    }

    pub fn set_result(&self, id: &str, result: Value) {
        self.script().results.insert(id.to_string(), result);
    }

    pub fn set_file(&self, id: &str, bytes: &[u8]) {
        self.script().files.insert(id.to_string(), bytes.to_vec());
    }

    pub fn fail_uploads(&self, detail: &str) {
        self.script().upload_failure = Some(detail.to_string());
    }

    pub fn fail_retries(&self, detail: &str) {
        self.script().retry_failure = Some(detail.to_string());
    }

    pub fn fail_deletes(&self, detail: &str) {
        self.script().delete_failure = Some(detail.to_string());
    }

    /// Block uploads until [`release_uploads`](Self::release_uploads).
    pub fn hold_uploads(&self) {
        *self.upload_gate.lock().unwrap_or_else(|p| p.into_inner()) = Some(Arc::new(Semaphore::new(0)));
    }

    pub fn release_uploads(&self) {
        if let Some(gate) = self.upload_gate.lock().unwrap_or_else(|p| p.into_inner()).as_ref() {
            gate.add_permits(1024);
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.script().calls.clone()
    }

    pub fn status_calls(&self, id: &str) -> usize {
        self.count(|c| matches!(c, Call::Status(x) if x == id))
    }

    pub fn result_calls(&self, id: &str) -> usize {
        self.count(|c| matches!(c, Call::Result(x) if x == id))
    }

    fn count(&self, f: impl Fn(&Call) -> bool) -> usize {
        self.script().calls.iter().filter(|c| f(c)).count()
    }

    fn record(&self, call: Call) {
        self.script().calls.push(call);
    }
}

fn not_found(id: &BackendTaskId) -> ClientError {
    ClientError::Status {
        status: 404,
        detail: format!("Task {id} not found"),
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    async fn upload(&self, file: &UploadFile) -> Result<UploadReceipt, ClientError> {
        self.record(Call::Upload(file.name.clone()));
        let gate = self.upload_gate.lock().unwrap_or_else(|p| p.into_inner()).clone();
        if let Some(gate) = gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }

        let mut script = self.script();
        if let Some(detail) = &script.upload_failure {
            return Err(ClientError::Status {
                status: 400,
                detail: detail.clone(),
            });
        }
        script.uploaded += 1;
        Ok(UploadReceipt {
            task_id: BackendTaskId::new(format!("task-{}", script.uploaded)),
            status: Some("pending".into()),
            message: Some("File uploaded successfully".into()),
        })
    }

    async fn status(&self, id: &BackendTaskId) -> Result<StatusReport, ClientError> {
        self.record(Call::Status(id.to_string()));
        let mut script = self.script();
        let key = id.as_str().to_string();
        let next = script.statuses.get_mut(&key).and_then(|q| q.pop_front());
        let answer = match next {
            Some(answer) => {
                script.last_status.insert(key, answer.clone());
                answer
            }
            None => script
                .last_status
                .get(&key)
                .cloned()
                .unwrap_or(Scripted::Ok(StatusReport::new(RemoteStatus::Processing))),
        };
        answer.resolve()
    }

    async fn result(&self, id: &BackendTaskId) -> Result<VerificationResult, ClientError> {
        self.record(Call::Result(id.to_string()));
        self.script()
            .results
            .get(id.as_str())
            .cloned()
            .map(VerificationResult::from_json)
            .ok_or_else(|| not_found(id))
    }

    async fn retry(&self, id: &BackendTaskId) -> Result<(), ClientError> {
        self.record(Call::Retry(id.to_string()));
        let mut script = self.script();
        if let Some(detail) = &script.retry_failure {
            return Err(ClientError::Status {
                status: 400,
                detail: detail.clone(),
            });
        }
        // A retried task starts over on the server.
        script.last_status.remove(id.as_str());
        Ok(())
    }

    async fn delete_task(&self, id: &BackendTaskId) -> Result<(), ClientError> {
        self.record(Call::Delete(id.to_string()));
        match &self.script().delete_failure {
            Some(detail) => Err(ClientError::Transport {
                url: format!("/task/{id}"),
                message: detail.clone(),
            }),
            None => Ok(()),
        }
    }

    async fn file(&self, id: &BackendTaskId) -> Result<Vec<u8>, ClientError> {
        self.record(Call::File(id.to_string()));
        self.script()
            .files
            .get(id.as_str())
            .cloned()
            .ok_or(ClientError::FileUnavailable)
    }

    async fn health(&self) -> Result<HealthReport, ClientError> {
        self.record(Call::Health);
        let script = self.script();
        let mut by_status = BTreeMap::new();
        by_status.insert("uploaded".to_string(), u64::from(script.uploaded));
        Ok(HealthReport {
            status: "healthy".into(),
            timestamp: None,
            tasks_count: Some(u64::from(script.uploaded)),
            tasks_by_status: by_status,
        })
    }
}
