//! Task record: one uploaded document and everything known about it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::ClientError;
use super::ids::{BackendTaskId, LocalTaskId};
use super::result::VerificationResult;
use super::status::TaskStatus;

pub const STAGE_UPLOADING: &str = "Uploading...";
pub const STAGE_QUEUED: &str = "Queued";
pub const STAGE_RETRYING: &str = "Retrying...";
pub const STAGE_DONE: &str = "Done";
pub const STAGE_ERROR: &str = "Error";

/// Client-side record of a task.
///
/// Design:
/// - Owned by the task store; the store is the only writer.
/// - All state transitions happen through the `mark_*` / `begin_retry` methods.
/// - `backend_id` never changes once set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: LocalTaskId,

    /// Original file name, used for display and report names.
    pub name: String,

    pub mime_type: String,

    pub status: TaskStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend_id: Option<BackendTaskId>,

    /// 0-100, as last reported by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,

    /// Human-readable stage text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,

    /// Number of user retries so far.
    #[serde(default)]
    pub retry_count: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<VerificationResult>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl TaskRecord {
    /// New record for a file that is about to be uploaded.
    pub fn new(
        id: LocalTaskId,
        name: impl Into<String>,
        mime_type: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            mime_type: mime_type.into(),
            status: TaskStatus::Pending,
            backend_id: None,
            progress: Some(0),
            stage: Some(STAGE_UPLOADING.to_string()),
            retry_count: 0,
            result: None,
            error: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    /// Upload accepted; the backend assigned `backend_id`.
    pub fn mark_submitted(&mut self, backend_id: BackendTaskId, now: DateTime<Utc>) {
        self.status = TaskStatus::Processing;
        if self.backend_id.is_none() {
            self.backend_id = Some(backend_id);
        }
        self.stage = Some(STAGE_QUEUED.to_string());
        self.updated_at = now;
    }

    /// Intermediate poll response.
    pub fn mark_progress(&mut self, progress: Option<u8>, stage: Option<String>, now: DateTime<Utc>) {
        self.status = TaskStatus::Processing;
        if progress.is_some() {
            self.progress = progress;
        }
        if stage.is_some() {
            self.stage = stage;
        }
        self.updated_at = now;
    }

    /// Backend finished and the result was fetched.
    pub fn mark_completed(&mut self, result: VerificationResult, now: DateTime<Utc>) {
        self.status = TaskStatus::Completed;
        self.progress = Some(100);
        self.stage = Some(STAGE_DONE.to_string());
        self.result = Some(result);
        self.error = None;
        self.updated_at = now;
        self.completed_at = Some(now);
    }

    /// Upload, polling, or processing failed.
    pub fn mark_failed(&mut self, message: impl Into<String>, now: DateTime<Utc>) {
        self.status = TaskStatus::Error;
        self.stage = Some(STAGE_ERROR.to_string());
        self.error = Some(message.into());
        self.updated_at = now;
        self.completed_at = Some(now);
    }

    /// Move a finished task back to processing for another attempt.
    ///
    /// Keeps the backend id, bumps the retry counter by one and drops the
    /// previous result and error.
    pub fn begin_retry(&mut self, now: DateTime<Utc>) -> Result<(), ClientError> {
        if !self.status.is_terminal() {
            return Err(ClientError::TaskInFlight(self.id));
        }
        if self.backend_id.is_none() {
            return Err(ClientError::NotSubmitted(self.id));
        }
        self.status = TaskStatus::Processing;
        self.retry_count += 1;
        self.result = None;
        self.error = None;
        self.progress = Some(0);
        self.stage = Some(STAGE_RETRYING.to_string());
        self.completed_at = None;
        self.updated_at = now;
        Ok(())
    }

    /// `completed` always carries a result.
    pub fn is_consistent(&self) -> bool {
        self.status != TaskStatus::Completed || self.result.is_some()
    }
}
