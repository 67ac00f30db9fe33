//! Backend port - the verification service's REST surface.
//!
//! The client is a strict consumer of this API; `HttpBackend` is the
//! production implementation, tests use scripted fakes.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{BackendTaskId, ClientError, RemoteStatus, UploadFile, VerificationResult};

/// `POST /upload` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub task_id: BackendTaskId,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// `GET /status/{id}` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusReport {
    pub status: RemoteStatus,
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
}

impl StatusReport {
    pub fn new(status: RemoteStatus) -> Self {
        Self {
            status,
            stage: None,
            progress: None,
            error: None,
            created_at: None,
            completed_at: None,
        }
    }

    pub fn with_stage(mut self, stage: impl Into<String>) -> Self {
        self.stage = Some(stage.into());
        self
    }

    pub fn with_progress(mut self, progress: f64) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Progress clamped into 0..=100.
    pub fn progress_percent(&self) -> Option<u8> {
        self.progress
            .filter(|p| p.is_finite())
            .map(|p| p.clamp(0.0, 100.0).round() as u8)
    }
}

/// `GET /health` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub tasks_count: Option<u64>,
    #[serde(default)]
    pub tasks_by_status: BTreeMap<String, u64>,
}

/// Verification service API.
#[async_trait]
pub trait Backend: Send + Sync {
    /// `POST /upload` (multipart, field `file`).
    async fn upload(&self, file: &UploadFile) -> Result<UploadReceipt, ClientError>;

    /// `GET /status/{id}`.
    async fn status(&self, id: &BackendTaskId) -> Result<StatusReport, ClientError>;

    /// `GET /result/{id}`.
    async fn result(&self, id: &BackendTaskId) -> Result<VerificationResult, ClientError>;

    /// `POST /retry/{id}`.
    async fn retry(&self, id: &BackendTaskId) -> Result<(), ClientError>;

    /// `DELETE /task/{id}`. Callers treat failures as best effort.
    async fn delete_task(&self, id: &BackendTaskId) -> Result<(), ClientError>;

    /// `GET /file/{id}`: original bytes. A missing file is
    /// [`ClientError::FileUnavailable`].
    async fn file(&self, id: &BackendTaskId) -> Result<Vec<u8>, ClientError>;

    /// `GET /health`.
    async fn health(&self) -> Result<HealthReport, ClientError>;
}
