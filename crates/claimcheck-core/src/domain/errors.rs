//! Error type shared by the whole client.

use std::path::PathBuf;

use thiserror::Error;

use super::ids::LocalTaskId;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced an HTTP response (connect, timeout, ...).
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// Non-2xx response. `detail` is the backend's message when it sent one.
    #[error("server returned {status}: {detail}")]
    Status { status: u16, detail: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("file type {extension:?} not allowed (allowed: {allowed})")]
    UnsupportedFileType { extension: String, allowed: String },

    #[error("task not found: {0}")]
    TaskNotFound(String),

    #[error("task id {0:?} is ambiguous")]
    AmbiguousTaskId(String),

    #[error("task {0} was never accepted by the server")]
    NotSubmitted(LocalTaskId),

    #[error("task {0} is still in progress")]
    TaskInFlight(LocalTaskId),

    #[error("task {0} has no result to export")]
    NoResult(LocalTaskId),

    /// The original file is gone from the server (e.g. after a restart).
    #[error("original file is no longer available on the server; upload the document again to preview it")]
    FileUnavailable,

    /// A local input file could not be read.
    #[error("cannot read {}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// State directory or report directory I/O. The cause is the source.
    #[error("storage error")]
    Storage(#[from] std::io::Error),

    #[error("invalid json")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    /// Message stored on a task record when this error ends its lifecycle.
    ///
    /// For backend-reported failures the detail alone is more useful than the
    /// wrapped "server returned ..." form.
    pub fn task_message(&self) -> String {
        match self {
            ClientError::Status { detail, .. } if !detail.is_empty() => detail.clone(),
            other => other.to_string(),
        }
    }
}
