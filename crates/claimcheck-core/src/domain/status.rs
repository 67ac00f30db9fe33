//! Task lifecycle states.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of one uploaded document.
///
/// State transitions:
/// - Pending -> Processing -> Completed
/// - Pending -> Error (upload failed)
/// - Processing -> Error (backend error or polling failure)
/// - Completed | Error -> Processing (user retry)
///
/// Deletion is allowed from any state and removes the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Record created, upload in flight.
    Pending,

    /// Accepted by the backend, being polled.
    Processing,

    /// Backend finished; result payload attached.
    Completed,

    /// Upload, polling or processing failed.
    Error,
}

impl TaskStatus {
    /// Terminal states are the only ones that survive a restart, and the
    /// only ones that can be retried.
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Error)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Processing => "processing",
            TaskStatus::Completed => "completed",
            TaskStatus::Error => "error",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status as reported by `GET /status/{id}`.
///
/// The backend has its own `pending` (queued on the server) which the client
/// folds into [`TaskStatus::Processing`]: once the upload is accepted the
/// record is in flight regardless of server-side queueing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteStatus {
    Pending,
    Processing,
    Completed,
    Error,
    #[serde(other)]
    Unknown,
}

impl RemoteStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RemoteStatus::Completed | RemoteStatus::Error)
    }
}
