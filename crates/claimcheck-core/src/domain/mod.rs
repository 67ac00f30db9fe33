//! Domain model (ids, task records, statuses, result payloads, errors).

pub mod errors;
pub mod ids;
pub mod result;
pub mod status;
pub mod task;
pub mod upload;

pub use errors::ClientError;
pub use ids::{BackendTaskId, LocalTaskId};
pub use result::{Analysis, Decision, FieldValue, Validation, VerificationResult};
pub use status::{RemoteStatus, TaskStatus};
pub use task::TaskRecord;
pub use upload::{ACCEPTED_EXTENSIONS, UploadFile};
