//! App - application layer.
//!
//! Combines the ports into the client workflow.
//!
//! # Components
//! - **Uploader**: creates the record and submits the file
//! - **StatusPoller**: one cancellable poll loop per in-flight task
//! - **Session**: facade the front-end talks to

pub mod poller;
pub mod session;
pub mod uploader;

#[cfg(test)]
pub(crate) mod testing;

pub use self::poller::{DEFAULT_FAILURE, PollHandle, PollerSet, SharedStore, StatusPoller};
pub use self::session::{DEFAULT_POLL_INTERVAL, Session, SessionBuilder};
pub use self::uploader::{UploadOutcome, Uploader};
