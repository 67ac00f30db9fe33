//! claimcheck-core - client library for a document verification service.
//!
//! Documents (PDFs, photos) are uploaded to a remote service that classifies
//! them, extracts fields, runs authenticity checks and returns a decision
//! (ACCEPT / REVIEW / REJECT). This crate holds everything on the client side:
//!
//! - **domain**: ids, task records and their state machine, result decoding
//! - **ports**: `Backend`, `Storage`, `Clock`, `IdGenerator`
//! - **impls**: reqwest backend, file/in-memory storage
//! - **store**: the local task list and its persistence
//! - **app**: uploader, status pollers, `Session` facade
//! - **render**: view models and text output
//! - **report**: JSON/HTML export
//!
//! # Task lifecycle
//! ```text
//! pending ──upload ok──▶ processing ──poll──▶ completed
//!    │                        │
//!    └──upload failed──▶ error ◀──poll failed
//!
//! completed | error ──retry──▶ processing
//! ```

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod ports;
pub mod render;
pub mod report;
pub mod store;

pub use app::{Session, SessionBuilder, UploadOutcome};
pub use config::ClientConfig;
pub use domain::{ClientError, LocalTaskId, TaskRecord, TaskStatus, VerificationResult};
pub use report::{Exporter, ReportFormat};
pub use store::TaskStore;
