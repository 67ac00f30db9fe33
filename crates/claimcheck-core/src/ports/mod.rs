//! Ports - the seams between the client logic and the outside world.
//!
//! - `Backend`: the verification service REST API
//! - `Storage`: persistent key/value store for the task list
//! - `Clock` / `IdGenerator`: time and id sources, swappable in tests

pub mod backend;
pub mod clock;
pub mod id_generator;
pub mod storage;

pub use self::backend::{Backend, HealthReport, StatusReport, UploadReceipt};
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::storage::Storage;
