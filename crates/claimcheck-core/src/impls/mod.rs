//! Impls - port implementations.
//!
//! - **HttpBackend**: reqwest client for the verification service
//! - **FileStorage**: JSON files in a state directory
//! - **InMemoryStorage**: for tests

pub mod file_storage;
pub mod http_backend;
pub mod memory_storage;

pub use self::file_storage::FileStorage;
pub use self::http_backend::HttpBackend;
pub use self::memory_storage::InMemoryStorage;
