//! Storage port - small key/value persistence for client state.
//!
//! Plays the role browser local storage plays for a web front-end: a handful
//! of string keys holding serialized JSON.

use crate::domain::ClientError;

pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, ClientError>;

    fn set(&self, key: &str, value: &str) -> Result<(), ClientError>;

    fn remove(&self, key: &str) -> Result<(), ClientError>;
}
