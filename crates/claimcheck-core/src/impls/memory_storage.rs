//! InMemoryStorage - non-persistent `Storage`, for tests and dry runs.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::domain::ClientError;
use crate::ports::Storage;

#[derive(Default)]
pub struct InMemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        // A panic mid-insert cannot leave a HashMap half-written; keep going.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Storage for InMemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, ClientError> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ClientError> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), ClientError> {
        self.entries().remove(key);
        Ok(())
    }
}
