//! In-memory backend

use std::collections::HashMap;
use std::sync::Mutex;

use crate::{KvBackend, StoreResult};

/// Process-local backend, lost on exit
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvBackend for MemoryBackend {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.entries
            .lock()?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.entries.lock()?.remove(key);
        Ok(())
    }

    fn is_healthy(&self) -> bool {
        self.entries.lock().is_ok()
    }
}
