//! Shared origin storage with cross-tab change events
//!
//! Every tab of an origin attaches to the same [`SharedStorage`]. Mutations
//! made through a [`TabStorage`] are written to the backend and then announced
//! to all subscribers except the tab that made them, mirroring how browser
//! storage events skip the writing document.

use breakwatch_util::TabId;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, trace};

use crate::{KvBackend, MemoryBackend, StoreResult};

/// Capacity of the change event channel before slow tabs start lagging
const EVENT_CAPACITY: usize = 64;

/// A mutation of one key, as seen by the other tabs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    /// Tab that performed the mutation
    pub origin: TabId,
    pub key: String,
    pub old_value: Option<String>,
    /// `None` when the key was removed
    pub new_value: Option<String>,
}

/// Errors from waiting on storage events
#[derive(Debug, Error)]
pub enum StorageRecvError {
    #[error("Storage closed")]
    Closed,

    #[error("Missed {0} storage events")]
    Lagged(u64),
}

struct SharedInner {
    backend: Box<dyn KvBackend>,
    events: broadcast::Sender<StorageEvent>,
    /// Serializes write + announce so events leave in write order
    write_lock: Mutex<()>,
}

/// Storage shared by all tabs of one origin
#[derive(Clone)]
pub struct SharedStorage {
    inner: Arc<SharedInner>,
}

impl SharedStorage {
    pub fn new(backend: impl KvBackend + 'static) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(SharedInner {
                backend: Box::new(backend),
                events,
                write_lock: Mutex::new(()),
            }),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    /// Attach a tab to this origin
    pub fn attach(&self, tab_id: TabId) -> TabStorage {
        debug!(tab_id = %tab_id.short(), "Tab attached to origin storage");
        TabStorage {
            tab_id,
            shared: self.clone(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.inner.backend.is_healthy()
    }

    /// Number of tabs currently listening for changes
    pub fn subscriber_count(&self) -> usize {
        self.inner.events.receiver_count()
    }

    fn mutate(&self, origin: TabId, key: &str, new_value: Option<&str>) -> StoreResult<()> {
        let _guard = self.inner.write_lock.lock()?;

        let old_value = self.inner.backend.get(key)?;
        match new_value {
            Some(value) => self.inner.backend.set(key, value)?,
            None => self.inner.backend.remove(key)?,
        }

        let event = StorageEvent {
            origin,
            key: key.to_string(),
            old_value,
            new_value: new_value.map(str::to_string),
        };

        // No receivers just means no other tab is open
        let receivers = self.inner.events.send(event).unwrap_or(0);
        trace!(tab_id = %origin.short(), key, receivers, "Storage change announced");

        Ok(())
    }
}

/// One tab's handle on the shared storage
#[derive(Clone)]
pub struct TabStorage {
    tab_id: TabId,
    shared: SharedStorage,
}

impl TabStorage {
    pub fn tab_id(&self) -> TabId {
        self.tab_id
    }

    pub fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.shared.inner.backend.get(key)
    }

    /// Store a value and notify the other tabs, even if the value is unchanged
    pub fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.shared.mutate(self.tab_id, key, Some(value))
    }

    /// Remove a key and notify the other tabs
    pub fn remove(&self, key: &str) -> StoreResult<()> {
        self.shared.mutate(self.tab_id, key, None)
    }

    /// Listen for mutations made by other tabs
    pub fn subscribe(&self) -> StorageSubscription {
        StorageSubscription {
            tab_id: self.tab_id,
            rx: self.shared.inner.events.subscribe(),
        }
    }
}

/// Stream of storage events from other tabs
pub struct StorageSubscription {
    tab_id: TabId,
    rx: broadcast::Receiver<StorageEvent>,
}

impl StorageSubscription {
    /// Wait for the next mutation made by another tab
    pub async fn recv(&mut self) -> Result<StorageEvent, StorageRecvError> {
        loop {
            match self.rx.recv().await {
                Ok(event) if event.origin == self.tab_id => continue,
                Ok(event) => return Ok(event),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    return Err(StorageRecvError::Lagged(n));
                }
                Err(broadcast::error::RecvError::Closed) => return Err(StorageRecvError::Closed),
            }
        }
    }

    /// Take the next pending event from another tab without waiting
    pub fn try_recv(&mut self) -> Option<Result<StorageEvent, StorageRecvError>> {
        loop {
            match self.rx.try_recv() {
                Ok(event) if event.origin == self.tab_id => continue,
                Ok(event) => return Some(Ok(event)),
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(StorageRecvError::Lagged(n)));
                }
                Err(broadcast::error::TryRecvError::Closed) => {
                    return Some(Err(StorageRecvError::Closed));
                }
            }
        }
    }
}
