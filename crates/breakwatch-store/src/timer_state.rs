//! Typed access to the shared timer state record

use breakwatch_api::TimerState;
use breakwatch_util::TabId;
use tracing::{debug, warn};

use crate::{StorageSubscription, StoreResult, TabStorage};

/// One tab's view of the singleton timer state
#[derive(Clone)]
pub struct TimerStateStore {
    storage: TabStorage,
    key: String,
}

impl TimerStateStore {
    pub fn new(storage: TabStorage, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn tab_id(&self) -> TabId {
        self.storage.tab_id()
    }

    /// Read the stored state.
    ///
    /// Missing, unreadable or malformed values all read as `None`, which
    /// callers treat as "no break running".
    pub fn read(&self) -> Option<TimerState> {
        let raw = match self.storage.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to read timer state");
                return None;
            }
        };

        match TimerState::decode(&raw) {
            Ok(state) => Some(state),
            Err(e) => {
                warn!(key = %self.key, error = %e, "Ignoring malformed timer state");
                None
            }
        }
    }

    /// Store `state` and notify every other tab, even when it is unchanged
    pub fn write(&self, state: &TimerState) -> StoreResult<()> {
        let json = state.encode()?;
        self.storage.set(&self.key, &json)?;
        debug!(
            tab_id = %self.tab_id().short(),
            is_running = state.is_running,
            start_time = ?state.start_time,
            "Timer state written"
        );
        Ok(())
    }

    /// Remove the stored state and notify every other tab
    pub fn clear(&self) -> StoreResult<()> {
        self.storage.remove(&self.key)?;
        debug!(tab_id = %self.tab_id().short(), "Timer state cleared");
        Ok(())
    }

    /// Raw storage events from other tabs (all keys)
    pub fn subscribe(&self) -> StorageSubscription {
        self.storage.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SharedStorage;
    use breakwatch_util::EpochMillis;

    fn store(storage: &SharedStorage) -> TimerStateStore {
        TimerStateStore::new(storage.attach(TabId::new()), "breakTimerState")
    }

    #[test]
    fn test_write_read_clear() {
        let storage = SharedStorage::in_memory();
        let store = store(&storage);
        assert_eq!(store.read(), None);

        let state = TimerState::running(EpochMillis::from_millis(1_000));
        store.write(&state).unwrap();
        assert_eq!(store.read(), Some(state));

        store.clear().unwrap();
        assert_eq!(store.read(), None);
    }

    #[test]
    fn test_state_visible_to_other_tabs() {
        let storage = SharedStorage::in_memory();
        let a = store(&storage);
        let b = store(&storage);

        a.write(&TimerState::running(EpochMillis::from_millis(5))).unwrap();
        assert_eq!(b.read().and_then(|s| s.running_since()), Some(EpochMillis::from_millis(5)));
    }

    #[test]
    fn test_malformed_value_reads_as_none() {
        let storage = SharedStorage::in_memory();
        let raw = storage.attach(TabId::new());
        let store = store(&storage);

        raw.set("breakTimerState", "1700000000000").unwrap();
        assert_eq!(store.read(), None);

        raw.set("breakTimerState", r#"{"isRunning":true}"#).unwrap();
        assert_eq!(store.read(), None);
    }

    #[test]
    fn test_durable_backend_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("origin.db");
        let state = TimerState::running(EpochMillis::from_millis(77));

        {
            let storage = SharedStorage::new(crate::SqliteBackend::open(&path).unwrap());
            store(&storage).write(&state).unwrap();
        }

        let storage = SharedStorage::new(crate::SqliteBackend::open(&path).unwrap());
        assert_eq!(store(&storage).read(), Some(state));
    }
}
