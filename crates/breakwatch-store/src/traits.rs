//! Store trait definitions

use crate::StoreResult;

/// Durable string key-value storage shared by all tabs of an origin.
///
/// Each call is atomic on its own; the shared storage hub serializes
/// read-modify-notify sequences on top of it.
pub trait KvBackend: Send + Sync {
    /// Get the value stored under `key`
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> StoreResult<()>;

    /// Check if the backend is healthy
    fn is_healthy(&self) -> bool;
}
