//! Shared origin storage for breakwatch
//!
//! Provides:
//! - Key-value backends (in-memory, SQLite)
//! - A shared storage hub that tells every other tab about each mutation
//! - The typed timer state record on top of it

mod memory;
mod shared;
mod sqlite;
mod timer_state;
mod traits;

pub use memory::*;
pub use shared::*;
pub use sqlite::*;
pub use timer_state::*;
pub use traits::*;

use thiserror::Error;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store lock poisoned")]
    LockPoisoned,
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for StoreError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        StoreError::LockPoisoned
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
