//! Cross-tab broadcast for breakwatch
//!
//! Turns origin storage change events for the timer state key into
//! [`BroadcastMessage`]s:
//! - one message per write or clear made by another tab
//! - never a message for the tab's own writes
//! - after missed events, a single message carrying the current stored state

mod channel;

pub use channel::*;

use thiserror::Error;

/// Broadcast errors
#[derive(Debug, Error)]
pub enum BroadcastError {
    #[error("Origin storage closed")]
    Closed,
}

pub type BroadcastResult<T> = Result<T, BroadcastError>;
