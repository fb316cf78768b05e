//! Client trait definitions

use async_trait::async_trait;
use breakwatch_api::{ActionOutcome, BreakStatus};
use thiserror::Error;

/// Errors from backend calls
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Break reason is required")]
    EmptyReason,

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Server returned HTTP {status}")]
    Http { status: u16 },

    #[error("Unexpected response: {0}")]
    Decode(String),
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Requests against the authoritative break-tracking service.
///
/// Implementations never touch local timer state; callers update it only
/// after a successful reply.
#[async_trait]
pub trait StatusClient: Send + Sync {
    /// Query whether a break is active and since when
    async fn check_status(&self) -> ClientResult<BreakStatus>;

    /// Ask the server to open a break. `ok == false` when one is already active.
    async fn start_break(&self) -> ClientResult<ActionOutcome>;

    /// Ask the server to close the active break and log `reason`.
    ///
    /// A blank reason fails with [`ClientError::EmptyReason`] without any
    /// request being sent.
    async fn end_break(&self, reason: &str) -> ClientResult<ActionOutcome>;
}

/// Normalize a user supplied reason, rejecting blank input
pub fn normalize_reason(reason: &str) -> ClientResult<&str> {
    let trimmed = reason.trim();
    if trimmed.is_empty() {
        Err(ClientError::EmptyReason)
    } else {
        Ok(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_reason() {
        assert_eq!(normalize_reason("  lunch \n").unwrap(), "lunch");
        assert!(matches!(normalize_reason(""), Err(ClientError::EmptyReason)));
        assert!(matches!(normalize_reason(" \t "), Err(ClientError::EmptyReason)));
    }
}
