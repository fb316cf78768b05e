//! Error types for breakwatch

use thiserror::Error;

/// Why a break session action was refused
#[derive(Debug, Error)]
pub enum BreakError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("No active break")]
    NoActiveBreak,

    #[error("Break already active")]
    BreakAlreadyActive,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BreakError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
