//! Domain outcomes of break-tracking backend calls

use breakwatch_util::EpochMillis;
use serde::{Deserialize, Serialize};

/// Authoritative break status as reported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BreakStatus {
    Idle,
    Active { started_at: EpochMillis },
}

impl BreakStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active { .. })
    }

    pub fn started_at(&self) -> Option<EpochMillis> {
        match self {
            Self::Active { started_at } => Some(*started_at),
            Self::Idle => None,
        }
    }
}

/// Result of a start or end request that reached the backend
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub ok: bool,
    pub message: Option<String>,
}

impl ActionOutcome {
    pub fn success() -> Self {
        Self {
            ok: true,
            message: None,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: Some(message.into()),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Severity of a status banner message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Success,
    Info,
    Warning,
    Danger,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Danger => "danger",
        }
    }
}
