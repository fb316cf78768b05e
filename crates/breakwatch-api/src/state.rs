//! The persisted timer state record

use breakwatch_util::EpochMillis;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a stored value could not be used as a [`TimerState`]
#[derive(Debug, Error)]
pub enum StateDecodeError {
    #[error("not a timer state record: {0}")]
    Json(#[from] serde_json::Error),

    #[error("inconsistent record: is_running={is_running}, start_time present={has_start}")]
    Inconsistent { is_running: bool, has_start: bool },
}

/// Whether a break is active for this session, and since when.
///
/// Stored as `{"isRunning": true, "startTime": <epoch ms>}`. A running state
/// always carries a start time; an idle one never does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub is_running: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<EpochMillis>,
}

impl TimerState {
    pub fn running(since: EpochMillis) -> Self {
        Self {
            is_running: true,
            start_time: Some(since),
        }
    }

    pub fn idle() -> Self {
        Self {
            is_running: false,
            start_time: None,
        }
    }

    /// Start time of the running break, if any
    pub fn running_since(&self) -> Option<EpochMillis> {
        if self.is_running { self.start_time } else { None }
    }

    pub fn is_consistent(&self) -> bool {
        self.is_running == self.start_time.is_some()
    }

    /// Whether the record could have been written by `now`.
    ///
    /// A running break cannot have started in the future; such a record
    /// comes from a skewed clock or a corrupted write and means no break.
    pub fn started_by(&self, now: EpochMillis) -> bool {
        self.running_since().is_none_or(|since| since <= now)
    }

    /// Parse a stored value, rejecting records that break the running/start invariant
    pub fn decode(raw: &str) -> Result<Self, StateDecodeError> {
        let state: TimerState = serde_json::from_str(raw)?;
        if !state.is_consistent() {
            return Err(StateDecodeError::Inconsistent {
                is_running: state.is_running,
                has_start: state.start_time.is_some(),
            });
        }
        Ok(state)
    }

    pub fn encode(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::idle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn running_state_wire_shape() {
        let state = TimerState::running(EpochMillis::from_millis(1_700_000_000_000));
        let json = state.encode().unwrap();
        assert_eq!(json, r#"{"isRunning":true,"startTime":1700000000000}"#);
    }

    #[test]
    fn idle_state_omits_start_time() {
        let json = TimerState::idle().encode().unwrap();
        assert_eq!(json, r#"{"isRunning":false}"#);
        assert_eq!(TimerState::decode(&json).unwrap(), TimerState::idle());
    }

    #[test]
    fn decode_rejects_running_without_start() {
        let err = TimerState::decode(r#"{"isRunning":true}"#).unwrap_err();
        assert!(matches!(err, StateDecodeError::Inconsistent { is_running: true, .. }));
    }

    #[test]
    fn decode_rejects_foreign_values() {
        // Older pages stored a bare timestamp under their own keys
        assert!(TimerState::decode("1700000000000").is_err());
        assert!(TimerState::decode("not json").is_err());
        assert!(TimerState::decode(r#"{"breakActive":"true"}"#).is_err());
    }

    #[test]
    fn future_start_is_not_started_by_now() {
        let now = EpochMillis::from_millis(1_700_000_000_000);
        let later = EpochMillis::from_millis(1_700_003_600_000);
        assert!(TimerState::running(now).started_by(now));
        assert!(!TimerState::running(later).started_by(now));
        assert!(TimerState::idle().started_by(now));
    }

    #[test]
    fn running_since_only_when_running() {
        let since = EpochMillis::from_millis(42);
        assert_eq!(TimerState::running(since).running_since(), Some(since));
        assert_eq!(TimerState::idle().running_since(), None);
    }
}
