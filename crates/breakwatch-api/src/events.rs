//! Cross-tab broadcast messages

use serde::{Deserialize, Serialize};

use crate::TimerState;

/// What another tab learns when the shared timer state changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BroadcastMessage {
    /// The timer state was written (possibly with an unchanged value)
    State(TimerState),
    /// The timer state was cleared: the break ended
    Ended,
}

impl BroadcastMessage {
    /// The state a receiving tab should adopt
    pub fn timer_state(&self) -> TimerState {
        match self {
            Self::State(state) => *state,
            Self::Ended => TimerState::idle(),
        }
    }
}
