//! Break session phases

use breakwatch_api::{BreakStatus, TimerState};
use breakwatch_util::EpochMillis;

/// Where a tab is in the break lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BreakPhase {
    #[default]
    Idle,
    /// A break is active and the clock is ticking
    Running { since: EpochMillis },
    /// End requested: clock stopped, waiting for the user's reason
    PendingReasonEntry { since: EpochMillis },
}

impl BreakPhase {
    /// Start time of the active break, if any
    pub fn since(&self) -> Option<EpochMillis> {
        match self {
            Self::Idle => None,
            Self::Running { since } | Self::PendingReasonEntry { since } => Some(*since),
        }
    }

    /// Whether a break is active, including while a reason is being entered
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Idle)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running { .. } => "running",
            Self::PendingReasonEntry { .. } => "pending_reason_entry",
        }
    }

    /// Shared record for this phase
    pub fn timer_state(&self) -> TimerState {
        match self.since() {
            Some(since) => TimerState::running(since),
            None => TimerState::idle(),
        }
    }
}

impl From<BreakStatus> for BreakPhase {
    fn from(status: BreakStatus) -> Self {
        match status {
            BreakStatus::Active { started_at } => Self::Running { since: started_at },
            BreakStatus::Idle => Self::Idle,
        }
    }
}

impl From<&TimerState> for BreakPhase {
    fn from(state: &TimerState) -> Self {
        match state.running_since() {
            Some(since) => Self::Running { since },
            None => Self::Idle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_from_state() {
        let since = EpochMillis::from_millis(42);
        assert_eq!(
            BreakPhase::from(&TimerState::running(since)),
            BreakPhase::Running { since }
        );
        assert_eq!(BreakPhase::from(&TimerState::idle()), BreakPhase::Idle);
    }

    #[test]
    fn test_pending_is_still_active() {
        let since = EpochMillis::from_millis(42);
        let phase = BreakPhase::PendingReasonEntry { since };
        assert!(phase.is_active());
        assert_eq!(phase.timer_state(), TimerState::running(since));
        assert_eq!(BreakPhase::Idle.timer_state(), TimerState::idle());
    }
}
