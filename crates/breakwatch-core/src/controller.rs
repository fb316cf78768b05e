//! Break session controller
//!
//! One controller per tab. It owns the tab's phase, clock and banner, writes
//! the shared timer state, and decides what to show. It performs no I/O of
//! its own: user actions produce [`OutboundRequest`]s which the tab runtime
//! executes and feeds back through [`BreakSessionController::on_reply`].

use breakwatch_api::{ActionOutcome, BreakStatus, BroadcastMessage, Severity, TimerState};
use breakwatch_client::{ClientError, ClientResult, normalize_reason};
use breakwatch_config::DisplayConfig;
use breakwatch_store::TimerStateStore;
use breakwatch_util::{BreakError, EpochMillis, IDLE_DISPLAY, TabId, TimeSource, format_elapsed};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{
    BreakPhase, BreakView, OutboundRequest, RequestTracker, ServerCall, ServerReply,
    StatusBanner, Ticket, TimerClock, Transition,
};

pub const MSG_STARTED: &str = "Break started!";
pub const MSG_IN_PROGRESS: &str = "Break in progress";
pub const MSG_NOT_ACTIVE: &str = "No active break";
pub const MSG_STARTED_ELSEWHERE: &str = "Break started in another window";
pub const MSG_ENDED_ELSEWHERE: &str = "Break ended in another window!";
pub const MSG_LOGGED: &str = "Break logged successfully!";
pub const MSG_REASON_REQUIRED: &str = "Please enter a reason for your break";
pub const MSG_START_FAILED: &str = "Failed to start break";
pub const MSG_LOG_FAILED: &str = "Failed to log break";
pub const MSG_STATUS_FAILED: &str = "Could not check break status";

/// Drives one tab through Idle -> Running -> PendingReasonEntry -> Idle
pub struct BreakSessionController {
    tab_id: TabId,
    store: TimerStateStore,
    view: Arc<dyn BreakView>,
    time: Arc<dyn TimeSource>,
    clock: TimerClock,
    banner: StatusBanner,
    requests: RequestTracker,
    phase: BreakPhase,
}

impl BreakSessionController {
    /// Create a controller showing the idle view.
    ///
    /// Must be created within a tokio runtime; the clock and banner spawn
    /// tasks on it.
    pub fn new(
        store: TimerStateStore,
        view: Arc<dyn BreakView>,
        time: Arc<dyn TimeSource>,
        display: &DisplayConfig,
    ) -> Self {
        let tab_id = store.tab_id();
        let clock = TimerClock::new(display.tick_interval, time.clone());
        let banner = StatusBanner::new(view.clone(), display.status_dismiss);

        view.set_running(false);
        view.set_timer_text(IDLE_DISPLAY);
        view.hide_reason_prompt();

        debug!(tab_id = %tab_id.short(), key = store.key(), "Break session controller created");

        Self {
            tab_id,
            store,
            view,
            time,
            clock,
            banner,
            requests: RequestTracker::new(),
            phase: BreakPhase::Idle,
        }
    }

    pub fn tab_id(&self) -> TabId {
        self.tab_id
    }

    pub fn phase(&self) -> BreakPhase {
        self.phase
    }

    pub fn clock_running(&self) -> bool {
        self.clock.is_running()
    }

    /// Whether a reply for `transition` is outstanding
    pub fn awaiting(&self, transition: Transition) -> bool {
        self.requests.in_flight(transition)
    }

    /// Begin load-time reconciliation against the server
    pub fn load(&mut self) -> OutboundRequest {
        info!(tab_id = %self.tab_id.short(), "Loading break session");
        self.request(Transition::Reconcile, ServerCall::CheckStatus)
    }

    /// User clicked start
    pub fn click_start(&mut self) -> Result<OutboundRequest, BreakError> {
        if self.phase.is_active() {
            debug!(tab_id = %self.tab_id.short(), phase = self.phase.name(), "Start ignored");
            return Err(BreakError::BreakAlreadyActive);
        }
        if self.requests.in_flight(Transition::Start) {
            return Err(BreakError::conflict("start request already in flight"));
        }
        Ok(self.request(Transition::Start, ServerCall::StartBreak))
    }

    /// User clicked end: stop the clock and ask for a reason
    pub fn click_end(&mut self) -> Result<(), BreakError> {
        match self.phase {
            BreakPhase::Running { since } => {
                self.enter(BreakPhase::PendingReasonEntry { since });
                Ok(())
            }
            BreakPhase::PendingReasonEntry { .. } => Ok(()),
            BreakPhase::Idle => Err(BreakError::NoActiveBreak),
        }
    }

    /// User dismissed the reason prompt: resume the running view
    pub fn cancel_reason(&mut self) -> Result<(), BreakError> {
        match self.phase {
            BreakPhase::PendingReasonEntry { since } => {
                self.enter(BreakPhase::Running { since });
                Ok(())
            }
            BreakPhase::Running { .. } => Err(BreakError::conflict("no reason prompt open")),
            BreakPhase::Idle => Err(BreakError::NoActiveBreak),
        }
    }

    /// User submitted the reason prompt.
    ///
    /// A blank reason shows a warning and never reaches the network.
    pub fn submit_reason(&mut self, reason: &str) -> Result<OutboundRequest, BreakError> {
        if !matches!(self.phase, BreakPhase::PendingReasonEntry { .. }) {
            return Err(BreakError::NoActiveBreak);
        }

        let reason = match normalize_reason(reason) {
            Ok(reason) => reason.to_string(),
            Err(e) => {
                debug!(tab_id = %self.tab_id.short(), "Blank break reason rejected");
                self.banner.show(MSG_REASON_REQUIRED, Severity::Warning);
                return Err(BreakError::validation(e.to_string()));
            }
        };

        if self.requests.in_flight(Transition::End) {
            return Err(BreakError::conflict("end request already in flight"));
        }

        Ok(self.request(Transition::End, ServerCall::EndBreak { reason }))
    }

    /// Apply a backend reply. May return a follow-up call.
    pub fn on_reply(
        &mut self,
        ticket: Ticket,
        result: ClientResult<ServerReply>,
    ) -> Option<OutboundRequest> {
        if !self.requests.complete(&ticket) {
            warn!(
                tab_id = %self.tab_id.short(),
                transition = %ticket.transition,
                seq = ticket.seq,
                issued_at = %ticket.issued_at,
                "Discarding stale reply"
            );
            return None;
        }

        match result {
            Ok(ServerReply::Status(status)) => {
                self.reconcile(status);
                None
            }
            Ok(ServerReply::Start(outcome)) => self.on_start_outcome(outcome),
            Ok(ServerReply::End(outcome)) => self.on_end_outcome(outcome),
            Err(e) => {
                self.on_call_failed(ticket.transition, e);
                None
            }
        }
    }

    /// Bring the shared state and this tab in line with the server.
    ///
    /// The shared state is rewritten only when it disagrees, so repeating a
    /// reconciliation with an unchanged status neither writes nor broadcasts.
    /// Returns whether anything changed.
    pub fn reconcile(&mut self, status: BreakStatus) -> bool {
        let server_state = match status {
            BreakStatus::Active { started_at } => TimerState::running(started_at),
            BreakStatus::Idle => TimerState::idle(),
        };

        let local_state = self.store.read().unwrap_or_default();
        let mut changed = false;
        if local_state != server_state {
            info!(
                tab_id = %self.tab_id.short(),
                local = ?local_state,
                server = ?server_state,
                "Local timer state disagrees with server, overwriting"
            );
            self.publish(&server_state);
            changed = true;
        }

        let next = BreakPhase::from(status);
        if next.since() != self.phase.since() {
            let was_active = self.phase.is_active();
            self.enter(next);
            if next.is_active() {
                self.banner.show(MSG_IN_PROGRESS, Severity::Info);
            } else if was_active {
                self.banner.show(MSG_NOT_ACTIVE, Severity::Info);
            }
            changed = true;
        }

        changed
    }

    /// Adopt a state written by another tab. Never calls the server.
    pub fn on_broadcast(&mut self, message: BroadcastMessage) {
        let next = BreakPhase::from(&self.admit(message.timer_state()));
        if next.since() == self.phase.since() {
            debug!(tab_id = %self.tab_id.short(), ?message, "Broadcast matches current phase");
            return;
        }

        // The other tab heard from the server after any call still in flight here
        self.requests.supersede(Transition::Reconcile);
        self.requests.supersede(Transition::Start);
        // An end reply after an Ended broadcast still confirms the reason was logged
        if next.is_active() {
            self.requests.supersede(Transition::End);
        }

        let was_active = self.phase.is_active();
        self.enter(next);
        if next.is_active() {
            self.banner.show(MSG_STARTED_ELSEWHERE, Severity::Info);
        } else if was_active {
            self.banner.show(MSG_ENDED_ELSEWHERE, Severity::Info);
        }
    }

    fn on_start_outcome(&mut self, outcome: ActionOutcome) -> Option<OutboundRequest> {
        if !outcome.ok {
            let message = outcome.message.as_deref().unwrap_or(MSG_START_FAILED);
            warn!(tab_id = %self.tab_id.short(), reply = message, "Server rejected break start");
            self.banner.show(message, Severity::Warning);
            return Some(self.request(Transition::Reconcile, ServerCall::CheckStatus));
        }

        if self.phase.is_active() {
            // Another tab's break was adopted meanwhile; ask which one the server kept
            return Some(self.request(Transition::Reconcile, ServerCall::CheckStatus));
        }

        let since = self.time.now();
        self.publish(&TimerState::running(since));
        self.enter(BreakPhase::Running { since });
        self.banner.show(MSG_STARTED, Severity::Success);
        None
    }

    fn on_end_outcome(&mut self, outcome: ActionOutcome) -> Option<OutboundRequest> {
        if !outcome.ok {
            let message = outcome.message.as_deref().unwrap_or(MSG_LOG_FAILED);
            warn!(tab_id = %self.tab_id.short(), reply = message, "Server rejected break end");
            self.resume_after_failed_end();
            self.banner.show(message, Severity::Danger);
            return Some(self.request(Transition::Reconcile, ServerCall::CheckStatus));
        }

        self.publish(&TimerState::idle());
        self.enter(BreakPhase::Idle);
        self.banner.show(MSG_LOGGED, Severity::Success);
        None
    }

    fn on_call_failed(&mut self, transition: Transition, error: ClientError) {
        warn!(
            tab_id = %self.tab_id.short(),
            %transition,
            error = %error,
            "Backend call failed"
        );

        match transition {
            Transition::Reconcile => {
                // Fall back to the cached state until the next reconciliation
                if let Some(cached) = self.store.read() {
                    let next = BreakPhase::from(&self.admit(cached));
                    if next.since() != self.phase.since() {
                        self.enter(next);
                    }
                }
                self.banner.show(MSG_STATUS_FAILED, Severity::Danger);
            }
            Transition::Start => self.banner.show(MSG_START_FAILED, Severity::Danger),
            Transition::End => {
                self.resume_after_failed_end();
                self.banner.show(MSG_LOG_FAILED, Severity::Danger);
            }
        }
    }

    /// Treat a state whose break starts in the future as no break at all
    fn admit(&self, state: TimerState) -> TimerState {
        let now = self.time.now();
        if state.started_by(now) {
            return state;
        }
        warn!(
            tab_id = %self.tab_id.short(),
            start_time = ?state.start_time,
            %now,
            "Ignoring timer state that starts in the future"
        );
        TimerState::idle()
    }

    fn resume_after_failed_end(&mut self) {
        if let BreakPhase::PendingReasonEntry { since } = self.phase {
            self.enter(BreakPhase::Running { since });
        }
    }

    /// Write (or clear) the shared state, notifying every other tab.
    ///
    /// A failed write is logged and otherwise ignored: the server already
    /// holds the truth and the next reconciliation restores it.
    fn publish(&self, state: &TimerState) {
        let result = if state.is_running {
            self.store.write(state)
        } else {
            self.store.clear()
        };
        if let Err(e) = result {
            warn!(
                tab_id = %self.tab_id.short(),
                error = %e,
                "Failed to publish timer state, server will win on next reconciliation"
            );
        }
    }

    fn request(&mut self, transition: Transition, call: ServerCall) -> OutboundRequest {
        let ticket = self.requests.issue(transition, self.time.now());
        debug!(
            tab_id = %self.tab_id.short(),
            %transition,
            seq = ticket.seq,
            "Issuing backend call"
        );
        OutboundRequest { ticket, call }
    }

    fn enter(&mut self, next: BreakPhase) {
        let previous = self.phase;
        self.phase = next;

        match next {
            BreakPhase::Idle => {
                self.clock.stop();
                self.view.hide_reason_prompt();
                self.view.set_running(false);
                self.view.set_timer_text(IDLE_DISPLAY);
            }
            BreakPhase::Running { since } => {
                self.view.hide_reason_prompt();
                self.view.set_running(true);
                self.render_elapsed(since);
                let view = self.view.clone();
                self.clock
                    .start(since, move |elapsed| view.set_timer_text(&format_elapsed(elapsed)));
            }
            BreakPhase::PendingReasonEntry { .. } => {
                self.clock.stop();
                self.view.set_running(true);
                self.view.show_reason_prompt();
            }
        }

        info!(
            tab_id = %self.tab_id.short(),
            from = previous.name(),
            to = next.name(),
            since = ?next.since(),
            "Break phase changed"
        );
    }

    fn render_elapsed(&self, since: EpochMillis) {
        let elapsed = self.time.now().saturating_millis_since(since);
        self.view.set_timer_text(&format_elapsed(elapsed));
    }
}
