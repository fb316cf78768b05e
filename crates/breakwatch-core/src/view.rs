//! Presentation capability driven by the session controller

use breakwatch_api::Severity;
use breakwatch_util::IDLE_DISPLAY;
use std::sync::Mutex;

/// What a tab can show. Implementations own their widgets; the controller
/// only tells them what changed.
pub trait BreakView: Send + Sync {
    /// Show the end button while running, the start button otherwise
    fn set_running(&self, running: bool);

    /// Replace the `HH:MM:SS` timer text
    fn set_timer_text(&self, text: &str);

    /// Open the reason prompt
    fn show_reason_prompt(&self);

    /// Close the reason prompt and clear its input
    fn hide_reason_prompt(&self);

    /// Show a transient status message
    fn show_status(&self, message: &str, severity: Severity);

    /// Remove the status message
    fn clear_status(&self);
}

/// Everything a [`RecordingView`] currently displays
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub running: bool,
    pub timer_text: String,
    pub prompt_visible: bool,
    pub status: Option<(String, Severity)>,
    /// Every status message shown so far, oldest first
    pub status_history: Vec<(String, Severity)>,
    /// Number of timer text updates
    pub timer_updates: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            running: false,
            timer_text: IDLE_DISPLAY.to_string(),
            prompt_visible: false,
            status: None,
            status_history: Vec::new(),
            timer_updates: 0,
        }
    }
}

/// Headless view that records what it was told, for tests and simulations
#[derive(Debug, Default)]
pub struct RecordingView {
    state: Mutex<ViewState>,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> ViewState {
        self.state.lock().map(|s| s.clone()).unwrap_or_default()
    }

    fn update(&self, f: impl FnOnce(&mut ViewState)) {
        if let Ok(mut state) = self.state.lock() {
            f(&mut state);
        }
    }
}

impl BreakView for RecordingView {
    fn set_running(&self, running: bool) {
        self.update(|s| s.running = running);
    }

    fn set_timer_text(&self, text: &str) {
        self.update(|s| {
            s.timer_text = text.to_string();
            s.timer_updates += 1;
        });
    }

    fn show_reason_prompt(&self) {
        self.update(|s| s.prompt_visible = true);
    }

    fn hide_reason_prompt(&self) {
        self.update(|s| s.prompt_visible = false);
    }

    fn show_status(&self, message: &str, severity: Severity) {
        self.update(|s| {
            s.status = Some((message.to_string(), severity));
            s.status_history.push((message.to_string(), severity));
        });
    }

    fn clear_status(&self) {
        self.update(|s| s.status = None);
    }
}
