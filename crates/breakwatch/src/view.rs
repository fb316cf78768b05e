//! Terminal rendering of a tab

use breakwatch_api::Severity;
use breakwatch_core::BreakView;
use breakwatch_util::IDLE_DISPLAY;
use std::sync::Mutex;

#[derive(Debug)]
struct Screen {
    running: bool,
    timer_text: String,
    prompt_visible: bool,
    status: Option<(String, Severity)>,
}

/// Prints a tab's changes as labelled lines on stdout
pub struct TerminalView {
    label: String,
    print_ticks: bool,
    screen: Mutex<Screen>,
}

impl TerminalView {
    pub fn new(label: impl Into<String>, print_ticks: bool) -> Self {
        Self {
            label: label.into(),
            print_ticks,
            screen: Mutex::new(Screen {
                running: false,
                timer_text: IDLE_DISPLAY.to_string(),
                prompt_visible: false,
                status: None,
            }),
        }
    }

    /// One-line summary of everything the tab shows
    pub fn summary(&self) -> String {
        let Ok(screen) = self.screen.lock() else {
            return format!("[{}] unavailable", self.label);
        };

        let button = if screen.running { "[End Break]" } else { "[Start Break]" };
        let mut line = format!("[{}] {} {}", self.label, screen.timer_text, button);
        if screen.prompt_visible {
            line.push_str(" (reason?)");
        }
        if let Some((message, severity)) = &screen.status {
            line.push_str(&format!(" {}: {}", severity.as_str(), message));
        }
        line
    }

    fn print(&self, text: &str) {
        println!("[{}] {}", self.label, text);
    }
}

impl BreakView for TerminalView {
    fn set_running(&self, running: bool) {
        if let Ok(mut screen) = self.screen.lock() {
            if screen.running == running {
                return;
            }
            screen.running = running;
        }
        self.print(if running { "break running" } else { "idle" });
    }

    fn set_timer_text(&self, text: &str) {
        if let Ok(mut screen) = self.screen.lock() {
            screen.timer_text = text.to_string();
        }
        if self.print_ticks {
            self.print(text);
        }
    }

    fn show_reason_prompt(&self) {
        if let Ok(mut screen) = self.screen.lock() {
            screen.prompt_visible = true;
        }
        self.print("reason for the break? (reason <text> / cancel)");
    }

    fn hide_reason_prompt(&self) {
        if let Ok(mut screen) = self.screen.lock() {
            screen.prompt_visible = false;
        }
    }

    fn show_status(&self, message: &str, severity: Severity) {
        if let Ok(mut screen) = self.screen.lock() {
            screen.status = Some((message.to_string(), severity));
        }
        self.print(&format!("{}: {}", severity.as_str(), message));
    }

    fn clear_status(&self) {
        if let Ok(mut screen) = self.screen.lock() {
            screen.status = None;
        }
    }
}
