//! Transient status messages

use breakwatch_api::Severity;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::BreakView;

/// Shows a status message and clears it after a fixed interval.
///
/// A newer message replaces the older one and restarts the interval.
pub struct StatusBanner {
    view: Arc<dyn BreakView>,
    dismiss_after: Duration,
    dismiss: Option<JoinHandle<()>>,
}

impl StatusBanner {
    pub fn new(view: Arc<dyn BreakView>, dismiss_after: Duration) -> Self {
        Self {
            view,
            dismiss_after,
            dismiss: None,
        }
    }

    pub fn show(&mut self, message: &str, severity: Severity) {
        debug!(text = message, severity = severity.as_str(), "Status message");
        self.cancel_dismiss();
        self.view.show_status(message, severity);

        let view = self.view.clone();
        let after = self.dismiss_after;
        self.dismiss = Some(tokio::spawn(async move {
            tokio::time::sleep(after).await;
            view.clear_status();
        }));
    }

    pub fn clear(&mut self) {
        self.cancel_dismiss();
        self.view.clear_status();
    }

    fn cancel_dismiss(&mut self) {
        if let Some(task) = self.dismiss.take() {
            task.abort();
        }
    }
}

impl Drop for StatusBanner {
    fn drop(&mut self) {
        self.cancel_dismiss();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RecordingView;

    #[tokio::test(start_paused = true)]
    async fn test_message_auto_dismisses() {
        let view = Arc::new(RecordingView::new());
        let mut banner = StatusBanner::new(view.clone(), Duration::from_secs(3));

        banner.show("Break started!", Severity::Success);
        assert_eq!(
            view.snapshot().status,
            Some(("Break started!".to_string(), Severity::Success))
        );

        tokio::time::sleep(Duration::from_millis(2_900)).await;
        assert!(view.snapshot().status.is_some());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(view.snapshot().status, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_message_restarts_interval() {
        let view = Arc::new(RecordingView::new());
        let mut banner = StatusBanner::new(view.clone(), Duration::from_secs(3));

        banner.show("first", Severity::Info);
        tokio::time::sleep(Duration::from_secs(2)).await;
        banner.show("second", Severity::Danger);
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert_eq!(
            view.snapshot().status,
            Some(("second".to_string(), Severity::Danger))
        );

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(view.snapshot().status, None);
        assert_eq!(view.snapshot().status_history.len(), 2);
    }
}
