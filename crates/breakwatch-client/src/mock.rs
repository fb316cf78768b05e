//! In-memory break-tracking backend for testing

use async_trait::async_trait;
use breakwatch_api::{ActionOutcome, BreakStatus};
use breakwatch_util::{EpochMillis, SystemTime, TimeSource};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::{normalize_reason, ClientError, ClientResult, StatusClient};

/// A break logged by the mock backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakRecord {
    pub reason: String,
    pub started_at: EpochMillis,
    pub ended_at: EpochMillis,
}

#[derive(Debug, Default)]
struct MockState {
    active_since: Option<EpochMillis>,
    records: Vec<BreakRecord>,
}

/// Single-user backend shared by every tab of a test.
///
/// Clones share state, so one instance can serve several tabs.
#[derive(Clone)]
pub struct MockBreakServer {
    time: Arc<dyn TimeSource>,
    state: Arc<Mutex<MockState>>,
    status_calls: Arc<AtomicUsize>,
    start_calls: Arc<AtomicUsize>,
    end_calls: Arc<AtomicUsize>,

    /// Make every call fail as if the server were unreachable
    pub offline: Arc<AtomicBool>,

    /// Make end requests fail with a server-side logging error
    pub fail_logging: Arc<AtomicBool>,
}

impl MockBreakServer {
    pub fn new(time: Arc<dyn TimeSource>) -> Self {
        Self {
            time,
            state: Arc::new(Mutex::new(MockState::default())),
            status_calls: Arc::new(AtomicUsize::new(0)),
            start_calls: Arc::new(AtomicUsize::new(0)),
            end_calls: Arc::new(AtomicUsize::new(0)),
            offline: Arc::new(AtomicBool::new(false)),
            fail_logging: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_system_time() -> Self {
        Self::new(Arc::new(SystemTime))
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn set_fail_logging(&self, fail: bool) {
        self.fail_logging.store(fail, Ordering::SeqCst);
    }

    /// Overwrite the authoritative status, as another device would
    pub fn force_status(&self, status: BreakStatus) {
        if let Ok(mut state) = self.state.lock() {
            state.active_since = status.started_at();
        }
    }

    pub fn status(&self) -> BreakStatus {
        match self.state.lock().ok().and_then(|s| s.active_since) {
            Some(started_at) => BreakStatus::Active { started_at },
            None => BreakStatus::Idle,
        }
    }

    pub fn records(&self) -> Vec<BreakRecord> {
        self.state
            .lock()
            .map(|s| s.records.clone())
            .unwrap_or_default()
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn start_calls(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    pub fn end_calls(&self) -> usize {
        self.end_calls.load(Ordering::SeqCst)
    }

    /// Total number of requests that reached the server
    pub fn total_calls(&self) -> usize {
        self.status_calls() + self.start_calls() + self.end_calls()
    }

    fn check_online(&self) -> ClientResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(ClientError::Transport("connection refused".into()));
        }
        Ok(())
    }

    fn lock(&self) -> ClientResult<std::sync::MutexGuard<'_, MockState>> {
        self.state
            .lock()
            .map_err(|_| ClientError::Transport("mock server poisoned".into()))
    }
}

#[async_trait]
impl StatusClient for MockBreakServer {
    async fn check_status(&self) -> ClientResult<BreakStatus> {
        self.check_online()?;
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.status())
    }

    async fn start_break(&self) -> ClientResult<ActionOutcome> {
        self.check_online()?;
        self.start_calls.fetch_add(1, Ordering::SeqCst);

        let mut state = self.lock()?;
        if state.active_since.is_some() {
            debug!("Mock server rejected start: break already active");
            return Ok(ActionOutcome::rejected("Break already active"));
        }

        state.active_since = Some(self.time.now());
        Ok(ActionOutcome::success())
    }

    async fn end_break(&self, reason: &str) -> ClientResult<ActionOutcome> {
        let reason = normalize_reason(reason)?;
        self.check_online()?;
        self.end_calls.fetch_add(1, Ordering::SeqCst);

        let mut state = self.lock()?;
        let Some(started_at) = state.active_since else {
            debug!("Mock server rejected end: no active break");
            return Ok(ActionOutcome::rejected("No active break"));
        };

        if self.fail_logging.load(Ordering::SeqCst) {
            return Ok(ActionOutcome::rejected("Failed to log break"));
        }

        state.records.push(BreakRecord {
            reason: reason.to_string(),
            started_at,
            ended_at: self.time.now(),
        });
        state.active_since = None;

        Ok(ActionOutcome::success().with_message("Break logged"))
    }
}
