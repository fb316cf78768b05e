//! Integration tests for breakwatch
//!
//! Several tabs share one origin storage and one mock backend. Time is paused,
//! so clock ticks and status dismissal are driven by the tokio clock.

use async_trait::async_trait;
use breakwatch_api::{ActionOutcome, BreakStatus, BroadcastMessage, Severity, TimerState};
use breakwatch_broadcast::BroadcastChannel;
use breakwatch_client::{ClientResult, MockBreakServer, StatusClient};
use breakwatch_config::DisplayConfig;
use breakwatch_core::{BreakPhase, RecordingView, RuntimeTime, Tab, TabHandle, ViewState};
use breakwatch_store::{SharedStorage, SqliteBackend, TimerStateStore};
use breakwatch_util::{EpochMillis, TabId};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

const KEY: &str = "breakTimerState";
const BASE: EpochMillis = EpochMillis::from_millis(1_700_000_000_000);

/// Backend client that counts the calls one tab makes
struct CountingClient {
    inner: MockBreakServer,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl StatusClient for CountingClient {
    async fn check_status(&self) -> ClientResult<BreakStatus> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.check_status().await
    }

    async fn start_break(&self) -> ClientResult<ActionOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.start_break().await
    }

    async fn end_break(&self, reason: &str) -> ClientResult<ActionOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.end_break(reason).await
    }
}

struct World {
    storage: SharedStorage,
    server: MockBreakServer,
    time: Arc<RuntimeTime>,
}

struct TestTab {
    handle: TabHandle,
    view: Arc<RecordingView>,
}

impl TestTab {
    fn view(&self) -> ViewState {
        self.view.snapshot()
    }

    async fn phase(&self) -> BreakPhase {
        self.handle.phase().await.unwrap()
    }
}

impl World {
    fn new() -> Self {
        Self::with_storage(SharedStorage::in_memory())
    }

    fn with_storage(storage: SharedStorage) -> Self {
        let time = Arc::new(RuntimeTime::new(BASE));
        Self {
            storage,
            server: MockBreakServer::new(time.clone()),
            time,
        }
    }

    fn store(&self) -> TimerStateStore {
        TimerStateStore::new(self.storage.attach(TabId::new()), KEY)
    }

    fn open_tab(&self) -> TestTab {
        self.open_tab_with(Arc::new(self.server.clone()))
    }

    fn open_tab_with(&self, client: Arc<dyn StatusClient>) -> TestTab {
        let view = Arc::new(RecordingView::new());
        let (tab, handle) = Tab::new(
            self.store(),
            view.clone(),
            client,
            self.time.clone(),
            &DisplayConfig::default(),
        );
        tokio::spawn(tab.run());
        TestTab { handle, view }
    }
}

/// Let every tab, backend call and broadcast run to quiescence
async fn settle() {
    for _ in 0..50 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn test_start_count_end_scenario() {
    let world = World::new();
    let tab = world.open_tab();
    settle().await;

    let view = tab.view();
    assert!(!view.running);
    assert_eq!(view.timer_text, "00:00:00");

    tab.handle.start().unwrap();
    settle().await;
    let view = tab.view();
    assert!(view.running);
    assert_eq!(view.timer_text, "00:00:00");
    assert_eq!(
        view.status,
        Some(("Break started!".to_string(), Severity::Success))
    );

    tokio::time::sleep(Duration::from_millis(65_500)).await;
    assert_eq!(tab.view().timer_text, "00:01:05");

    tab.handle.end().unwrap();
    tab.handle.submit_reason("lunch").unwrap();
    settle().await;

    let view = tab.view();
    assert!(!view.running);
    assert!(!view.prompt_visible);
    assert_eq!(view.timer_text, "00:00:00");
    assert_eq!(
        view.status,
        Some(("Break logged successfully!".to_string(), Severity::Success))
    );

    tokio::time::sleep(Duration::from_millis(3_100)).await;
    assert_eq!(tab.view().status, None);

    let records = world.server.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].reason, "lunch");
    assert_eq!(
        records[0].ended_at.saturating_millis_since(records[0].started_at),
        65_500
    );
}

#[tokio::test(start_paused = true)]
async fn test_sibling_adopts_start_without_network_call() {
    let world = World::new();
    let a = world.open_tab();
    let b_calls = Arc::new(AtomicUsize::new(0));
    let b = world.open_tab_with(Arc::new(CountingClient {
        inner: world.server.clone(),
        calls: b_calls.clone(),
    }));
    settle().await;
    assert_eq!(b_calls.load(Ordering::SeqCst), 1);

    a.handle.start().unwrap();
    settle().await;

    let since = a.phase().await.since().unwrap();
    assert_eq!(b.phase().await, BreakPhase::Running { since });
    assert!(b.view().running);
    assert_eq!(
        b.view().status,
        Some((
            "Break started in another window".to_string(),
            Severity::Info
        ))
    );
    assert_eq!(b_calls.load(Ordering::SeqCst), 1);

    a.handle.end().unwrap();
    a.handle.submit_reason("coffee").unwrap();
    settle().await;

    assert_eq!(b.phase().await, BreakPhase::Idle);
    assert_eq!(b.view().timer_text, "00:00:00");
    assert_eq!(b_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_tabs_converge() {
    let world = World::new();
    let tabs: Vec<TestTab> = (0..3).map(|_| world.open_tab()).collect();
    settle().await;

    let steps: [(usize, bool); 4] = [(0, true), (1, false), (2, true), (0, false)];
    for (actor, starting) in steps {
        if starting {
            tabs[actor].handle.start().unwrap();
        } else {
            tabs[actor].handle.end().unwrap();
            tabs[actor].handle.submit_reason("step").unwrap();
        }
        settle().await;
        tokio::time::sleep(Duration::from_secs(2)).await;

        let expected = world.server.status();
        for tab in &tabs {
            let phase = tab.phase().await;
            assert_eq!(phase.is_active(), expected.is_active());
            assert_eq!(phase.since(), expected.started_at());
            assert_eq!(tab.view().running, expected.is_active());
        }
    }

    assert_eq!(world.server.records().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_starts_converge_on_one_break() {
    let world = World::new();
    let a = world.open_tab();
    let b = world.open_tab();
    settle().await;

    a.handle.start().unwrap();
    b.handle.start().unwrap();
    settle().await;

    let started_at = world.server.status().started_at().unwrap();
    assert_eq!(a.phase().await, BreakPhase::Running { since: started_at });
    assert_eq!(b.phase().await, BreakPhase::Running { since: started_at });
    assert!(world.server.records().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_reload_is_idempotent() {
    let world = World::new();
    let tab = world.open_tab();
    settle().await;
    tab.handle.start().unwrap();
    settle().await;

    let listener = world.store();
    let mut channel = BroadcastChannel::open(&listener);

    for _ in 0..2 {
        tab.handle.reload().unwrap();
        settle().await;
    }

    assert!(channel.try_next().is_none());
    assert!(tab.phase().await.is_active());
    assert_eq!(world.server.status_calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_blank_reason_never_reaches_server() {
    let world = World::new();
    let tab = world.open_tab();
    settle().await;
    tab.handle.start().unwrap();
    settle().await;

    tab.handle.end().unwrap();
    tab.handle.submit_reason("   ").unwrap();
    settle().await;

    assert_eq!(world.server.end_calls(), 0);
    assert!(matches!(
        tab.phase().await,
        BreakPhase::PendingReasonEntry { .. }
    ));
    assert!(tab.view().prompt_visible);
    assert_eq!(
        tab.view().status,
        Some((
            "Please enter a reason for your break".to_string(),
            Severity::Warning
        ))
    );
}

#[tokio::test(start_paused = true)]
async fn test_load_corrects_stale_storage() {
    let world = World::new();
    // Left behind by a tab that closed before its "ended" write propagated
    let stale = world.store();
    stale.write(&TimerState::running(BASE)).unwrap();

    let listener = world.store();
    let mut channel = BroadcastChannel::open(&listener);

    let tab = world.open_tab();
    settle().await;

    assert_eq!(tab.phase().await, BreakPhase::Idle);
    assert_eq!(listener.read(), None);
    assert_eq!(channel.try_next().unwrap().unwrap(), BroadcastMessage::Ended);
}

#[tokio::test(start_paused = true)]
async fn test_server_failure_leaves_state_unchanged() {
    let world = World::new();
    let tab = world.open_tab();
    settle().await;
    tab.handle.start().unwrap();
    settle().await;
    let running = tab.phase().await;

    world.server.set_fail_logging(true);
    tab.handle.end().unwrap();
    tab.handle.submit_reason("lunch").unwrap();
    settle().await;

    assert_eq!(tab.phase().await, running);
    assert!(tab.view().running);
    assert!(!tab.view().prompt_visible);
    assert!(world.server.records().is_empty());
    assert!(
        tab.view()
            .status_history
            .contains(&("Failed to log break".to_string(), Severity::Danger))
    );

    world.server.set_offline(true);
    world.server.set_fail_logging(false);
    tab.handle.end().unwrap();
    tab.handle.submit_reason("lunch").unwrap();
    settle().await;

    assert_eq!(tab.phase().await, running);
    assert_eq!(world.store().read(), Some(running.timer_state()));
}

#[tokio::test(start_paused = true)]
async fn test_durable_storage_resumes_while_offline() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("origin-storage.db");

    let since = {
        let world = World::with_storage(SharedStorage::new(SqliteBackend::open(&path).unwrap()));
        let tab = world.open_tab();
        settle().await;
        tab.handle.start().unwrap();
        settle().await;
        let since = tab.phase().await.since().unwrap();
        tab.handle.close().unwrap();
        settle().await;
        since
    };

    let world = World::with_storage(SharedStorage::new(SqliteBackend::open(&path).unwrap()));
    world.server.set_offline(true);
    let tab = world.open_tab();
    settle().await;

    assert_eq!(tab.phase().await, BreakPhase::Running { since });
    assert_eq!(
        tab.view().status,
        Some(("Could not check break status".to_string(), Severity::Danger))
    );
}
