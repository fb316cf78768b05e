//! Per-tab display clock
//!
//! The clock never accumulates tick counts. Each tick recomputes the elapsed
//! time from the wall clock, so missed ticks (a suspended host, a busy
//! executor) correct themselves on the next one.

use breakwatch_util::{EpochMillis, TimeSource};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, trace};

/// Repeating display-update loop for a running break
pub struct TimerClock {
    period: Duration,
    time: Arc<dyn TimeSource>,
    since: Option<EpochMillis>,
    task: Option<JoinHandle<()>>,
}

impl TimerClock {
    pub fn new(period: Duration, time: Arc<dyn TimeSource>) -> Self {
        Self {
            period,
            time,
            since: None,
            task: None,
        }
    }

    /// Start ticking every period with the elapsed milliseconds since `since`.
    ///
    /// Any loop already running is stopped first, so at most one loop exists.
    /// Must be called from within a tokio runtime.
    pub fn start<F>(&mut self, since: EpochMillis, on_tick: F)
    where
        F: Fn(u64) + Send + 'static,
    {
        self.stop();

        let period = self.period;
        let time = self.time.clone();
        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                let elapsed = time.now().saturating_millis_since(since);
                trace!(elapsed_ms = elapsed, "Clock tick");
                on_tick(elapsed);
            }
        });

        debug!(%since, period_ms = period.as_millis() as u64, "Timer clock started");
        self.since = Some(since);
        self.task = Some(handle);
    }

    /// Stop the loop. Stopping an idle clock is a no-op.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!(since = ?self.since, "Timer clock stopped");
        }
        self.since = None;
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    /// Elapsed milliseconds right now, if running
    pub fn elapsed(&self) -> Option<u64> {
        self.since
            .map(|since| self.time.now().saturating_millis_since(since))
    }
}

impl Drop for TimerClock {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Wall-clock time that advances with the tokio clock.
///
/// Anchors an epoch timestamp to the runtime's `Instant`, so a paused test
/// runtime or simulation moves both together.
#[derive(Debug, Clone)]
pub struct RuntimeTime {
    base: EpochMillis,
    anchor: Instant,
}

impl RuntimeTime {
    pub fn new(base: EpochMillis) -> Self {
        Self {
            base,
            anchor: Instant::now(),
        }
    }
}

impl TimeSource for RuntimeTime {
    fn now(&self) -> EpochMillis {
        self.base + self.anchor.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const SECOND: Duration = Duration::from_secs(1);

    fn clock() -> TimerClock {
        let time = RuntimeTime::new(EpochMillis::from_millis(1_700_000_000_000));
        TimerClock::new(SECOND, Arc::new(time))
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_start_keeps_one_loop() {
        let mut clock = clock();
        let since = clock.time.now();
        let ticks = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let ticks = ticks.clone();
            clock.start(since, move |_| {
                ticks.fetch_add(1, Ordering::SeqCst);
            });
        }

        time::sleep(Duration::from_millis(5_500)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 5);
        assert!(clock.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_elapsed_is_wall_clock_delta() {
        let mut clock = clock();
        let since = clock.time.now();
        let last = Arc::new(Mutex::new(0u64));

        let sink = last.clone();
        clock.start(since, move |elapsed| {
            *sink.lock().unwrap() = elapsed;
        });

        time::sleep(Duration::from_millis(65_200)).await;
        assert_eq!(*last.lock().unwrap(), 65_000);
        assert_eq!(clock.elapsed(), Some(65_200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_in_the_past() {
        let mut clock = clock();
        let since = EpochMillis::from_millis(clock.time.now().as_millis() - 90_000);
        let last = Arc::new(Mutex::new(0u64));

        let sink = last.clone();
        clock.start(since, move |elapsed| {
            *sink.lock().unwrap() = elapsed;
        });

        time::sleep(Duration::from_millis(1_100)).await;
        assert_eq!(*last.lock().unwrap(), 91_000);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_halts_ticks() {
        let mut clock = clock();
        let since = clock.time.now();
        let ticks = Arc::new(AtomicUsize::new(0));

        let counter = ticks.clone();
        clock.start(since, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        time::sleep(Duration::from_millis(2_500)).await;
        clock.stop();
        time::sleep(Duration::from_secs(10)).await;

        assert_eq!(ticks.load(Ordering::SeqCst), 2);
        assert!(!clock.is_running());
        assert_eq!(clock.elapsed(), None);

        // Stopping twice is harmless
        clock.stop();
    }
}
