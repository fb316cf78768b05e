//! Time utilities for breakwatch
//!
//! Break start times are wall-clock timestamps shared between tabs and the
//! server, so everything here is expressed in milliseconds since the Unix
//! epoch. Elapsed time is always recomputed as `now - since`, never
//! accumulated from tick counts.
//!
//! # Mock Time for Development
//!
//! In debug builds, the `BREAKWATCH_MOCK_TIME` environment variable shifts the
//! system time used by [`SystemTime`]. Format: `YYYY-MM-DD HH:MM:SS`.
//!
//! ```bash
//! BREAKWATCH_MOCK_TIME="2025-12-25 14:30:00" breakwatch --tabs 2
//! ```

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

/// Environment variable name for mock time (debug builds only)
pub const MOCK_TIME_ENV_VAR: &str = "BREAKWATCH_MOCK_TIME";

static MOCK_TIME_OFFSET: OnceLock<Option<chrono::Duration>> = OnceLock::new();

fn get_mock_time_offset() -> Option<chrono::Duration> {
    *MOCK_TIME_OFFSET.get_or_init(|| {
        #[cfg(debug_assertions)]
        {
            if let Ok(mock_time_str) = std::env::var(MOCK_TIME_ENV_VAR) {
                if let Ok(naive_dt) =
                    NaiveDateTime::parse_from_str(&mock_time_str, "%Y-%m-%d %H:%M:%S")
                {
                    if let Some(mock_dt) = Local.from_local_datetime(&naive_dt).single() {
                        let offset = mock_dt.signed_duration_since(Local::now());
                        tracing::info!(
                            mock_time = %mock_time_str,
                            offset_secs = offset.num_seconds(),
                            "Mock time enabled"
                        );
                        return Some(offset);
                    }
                    tracing::warn!(
                        mock_time = %mock_time_str,
                        "Failed to convert mock time to local timezone"
                    );
                } else {
                    tracing::warn!(
                        mock_time = %mock_time_str,
                        expected_format = "%Y-%m-%d %H:%M:%S",
                        "Invalid mock time format"
                    );
                }
            }
            None
        }
        #[cfg(not(debug_assertions))]
        {
            None
        }
    })
}

/// Returns whether mock time is currently active.
pub fn is_mock_time_active() -> bool {
    get_mock_time_offset().is_some()
}

/// Get the current local time, respecting mock time settings in debug builds.
pub fn now() -> DateTime<Local> {
    let real_now = Local::now();
    match get_mock_time_offset() {
        Some(offset) => real_now + offset,
        None => real_now,
    }
}

/// A wall-clock timestamp in milliseconds since the Unix epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EpochMillis(i64);

impl EpochMillis {
    pub const fn from_millis(ms: i64) -> Self {
        Self(ms)
    }

    /// Convert the fractional epoch seconds used on the wire
    pub fn from_secs_f64(secs: f64) -> Self {
        Self((secs * 1000.0).round() as i64)
    }

    pub fn as_millis(&self) -> i64 {
        self.0
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.0 as f64 / 1000.0
    }

    /// Milliseconds from `since` to `self`, saturating at zero
    pub fn saturating_millis_since(&self, since: EpochMillis) -> u64 {
        self.0.saturating_sub(since.0).max(0) as u64
    }

    pub fn to_local(&self) -> Option<DateTime<Local>> {
        Utc.timestamp_millis_opt(self.0)
            .single()
            .map(|dt| dt.with_timezone(&Local))
    }
}

impl From<DateTime<Local>> for EpochMillis {
    fn from(dt: DateTime<Local>) -> Self {
        Self(dt.timestamp_millis())
    }
}

impl std::ops::Add<Duration> for EpochMillis {
    type Output = EpochMillis;

    fn add(self, rhs: Duration) -> Self::Output {
        EpochMillis(self.0 + rhs.as_millis() as i64)
    }
}

impl fmt::Display for EpochMillis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Source of wall-clock time for a tab
pub trait TimeSource: Send + Sync {
    fn now(&self) -> EpochMillis;
}

/// The system clock (honors `BREAKWATCH_MOCK_TIME` in debug builds)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTime;

impl TimeSource for SystemTime {
    fn now(&self) -> EpochMillis {
        EpochMillis::from(now())
    }
}

/// Manually advanced clock for tests and simulations.
///
/// Clones share the same underlying instant.
#[derive(Debug, Clone)]
pub struct ManualTime {
    millis: Arc<AtomicI64>,
}

impl ManualTime {
    pub fn new(start: EpochMillis) -> Self {
        Self {
            millis: Arc::new(AtomicI64::new(start.as_millis())),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.millis.fetch_add(by.as_millis() as i64, Ordering::SeqCst);
    }

    pub fn set(&self, to: EpochMillis) {
        self.millis.store(to.as_millis(), Ordering::SeqCst);
    }
}

impl TimeSource for ManualTime {
    fn now(&self) -> EpochMillis {
        EpochMillis(self.millis.load(Ordering::SeqCst))
    }
}

/// Format an elapsed duration in milliseconds as `HH:MM:SS`.
///
/// Hours are not capped at 24 and grow past two digits when needed.
pub fn format_elapsed(elapsed_ms: u64) -> String {
    let total_secs = elapsed_ms / 1000;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// Display text for a timer that is not running
pub const IDLE_DISPLAY: &str = "00:00:00";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(0), IDLE_DISPLAY);
        assert_eq!(format_elapsed(999), "00:00:00");
        assert_eq!(format_elapsed(65_000), "00:01:05");
        assert_eq!(format_elapsed(3_599_000), "00:59:59");
        assert_eq!(format_elapsed(3_661_000), "01:01:01");
    }

    #[test]
    fn test_format_elapsed_past_a_day() {
        assert_eq!(format_elapsed(90_061_000), "25:01:01");
        assert_eq!(format_elapsed(100 * 3_600_000), "100:00:00");
    }

    #[test]
    fn test_format_elapsed_monotonic() {
        let mut previous = String::from(IDLE_DISPLAY);
        for ms in (0..200_000u64).step_by(731) {
            let current = format_elapsed(ms);
            // Same-width strings compare lexicographically like the durations
            assert!(current >= previous, "{current} < {previous}");
            previous = current;
        }
    }

    #[test]
    fn test_epoch_millis_conversions() {
        let t = EpochMillis::from_secs_f64(1_700_000_000.5);
        assert_eq!(t.as_millis(), 1_700_000_000_500);
        assert_eq!(t.as_secs_f64(), 1_700_000_000.5);
        assert!(t.to_local().is_some());
    }

    #[test]
    fn test_saturating_millis_since() {
        let a = EpochMillis::from_millis(10_000);
        let b = EpochMillis::from_millis(4_000);
        assert_eq!(a.saturating_millis_since(b), 6_000);
        assert_eq!(b.saturating_millis_since(a), 0);
    }

    #[test]
    fn test_manual_time_shared_between_clones() {
        let time = ManualTime::new(EpochMillis::from_millis(1_000));
        let other = time.clone();
        time.advance(Duration::from_secs(2));
        assert_eq!(other.now(), EpochMillis::from_millis(3_000));

        other.set(EpochMillis::from_millis(50));
        assert_eq!(time.now().as_millis(), 50);
    }
}
