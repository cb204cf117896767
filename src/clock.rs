//! Wall-clock source injected into the scheduler

use chrono::{DateTime, FixedOffset, Local, Offset, TimeDelta, Utc};

/// Supplies "now" and the local calendar to the poll loop
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Offset whose hour boundaries `NextHour` wakes on
    fn utc_offset(&self, at: DateTime<Utc>) -> FixedOffset {
        at.with_timezone(&Local).offset().fix()
    }
}

/// Reads the system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock driven by tokio's timer, in UTC.
///
/// Starts at a fixed instant and advances with `tokio::time`, so it follows
/// paused test time exactly.
#[derive(Debug, Clone)]
pub struct TokioClock {
    start: DateTime<Utc>,
    origin: tokio::time::Instant,
}

impl TokioClock {
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            start,
            origin: tokio::time::Instant::now(),
        }
    }
}

impl Clock for TokioClock {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = TimeDelta::from_std(self.origin.elapsed()).unwrap_or_default();
        self.start + elapsed
    }

    fn utc_offset(&self, _at: DateTime<Utc>) -> FixedOffset {
        Utc.fix()
    }
}
