use std::time::{Duration, Instant};

/// # Clock
/// Paces a periodic action against wall time.
///
/// The run loop asks how many periods have elapsed since it last checked and performs the action
/// that many times, so the instruction rate and the 60Hz timer rate stay independent of each other
/// and of how long each loop iteration takes. After a long stall (e.g. the window being dragged)
/// at most a tenth of a second of work is caught up; the rest is dropped.
#[derive(Debug, Clone)]
pub struct Clock {
    period: Duration,
    last: Instant,
    max_burst: u32,
}

impl Clock {
    /// A clock ticking `hz` times a second, starting at `now`.
    ///
    /// `hz` is clamped to at least 1, and the period never drops below a nanosecond.
    pub fn new(hz: u32, now: Instant) -> Self {
        let hz = hz.max(1);
        Clock {
            period: Duration::from_nanos((1_000_000_000 / u64::from(hz)).max(1)),
            last: now,
            max_burst: (hz / 10).max(1),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Number of whole periods elapsed since the last call. Partial periods carry over.
    pub fn due(&mut self, now: Instant) -> u32 {
        let elapsed = now.saturating_duration_since(self.last);
        let ticks = elapsed.as_nanos() / self.period.as_nanos();
        if ticks == 0 {
            return 0;
        }
        if ticks > u128::from(self.max_burst) {
            self.last = now;
            return self.max_burst;
        }
        let ticks = ticks as u32;
        self.last += self.period * ticks;
        ticks
    }

    /// How long until the next period is due.
    pub fn until_next(&self, now: Instant) -> Duration {
        (self.last + self.period).saturating_duration_since(now)
    }
}
