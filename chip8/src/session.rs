use std::time::{Duration, Instant};

use anyhow::Result;
use log::error;

use chip8_core::{Chip8, Clock, TIMER_HZ};

/// How many times faster than normal the CPU runs while fast forwarding.
const FAST_FORWARD: u32 = 8;

/// Drives a `Chip8` against wall time for a frontend.
///
/// Instructions run off one clock and the timers off another, so changing the instruction rate
/// never changes how fast the delay and sound timers decay.
pub struct Session {
    pub chip8: Chip8,
    cpu_clock: Clock,
    timer_clock: Clock,
    pub fast_forward: bool,
    pub rewind: bool,
}

impl Session {
    pub fn new(chip8: Chip8, clock_hz: u32, now: Instant) -> Self {
        Session {
            chip8,
            cpu_clock: Clock::new(clock_hz, now),
            timer_clock: Clock::new(TIMER_HZ, now),
            fast_forward: false,
            rewind: false,
        }
    }

    /// Runs whatever instructions and timer ticks are due at `now`.
    ///
    /// Returns the number of 60Hz frames that elapsed. A CPU fault is logged along with a register
    /// dump and returned.
    pub fn advance(&mut self, now: Instant) -> Result<u32> {
        let mut steps = self.cpu_clock.due(now);
        if self.fast_forward {
            steps *= FAST_FORWARD;
        }
        for _ in 0..steps {
            if self.rewind {
                if !self.chip8.rewind() {
                    break;
                }
            } else if let Err(fault) = self.chip8.step() {
                error!("{}\n{}", fault, self.chip8);
                return Err(fault.into());
            }
        }

        let frames = self.timer_clock.due(now);
        if !self.rewind {
            for _ in 0..frames {
                self.chip8.tick_timers();
            }
        }
        Ok(frames)
    }

    /// How long the frontend can sleep before anything is due.
    pub fn idle_time(&self, now: Instant) -> Duration {
        if self.fast_forward {
            return Duration::from_millis(0);
        }
        self.cpu_clock
            .until_next(now)
            .min(self.timer_clock.until_next(now))
    }
}
