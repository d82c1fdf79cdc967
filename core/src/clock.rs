use std::time::Duration;

use serde::{Deserialize, Serialize};
use web_time::Instant;

/// Highest value the 3-digit clock can show.
pub const CLOCK_CEILING: u16 = 999;

/// Interval of the game clock.
pub const CLOCK_INTERVAL: Duration = Duration::from_secs(1);

/// Whole seconds spent on a game, advanced by an external one-second tick.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameClock {
    elapsed: u16,
    started: bool,
    frozen: bool,
}

impl GameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms the clock, later calls in the same game are ignored.
    pub fn start(&mut self) {
        if !self.started {
            log::debug!("Clock started");
            self.started = true;
        }
    }

    /// Stops the clock for good, the current value is the game's time.
    pub fn freeze(&mut self) {
        if self.started && !self.frozen {
            log::debug!("Clock frozen at {}s", self.elapsed);
        }
        self.frozen = true;
    }

    pub fn is_running(&self) -> bool {
        self.started && !self.frozen
    }

    /// Adds one second while running and below the ceiling.
    pub fn tick(&mut self) {
        if self.is_running() && self.elapsed < CLOCK_CEILING {
            self.elapsed += 1;
        }
    }

    pub fn elapsed(&self) -> u16 {
        self.elapsed
    }
}

/// Converts wall-clock readings into a number of elapsed fixed intervals.
///
/// Front ends call [`Ticker::due`] from whatever loop they have; fractional intervals carry over to
/// the next call so no time is lost.
#[derive(Copy, Clone, Debug)]
pub struct Ticker {
    interval: Duration,
    last: Instant,
}

impl Ticker {
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            last: now,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Restarts counting from `now`, dropping any partial interval.
    pub fn reset(&mut self, now: Instant) {
        self.last = now;
    }

    /// Number of whole intervals since the previous call.
    pub fn due(&mut self, now: Instant) -> u32 {
        let elapsed = now.saturating_duration_since(self.last);
        let ticks = elapsed.as_nanos() / self.interval.as_nanos();
        let ticks = u32::try_from(ticks).unwrap_or(u32::MAX);
        self.last += self.interval * ticks;
        ticks
    }
}
