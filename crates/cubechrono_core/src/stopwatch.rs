//! Solve timer.
//!
//! The stopwatch never reads the clock itself; every transition takes the
//! current [`Instant`] so that callers (and tests) control time.

use std::fmt;
use std::time::Duration;

use web_time::Instant;

/// State of a [`Stopwatch`].
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum StopwatchState {
    /// Not started, or reset.
    #[default]
    Idle,
    /// Counting up since `started`.
    Running {
        /// Time when the stopwatch was started.
        started: Instant,
    },
    /// Stopped after running for `elapsed`.
    Stopped {
        /// Total time between start and stop.
        elapsed: Duration,
    },
}

/// Stopwatch with explicit start, stop, and reset transitions.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Stopwatch {
    state: StopwatchState,
}
impl Stopwatch {
    /// Constructs an idle stopwatch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current state.
    pub fn state(&self) -> StopwatchState {
        self.state
    }

    /// Returns whether the stopwatch is running.
    pub fn is_running(&self) -> bool {
        matches!(self.state, StopwatchState::Running { .. })
    }

    /// Starts the stopwatch from zero. Returns `false` and does nothing if it
    /// is already running.
    pub fn start(&mut self, now: Instant) -> bool {
        if self.is_running() {
            return false;
        }
        self.state = StopwatchState::Running { started: now };
        true
    }

    /// Stops the stopwatch and returns the elapsed time, or `None` if it was
    /// not running.
    pub fn stop(&mut self, now: Instant) -> Option<Duration> {
        let StopwatchState::Running { started } = self.state else {
            return None;
        };
        let elapsed = now.saturating_duration_since(started);
        self.state = StopwatchState::Stopped { elapsed };
        Some(elapsed)
    }

    /// Resets the stopwatch to idle from any state.
    pub fn reset(&mut self) {
        self.state = StopwatchState::Idle;
    }

    /// Returns the time to display at `now`.
    pub fn elapsed(&self, now: Instant) -> Duration {
        match self.state {
            StopwatchState::Idle => Duration::ZERO,
            StopwatchState::Running { started } => now.saturating_duration_since(started),
            StopwatchState::Stopped { elapsed } => elapsed,
        }
    }

    /// Returns the display for the time at `now`.
    pub fn display(&self, now: Instant) -> TimeDisplay {
        TimeDisplay::from_duration(self.elapsed(now))
    }
}

/// Elapsed time split into display fields, shown as `HH:MM:SS.mmm`.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct TimeDisplay {
    /// Whole hours. Not wrapped.
    pub hours: u64,
    /// Minutes in `0..60`.
    pub minutes: u64,
    /// Seconds in `0..60`.
    pub seconds: u64,
    /// Milliseconds in `0..1000`.
    pub millis: u64,
}
impl TimeDisplay {
    /// Splits a number of milliseconds into display fields.
    pub fn from_millis(ms: u64) -> Self {
        Self {
            hours: ms / 3_600_000,
            minutes: ms % 3_600_000 / 60_000,
            seconds: ms % 60_000 / 1000,
            millis: ms % 1000,
        }
    }

    /// Splits a duration into display fields, truncating to milliseconds.
    pub fn from_duration(duration: Duration) -> Self {
        Self::from_millis(duration_to_millis(duration))
    }
}
impl fmt::Display for TimeDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            hours,
            minutes,
            seconds,
            millis,
        } = self;
        write!(f, "{hours:02}:{minutes:02}:{seconds:02}.{millis:03}")
    }
}

/// Converts a duration to whole milliseconds, saturating at `u64::MAX`.
pub fn duration_to_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_stopwatch_transitions() {
        let t0 = Instant::now();
        let secs = |s: u64| t0 + Duration::from_secs(s);

        let mut sw = Stopwatch::new();
        assert_eq!(sw.state(), StopwatchState::Idle);
        assert_eq!(sw.stop(secs(1)), None);
        assert_eq!(sw.state(), StopwatchState::Idle);

        assert!(sw.start(secs(2)));
        assert_eq!(sw.elapsed(secs(5)), Duration::from_secs(3));
        assert!(!sw.start(secs(4)), "start while running is ignored");
        assert_eq!(sw.elapsed(secs(5)), Duration::from_secs(3));

        assert_eq!(sw.stop(secs(7)), Some(Duration::from_secs(5)));
        assert_eq!(sw.elapsed(secs(100)), Duration::from_secs(5));
        assert_eq!(sw.stop(secs(8)), None);

        // restarting from stopped counts from zero again
        assert!(sw.start(secs(10)));
        assert_eq!(sw.elapsed(secs(11)), Duration::from_secs(1));

        sw.reset();
        assert_eq!(sw.state(), StopwatchState::Idle);
        assert_eq!(sw.display(secs(20)).to_string(), "00:00:00.000");
    }

    #[test]
    fn test_time_display() {
        assert_eq!(TimeDisplay::from_millis(0).to_string(), "00:00:00.000");
        assert_eq!(TimeDisplay::from_millis(12_345).to_string(), "00:00:12.345");
        assert_eq!(
            TimeDisplay::from_millis(3_723_004),
            TimeDisplay {
                hours: 1,
                minutes: 2,
                seconds: 3,
                millis: 4,
            },
        );
        assert_eq!(
            TimeDisplay::from_millis(100 * 3_600_000 + 59_999).to_string(),
            "100:00:59.999",
        );
    }

    #[test]
    fn test_display_truncates_to_millis() {
        let d = Duration::from_micros(1_999);
        assert_eq!(TimeDisplay::from_duration(d).millis, 1);
    }
}
