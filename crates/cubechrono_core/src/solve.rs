use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scramble::Scramble;
use crate::stopwatch::{Stopwatch, StopwatchState, duration_to_millis};

/// Timed solve, in the shape stored by the timing-session API.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SolveTime {
    /// Solve duration in milliseconds.
    pub millis: u64,
    /// Time the solve was recorded, in milliseconds since the Unix epoch.
    pub recorded_at: u64,
    /// Scramble the solve was performed on.
    pub scramble: Scramble,
}
impl SolveTime {
    /// Records a solve that finished now.
    pub fn new(duration: Duration, scramble: Scramble) -> Self {
        Self::recorded_at(duration, scramble, Utc::now())
    }

    /// Records a solve that finished at `time`.
    pub fn recorded_at(duration: Duration, scramble: Scramble, time: DateTime<Utc>) -> Self {
        Self {
            millis: duration_to_millis(duration),
            // dates before 1970 are clamped
            recorded_at: u64::try_from(time.timestamp_millis()).unwrap_or(0),
            scramble,
        }
    }

    /// Records the time on a stopped stopwatch. Returns `None` if the
    /// stopwatch is idle or still running.
    pub fn from_stopwatch(stopwatch: &Stopwatch, scramble: Scramble) -> Option<Self> {
        match stopwatch.state() {
            StopwatchState::Stopped { elapsed } => Some(Self::new(elapsed, scramble)),
            StopwatchState::Idle | StopwatchState::Running { .. } => None,
        }
    }

    /// Returns the time the solve was recorded, or `None` if it is out of
    /// range.
    pub fn recorded_at_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(i64::try_from(self.recorded_at).ok()?)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::ScrambleKind;

    #[test]
    fn test_solve_time_json() {
        let scramble = Scramble::from_sequence(ScrambleKind::Three, "R U R' U'").unwrap();
        let time = DateTime::from_timestamp_millis(1_700_000_000_123).unwrap();
        let solve = SolveTime::recorded_at(Duration::from_millis(9_876), scramble, time);

        let json = serde_json::to_value(&solve).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "millis": 9876,
                "recorded_at": 1_700_000_000_123_u64,
                "scramble": { "kind": "Three", "sequence": "R U R' U'" },
            }),
        );
        assert_eq!(serde_json::from_value::<SolveTime>(json).unwrap(), solve);
        assert_eq!(solve.recorded_at_datetime(), Some(time));
    }

    #[test]
    fn test_solve_from_stopwatch() {
        let scramble = Scramble::from_sequence(ScrambleKind::Three, "F2").unwrap();
        let t0 = web_time::Instant::now();
        let mut sw = Stopwatch::new();
        assert_eq!(SolveTime::from_stopwatch(&sw, scramble.clone()), None);
        sw.start(t0);
        assert_eq!(SolveTime::from_stopwatch(&sw, scramble.clone()), None);
        sw.stop(t0 + Duration::from_millis(12_345));
        let solve = SolveTime::from_stopwatch(&sw, scramble.clone()).unwrap();
        assert_eq!(solve.millis, 12_345);
        assert_eq!(solve.scramble, scramble);
    }
}
