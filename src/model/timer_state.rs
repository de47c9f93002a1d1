use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde_with::serde_as;
use serde_with::TimestampMilliSeconds;

/// Elapsed-time bookkeeping for one attempt.
///
/// Elapsed time is never accumulated tick by tick. While running it is
/// recomputed from `start_time`, the wall-clock anchor; while stopped it is
/// frozen in `elapsed_time` and the anchor is cleared. Resuming re-anchors
/// at `now - elapsed_time`, so the value carries across the boundary.
#[serde_as]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TimerState {
    #[serde_as(as = "Option<TimestampMilliSeconds>")]
    pub start_time: Option<SystemTime>,
    pub elapsed_time: u64,
}

impl TimerState {
    pub fn started(now: SystemTime) -> TimerState {
        TimerState {
            start_time: Some(now),
            elapsed_time: 0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.start_time.is_some()
    }

    /// Whole seconds since the anchor; never less than what was already recorded.
    pub fn elapsed_at(&self, now: SystemTime) -> u64 {
        match self.start_time {
            Some(start) => {
                let measured = now
                    .duration_since(start)
                    .unwrap_or(Duration::default())
                    .as_secs();
                measured.max(self.elapsed_time)
            }
            None => self.elapsed_time,
        }
    }

    pub fn ticked(&self, now: SystemTime) -> TimerState {
        let mut new_state = *self;
        new_state.elapsed_time = self.elapsed_at(now);
        new_state
    }

    pub fn stopped(&self, now: SystemTime) -> TimerState {
        TimerState {
            start_time: None,
            elapsed_time: self.elapsed_at(now),
        }
    }

    pub fn resumed(&self, now: SystemTime) -> TimerState {
        let anchor = now
            .checked_sub(Duration::from_secs(self.elapsed_time))
            .unwrap_or(UNIX_EPOCH);
        TimerState {
            start_time: Some(anchor),
            elapsed_time: self.elapsed_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(1_700_000_000)
    }

    #[test]
    fn test_elapsed_is_floored_to_seconds() {
        let timer = TimerState::started(origin());
        assert_eq!(timer.elapsed_at(origin() + Duration::from_millis(999)), 0);
        assert_eq!(timer.elapsed_at(origin() + Duration::from_millis(5_700)), 5);
    }

    #[test]
    fn test_stop_and_resume_preserves_elapsed() {
        let timer = TimerState::started(origin());
        let stopped = timer.stopped(origin() + Duration::from_millis(12_400));
        assert_eq!(stopped.elapsed_time, 12);
        assert!(!stopped.is_running());

        // long pause
        let resume_at = origin() + Duration::from_secs(600);
        let resumed = stopped.resumed(resume_at);
        assert_eq!(resumed.elapsed_time, 12);
        assert_eq!(resumed.elapsed_at(resume_at), 12);
        assert_eq!(resumed.elapsed_at(resume_at + Duration::from_secs(3)), 15);
    }

    #[test]
    fn test_clock_going_backwards_does_not_reduce_elapsed() {
        let timer = TimerState::started(origin()).ticked(origin() + Duration::from_secs(8));
        assert_eq!(timer.elapsed_time, 8);

        let rewound = timer.ticked(origin() + Duration::from_secs(2));
        assert_eq!(rewound.elapsed_time, 8);
        let before_anchor = timer.ticked(origin() - Duration::from_secs(2));
        assert_eq!(before_anchor.elapsed_time, 8);
    }

    #[test]
    fn test_serializes_anchor_as_milliseconds() {
        let timer = TimerState::started(origin() + Duration::from_millis(250));
        let json = serde_json::to_value(timer).unwrap();
        assert_eq!(json["start_time"], 1_700_000_000_250i64);

        let restored: TimerState = serde_json::from_value(json).unwrap();
        assert_eq!(restored, timer);
    }
}
