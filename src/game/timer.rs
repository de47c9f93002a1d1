use log::trace;
use std::time::{Duration, SystemTime};

use super::scheduler::{Scheduler, TaskId};

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Owns the one periodic tick task of a running attempt.
///
/// The tick only signals "recompute now"; elapsed time itself lives in
/// `TimerState` and is derived from its anchor.
#[derive(Debug)]
pub struct Timer {
    interval: Duration,
    tick_task: Option<TaskId>,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_INTERVAL)
    }
}

impl Timer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            tick_task: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.tick_task.is_some()
    }

    /// Starts ticking, replacing any tick task already scheduled.
    pub fn start<T>(&mut self, scheduler: &mut Scheduler<T>, now: SystemTime, tick: T) {
        self.stop(scheduler);
        self.tick_task = Some(scheduler.schedule(now + self.interval, tick));
        trace!(target: "timer", "Timer started; next tick in {:?}", self.interval);
    }

    pub fn stop<T>(&mut self, scheduler: &mut Scheduler<T>) {
        if let Some(task_id) = self.tick_task.take() {
            scheduler.cancel(task_id);
            trace!(target: "timer", "Timer stopped");
        }
    }

    /// Forgets the tick task without touching the scheduler (after it was cleared).
    pub fn reset(&mut self) {
        self.tick_task = None;
    }

    /// Accepts a fired tick and schedules the next one. Returns false for a
    /// tick that no longer belongs to this timer.
    pub fn on_tick<T>(
        &mut self,
        task_id: TaskId,
        scheduler: &mut Scheduler<T>,
        now: SystemTime,
        tick: T,
    ) -> bool {
        if self.tick_task != Some(task_id) {
            trace!(target: "timer", "Ignoring stale tick {}", task_id);
            return false;
        }
        self.tick_task = Some(scheduler.schedule(now + self.interval, tick));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::UNIX_EPOCH;

    #[test]
    fn test_restart_keeps_a_single_tick_task() {
        let mut scheduler = Scheduler::new();
        let mut timer = Timer::default();
        let now = UNIX_EPOCH + Duration::from_secs(100);

        timer.start(&mut scheduler, now, ());
        timer.start(&mut scheduler, now, ());
        timer.start(&mut scheduler, now, ());
        assert_eq!(scheduler.len(), 1);

        timer.stop(&mut scheduler);
        assert!(scheduler.is_empty());
        assert!(!timer.is_running());
    }

    #[test]
    fn test_tick_reschedules_itself() {
        let mut scheduler = Scheduler::new();
        let mut timer = Timer::new(Duration::from_secs(1));
        let now = UNIX_EPOCH + Duration::from_secs(100);
        timer.start(&mut scheduler, now, ());

        let (task_id, ()) = scheduler.take_due(now + Duration::from_secs(1)).unwrap();
        assert!(timer.on_tick(task_id, &mut scheduler, now + Duration::from_secs(1), ()));
        assert_eq!(scheduler.next_due(), Some(now + Duration::from_secs(2)));

        // the consumed id is stale now
        assert!(!timer.on_tick(task_id, &mut scheduler, now, ()));
        assert_eq!(scheduler.len(), 1);
    }
}
