use std::time::SystemTime;

pub type TaskId = u64;

#[derive(Debug)]
struct ScheduledTask<T> {
    id: TaskId,
    due: SystemTime,
    task: T,
}

/// Cancelable one-shot tasks ordered by due time.
///
/// Nothing runs on its own: the owner drains due tasks with [`Scheduler::take_due`]
/// from its event loop. Tasks due at the same instant come out in the order
/// they were scheduled.
#[derive(Debug)]
pub struct Scheduler<T> {
    tasks: Vec<ScheduledTask<T>>,
    next_id: TaskId,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            tasks: Vec::new(),
            next_id: 1,
        }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due: SystemTime, task: T) -> TaskId {
        let id = self.next_id;
        self.next_id += 1;
        self.tasks.push(ScheduledTask { id, due, task });
        id
    }

    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|scheduled| scheduled.id != id);
        self.tasks.len() != before
    }

    pub fn is_scheduled(&self, id: TaskId) -> bool {
        self.tasks.iter().any(|scheduled| scheduled.id == id)
    }

    pub fn next_due(&self) -> Option<SystemTime> {
        self.tasks.iter().map(|scheduled| scheduled.due).min()
    }

    /// Removes and returns the earliest task due at or before `now`.
    pub fn take_due(&mut self, now: SystemTime) -> Option<(TaskId, T)> {
        let position = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, scheduled)| scheduled.due <= now)
            .min_by_key(|(_, scheduled)| (scheduled.due, scheduled.id))
            .map(|(position, _)| position)?;
        let scheduled = self.tasks.remove(position);
        Some((scheduled.id, scheduled.task))
    }

    pub fn count_where<F>(&self, predicate: F) -> usize
    where
        F: Fn(&T) -> bool,
    {
        self.tasks
            .iter()
            .filter(|scheduled| predicate(&scheduled.task))
            .count()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }
}
