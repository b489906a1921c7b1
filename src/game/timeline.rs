//! Logical timeline for delayed session work
//!
//! Tasks are scheduled relative to the timeline's own clock, which only
//! moves when the owner pops due tasks or calls [`Timeline::advance_to`]. Dropping
//! the timeline drops every pending task with it.

use std::time::Duration;

/// Handle to a scheduled task, used to cancel it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

#[derive(Debug, Clone)]
struct Pending<T> {
    handle: TaskHandle,
    due: Duration,
    task: T,
}

#[derive(Debug, Clone)]
pub struct Timeline<T> {
    now: Duration,
    next_handle: u64,
    pending: Vec<Pending<T>>,
}

impl<T> Timeline<T> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_handle: 0,
            pending: Vec::new(),
        }
    }

    /// Current logical time
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Schedule `task` to become due `delay` from now
    pub fn schedule(&mut self, delay: Duration, task: T) -> TaskHandle {
        self.next_handle += 1;
        let handle = TaskHandle(self.next_handle);
        let due = self.now + delay;

        // Keep pending sorted by due time, ties in scheduling order
        let pos = self
            .pending
            .iter()
            .position(|p| p.due > due)
            .unwrap_or(self.pending.len());
        self.pending.insert(pos, Pending { handle, due, task });
        handle
    }

    /// Cancel a task; returns false if it already fired or was cancelled
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.handle != handle);
        self.pending.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    pub fn is_pending(&self, handle: TaskHandle) -> bool {
        self.pending.iter().any(|p| p.handle == handle)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Time until the next task is due, if any
    pub fn next_due_in(&self) -> Option<Duration> {
        self.pending.first().map(|p| p.due.saturating_sub(self.now))
    }

    /// Pop the earliest task due at or before `until`.
    ///
    /// The clock moves to that task's due time, so anything the owner
    /// schedules in reaction is timed from when the task fired. Call
    /// [`Timeline::advance_to`] once no more tasks are due.
    pub fn pop_due(&mut self, until: Duration) -> Option<(TaskHandle, T)> {
        if self.pending.first().is_some_and(|p| p.due <= until) {
            let next = self.pending.remove(0);
            self.now = self.now.max(next.due);
            Some((next.handle, next.task))
        } else {
            None
        }
    }

    /// Move the clock to `until`; it never moves backwards
    pub fn advance_to(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }
}

impl<T> Default for Timeline<T> {
    fn default() -> Self {
        Self::new()
    }
}
