//! Virtual-time task scheduler
//!
//! Widgets never block: they queue work for the next animation frame,
//! arm one-shot timers (transition fallbacks, autohide, hover delays,
//! carousel cycling) and let the host drive time forward. The clock is
//! virtual, so a host maps it onto its own frame loop and tests advance it
//! deterministically.
//!
//! # Ordering
//!
//! - Frame tasks run in the order they were requested. Tasks requested while
//!   a frame is being flushed belong to the following frame.
//! - Timers fire in deadline order; equal deadlines fire in scheduling order.
//!
//! # Example
//!
//! ```ignore
//! let mut scheduler = Scheduler::new();
//! let id = scheduler.schedule(300, Task::Fallback);
//! scheduler.request_frame(Task::Reveal);
//!
//! for task in scheduler.take_frame() { run(task); }
//! while let Some((_, task)) = scheduler.pop_due(scheduler.now() + 300) { run(task); }
//! ```

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Handle to a pending timer
    pub struct TimerId;
}

struct Timer<T> {
    due: u64,
    seq: u64,
    task: T,
}

/// Frame queue plus timer wheel over a virtual millisecond clock
pub struct Scheduler<T> {
    now: u64,
    seq: u64,
    timers: SlotMap<TimerId, Timer<T>>,
    frames: Vec<T>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            now: 0,
            seq: 0,
            timers: SlotMap::with_key(),
            frames: Vec::new(),
        }
    }
}

impl<T> std::fmt::Debug for Scheduler<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("now", &self.now)
            .field("timers", &self.timers.len())
            .field("frames", &self.frames.len())
            .finish()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time in milliseconds
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Run `task` once `delay_ms` has elapsed
    pub fn schedule(&mut self, delay_ms: u64, task: T) -> TimerId {
        self.seq += 1;
        let id = self.timers.insert(Timer {
            due: self.now.saturating_add(delay_ms),
            seq: self.seq,
            task,
        });
        tracing::trace!("timer {:?} armed for +{}ms", id, delay_ms);
        id
    }

    /// Disarm a timer, returning its task if it had not fired yet
    pub fn cancel(&mut self, id: TimerId) -> Option<T> {
        self.timers.remove(id).map(|t| t.task)
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.timers.contains_key(id)
    }

    /// Milliseconds until `id` fires
    pub fn remaining(&self, id: TimerId) -> Option<u64> {
        self.timers.get(id).map(|t| t.due.saturating_sub(self.now))
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Queue `task` for the next animation frame
    pub fn request_frame(&mut self, task: T) {
        self.frames.push(task);
    }

    pub fn has_frames(&self) -> bool {
        !self.frames.is_empty()
    }

    /// Take the tasks of the current frame
    pub fn take_frame(&mut self) -> Vec<T> {
        std::mem::take(&mut self.frames)
    }

    /// Remove and return the earliest timer due at or before `until`,
    /// moving the clock to its deadline
    pub fn pop_due(&mut self, until: u64) -> Option<(TimerId, T)> {
        let (id, due) = self
            .timers
            .iter()
            .filter(|(_, t)| t.due <= until)
            .min_by_key(|(_, t)| (t.due, t.seq))
            .map(|(id, t)| (id, t.due))?;
        let timer = self.timers.remove(id)?;
        self.now = self.now.max(due);
        Some((id, timer.task))
    }

    /// Move the clock forward without firing anything
    pub fn set_now(&mut self, now: u64) {
        self.now = self.now.max(now);
    }

    /// Keep only the pending timers and frame tasks for which `keep` holds
    pub fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) {
        self.timers.retain(|_, t| keep(&t.task));
        self.frames.retain(|t| keep(t));
    }
}
