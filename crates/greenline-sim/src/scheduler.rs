//! Deferred follow-up actions, drained on the simulation thread.
//!
//! Short delayed effects (follow-up barrels, death grace periods, notice
//! timeouts) are posted here instead of running on their own timers. The
//! engine drains due tasks at the start of each running tick, so they only
//! ever touch session state from the tick loop and they freeze while the
//! session is paused.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use greenline_core::tasks::{DeferredAction, ScheduledTask};
use greenline_core::types::SimTime;

/// Min-heap of scheduled tasks keyed by `(due_tick, seq)`.
#[derive(Debug, Default)]
pub struct Scheduler {
    heap: BinaryHeap<Reverse<ScheduledTask>>,
    next_seq: u64,
}

impl Scheduler {
    /// Rebuild from a persisted task list.
    pub fn from_pending(tasks: impl IntoIterator<Item = ScheduledTask>) -> Self {
        let mut scheduler = Self::default();
        for task in tasks {
            scheduler.next_seq = scheduler.next_seq.max(task.seq + 1);
            scheduler.heap.push(Reverse(task));
        }
        scheduler
    }

    /// Post `action` to run `delay_secs` after `now_tick`.
    pub fn schedule(&mut self, now_tick: u64, delay_secs: f64, fps: u32, action: DeferredAction) {
        let due_tick = now_tick + SimTime::ticks_for(delay_secs, fps);
        self.push(due_tick, action);
    }

    /// Post `action` at an absolute tick.
    pub fn push(&mut self, due_tick: u64, action: DeferredAction) {
        let task = ScheduledTask {
            due_tick,
            seq: self.next_seq,
            action,
        };
        self.next_seq += 1;
        self.heap.push(Reverse(task));
    }

    /// Pop the earliest task due at or before `tick`.
    pub fn pop_due(&mut self, tick: u64) -> Option<ScheduledTask> {
        let due = self
            .heap
            .peek()
            .is_some_and(|Reverse(task)| task.due_tick <= tick);
        if due {
            self.heap.pop().map(|Reverse(task)| task)
        } else {
            None
        }
    }

    /// All pending tasks in execution order.
    pub fn pending(&self) -> Vec<ScheduledTask> {
        let mut tasks: Vec<ScheduledTask> = self.heap.iter().map(|Reverse(t)| *t).collect();
        tasks.sort();
        tasks
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
