//! Deferred follow-up actions scheduled onto the simulation thread.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::types::EntityId;

/// What a scheduled task does when it comes due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DeferredAction {
    /// Fire the next barrel of a multi-shot defender.
    FollowUpShot { defender: EntityId },
    /// Finish the death grace period of a dying attacker.
    RemoveAttacker { attacker: EntityId },
    /// Hide the transient notice.
    ClearNotice,
}

/// A deferred action due at a given tick.
///
/// Ordered by `(due_tick, seq)`; `seq` is the insertion order, so tasks due
/// on the same tick run first-in first-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledTask {
    pub due_tick: u64,
    pub seq: u64,
    pub action: DeferredAction,
}

impl Ord for ScheduledTask {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.due_tick, self.seq).cmp(&(other.due_tick, other.seq))
    }
}

impl PartialOrd for ScheduledTask {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
