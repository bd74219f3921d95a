//! Fundamental identifiers and simulation time.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier of a simulated entity.
///
/// Unlike hecs handles, ids survive save/restore and are never reused
/// within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Zero-based field cell address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub row: usize,
    pub column: usize,
}

impl Cell {
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

/// Simulation time tracking.
///
/// `elapsed_secs` is always derived from the tick counter so repeated
/// advancing never accumulates rounding drift.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimTime {
    /// Current tick number (increments by 1 each running tick).
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub elapsed_secs: f64,
}

impl SimTime {
    /// Time at the given tick for a tick rate of `fps`.
    pub fn at_tick(tick: u64, fps: u32) -> Self {
        Self {
            tick,
            elapsed_secs: tick as f64 / fps as f64,
        }
    }

    /// Advance by one tick.
    pub fn advance(&mut self, fps: u32) {
        *self = Self::at_tick(self.tick + 1, fps);
    }

    /// Number of whole ticks covering `delay_secs`, at least one.
    pub fn ticks_for(delay_secs: f64, fps: u32) -> u64 {
        ((delay_secs * fps as f64).round() as u64).max(1)
    }
}
