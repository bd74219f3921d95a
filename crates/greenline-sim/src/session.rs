//! Session counters: everything about a session except its entities.

use greenline_core::config::Tuning;
use greenline_core::enums::{Location, SessionPhase};
use greenline_core::events::Notice;
use greenline_core::state::Bookmarks;

/// Scalar session state mutated by the systems.
///
/// Entities live in the hecs world; this holds the counters and timing
/// bookmarks that sit next to them.
#[derive(Debug, Clone)]
pub struct Session {
    pub phase: SessionPhase,
    pub location: Location,
    pub score: f64,
    pub difficulty: u32,
    pub sun_balance: u32,
    pub bookmarks: Bookmarks,
    /// Best score on record when the session began, if any.
    pub best_score: Option<f64>,
    /// Whether the running score has already passed `best_score`.
    pub best_announced: bool,
    pub notice: Option<Notice>,
}

impl Session {
    /// A fresh session in `Created`: no bookmarks, initial balance.
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            phase: SessionPhase::Created,
            location: Location::default(),
            score: 0.0,
            difficulty: tuning.initial_difficulty,
            sun_balance: tuning.initial_sun_balance,
            bookmarks: Bookmarks::default(),
            best_score: None,
            best_announced: false,
            notice: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase == SessionPhase::Running
    }

    pub fn can_afford(&self, cost: u32) -> bool {
        self.sun_balance >= cost
    }

    /// Debit `cost` if affordable. The balance never goes negative.
    pub fn try_debit(&mut self, cost: u32) -> bool {
        match self.sun_balance.checked_sub(cost) {
            Some(rest) => {
                self.sun_balance = rest;
                true
            }
            None => false,
        }
    }

    pub fn credit(&mut self, value: u32) {
        self.sun_balance = self.sun_balance.saturating_add(value);
    }
}

/// Clamp a requested difficulty into the configured range.
pub fn clamp_difficulty(requested: u32, tuning: &Tuning) -> u32 {
    requested.clamp(tuning.initial_difficulty, tuning.max_difficulty)
}
