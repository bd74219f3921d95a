//! Top scores, kept next to the save slots.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use greenline_core::constants::LEADERBOARD_SIZE;

use crate::persistence::{self, PersistenceError};

pub const LEADERBOARD_FILE: &str = "leaderboard.json";

/// The highest positive final scores, best first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Leaderboard {
    scores: Vec<f64>,
}

impl Leaderboard {
    pub fn path(dir: &Path) -> PathBuf {
        dir.join(LEADERBOARD_FILE)
    }

    /// Load from `dir`. A missing file is an empty leaderboard.
    pub fn load(dir: &Path) -> Result<Self, PersistenceError> {
        let path = Self::path(dir);
        if !path.exists() {
            return Ok(Self::default());
        }
        let mut board: Self = persistence::read_json(&path)?;
        board.normalize();
        Ok(board)
    }

    pub fn save(&self, dir: &Path) -> Result<(), PersistenceError> {
        persistence::write_json(&Self::path(dir), self)
    }

    /// Offer a final score. Returns `true` if it made the board.
    pub fn record(&mut self, score: f64) -> bool {
        if !(score.is_finite() && score > 0.0) {
            debug!(score, "score not recorded");
            return false;
        }
        self.scores.push(score);
        self.normalize();
        let kept = self.scores.iter().any(|s| *s == score);
        if kept {
            info!(score, "score recorded");
        }
        kept
    }

    pub fn best(&self) -> Option<f64> {
        self.scores.first().copied()
    }

    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    fn normalize(&mut self) {
        self.scores.retain(|s| s.is_finite() && *s > 0.0);
        self.scores.sort_by(|a, b| b.total_cmp(a));
        self.scores.truncate(LEADERBOARD_SIZE);
    }
}
