//! Difficulty progression.

use tracing::debug;

use greenline_core::config::Tuning;
use greenline_core::events::SimEvent;

use crate::session::Session;

/// Raise the difficulty by one once per interval, never past the maximum.
pub fn run(session: &mut Session, tuning: &Tuning, now: f64, events: &mut Vec<SimEvent>) {
    let since = now - session.bookmarks.last_difficulty_increase;
    if since < tuning.difficulty_increase_interval {
        return;
    }
    session.bookmarks.last_difficulty_increase = now;

    if session.difficulty < tuning.max_difficulty {
        session.difficulty += 1;
        debug!(difficulty = session.difficulty, "difficulty increased");
        events.push(SimEvent::DifficultyIncreased {
            difficulty: session.difficulty,
        });
    }
}
