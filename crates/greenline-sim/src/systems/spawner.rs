//! Attacker spawning: a per-tick Bernoulli roll at the difficulty's rate.

use hecs::World;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use greenline_core::config::Tuning;
use greenline_core::enums::AttackerKind;
use greenline_core::events::SimEvent;
use greenline_core::state::Bookmarks;

use crate::index::EntityIndex;
use crate::session::Session;
use crate::world_setup;

/// Chance of a spawn on any one tick.
///
/// Expected spawns per second are `difficulty * per_difficulty / interval`.
pub fn spawn_probability(difficulty: u32, tuning: &Tuning) -> f64 {
    let per_sec = difficulty as f64 * tuning.zombies_per_difficulty as f64
        / tuning.difficulty_increase_interval;
    (per_sec / tuning.fps as f64).clamp(0.0, 1.0)
}

/// Rows whose last spawn is at least the minimum delay ago.
pub fn eligible_rows(bookmarks: &Bookmarks, tuning: &Tuning, now: f64) -> Vec<usize> {
    (0..tuning.field.rows)
        .filter(|row| {
            bookmarks
                .last_zombie_spawn_by_row
                .get(row)
                .map_or(true, |&last| now - last >= tuning.zombie_spawn_min_delay)
        })
        .collect()
}

/// Roll for a spawn and place one attacker in a random eligible row.
pub fn run(
    world: &mut World,
    index: &mut EntityIndex,
    rng: &mut ChaCha8Rng,
    session: &mut Session,
    tuning: &Tuning,
    now: f64,
    events: &mut Vec<SimEvent>,
) {
    let probability = spawn_probability(session.difficulty, tuning);
    if probability <= 0.0 || !rng.gen_bool(probability) {
        return;
    }

    let rows = eligible_rows(&session.bookmarks, tuning, now);
    if rows.is_empty() {
        return;
    }
    let row = rows[rng.gen_range(0..rows.len())];
    let kind = AttackerKind::ALL[rng.gen_range(0..AttackerKind::ALL.len())];

    let id = world_setup::spawn_attacker(world, index, tuning.attacker(kind), row, &tuning.field);
    session.bookmarks.last_zombie_spawn = now;
    session.bookmarks.last_zombie_spawn_by_row.insert(row, now);

    debug!(%id, ?kind, row, "attacker spawned");
    events.push(SimEvent::AttackerSpawned { id, kind, row });
}
