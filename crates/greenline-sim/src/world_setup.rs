//! Entity spawn factories.
//!
//! Each factory allocates a stable id, spawns the record into the hecs
//! world and registers it in the id index.

use glam::DVec2;
use hecs::{Component, Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use greenline_core::components::*;
use greenline_core::config::{AttackerStats, DefenderBehavior, DefenderStats, FieldConfig};
use greenline_core::enums::*;
use greenline_core::types::EntityId;

use crate::index::EntityIndex;
use crate::systems::attackers::column_at;

/// Spawn a freshly placed defender under a pre-allocated id.
///
/// Shooter timers start unset so the first shot is immediate; a generator's
/// timer starts now so its first orb comes one interval later.
pub fn spawn_defender(
    world: &mut World,
    index: &mut EntityIndex,
    id: EntityId,
    stats: &DefenderStats,
    row: usize,
    column: usize,
    now: f64,
) -> Entity {
    let last_action_secs = match stats.behavior {
        DefenderBehavior::Generator { .. } => Some(now),
        DefenderBehavior::Shooter { .. } | DefenderBehavior::Blocker => None,
    };
    let defender = Defender {
        id,
        kind: stats.kind,
        row,
        column,
        health: stats.health,
        max_health: stats.health,
        last_action_secs,
        kill_requested: false,
    };
    register(world, index, id, defender)
}

/// Spawn an attacker half a cell past the right edge of `row`.
pub fn spawn_attacker(
    world: &mut World,
    index: &mut EntityIndex,
    stats: &AttackerStats,
    row: usize,
    field: &FieldConfig,
) -> EntityId {
    let x = field.width() + 0.5 * field.cell_size;
    spawn_attacker_at(world, index, stats, row, x, field)
}

/// Spawn an attacker at an explicit horizontal position.
pub fn spawn_attacker_at(
    world: &mut World,
    index: &mut EntityIndex,
    stats: &AttackerStats,
    row: usize,
    x: f64,
    field: &FieldConfig,
) -> EntityId {
    let id = index.allocate();
    let attacker = Attacker {
        id,
        kind: stats.kind,
        row,
        x,
        column: column_at(x, field.cell_size, field.columns),
        health: stats.health,
        max_health: stats.health,
        speed: stats.speed,
        damage: stats.damage,
        state: AttackerState::Alive,
        kill_requested: false,
    };
    register(world, index, id, attacker);
    id
}

/// Spawn a projectile at the left edge of the shooter's cell.
pub fn spawn_projectile(
    world: &mut World,
    index: &mut EntityIndex,
    source: DefenderKind,
    row: usize,
    column: usize,
    cell_size: f64,
) -> EntityId {
    let id = index.allocate();
    let projectile = Projectile {
        id,
        source,
        row,
        x: (column as f64 - 0.5) * cell_size,
        kill_requested: false,
    };
    register(world, index, id, projectile);
    id
}

pub fn spawn_orb(
    world: &mut World,
    index: &mut EntityIndex,
    position: DVec2,
    target: DVec2,
    now: f64,
    motion: OrbMotion,
    value: u32,
) -> EntityId {
    let id = index.allocate();
    let orb = ResourceOrb {
        id,
        position,
        target,
        spawn_secs: now,
        motion,
        value,
    };
    register(world, index, id, orb);
    id
}

/// Spawn a record under an existing id. Returns `None` if the id is taken.
pub fn restore<C: Component>(
    world: &mut World,
    index: &mut EntityIndex,
    id: EntityId,
    component: C,
) -> Option<Entity> {
    if index.get(id).is_some() {
        return None;
    }
    Some(register(world, index, id, component))
}

/// Uniform draw from `[0, upper)`, or zero when the range is empty.
pub fn uniform(rng: &mut ChaCha8Rng, upper: f64) -> f64 {
    if upper > 0.0 {
        rng.gen_range(0.0..upper)
    } else {
        0.0
    }
}

fn register<C: Component>(
    world: &mut World,
    index: &mut EntityIndex,
    id: EntityId,
    component: C,
) -> Entity {
    let entity = world.spawn((component,));
    index.insert(id, entity);
    entity
}
