//! Cleanup system: removes entities whose removal has been decided.

use hecs::{Entity, World};

use greenline_core::components::{Attacker, Defender, Projectile};
use greenline_core::enums::AttackerState;
use greenline_core::types::EntityId;

use crate::grid::FieldGrid;
use crate::index::EntityIndex;

/// Despawn killed defenders and projectiles and dead attackers, dropping
/// them from every index in the same step.
/// Uses a pre-allocated buffer to avoid per-tick allocation.
pub fn run(
    world: &mut World,
    index: &mut EntityIndex,
    grid: &mut FieldGrid,
    despawn_buffer: &mut Vec<(EntityId, Entity)>,
) {
    despawn_buffer.clear();

    for (entity, defender) in world.query_mut::<&Defender>() {
        if defender.kill_requested {
            grid.clear_if(defender.row, defender.column, entity);
            despawn_buffer.push((defender.id, entity));
        }
    }

    for (entity, projectile) in world.query_mut::<&Projectile>() {
        if projectile.kill_requested {
            despawn_buffer.push((projectile.id, entity));
        }
    }

    for (entity, attacker) in world.query_mut::<&Attacker>() {
        if attacker.state == AttackerState::Dead {
            despawn_buffer.push((attacker.id, entity));
        }
    }

    for (id, entity) in despawn_buffer.drain(..) {
        index.remove(id);
        let _ = world.despawn(entity);
    }
}
