//! Attacker actions: eat the defender in the current cell, otherwise walk.

use hecs::{Entity, World};
use tracing::debug;

use greenline_core::components::{Attacker, Defender};
use greenline_core::config::Tuning;
use greenline_core::constants::SPEED_CELL_DIVISOR;
use greenline_core::enums::AttackerState;
use greenline_core::events::SimEvent;
use greenline_core::types::EntityId;

use crate::grid::FieldGrid;

/// Zero-based column under horizontal position `x`.
///
/// `None` while the attacker is still right of the field; otherwise the
/// one-based `ceil((x + cell/2) / cell)` clamped into `[1, columns]`.
pub fn column_at(x: f64, cell_size: f64, columns: usize) -> Option<usize> {
    let one_based = ((x + 0.5 * cell_size) / cell_size).ceil();
    if one_based > columns as f64 {
        None
    } else {
        Some(one_based.max(1.0) as usize - 1)
    }
}

/// Distance walked per tick at `speed`.
pub fn step_distance(speed: f64, tuning: &Tuning) -> f64 {
    speed * tuning.field.cell_size / SPEED_CELL_DIVISOR / tuning.fps as f64
}

pub fn run(world: &mut World, grid: &mut FieldGrid, tuning: &Tuning, events: &mut Vec<SimEvent>) {
    let mut walkers: Vec<(EntityId, Entity)> = world
        .query::<&Attacker>()
        .iter()
        .filter(|(_, a)| a.is_alive())
        .map(|(entity, a)| (a.id, entity))
        .collect();
    walkers.sort_by_key(|(id, _)| *id);

    let dt = tuning.dt();
    for (_, entity) in walkers {
        let Ok(mut attacker) = world.get::<&mut Attacker>(entity) else {
            continue;
        };

        let meal = attacker
            .column
            .and_then(|column| grid.defender_at(attacker.row, column));
        let Some(meal) = meal else {
            attacker.x -= step_distance(attacker.speed, tuning);
            attacker.column = column_at(attacker.x, tuning.field.cell_size, tuning.field.columns);
            continue;
        };

        let bite = attacker.damage * dt;
        drop(attacker);
        bite_defender(world, grid, meal, bite, events);
    }
}

/// Apply one tick of eating damage. A defender at zero health leaves the
/// grid at once so later attackers this tick walk on.
fn bite_defender(
    world: &mut World,
    grid: &mut FieldGrid,
    entity: Entity,
    bite: f64,
    events: &mut Vec<SimEvent>,
) {
    let Ok(mut defender) = world.get::<&mut Defender>(entity) else {
        return;
    };
    defender.health -= bite;
    if defender.health <= 0.0 && defender.request_kill() {
        grid.clear_if(defender.row, defender.column, entity);
        debug!(id = %defender.id, kind = ?defender.kind, "defender eaten");
        events.push(SimEvent::DefenderKilled {
            id: defender.id,
            kind: defender.kind,
            cell: defender.cell(),
        });
    }
}

/// Finish an attacker's grace period. Only a dying attacker is removed.
pub fn finish_dying(world: &mut World, entity: Entity, events: &mut Vec<SimEvent>) {
    let Ok(mut attacker) = world.get::<&mut Attacker>(entity) else {
        return;
    };
    if attacker.state != AttackerState::Dying {
        return;
    }
    attacker.state = AttackerState::Dead;
    debug!(id = %attacker.id, "attacker killed");
    events.push(SimEvent::AttackerKilled { id: attacker.id });
}
