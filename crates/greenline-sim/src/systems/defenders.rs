//! Defender actions: shooters fire at attackers in their row, generators
//! emit sun on their own clock, shields just stand there.

use glam::DVec2;
use hecs::{Entity, World};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use greenline_core::components::{Attacker, Defender};
use greenline_core::config::{DefenderBehavior, Tuning};
use greenline_core::constants::FOLLOW_UP_SHOT_DELAY_SECS;
use greenline_core::enums::{DefenderKind, OrbMotion};
use greenline_core::events::SimEvent;
use greenline_core::tasks::DeferredAction;
use greenline_core::types::{EntityId, SimTime};

use crate::index::EntityIndex;
use crate::scheduler::Scheduler;
use crate::world_setup;

/// Rightmost column holding a live attacker, per row. An attacker still
/// off the field counts as right of every column.
fn threat_reach(world: &World, rows: usize) -> Vec<Option<usize>> {
    let mut reach = vec![None; rows];
    for (_, attacker) in world.query::<&Attacker>().iter() {
        if !attacker.is_alive() || attacker.row >= rows {
            continue;
        }
        let column = attacker.column.unwrap_or(usize::MAX);
        let slot = &mut reach[attacker.row];
        *slot = Some(slot.map_or(column, |c: usize| c.max(column)));
    }
    reach
}

fn ready(last_action_secs: Option<f64>, delay: f64, now: f64) -> bool {
    last_action_secs.map_or(true, |last| now - last >= delay)
}

pub fn run(
    world: &mut World,
    index: &mut EntityIndex,
    rng: &mut ChaCha8Rng,
    scheduler: &mut Scheduler,
    tuning: &Tuning,
    time: SimTime,
    events: &mut Vec<SimEvent>,
) {
    let now = time.elapsed_secs;
    let reach = threat_reach(world, tuning.field.rows);

    let mut actors: Vec<(EntityId, Entity)> = world
        .query::<&Defender>()
        .iter()
        .filter(|(_, d)| !d.kill_requested)
        .map(|(entity, d)| (d.id, entity))
        .collect();
    actors.sort_by_key(|(id, _)| *id);

    for (id, entity) in actors {
        let (kind, row, column) = {
            let Ok(mut defender) = world.get::<&mut Defender>(entity) else {
                continue;
            };
            let fire = match tuning.defender(defender.kind).behavior {
                DefenderBehavior::Blocker => false,
                DefenderBehavior::Shooter { shoot_delay, .. } => {
                    let target_in_row = reach
                        .get(defender.row)
                        .copied()
                        .flatten()
                        .is_some_and(|c| c >= defender.column);
                    target_in_row && ready(defender.last_action_secs, shoot_delay, now)
                }
                DefenderBehavior::Generator { interval, .. } => {
                    ready(defender.last_action_secs, interval, now)
                }
            };
            if !fire {
                continue;
            }
            defender.last_action_secs = Some(now);
            (defender.kind, defender.row, defender.column)
        };

        match tuning.defender(kind).behavior {
            DefenderBehavior::Shooter { barrels, .. } => {
                shoot(world, index, tuning, id, kind, row, column, events);
                for barrel in 1..barrels {
                    scheduler.schedule(
                        time.tick,
                        FOLLOW_UP_SHOT_DELAY_SECS * barrel as f64,
                        tuning.fps,
                        DeferredAction::FollowUpShot { defender: id },
                    );
                }
            }
            DefenderBehavior::Generator {
                drop_range,
                sun_value,
                ..
            } => {
                events.push(SimEvent::GeneratorWantsToEmitSun { id });
                let cell = tuning.field.cell_size;
                let center = DVec2::new(
                    (column as f64 + 0.5) * cell,
                    (row as f64 + 0.5) * cell,
                );
                let offset = DVec2::new(
                    world_setup::uniform(rng, drop_range),
                    world_setup::uniform(rng, drop_range),
                );
                let position = center + offset;
                let orb = world_setup::spawn_orb(
                    world,
                    index,
                    position,
                    position,
                    now,
                    OrbMotion::Arc,
                    sun_value,
                );
                debug!(generator = %id, %orb, "sun emitted");
                events.push(SimEvent::OrbSpawned {
                    id: orb,
                    motion: OrbMotion::Arc,
                });
            }
            DefenderBehavior::Blocker => {}
        }
    }
}

/// Fire one projectile from a defender's cell.
#[allow(clippy::too_many_arguments)]
pub fn shoot(
    world: &mut World,
    index: &mut EntityIndex,
    tuning: &Tuning,
    id: EntityId,
    kind: DefenderKind,
    row: usize,
    column: usize,
    events: &mut Vec<SimEvent>,
) {
    let projectile =
        world_setup::spawn_projectile(world, index, kind, row, column, tuning.field.cell_size);
    events.push(SimEvent::DefenderWantsToShoot { id, kind });
    events.push(SimEvent::ProjectileSpawned {
        id: projectile,
        source: kind,
        row,
    });
}

/// Fire a delayed barrel for `defender` if it is still standing.
pub fn follow_up_shot(
    world: &mut World,
    index: &mut EntityIndex,
    tuning: &Tuning,
    defender: EntityId,
    events: &mut Vec<SimEvent>,
) {
    let Some(entity) = index.get(defender) else {
        return;
    };
    let shooter = match world.get::<&Defender>(entity) {
        Ok(d) if !d.kill_requested => Some((d.kind, d.row, d.column)),
        _ => None,
    };
    if let Some((kind, row, column)) = shooter {
        shoot(world, index, tuning, defender, kind, row, column, events);
    }
}
