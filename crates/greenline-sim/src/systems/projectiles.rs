//! Projectile flight and contact resolution.

use hecs::{Entity, World};
use tracing::debug;

use greenline_core::components::{Attacker, Projectile};
use greenline_core::config::{DefenderBehavior, Tuning};
use greenline_core::constants::DEATH_GRACE_SECS;
use greenline_core::enums::{AttackerState, DefenderKind};
use greenline_core::events::SimEvent;
use greenline_core::tasks::DeferredAction;
use greenline_core::types::{EntityId, SimTime};

use crate::scheduler::Scheduler;

/// A live attacker a projectile may hit.
struct Target {
    entity: Entity,
    row: usize,
    x: f64,
}

/// Speed and damage of a shot fired by `source`.
fn ballistics(tuning: &Tuning, source: DefenderKind) -> Option<(f64, f64)> {
    match tuning.defender(source).behavior {
        DefenderBehavior::Shooter {
            bullet_speed,
            bullet_damage,
            ..
        } => Some((bullet_speed, bullet_damage)),
        _ => None,
    }
}

pub fn run(
    world: &mut World,
    scheduler: &mut Scheduler,
    tuning: &Tuning,
    time: SimTime,
    events: &mut Vec<SimEvent>,
) {
    let mut targets: Vec<Target> = world
        .query::<&Attacker>()
        .iter()
        .filter(|(_, a)| a.is_alive())
        .map(|(entity, a)| Target {
            entity,
            row: a.row,
            x: a.x,
        })
        .collect();

    let mut shots: Vec<(EntityId, Entity)> = world
        .query::<&Projectile>()
        .iter()
        .filter(|(_, p)| !p.kill_requested)
        .map(|(entity, p)| (p.id, entity))
        .collect();
    shots.sort_by_key(|(id, _)| *id);

    let dt = tuning.dt();
    let exit_x = (tuning.field.columns + 1) as f64 * tuning.field.cell_size;

    for (id, entity) in shots {
        let Ok(mut projectile) = world.get::<&mut Projectile>(entity) else {
            continue;
        };
        let Some((speed, damage)) = ballistics(tuning, projectile.source) else {
            if projectile.request_kill() {
                events.push(SimEvent::ProjectileKilled { id });
            }
            continue;
        };

        let step = speed * dt;
        let from = projectile.x;
        projectile.x += step;

        if projectile.x > exit_x {
            if projectile.request_kill() {
                events.push(SimEvent::ProjectileKilled { id });
            }
            continue;
        }

        // Nearest attacker ahead of where the shot was at the start of the tick.
        let nearest = targets
            .iter()
            .enumerate()
            .filter(|(_, t)| t.row == projectile.row && t.x > from)
            .min_by(|(_, a), (_, b)| a.x.total_cmp(&b.x))
            .map(|(i, t)| (i, t.x));
        let Some((slot, target_x)) = nearest else {
            continue;
        };
        if target_x - projectile.x > 2.0 * step {
            continue;
        }

        if !projectile.request_kill() {
            continue;
        }
        drop(projectile);
        events.push(SimEvent::ProjectileKilled { id });

        if hit(world, scheduler, tuning, time, targets[slot].entity, damage, events) {
            targets.swap_remove(slot);
        }
    }
}

/// Apply `damage` to an attacker. Returns `true` if this hit was lethal.
fn hit(
    world: &mut World,
    scheduler: &mut Scheduler,
    tuning: &Tuning,
    time: SimTime,
    entity: Entity,
    damage: f64,
    events: &mut Vec<SimEvent>,
) -> bool {
    let Ok(mut attacker) = world.get::<&mut Attacker>(entity) else {
        return false;
    };
    attacker.health -= damage;
    if attacker.health > 0.0 || !attacker.request_kill() {
        return false;
    }

    attacker.state = AttackerState::Dying;
    scheduler.schedule(
        time.tick,
        DEATH_GRACE_SECS,
        tuning.fps,
        DeferredAction::RemoveAttacker {
            attacker: attacker.id,
        },
    );
    debug!(id = %attacker.id, "attacker dying");
    events.push(SimEvent::AttackerDying { id: attacker.id });
    true
}
