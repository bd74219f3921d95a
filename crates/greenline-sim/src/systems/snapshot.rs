//! Snapshot system: queries the world and builds a complete SessionSnapshot.
//!
//! This system is read-only. It never modifies the world.

use hecs::World;

use greenline_core::components::*;
use greenline_core::config::Tuning;
use greenline_core::events::SimEvent;
use greenline_core::state::*;
use greenline_core::types::SimTime;

use crate::session::Session;

/// Build a complete SessionSnapshot from the current world state.
pub fn build_snapshot(
    world: &World,
    session: &Session,
    tuning: &Tuning,
    time: &SimTime,
    events: Vec<SimEvent>,
) -> SessionSnapshot {
    SessionSnapshot {
        time: *time,
        phase: session.phase,
        location: session.location,
        score: session.score,
        difficulty: session.difficulty,
        sun_balance: session.sun_balance,
        defenders: build_defenders(world),
        attackers: build_attackers(world, tuning.field.cell_size),
        projectiles: build_projectiles(world),
        orbs: build_orbs(world, tuning.sun_pickup_timeout, time.elapsed_secs),
        notice: session.notice.clone(),
        events,
    }
}

fn build_defenders(world: &World) -> Vec<DefenderView> {
    let mut views: Vec<DefenderView> = world
        .query::<&Defender>()
        .iter()
        .map(|(_, d)| DefenderView {
            id: d.id,
            kind: d.kind,
            row: d.row,
            column: d.column,
            health: d.health,
            max_health: d.max_health,
        })
        .collect();

    views.sort_by_key(|v| v.id);
    views
}

fn build_attackers(world: &World, cell_size: f64) -> Vec<AttackerView> {
    let mut views: Vec<AttackerView> = world
        .query::<&Attacker>()
        .iter()
        .map(|(_, a)| AttackerView {
            id: a.id,
            kind: a.kind,
            row: a.row,
            x: a.x,
            y: a.y(cell_size),
            health: a.health,
            max_health: a.max_health,
            state: a.state,
        })
        .collect();

    views.sort_by_key(|v| v.id);
    views
}

fn build_projectiles(world: &World) -> Vec<ProjectileView> {
    let mut views: Vec<ProjectileView> = world
        .query::<&Projectile>()
        .iter()
        .map(|(_, p)| ProjectileView {
            id: p.id,
            source: p.source,
            row: p.row,
            x: p.x,
        })
        .collect();

    views.sort_by_key(|v| v.id);
    views
}

/// Orbs with the time left before they expire unpicked.
fn build_orbs(world: &World, timeout: f64, now: f64) -> Vec<OrbView> {
    let mut views: Vec<OrbView> = world
        .query::<&ResourceOrb>()
        .iter()
        .map(|(_, o)| OrbView {
            id: o.id,
            position: o.position,
            target: o.target,
            motion: o.motion,
            remaining_secs: (timeout - (now - o.spawn_secs)).max(0.0),
        })
        .collect();

    views.sort_by_key(|v| v.id);
    views
}
