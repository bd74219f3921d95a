//! Sun economy: sky drops on a fixed interval and orb expiry.

use glam::DVec2;
use hecs::{Entity, World};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use greenline_core::components::ResourceOrb;
use greenline_core::config::Tuning;
use greenline_core::constants::*;
use greenline_core::enums::OrbMotion;
use greenline_core::events::SimEvent;
use greenline_core::types::EntityId;

use crate::index::EntityIndex;
use crate::session::Session;
use crate::world_setup;

pub fn run(
    world: &mut World,
    index: &mut EntityIndex,
    rng: &mut ChaCha8Rng,
    session: &mut Session,
    tuning: &Tuning,
    now: f64,
    events: &mut Vec<SimEvent>,
) {
    if now - session.bookmarks.last_sun_fall >= tuning.sun_fall_interval {
        session.bookmarks.last_sun_fall = now;
        drop_from_sky(world, index, rng, tuning, now, events);
    }
    expire(world, index, tuning, now, events);
}

/// Drop an orb at a random column; it falls from the top edge to a random
/// resting height.
fn drop_from_sky(
    world: &mut World,
    index: &mut EntityIndex,
    rng: &mut ChaCha8Rng,
    tuning: &Tuning,
    now: f64,
    events: &mut Vec<SimEvent>,
) {
    let field = &tuning.field;
    let x = world_setup::uniform(rng, field.width() - SKY_ORB_RIGHT_MARGIN);
    let rest_y = SKY_ORB_MIN_TARGET_Y
        + world_setup::uniform(rng, field.height() - SKY_ORB_TARGET_Y_MARGIN);

    let id = world_setup::spawn_orb(
        world,
        index,
        DVec2::new(x, 0.0),
        DVec2::new(x, rest_y),
        now,
        OrbMotion::Fall,
        tuning.sun_value,
    );
    debug!(%id, x, "sun falling");
    events.push(SimEvent::OrbSpawned {
        id,
        motion: OrbMotion::Fall,
    });
}

/// Remove every orb older than the pickup timeout.
fn expire(
    world: &mut World,
    index: &mut EntityIndex,
    tuning: &Tuning,
    now: f64,
    events: &mut Vec<SimEvent>,
) {
    let mut stale: Vec<(EntityId, Entity)> = world
        .query::<&ResourceOrb>()
        .iter()
        .filter(|(_, orb)| now - orb.spawn_secs > tuning.sun_pickup_timeout)
        .map(|(entity, orb)| (orb.id, entity))
        .collect();
    stale.sort_by_key(|(id, _)| *id);

    for (id, entity) in stale {
        index.remove(id);
        let _ = world.despawn(entity);
        events.push(SimEvent::OrbExpired { id });
    }
}
