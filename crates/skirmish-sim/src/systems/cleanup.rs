//! Cleanup system: removes spent projectiles, downed interceptors and
//! finished hit effects at the end of a tick.

use hecs::{Entity, World};
use tracing::debug;

use skirmish_core::components::{HitEffect, Interceptor, Projectile};
use skirmish_core::events::BattleEvent;

use crate::ledger::BattleLedger;

/// Despawn everything marked dead this tick. Uses a pre-allocated buffer to
/// avoid per-tick allocation.
pub fn run(world: &mut World, despawn_buffer: &mut Vec<Entity>, ledger: &mut BattleLedger) {
    despawn_buffer.clear();

    for (entity, projectile) in world.query_mut::<&Projectile>() {
        if projectile.consumed {
            despawn_buffer.push(entity);
        }
    }

    let mut lost: Vec<_> = world
        .query_mut::<&Interceptor>()
        .into_iter()
        .filter(|(_, drone)| drone.destroyed)
        .map(|(entity, drone)| (drone.id, drone.parent, entity))
        .collect();
    lost.sort_by_key(|(id, _, _)| *id);
    for (interceptor, parent, entity) in lost {
        debug!(interceptor = interceptor.0, parent = %parent, "interceptor lost");
        ledger.push(BattleEvent::InterceptorLost {
            interceptor,
            parent,
        });
        despawn_buffer.push(entity);
    }

    for (entity, effect) in world.query_mut::<&HitEffect>() {
        if effect.remaining_secs <= 0.0 {
            despawn_buffer.push(entity);
        }
    }

    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }
}
