//! Projectile system: homing, swept collision and expiry.
//!
//! Each projectile sweeps the segment it covers this tick. Enemy units are
//! tested first, then enemy interceptors, each in ascending id order; the
//! first contact consumes the projectile.

use std::collections::BTreeMap;

use glam::DVec2;
use hecs::{Entity, World};
use rand_chacha::ChaCha8Rng;

use skirmish_core::components::{Interceptor, Projectile};
use skirmish_core::config::MitigationPolicy;
use skirmish_core::constants::*;
use skirmish_core::enums::{ProjectileKind, Team};
use skirmish_core::types::{Bounds, InterceptorId, Position, UnitId, Velocity};
use skirmish_core::vector;

use crate::aiming;
use crate::combat::{spawn_hit_effect, take_damage, Strike};
use crate::ledger::BattleLedger;
use crate::systems::ai::combatants;

enum Contact {
    Unit(UnitId),
    Interceptor(Entity),
}

#[allow(clippy::too_many_arguments)]
pub fn run(
    world: &mut World,
    units: &BTreeMap<UnitId, Entity>,
    ledger: &mut BattleLedger,
    rng: &mut ChaCha8Rng,
    policy: &MitigationPolicy,
    bounds: &Bounds,
    battle_time: f64,
    dt: f64,
) {
    let mut targets = combatants(world, units);

    let mut drones: Vec<(InterceptorId, Entity, Team, DVec2)> = world
        .query::<(&Interceptor, &Position)>()
        .iter()
        .filter(|(_, (drone, _))| !drone.destroyed)
        .map(|(entity, (drone, pos))| (drone.id, entity, drone.team, pos.0))
        .collect();
    drones.sort_by_key(|(id, ..)| *id);

    let mut flights: Vec<(Entity, Projectile, DVec2, DVec2)> = world
        .query::<(&Projectile, &Position, &Velocity)>()
        .iter()
        .filter(|(_, (shot, _, _))| !shot.consumed)
        .map(|(entity, (shot, pos, vel))| (entity, shot.clone(), pos.0, vel.0))
        .collect();
    flights.sort_by_key(|(_, shot, _, _)| shot.id);

    for (entity, shot, from, mut velocity) in flights {
        if shot.kind == ProjectileKind::Missile {
            if let Some(target) = shot
                .target
                .and_then(|id| targets.iter().find(|c| c.id == id && c.active))
            {
                velocity = aiming::home(velocity, from, target.position, dt);
            }
        }
        let to = from + velocity * dt;

        let unit_hit = targets
            .iter()
            .filter(|c| c.is_enemy_of(shot.source_team) && c.id != shot.source)
            .find(|c| {
                vector::segment_point_distance(from, to, c.position) <= c.radius + PROJECTILE_RADIUS
            })
            .map(|c| Contact::Unit(c.id));
        let contact = unit_hit.or_else(|| {
            drones
                .iter()
                .filter(|(_, _, team, _)| *team != shot.source_team)
                .find(|(_, _, _, pos)| {
                    vector::segment_point_distance(from, to, *pos)
                        <= INTERCEPTOR_RADIUS + PROJECTILE_RADIUS
                })
                .map(|(_, drone, _, _)| Contact::Interceptor(*drone))
        });

        let lifetime = shot.lifetime_secs - dt;
        let mut consumed = lifetime <= 0.0 || !bounds.contains(to);

        match contact {
            Some(Contact::Unit(target)) => {
                consumed = true;
                let result = take_damage(
                    world,
                    units,
                    ledger,
                    rng,
                    policy,
                    battle_time,
                    Strike {
                        target,
                        source: shot.source,
                        source_team: shot.source_team,
                        raw_damage: shot.damage,
                        armor_piercing: shot.armor_piercing,
                        damage_type: shot.kind.damage_type(),
                        contact: Some(to),
                    },
                );
                if result.is_some_and(|r| r.killed) {
                    if let Some(fallen) = targets.iter_mut().find(|c| c.id == target) {
                        fallen.active = false;
                    }
                }
            }
            Some(Contact::Interceptor(drone)) => {
                consumed = true;
                if let Ok(mut hit) = world.get::<&mut Interceptor>(drone) {
                    hit.destroyed = true;
                }
                spawn_hit_effect(world, rng, to, shot.kind.damage_type());
                drones.retain(|(_, e, _, _)| *e != drone);
            }
            None => {}
        }

        if let Ok((projectile, pos, vel)) =
            world.query_one_mut::<(&mut Projectile, &mut Position, &mut Velocity)>(entity)
        {
            projectile.lifetime_secs = lifetime;
            projectile.consumed = consumed;
            pos.0 = to;
            vel.0 = velocity;
        }
    }
}
