//! Interceptor drone system: runs the drone FSM, moves drones, lands their
//! strikes and ages them out.

use std::collections::BTreeMap;

use glam::DVec2;
use hecs::{Entity, World};
use rand_chacha::ChaCha8Rng;

use skirmish_ai::interceptor::{evaluate, InterceptorContext};
use skirmish_ai::find_active;
use skirmish_core::components::Interceptor;
use skirmish_core::config::MitigationPolicy;
use skirmish_core::constants::*;
use skirmish_core::enums::DamageType;
use skirmish_core::types::{Bounds, Position, UnitId, Velocity};

use crate::combat::{take_damage, Strike};
use crate::ledger::BattleLedger;
use crate::systems::ai::combatants;

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
    let snapshot = combatants(world, units);

    let mut drones: Vec<(Entity, Interceptor, DVec2)> = world
        .query::<(&Interceptor, &Position)>()
        .iter()
        .filter(|(_, (drone, _))| !drone.destroyed)
        .map(|(entity, (drone, pos))| (entity, drone.clone(), pos.0))
        .collect();
    drones.sort_by_key(|(_, drone, _)| drone.id);

    let mut strikes = Vec::new();
    for (entity, drone, position) in drones {
        let update = evaluate(&InterceptorContext {
            state: drone.state,
            position,
            team: drone.team,
            target: drone.target,
            parent: find_active(&snapshot, drone.parent),
            orbit_angle: drone.orbit_angle,
            orphan_secs: drone.orphan_secs,
            timer_secs: drone.timer_secs,
            cooldown_secs: drone.cooldown_secs,
            attack_range: drone.attack_range,
            speed: INTERCEPTOR_SPEED,
            dt,
            units: &snapshot,
        });

        let Ok((live, pos, vel)) =
            world.query_one_mut::<(&mut Interceptor, &mut Position, &mut Velocity)>(entity)
        else {
            continue;
        };
        live.state = update.state;
        live.target = update.target;
        live.orbit_angle = update.orbit_angle;
        live.orphan_secs = update.orphan_secs;
        live.timer_secs = update.timer_secs;
        live.lifetime_secs -= dt;
        live.destroyed = update.expired || live.lifetime_secs <= 0.0;
        vel.0 = update.velocity;
        pos.0 = bounds.clamp(pos.0 + vel.0 * dt);

        if live.destroyed {
            continue;
        }
        if let Some(target) = update.fire_at {
            strikes.push(Strike {
                target,
                source: drone.parent,
                source_team: drone.team,
                raw_damage: drone.damage,
                armor_piercing: INTERCEPTOR_ARMOR_PIERCING,
                damage_type: DamageType::Drone,
                contact: None,
            });
        }
    }

    for strike in strikes {
        take_damage(world, units, ledger, rng, policy, battle_time, strike);
    }
}
