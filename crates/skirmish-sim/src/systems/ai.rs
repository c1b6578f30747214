//! Unit AI system: targeting, steering and attack intents.
//!
//! Decisions are made from one start-of-tick snapshot so unit order does not
//! matter. Attacks are only returned as intents; the engine executes them.

use std::collections::BTreeMap;

use hecs::{Entity, World};

use skirmish_ai::steering::{steer, SteeringContext};
use skirmish_ai::targeting::{enemy_centroid, needs_retarget, select_target};
use skirmish_ai::{find_active, Combatant};
use skirmish_core::components::*;
use skirmish_core::config::AiConfig;
use skirmish_core::enums::MoraleState;
use skirmish_core::types::{Position, UnitId, Velocity};

/// A unit that wants to strike its target this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackIntent {
    pub attacker: UnitId,
    pub target: UnitId,
}

/// How the AI sees one unit.
pub fn combatant(world: &World, id: UnitId, entity: Entity) -> Option<Combatant> {
    let info = world.get::<&UnitInfo>(entity).ok()?;
    let pos = world.get::<&Position>(entity).ok()?;
    let vel = world.get::<&Velocity>(entity).ok()?;
    let vitals = world.get::<&Vitals>(entity).ok()?;
    let weapon = world.get::<&Weapon>(entity).ok()?;

    let health_fraction = if vitals.max_health > 0.0 {
        vitals.health / vitals.max_health
    } else {
        0.0
    };
    Some(Combatant {
        id,
        team: info.team,
        position: pos.0,
        velocity: vel.0,
        radius: info.radius,
        speed: info.speed,
        health_fraction,
        threat: weapon.damage / weapon.cooldown_secs.max(f64::EPSILON),
        active: vitals.active,
    })
}

/// Snapshot of every unit, fallen ones included, in ascending id order.
pub fn combatants(world: &World, units: &BTreeMap<UnitId, Entity>) -> Vec<Combatant> {
    units
        .iter()
        .filter_map(|(&id, &entity)| combatant(world, id, entity))
        .collect()
}

/// Update targets and velocities of all active units and return the
/// attacks they want to make, in ascending attacker id order.
pub fn run(
    world: &mut World,
    units: &BTreeMap<UnitId, Entity>,
    ai: &AiConfig,
) -> Vec<AttackIntent> {
    let snapshot = combatants(world, units);
    let mut plans = Vec::with_capacity(snapshot.len());

    for unit in snapshot.iter().filter(|c| c.active) {
        let Some(&entity) = units.get(&unit.id) else {
            continue;
        };
        let (weapon, morale, current) = {
            let (Ok(weapon), Ok(morale), Ok(targeting)) = (
                world.get::<&Weapon>(entity),
                world.get::<&Morale>(entity),
                world.get::<&Targeting>(entity),
            ) else {
                continue;
            };
            (*weapon, morale.state, targeting.target)
        };

        let looked_up = current.and_then(|id| snapshot.iter().find(|c| c.id == id));
        let target_id = if needs_retarget(unit, looked_up, ai) {
            select_target(unit, &snapshot, ai)
        } else {
            current
        };
        let target = target_id.and_then(|id| find_active(&snapshot, id));

        let velocity = steer(
            &SteeringContext {
                unit,
                attack_range: weapon.range,
                ranged: weapon.ranged,
                morale,
                target,
                rally_point: enemy_centroid(unit.team, &snapshot),
                units: &snapshot,
            },
            ai,
        );

        let attack = target
            .filter(|t| {
                morale != MoraleState::Routing
                    && weapon.timer_secs <= 0.0
                    && unit.in_reach(t, weapon.range)
            })
            .map(|t| AttackIntent {
                attacker: unit.id,
                target: t.id,
            });

        plans.push((entity, target_id, velocity, attack));
    }

    let mut attacks = Vec::new();
    for (entity, target, velocity, attack) in plans {
        if let Ok((targeting, vel)) = world.query_one_mut::<(&mut Targeting, &mut Velocity)>(entity)
        {
            targeting.target = target;
            vel.0 = velocity;
        }
        attacks.extend(attack);
    }
    attacks
}
