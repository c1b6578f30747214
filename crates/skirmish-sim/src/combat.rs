//! Damage resolution.
//!
//! Every hit in the battle, melee, projectile or drone, goes through
//! [`take_damage`]. It owns the bookkeeping that follows a hit: records,
//! morale, kill credit, events and the hit effect.

use std::collections::BTreeMap;

use glam::DVec2;
use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use skirmish_ai::morale::{damage_penalty, next_state};
use skirmish_core::components::*;
use skirmish_core::config::MitigationPolicy;
use skirmish_core::constants::*;
use skirmish_core::enums::{DamageType, Team};
use skirmish_core::events::{BattleEvent, HitEvent, KillEvent};
use skirmish_core::types::{Position, UnitId, Velocity};
use skirmish_core::vector;

use crate::ledger::BattleLedger;

/// One damage application.
#[derive(Debug, Clone, Copy)]
pub struct Strike {
    pub target: UnitId,
    /// Credited unit. May already be dead (projectile in flight, orphaned drone).
    pub source: UnitId,
    pub source_team: Team,
    pub raw_damage: f64,
    pub armor_piercing: f64,
    pub damage_type: DamageType,
    /// Where the hit effect appears; the target's position when `None`.
    pub contact: Option<DVec2>,
}

/// What a strike did to its target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrikeResult {
    /// Health actually removed.
    pub damage: f64,
    pub killed: bool,
}

/// Apply `strike` to its target.
///
/// Returns `None` when the target is missing, already down, or on the
/// striker's own team. Health never goes below zero and a downed unit stays
/// down.
pub fn take_damage(
    world: &mut World,
    units: &BTreeMap<UnitId, Entity>,
    ledger: &mut BattleLedger,
    rng: &mut ChaCha8Rng,
    policy: &MitigationPolicy,
    battle_time: f64,
    strike: Strike,
) -> Option<StrikeResult> {
    let entity = *units.get(&strike.target)?;
    let (victim_team, victim_pos) = {
        let info = world.get::<&UnitInfo>(entity).ok()?;
        let pos = world.get::<&Position>(entity).ok()?;
        (info.team, pos.0)
    };
    if victim_team == strike.source_team {
        return None;
    }

    let (damage, killed, max_health) = {
        let mut vitals = world.get::<&mut Vitals>(entity).ok()?;
        if !vitals.active {
            return None;
        }
        let mitigated = policy.mitigate(strike.raw_damage, vitals.armor, strike.armor_piercing);
        let before = vitals.health;
        vitals.health = (vitals.health - mitigated).clamp(0.0, vitals.max_health);
        let killed = vitals.health <= 0.0;
        if killed {
            vitals.health = 0.0;
            vitals.active = false;
        }
        (before - vitals.health, killed, vitals.max_health)
    };

    if let Ok(mut record) = world.get::<&mut CombatRecord>(entity) {
        record.damage_taken += damage;
    }
    let source_entity = units.get(&strike.source).copied();
    if let Some(source) = source_entity {
        if let Ok(mut record) = world.get::<&mut CombatRecord>(source) {
            record.damage_dealt += damage;
        }
    }

    if damage > 0.0 {
        let contact = strike.contact.unwrap_or(victim_pos);
        ledger.push(BattleEvent::Hit(HitEvent {
            target: strike.target,
            source: strike.source,
            damage_type: strike.damage_type,
            damage,
            position: contact,
        }));
        spawn_hit_effect(world, rng, contact, strike.damage_type);
    }

    if !killed {
        if let Ok(mut morale) = world.get::<&mut Morale>(entity) {
            morale.since_damage_secs = 0.0;
        }
        adjust_morale(
            world,
            entity,
            strike.target,
            -damage_penalty(damage, max_health),
            ledger,
        );
        return Some(StrikeResult { damage, killed });
    }

    if let Ok((targeting, vel)) = world.query_one_mut::<(&mut Targeting, &mut Velocity)>(entity) {
        targeting.target = None;
        vel.0 = DVec2::ZERO;
    }

    ledger.record_kill(strike.source_team);
    if let Some(source) = source_entity {
        let source_active = world.get::<&Vitals>(source).map(|v| v.active).unwrap_or(false);
        if let Ok(mut record) = world.get::<&mut CombatRecord>(source) {
            record.kills += 1;
        }
        if source_active {
            adjust_morale(world, source, strike.source, KILL_MORALE_BONUS, ledger);
        }
    }

    debug!(
        victim = %strike.target,
        killer = %strike.source,
        t = battle_time,
        "unit destroyed"
    );
    ledger.push(BattleEvent::Kill(KillEvent {
        victim: strike.target,
        victim_team,
        killer: strike.source,
        killer_team: strike.source_team,
        battle_time,
    }));

    shock_allies(world, units, ledger, victim_team, victim_pos);
    Some(StrikeResult { damage, killed })
}

/// Shift a unit's morale by `delta`, clamped to its pool, and move it to the
/// matching band.
pub(crate) fn adjust_morale(
    world: &mut World,
    entity: Entity,
    unit: UnitId,
    delta: f64,
    ledger: &mut BattleLedger,
) {
    let Ok(mut morale) = world.get::<&mut Morale>(entity) else {
        return;
    };
    morale.current = (morale.current + delta).clamp(0.0, morale.max);
    let next = next_state(morale.state, morale.current, morale.max);
    if next != morale.state {
        morale.state = next;
        ledger.push(BattleEvent::MoraleChanged { unit, state: next });
    }
}

/// Living allies near a fallen unit lose heart.
fn shock_allies(
    world: &mut World,
    units: &BTreeMap<UnitId, Entity>,
    ledger: &mut BattleLedger,
    team: Team,
    at: DVec2,
) {
    let witnesses: Vec<(UnitId, Entity)> = units
        .iter()
        .filter(|&(_, &entity)| {
            let (Ok(info), Ok(vitals), Ok(pos)) = (
                world.get::<&UnitInfo>(entity),
                world.get::<&Vitals>(entity),
                world.get::<&Position>(entity),
            ) else {
                return false;
            };
            info.team == team && vitals.active && pos.0.distance(at) <= MORALE_SHOCK_RADIUS
        })
        .map(|(&id, &entity)| (id, entity))
        .collect();

    for (id, entity) in witnesses {
        adjust_morale(world, entity, id, -MORALE_ALLY_DEATH_PENALTY, ledger);
    }
}

/// Spawn the burst shown where a hit landed.
pub fn spawn_hit_effect(
    world: &mut World,
    rng: &mut ChaCha8Rng,
    at: DVec2,
    damage_type: DamageType,
) -> Entity {
    let particles = (0..HIT_EFFECT_PARTICLES)
        .map(|_| {
            let heading = rng.gen_range(0.0..std::f64::consts::TAU);
            let speed = rng.gen_range(0.5..1.0) * HIT_EFFECT_PARTICLE_SPEED;
            Particle {
                offset: DVec2::ZERO,
                velocity: vector::from_angle(heading) * speed,
            }
        })
        .collect();

    world.spawn((
        Position(at),
        HitEffect {
            color: damage_type.color(),
            remaining_secs: HIT_EFFECT_DURATION_SECS,
            duration_secs: HIT_EFFECT_DURATION_SECS,
            particles,
        },
    ))
}
