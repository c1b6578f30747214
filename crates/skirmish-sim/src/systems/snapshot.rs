//! Snapshot system: queries the ECS world and builds the read-only views
//! and statistics handed to hosts.
//!
//! This system is read-only. It never modifies the world.

use std::collections::BTreeMap;

use hecs::{Entity, World};

use skirmish_core::components::*;
use skirmish_core::enums::{BattleOutcome, BattlePhase, Team};
use skirmish_core::state::*;
use skirmish_core::types::{Position, Velocity};

use crate::ledger::BattleLedger;

type UnitQuery<'a> = (
    &'a UnitInfo,
    &'a Position,
    &'a Velocity,
    &'a Vitals,
    &'a Morale,
    &'a Weapon,
    &'a Targeting,
    &'a CombatRecord,
);

fn unit_view(
    (info, pos, vel, vitals, morale, weapon, targeting, record): UnitQuery<'_>,
) -> UnitView {
    UnitView {
        id: info.id,
        team: info.team,
        number: info.number,
        class: info.class.clone(),
        position: pos.0,
        velocity: vel.0,
        radius: info.radius,
        health: vitals.health,
        max_health: vitals.max_health,
        morale: morale.current,
        max_morale: morale.max,
        morale_state: morale.state,
        active: vitals.active,
        ranged: weapon.ranged,
        attack_range: weapon.range,
        target: targeting.target,
        kills: record.kills,
        damage_dealt: record.damage_dealt,
    }
}

/// View of a single unit entity.
pub fn build_unit(world: &World, entity: Entity) -> Option<UnitView> {
    let mut query = world.query_one::<UnitQuery<'_>>(entity).ok()?;
    query.get().map(unit_view)
}

/// Every unit, fallen ones included, in ascending id order.
pub fn build_units(world: &World) -> Vec<UnitView> {
    let mut units: Vec<UnitView> = world
        .query::<UnitQuery<'_>>()
        .iter()
        .map(|(_, item)| unit_view(item))
        .collect();
    units.sort_by_key(|u| u.id);
    units
}

pub fn build_projectiles(world: &World) -> Vec<ProjectileView> {
    let mut projectiles: Vec<ProjectileView> = world
        .query::<(&Projectile, &Position, &Velocity)>()
        .iter()
        .filter(|(_, (shot, _, _))| !shot.consumed)
        .map(|(_, (shot, pos, vel))| ProjectileView {
            id: shot.id,
            team: shot.source_team,
            source: shot.source,
            target: shot.target,
            kind: shot.kind,
            position: pos.0,
            velocity: vel.0,
            damage: shot.damage,
            lifetime_secs: shot.lifetime_secs,
        })
        .collect();
    projectiles.sort_by_key(|p| p.id);
    projectiles
}

pub fn build_interceptors(world: &World) -> Vec<InterceptorView> {
    let mut interceptors: Vec<InterceptorView> = world
        .query::<(&Interceptor, &Position, &Velocity)>()
        .iter()
        .filter(|(_, (drone, _, _))| !drone.destroyed)
        .map(|(_, (drone, pos, vel))| InterceptorView {
            id: drone.id,
            parent: drone.parent,
            team: drone.team,
            target: drone.target,
            state: drone.state,
            position: pos.0,
            velocity: vel.0,
            lifetime_secs: drone.lifetime_secs,
        })
        .collect();
    interceptors.sort_by_key(|i| i.id);
    interceptors
}

pub fn build_effects(world: &World) -> Vec<EffectView> {
    world
        .query::<(&HitEffect, &Position)>()
        .iter()
        .filter(|(_, (effect, _))| effect.remaining_secs > 0.0)
        .map(|(_, (effect, pos))| EffectView {
            position: pos.0,
            color: effect.color,
            remaining_fraction: if effect.duration_secs > 0.0 {
                (effect.remaining_secs / effect.duration_secs).clamp(0.0, 1.0)
            } else {
                0.0
            },
            particles: effect.particles.clone(),
        })
        .collect()
}

/// Living units of `team`.
pub fn alive_count(world: &World, team: Team) -> u32 {
    world
        .query::<(&UnitInfo, &Vitals)>()
        .iter()
        .filter(|(_, (info, vitals))| info.team == team && vitals.active)
        .count() as u32
}

/// Headline numbers for both sides.
pub fn build_stats(
    world: &World,
    ledger: &BattleLedger,
    battle_time: f64,
    phase: BattlePhase,
    outcome: Option<BattleOutcome>,
) -> BattleStats {
    BattleStats {
        blue_alive: alive_count(world, Team::Blue),
        red_alive: alive_count(world, Team::Red),
        blue_kills: ledger.kills(Team::Blue),
        red_kills: ledger.kills(Team::Red),
        battle_time,
        phase,
        outcome,
    }
}

/// Detailed summary of one side.
pub fn build_team_stats(world: &World, ledger: &BattleLedger, team: Team) -> TeamStats {
    let mut stats = TeamStats::default();
    let mut health_sum = 0.0;
    let mut morale_sum = 0.0;
    let mut breakdown: BTreeMap<String, ClassBreakdown> = BTreeMap::new();

    for (_, (info, vitals, morale, record)) in world
        .query::<(&UnitInfo, &Vitals, &Morale, &CombatRecord)>()
        .iter()
        .filter(|(_, (info, ..))| info.team == team)
    {
        stats.total += 1;
        stats.total_damage += record.damage_dealt;
        let entry = breakdown.entry(info.class.clone()).or_default();
        entry.total += 1;

        if vitals.active {
            stats.alive += 1;
            entry.alive += 1;
            if vitals.max_health > 0.0 {
                health_sum += vitals.health / vitals.max_health;
            }
            if morale.max > 0.0 {
                morale_sum += morale.current / morale.max;
            }
        }
    }

    stats.interceptor_count = world
        .query::<&Interceptor>()
        .iter()
        .filter(|(_, drone)| drone.team == team && !drone.destroyed)
        .count() as u32;
    stats.killed = stats.total - stats.alive;
    stats.kills = ledger.kills(team);
    if stats.alive > 0 {
        stats.avg_health_percent = health_sum / stats.alive as f64 * 100.0;
        stats.avg_morale_percent = morale_sum / stats.alive as f64 * 100.0;
    }
    stats.unit_type_breakdown = breakdown;
    stats
}
