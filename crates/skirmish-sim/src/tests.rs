//! Tests for the battle engine, its systems and the game manager façade.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use glam::DVec2;

use skirmish_core::components::{Interceptor, Vitals};
use skirmish_core::config::{BattleConfig, ConfigError, Deployment, Placement, UnitClass};
use skirmish_core::constants::*;
use skirmish_core::enums::*;
use skirmish_core::events::{BattleEvent, BattleObserver, HitEvent, KillEvent};
use skirmish_core::render::RenderSurface;
use skirmish_core::types::{InterceptorId, Position, Rgba, UnitId, Velocity};

use crate::aiming;
use crate::engine::BattleEngine;
use crate::manager::GameManager;

fn class(name: &str, health: f64, damage: f64, ranged: bool) -> UnitClass {
    UnitClass {
        name: name.to_string(),
        health,
        armor: 0.0,
        damage,
        armor_piercing: 0.0,
        speed: 40.0,
        attack_range: 50.0,
        attack_cooldown_secs: 1.0,
        ranged,
        radius: 8.0,
        morale: 100.0,
        traits: TraitSet::EMPTY,
    }
}

fn place(team: Team, class: &str, x: f64, y: f64) -> Placement {
    Placement {
        team,
        class: class.to_string(),
        position: DVec2::new(x, y),
    }
}

fn manual(classes: Vec<UnitClass>, placements: Vec<Placement>) -> BattleConfig {
    BattleConfig {
        classes,
        deployment: Deployment::Manual(placements),
        ..Default::default()
    }
}

/// A (Blue, 100 hp, 20 dmg) against B (Red, 50 hp, 10 dmg), 10 apart, melee.
fn duel() -> BattleEngine {
    let config = manual(
        vec![class("A", 100.0, 20.0, false), class("B", 50.0, 10.0, false)],
        vec![
            place(Team::Blue, "A", 400.0, 450.0),
            place(Team::Red, "B", 410.0, 450.0),
        ],
    );
    BattleEngine::new(config).unwrap()
}

fn run_until_finished(engine: &mut BattleEngine, max_ticks: usize) {
    for _ in 0..max_ticks {
        if engine.phase() == BattlePhase::Finished {
            return;
        }
        engine.update(FIXED_STEP);
    }
}

// ---- Determinism ----

#[test]
fn test_determinism_same_seed() {
    let mut engine_a = BattleEngine::new(BattleConfig::default()).unwrap();
    let mut engine_b = BattleEngine::new(BattleConfig::default()).unwrap();
    engine_a.start_battle();
    engine_b.start_battle();

    for tick in 0..600 {
        engine_a.update(FIXED_STEP);
        engine_b.update(FIXED_STEP);
        if tick % 60 == 0 {
            let json_a = serde_json::to_string(&engine_a.snapshot()).unwrap();
            let json_b = serde_json::to_string(&engine_b.snapshot()).unwrap();
            assert_eq!(json_a, json_b, "Snapshots diverged with same seed");
        }
    }
    assert_eq!(
        serde_json::to_string(&engine_a.stats()).unwrap(),
        serde_json::to_string(&engine_b.stats()).unwrap()
    );
}

#[test]
fn test_determinism_different_seeds() {
    let engine_a = BattleEngine::new(BattleConfig {
        seed: 111,
        ..Default::default()
    })
    .unwrap();
    let engine_b = BattleEngine::new(BattleConfig {
        seed: 222,
        ..Default::default()
    })
    .unwrap();

    // Formation jitter alone separates the two.
    let json_a = serde_json::to_string(&engine_a.units()).unwrap();
    let json_b = serde_json::to_string(&engine_b.units()).unwrap();
    assert_ne!(json_a, json_b);
}

// ---- Lifecycle ----

#[test]
fn test_new_deploys_in_setup() {
    let engine = BattleEngine::new(BattleConfig::default()).unwrap();
    assert_eq!(engine.phase(), BattlePhase::Setup);
    assert_eq!(engine.alive_count(Team::Blue), DEFAULT_TEAM_SIZE);
    assert_eq!(engine.alive_count(Team::Red), DEFAULT_TEAM_SIZE);
    assert_eq!(engine.time().elapsed_secs, 0.0);
    assert!(engine.outcome().is_none());
}

#[test]
fn test_invalid_config_rejected() {
    let config = manual(
        vec![class("A", 100.0, 20.0, false)],
        vec![place(Team::Blue, "Ghost", 10.0, 10.0)],
    );
    assert!(matches!(
        BattleEngine::new(config),
        Err(ConfigError::UnknownClass(name)) if name == "Ghost"
    ));
}

#[test]
fn test_update_is_noop_outside_battle() {
    let mut engine = BattleEngine::new(BattleConfig::default()).unwrap();
    engine.update(FIXED_STEP);
    assert_eq!(engine.time().tick, 0);

    engine.start_battle();
    engine.update(f64::NAN);
    engine.update(-1.0);
    engine.update(0.0);
    engine.update(f64::INFINITY);
    assert_eq!(engine.time().tick, 0);

    engine.update(FIXED_STEP);
    assert_eq!(engine.time().tick, 1);
}

#[test]
fn test_start_battle_only_from_setup() {
    let mut engine = BattleEngine::new(BattleConfig::default()).unwrap();
    assert!(engine.start_battle());
    assert!(!engine.start_battle());
    assert_eq!(engine.phase(), BattlePhase::Battle);
}

#[test]
fn test_reset_mid_battle() {
    let mut engine = BattleEngine::new(BattleConfig::default()).unwrap();
    engine.start_battle();
    for _ in 0..300 {
        engine.update(FIXED_STEP);
    }
    assert!(engine.time().elapsed_secs > 0.0);

    engine.reset();
    let stats = engine.stats();
    assert_eq!(stats.battle_time, 0.0);
    assert_eq!(stats.phase, BattlePhase::Setup);
    assert_eq!(stats.blue_alive, DEFAULT_TEAM_SIZE);
    assert_eq!(stats.red_alive, DEFAULT_TEAM_SIZE);
    assert_eq!(stats.blue_kills + stats.red_kills, 0);
    assert!(engine.projectiles().is_empty());
    assert!(engine.interceptors().is_empty());
    assert!(engine.effects().is_empty());
}

#[test]
fn test_reset_twice_matches_once() {
    let mut once = BattleEngine::new(BattleConfig::default()).unwrap();
    once.start_battle();
    for _ in 0..120 {
        once.update(FIXED_STEP);
    }
    once.reset();

    let mut twice = BattleEngine::new(BattleConfig::default()).unwrap();
    twice.reset();
    twice.reset();

    assert_eq!(once.stats(), twice.stats());
    assert_eq!(
        serde_json::to_string(&once.snapshot()).unwrap(),
        serde_json::to_string(&twice.snapshot()).unwrap()
    );
}

#[test]
fn test_finished_only_leaves_through_reset() {
    let mut engine = duel();
    engine.start_battle();
    run_until_finished(&mut engine, 600);
    assert_eq!(engine.phase(), BattlePhase::Finished);

    let time = engine.time();
    assert!(!engine.start_battle());
    engine.update(FIXED_STEP);
    assert_eq!(engine.time(), time);

    engine.reset();
    assert_eq!(engine.phase(), BattlePhase::Setup);
}

// ---- Formation ----

#[test]
fn test_formation_sides() {
    let engine = BattleEngine::new(BattleConfig::default()).unwrap();
    let center = engine.config().bounds.center().x;
    for unit in engine.units() {
        match unit.team {
            Team::Blue => assert!(unit.position.x < center),
            Team::Red => assert!(unit.position.x > center),
        }
    }
}

#[test]
fn test_formation_range_scaling() {
    let engine = BattleEngine::new(BattleConfig::default()).unwrap();
    let units = engine.units();
    let rifleman = units.iter().find(|u| u.class == "Rifleman").unwrap();
    let trooper = units.iter().find(|u| u.class == "Trooper").unwrap();
    assert!((rifleman.attack_range - 90.0 * RANGED_RANGE_SCALE).abs() < 1e-9);
    assert!((trooper.attack_range - 20.0 * MELEE_RANGE_SCALE).abs() < 1e-9);
}

#[test]
fn test_manual_placement_keeps_base_range() {
    let engine = duel();
    let a = engine.unit(UnitId(1)).unwrap();
    assert_eq!(a.attack_range, 50.0);
    assert_eq!(a.position, DVec2::new(400.0, 450.0));
}

#[test]
fn test_formation_strong_units_in_rear() {
    let engine = BattleEngine::new(BattleConfig::default()).unwrap();
    let blue = engine.allies(Team::Blue);
    let juggernaut = blue.iter().find(|u| u.class == "Juggernaut").unwrap();
    for rifleman in blue.iter().filter(|u| u.class == "Rifleman") {
        assert!(juggernaut.position.x < rifleman.position.x);
    }
}

#[test]
fn test_carriers_registered() {
    let engine = BattleEngine::new(BattleConfig::default()).unwrap();
    for unit in engine.units() {
        let expected = matches!(unit.class.as_str(), "Drone Carrier" | "Siege Walker");
        assert_eq!(engine.is_carrier(unit.id), expected, "{}", unit.class);
    }
}

// ---- Combat ----

#[test]
fn test_duel_blue_wins() {
    let mut engine = duel();
    engine.start_battle();
    run_until_finished(&mut engine, 600);

    let stats = engine.stats();
    assert_eq!(stats.phase, BattlePhase::Finished);
    assert_eq!(stats.winner(), Some(Team::Blue));
    assert_eq!(stats.blue_kills, 1);
    assert_eq!(stats.red_kills, 0);
    assert_eq!(stats.red_alive, 0);

    let b = engine.unit(UnitId(2)).unwrap();
    assert_eq!(b.health, 0.0);
    assert!(!b.active);
    let a = engine.unit(UnitId(1)).unwrap();
    assert!(a.active);
    assert_eq!(a.kills, 1);
}

#[test]
fn test_duel_team_stats() {
    let mut engine = duel();
    engine.start_battle();
    run_until_finished(&mut engine, 600);

    let blue = engine.team_stats(Team::Blue);
    let red = engine.team_stats(Team::Red);
    assert_eq!(blue.kills, 1);
    assert_eq!(blue.killed, 0);
    assert_eq!(red.killed, 1);
    assert_eq!(red.alive, 0);
    // Overkill is not counted: B only had 50 health.
    assert!((blue.total_damage - 50.0).abs() < 1e-9);
    // B landed two blows before it fell.
    assert!((red.total_damage - 20.0).abs() < 1e-9);
    assert!((blue.avg_health_percent - 80.0).abs() < 1e-9);
}

#[test]
fn test_large_melee_units_close_and_fight() {
    let mut a = class("A", 100.0, 20.0, false);
    let mut b = class("B", 50.0, 10.0, false);
    for big in [&mut a, &mut b] {
        big.radius = 15.0;
        big.attack_range = 20.0;
    }
    let config = manual(
        vec![a, b],
        vec![
            place(Team::Blue, "A", 400.0, 450.0),
            place(Team::Red, "B", 500.0, 450.0),
        ],
    );
    let mut engine = BattleEngine::new(config).unwrap();
    engine.start_battle();
    run_until_finished(&mut engine, 60 * 30);

    assert_eq!(engine.phase(), BattlePhase::Finished);
    assert_eq!(engine.outcome(), Some(BattleOutcome::Victory(Team::Blue)));
}

#[test]
fn test_trooper_lands_blows_on_juggernaut() {
    let config = BattleConfig {
        deployment: Deployment::Manual(vec![
            place(Team::Blue, "Trooper", 700.0, 450.0),
            place(Team::Red, "Juggernaut", 800.0, 450.0),
        ]),
        ..Default::default()
    };
    let mut engine = BattleEngine::new(config).unwrap();
    engine.start_battle();
    for _ in 0..300 {
        engine.update(FIXED_STEP);
    }
    assert!(engine.unit(UnitId(1)).unwrap().damage_dealt > 0.0);
    let juggernaut = engine.unit(UnitId(2)).unwrap();
    assert!(juggernaut.health < juggernaut.max_health);
}

#[test]
fn test_health_bounds_and_no_reactivation() {
    let mut engine = BattleEngine::new(BattleConfig::default()).unwrap();
    engine.start_battle();
    let mut fallen: BTreeSet<UnitId> = BTreeSet::new();

    for _ in 0..1800 {
        engine.update(FIXED_STEP);
        for unit in engine.units() {
            assert!(unit.health >= 0.0 && unit.health <= unit.max_health);
            if fallen.contains(&unit.id) {
                assert!(!unit.active, "{} came back", unit.id);
            }
            if !unit.active {
                assert_eq!(unit.health, 0.0);
                fallen.insert(unit.id);
            }
        }
    }
}

#[test]
fn test_kill_counters_non_decreasing() {
    let mut engine = BattleEngine::new(BattleConfig::default()).unwrap();
    engine.start_battle();
    let (mut blue, mut red) = (0, 0);
    for _ in 0..1800 {
        engine.update(FIXED_STEP);
        let stats = engine.stats();
        assert!(stats.blue_kills >= blue && stats.red_kills >= red);
        blue = stats.blue_kills;
        red = stats.red_kills;
    }
}

#[test]
fn test_outcome_consistency() {
    let mut engine = BattleEngine::new(BattleConfig::default()).unwrap();
    engine.start_battle();
    run_until_finished(&mut engine, 60 * 180);

    let stats = engine.stats();
    assert_eq!(stats.phase == BattlePhase::Finished, stats.outcome.is_some());
    match stats.outcome {
        Some(BattleOutcome::Victory(Team::Blue)) => {
            assert_eq!(stats.red_alive, 0);
            assert!(stats.blue_alive > 0);
        }
        Some(BattleOutcome::Victory(Team::Red)) => {
            assert_eq!(stats.blue_alive, 0);
            assert!(stats.red_alive > 0);
        }
        Some(BattleOutcome::Draw) => {
            assert_eq!(stats.blue_alive + stats.red_alive, 0);
        }
        None => assert!(stats.blue_alive > 0 && stats.red_alive > 0),
    }
}

#[test]
fn test_no_victory_inside_grace_period() {
    let config = manual(
        vec![class("A", 100.0, 20.0, false)],
        vec![place(Team::Blue, "A", 100.0, 100.0)],
    );
    let mut engine = BattleEngine::new(config).unwrap();
    engine.start_battle();
    for _ in 0..20 {
        engine.update(FIXED_STEP);
    }
    assert_eq!(engine.phase(), BattlePhase::Battle);

    run_until_finished(&mut engine, 60);
    assert_eq!(engine.outcome(), Some(BattleOutcome::Victory(Team::Blue)));
}

#[test]
fn test_friendly_projectile_is_harmless() {
    let config = manual(
        vec![class("Gunner", 100.0, 10.0, true)],
        vec![
            place(Team::Blue, "Gunner", 300.0, 450.0),
            place(Team::Blue, "Gunner", 400.0, 450.0),
        ],
    );
    let mut engine = BattleEngine::new(config).unwrap();
    engine.start_battle();

    assert!(engine.spawn_projectile(UnitId(1), UnitId(2), 50.0).is_some());
    for _ in 0..25 {
        engine.update(FIXED_STEP);
    }
    for unit in engine.units() {
        assert_eq!(unit.health, unit.max_health);
    }
}

#[test]
fn test_projectile_hits_enemy() {
    let config = manual(
        vec![class("Gunner", 100.0, 10.0, true)],
        vec![
            place(Team::Blue, "Gunner", 300.0, 450.0),
            place(Team::Red, "Gunner", 500.0, 450.0),
        ],
    );
    let mut engine = BattleEngine::new(config).unwrap();
    engine.start_battle();
    engine.drain_events();

    assert!(engine.spawn_projectile(UnitId(1), UnitId(2), 30.0).is_some());
    assert_eq!(engine.projectiles()[0].kind, ProjectileKind::Bullet);
    for _ in 0..30 {
        engine.update(FIXED_STEP);
    }

    let red = engine.unit(UnitId(2)).unwrap();
    assert!((red.health - 70.0).abs() < 1e-9);
    assert!(engine.drain_events().iter().any(|e| matches!(
        e,
        BattleEvent::Hit(hit) if hit.source == UnitId(1) && hit.damage_type == DamageType::Kinetic
    )));
}

#[test]
fn test_armor_piercing_never_lowers_damage() {
    let mut last = 0.0;
    for piercing in [0.0, 5.0, 20.0, 40.0, 60.0] {
        let mut attacker = class("Attacker", 100.0, 30.0, false);
        attacker.armor_piercing = piercing;
        let mut tank = class("Tank", 500.0, 1.0, false);
        tank.armor = 50.0;
        let config = manual(
            vec![attacker, tank],
            vec![
                place(Team::Blue, "Attacker", 400.0, 450.0),
                place(Team::Red, "Tank", 410.0, 450.0),
            ],
        );
        let mut engine = BattleEngine::new(config).unwrap();
        engine.start_battle();
        let damage = engine.spawn_melee_effect(UnitId(1), UnitId(2), 30.0).unwrap();
        assert!(damage >= last, "piercing {piercing}: {damage} < {last}");
        last = damage;
    }
    assert!((last - 30.0).abs() < 1e-9);
}

#[test]
fn test_invalid_host_requests_are_ignored() {
    let mut engine = duel();
    // Outside battle.
    assert!(engine.spawn_melee_effect(UnitId(1), UnitId(2), 10.0).is_none());

    engine.start_battle();
    assert!(engine.spawn_projectile(UnitId(1), UnitId(99), 10.0).is_none());
    assert!(engine.spawn_projectile(UnitId(99), UnitId(1), 10.0).is_none());
    assert!(engine.spawn_projectile(UnitId(1), UnitId(2), f64::NAN).is_none());
    assert!(engine.spawn_melee_effect(UnitId(1), UnitId(1), 10.0).is_none());
    assert!(engine.unit(UnitId(99)).is_none());
    assert_eq!(engine.unit(UnitId(2)).unwrap().health, 50.0);
}

#[test]
fn test_melee_on_fallen_unit_is_ignored() {
    let mut engine = duel();
    engine.start_battle();
    assert_eq!(engine.spawn_melee_effect(UnitId(1), UnitId(2), 500.0), Some(50.0));
    assert!(!engine.unit(UnitId(2)).unwrap().active);
    assert!(engine.spawn_melee_effect(UnitId(1), UnitId(2), 10.0).is_none());
    assert_eq!(engine.stats().blue_kills, 1);
}

#[test]
fn test_damage_lowers_morale() {
    let mut engine = duel();
    engine.start_battle();
    engine.spawn_melee_effect(UnitId(1), UnitId(2), 20.0);
    let b = engine.unit(UnitId(2)).unwrap();
    // 40% of max health lost.
    assert!((b.morale - 60.0).abs() < 1e-9);
    assert_eq!(b.morale_state, MoraleState::Steady);

    engine.spawn_melee_effect(UnitId(1), UnitId(2), 20.0);
    assert_eq!(
        engine.unit(UnitId(2)).unwrap().morale_state,
        MoraleState::Shaken
    );
}

#[test]
fn test_spawn_unit() {
    let mut engine = duel();
    let id = engine
        .spawn_unit(Team::Red, "B", DVec2::new(-50.0, 5000.0))
        .unwrap();
    assert_eq!(id, UnitId(3));
    let unit = engine.unit(id).unwrap();
    assert_eq!(unit.number, 2);
    // Clamped into the arena.
    assert!(engine.config().bounds.contains(unit.position));
    assert!(engine.spawn_unit(Team::Red, "Nope", DVec2::ZERO).is_none());
    assert_eq!(engine.alive_count(Team::Red), 2);
}

// ---- Aiming ----

#[test]
fn test_projectile_kind_from_traits() {
    let massive = TraitSet::EMPTY.with(UnitTrait::Massive);
    let advanced = TraitSet::EMPTY.with(UnitTrait::Advanced);
    assert_eq!(aiming::projectile_kind(TraitSet::EMPTY), ProjectileKind::Bullet);
    assert_eq!(aiming::projectile_kind(advanced), ProjectileKind::Laser);
    assert_eq!(aiming::projectile_kind(massive), ProjectileKind::Missile);
    assert_eq!(
        aiming::projectile_kind(massive.with(UnitTrait::Advanced)),
        ProjectileKind::Plasma
    );
}

#[test]
fn test_lead_point() {
    let lead = aiming::lead_point(
        DVec2::ZERO,
        DVec2::new(100.0, 0.0),
        DVec2::new(0.0, 10.0),
        100.0,
    );
    assert!((lead - DVec2::new(100.0, 10.0)).length() < 1e-9);

    let v = aiming::launch_velocity(
        DVec2::ZERO,
        DVec2::new(100.0, 0.0),
        DVec2::ZERO,
        ProjectileKind::Laser,
    );
    assert!((v - DVec2::new(LASER_SPEED, 0.0)).length() < 1e-9);
}

#[test]
fn test_missile_turn_is_limited() {
    let v = DVec2::new(MISSILE_SPEED, 0.0);
    let turned = aiming::home(v, DVec2::ZERO, DVec2::new(0.0, 100.0), FIXED_STEP);
    assert!((turned.length() - MISSILE_SPEED).abs() < 1e-6);
    let angle = turned.y.atan2(turned.x);
    assert!((angle - MISSILE_TURN_RATE * FIXED_STEP).abs() < 1e-9);
}

// ---- Interceptors ----

fn carrier_config() -> BattleConfig {
    let mut carrier = class("Carrier", 200.0, 5.0, true);
    carrier.traits = TraitSet::EMPTY
        .with(UnitTrait::Massive)
        .with(UnitTrait::Carrier);
    manual(
        vec![carrier, class("Grunt", 100.0, 5.0, false)],
        vec![
            place(Team::Blue, "Carrier", 100.0, 450.0),
            place(Team::Red, "Grunt", 1500.0, 450.0),
        ],
    )
}

#[test]
fn test_carrier_launches_interceptor() {
    let mut engine = BattleEngine::new(carrier_config()).unwrap();
    assert!(engine.is_carrier(UnitId(1)));
    engine.start_battle();

    for _ in 0..110 {
        engine.update(FIXED_STEP);
    }
    assert!(engine.interceptors().is_empty());

    for _ in 0..20 {
        engine.update(FIXED_STEP);
    }
    let drones = engine.interceptors();
    assert_eq!(drones.len(), 1);
    assert_eq!(drones[0].parent, UnitId(1));
    assert_eq!(drones[0].team, Team::Blue);
    assert_eq!(engine.team_stats(Team::Blue).interceptor_count, 1);
    assert!(engine.events().iter().any(|e| matches!(
        e,
        BattleEvent::InterceptorLaunched { parent, .. } if *parent == UnitId(1)
    )));
}

#[test]
fn test_dead_carrier_stops_launching() {
    let mut engine = BattleEngine::new(carrier_config()).unwrap();
    engine.start_battle();
    let entity = engine.entity(UnitId(1)).unwrap();
    if let Ok(mut vitals) = engine.world_mut().get::<&mut Vitals>(entity) {
        vitals.health = 0.0;
        vitals.active = false;
    }
    for _ in 0..30 {
        engine.update(FIXED_STEP);
    }
    assert!(!engine.is_carrier(UnitId(1)));
    assert!(engine.interceptors().is_empty());
}

fn stage_drone(
    engine: &mut BattleEngine,
    id: u32,
    team: Team,
    parent: UnitId,
    at: DVec2,
) -> hecs::Entity {
    engine.world_mut().spawn((
        Position(at),
        Velocity::default(),
        Interceptor {
            id: InterceptorId(id),
            parent,
            team,
            target: None,
            state: InterceptorState::Orbiting,
            damage: INTERCEPTOR_DAMAGE,
            attack_range: INTERCEPTOR_ATTACK_RANGE,
            cooldown_secs: INTERCEPTOR_COOLDOWN_SECS,
            timer_secs: 0.0,
            lifetime_secs: INTERCEPTOR_LIFETIME_SECS,
            orbit_angle: 0.0,
            orphan_secs: 0.0,
            destroyed: false,
        },
    ))
}

fn lost(engine: &BattleEngine, id: u32) -> bool {
    engine.events().iter().any(|e| matches!(
        e,
        BattleEvent::InterceptorLost { interceptor, .. } if *interceptor == InterceptorId(id)
    ))
}

#[test]
fn test_projectile_shoots_down_interceptor() {
    let mut shooter = class("Shooter", 100.0, 10.0, true);
    shooter.attack_range = 20.0;
    let mut target = class("Target", 100.0, 10.0, false);
    target.attack_range = 20.0;
    let config = manual(
        vec![shooter, target],
        vec![
            place(Team::Blue, "Shooter", 400.0, 450.0),
            place(Team::Red, "Target", 800.0, 450.0),
        ],
    );
    let mut engine = BattleEngine::new(config).unwrap();
    engine.start_battle();

    // A Red drone sits on the line of fire.
    stage_drone(&mut engine, 100, Team::Red, UnitId(2), DVec2::new(450.0, 450.0));

    engine.spawn_projectile(UnitId(1), UnitId(2), 40.0).unwrap();
    for _ in 0..20 {
        engine.update(FIXED_STEP);
    }

    assert!(engine.interceptors().is_empty());
    assert_eq!(engine.unit(UnitId(2)).unwrap().health, 100.0);
    assert!(lost(&engine, 100));
    assert!(engine
        .effects()
        .iter()
        .any(|e| e.color == DamageType::Kinetic.color()));
}

#[test]
fn test_interceptor_expires_after_lifetime() {
    let mut anchor = class("Anchor", 1.0e6, 1.0, false);
    anchor.attack_range = 20.0;
    let config = manual(
        vec![anchor],
        vec![
            place(Team::Blue, "Anchor", 200.0, 450.0),
            place(Team::Red, "Anchor", 1400.0, 450.0),
        ],
    );
    let mut engine = BattleEngine::new(config).unwrap();
    engine.start_battle();
    stage_drone(&mut engine, 100, Team::Blue, UnitId(1), DVec2::new(200.0, 420.0));

    let lifetime_ticks = (INTERCEPTOR_LIFETIME_SECS / FIXED_STEP).round() as usize;
    for _ in 0..lifetime_ticks - 10 {
        engine.update(FIXED_STEP);
    }
    assert_eq!(engine.interceptors().len(), 1);
    assert!(!lost(&engine, 100));

    for _ in 0..20 {
        engine.update(FIXED_STEP);
    }
    assert_eq!(engine.phase(), BattlePhase::Battle);
    assert!(engine.interceptors().is_empty());
    assert!(lost(&engine, 100));
}

#[test]
fn test_orphan_interceptor_expires_without_prey() {
    let config = manual(
        vec![class("A", 100.0, 20.0, false)],
        vec![place(Team::Blue, "A", 400.0, 450.0)],
    );
    let mut engine = BattleEngine::new(config).unwrap();
    engine.start_battle();
    // Parent never existed; almost out of patience already.
    let drone = stage_drone(&mut engine, 100, Team::Blue, UnitId(99), DVec2::new(300.0, 300.0));
    if let Ok(mut staged) = engine.world_mut().get::<&mut Interceptor>(drone) {
        staged.orphan_secs = INTERCEPTOR_ORPHAN_TIMEOUT_SECS - 0.05;
    }

    engine.update(FIXED_STEP);
    let drones = engine.interceptors();
    assert_eq!(drones.len(), 1);
    assert_eq!(drones[0].state, InterceptorState::Attacking);

    // Still inside the victory grace period.
    for _ in 0..10 {
        engine.update(FIXED_STEP);
    }
    assert_eq!(engine.phase(), BattlePhase::Battle);
    assert!(engine.interceptors().is_empty());
    assert!(lost(&engine, 100));
}

// ---- Hit effects ----

fn far_apart() -> BattleEngine {
    let config = manual(
        vec![class("A", 100.0, 20.0, false)],
        vec![
            place(Team::Blue, "A", 400.0, 450.0),
            place(Team::Red, "A", 1000.0, 450.0),
        ],
    );
    BattleEngine::new(config).unwrap()
}

#[test]
fn test_hit_spawns_effect_at_contact() {
    let mut engine = far_apart();
    engine.start_battle();
    engine.spawn_melee_effect(UnitId(1), UnitId(2), 20.0).unwrap();

    let effects = engine.effects();
    assert_eq!(effects.len(), 1);
    // Edge of the victim facing the attacker.
    assert!((effects[0].position - DVec2::new(992.0, 450.0)).length() < 1e-9);
    assert_eq!(effects[0].color, DamageType::Melee.color());
    assert_eq!(effects[0].remaining_fraction, 1.0);
    assert_eq!(effects[0].particles.len(), HIT_EFFECT_PARTICLES);
}

#[test]
fn test_hit_effect_fades_and_is_pruned() {
    let mut engine = far_apart();
    engine.start_battle();
    engine.spawn_melee_effect(UnitId(1), UnitId(2), 20.0).unwrap();

    for _ in 0..10 {
        engine.update(FIXED_STEP);
    }
    let effects = engine.effects();
    assert_eq!(effects.len(), 1);
    assert!(effects[0].remaining_fraction > 0.0 && effects[0].remaining_fraction < 1.0);
    assert!(effects[0].particles.iter().any(|p| p.offset.length() > 0.0));

    let duration_ticks = (HIT_EFFECT_DURATION_SECS / FIXED_STEP).ceil() as usize;
    for _ in 0..duration_ticks {
        engine.update(FIXED_STEP);
    }
    assert!(engine.effects().is_empty());
}

#[test]
fn test_zero_damage_hit_spawns_no_effect() {
    let mut engine = far_apart();
    engine.start_battle();
    assert_eq!(engine.spawn_melee_effect(UnitId(1), UnitId(2), 0.0), Some(0.0));
    assert!(engine.effects().is_empty());
}

// ---- Events & observers ----

#[derive(Default)]
struct Recorder {
    kills: Rc<RefCell<Vec<KillEvent>>>,
    hits: Rc<RefCell<u32>>,
    finished: Rc<RefCell<Option<BattleOutcome>>>,
}

impl BattleObserver for Recorder {
    fn on_hit(&mut self, _hit: &HitEvent) {
        *self.hits.borrow_mut() += 1;
    }

    fn on_kill(&mut self, kill: &KillEvent) {
        self.kills.borrow_mut().push(*kill);
    }

    fn on_finished(&mut self, outcome: BattleOutcome) {
        *self.finished.borrow_mut() = Some(outcome);
    }
}

#[test]
fn test_observer_sees_hits_kills_and_finish() {
    let recorder = Recorder::default();
    let kills = Rc::clone(&recorder.kills);
    let hits = Rc::clone(&recorder.hits);
    let finished = Rc::clone(&recorder.finished);

    let mut engine = duel();
    engine.add_observer(Box::new(recorder));
    engine.start_battle();
    run_until_finished(&mut engine, 600);

    assert_eq!(kills.borrow().len(), 1);
    assert_eq!(kills.borrow()[0].victim, UnitId(2));
    assert_eq!(kills.borrow()[0].killer_team, Team::Blue);
    assert_eq!(*hits.borrow(), 5);
    assert_eq!(*finished.borrow(), Some(BattleOutcome::Victory(Team::Blue)));
}

#[test]
fn test_drain_events() {
    let mut engine = duel();
    engine.start_battle();
    let events = engine.drain_events();
    assert_eq!(events, vec![BattleEvent::BattleStarted]);
    assert!(engine.drain_events().is_empty());
}

// ---- Views & rendering ----

#[derive(Default)]
struct CountingSurface {
    fills: usize,
    strokes: usize,
    lines: usize,
}

impl RenderSurface for CountingSurface {
    fn fill_circle(&mut self, _center: DVec2, _radius: f64, _color: Rgba) {
        self.fills += 1;
    }

    fn stroke_circle(&mut self, _center: DVec2, _radius: f64, _width: f64, _color: Rgba) {
        self.strokes += 1;
    }

    fn line(&mut self, _from: DVec2, _to: DVec2, _width: f64, _color: Rgba) {
        self.lines += 1;
    }
}

#[test]
fn test_render_draws_every_unit() {
    let engine = BattleEngine::new(BattleConfig::default()).unwrap();
    let mut surface = CountingSurface::default();
    engine.render(&mut surface);
    assert_eq!(surface.fills, 2 * DEFAULT_TEAM_SIZE as usize);
    assert_eq!(surface.lines, 4 * DEFAULT_TEAM_SIZE as usize);
    assert_eq!(surface.strokes, 0);
}

#[test]
fn test_team_stats_at_deployment() {
    let engine = BattleEngine::new(BattleConfig::default()).unwrap();
    let stats = engine.team_stats(Team::Red);
    assert_eq!(stats.total, DEFAULT_TEAM_SIZE);
    assert_eq!(stats.alive, DEFAULT_TEAM_SIZE);
    assert_eq!(stats.killed, 0);
    assert_eq!(stats.kills, 0);
    assert!((stats.avg_health_percent - 100.0).abs() < 1e-9);
    assert!((stats.avg_morale_percent - 100.0).abs() < 1e-9);
    assert_eq!(stats.unit_type_breakdown["Trooper"].total, 8);
    assert_eq!(stats.unit_type_breakdown["Drone Carrier"].alive, 1);
}

#[test]
fn test_enemies_and_allies() {
    let engine = duel();
    let enemies = engine.enemies(Team::Blue);
    assert_eq!(enemies.len(), 1);
    assert_eq!(enemies[0].id, UnitId(2));
    assert_eq!(engine.allies(Team::Blue)[0].id, UnitId(1));
}

// ---- Game manager ----

#[test]
fn test_manager_fixed_steps_and_cap() {
    let mut game = GameManager::new(BattleConfig::default()).unwrap();
    assert!(game.start());

    assert_eq!(game.update(FIXED_STEP), 1);
    assert_eq!(game.engine().time().tick, 1);

    // A long stall is capped and the rest dropped.
    assert_eq!(game.update(1.0), MAX_STEPS_PER_FRAME);
    assert_eq!(game.update(FIXED_STEP * 0.5), 0);
}

#[test]
fn test_manager_pause() {
    let mut game = GameManager::new(BattleConfig::default()).unwrap();
    game.start();
    game.pause();
    assert!(game.is_paused());
    assert_eq!(game.update(0.1), 0);
    assert_eq!(game.engine().time().tick, 0);

    assert!(!game.toggle_pause());
    assert!(game.update(0.1) > 0);
}

#[test]
fn test_manager_time_scale() {
    let mut game = GameManager::new(BattleConfig::default()).unwrap();
    game.start();

    game.set_time_scale(10.0);
    assert_eq!(game.time_scale(), MAX_TIME_SCALE);
    game.set_time_scale(-1.0);
    assert_eq!(game.time_scale(), MIN_TIME_SCALE);
    assert_eq!(game.update(0.1), 0);
    game.set_time_scale(f64::NAN);
    assert_eq!(game.time_scale(), MIN_TIME_SCALE);

    game.set_time_scale(2.0);
    assert_eq!(game.update(FIXED_STEP), 2);
}

#[test]
fn test_manager_reset() {
    let mut game = GameManager::new(BattleConfig::default()).unwrap();
    game.start();
    game.update(0.2);
    game.reset();
    assert_eq!(game.engine().phase(), BattlePhase::Setup);
    game.update(0.2);
    assert_eq!(game.engine().time().tick, 0);
}
