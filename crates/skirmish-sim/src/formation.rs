//! Unit spawn factory and initial deployment.
//!
//! Formation deployment splits each team's roster by share, orders it so
//! the weakest units hold the front ranks, and lays the block out on the
//! team's side of the arena with a little jitter. Manual deployment places
//! units exactly where the config says, at base stats.

use std::cmp::Ordering;

use glam::DVec2;
use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use skirmish_core::components::*;
use skirmish_core::config::{apportion, BattleConfig, Deployment, RosterEntry, UnitClass};
use skirmish_core::constants::*;
use skirmish_core::enums::{MoraleState, Team};
use skirmish_core::types::{Position, UnitId, Velocity};

/// A unit waiting to be spawned.
#[derive(Debug, Clone)]
pub struct Slot {
    pub team: Team,
    pub class: UnitClass,
    pub position: DVec2,
    /// Multiplier on the class attack range.
    pub range_scale: f64,
}

/// Every unit the configured deployment places, Blue first, in spawn order.
pub fn plan(config: &BattleConfig, rng: &mut ChaCha8Rng) -> Vec<Slot> {
    match &config.deployment {
        Deployment::Formation { blue, red } => {
            let mut slots = formation(config, Team::Blue, blue, rng);
            slots.extend(formation(config, Team::Red, red, rng));
            slots
        }
        Deployment::Manual(placements) => placements
            .iter()
            .filter_map(|p| {
                let class = config.class(&p.class)?;
                Some(Slot {
                    team: p.team,
                    class: class.clone(),
                    position: config.bounds.clamp(p.position),
                    range_scale: 1.0,
                })
            })
            .collect(),
    }
}

/// Formation range multiplier for a class.
pub fn range_scale(class: &UnitClass) -> f64 {
    if class.ranged {
        RANGED_RANGE_SCALE
    } else {
        MELEE_RANGE_SCALE
    }
}

fn formation(
    config: &BattleConfig,
    team: Team,
    roster: &[RosterEntry],
    rng: &mut ChaCha8Rng,
) -> Vec<Slot> {
    let counts = apportion(roster, config.team_size);
    let mut classes: Vec<&UnitClass> = counts
        .iter()
        .filter_map(|(name, count)| config.class(name).map(|c| (c, *count as usize)))
        .flat_map(|(class, count)| std::iter::repeat(class).take(count))
        .collect();
    if classes.is_empty() {
        return Vec::new();
    }

    // Weakest first: index 0 lands in the front rank.
    classes.sort_by(|a, b| {
        a.strength()
            .partial_cmp(&b.strength())
            .unwrap_or(Ordering::Equal)
    });

    let count = classes.len();
    let ranks = ((FORMATION_ROW_FACTOR * count as f64).sqrt().ceil() as usize).max(1);
    let files = count.div_ceil(ranks);
    let bounds = config.bounds;
    let center_y = bounds.center().y;

    classes
        .into_iter()
        .enumerate()
        .map(|(i, class)| {
            let rank = i / files;
            let file = i % files;
            let depth = config.spawn_margin + (ranks - 1 - rank) as f64 * FORMATION_SPACING;
            let x = match team {
                Team::Blue => bounds.min.x + depth,
                Team::Red => bounds.max.x - depth,
            };
            let y = center_y + (file as f64 - (files - 1) as f64 / 2.0) * FORMATION_SPACING;
            let jitter = DVec2::new(
                rng.gen_range(-FORMATION_JITTER..=FORMATION_JITTER),
                rng.gen_range(-FORMATION_JITTER..=FORMATION_JITTER),
            );
            Slot {
                team,
                class: class.clone(),
                position: bounds.clamp(DVec2::new(x, y) + jitter),
                range_scale: range_scale(class),
            }
        })
        .collect()
}

/// Spawn a unit entity with full health and morale and a ready weapon.
pub fn spawn_unit(world: &mut World, id: UnitId, number: u32, slot: &Slot) -> Entity {
    let class = &slot.class;
    world.spawn((
        UnitInfo {
            id,
            team: slot.team,
            number,
            class: class.name.clone(),
            traits: class.traits,
            radius: class.radius,
            speed: class.speed,
        },
        Position(slot.position),
        Velocity::default(),
        Vitals {
            health: class.health,
            max_health: class.health,
            armor: class.armor,
            active: true,
        },
        Morale {
            current: class.morale,
            max: class.morale,
            state: MoraleState::Steady,
            since_damage_secs: 0.0,
        },
        Weapon {
            damage: class.damage,
            range: class.attack_range * slot.range_scale,
            cooldown_secs: class.attack_cooldown_secs,
            timer_secs: 0.0,
            ranged: class.ranged,
            armor_piercing: class.armor_piercing,
        },
        Targeting::default(),
        CombatRecord::default(),
    ))
}
