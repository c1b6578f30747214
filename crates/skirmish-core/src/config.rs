//! Static battle configuration supplied by the host at construction time.
//!
//! The engine never reads files; hosts deserialize these structs from
//! whatever balance format they use and hand them over.

use glam::DVec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::*;
use crate::enums::{Team, TraitSet, UnitTrait};
use crate::types::Bounds;

/// Stat table for one unit class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitClass {
    pub name: String,
    pub health: f64,
    #[serde(default)]
    pub armor: f64,
    pub damage: f64,
    #[serde(default)]
    pub armor_piercing: f64,
    pub speed: f64,
    /// Base attack range before deployment scaling.
    pub attack_range: f64,
    pub attack_cooldown_secs: f64,
    pub ranged: bool,
    pub radius: f64,
    #[serde(default = "default_morale")]
    pub morale: f64,
    #[serde(default)]
    pub traits: TraitSet,
}

fn default_morale() -> f64 {
    100.0
}

impl UnitClass {
    /// Ranking used to push strong units toward the rear ranks.
    pub fn strength(&self) -> f64 {
        self.health * self.damage / self.attack_cooldown_secs.max(f64::EPSILON)
    }

    /// Explicit carrier trait, or a ranged platform with a heavy weapon.
    pub fn is_carrier(&self) -> bool {
        self.traits.contains(UnitTrait::Carrier)
            || (self.ranged && self.damage >= CARRIER_RANGED_DAMAGE_THRESHOLD)
    }
}

/// Share of a team's formation given to one class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub class: String,
    pub share: u32,
}

/// One hand-placed unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub team: Team,
    pub class: String,
    pub position: DVec2,
}

/// How the initial forces are laid out on `reset()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Deployment {
    /// `team_size` units per side split across the roster by share, arranged
    /// in formation blocks with range scaling and jitter.
    Formation {
        blue: Vec<RosterEntry>,
        red: Vec<RosterEntry>,
    },
    /// Exact placements with base stats.
    Manual(Vec<Placement>),
}

/// Target scoring and steering knobs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AiConfig {
    pub detection_radius: f64,
    pub max_engagement_radius: f64,
    pub standoff_fraction: f64,
    pub kite_fraction: f64,
    pub low_health_weight: f64,
    pub threat_weight: f64,
    pub separation_weight: f64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            detection_radius: AI_DETECTION_RADIUS,
            max_engagement_radius: AI_MAX_ENGAGEMENT_RADIUS,
            standoff_fraction: AI_STANDOFF_FRACTION,
            kite_fraction: AI_KITE_FRACTION,
            low_health_weight: AI_LOW_HEALTH_WEIGHT,
            threat_weight: AI_THREAT_WEIGHT,
            separation_weight: AI_SEPARATION_WEIGHT,
        }
    }
}

/// Armor mitigation curve.
///
/// `effective_armor = max(armor - piercing, 0)`,
/// `damage = raw * max(K / (K + effective_armor), min_fraction)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MitigationPolicy {
    pub armor_constant: f64,
    pub min_fraction: f64,
}

impl Default for MitigationPolicy {
    fn default() -> Self {
        Self {
            armor_constant: ARMOR_CONSTANT,
            min_fraction: MIN_DAMAGE_FRACTION,
        }
    }
}

impl MitigationPolicy {
    /// Damage left after armor. Never negative, non-decreasing in `armor_piercing`.
    pub fn mitigate(&self, raw: f64, armor: f64, armor_piercing: f64) -> f64 {
        if raw.is_nan() || raw <= 0.0 {
            return 0.0;
        }
        let effective_armor = (armor - armor_piercing.max(0.0)).max(0.0);
        let fraction = self.armor_constant / (self.armor_constant + effective_armor);
        raw * fraction.max(self.min_fraction).min(1.0)
    }
}

/// Everything needed to build a battle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleConfig {
    /// RNG seed for jitter, launch offsets and particles.
    pub seed: u64,
    /// Units per side for formation deployment.
    pub team_size: u32,
    pub bounds: Bounds,
    pub spawn_margin: f64,
    pub classes: Vec<UnitClass>,
    pub deployment: Deployment,
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub mitigation: MitigationPolicy,
}

impl Default for BattleConfig {
    fn default() -> Self {
        let roster = default_roster();
        Self {
            seed: 42,
            team_size: DEFAULT_TEAM_SIZE,
            bounds: Bounds::default(),
            spawn_margin: DEFAULT_SPAWN_MARGIN,
            classes: default_classes(),
            deployment: Deployment::Formation {
                blue: roster.clone(),
                red: roster,
            },
            ai: AiConfig::default(),
            mitigation: MitigationPolicy::default(),
        }
    }
}

/// Rejected configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("unknown unit class: {0}")]
    UnknownClass(String),

    #[error("unit class defined twice: {0}")]
    DuplicateClass(String),

    #[error("unit class {class}: invalid {stat} {value}")]
    InvalidStat {
        class: String,
        stat: &'static str,
        value: f64,
    },

    #[error("world bounds must have positive area, got {width} x {height}")]
    InvalidBounds { width: f64, height: f64 },

    #[error("spawn margin {margin} does not fit a world {width} wide")]
    SpawnMarginTooLarge { margin: f64, width: f64 },

    #[error("{0:?} roster has no shares")]
    EmptyRoster(Team),
}

impl BattleConfig {
    pub fn class(&self, name: &str) -> Option<&UnitClass> {
        self.classes.iter().find(|c| c.name == name)
    }

    /// Check every invariant the engine relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (width, height) = (self.bounds.width(), self.bounds.height());
        if width.is_nan() || height.is_nan() || width <= 0.0 || height <= 0.0 {
            return Err(ConfigError::InvalidBounds { width, height });
        }
        if self.spawn_margin.is_nan() || self.spawn_margin < 0.0 || self.spawn_margin * 2.0 >= width {
            return Err(ConfigError::SpawnMarginTooLarge {
                margin: self.spawn_margin,
                width,
            });
        }

        for (i, class) in self.classes.iter().enumerate() {
            if self.classes[..i].iter().any(|c| c.name == class.name) {
                return Err(ConfigError::DuplicateClass(class.name.clone()));
            }
            validate_class(class)?;
        }

        match &self.deployment {
            Deployment::Formation { blue, red } => {
                for (team, roster) in [(Team::Blue, blue), (Team::Red, red)] {
                    if self.team_size > 0 && roster.iter().all(|e| e.share == 0) {
                        return Err(ConfigError::EmptyRoster(team));
                    }
                    for entry in roster {
                        self.require_class(&entry.class)?;
                    }
                }
            }
            Deployment::Manual(placements) => {
                for placement in placements {
                    self.require_class(&placement.class)?;
                }
            }
        }
        Ok(())
    }

    fn require_class(&self, name: &str) -> Result<&UnitClass, ConfigError> {
        self.class(name)
            .ok_or_else(|| ConfigError::UnknownClass(name.to_string()))
    }
}

fn validate_class(class: &UnitClass) -> Result<(), ConfigError> {
    let positive = [
        ("health", class.health),
        ("speed", class.speed),
        ("attack_range", class.attack_range),
        ("attack_cooldown_secs", class.attack_cooldown_secs),
        ("radius", class.radius),
        ("morale", class.morale),
    ];
    for (stat, value) in positive {
        if value.is_nan() || value <= 0.0 {
            return Err(ConfigError::InvalidStat {
                class: class.name.clone(),
                stat,
                value,
            });
        }
    }
    let non_negative = [
        ("damage", class.damage),
        ("armor", class.armor),
        ("armor_piercing", class.armor_piercing),
    ];
    for (stat, value) in non_negative {
        if value.is_nan() || value < 0.0 {
            return Err(ConfigError::InvalidStat {
                class: class.name.clone(),
                stat,
                value,
            });
        }
    }
    Ok(())
}

/// Split `total` units across roster entries by share (largest remainder).
/// Entries keep roster order; zero-share entries receive nothing.
pub fn apportion(roster: &[RosterEntry], total: u32) -> Vec<(String, u32)> {
    let share_sum: u64 = roster.iter().map(|e| e.share as u64).sum();
    if share_sum == 0 {
        return Vec::new();
    }

    let mut counts: Vec<(String, u32, u64)> = roster
        .iter()
        .map(|e| {
            let exact = total as u64 * e.share as u64;
            (
                e.class.clone(),
                (exact / share_sum) as u32,
                exact % share_sum,
            )
        })
        .collect();

    let assigned: u32 = counts.iter().map(|(_, n, _)| *n).sum();
    let mut order: Vec<usize> = (0..counts.len()).collect();
    order.sort_by(|&a, &b| counts[b].2.cmp(&counts[a].2).then(a.cmp(&b)));
    for &i in order.iter().take((total - assigned) as usize) {
        counts[i].1 += 1;
    }

    counts
        .into_iter()
        .filter(|(_, n, _)| *n > 0)
        .map(|(class, n, _)| (class, n))
        .collect()
}

/// Reference stat tables.
pub fn default_classes() -> Vec<UnitClass> {
    vec![
        UnitClass {
            name: "Trooper".into(),
            health: 100.0,
            armor: 10.0,
            damage: 12.0,
            armor_piercing: 2.0,
            speed: 60.0,
            attack_range: 20.0,
            attack_cooldown_secs: 1.0,
            ranged: false,
            radius: 8.0,
            morale: 100.0,
            traits: TraitSet::EMPTY,
        },
        UnitClass {
            name: "Rifleman".into(),
            health: 70.0,
            armor: 5.0,
            damage: 9.0,
            armor_piercing: 4.0,
            speed: 55.0,
            attack_range: 90.0,
            attack_cooldown_secs: 1.2,
            ranged: true,
            radius: 7.0,
            morale: 90.0,
            traits: TraitSet::EMPTY,
        },
        UnitClass {
            name: "Lancer".into(),
            health: 80.0,
            armor: 8.0,
            damage: 14.0,
            armor_piercing: 12.0,
            speed: 50.0,
            attack_range: 110.0,
            attack_cooldown_secs: 1.5,
            ranged: true,
            radius: 8.0,
            morale: 100.0,
            traits: TraitSet::EMPTY.with(UnitTrait::Advanced),
        },
        UnitClass {
            name: "Juggernaut".into(),
            health: 260.0,
            armor: 35.0,
            damage: 30.0,
            armor_piercing: 15.0,
            speed: 35.0,
            attack_range: 24.0,
            attack_cooldown_secs: 1.8,
            ranged: false,
            radius: 14.0,
            morale: 140.0,
            traits: TraitSet::EMPTY.with(UnitTrait::Massive),
        },
        UnitClass {
            name: "Siege Walker".into(),
            health: 180.0,
            armor: 25.0,
            damage: 28.0,
            armor_piercing: 20.0,
            speed: 30.0,
            attack_range: 140.0,
            attack_cooldown_secs: 2.5,
            ranged: true,
            radius: 13.0,
            morale: 120.0,
            traits: TraitSet::EMPTY.with(UnitTrait::Massive),
        },
        UnitClass {
            name: "Drone Carrier".into(),
            health: 220.0,
            armor: 20.0,
            damage: 18.0,
            armor_piercing: 10.0,
            speed: 28.0,
            attack_range: 120.0,
            attack_cooldown_secs: 2.0,
            ranged: true,
            radius: 15.0,
            morale: 120.0,
            traits: TraitSet::EMPTY
                .with(UnitTrait::Massive)
                .with(UnitTrait::Advanced)
                .with(UnitTrait::Carrier),
        },
    ]
}

/// Reference formation composition.
pub fn default_roster() -> Vec<RosterEntry> {
    [
        ("Trooper", 8),
        ("Rifleman", 6),
        ("Lancer", 3),
        ("Juggernaut", 1),
        ("Siege Walker", 1),
        ("Drone Carrier", 1),
    ]
    .into_iter()
    .map(|(class, share)| RosterEntry {
        class: class.into(),
        share,
    })
    .collect()
}
