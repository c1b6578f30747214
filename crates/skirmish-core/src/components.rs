//! ECS components for hecs entities.
//!
//! Components are plain data structs with no methods.
//! Game logic lives in systems, not components.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::{InterceptorId, ProjectileId, Rgba, UnitId};

/// Immutable identity of a unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitInfo {
    pub id: UnitId,
    pub team: Team,
    /// Ordinal within the team, display only.
    pub number: u32,
    /// Name of the unit class this unit was built from.
    pub class: String,
    pub traits: TraitSet,
    /// Collision radius.
    pub radius: f64,
    /// Maximum movement speed (units/s).
    pub speed: f64,
}

/// Health and armor. `active` flips to false once health reaches zero and
/// never flips back.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Vitals {
    pub health: f64,
    pub max_health: f64,
    pub armor: f64,
    pub active: bool,
}

/// Morale pool and its current band.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Morale {
    pub current: f64,
    pub max: f64,
    pub state: MoraleState,
    /// Seconds since the unit last took damage.
    pub since_damage_secs: f64,
}

/// Primary weapon.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Weapon {
    pub damage: f64,
    /// Effective attack range (already scaled at deployment).
    pub range: f64,
    /// Seconds between attacks.
    pub cooldown_secs: f64,
    /// Seconds until the next attack is allowed.
    pub timer_secs: f64,
    pub ranged: bool,
    pub armor_piercing: f64,
}

/// Current target reference. Always re-validated before use.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Targeting {
    pub target: Option<UnitId>,
}

/// Per-unit combat statistics.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CombatRecord {
    pub kills: u32,
    pub damage_dealt: f64,
    pub damage_taken: f64,
}

/// A ranged attack in flight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: ProjectileId,
    pub source: UnitId,
    pub source_team: Team,
    /// Seek hint; collision is against any eligible enemy.
    pub target: Option<UnitId>,
    pub damage: f64,
    pub armor_piercing: f64,
    pub kind: ProjectileKind,
    pub lifetime_secs: f64,
    /// Set on hit or expiry; pruned at end of tick.
    pub consumed: bool,
}

/// Autonomous drone launched by a carrier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interceptor {
    pub id: InterceptorId,
    pub parent: UnitId,
    pub team: Team,
    pub target: Option<UnitId>,
    pub state: InterceptorState,
    pub damage: f64,
    pub attack_range: f64,
    pub cooldown_secs: f64,
    pub timer_secs: f64,
    pub lifetime_secs: f64,
    /// Current angle around whatever it is orbiting.
    pub orbit_angle: f64,
    /// Seconds spent without parent and without target.
    pub orphan_secs: f64,
    /// Set when shot down or expired; pruned at end of tick.
    pub destroyed: bool,
}

/// Particle of a hit effect, relative to the effect origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub offset: DVec2,
    pub velocity: DVec2,
}

/// Visual burst spawned on a successful hit. No gameplay effect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HitEffect {
    pub color: Rgba,
    pub remaining_secs: f64,
    pub duration_secs: f64,
    pub particles: Vec<Particle>,
}

// Position and Velocity (types.rs) double as components.
