//! Decision layer for SKIRMISH.
//!
//! Pure functions over plain data: target selection, steering, morale bands
//! and the interceptor state machine. No ECS dependency, so every decision
//! can be exercised in isolation.

pub mod interceptor;
pub mod morale;
pub mod steering;
pub mod targeting;

pub use skirmish_core as core;

use glam::DVec2;

use skirmish_core::enums::Team;
use skirmish_core::types::UnitId;

/// Start-of-tick snapshot of one unit, as the AI sees it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Combatant {
    pub id: UnitId,
    pub team: Team,
    pub position: DVec2,
    pub velocity: DVec2,
    pub radius: f64,
    pub speed: f64,
    /// Current health over max health, 0.0 - 1.0.
    pub health_fraction: f64,
    /// Damage per second the unit can put out.
    pub threat: f64,
    pub active: bool,
}

impl Combatant {
    /// Active and on the other side.
    pub fn is_enemy_of(&self, team: Team) -> bool {
        self.active && self.team != team
    }

    /// Whether `target` is within `range` of this unit, edge to edge.
    pub fn in_reach(&self, target: &Combatant, range: f64) -> bool {
        in_reach(self.position, self.radius, target, range)
    }
}

/// Attack ranges are measured between collision circles, not centers.
pub fn in_reach(position: DVec2, radius: f64, target: &Combatant, range: f64) -> bool {
    position.distance(target.position) - radius - target.radius <= range
}

/// Look up an active combatant by id.
pub fn find_active(units: &[Combatant], id: UnitId) -> Option<&Combatant> {
    units.iter().find(|u| u.id == id && u.active)
}
