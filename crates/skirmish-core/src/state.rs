//! Read-only views of the battle handed to hosts and renderers.

use std::collections::BTreeMap;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::components::Particle;
use crate::enums::*;
use crate::types::{BattleTime, InterceptorId, ProjectileId, Rgba, UnitId};

/// Headline numbers for the HUD.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BattleStats {
    pub blue_alive: u32,
    pub red_alive: u32,
    pub blue_kills: u32,
    pub red_kills: u32,
    /// Elapsed battle time in seconds.
    pub battle_time: f64,
    pub phase: BattlePhase,
    pub outcome: Option<BattleOutcome>,
}

impl BattleStats {
    pub fn winner(&self) -> Option<Team> {
        self.outcome.and_then(BattleOutcome::winner)
    }
}

/// Per-class headcount inside [`TeamStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassBreakdown {
    pub total: u32,
    pub alive: u32,
}

/// Detailed per-team summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamStats {
    pub total: u32,
    pub alive: u32,
    pub interceptor_count: u32,
    /// Units of this team that have fallen.
    pub killed: u32,
    /// Enemy units this team has destroyed.
    pub kills: u32,
    /// Mean health of living units, 0 - 100.
    pub avg_health_percent: f64,
    /// Mean morale of living units, 0 - 100.
    pub avg_morale_percent: f64,
    pub unit_type_breakdown: BTreeMap<String, ClassBreakdown>,
    /// Damage dealt by this team's units (interceptor damage included).
    pub total_damage: f64,
}

/// A unit as seen from outside the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitView {
    pub id: UnitId,
    pub team: Team,
    pub number: u32,
    pub class: String,
    pub position: DVec2,
    pub velocity: DVec2,
    pub radius: f64,
    pub health: f64,
    pub max_health: f64,
    pub morale: f64,
    pub max_morale: f64,
    pub morale_state: MoraleState,
    pub active: bool,
    pub ranged: bool,
    pub attack_range: f64,
    pub target: Option<UnitId>,
    pub kills: u32,
    pub damage_dealt: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileView {
    pub id: ProjectileId,
    pub team: Team,
    pub source: UnitId,
    pub target: Option<UnitId>,
    pub kind: ProjectileKind,
    pub position: DVec2,
    pub velocity: DVec2,
    pub damage: f64,
    pub lifetime_secs: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterceptorView {
    pub id: InterceptorId,
    pub parent: UnitId,
    pub team: Team,
    pub target: Option<UnitId>,
    pub state: InterceptorState,
    pub position: DVec2,
    pub velocity: DVec2,
    pub lifetime_secs: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectView {
    pub position: DVec2,
    pub color: Rgba,
    /// 1.0 at spawn, 0.0 when expired.
    pub remaining_fraction: f64,
    pub particles: Vec<Particle>,
}

/// Complete visible state after a tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BattleSnapshot {
    pub time: BattleTime,
    pub phase: BattlePhase,
    pub outcome: Option<BattleOutcome>,
    pub units: Vec<UnitView>,
    pub projectiles: Vec<ProjectileView>,
    pub interceptors: Vec<InterceptorView>,
    pub effects: Vec<EffectView>,
}
