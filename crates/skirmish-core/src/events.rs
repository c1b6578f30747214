//! Events emitted by the simulation for hosts, renderers and tests.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::{InterceptorId, UnitId};

/// A successful damage application.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitEvent {
    pub target: UnitId,
    pub source: UnitId,
    pub damage_type: DamageType,
    /// Health actually removed (overkill excluded).
    pub damage: f64,
    pub position: DVec2,
}

/// A unit reduced to zero health.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KillEvent {
    pub victim: UnitId,
    pub victim_team: Team,
    pub killer: UnitId,
    pub killer_team: Team,
    pub battle_time: f64,
}

/// Everything the engine reports, in emission order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BattleEvent {
    BattleStarted,
    Hit(HitEvent),
    Kill(KillEvent),
    InterceptorLaunched {
        interceptor: InterceptorId,
        parent: UnitId,
    },
    InterceptorLost {
        interceptor: InterceptorId,
        parent: UnitId,
    },
    MoraleChanged {
        unit: UnitId,
        state: MoraleState,
    },
    BattleFinished {
        outcome: BattleOutcome,
    },
}

/// Hook for hosts that want callbacks instead of polling `drain_events`.
/// All methods default to no-ops.
pub trait BattleObserver {
    fn on_hit(&mut self, _hit: &HitEvent) {}

    fn on_kill(&mut self, _kill: &KillEvent) {}

    fn on_finished(&mut self, _outcome: BattleOutcome) {}
}
