//! Carrier launch system: each living carrier launches one interceptor every
//! `INTERCEPTOR_SPAWN_INTERVAL_SECS`.

use std::collections::BTreeMap;

use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use skirmish_core::components::{Interceptor, UnitInfo, Vitals};
use skirmish_core::constants::*;
use skirmish_core::enums::{InterceptorState, Team};
use skirmish_core::events::BattleEvent;
use skirmish_core::types::{Bounds, InterceptorId, Position, UnitId, Velocity};
use skirmish_core::vector;

use crate::ledger::BattleLedger;

/// Launch timers of registered carriers.
#[derive(Debug, Clone, Default)]
pub struct CarrierSchedule {
    timers: BTreeMap<UnitId, f64>,
}

impl CarrierSchedule {
    pub fn register(&mut self, carrier: UnitId) {
        self.timers.entry(carrier).or_insert(0.0);
    }

    pub fn is_registered(&self, carrier: UnitId) -> bool {
        self.timers.contains_key(&carrier)
    }

    pub fn clear(&mut self) {
        self.timers.clear();
    }
}

/// Advance launch timers and launch any interceptors that are due. Carriers
/// that are gone or down are dropped from the schedule.
#[allow(clippy::too_many_arguments)]
pub fn run(
    world: &mut World,
    units: &BTreeMap<UnitId, Entity>,
    schedule: &mut CarrierSchedule,
    rng: &mut ChaCha8Rng,
    next_interceptor_id: &mut u32,
    ledger: &mut BattleLedger,
    bounds: &Bounds,
    dt: f64,
) {
    let mut launches: Vec<(UnitId, Team, glam::DVec2)> = Vec::new();

    schedule.timers.retain(|&carrier, timer| {
        let Some(&entity) = units.get(&carrier) else {
            return false;
        };
        let (Ok(info), Ok(vitals), Ok(pos)) = (
            world.get::<&UnitInfo>(entity),
            world.get::<&Vitals>(entity),
            world.get::<&Position>(entity),
        ) else {
            return false;
        };
        if !vitals.active {
            return false;
        }

        *timer += dt;
        // Tolerate float drift from summing fixed steps.
        if *timer + 1e-9 >= INTERCEPTOR_SPAWN_INTERVAL_SECS {
            *timer = 0.0;
            launches.push((carrier, info.team, pos.0));
        }
        true
    });

    for (parent, team, origin) in launches {
        let heading = rng.gen_range(0.0..std::f64::consts::TAU);
        let position = bounds.clamp(origin + vector::from_angle(heading) * INTERCEPTOR_SPAWN_OFFSET);
        let id = InterceptorId(*next_interceptor_id);
        *next_interceptor_id += 1;

        world.spawn((
            Position(position),
            Velocity::default(),
            Interceptor {
                id,
                parent,
                team,
                target: None,
                state: InterceptorState::Orbiting,
                damage: INTERCEPTOR_DAMAGE,
                attack_range: INTERCEPTOR_ATTACK_RANGE,
                cooldown_secs: INTERCEPTOR_COOLDOWN_SECS,
                timer_secs: 0.0,
                lifetime_secs: INTERCEPTOR_LIFETIME_SECS,
                orbit_angle: heading,
                orphan_secs: 0.0,
                destroyed: false,
            },
        ));

        debug!(interceptor = id.0, parent = %parent, "interceptor launched");
        ledger.push(BattleEvent::InterceptorLaunched {
            interceptor: id,
            parent,
        });
    }
}
