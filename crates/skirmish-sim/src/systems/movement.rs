//! Unit clocks and kinematic integration.
//!
//! Ticks weapon cooldowns and morale recovery, then moves every active unit
//! by `velocity * dt`, clamped to the arena. Fallen units stop where they are.

use hecs::World;

use skirmish_ai::morale::next_state;
use skirmish_core::components::*;
use skirmish_core::constants::*;
use skirmish_core::events::BattleEvent;
use skirmish_core::types::{Bounds, Position, Velocity};

use crate::ledger::BattleLedger;

pub fn run(world: &mut World, bounds: &Bounds, dt: f64, ledger: &mut BattleLedger) {
    let mut rallied = Vec::new();

    for (_entity, (info, vitals, weapon, morale, pos, vel)) in world.query_mut::<(
        &UnitInfo,
        &Vitals,
        &mut Weapon,
        &mut Morale,
        &mut Position,
        &mut Velocity,
    )>() {
        if !vitals.active {
            vel.0 = glam::DVec2::ZERO;
            continue;
        }

        weapon.timer_secs = (weapon.timer_secs - dt).max(0.0);

        morale.since_damage_secs += dt;
        if morale.since_damage_secs >= MORALE_RECOVERY_DELAY_SECS && morale.current < morale.max {
            morale.current = (morale.current + MORALE_RECOVERY_RATE * dt).min(morale.max);
            let next = next_state(morale.state, morale.current, morale.max);
            if next != morale.state {
                morale.state = next;
                rallied.push((info.id, next));
            }
        }

        pos.0 = bounds.clamp(pos.0 + vel.0 * dt);
    }

    rallied.sort_by_key(|(id, _)| *id);
    for (unit, state) in rallied {
        ledger.push(BattleEvent::MoraleChanged { unit, state });
    }
}
