//! Morale bands with hysteresis.
//!
//! A unit breaks when morale hits zero, and only stops routing once it
//! climbs back above the rally threshold, so it cannot flicker between states.

use skirmish_core::constants::*;
use skirmish_core::enums::MoraleState;

/// Band for a unit currently in `state` holding `current` of `max` morale.
pub fn next_state(state: MoraleState, current: f64, max: f64) -> MoraleState {
    if max <= 0.0 || current <= 0.0 {
        return MoraleState::Routing;
    }
    let fraction = current / max;

    match state {
        MoraleState::Steady if fraction < MORALE_SHAKEN_BELOW => MoraleState::Shaken,
        MoraleState::Shaken if fraction > MORALE_STEADY_ABOVE => MoraleState::Steady,
        MoraleState::Routing if fraction > MORALE_RALLY_ABOVE => MoraleState::Shaken,
        unchanged => unchanged,
    }
}

/// Morale lost for taking `damage` out of `max_health`.
pub fn damage_penalty(damage: f64, max_health: f64) -> f64 {
    if max_health <= 0.0 {
        return 0.0;
    }
    (damage / max_health).max(0.0) * MORALE_DAMAGE_WEIGHT
}
