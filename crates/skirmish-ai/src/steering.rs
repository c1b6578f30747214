//! Unit movement intents.
//!
//! Seek / stand-off / kite / flee, plus separation from overlapping allies.
//! Direction toward a coincident point is the zero vector.

use glam::DVec2;

use skirmish_core::config::AiConfig;
use skirmish_core::enums::MoraleState;
use skirmish_core::vector;

use crate::Combatant;

/// Everything needed to steer one unit.
pub struct SteeringContext<'a> {
    pub unit: &'a Combatant,
    pub attack_range: f64,
    pub ranged: bool,
    pub morale: MoraleState,
    /// Validated target, if the unit has one.
    pub target: Option<&'a Combatant>,
    /// Where to march when there is no target (usually the enemy centroid).
    pub rally_point: Option<DVec2>,
    pub units: &'a [Combatant],
}

/// Desired velocity for the coming tick.
pub fn steer(ctx: &SteeringContext, ai: &AiConfig) -> DVec2 {
    let unit = ctx.unit;
    let desired = match (ctx.morale, ctx.target) {
        (MoraleState::Routing, Some(threat)) => flee(unit, threat.position),
        (MoraleState::Routing, None) => match ctx.rally_point {
            Some(enemies) => flee(unit, enemies),
            None => DVec2::ZERO,
        },
        (_, Some(target)) => engage(unit, target, ctx.attack_range, ctx.ranged, ai),
        (_, None) => match ctx.rally_point {
            Some(point) => vector::direction(unit.position, point) * unit.speed,
            None => DVec2::ZERO,
        },
    };

    let push = separation(unit, ctx.units) * unit.speed * ai.separation_weight;
    vector::clamp_length(desired + push, unit.speed)
}

/// Close to stand-off distance, hold inside it, back off if a ranged unit is
/// crowded.
fn engage(
    unit: &Combatant,
    target: &Combatant,
    attack_range: f64,
    ranged: bool,
    ai: &AiConfig,
) -> DVec2 {
    let distance = unit.position.distance(target.position);
    let toward = vector::direction(unit.position, target.position);
    let contact = unit.radius + target.radius;
    let hold_at = (attack_range * ai.standoff_fraction).max(contact);

    if ranged && distance < attack_range * ai.kite_fraction {
        -toward * unit.speed * 0.5
    } else if distance > hold_at {
        toward * unit.speed
    } else {
        DVec2::ZERO
    }
}

fn flee(unit: &Combatant, threat: DVec2) -> DVec2 {
    vector::direction(threat, unit.position) * unit.speed
}

/// Sum of pushes away from allies whose collision circles overlap this unit,
/// each scaled by overlap depth.
fn separation(unit: &Combatant, units: &[Combatant]) -> DVec2 {
    units
        .iter()
        .filter(|o| o.active && o.team == unit.team && o.id != unit.id)
        .fold(DVec2::ZERO, |push, other| {
            let reach = unit.radius + other.radius;
            let distance = unit.position.distance(other.position);
            if distance >= reach || reach <= 0.0 {
                return push;
            }
            push + vector::direction(other.position, unit.position) * ((reach - distance) / reach)
        })
}
