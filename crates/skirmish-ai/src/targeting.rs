//! Target selection.
//!
//! Deterministic for a fixed input: scores depend only on the snapshot, and
//! ties fall back to distance, then to the lower unit id.

use std::cmp::Ordering;

use glam::DVec2;

use skirmish_core::config::AiConfig;
use skirmish_core::enums::Team;
use skirmish_core::types::UnitId;

use crate::Combatant;

/// Whether `unit` must pick a new target this tick.
///
/// `current` is the looked-up target, `None` if the reference is dangling.
pub fn needs_retarget(unit: &Combatant, current: Option<&Combatant>, ai: &AiConfig) -> bool {
    match current {
        None => true,
        Some(target) => {
            !target.is_enemy_of(unit.team)
                || unit.position.distance(target.position) > ai.max_engagement_radius
        }
    }
}

/// Pick the best eligible enemy for `unit`, if any is inside the detection radius.
///
/// Score (lower is better):
/// `distance - R * (low_health_weight * missing_health + threat_weight * relative_threat)`
/// where `R` is the detection radius.
pub fn select_target(unit: &Combatant, units: &[Combatant], ai: &AiConfig) -> Option<UnitId> {
    let eligible: Vec<(&Combatant, f64)> = units
        .iter()
        .filter(|c| c.is_enemy_of(unit.team))
        .map(|c| (c, unit.position.distance(c.position)))
        .filter(|(_, d)| *d <= ai.detection_radius)
        .collect();

    let max_threat = eligible
        .iter()
        .map(|(c, _)| c.threat)
        .fold(0.0_f64, f64::max);

    eligible
        .into_iter()
        .map(|(c, distance)| {
            let relative_threat = if max_threat > 0.0 {
                c.threat / max_threat
            } else {
                0.0
            };
            let missing_health = (1.0 - c.health_fraction).clamp(0.0, 1.0);
            let bonus = ai.low_health_weight * missing_health + ai.threat_weight * relative_threat;
            (c.id, distance - ai.detection_radius * bonus, distance)
        })
        .min_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(Ordering::Equal)
                .then(a.2.partial_cmp(&b.2).unwrap_or(Ordering::Equal))
                .then(a.0.cmp(&b.0))
        })
        .map(|(id, _, _)| id)
}

/// Nearest active enemy of `team` around `from`, optionally limited to `radius`.
pub fn nearest_enemy<'a>(
    from: DVec2,
    team: Team,
    units: &'a [Combatant],
    radius: Option<f64>,
) -> Option<&'a Combatant> {
    units
        .iter()
        .filter(|c| c.is_enemy_of(team))
        .map(|c| (c, from.distance(c.position)))
        .filter(|(_, d)| radius.map_or(true, |r| *d <= r))
        .min_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(Ordering::Equal)
                .then(a.0.id.cmp(&b.0.id))
        })
        .map(|(c, _)| c)
}

/// Mean position of the living enemies of `team`.
pub fn enemy_centroid(team: Team, units: &[Combatant]) -> Option<DVec2> {
    let (sum, count) = units
        .iter()
        .filter(|c| c.is_enemy_of(team))
        .fold((DVec2::ZERO, 0usize), |(sum, n), c| (sum + c.position, n + 1));
    (count > 0).then(|| sum / count as f64)
}
