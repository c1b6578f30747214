//! Projectile profiles, lead prediction and missile homing.

use glam::DVec2;

use skirmish_core::constants::*;
use skirmish_core::enums::{ProjectileKind, TraitSet, UnitTrait};
use skirmish_core::vector;

/// Projectile fired by a unit with these traits.
pub fn projectile_kind(traits: TraitSet) -> ProjectileKind {
    match (
        traits.contains(UnitTrait::Massive),
        traits.contains(UnitTrait::Advanced),
    ) {
        (false, false) => ProjectileKind::Bullet,
        (false, true) => ProjectileKind::Laser,
        (true, false) => ProjectileKind::Missile,
        (true, true) => ProjectileKind::Plasma,
    }
}

/// Muzzle speed for a projectile kind (world units/s).
pub fn projectile_speed(kind: ProjectileKind) -> f64 {
    match kind {
        ProjectileKind::Bullet => BULLET_SPEED,
        ProjectileKind::Laser => LASER_SPEED,
        ProjectileKind::Missile => MISSILE_SPEED,
        ProjectileKind::Plasma => PLASMA_SPEED,
    }
}

/// First-order lead: where the target will be after the projectile covers
/// the current distance.
pub fn lead_point(shooter: DVec2, target: DVec2, target_velocity: DVec2, speed: f64) -> DVec2 {
    if speed <= 0.0 {
        return target;
    }
    let time_of_flight = shooter.distance(target) / speed;
    target + target_velocity * time_of_flight
}

/// Initial velocity for a projectile of `kind` fired at a moving target.
/// Zero when the lead point coincides with the muzzle.
pub fn launch_velocity(
    shooter: DVec2,
    target: DVec2,
    target_velocity: DVec2,
    kind: ProjectileKind,
) -> DVec2 {
    let speed = projectile_speed(kind);
    let aim = lead_point(shooter, target, target_velocity, speed);
    vector::direction(shooter, aim) * speed
}

/// Turn a missile toward its target, limited by the turn rate. Speed is kept.
pub fn home(velocity: DVec2, position: DVec2, target: DVec2, dt: f64) -> DVec2 {
    vector::turn_toward(velocity, target - position, MISSILE_TURN_RATE * dt)
}
