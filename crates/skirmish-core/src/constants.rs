//! Simulation constants and tuning parameters.

/// Fixed simulation step used by the game manager (Hz).
pub const TICK_RATE: u32 = 60;

/// Seconds per fixed step.
pub const FIXED_STEP: f64 = 1.0 / TICK_RATE as f64;

/// Upper bound on fixed steps per host frame before excess time is dropped.
pub const MAX_STEPS_PER_FRAME: u32 = 16;

/// Time-scale bounds accepted by the game manager.
pub const MIN_TIME_SCALE: f64 = 0.0;
pub const MAX_TIME_SCALE: f64 = 5.0;

// --- World ---

pub const DEFAULT_WORLD_WIDTH: f64 = 1600.0;
pub const DEFAULT_WORLD_HEIGHT: f64 = 900.0;

/// Distance between a team's formation and its arena edge.
pub const DEFAULT_SPAWN_MARGIN: f64 = 150.0;

pub const DEFAULT_TEAM_SIZE: u32 = 20;

// --- Formation ---

/// Rows = ceil(sqrt(FORMATION_ROW_FACTOR * count)).
pub const FORMATION_ROW_FACTOR: f64 = 0.6;

/// Spacing between formation cells.
pub const FORMATION_SPACING: f64 = 36.0;

/// Maximum positional jitter applied per cell, each axis.
pub const FORMATION_JITTER: f64 = 6.0;

/// Attack range multipliers applied at formation deployment.
pub const RANGED_RANGE_SCALE: f64 = 3.0;
pub const MELEE_RANGE_SCALE: f64 = 1.5;

// --- Victory ---

/// Battle time that must elapse before a victory can be declared.
pub const VICTORY_GRACE_SECS: f64 = 0.5;

// --- Combat ---

/// Morale gained by a unit for each kill.
pub const KILL_MORALE_BONUS: f64 = 15.0;

/// Default armor mitigation constant: damage scales by K / (K + armor).
pub const ARMOR_CONSTANT: f64 = 100.0;

/// Default floor on the mitigated damage fraction.
pub const MIN_DAMAGE_FRACTION: f64 = 0.1;

/// Ranged units at or above this base damage launch interceptors.
pub const CARRIER_RANGED_DAMAGE_THRESHOLD: f64 = 25.0;

// --- Morale ---

/// Morale lost per unit fraction of max health taken.
pub const MORALE_DAMAGE_WEIGHT: f64 = 100.0;

/// Radius within which a friendly death shakes allies.
pub const MORALE_SHOCK_RADIUS: f64 = 120.0;

/// Morale lost by allies near a friendly death.
pub const MORALE_ALLY_DEATH_PENALTY: f64 = 8.0;

/// Seconds without damage before morale starts to recover.
pub const MORALE_RECOVERY_DELAY_SECS: f64 = 4.0;

/// Morale regained per second once recovering.
pub const MORALE_RECOVERY_RATE: f64 = 5.0;

/// Hysteresis thresholds as fractions of max morale.
pub const MORALE_SHAKEN_BELOW: f64 = 0.30;
pub const MORALE_STEADY_ABOVE: f64 = 0.40;
pub const MORALE_RALLY_ABOVE: f64 = 0.50;

// --- AI ---

/// Radius inside which enemies are eligible targets.
pub const AI_DETECTION_RADIUS: f64 = 1200.0;

/// A target beyond this distance is dropped.
pub const AI_MAX_ENGAGEMENT_RADIUS: f64 = 1500.0;

/// Units stop advancing at this fraction of their attack range.
pub const AI_STANDOFF_FRACTION: f64 = 0.85;

/// Ranged units back off when closer than this fraction of range.
pub const AI_KITE_FRACTION: f64 = 0.35;

/// Target scoring weights (in detection-radius units).
pub const AI_LOW_HEALTH_WEIGHT: f64 = 0.15;
pub const AI_THREAT_WEIGHT: f64 = 0.10;

/// Strength of the push away from overlapping allies.
pub const AI_SEPARATION_WEIGHT: f64 = 0.6;

// --- Projectiles ---

/// Projectile lifetime in seconds.
pub const PROJECTILE_LIFETIME_SECS: f64 = 3.0;

/// Projectile collision radius.
pub const PROJECTILE_RADIUS: f64 = 2.0;

pub const BULLET_SPEED: f64 = 600.0;
pub const LASER_SPEED: f64 = 900.0;
pub const MISSILE_SPEED: f64 = 350.0;
pub const PLASMA_SPEED: f64 = 450.0;

/// Maximum missile turn rate (rad/s) when seeking its hinted target.
pub const MISSILE_TURN_RATE: f64 = 2.5;

// --- Interceptors ---

/// Seconds between interceptor launches per carrier.
pub const INTERCEPTOR_SPAWN_INTERVAL_SECS: f64 = 2.0;

/// Launch offset from the carrier center.
pub const INTERCEPTOR_SPAWN_OFFSET: f64 = 20.0;

pub const INTERCEPTOR_SPEED: f64 = 160.0;
pub const INTERCEPTOR_DAMAGE: f64 = 3.0;
pub const INTERCEPTOR_ARMOR_PIERCING: f64 = 0.0;
pub const INTERCEPTOR_ATTACK_RANGE: f64 = 60.0;
pub const INTERCEPTOR_COOLDOWN_SECS: f64 = 0.6;
pub const INTERCEPTOR_LIFETIME_SECS: f64 = 25.0;
pub const INTERCEPTOR_RADIUS: f64 = 4.0;

/// Enemies inside this radius pull an orbiting interceptor into attack.
pub const INTERCEPTOR_DETECTION_RADIUS: f64 = 400.0;

/// Inside this distance an attacking interceptor circles its target.
pub const INTERCEPTOR_INNER_RADIUS: f64 = 45.0;

/// Orbit radius around the parent carrier.
pub const INTERCEPTOR_ORBIT_RADIUS: f64 = 35.0;

/// Angular speed while orbiting (rad/s).
pub const INTERCEPTOR_ORBIT_RATE: f64 = 2.0;

/// An orphaned interceptor without a target for this long self-destructs.
pub const INTERCEPTOR_ORPHAN_TIMEOUT_SECS: f64 = 5.0;

// --- Effects ---

pub const HIT_EFFECT_DURATION_SECS: f64 = 0.35;
pub const HIT_EFFECT_PARTICLES: usize = 6;
pub const HIT_EFFECT_PARTICLE_SPEED: f64 = 60.0;
