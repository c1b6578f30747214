//! Interceptor drone finite state machine.
//!
//! Pure functions that compute the state, steering and firing decision for a
//! single drone from a snapshot of the battlefield. No ECS dependency.

use glam::DVec2;

use skirmish_core::constants::*;
use skirmish_core::enums::{InterceptorState, Team};
use skirmish_core::types::UnitId;
use skirmish_core::vector;

use crate::targeting::nearest_enemy;
use crate::{find_active, in_reach, Combatant};

/// Input to the interceptor FSM for a single drone.
pub struct InterceptorContext<'a> {
    pub state: InterceptorState,
    pub position: DVec2,
    pub team: Team,
    pub target: Option<UnitId>,
    /// The carrier, `None` once it is dead or gone.
    pub parent: Option<&'a Combatant>,
    pub orbit_angle: f64,
    pub orphan_secs: f64,
    pub timer_secs: f64,
    pub cooldown_secs: f64,
    pub attack_range: f64,
    pub speed: f64,
    pub dt: f64,
    pub units: &'a [Combatant],
}

/// Output from the interceptor FSM.
#[derive(Debug, Clone, PartialEq)]
pub struct InterceptorUpdate {
    pub state: InterceptorState,
    pub target: Option<UnitId>,
    pub velocity: DVec2,
    pub orbit_angle: f64,
    pub orphan_secs: f64,
    pub timer_secs: f64,
    /// Strike this unit this tick.
    pub fire_at: Option<UnitId>,
    /// Orphaned for too long without prey.
    pub expired: bool,
}

/// Evaluate the FSM for one drone.
pub fn evaluate(ctx: &InterceptorContext) -> InterceptorUpdate {
    let orbit_angle = ctx.orbit_angle + INTERCEPTOR_ORBIT_RATE * ctx.dt;
    let timer_secs = (ctx.timer_secs - ctx.dt).max(0.0);
    let target = valid_target(ctx);

    let mut update = InterceptorUpdate {
        state: ctx.state,
        target: target.map(|t| t.id),
        velocity: DVec2::ZERO,
        orbit_angle,
        orphan_secs: 0.0,
        timer_secs,
        fire_at: None,
        expired: false,
    };

    let Some(parent) = ctx.parent else {
        return evaluate_orphan(ctx, target, update);
    };

    let target = target.or_else(|| {
        nearest_enemy(
            ctx.position,
            ctx.team,
            ctx.units,
            Some(INTERCEPTOR_DETECTION_RADIUS),
        )
    });

    match target {
        Some(prey) => attack(ctx, prey, &mut update),
        None if ctx.state == InterceptorState::Orbiting => {
            update.velocity = orbit(ctx, parent.position, orbit_angle);
        }
        None => {
            // Lost the target, or never had one: head home.
            update.target = None;
            let home = parent.position;
            if ctx.position.distance(home) <= INTERCEPTOR_ORBIT_RADIUS * 1.5 {
                update.state = InterceptorState::Orbiting;
                update.velocity = orbit(ctx, home, orbit_angle);
            } else {
                update.state = InterceptorState::Returning;
                update.velocity = seek(ctx.position, home, ctx.speed, ctx.dt);
            }
        }
    }
    update
}

/// Parent is gone: hunt anything, anywhere, and give up after the orphan
/// timeout.
fn evaluate_orphan(
    ctx: &InterceptorContext,
    target: Option<&Combatant>,
    mut update: InterceptorUpdate,
) -> InterceptorUpdate {
    update.state = InterceptorState::Attacking;
    match target.or_else(|| nearest_enemy(ctx.position, ctx.team, ctx.units, None)) {
        Some(prey) => attack(ctx, prey, &mut update),
        None => {
            update.target = None;
            update.orphan_secs = ctx.orphan_secs + ctx.dt;
            update.expired = update.orphan_secs >= INTERCEPTOR_ORPHAN_TIMEOUT_SECS;
        }
    }
    update
}

fn attack(ctx: &InterceptorContext, prey: &Combatant, update: &mut InterceptorUpdate) {
    update.state = InterceptorState::Attacking;
    update.target = Some(prey.id);

    let distance = ctx.position.distance(prey.position);
    update.velocity = if distance > INTERCEPTOR_INNER_RADIUS {
        vector::direction(ctx.position, prey.position) * ctx.speed
    } else {
        orbit(ctx, prey.position, update.orbit_angle)
    };

    let reachable = in_reach(ctx.position, INTERCEPTOR_RADIUS, prey, ctx.attack_range);
    if reachable && update.timer_secs <= 0.0 {
        update.fire_at = Some(prey.id);
        update.timer_secs = ctx.cooldown_secs;
    }
}

/// Current target if it is still an active enemy within twice the detection
/// radius.
fn valid_target<'a>(ctx: &InterceptorContext<'a>) -> Option<&'a Combatant> {
    let id = ctx.target?;
    find_active(ctx.units, id).filter(|t| {
        t.is_enemy_of(ctx.team)
            && ctx.position.distance(t.position) <= INTERCEPTOR_DETECTION_RADIUS * 2.0
    })
}

fn orbit(ctx: &InterceptorContext, center: DVec2, angle: f64) -> DVec2 {
    let slot = center + vector::from_angle(angle) * INTERCEPTOR_ORBIT_RADIUS;
    seek(ctx.position, slot, ctx.speed, ctx.dt)
}

/// Velocity that reaches `goal` this tick if possible, capped at `speed`.
pub fn seek(position: DVec2, goal: DVec2, speed: f64, dt: f64) -> DVec2 {
    if dt <= 0.0 {
        return vector::direction(position, goal) * speed;
    }
    vector::clamp_length((goal - position) / dt, speed)
}
