//! Render boundary.
//!
//! The simulation knows nothing about canvases or GPUs. Views draw themselves
//! onto an opaque [`RenderSurface`] supplied by the host.

use glam::DVec2;

use crate::enums::{InterceptorState, MoraleState, ProjectileKind};
use crate::state::*;
use crate::types::Rgba;

/// Minimal 2D drawing context.
pub trait RenderSurface {
    fn fill_circle(&mut self, center: DVec2, radius: f64, color: Rgba);

    fn stroke_circle(&mut self, center: DVec2, radius: f64, width: f64, color: Rgba);

    fn line(&mut self, from: DVec2, to: DVec2, width: f64, color: Rgba);
}

/// Anything that can draw itself. Drawing never mutates simulation state.
pub trait Render {
    fn render(&self, surface: &mut dyn RenderSurface);
}

const HEALTH_BAR_BG: Rgba = Rgba::new(0.15, 0.15, 0.15, 0.8);
const HEALTH_BAR_FG: Rgba = Rgba::new(0.3, 0.9, 0.3, 1.0);
const ROUTING_RING: Rgba = Rgba::new(1.0, 1.0, 0.2, 0.8);

impl Render for UnitView {
    fn render(&self, surface: &mut dyn RenderSurface) {
        if !self.active {
            surface.fill_circle(self.position, self.radius * 0.6, self.team.color().with_alpha(0.25));
            return;
        }

        surface.fill_circle(self.position, self.radius, self.team.color());
        if self.morale_state == MoraleState::Routing {
            surface.stroke_circle(self.position, self.radius + 2.0, 1.0, ROUTING_RING);
        }

        // Health bar above the unit.
        let half = self.radius;
        let y = self.position.y - self.radius - 4.0;
        let left = DVec2::new(self.position.x - half, y);
        let right = DVec2::new(self.position.x + half, y);
        let fraction = if self.max_health > 0.0 {
            (self.health / self.max_health).clamp(0.0, 1.0)
        } else {
            0.0
        };
        surface.line(left, right, 2.0, HEALTH_BAR_BG);
        surface.line(left, left + DVec2::new(2.0 * half * fraction, 0.0), 2.0, HEALTH_BAR_FG);
    }
}

impl Render for ProjectileView {
    fn render(&self, surface: &mut dyn RenderSurface) {
        let color = self.kind.damage_type().color();
        let heading = self.velocity.normalize_or_zero();
        match self.kind {
            ProjectileKind::Bullet => surface.fill_circle(self.position, 1.5, color),
            ProjectileKind::Laser => {
                surface.line(self.position - heading * 12.0, self.position, 1.5, color)
            }
            ProjectileKind::Missile => {
                surface.line(self.position - heading * 6.0, self.position, 3.0, color);
                surface.fill_circle(self.position - heading * 7.0, 1.5, color.with_alpha(0.5));
            }
            ProjectileKind::Plasma => {
                surface.fill_circle(self.position, 3.5, color.with_alpha(0.5));
                surface.fill_circle(self.position, 2.0, color);
            }
        }
    }
}

impl Render for InterceptorView {
    fn render(&self, surface: &mut dyn RenderSurface) {
        let color = self.team.color();
        surface.fill_circle(self.position, 3.0, color);
        if self.state == InterceptorState::Attacking {
            surface.stroke_circle(self.position, 5.0, 0.5, color.with_alpha(0.6));
        }
    }
}

impl Render for EffectView {
    fn render(&self, surface: &mut dyn RenderSurface) {
        let alpha = self.remaining_fraction.clamp(0.0, 1.0) as f32;
        let color = self.color.with_alpha(self.color.a * alpha);
        for particle in &self.particles {
            surface.fill_circle(self.position + particle.offset, 1.5, color);
        }
    }
}

impl Render for BattleSnapshot {
    fn render(&self, surface: &mut dyn RenderSurface) {
        // Fallen units first so the living draw on top.
        for unit in self.units.iter().filter(|u| !u.active) {
            unit.render(surface);
        }
        for unit in self.units.iter().filter(|u| u.active) {
            unit.render(surface);
        }
        for interceptor in &self.interceptors {
            interceptor.render(surface);
        }
        for projectile in &self.projectiles {
            projectile.render(surface);
        }
        for effect in &self.effects {
            effect.render(surface);
        }
    }
}
