//! 2D vector helpers.
//!
//! Thin wrappers over `glam::DVec2` that pin down the degenerate cases the
//! simulation relies on: normalizing a zero-length vector yields zero, never NaN.

use glam::DVec2;

pub fn add(a: DVec2, b: DVec2) -> DVec2 {
    a + b
}

pub fn sub(a: DVec2, b: DVec2) -> DVec2 {
    a - b
}

pub fn scale(v: DVec2, s: f64) -> DVec2 {
    v * s
}

pub fn distance(a: DVec2, b: DVec2) -> f64 {
    a.distance(b)
}

/// Unit vector in the direction of `v`, or zero when `v` has no length.
pub fn normalize(v: DVec2) -> DVec2 {
    v.normalize_or_zero()
}

/// Unit vector pointing from `from` to `to`; zero when the points coincide.
pub fn direction(from: DVec2, to: DVec2) -> DVec2 {
    normalize(to - from)
}

/// Linear interpolation, `t = 0` gives `a`, `t = 1` gives `b`.
pub fn lerp(a: DVec2, b: DVec2, t: f64) -> DVec2 {
    a + (b - a) * t
}

/// Angle of `v` in radians, measured counter-clockwise from +x.
pub fn angle(v: DVec2) -> f64 {
    v.y.atan2(v.x)
}

/// Unit vector at `radians` from +x.
pub fn from_angle(radians: f64) -> DVec2 {
    DVec2::new(radians.cos(), radians.sin())
}

/// Rotate `v` by `radians`.
pub fn rotate(v: DVec2, radians: f64) -> DVec2 {
    let (sin, cos) = radians.sin_cos();
    DVec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Shorten `v` to at most `max` length, keeping its direction.
pub fn clamp_length(v: DVec2, max: f64) -> DVec2 {
    let len_sq = v.length_squared();
    if len_sq > max * max && len_sq > 0.0 {
        v * (max / len_sq.sqrt())
    } else {
        v
    }
}

/// Closest distance between point `p` and the segment `a..b`.
pub fn segment_point_distance(a: DVec2, b: DVec2, p: DVec2) -> f64 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f64::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Turn `current` toward `desired` by at most `max_angle` radians, keeping
/// the magnitude of `current`.
pub fn turn_toward(current: DVec2, desired: DVec2, max_angle: f64) -> DVec2 {
    let speed = current.length();
    if speed <= f64::EPSILON || desired.length_squared() <= f64::EPSILON {
        return current;
    }
    let from = angle(current);
    let mut delta = angle(desired) - from;
    while delta > std::f64::consts::PI {
        delta -= std::f64::consts::TAU;
    }
    while delta < -std::f64::consts::PI {
        delta += std::f64::consts::TAU;
    }
    from_angle(from + delta.clamp(-max_angle, max_angle)) * speed
}
