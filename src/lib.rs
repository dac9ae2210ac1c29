//! Planet Hopper - vertical planet-hopping arcade simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (orbit state machine, body field, difficulty)
//! - `config`: Data-driven tuning surface, immutable per session
//! - `bestscore`: Best-score persistence collaborator
//!
//! This crate is an embedded simulation module: no rendering, no input
//! devices, no audio. The host drives `sim::Session::tick` with a dt and a
//! sampled [`sim::TickInput`], and drains [`sim::GameEvent`]s for its
//! presentation layer.

pub mod bestscore;
pub mod config;
pub mod sim;

pub use bestscore::{JsonFileScoreStore, MemoryScoreStore, ScoreStore};
pub use config::{ConfigError, FieldConfig, LayoutMode, SessionConfig, Viewport};
pub use sim::{GameEvent, Session, SessionPhase, TickInput};

use glam::Vec2;

/// World-space constants shared by the simulation
pub mod consts {
    /// Contact radius of a body at visual scale 1.0
    pub const BODY_BASE_RADIUS: f32 = 0.5;
    /// Player contact radius
    pub const PLAYER_RADIUS: f32 = 0.25;
    /// Bodies are recycled once their viewport y drops below this
    pub const BODY_CULL_MARGIN: f32 = 0.2;
    /// Bounded retry budget for spaced placement
    pub const SPAWN_RETRIES: u32 = 12;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Convert cartesian (x, y) to polar (r, theta)
#[inline]
pub fn cartesian_to_polar(pos: Vec2) -> (f32, f32) {
    (pos.length(), pos.y.atan2(pos.x))
}

/// Unit vector pointing outward at the given angle
#[inline]
pub fn radial_unit(theta: f32) -> Vec2 {
    Vec2::new(theta.cos(), theta.sin())
}

/// Unit vector perpendicular to [`radial_unit`] (counter-clockwise)
#[inline]
pub fn tangent_unit(theta: f32) -> Vec2 {
    Vec2::new(-theta.sin(), theta.cos())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_normalize_angle_wraps() {
        assert_relative_eq!(normalize_angle(3.0 * PI), -PI, epsilon = 1e-5);
        assert_relative_eq!(normalize_angle(-3.0 * PI), -PI, epsilon = 1e-5);
        assert_relative_eq!(normalize_angle(0.5), 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_polar_roundtrip() {
        let pos = polar_to_cartesian(3.0, FRAC_PI_2);
        assert_relative_eq!(pos.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(pos.y, 3.0, epsilon = 1e-6);

        let (r, theta) = cartesian_to_polar(pos);
        assert_relative_eq!(r, 3.0, epsilon = 1e-5);
        assert_relative_eq!(theta, FRAC_PI_2, epsilon = 1e-5);
    }

    #[test]
    fn test_radial_tangent_perpendicular() {
        for i in 0..16 {
            let theta = i as f32 * PI / 8.0;
            let dot = radial_unit(theta).dot(tangent_unit(theta));
            assert!(dot.abs() < 1e-6);
        }
    }
}
