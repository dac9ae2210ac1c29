//! Data-driven tuning surface
//!
//! Every gameplay tunable lives here and is handed to the session as an
//! immutable value at start; nothing reads hidden defaults mid-session.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::BODY_BASE_RADIUS;

/// Fatal configuration errors, reported at session start
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("anchor body has non-positive radius {0}")]
    ZeroSizedAnchor(f32),
    #[error("viewport extents must be positive (got {half_width} x {half_height})")]
    DegenerateViewport { half_width: f32, half_height: f32 },
    #[error("{what}: min {min} exceeds max {max}")]
    InvertedRange {
        what: &'static str,
        min: f32,
        max: f32,
    },
    #[error("body size range must be positive (min {0})")]
    NonPositiveSize(f32),
}

/// Fixed camera view of the world, mapping world space to [0,1]² viewport
/// space (0,0 = bottom-left). Bodies spawn above `top()` and are recycled
/// below the bottom edge.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Viewport {
    pub center: Vec2,
    pub half_width: f32,
    pub half_height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        // Portrait arcade framing
        Self {
            center: Vec2::ZERO,
            half_width: 3.0,
            half_height: 5.0,
        }
    }
}

impl Viewport {
    /// World position to viewport coordinates ([0,1]² is on-screen)
    pub fn viewport_point(&self, world: Vec2) -> Vec2 {
        Vec2::new(
            (world.x - self.center.x) / (2.0 * self.half_width) + 0.5,
            (world.y - self.center.y) / (2.0 * self.half_height) + 0.5,
        )
    }

    /// True if the point is inside the visible [0,1]² box
    pub fn contains(&self, world: Vec2) -> bool {
        let vp = self.viewport_point(world);
        (0.0..=1.0).contains(&vp.x) && (0.0..=1.0).contains(&vp.y)
    }

    pub fn top(&self) -> f32 {
        self.center.y + self.half_height
    }

    pub fn bottom(&self) -> f32 {
        self.center.y - self.half_height
    }

    pub fn left(&self) -> f32 {
        self.center.x - self.half_width
    }

    pub fn right(&self) -> f32 {
        self.center.x + self.half_width
    }
}

/// Horizontal drift direction for the cascade layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CascadeDirection {
    Left,
    Right,
}

/// Placement strategy for new body spawn coordinates
///
/// All variants implement the same candidate-position contract; the field
/// selects one per session instead of keeping separate spawner code paths.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LayoutMode {
    /// Screen split into vertical columns, filled round-robin with jitter
    Columns {
        columns: u32,
        /// Random horizontal offset as a fraction of the column width [0,1]
        horizontal_variation: f32,
    },
    /// Each candidate drifts sideways from the previous one, bouncing at
    /// the horizontal bounds
    Cascade {
        direction: CascadeDirection,
        /// Step per spawn as a fraction of the viewport width (0,1]
        intensity: f32,
    },
    /// Fully random x within bounds
    Random,
}

impl Default for LayoutMode {
    fn default() -> Self {
        LayoutMode::Columns {
            columns: 3,
            horizontal_variation: 0.2,
        }
    }
}

/// Body field tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldConfig {
    /// Target live population of non-anchor bodies
    pub target_count: usize,
    /// Visual scale range; contact radius = scale * BODY_BASE_RADIUS
    pub min_size: f32,
    pub max_size: f32,
    /// Base fall-speed bounds, rescaled live by the difficulty factor
    pub min_fall_speed: f32,
    pub max_fall_speed: f32,
    /// Minimum center distance to any live body when placing
    pub min_spacing: f32,
    /// Candidates start this far above the viewport top
    pub spawn_height_offset: f32,
    /// Upward nudge applied per placement retry
    pub vertical_spacing: f32,
    /// Seconds between refill spawns once running; 0 refills to target
    /// within a single tick
    pub spawn_interval: f32,
    /// Cosmetic spin range, radians per second
    pub min_rotation_speed: f32,
    pub max_rotation_speed: f32,
    /// Probability a spawned body carries a one-shot special effect
    pub special_chance: f64,
    pub layout: LayoutMode,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            target_count: 3,
            min_size: 0.8,
            max_size: 1.5,
            min_fall_speed: 0.2,
            max_fall_speed: 1.2,
            min_spacing: 2.5,
            spawn_height_offset: 1.5,
            vertical_spacing: 2.0,
            spawn_interval: 0.0,
            min_rotation_speed: 10.0_f32.to_radians(),
            max_rotation_speed: 30.0_f32.to_radians(),
            special_chance: 0.10,
            layout: LayoutMode::default(),
        }
    }
}

/// Player motion tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Orbit speed while attached, radians per second
    pub angular_speed: f32,
    /// Launch speed, world units per second
    pub launch_impulse: f32,
    /// Player contact radius
    pub radius: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            angular_speed: 80.0_f32.to_radians(),
            launch_impulse: 4.0,
            radius: crate::consts::PLAYER_RADIUS,
        }
    }
}

/// Difficulty curve tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DifficultyConfig {
    /// Factor growth per second of elapsed session time
    pub increase_rate: f32,
    /// Upper clamp on the factor (lower clamp is always 1)
    pub max_difficulty: f32,
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        Self {
            increase_rate: 0.05,
            max_difficulty: 5.0,
        }
    }
}

/// Complete per-session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub viewport: Viewport,
    pub field: FieldConfig,
    pub player: PlayerConfig,
    pub difficulty: DifficultyConfig,
    /// Anchor (start body) placement and contact radius
    pub anchor_pos: Vec2,
    pub anchor_radius: f32,
    /// Score accrued per second while running
    pub score_multiplier: f32,
    /// Base value multiplied by a score-bonus body's magnitude
    pub score_bonus_base: f32,
    /// Seconds before a timed boost (jump/speed) reverts
    pub boost_duration: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            field: FieldConfig::default(),
            player: PlayerConfig::default(),
            difficulty: DifficultyConfig::default(),
            anchor_pos: Vec2::new(0.0, -3.5),
            anchor_radius: 1.2 * BODY_BASE_RADIUS,
            score_multiplier: 1.0,
            score_bonus_base: 100.0,
            boost_duration: 5.0,
        }
    }
}

impl SessionConfig {
    /// Validate everything a session cannot start without
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.anchor_radius <= 0.0 {
            return Err(ConfigError::ZeroSizedAnchor(self.anchor_radius));
        }
        if self.viewport.half_width <= 0.0 || self.viewport.half_height <= 0.0 {
            return Err(ConfigError::DegenerateViewport {
                half_width: self.viewport.half_width,
                half_height: self.viewport.half_height,
            });
        }
        if self.field.min_size <= 0.0 {
            return Err(ConfigError::NonPositiveSize(self.field.min_size));
        }
        if self.field.min_size > self.field.max_size {
            return Err(ConfigError::InvertedRange {
                what: "body size",
                min: self.field.min_size,
                max: self.field.max_size,
            });
        }
        if self.field.min_fall_speed > self.field.max_fall_speed {
            return Err(ConfigError::InvertedRange {
                what: "fall speed",
                min: self.field.min_fall_speed,
                max: self.field.max_fall_speed,
            });
        }
        if self.field.min_rotation_speed > self.field.max_rotation_speed {
            return Err(ConfigError::InvertedRange {
                what: "rotation speed",
                min: self.field.min_rotation_speed,
                max: self.field.max_rotation_speed,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_point_mapping() {
        let vp = Viewport::default();
        let center = vp.viewport_point(Vec2::ZERO);
        assert!((center.x - 0.5).abs() < 1e-6);
        assert!((center.y - 0.5).abs() < 1e-6);

        let top_right = vp.viewport_point(Vec2::new(3.0, 5.0));
        assert!((top_right.x - 1.0).abs() < 1e-6);
        assert!((top_right.y - 1.0).abs() < 1e-6);

        assert!(!vp.contains(Vec2::new(0.0, -5.1)));
        assert!(vp.contains(Vec2::new(0.0, 4.9)));
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(SessionConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_config() {
        let mut cfg = SessionConfig::default();
        cfg.anchor_radius = 0.0;
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroSizedAnchor(0.0)));

        let mut cfg = SessionConfig::default();
        cfg.field.min_fall_speed = 2.0;
        cfg.field.max_fall_speed = 1.0;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvertedRange { what: "fall speed", .. })
        ));
    }
}
