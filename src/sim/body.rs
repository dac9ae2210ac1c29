//! Circular game bodies the player orbits and lands on

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::normalize_angle;

/// Stable body identity, allocated by the field and never reused while alive
pub type BodyId = u32;

/// One-shot gameplay effect carried by a special body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpecialEffect {
    /// Multiplies launch impulse for a limited time
    JumpBoost,
    /// Immediate score award of base bonus x magnitude
    ScoreBonus,
    /// Multiplies orbit speed for a limited time
    SpeedBoost,
}

/// Effect payload on a special body, consumed exactly once on contact
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpecialPayload {
    pub effect: SpecialEffect,
    pub magnitude: f32,
    pub consumed: bool,
}

/// Body kind reported to the presentation layer on spawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    Anchor,
    Normal,
    Special(SpecialEffect),
}

/// A circular body: position, contact radius, fall state, cosmetic spin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub id: BodyId,
    pub pos: Vec2,
    /// Effective contact radius (visual scale x base sprite radius)
    pub radius: f32,
    /// Cosmetic spin, radians per second; independent of gameplay
    pub rotation_speed: f32,
    /// +1 counter-clockwise, -1 clockwise
    pub rotation_dir: f32,
    /// Accumulated spin angle for the presentation layer
    pub angle: f32,
    /// Downward speed, meaningful once `is_falling`
    pub fall_speed: f32,
    /// Monotonic false -> true; a body never un-falls
    pub is_falling: bool,
    /// The single non-recyclable start body of the session
    pub is_anchor: bool,
    /// The anchor is hidden (deactivated) instead of destroyed
    pub active: bool,
    pub special: Option<SpecialPayload>,
}

impl Body {
    /// The session's start body: no spin, no payload, never recycled
    pub fn anchor(id: BodyId, pos: Vec2, radius: f32) -> Self {
        Self {
            id,
            pos,
            radius,
            rotation_speed: 0.0,
            rotation_dir: 1.0,
            angle: 0.0,
            fall_speed: 0.0,
            is_falling: false,
            is_anchor: true,
            active: true,
            special: None,
        }
    }

    /// Kind tag for spawn events
    pub fn kind(&self) -> BodyKind {
        if self.is_anchor {
            BodyKind::Anchor
        } else if let Some(payload) = &self.special {
            BodyKind::Special(payload.effect)
        } else {
            BodyKind::Normal
        }
    }

    /// Advance cosmetic spin and, once falling, translate downward
    pub fn advance(&mut self, dt: f32) {
        if self.rotation_speed != 0.0 {
            self.angle = normalize_angle(self.angle + self.rotation_speed * self.rotation_dir * dt);
        }
        if self.is_falling {
            self.pos.y -= self.fall_speed * dt;
        }
    }

    /// Start falling; idempotent, never reversed
    pub fn start_falling(&mut self) {
        self.is_falling = true;
    }

    /// Consume the special payload if present and unconsumed.
    /// A second contact against a consumed body returns None.
    pub fn consume_special(&mut self) -> Option<(SpecialEffect, f32)> {
        match &mut self.special {
            Some(payload) if !payload.consumed => {
                payload.consumed = true;
                Some((payload.effect, payload.magnitude))
            }
            _ => None,
        }
    }

    /// True when the player's contact circle overlaps this body's
    pub fn overlaps(&self, point: Vec2, point_radius: f32) -> bool {
        self.active && point.distance_squared(self.pos) < (self.radius + point_radius).powi(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_body(id: BodyId) -> Body {
        Body {
            id,
            pos: Vec2::new(1.0, 2.0),
            radius: 0.5,
            rotation_speed: 1.0,
            rotation_dir: -1.0,
            angle: 0.0,
            fall_speed: 2.0,
            is_falling: false,
            is_anchor: false,
            active: true,
            special: None,
        }
    }

    #[test]
    fn test_advance_only_falls_when_falling() {
        let mut body = test_body(1);
        body.advance(0.5);
        assert_eq!(body.pos, Vec2::new(1.0, 2.0));
        assert!((body.angle - (-0.5)).abs() < 1e-6);

        body.start_falling();
        body.advance(0.5);
        assert!((body.pos.y - 1.0).abs() < 1e-6);
        assert!((body.pos.x - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_consume_special_is_one_shot() {
        let mut body = test_body(2);
        body.special = Some(SpecialPayload {
            effect: SpecialEffect::ScoreBonus,
            magnitude: 2.0,
            consumed: false,
        });

        assert_eq!(
            body.consume_special(),
            Some((SpecialEffect::ScoreBonus, 2.0))
        );
        assert_eq!(body.consume_special(), None);
        assert_eq!(body.consume_special(), None);
    }

    #[test]
    fn test_overlap_respects_active_flag() {
        let mut body = test_body(3);
        let touching = Vec2::new(1.0, 2.7); // 0.7 < 0.5 + 0.25
        assert!(body.overlaps(touching, 0.25));
        assert!(!body.overlaps(Vec2::new(1.0, 3.0), 0.25));

        body.active = false;
        assert!(!body.overlaps(touching, 0.25));
    }

    #[test]
    fn test_anchor_has_no_spin() {
        let anchor = Body::anchor(0, Vec2::ZERO, 0.6);
        assert!(anchor.is_anchor);
        assert_eq!(anchor.rotation_speed, 0.0);
        assert!(!anchor.is_falling);
        let mut moved = anchor.clone();
        moved.advance(1.0);
        assert_eq!(moved.pos, anchor.pos);
    }
}
