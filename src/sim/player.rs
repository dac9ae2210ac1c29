//! Player-side orbit state machine: attached to a body, or in free flight
//!
//! While attached the single degree of freedom is the orbit angle; the
//! position is recomputed from it every tick (never integrated), so drift
//! cannot accumulate. The attached body is re-resolved by id each tick
//! rather than cached.

use glam::Vec2;
use std::f32::consts::FRAC_PI_2;

use crate::config::PlayerConfig;
use crate::{cartesian_to_polar, radial_unit};

use super::body::{Body, BodyId, SpecialEffect};
use super::events::{EventQueue, GameEvent};
use super::field::BodyField;
use super::session::TickInput;

/// Player motion state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    /// Orbiting `body_id` at `angle` radians around its center
    Attached { body_id: BodyId, angle: f32 },
    /// Free flight at constant velocity
    Flying { vel: Vec2 },
}

/// A duration-limited effect multiplier
#[derive(Debug, Clone, Copy)]
struct TimedBoost {
    multiplier: f32,
    remaining: f32,
}

/// What a player tick produced, for the session to act on
#[derive(Debug, Default)]
pub struct PlayerTickOutcome {
    /// First launch of the session happened this tick
    pub first_launch: bool,
    pub landed: Option<Landing>,
}

#[derive(Debug, Clone, Copy)]
pub struct Landing {
    pub body_id: BodyId,
    /// Freshly consumed special payload, if the body carried one
    pub effect: Option<(SpecialEffect, f32)>,
}

/// The orbit-launch-attach controller; exclusively owns the player state
#[derive(Debug)]
pub struct OrbitController {
    config: PlayerConfig,
    motion: Motion,
    pos: Vec2,
    /// Facing angle for the presentation layer, perpendicular to the
    /// radial direction while attached
    facing: f32,
    has_launched_once: bool,
    jump_boost: Option<TimedBoost>,
    speed_boost: Option<TimedBoost>,
}

impl OrbitController {
    /// Player starts directly above the anchor
    pub fn new(config: PlayerConfig, anchor: &Body) -> Self {
        let mut player = Self {
            config,
            motion: Motion::Attached {
                body_id: anchor.id,
                angle: FRAC_PI_2,
            },
            pos: Vec2::ZERO,
            facing: 0.0,
            has_launched_once: false,
            jump_boost: None,
            speed_boost: None,
        };
        player.place_on_surface(anchor, FRAC_PI_2);
        player
    }

    pub fn motion(&self) -> Motion {
        self.motion
    }

    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    pub fn facing(&self) -> f32 {
        self.facing
    }

    pub fn has_launched_once(&self) -> bool {
        self.has_launched_once
    }

    /// Id of the body the player currently stands on
    pub fn attached_body(&self) -> Option<BodyId> {
        match self.motion {
            Motion::Attached { body_id, .. } => Some(body_id),
            Motion::Flying { .. } => None,
        }
    }

    /// Snap exactly onto the body surface at the given orbit angle
    fn place_on_surface(&mut self, body: &Body, angle: f32) {
        self.pos = body.pos + radial_unit(angle) * (body.radius + self.config.radius);
        self.facing = angle - FRAC_PI_2;
    }

    fn launch_multiplier(&self) -> f32 {
        self.jump_boost.map_or(1.0, |b| b.multiplier)
    }

    fn orbit_multiplier(&self) -> f32 {
        self.speed_boost.map_or(1.0, |b| b.multiplier)
    }

    fn decay_boosts(&mut self, dt: f32) {
        for boost in [&mut self.jump_boost, &mut self.speed_boost] {
            if let Some(b) = boost {
                b.remaining -= dt;
                if b.remaining <= 0.0 {
                    *boost = None;
                }
            }
        }
    }

    /// Advance one tick. Bodies have already been moved this tick, so
    /// attachment decisions see current positions.
    pub fn tick(
        &mut self,
        input: &TickInput,
        dt: f32,
        field: &mut BodyField,
        boost_duration: f32,
        events: &mut EventQueue,
    ) -> PlayerTickOutcome {
        let mut outcome = PlayerTickOutcome::default();
        self.decay_boosts(dt);

        match self.motion {
            Motion::Attached { body_id, angle } => {
                // Re-resolve the reference; a vanished body means a protocol
                // violation upstream, so detach instead of crashing
                let Some(body) = field.body(body_id) else {
                    log::warn!("attached body {} vanished; detaching", body_id);
                    self.motion = Motion::Flying { vel: Vec2::ZERO };
                    return outcome;
                };

                // Positive input orbits clockwise
                let axis = input.axis.clamp(-1.0, 1.0);
                let angle =
                    angle - axis * self.config.angular_speed * self.orbit_multiplier() * dt;
                self.motion = Motion::Attached { body_id, angle };
                self.place_on_surface(body, angle);

                if input.launch {
                    self.launch(angle, events, &mut outcome);
                }
            }
            Motion::Flying { vel } => {
                if input.launch {
                    // Benign input race (two launch triggers in one tick)
                    log::debug!("launch ignored while flying");
                }
                self.pos += vel * dt;
                self.try_attach(field, boost_duration, events, &mut outcome);
            }
        }

        outcome
    }

    /// Attached -> Flying: purely radial impulse from the body center
    fn launch(&mut self, angle: f32, events: &mut EventQueue, outcome: &mut PlayerTickOutcome) {
        let vel = radial_unit(angle) * self.config.launch_impulse * self.launch_multiplier();
        self.motion = Motion::Flying { vel };
        events.push(GameEvent::PlayerLaunched);

        if !self.has_launched_once {
            self.has_launched_once = true;
            outcome.first_launch = true;
            events.push(GameEvent::FirstLaunch);
            log::info!("first launch");
        }
    }

    /// Flying -> Attached on contact-shape overlap
    fn try_attach(
        &mut self,
        field: &mut BodyField,
        boost_duration: f32,
        events: &mut EventQueue,
        outcome: &mut PlayerTickOutcome,
    ) {
        let hit = field
            .bodies()
            .iter()
            .find(|b| b.overlaps(self.pos, self.config.radius))
            .map(|b| b.id);
        let Some(body_id) = hit else {
            return;
        };

        let effect = field
            .body_mut(body_id)
            .and_then(|b| b.consume_special());
        // Reborrow immutably for placement
        let Some(body) = field.body(body_id) else {
            return;
        };

        let to_player = self.pos - body.pos;
        let angle = if to_player.length_squared() < 1e-6 {
            FRAC_PI_2
        } else {
            cartesian_to_polar(to_player).1
        };
        self.motion = Motion::Attached { body_id, angle };
        self.place_on_surface(body, angle);

        if let Some((kind, magnitude)) = effect {
            match kind {
                SpecialEffect::JumpBoost => {
                    self.jump_boost = Some(TimedBoost {
                        multiplier: magnitude,
                        remaining: boost_duration,
                    });
                }
                SpecialEffect::SpeedBoost => {
                    self.speed_boost = Some(TimedBoost {
                        multiplier: magnitude,
                        remaining: boost_duration,
                    });
                }
                // Scoring is the session's concern; carried in the outcome
                SpecialEffect::ScoreBonus => {}
            }
        }

        events.push(GameEvent::PlayerLanded {
            body_id,
            effect: effect.map(|(kind, _)| kind),
        });
        outcome.landed = Some(Landing { body_id, effect });
    }

    /// Force the initial state without recreating the controller
    pub fn reset(&mut self, anchor: &Body) {
        self.motion = Motion::Attached {
            body_id: anchor.id,
            angle: FRAC_PI_2,
        };
        self.has_launched_once = false;
        self.jump_boost = None;
        self.speed_boost = None;
        self.place_on_surface(anchor, FRAC_PI_2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FieldConfig, SessionConfig};
    use crate::sim::body::SpecialPayload;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn test_rig() -> (BodyField, OrbitController, EventQueue) {
        let cfg = SessionConfig::default();
        let field = BodyField::new(
            FieldConfig::default(),
            cfg.viewport,
            cfg.anchor_pos,
            cfg.anchor_radius,
            Pcg32::seed_from_u64(42),
        );
        let anchor = field.body(field.anchor_id()).unwrap().clone();
        let player = OrbitController::new(cfg.player.clone(), &anchor);
        (field, player, EventQueue::default())
    }

    fn input(axis: f32, launch: bool) -> TickInput {
        TickInput { axis, launch }
    }

    #[test]
    fn test_starts_above_anchor_on_surface() {
        let (field, player, _) = test_rig();
        let anchor = field.body(field.anchor_id()).unwrap();

        assert_eq!(player.attached_body(), Some(anchor.id));
        let expected = anchor.radius + player.config.radius;
        assert_relative_eq!(player.pos().distance(anchor.pos), expected, epsilon = 1e-5);
        assert!(player.pos().y > anchor.pos.y);
    }

    #[test]
    fn test_surface_distance_invariant_while_orbiting() {
        let (mut field, mut player, mut events) = test_rig();
        let anchor = field.body(field.anchor_id()).unwrap().clone();
        let expected = anchor.radius + player.config.radius;

        for _ in 0..200 {
            player.tick(&input(1.0, false), 1.0 / 120.0, &mut field, 5.0, &mut events);
            assert_relative_eq!(player.pos().distance(anchor.pos), expected, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_positive_input_orbits_clockwise() {
        let (mut field, mut player, mut events) = test_rig();
        let before = player.pos();
        player.tick(&input(1.0, false), 0.1, &mut field, 5.0, &mut events);
        // Starting at the top, clockwise motion moves +x
        assert!(player.pos().x > before.x);
    }

    #[test]
    fn test_launch_is_radial_and_one_shot_notifies() {
        let (mut field, mut player, mut events) = test_rig();
        let anchor_pos = field.body(field.anchor_id()).unwrap().pos;

        let outcome = player.tick(&input(0.0, true), 1.0 / 120.0, &mut field, 5.0, &mut events);
        assert!(outcome.first_launch);
        assert!(player.has_launched_once());

        let Motion::Flying { vel } = player.motion() else {
            panic!("expected flying");
        };
        // Radial: velocity parallel to (pos - center)
        let radial = (player.pos() - anchor_pos).normalize();
        assert_relative_eq!(vel.normalize().dot(radial), 1.0, epsilon = 1e-4);
        assert_relative_eq!(vel.length(), player.config.launch_impulse, epsilon = 1e-4);

        let drained = events.drain();
        assert!(drained.contains(&GameEvent::PlayerLaunched));
        assert!(drained.contains(&GameEvent::FirstLaunch));
    }

    #[test]
    fn test_launch_while_flying_is_noop() {
        let (mut field, mut player, mut events) = test_rig();
        player.tick(&input(0.0, true), 1.0 / 120.0, &mut field, 5.0, &mut events);
        let Motion::Flying { vel: before } = player.motion() else {
            panic!("expected flying");
        };

        let outcome = player.tick(&input(0.0, true), 1.0 / 120.0, &mut field, 5.0, &mut events);
        assert!(!outcome.first_launch);
        let Motion::Flying { vel: after } = player.motion() else {
            panic!("expected flying");
        };
        assert_eq!(before, after);
    }

    #[test]
    fn test_second_launch_does_not_renotify() {
        let (mut field, mut player, mut events) = test_rig();
        let first = player.tick(&input(0.0, true), 1.0 / 120.0, &mut field, 5.0, &mut events);
        assert!(first.first_launch);
        events.drain();

        // Re-attach by hand and launch again within the same session
        let anchor = field.body(field.anchor_id()).unwrap().clone();
        player.motion = Motion::Attached {
            body_id: anchor.id,
            angle: FRAC_PI_2,
        };
        player.place_on_surface(&anchor, FRAC_PI_2);

        let second = player.tick(&input(0.0, true), 1.0 / 120.0, &mut field, 5.0, &mut events);
        assert!(!second.first_launch);
        assert!(!events.drain().contains(&GameEvent::FirstLaunch));
    }

    #[test]
    fn test_flight_attaches_on_contact_and_snaps() {
        let (mut field, mut player, mut events) = test_rig();
        // Place a target directly above the start position
        field.spawn(&mut events);
        let target = field.bodies().last().unwrap().id;
        let above = player.pos() + Vec2::new(0.0, 2.0);
        field.body_mut(target).unwrap().pos = above;
        field.body_mut(target).unwrap().special = None;
        events.drain();

        player.tick(&input(0.0, true), 1.0 / 120.0, &mut field, 5.0, &mut events);
        for _ in 0..1200 {
            player.tick(&input(0.0, false), 1.0 / 120.0, &mut field, 5.0, &mut events);
            if player.attached_body() == Some(target) {
                break;
            }
        }

        assert_eq!(player.attached_body(), Some(target));
        let body = field.body(target).unwrap();
        let expected = body.radius + player.config.radius;
        assert_relative_eq!(player.pos().distance(body.pos), expected, epsilon = 1e-4);
        assert!(events
            .drain()
            .iter()
            .any(|e| matches!(e, GameEvent::PlayerLanded { body_id, .. } if *body_id == target)));
    }

    #[test]
    fn test_special_effect_consumed_once_and_boost_reverts() {
        let (mut field, mut player, mut events) = test_rig();
        field.spawn(&mut events);
        let target = field.bodies().last().unwrap().id;
        {
            let body = field.body_mut(target).unwrap();
            body.pos = Vec2::new(0.0, 0.0);
            body.special = Some(SpecialPayload {
                effect: SpecialEffect::JumpBoost,
                magnitude: 2.0,
                consumed: false,
            });
        }

        // Drop the player right onto the body
        player.motion = Motion::Flying { vel: Vec2::ZERO };
        player.pos = Vec2::new(0.0, 0.1);
        let outcome = player.tick(&input(0.0, false), 1.0 / 120.0, &mut field, 1.0, &mut events);

        let landing = outcome.landed.expect("should land");
        assert_eq!(landing.effect, Some((SpecialEffect::JumpBoost, 2.0)));
        assert_relative_eq!(player.launch_multiplier(), 2.0);

        // Boosted launch is twice as fast
        player.tick(&input(0.0, true), 1.0 / 120.0, &mut field, 1.0, &mut events);
        let Motion::Flying { vel } = player.motion() else {
            panic!("expected flying");
        };
        assert_relative_eq!(
            vel.length(),
            2.0 * player.config.launch_impulse,
            epsilon = 1e-4
        );

        // Re-land on the consumed body: no further effect
        player.motion = Motion::Flying { vel: Vec2::ZERO };
        player.pos = Vec2::new(0.0, 0.1);
        player.jump_boost = None;
        let outcome = player.tick(&input(0.0, false), 1.0 / 120.0, &mut field, 1.0, &mut events);
        assert!(outcome.landed.unwrap().effect.is_none());

        // Timed revert
        player.jump_boost = Some(TimedBoost {
            multiplier: 2.0,
            remaining: 0.05,
        });
        player.tick(&input(0.0, false), 0.1, &mut field, 1.0, &mut events);
        assert_relative_eq!(player.launch_multiplier(), 1.0);
    }

    #[test]
    fn test_vanished_body_detaches_defensively() {
        let (mut field, mut player, mut events) = test_rig();
        player.motion = Motion::Attached {
            body_id: 999,
            angle: FRAC_PI_2,
        };
        let outcome = player.tick(&input(0.0, false), 1.0 / 120.0, &mut field, 5.0, &mut events);
        assert!(outcome.landed.is_none());
        assert_eq!(player.motion(), Motion::Flying { vel: Vec2::ZERO });
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let (mut field, mut player, mut events) = test_rig();
        player.tick(&input(0.5, true), 0.1, &mut field, 5.0, &mut events);

        let anchor = field.body(field.anchor_id()).unwrap().clone();
        player.reset(&anchor);
        assert_eq!(player.attached_body(), Some(anchor.id));
        assert!(!player.has_launched_once());
        let expected = anchor.radius + player.config.radius;
        assert_relative_eq!(player.pos().distance(anchor.pos), expected, epsilon = 1e-5);
    }
}
