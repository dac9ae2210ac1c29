//! Procedural body field: placement, spacing, fall activation, recycling
//!
//! The field owns the live body collection exclusively. Nothing else may
//! destroy a body, and the currently attached body is never culled (the
//! attachment id is threaded into `tick` so the check is structural).

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use crate::config::{CascadeDirection, FieldConfig, LayoutMode, Viewport};
use crate::consts::{BODY_BASE_RADIUS, BODY_CULL_MARGIN, SPAWN_RETRIES};

use super::body::{Body, BodyId, SpecialEffect, SpecialPayload};
use super::events::{EventQueue, GameEvent};

/// Owns the live set of bodies and the spawn machinery
#[derive(Debug)]
pub struct BodyField {
    config: FieldConfig,
    viewport: Viewport,
    bodies: Vec<Body>,
    next_id: BodyId,
    spawn_counter: u32,
    /// Cascade layout cursor and current drift sign
    cascade_x: f32,
    cascade_dir: f32,
    anchor_id: BodyId,
    anchor_origin: Vec2,
    anchor_radius: f32,
    /// Refill enabled (set by `start`, cleared by `reset`)
    started: bool,
    /// Armed on first launch: new spawns fall immediately
    continuous_fall: bool,
    /// Live fall-speed bounds, rescaled by the difficulty factor
    fall_bounds: (f32, f32),
    cadence_scale: f32,
    spawn_timer: f32,
    rng: Pcg32,
}

impl BodyField {
    pub fn new(
        config: FieldConfig,
        viewport: Viewport,
        anchor_pos: Vec2,
        anchor_radius: f32,
        rng: Pcg32,
    ) -> Self {
        let anchor = Body::anchor(0, anchor_pos, anchor_radius);
        let cascade_dir = match config.layout {
            LayoutMode::Cascade {
                direction: CascadeDirection::Left,
                ..
            } => -1.0,
            _ => 1.0,
        };
        Self {
            config,
            viewport,
            bodies: vec![anchor],
            next_id: 1,
            spawn_counter: 0,
            cascade_x: viewport.center.x,
            cascade_dir,
            anchor_id: 0,
            anchor_origin: anchor_pos,
            anchor_radius,
            started: false,
            continuous_fall: false,
            fall_bounds: (0.0, 0.0),
            cadence_scale: 1.0,
            spawn_timer: 0.0,
            rng,
        }
    }

    pub fn anchor_id(&self) -> BodyId {
        self.anchor_id
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.iter().find(|b| b.id == id)
    }

    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.iter_mut().find(|b| b.id == id)
    }

    fn population(&self) -> usize {
        self.bodies.iter().filter(|b| !b.is_anchor).count()
    }

    /// Seed the initial population and enable refill
    pub fn start(&mut self, events: &mut EventQueue) {
        self.started = true;
        self.spawn_counter = 0;
        self.spawn_timer = 0.0;
        self.fall_bounds = (self.config.min_fall_speed, self.config.max_fall_speed);
        for _ in 0..self.config.target_count {
            self.spawn(events);
        }
    }

    /// Difficulty coupling: rescale live fall-speed bounds and spawn cadence
    pub fn apply_difficulty(&mut self, factor: f32) {
        self.fall_bounds = (
            self.config.min_fall_speed * factor,
            self.config.max_fall_speed * factor,
        );
        self.cadence_scale = factor.max(1.0);
    }

    /// Place one new body above the viewport top.
    ///
    /// Placement is best-effort: the candidate is nudged upward while it
    /// violates `min_spacing`, and after the retry budget the last
    /// candidate is accepted rather than failing the tick.
    pub fn spawn(&mut self, events: &mut EventQueue) {
        let mut candidate = self.candidate_position();
        let mut placed_clean = self.config.min_spacing <= 0.0;
        for _ in 0..SPAWN_RETRIES {
            if !self.too_close(candidate) {
                placed_clean = true;
                break;
            }
            candidate.y += self.config.vertical_spacing / 2.0;
        }
        if !placed_clean && self.too_close(candidate) {
            log::warn!(
                "spacing constraint unsatisfiable at ({:.2}, {:.2}); accepting closest",
                candidate.x,
                candidate.y
            );
        }

        let scale = self
            .rng
            .random_range(self.config.min_size..=self.config.max_size);
        let rotation_speed = self
            .rng
            .random_range(self.config.min_rotation_speed..=self.config.max_rotation_speed);
        let rotation_dir = if self.rng.random_bool(0.5) { 1.0 } else { -1.0 };
        let (fall_min, fall_max) = self.fall_bounds;
        let fall_speed = self.rng.random_range(fall_min..=fall_max);
        let special = if self.rng.random_bool(self.config.special_chance) {
            let effect = match self.rng.random_range(0..3) {
                0 => SpecialEffect::JumpBoost,
                1 => SpecialEffect::ScoreBonus,
                _ => SpecialEffect::SpeedBoost,
            };
            Some(SpecialPayload {
                effect,
                magnitude: self.rng.random_range(1.0..=3.0),
                consumed: false,
            })
        } else {
            None
        };

        let body = Body {
            id: self.next_id,
            pos: candidate,
            radius: scale * BODY_BASE_RADIUS,
            rotation_speed,
            rotation_dir,
            angle: 0.0,
            fall_speed,
            is_falling: self.continuous_fall,
            is_anchor: false,
            active: true,
            special,
        };
        self.next_id += 1;
        self.spawn_counter += 1;

        log::debug!("spawned body {} at ({:.2}, {:.2})", body.id, candidate.x, candidate.y);
        events.push(GameEvent::BodySpawned {
            id: body.id,
            kind: body.kind(),
        });
        self.bodies.push(body);
    }

    /// Candidate position above the visible top, per the configured layout
    fn candidate_position(&mut self) -> Vec2 {
        let spawn_y = self.viewport.top() + self.config.spawn_height_offset;
        let (left, right) = (self.viewport.left(), self.viewport.right());
        let width = right - left;

        let x = match self.config.layout {
            LayoutMode::Columns {
                columns,
                horizontal_variation,
            } => {
                let columns = columns.max(1);
                let column_width = width / columns as f32;
                let column = self.spawn_counter % columns;
                let mid = left + column_width * (column as f32 + 0.5);
                let variation = column_width * horizontal_variation;
                mid + self.rng.random_range(-variation..=variation)
            }
            LayoutMode::Cascade { intensity, .. } => {
                let step = width * intensity;
                let jitter = self.rng.random_range(-0.25 * step..=0.25 * step);
                let mut x = self.cascade_x + self.cascade_dir * step + jitter;
                if x > right {
                    x = right - (x - right);
                    self.cascade_dir = -1.0;
                } else if x < left {
                    x = left + (left - x);
                    self.cascade_dir = 1.0;
                }
                self.cascade_x = x.clamp(left, right);
                self.cascade_x
            }
            LayoutMode::Random => self.rng.random_range(left..=right),
        };

        Vec2::new(x, spawn_y)
    }

    fn too_close(&self, candidate: Vec2) -> bool {
        self.bodies
            .iter()
            .filter(|b| b.active)
            .any(|b| candidate.distance(b.pos) < self.config.min_spacing)
    }

    /// Advance rotation and falling, recycle off-screen bodies, refill.
    ///
    /// `attached` is the body the player currently stands on; it is a hard
    /// invariant that it is never destroyed here.
    pub fn tick(&mut self, dt: f32, attached: Option<BodyId>, events: &mut EventQueue) {
        for body in self.bodies.iter_mut().filter(|b| b.active) {
            body.advance(dt);
        }

        // Recycle anything below the cull line; the anchor is only hidden
        let cull_y = self.viewport.bottom() - BODY_CULL_MARGIN * 2.0 * self.viewport.half_height;
        let mut i = 0;
        while i < self.bodies.len() {
            let body = &mut self.bodies[i];
            if !body.active || body.pos.y >= cull_y {
                i += 1;
                continue;
            }
            if body.is_anchor {
                log::debug!("anchor {} left the view; hiding", body.id);
                body.active = false;
                i += 1;
            } else if attached == Some(body.id) {
                // Destruction deferred while the player stands on it
                i += 1;
            } else {
                let id = body.id;
                self.bodies.swap_remove(i);
                events.push(GameEvent::BodyDestroyed { id });
            }
        }

        if !self.started {
            return;
        }

        // Refill to the target population. A zero interval refills within
        // this tick; otherwise at most one spawn per (difficulty-scaled)
        // interval.
        if self.config.spawn_interval <= 0.0 {
            while self.population() < self.config.target_count {
                self.spawn(events);
            }
        } else {
            self.spawn_timer -= dt;
            if self.spawn_timer <= 0.0 && self.population() < self.config.target_count {
                self.spawn(events);
                self.spawn_timer = self.config.spawn_interval / self.cadence_scale;
            }
        }
    }

    /// First-launch notification: every non-anchor body starts falling and
    /// continuous-spawn mode is armed. Idempotent.
    pub fn activate_falling(&mut self) {
        if self.continuous_fall {
            return;
        }
        self.continuous_fall = true;
        for body in self.bodies.iter_mut().filter(|b| !b.is_anchor) {
            body.start_falling();
        }
        log::info!("falling activated on {} bodies", self.population());
    }

    /// Public force-fall entry point with the same contract as
    /// [`activate_falling`](Self::activate_falling)
    pub fn force_all_falling(&mut self) {
        self.activate_falling();
    }

    /// Start the anchor falling once the player has left it for good
    pub fn force_anchor_fall(&mut self) {
        let anchor_id = self.anchor_id;
        if let Some(anchor) = self.body_mut(anchor_id) {
            anchor.start_falling();
        }
    }

    /// Destroy every non-anchor body and restore the anchor to its
    /// recorded origin. Population stays empty pending the next `start`.
    pub fn reset(&mut self, events: &mut EventQueue) {
        let anchor_id = self.anchor_id;
        let anchor_origin = self.anchor_origin;
        let mut i = 0;
        while i < self.bodies.len() {
            if self.bodies[i].is_anchor {
                i += 1;
            } else {
                let id = self.bodies[i].id;
                self.bodies.swap_remove(i);
                events.push(GameEvent::BodyDestroyed { id });
            }
        }

        match self.body_mut(anchor_id) {
            Some(anchor) => {
                anchor.pos = anchor_origin;
                anchor.angle = 0.0;
                anchor.is_falling = false;
                anchor.active = true;
            }
            None => {
                // Protocol violation upstream; recover by recreating it
                log::warn!("anchor missing on reset; recreating at origin");
                self.bodies
                    .push(Body::anchor(anchor_id, self.anchor_origin, self.anchor_radius));
            }
        }

        self.started = false;
        self.continuous_fall = false;
        self.spawn_counter = 0;
        self.spawn_timer = 0.0;
        self.cascade_x = self.viewport.center.x;
        self.fall_bounds = (self.config.min_fall_speed, self.config.max_fall_speed);
        self.cadence_scale = 1.0;
    }
}
