//! Session orchestration: Menu <-> Running, score, game over
//!
//! The session is the sole writer of the running phase. Per tick it drives
//! the components in dependency order (field, player, difficulty) and does
//! the bookkeeping that couples them: first-launch activation, anchor
//! fall-off, score accrual, viewport-exit game over.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::bestscore::ScoreStore;
use crate::config::{ConfigError, SessionConfig};

use super::body::SpecialEffect;
use super::difficulty::DifficultyScheduler;
use super::events::{EventQueue, GameEvent};
use super::field::BodyField;
use super::player::OrbitController;

/// Input samples for a single tick, provided by the host
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Normalized horizontal axis in [-1, 1]
    pub axis: f32,
    /// Launch requested this tick
    pub launch: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Menu,
    Running,
}

/// One play session: owns the field, the player, and the difficulty curve
pub struct Session {
    config: SessionConfig,
    phase: SessionPhase,
    field: BodyField,
    player: OrbitController,
    difficulty: DifficultyScheduler,
    score: f32,
    best_score: u32,
    store: Box<dyn ScoreStore>,
    events: EventQueue,
    /// Latched once the player first lands away from the anchor
    anchor_left: bool,
}

impl Session {
    pub fn new(config: SessionConfig, seed: u64, store: Box<dyn ScoreStore>) -> Self {
        let field = BodyField::new(
            config.field.clone(),
            config.viewport,
            config.anchor_pos,
            config.anchor_radius,
            Pcg32::seed_from_u64(seed),
        );
        let anchor = super::body::Body::anchor(field.anchor_id(), config.anchor_pos, config.anchor_radius);
        let player = OrbitController::new(config.player.clone(), &anchor);
        let difficulty = DifficultyScheduler::new(config.difficulty.clone());
        let best_score = store.load_best();

        Self {
            config,
            phase: SessionPhase::Menu,
            field,
            player,
            difficulty,
            score: 0.0,
            best_score,
            store,
            events: EventQueue::default(),
            anchor_left: false,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn score(&self) -> f32 {
        self.score
    }

    pub fn best_score(&self) -> u32 {
        self.best_score
    }

    pub fn difficulty_factor(&self) -> f32 {
        self.difficulty.factor()
    }

    pub fn field(&self) -> &BodyField {
        &self.field
    }

    pub fn player(&self) -> &OrbitController {
        &self.player
    }

    /// Hand pending presentation events to the host
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.events.drain()
    }

    /// Menu -> Running. Configuration errors are fatal to the start and
    /// leave the session in Menu.
    pub fn start(&mut self) -> Result<(), ConfigError> {
        self.config.validate()?;
        if self.phase == SessionPhase::Running {
            log::warn!("start ignored: session already running");
            return Ok(());
        }

        self.score = 0.0;
        self.anchor_left = false;
        self.difficulty.reset();
        self.field.reset(&mut self.events);
        self.field.apply_difficulty(1.0);
        self.events.push(GameEvent::SessionStarted);
        self.field.start(&mut self.events);
        self.reset_player();
        self.phase = SessionPhase::Running;
        log::info!("session started");
        Ok(())
    }

    /// Advance one simulation tick. No-op in Menu.
    pub fn tick(&mut self, input: &TickInput, dt: f32) {
        if self.phase != SessionPhase::Running {
            return;
        }

        // Bodies move first so attachment checks see current positions
        self.field
            .tick(dt, self.player.attached_body(), &mut self.events);
        let outcome = self.player.tick(
            input,
            dt,
            &mut self.field,
            self.config.boost_duration,
            &mut self.events,
        );
        self.difficulty.tick(dt);
        self.field.apply_difficulty(self.difficulty.factor());

        self.score += dt * self.config.score_multiplier;

        if outcome.first_launch {
            self.field.activate_falling();
        }

        if let Some(landing) = outcome.landed {
            if let Some((SpecialEffect::ScoreBonus, magnitude)) = landing.effect {
                self.score += self.config.score_bonus_base * magnitude;
            }
            // The anchor starts falling once the player has settled elsewhere
            if !self.anchor_left && landing.body_id != self.field.anchor_id() {
                self.anchor_left = true;
                self.field.force_anchor_fall();
            }
        }

        if !self.config.viewport.contains(self.player.pos()) {
            self.end_session();
        }
    }

    /// Running -> Menu: persist the best score, notify, reset everything
    fn end_session(&mut self) {
        let final_score = self.score.floor() as u32;
        if final_score > self.best_score {
            self.best_score = final_score;
            self.store.save_best(final_score);
            log::info!("new best score: {final_score}");
        }
        self.events.push(GameEvent::SessionEnded { final_score });

        self.field.reset(&mut self.events);
        self.reset_player();
        self.difficulty.reset();
        self.score = 0.0;
        self.anchor_left = false;
        self.phase = SessionPhase::Menu;
        log::info!("session ended with score {final_score}");
    }

    fn reset_player(&mut self) {
        match self.field.body(self.field.anchor_id()) {
            Some(anchor) => {
                let anchor = anchor.clone();
                self.player.reset(&anchor);
            }
            None => log::warn!("anchor missing while resetting player"),
        }
    }
}
