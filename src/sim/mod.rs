//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Driven by an external dt, one tick at a time
//! - Seeded RNG only
//! - No rendering, audio, or platform dependencies
//!
//! Per-tick order: BodyField moves bodies, OrbitController resolves orbit /
//! flight / attachment against the updated positions, DifficultyScheduler
//! advances, then the session does its bookkeeping.

pub mod body;
pub mod difficulty;
pub mod events;
pub mod field;
pub mod player;
pub mod session;

pub use body::{Body, BodyId, BodyKind, SpecialEffect, SpecialPayload};
pub use difficulty::DifficultyScheduler;
pub use events::{EventQueue, GameEvent};
pub use field::BodyField;
pub use player::{Landing, Motion, OrbitController, PlayerTickOutcome};
pub use session::{Session, SessionPhase, TickInput};
