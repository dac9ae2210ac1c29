//! Discrete events emitted for the presentation layer
//!
//! The core pushes events into a per-session queue; the host drains them
//! after each tick and never feeds anything back synchronously.

use serde::{Deserialize, Serialize};

use super::body::{BodyId, BodyKind, SpecialEffect};

/// One discrete simulation event
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    SessionStarted,
    BodySpawned { id: BodyId, kind: BodyKind },
    BodyDestroyed { id: BodyId },
    /// First launch of the session; fires at most once per session
    FirstLaunch,
    PlayerLaunched,
    PlayerLanded {
        body_id: BodyId,
        effect: Option<SpecialEffect>,
    },
    SessionEnded { final_score: u32 },
}

/// FIFO event queue drained by the host
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Vec<GameEvent>,
}

impl EventQueue {
    pub fn push(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Hand all pending events to the caller, clearing the queue
    pub fn drain(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    #[cfg(test)]
    pub fn pending(&self) -> &[GameEvent] {
        &self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_clears_queue() {
        let mut queue = EventQueue::default();
        queue.push(GameEvent::SessionStarted);
        queue.push(GameEvent::PlayerLaunched);

        let drained = queue.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0], GameEvent::SessionStarted);
        assert!(queue.is_empty());
        assert!(queue.drain().is_empty());
    }
}
