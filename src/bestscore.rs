//! Best-score persistence collaborator
//!
//! The core stores a single integer best score. It is loaded once when the
//! session is created and written only at session end, and only when the
//! new score exceeds the previous best. Storage failures never reach the
//! simulation; they degrade to the in-memory value with a logged warning.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the best score lives between runs
pub trait ScoreStore {
    fn load_best(&self) -> u32;
    fn save_best(&mut self, score: u32);
}

/// Volatile store for embedding and tests
#[derive(Debug, Default)]
pub struct MemoryScoreStore {
    best: u32,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_best(best: u32) -> Self {
        Self { best }
    }
}

impl ScoreStore for MemoryScoreStore {
    fn load_best(&self) -> u32 {
        self.best
    }

    fn save_best(&mut self, score: u32) {
        self.best = score;
    }
}

/// JSON envelope on disk
#[derive(Debug, Serialize, Deserialize)]
struct BestScoreRecord {
    best: u32,
}

/// File-backed store persisting a small JSON record
#[derive(Debug)]
pub struct JsonFileScoreStore {
    path: PathBuf,
}

impl JsonFileScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ScoreStore for JsonFileScoreStore {
    fn load_best(&self) -> u32 {
        match std::fs::read_to_string(&self.path) {
            Ok(json) => match serde_json::from_str::<BestScoreRecord>(&json) {
                Ok(record) => record.best,
                Err(err) => {
                    log::warn!("corrupt best-score file {:?}: {err}", self.path);
                    0
                }
            },
            // Missing file is the first-run case
            Err(_) => 0,
        }
    }

    fn save_best(&mut self, score: u32) {
        let record = BestScoreRecord { best: score };
        let json = match serde_json::to_string(&record) {
            Ok(json) => json,
            Err(err) => {
                log::warn!("failed to encode best score: {err}");
                return;
            }
        };
        if let Err(err) = std::fs::write(&self.path, json) {
            log::warn!("failed to write best score to {:?}: {err}", self.path);
        }
    }
}
