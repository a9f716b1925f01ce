//! Completed-game summary handed to the history repository

use serde::{Deserialize, Serialize};

use crate::Difficulty;

/// Summary of one finished session
///
/// Created exactly once when a session reaches game over; never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: u64,
    pub score: u64,
    pub lines_cleared: u32,
    pub level: u32,
    pub difficulty: Difficulty,
    /// Unix time of the game-over transition, in milliseconds
    pub timestamp_ms: u64,
    /// Time spent running (pauses excluded), in milliseconds
    pub duration_ms: u64,
}
