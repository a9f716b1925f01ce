//! Game-over records
//!
//! A record is derived from the terminal snapshot of an episode. Its id is a
//! stable FNV-1a hash so that retried saves of the same game collide and can
//! be deduplicated by the backends.

use std::hash::Hasher;

use crate::core::GameSnapshot;
use crate::types::GameRecord;

/// Stable 64-bit FNV-1a hasher for record ids.
///
/// We avoid `DefaultHasher` here since its output is not guaranteed stable across
/// Rust versions/platforms, and ids are written to disk.
#[derive(Debug, Clone)]
pub struct Fnv1aHasher {
    state: u64,
}

impl Fnv1aHasher {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    pub fn new() -> Self {
        Self {
            state: Self::OFFSET_BASIS,
        }
    }
}

impl Default for Fnv1aHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher for Fnv1aHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.state ^= b as u64;
            self.state = self.state.wrapping_mul(Self::PRIME);
        }
    }
}

pub fn record_id(seed: u32, episode_id: u32, timestamp_ms: u64, score: u64) -> u64 {
    let mut hasher = Fnv1aHasher::new();
    hasher.write_u32(seed);
    hasher.write_u32(episode_id);
    hasher.write_u64(timestamp_ms);
    hasher.write_u64(score);
    hasher.finish()
}

/// Summarize a finished episode
pub fn record_from_snapshot(snapshot: &GameSnapshot, timestamp_ms: u64) -> GameRecord {
    GameRecord {
        id: record_id(snapshot.seed, snapshot.episode_id, timestamp_ms, snapshot.score),
        score: snapshot.score,
        lines_cleared: snapshot.lines_cleared,
        level: snapshot.level,
        difficulty: snapshot.difficulty,
        timestamp_ms,
        duration_ms: snapshot.elapsed_ms,
    }
}

/// Get current timestamp in milliseconds
pub fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{GameConfig, GameState};

    #[test]
    fn fnv_matches_reference_vectors() {
        let mut empty = Fnv1aHasher::new();
        empty.write(b"");
        assert_eq!(empty.finish(), 0xcbf29ce484222325);

        let mut a = Fnv1aHasher::new();
        a.write(b"a");
        assert_eq!(a.finish(), 0xaf63dc4c8601ec8c);
    }

    #[test]
    fn record_id_depends_on_every_field() {
        let base = record_id(1, 0, 1000, 500);
        assert_eq!(base, record_id(1, 0, 1000, 500));
        assert_ne!(base, record_id(2, 0, 1000, 500));
        assert_ne!(base, record_id(1, 1, 1000, 500));
        assert_ne!(base, record_id(1, 0, 1001, 500));
        assert_ne!(base, record_id(1, 0, 1000, 501));
    }

    #[test]
    fn record_copies_snapshot_totals() {
        let state = GameState::new(GameConfig::default(), 77).unwrap();
        let snapshot = state.snapshot(4);
        let record = record_from_snapshot(&snapshot, 1_700_000_000_000);
        assert_eq!(record.score, snapshot.score);
        assert_eq!(record.level, snapshot.level);
        assert_eq!(record.difficulty, snapshot.difficulty);
        assert_eq!(record.timestamp_ms, 1_700_000_000_000);
        assert_eq!(
            record.id,
            record_id(snapshot.seed, snapshot.episode_id, 1_700_000_000_000, snapshot.score)
        );
    }
}
