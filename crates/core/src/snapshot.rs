use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::pieces::Tetromino;
use crate::scheduler::SessionPhase;
use crate::types::{Difficulty, PieceKind, Rotation};

/// Position of the falling piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActiveSnapshot {
    pub kind: PieceKind,
    pub rotation: Rotation,
    pub x: i8,
    pub y: i8,
}

impl From<Tetromino> for ActiveSnapshot {
    fn from(value: Tetromino) -> Self {
        Self {
            kind: value.kind,
            rotation: value.rotation,
            x: value.x,
            y: value.y,
        }
    }
}

impl From<ActiveSnapshot> for Tetromino {
    fn from(value: ActiveSnapshot) -> Self {
        Self {
            kind: value.kind,
            rotation: value.rotation,
            x: value.x,
            y: value.y,
        }
    }
}

/// Read-only view of a session, published after every applied intent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    /// Publication sequence; strictly increasing per store
    pub seq: u64,
    pub episode_id: u32,
    pub piece_id: u32,
    pub seed: u32,
    pub board: Board,
    pub active: Option<ActiveSnapshot>,
    pub ghost_y: Option<i8>,
    pub next: PieceKind,
    /// Upcoming pieces, `next` first
    pub preview: Vec<PieceKind>,
    pub hold: Option<PieceKind>,
    pub can_hold: bool,
    pub score: u64,
    pub lines_cleared: u32,
    pub level: u32,
    pub combo_streak: u32,
    pub back_to_back: bool,
    pub elapsed_ms: u64,
    pub phase: SessionPhase,
    pub is_game_over: bool,
    pub is_paused: bool,
    pub difficulty: Difficulty,
    pub gravity_interval_ms: u64,
}

impl GameSnapshot {
    pub fn playable(&self) -> bool {
        !self.is_game_over && !self.is_paused
    }

    /// Board with the active piece drawn in, for renderers
    pub fn composed_board(&self) -> Board {
        let Some(active) = self.active else {
            return self.board.clone();
        };
        self.board
            .with_piece_stamped(&active.into())
            .unwrap_or_else(|_| self.board.clone())
    }
}

#[cfg(test)]
mod tests {
    use crate::game_state::{GameConfig, GameState};
    use crate::rng::PieceQueue;
    use crate::types::GameIntent;
    use crate::Board;

    use super::*;

    #[test]
    fn snapshot_reflects_state() {
        let state = GameState::with_queue(
            GameConfig::default(),
            Board::standard(),
            PieceQueue::scripted(5, [PieceKind::T, PieceKind::I, PieceKind::O]),
        );
        let snap = state.snapshot(3);
        assert_eq!(snap.seq, 3);
        assert_eq!(snap.active.map(|a| a.kind), Some(PieceKind::T));
        assert_eq!(snap.active.map(Tetromino::from), state.active());
        assert_eq!(snap.next, PieceKind::I);
        assert_eq!(snap.preview, vec![PieceKind::I]);
        assert_eq!(snap.ghost_y, Some(18));
        assert!(snap.playable());
        assert_eq!(snap.gravity_interval_ms, 1000);
    }

    #[test]
    fn preview_count_follows_config() {
        let config = GameConfig {
            preview_count: 3,
            ..GameConfig::default()
        };
        let state = GameState::with_queue(
            config,
            Board::standard(),
            PieceQueue::scripted(5, [PieceKind::T, PieceKind::I, PieceKind::O, PieceKind::S]),
        );
        let snap = state.snapshot(0);
        assert_eq!(snap.preview, vec![PieceKind::I, PieceKind::O, PieceKind::S]);
    }

    #[test]
    fn composed_board_includes_active_piece() {
        let mut state = GameState::new(GameConfig::default(), 9).unwrap();
        state.apply(GameIntent::Pause).unwrap();
        let snap = state.snapshot(1);
        assert!(snap.is_paused);
        assert_eq!(snap.composed_board().occupied_count(), 4);
        assert_eq!(snap.board.occupied_count(), 0);
    }

    #[test]
    fn snapshot_serializes_camel_case() {
        let state = GameState::new(GameConfig::default(), 9).unwrap();
        let json = serde_json::to_string(&state.snapshot(1)).unwrap();
        assert!(json.contains("\"linesCleared\":0"));
        assert!(json.contains("\"phase\":\"running\""));
    }
}
