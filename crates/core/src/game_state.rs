//! Game state module - the session transition function
//!
//! `GameState` ties together the board, the bag, collision, scoring and effect
//! synthesis. Every change goes through [`GameState::apply`], which processes
//! one intent completely (including any chained lock, line clear and spawn)
//! and reports what happened in a [`Transition`].

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::collision::{can_place, ghost_y, try_move, try_rotate};
use crate::effects::{burst_for_clear, ClearEvent};
use crate::error::CoreError;
use crate::pieces::{RotationDirection, Tetromino};
use crate::rng::PieceQueue;
use crate::scheduler::{gravity_interval, SessionPhase};
use crate::scoring::{calculate_drop_score, calculate_level, calculate_score};
use crate::snapshot::GameSnapshot;
use crate::types::{Difficulty, GameIntent, GameSettings, PieceKind, VisualEffectBurst};

/// Rules fixed for the lifetime of one game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    pub board_width: u8,
    pub board_height: u8,
    pub lines_per_level: u32,
    pub difficulty: Difficulty,
    pub preview_count: u8,
}

impl GameConfig {
    pub fn from_settings(settings: &GameSettings) -> Result<Self, CoreError> {
        settings.validate().map_err(CoreError::InvalidSettings)?;
        Ok(Self {
            board_width: settings.board_width,
            board_height: settings.board_height,
            lines_per_level: settings.lines_per_level,
            difficulty: settings.difficulty,
            preview_count: settings.preview_count,
        })
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        let settings = GameSettings::default();
        Self {
            board_width: settings.board_width,
            board_height: settings.board_height,
            lines_per_level: settings.lines_per_level,
            difficulty: settings.difficulty,
            preview_count: settings.preview_count,
        }
    }
}

/// Why an intent was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RejectReason {
    /// Only `Restart` is accepted after game over
    GameOver,
    /// Piece intents are refused while paused
    Paused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IntentOutcome {
    /// State changed
    Applied,
    /// Legal but had no effect (blocked move, repeated pause, stale tick)
    Ignored,
    Rejected(RejectReason),
}

/// Result of locking a piece
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockSummary {
    pub piece: Tetromino,
    /// Cleared rows, top to bottom, before compaction
    pub cleared_rows: Vec<usize>,
    /// Points awarded for the clear (drop points excluded)
    pub clear_points: u64,
    pub combo_streak: u32,
}

/// Everything one intent did
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub outcome: IntentOutcome,
    pub lock: Option<LockSummary>,
    pub effect: Option<VisualEffectBurst>,
    /// This transition moved the session into `GameOver`
    pub entered_game_over: bool,
}

impl Transition {
    fn with_outcome(outcome: IntentOutcome) -> Self {
        Self {
            outcome,
            lock: None,
            effect: None,
            entered_game_over: false,
        }
    }

    fn applied() -> Self {
        Self::with_outcome(IntentOutcome::Applied)
    }

    fn ignored() -> Self {
        Self::with_outcome(IntentOutcome::Ignored)
    }

    fn rejected(reason: RejectReason) -> Self {
        Self::with_outcome(IntentOutcome::Rejected(reason))
    }

    pub fn changed(&self) -> bool {
        self.outcome == IntentOutcome::Applied
    }
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    config: GameConfig,
    board: Board,
    active: Option<Tetromino>,
    next: PieceKind,
    hold: Option<PieceKind>,
    can_hold: bool,
    queue: PieceQueue,
    /// Seed the current episode's queue started from
    seed: u32,
    score: u64,
    lines_cleared: u32,
    level: u32,
    combo_streak: u32,
    /// Previous lock cleared a Tetris
    back_to_back: bool,
    elapsed: Duration,
    phase: SessionPhase,
    /// Monotonic episode id (increments on restart)
    episode_id: u32,
    /// Monotonic id of spawned pieces within the episode
    piece_id: u32,
    /// Id for the next visual effect burst; survives restarts
    next_effect_id: u64,
}

impl GameState {
    /// New game on an empty board, first two pieces already dealt
    pub fn new(config: GameConfig, seed: u32) -> Result<Self, CoreError> {
        let board = Board::new(config.board_width, config.board_height)?;
        Ok(Self::with_queue(config, board, PieceQueue::new(seed)))
    }

    /// New game over a prepared board and queue.
    ///
    /// The board's dimensions override the config's.
    pub fn with_queue(mut config: GameConfig, board: Board, mut queue: PieceQueue) -> Self {
        config.board_width = board.width();
        config.board_height = board.height();
        let seed = queue.seed();
        let next = queue.draw();

        let mut state = Self {
            config,
            board,
            active: None,
            next,
            hold: None,
            can_hold: true,
            queue,
            seed,
            score: 0,
            lines_cleared: 0,
            level: 0,
            combo_streak: 0,
            back_to_back: false,
            elapsed: Duration::ZERO,
            phase: SessionPhase::Running,
            episode_id: 0,
            piece_id: 0,
            next_effect_id: 1,
        };
        state.spawn_next();
        state
    }

    /// Start a new episode with `config`, continuing the piece sequence.
    pub fn restart(&mut self, config: GameConfig) -> Result<(), CoreError> {
        let board = Board::new(config.board_width, config.board_height)?;
        let episode_id = self.episode_id.wrapping_add(1);
        let next_effect_id = self.next_effect_id;
        let queue = PieceQueue::new(self.queue.seed());

        *self = Self::with_queue(config, board, queue);
        self.episode_id = episode_id;
        self.next_effect_id = next_effect_id;
        Ok(())
    }

    /// End the session after an internal failure. Only restart is accepted afterwards.
    pub fn fail(&mut self) {
        self.phase = SessionPhase::GameOver;
        self.active = None;
    }

    /// Account wall time; only running time counts
    pub fn advance_time(&mut self, dt: Duration) {
        if self.phase == SessionPhase::Running {
            self.elapsed += dt;
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn active(&self) -> Option<Tetromino> {
        self.active
    }

    pub fn next_piece(&self) -> PieceKind {
        self.next
    }

    /// Upcoming pieces, `next` first
    pub fn preview(&self, count: usize) -> Vec<PieceKind> {
        let mut pieces = Vec::with_capacity(count);
        if count > 0 {
            pieces.push(self.next);
            pieces.extend(self.queue.preview(count - 1));
        }
        pieces
    }

    pub fn held_piece(&self) -> Option<PieceKind> {
        self.hold
    }

    pub fn can_hold(&self) -> bool {
        self.can_hold
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn lines_cleared(&self) -> u32 {
        self.lines_cleared
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn combo_streak(&self) -> u32 {
        self.combo_streak
    }

    pub fn back_to_back(&self) -> bool {
        self.back_to_back
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == SessionPhase::GameOver
    }

    pub fn is_paused(&self) -> bool {
        self.phase == SessionPhase::Paused
    }

    pub fn episode_id(&self) -> u32 {
        self.episode_id
    }

    pub fn piece_id(&self) -> u32 {
        self.piece_id
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Landing row of the active piece
    pub fn ghost_y(&self) -> Option<i8> {
        self.active.map(|piece| ghost_y(&self.board, &piece))
    }

    pub fn gravity_interval(&self) -> Duration {
        gravity_interval(self.level, self.config.difficulty)
    }

    /// Process one intent.
    ///
    /// Errors are invariant violations; the caller should [`fail`](Self::fail)
    /// the session.
    pub fn apply(&mut self, intent: GameIntent) -> Result<Transition, CoreError> {
        use GameIntent::*;

        match (self.phase, intent) {
            (_, Restart) => {
                self.restart(self.config.clone())?;
                Ok(Transition::applied())
            }
            (SessionPhase::GameOver, _) => Ok(Transition::rejected(RejectReason::GameOver)),

            (SessionPhase::Paused, Pause) => Ok(Transition::ignored()),
            (SessionPhase::Paused, Resume) => {
                self.phase = SessionPhase::Running;
                Ok(Transition::applied())
            }
            // A tick that raced the pause; drop it quietly.
            (SessionPhase::Paused, TickElapsed) => Ok(Transition::ignored()),
            (SessionPhase::Paused, _) => Ok(Transition::rejected(RejectReason::Paused)),

            (SessionPhase::Running, Pause) => {
                self.phase = SessionPhase::Paused;
                Ok(Transition::applied())
            }
            (SessionPhase::Running, Resume) => Ok(Transition::ignored()),
            (SessionPhase::Running, _) => self.apply_gameplay(intent),
        }
    }

    fn apply_gameplay(&mut self, intent: GameIntent) -> Result<Transition, CoreError> {
        let Some(active) = self.active else {
            return Ok(Transition::ignored());
        };

        match intent {
            GameIntent::MoveLeft => Ok(self.shift(&active, -1)),
            GameIntent::MoveRight => Ok(self.shift(&active, 1)),
            GameIntent::RotateCw => Ok(self.rotate(&active, RotationDirection::Clockwise)),
            GameIntent::RotateCcw => Ok(self.rotate(&active, RotationDirection::CounterClockwise)),
            GameIntent::SoftDrop => match try_move(&self.board, &active, 0, 1) {
                Some(moved) => {
                    self.active = Some(moved);
                    self.score += calculate_drop_score(1, false);
                    Ok(Transition::applied())
                }
                None => self.lock(),
            },
            GameIntent::TickElapsed => match try_move(&self.board, &active, 0, 1) {
                Some(moved) => {
                    self.active = Some(moved);
                    Ok(Transition::applied())
                }
                None => self.lock(),
            },
            GameIntent::HardDrop => {
                let landing = ghost_y(&self.board, &active);
                let distance = (landing - active.y).max(0) as u32;
                self.active = Some(Tetromino {
                    y: landing,
                    ..active
                });
                self.score += calculate_drop_score(distance, true);
                self.lock()
            }
            GameIntent::Hold => Ok(self.hold(&active)),
            GameIntent::Pause | GameIntent::Resume | GameIntent::Restart => {
                Ok(Transition::ignored())
            }
        }
    }

    fn shift(&mut self, active: &Tetromino, dx: i8) -> Transition {
        match try_move(&self.board, active, dx, 0) {
            Some(moved) => {
                self.active = Some(moved);
                Transition::applied()
            }
            None => Transition::ignored(),
        }
    }

    fn rotate(&mut self, active: &Tetromino, direction: RotationDirection) -> Transition {
        match try_rotate(&self.board, active, direction) {
            Some(rotated) => {
                self.active = Some(rotated.piece);
                Transition::applied()
            }
            None => Transition::ignored(),
        }
    }

    fn hold(&mut self, active: &Tetromino) -> Transition {
        if !self.can_hold {
            return Transition::ignored();
        }

        let incoming = match self.hold.replace(active.kind) {
            Some(held) => held,
            None => std::mem::replace(&mut self.next, self.queue.draw()),
        };
        self.can_hold = false;

        let piece = Tetromino::spawn(incoming, self.config.board_width);
        let mut transition = Transition::applied();
        if can_place(&self.board, &piece) {
            self.active = Some(piece);
            self.piece_id = self.piece_id.wrapping_add(1);
        } else {
            self.fail();
            transition.entered_game_over = true;
        }
        transition
    }

    /// Lock the active piece, clear lines, score, and spawn the next piece
    fn lock(&mut self) -> Result<Transition, CoreError> {
        let Some(piece) = self.active.take() else {
            return Ok(Transition::ignored());
        };
        self.board.stamp(&piece)?;

        let cleared_rows = self.board.clear_full_rows();
        let mut transition = Transition::applied();
        let mut clear_points = 0;

        if cleared_rows.is_empty() {
            self.combo_streak = 0;
            self.back_to_back = false;
        } else {
            let lines = cleared_rows.len();
            self.combo_streak += 1;

            let result = calculate_score(
                lines,
                self.level,
                self.combo_streak,
                self.back_to_back,
                self.config.difficulty,
            );
            clear_points = result.total;
            self.score += result.total;
            self.back_to_back = result.qualifies_for_b2b;
            self.lines_cleared += lines as u32;
            self.level = calculate_level(self.lines_cleared, self.config.lines_per_level);

            let clear = ClearEvent {
                rows: cleared_rows.clone(),
                combo_streak: self.combo_streak,
                back_to_back: result.b2b_applied,
                points: result.total,
            };
            transition.effect = Some(burst_for_clear(self.next_effect_id, &clear));
            self.next_effect_id += 1;
        }

        transition.lock = Some(LockSummary {
            piece,
            cleared_rows,
            clear_points,
            combo_streak: self.combo_streak,
        });
        transition.entered_game_over = !self.spawn_next();
        Ok(transition)
    }

    /// Promote `next` to active and draw a new `next`.
    ///
    /// Returns false (and ends the game) when the spawn position is blocked.
    fn spawn_next(&mut self) -> bool {
        let kind = std::mem::replace(&mut self.next, self.queue.draw());
        let piece = Tetromino::spawn(kind, self.config.board_width);
        self.can_hold = true;

        if !can_place(&self.board, &piece) {
            self.fail();
            return false;
        }
        self.active = Some(piece);
        self.piece_id = self.piece_id.wrapping_add(1);
        true
    }

    /// Immutable view of the current state
    pub fn snapshot(&self, seq: u64) -> GameSnapshot {
        GameSnapshot {
            seq,
            episode_id: self.episode_id,
            piece_id: self.piece_id,
            seed: self.seed,
            board: self.board.clone(),
            active: self.active.map(Into::into),
            ghost_y: self.ghost_y(),
            next: self.next,
            preview: self.preview(self.config.preview_count as usize),
            hold: self.hold,
            can_hold: self.can_hold,
            score: self.score,
            lines_cleared: self.lines_cleared,
            level: self.level,
            combo_streak: self.combo_streak,
            back_to_back: self.back_to_back,
            elapsed_ms: self.elapsed.as_millis() as u64,
            phase: self.phase,
            is_game_over: self.is_game_over(),
            is_paused: self.is_paused(),
            difficulty: self.config.difficulty,
            gravity_interval_ms: self.gravity_interval().as_millis() as u64,
        }
    }

    #[cfg(any(test, feature = "test-util"))]
    #[doc(hidden)]
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    #[cfg(any(test, feature = "test-util"))]
    #[doc(hidden)]
    pub fn set_active(&mut self, piece: Tetromino) {
        self.active = Some(piece);
    }
}
