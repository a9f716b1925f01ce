//! Core game logic - pure, deterministic, and testable
//!
//! This crate contains the game rules and the session state machine. It has
//! no dependencies on I/O, timers, or rendering, so the same seed always
//! produces the same game:
//!
//! - [`board`]: configurable grid with row clearing and piece stamping
//! - [`pieces`]: tetromino shapes and SRS wall kick tables
//! - [`collision`]: placement, movement, rotation with kicks, ghost position
//! - [`rng`]: seeded 7-bag randomizer
//! - [`scoring`]: line clears, combos, back-to-back, drop points, levels
//! - [`effects`]: visual effect bursts for line clears
//! - [`scheduler`]: session phases and gravity intervals
//! - [`game_state`]: the transition function tying everything together
//! - [`snapshot`]: read-only views handed to observers
//!
//! # Example
//!
//! ```
//! use stackfall_core::{GameConfig, GameState};
//! use stackfall_core::types::GameIntent;
//!
//! let mut game = GameState::new(GameConfig::default(), 12345).unwrap();
//!
//! game.apply(GameIntent::MoveRight).unwrap();
//! game.apply(GameIntent::RotateCw).unwrap();
//! game.apply(GameIntent::HardDrop).unwrap();
//!
//! // Hard drop awards two points per row
//! assert!(game.score() > 0);
//! ```
//!
//! Gravity is not driven from here. The caller delivers
//! [`GameIntent::TickElapsed`](types::GameIntent::TickElapsed) at the interval
//! given by [`GameState::gravity_interval`].

pub mod board;
pub mod collision;
pub mod effects;
pub mod error;
pub mod game_state;
pub mod pieces;
pub mod rng;
pub mod scheduler;
pub mod scoring;
pub mod snapshot;

pub use stackfall_types as types;

// Re-export commonly used types for convenience
pub use board::Board;
pub use collision::{can_place, ghost_y, try_move, try_rotate};
pub use error::CoreError;
pub use game_state::{GameConfig, GameState, IntentOutcome, LockSummary, RejectReason, Transition};
pub use pieces::{RotationDirection, Tetromino};
pub use rng::{PieceQueue, SimpleRng};
pub use scheduler::{gravity_interval, GravityPlan, SessionPhase, TimerDirective};
pub use scoring::{calculate_drop_score, calculate_score, ScoreResult};
pub use snapshot::{ActiveSnapshot, GameSnapshot};
