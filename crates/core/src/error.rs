//! Core error type
//!
//! Illegal moves are not errors (they are no-ops). These variants are
//! programming-error class: they fail the current session, never the process.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("invalid rotation state {0} (expected 0..=3)")]
    InvalidRotationState(u8),

    #[error("invalid board dimensions {width}x{height}")]
    InvalidBoardDimensions { width: u8, height: u8 },

    #[error("cannot lock {kind:?} at ({x}, {y}): cell out of bounds or occupied")]
    LockCollision {
        kind: stackfall_types::PieceKind,
        x: i8,
        y: i8,
    },

    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}
