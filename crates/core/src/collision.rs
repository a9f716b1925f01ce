//! Collision and placement - legality of piece positions
//!
//! All functions are pure: they take a board and a piece and return a verdict
//! or a new piece value. Blocked moves yield `None`, never an error.

use crate::board::Board;
use crate::pieces::{kicks, RotationDirection, Tetromino};

/// Result of a successful rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rotated {
    pub piece: Tetromino,
    /// Index into the kick table that succeeded (0 = no kick)
    pub kick_index: usize,
}

/// True iff every block is in bounds and on an empty cell
pub fn can_place(board: &Board, piece: &Tetromino) -> bool {
    piece
        .blocks()
        .iter()
        .all(|&(x, y)| board.is_empty_cell(x, y))
}

/// Piece shifted by `(dx, dy)`, or `None` when the target is blocked
pub fn try_move(board: &Board, piece: &Tetromino, dx: i8, dy: i8) -> Option<Tetromino> {
    let moved = piece.shifted(dx, dy);
    can_place(board, &moved).then_some(moved)
}

/// Rotate with SRS wall kicks.
///
/// Candidates are tried in the fixed table order for this kind and transition;
/// the first legal one wins.
pub fn try_rotate(board: &Board, piece: &Tetromino, direction: RotationDirection) -> Option<Rotated> {
    let rotated = Tetromino {
        rotation: direction.apply(piece.rotation),
        ..*piece
    };

    kicks(piece.kind, piece.rotation, direction)
        .iter()
        .enumerate()
        .find_map(|(kick_index, &(dx, dy))| {
            let candidate = rotated.shifted(dx, dy);
            can_place(board, &candidate).then_some(Rotated {
                piece: candidate,
                kick_index,
            })
        })
}

/// Lowest legal y reachable by dropping straight down
///
/// If the piece itself is not placeable its current y is returned.
pub fn ghost_y(board: &Board, piece: &Tetromino) -> i8 {
    let mut landing = *piece;
    while let Some(next) = try_move(board, &landing, 0, 1) {
        landing = next;
    }
    landing.y
}

/// Piece rests on the stack or the floor
pub fn is_grounded(board: &Board, piece: &Tetromino) -> bool {
    try_move(board, piece, 0, 1).is_none()
}
