//! Headless autoplay planner
//!
//! Picks a target rotation and column for the active piece and turns it into
//! the intent sequence (rotations, shifts, hard drop) that reaches it. The
//! sequence is validated against the board with the same collision rules the
//! engine uses, so a planned sequence never produces an ignored intent.

use crate::core::{can_place, ghost_y, try_move, try_rotate, Board, GameSnapshot, RotationDirection, Tetromino};
use crate::types::{GameIntent, Rotation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceError {
    RotationBlocked,
    XOutOfBounds,
    XBlocked,
    NotPlayable,
    NoActive,
}

impl PlaceError {
    pub fn message(self) -> &'static str {
        match self {
            PlaceError::RotationBlocked => "could not rotate to target rotation",
            PlaceError::XOutOfBounds => "target x would place piece out of bounds",
            PlaceError::XBlocked => "could not move to target x due to collision",
            PlaceError::NotPlayable => "game is not playable",
            PlaceError::NoActive => "no active piece",
        }
    }
}

/// A reachable landing spot
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub rotation: Rotation,
    pub x: i8,
    pub intents: Vec<GameIntent>,
    /// Heuristic value of the resulting board; higher is better
    pub value: f64,
}

/// Intents that bring `active` to `target_rot` at column `target_x` and hard drop it.
pub fn plan_place(
    board: &Board,
    active: Tetromino,
    target_rot: Rotation,
    target_x: i8,
) -> Result<(Vec<GameIntent>, Tetromino), PlaceError> {
    let cur = active.rotation.index() as i8;
    let tgt = target_rot.index() as i8;
    let cw = (tgt - cur).rem_euclid(4) as u8;
    let ccw = (cur - tgt).rem_euclid(4) as u8;

    // Shorter direction first; a 180 tries both.
    let mut plans = [(RotationDirection::Clockwise, cw), (RotationDirection::CounterClockwise, ccw)];
    if plans[1].1 < plans[0].1 {
        plans.swap(0, 1);
    }

    let mut rotated = None;
    for (direction, steps) in plans {
        let mut piece = active;
        let mut intents = Vec::with_capacity(steps as usize + 8);
        let mut ok = true;
        for _ in 0..steps {
            match try_rotate(board, &piece, direction) {
                Some(r) => {
                    piece = r.piece;
                    intents.push(match direction {
                        RotationDirection::Clockwise => GameIntent::RotateCw,
                        RotationDirection::CounterClockwise => GameIntent::RotateCcw,
                    });
                }
                None => {
                    ok = false;
                    break;
                }
            }
        }
        if ok {
            rotated = Some((intents, piece));
            break;
        }
    }
    let Some((mut intents, mut piece)) = rotated else {
        return Err(PlaceError::RotationBlocked);
    };

    let shape = piece.shape();
    let min_dx = shape.iter().map(|&(dx, _)| dx).min().unwrap_or(0);
    let max_dx = shape.iter().map(|&(dx, _)| dx).max().unwrap_or(0);
    if target_x + min_dx < 0 || target_x + max_dx >= board.width() as i8 {
        return Err(PlaceError::XOutOfBounds);
    }

    let (step, intent) = if target_x > piece.x {
        (1, GameIntent::MoveRight)
    } else {
        (-1, GameIntent::MoveLeft)
    };
    while piece.x != target_x {
        piece = try_move(board, &piece, step, 0).ok_or(PlaceError::XBlocked)?;
        intents.push(intent);
    }

    let landed = Tetromino {
        y: ghost_y(board, &piece),
        ..piece
    };
    intents.push(GameIntent::HardDrop);
    Ok((intents, landed))
}

/// Weighted sum of aggregate height, cleared lines, holes and bumpiness
pub fn evaluate(board: &Board, lines: usize) -> f64 {
    let width = board.width() as i8;
    let heights: Vec<i32> = (0..width).map(|x| board.column_height(x) as i32).collect();
    let aggregate: i32 = heights.iter().sum();
    let bumpiness: i32 = heights.windows(2).map(|w| (w[0] - w[1]).abs()).sum();

    let mut holes = 0;
    for x in 0..width {
        let top = board.height() as i32 - heights[x as usize];
        for y in top..board.height() as i32 {
            if board.is_empty_cell(x, y as i8) {
                holes += 1;
            }
        }
    }

    -0.51 * aggregate as f64 + 0.76 * lines as f64 - 0.36 * holes as f64 - 0.18 * bumpiness as f64
}

/// Best reachable placement for `active`, if any
pub fn choose_placement(board: &Board, active: Tetromino) -> Option<Placement> {
    let mut best: Option<Placement> = None;

    for rotation in [Rotation::North, Rotation::East, Rotation::South, Rotation::West] {
        for x in -3..board.width() as i8 {
            let Ok((intents, landed)) = plan_place(board, active, rotation, x) else {
                continue;
            };
            if !can_place(board, &landed) {
                continue;
            }
            let Ok(mut after) = board.with_piece_stamped(&landed) else {
                continue;
            };
            let lines = after.clear_full_rows().len();
            let value = evaluate(&after, lines);

            if best.as_ref().map_or(true, |b| value > b.value) {
                best = Some(Placement {
                    rotation,
                    x,
                    intents,
                    value,
                });
            }
        }
    }

    best
}

/// Intent sequence for the snapshot's active piece
pub fn plan_snapshot(snapshot: &GameSnapshot) -> Result<Vec<GameIntent>, PlaceError> {
    if !snapshot.playable() {
        return Err(PlaceError::NotPlayable);
    }
    let active: Tetromino = snapshot.active.ok_or(PlaceError::NoActive)?.into();
    Ok(choose_placement(&snapshot.board, active)
        .map(|p| p.intents)
        .unwrap_or_else(|| vec![GameIntent::HardDrop]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{GameConfig, GameState};
    use crate::types::PieceKind;

    #[test]
    fn plan_rejects_out_of_bounds_target() {
        let board = Board::standard();
        let piece = Tetromino::spawn(PieceKind::T, 10);
        assert_eq!(
            plan_place(&board, piece, Rotation::North, -50).unwrap_err(),
            PlaceError::XOutOfBounds
        );
    }

    #[test]
    fn plan_reports_blocked_shift() {
        let mut board = Board::standard();
        let piece = Tetromino::spawn(PieceKind::O, 10);
        for (x, y) in piece.shifted(-1, 0).blocks() {
            board.set(x, y, crate::types::Cell::Occupied(PieceKind::I));
        }
        assert_eq!(
            plan_place(&board, piece, Rotation::North, piece.x - 1).unwrap_err(),
            PlaceError::XBlocked
        );
    }

    #[test]
    fn plan_uses_shorter_rotation() {
        let board = Board::standard();
        let piece = Tetromino::spawn(PieceKind::T, 10);
        let (intents, landed) = plan_place(&board, piece, Rotation::West, piece.x).unwrap();
        assert_eq!(intents, vec![GameIntent::RotateCcw, GameIntent::HardDrop]);
        assert_eq!(landed.rotation, Rotation::West);
    }

    #[test]
    fn chooses_the_gap_for_an_i_piece() {
        let board = Board::from_rows(&[
            "..........",
            "..........",
            "..........",
            "IIIIII....",
        ])
        .unwrap();
        let piece = Tetromino::spawn(PieceKind::I, board.width());
        let placement = choose_placement(&board, piece).unwrap();
        assert_eq!(placement.rotation, Rotation::North);
        assert_eq!(placement.x, 6);
    }

    #[test]
    fn planned_intents_are_all_applied() {
        let mut state = GameState::new(GameConfig::default(), 2024).unwrap();
        for _ in 0..30 {
            if state.is_game_over() {
                break;
            }
            let intents = plan_snapshot(&state.snapshot(0)).unwrap();
            for intent in intents {
                assert!(state.apply(intent).unwrap().changed(), "{:?} was not applied", intent);
            }
        }
        assert!(!state.is_game_over());
    }
}
