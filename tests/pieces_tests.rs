//! Pieces and rotation tests

use stackfall::core::pieces::{kicks, shape, shape_for_index};
use stackfall::core::{try_rotate, Board, CoreError, RotationDirection, Tetromino};
use stackfall::types::{PieceKind, Rotation};

// ============== Shape Tests ==============

#[test]
fn test_i_piece_shapes() {
    assert_eq!(shape(PieceKind::I, Rotation::North), [(0, 1), (1, 1), (2, 1), (3, 1)]);
    assert_eq!(shape(PieceKind::I, Rotation::East), [(2, 0), (2, 1), (2, 2), (2, 3)]);
    assert_eq!(shape(PieceKind::I, Rotation::South), [(0, 2), (1, 2), (2, 2), (3, 2)]);
    assert_eq!(shape(PieceKind::I, Rotation::West), [(1, 0), (1, 1), (1, 2), (1, 3)]);
}

#[test]
fn test_o_piece_shapes() {
    let north = shape(PieceKind::O, Rotation::North);
    for rotation in [Rotation::East, Rotation::South, Rotation::West] {
        assert_eq!(shape(PieceKind::O, rotation), north);
    }
}

#[test]
fn test_all_shapes_have_4_distinct_minos() {
    for kind in PieceKind::ALL {
        for index in 0..4 {
            let minos = shape_for_index(kind, index).unwrap();
            for i in 0..4 {
                for j in (i + 1)..4 {
                    assert_ne!(minos[i], minos[j], "{:?} rotation {}", kind, index);
                }
            }
        }
    }
}

#[test]
fn test_invalid_rotation_index() {
    assert_eq!(
        shape_for_index(PieceKind::T, 4),
        Err(CoreError::InvalidRotationState(4))
    );
}

// ============== Rotation Tests ==============

#[test]
fn test_t_rotation_success() {
    let board = Board::standard();
    let piece = Tetromino {
        kind: PieceKind::T,
        rotation: Rotation::North,
        x: 4,
        y: 5,
    };
    let rotated = try_rotate(&board, &piece, RotationDirection::Clockwise).unwrap();
    assert_eq!(rotated.piece.rotation, Rotation::East);
    assert_eq!(rotated.kick_index, 0);
    assert_eq!((rotated.piece.x, rotated.piece.y), (4, 5));
}

#[test]
fn test_cw_at_left_wall_uses_first_matching_kick() {
    // East T hugging the left wall; South would stick out at x = -1.
    let board = Board::standard();
    let piece = Tetromino {
        kind: PieceKind::T,
        rotation: Rotation::East,
        x: -1,
        y: 5,
    };
    let rotated = try_rotate(&board, &piece, RotationDirection::Clockwise).unwrap();
    let offset = kicks(PieceKind::T, Rotation::East, RotationDirection::Clockwise)[1];

    assert_eq!(rotated.kick_index, 1);
    assert_eq!(rotated.piece.rotation, Rotation::South);
    assert_eq!((rotated.piece.x, rotated.piece.y), (-1 + offset.0, 5 + offset.1));
    assert_eq!((rotated.piece.x, rotated.piece.y), (0, 5));
}

#[test]
fn test_kick_skips_blocked_candidates() {
    // Block the first kick target so the second one must be chosen.
    let mut board = Board::standard();
    let piece = Tetromino {
        kind: PieceKind::T,
        rotation: Rotation::East,
        x: -1,
        y: 5,
    };
    board.set(0, 6, stackfall::types::Cell::Occupied(PieceKind::Z));

    let rotated = try_rotate(&board, &piece, RotationDirection::Clockwise).unwrap();
    let offset = kicks(PieceKind::T, Rotation::East, RotationDirection::Clockwise)[rotated.kick_index];
    assert!(rotated.kick_index > 1);
    assert_eq!((rotated.piece.x, rotated.piece.y), (-1 + offset.0, 5 + offset.1));
}

#[test]
fn test_rotation_failure_leaves_no_result() {
    // I piece standing in a one-wide well cannot turn either way.
    let mut rows = vec!["IIII.IIIII"; 20];
    rows[0] = "..........";
    let board = Board::from_rows(&rows).unwrap();
    let piece = Tetromino {
        kind: PieceKind::I,
        rotation: Rotation::East,
        x: 2,
        y: 16,
    };
    assert!(stackfall::core::can_place(&board, &piece));
    assert!(try_rotate(&board, &piece, RotationDirection::Clockwise).is_none());
    assert!(try_rotate(&board, &piece, RotationDirection::CounterClockwise).is_none());
}

#[test]
fn test_o_rotation_no_kick() {
    let board = Board::standard();
    let piece = Tetromino::spawn(PieceKind::O, 10);
    let rotated = try_rotate(&board, &piece, RotationDirection::Clockwise).unwrap();
    assert_eq!(rotated.kick_index, 0);
    assert_eq!(rotated.piece.blocks(), piece.blocks());
}

#[test]
fn test_ccw_then_cw_returns_to_start() {
    let board = Board::standard();
    for kind in PieceKind::ALL {
        let piece = Tetromino {
            kind,
            rotation: Rotation::North,
            x: 3,
            y: 5,
        };
        let ccw = try_rotate(&board, &piece, RotationDirection::CounterClockwise).unwrap();
        let back = try_rotate(&board, &ccw.piece, RotationDirection::Clockwise).unwrap();
        assert_eq!(back.piece, piece, "{:?}", kind);
    }
}

#[test]
fn test_spawn_position() {
    let piece = Tetromino::spawn(PieceKind::T, 10);
    assert_eq!((piece.x, piece.y, piece.rotation), (3, 0, Rotation::North));
    assert_eq!(Tetromino::spawn(PieceKind::I, 4).x, 0);
    assert_eq!(Tetromino::spawn(PieceKind::I, 16).x, 6);
}
