//! Pieces module - tetromino shapes and SRS wall kick tables
//!
//! Shapes are 4 mino offsets inside the piece's bounding box (4x4 for I, 3x3
//! for the rest, O sits in the middle columns of a 4-wide box). Kick offsets
//! follow the Super Rotation System, converted to board coordinates where y
//! grows downward (the published tables are y-up, so every dy is negated).
//!
//! Reference: https://tetris.wiki/SRS

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{PieceKind, Rotation};

/// Offset of a single mino relative to piece origin
pub type MinoOffset = (i8, i8);

/// Shape of a piece - 4 mino offsets from piece origin
pub type PieceShape = [MinoOffset; 4];

/// Kick candidates for one rotation transition; index 0 is the unkicked rotation
pub type KickSet = [MinoOffset; 5];

/// Rotation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RotationDirection {
    Clockwise,
    CounterClockwise,
}

impl RotationDirection {
    pub fn apply(self, rotation: Rotation) -> Rotation {
        match self {
            RotationDirection::Clockwise => rotation.rotate_cw(),
            RotationDirection::CounterClockwise => rotation.rotate_ccw(),
        }
    }

    fn column(self) -> usize {
        match self {
            RotationDirection::Clockwise => 0,
            RotationDirection::CounterClockwise => 1,
        }
    }
}

/// Shape table indexed by `[kind.index()][rotation.index()]`
const SHAPES: [[PieceShape; 4]; 7] = [
    // I
    [
        [(0, 1), (1, 1), (2, 1), (3, 1)],
        [(2, 0), (2, 1), (2, 2), (2, 3)],
        [(0, 2), (1, 2), (2, 2), (3, 2)],
        [(1, 0), (1, 1), (1, 2), (1, 3)],
    ],
    // O
    [
        [(1, 0), (2, 0), (1, 1), (2, 1)],
        [(1, 0), (2, 0), (1, 1), (2, 1)],
        [(1, 0), (2, 0), (1, 1), (2, 1)],
        [(1, 0), (2, 0), (1, 1), (2, 1)],
    ],
    // T
    [
        [(1, 0), (0, 1), (1, 1), (2, 1)],
        [(1, 0), (1, 1), (2, 1), (1, 2)],
        [(0, 1), (1, 1), (2, 1), (1, 2)],
        [(1, 0), (0, 1), (1, 1), (1, 2)],
    ],
    // S
    [
        [(1, 0), (2, 0), (0, 1), (1, 1)],
        [(1, 0), (1, 1), (2, 1), (2, 2)],
        [(1, 1), (2, 1), (0, 2), (1, 2)],
        [(0, 0), (0, 1), (1, 1), (1, 2)],
    ],
    // Z
    [
        [(0, 0), (1, 0), (1, 1), (2, 1)],
        [(2, 0), (1, 1), (2, 1), (1, 2)],
        [(0, 1), (1, 1), (1, 2), (2, 2)],
        [(1, 0), (0, 1), (1, 1), (0, 2)],
    ],
    // J
    [
        [(0, 0), (0, 1), (1, 1), (2, 1)],
        [(1, 0), (2, 0), (1, 1), (1, 2)],
        [(0, 1), (1, 1), (2, 1), (2, 2)],
        [(1, 0), (1, 1), (0, 2), (1, 2)],
    ],
    // L
    [
        [(2, 0), (0, 1), (1, 1), (2, 1)],
        [(1, 0), (1, 1), (1, 2), (2, 2)],
        [(0, 1), (1, 1), (2, 1), (0, 2)],
        [(0, 0), (1, 0), (1, 1), (1, 2)],
    ],
];

/// Kick table indexed by `[from.index()][direction]` (0 = CW, 1 = CCW)
pub type KickTable = [[KickSet; 2]; 4];

/// JLSTZ kick table (shared by J, L, S, T, Z)
const JLSTZ_KICKS: KickTable = [
    // from North: N->E, N->W
    [
        [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)],
        [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)],
    ],
    // from East: E->S, E->N
    [
        [(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)],
        [(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)],
    ],
    // from South: S->W, S->E
    [
        [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)],
        [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)],
    ],
    // from West: W->N, W->S
    [
        [(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)],
        [(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)],
    ],
];

/// I piece kick table
const I_KICKS: KickTable = [
    // from North: N->E, N->W
    [
        [(0, 0), (-2, 0), (1, 0), (-2, 1), (1, -2)],
        [(0, 0), (-1, 0), (2, 0), (-1, -2), (2, 1)],
    ],
    // from East: E->S, E->N
    [
        [(0, 0), (-1, 0), (2, 0), (-1, -2), (2, 1)],
        [(0, 0), (2, 0), (-1, 0), (2, -1), (-1, 2)],
    ],
    // from South: S->W, S->E
    [
        [(0, 0), (2, 0), (-1, 0), (2, -1), (-1, 2)],
        [(0, 0), (1, 0), (-2, 0), (1, 2), (-2, -1)],
    ],
    // from West: W->N, W->S
    [
        [(0, 0), (1, 0), (-2, 0), (1, 2), (-2, -1)],
        [(0, 0), (-2, 0), (1, 0), (-2, 1), (1, -2)],
    ],
];

/// O piece never kicks; every candidate is the identity
const O_KICKS: KickTable = [[[(0, 0); 5]; 2]; 4];

/// Mino offsets for a piece kind and rotation
pub fn shape(kind: PieceKind, rotation: Rotation) -> PieceShape {
    SHAPES[kind.index()][rotation.index() as usize]
}

/// Mino offsets for a raw rotation index
pub fn shape_for_index(kind: PieceKind, rotation: u8) -> Result<PieceShape, CoreError> {
    let rotation = Rotation::from_index(rotation).ok_or(CoreError::InvalidRotationState(rotation))?;
    Ok(shape(kind, rotation))
}

pub fn kick_table(kind: PieceKind) -> &'static KickTable {
    match kind {
        PieceKind::O => &O_KICKS,
        PieceKind::I => &I_KICKS,
        _ => &JLSTZ_KICKS,
    }
}

/// Kick candidates, in priority order, for rotating `from` in `direction`
pub fn kicks(kind: PieceKind, from: Rotation, direction: RotationDirection) -> &'static KickSet {
    &kick_table(kind)[from.index() as usize][direction.column()]
}

/// Active falling piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tetromino {
    pub kind: PieceKind,
    pub rotation: Rotation,
    pub x: i8,
    pub y: i8,
}

impl Tetromino {
    /// New piece in spawn orientation, horizontally centered at the top
    pub fn spawn(kind: PieceKind, board_width: u8) -> Self {
        Self {
            kind,
            rotation: Rotation::North,
            x: ((board_width as i16 - 4) / 2) as i8,
            y: 0,
        }
    }

    pub fn shape(&self) -> PieceShape {
        shape(self.kind, self.rotation)
    }

    /// Absolute board coordinates of the 4 minos
    pub fn blocks(&self) -> [(i8, i8); 4] {
        self.shape().map(|(dx, dy)| (self.x + dx, self.y + dy))
    }

    pub fn shifted(&self, dx: i8, dy: i8) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_shape_has_four_distinct_minos() {
        for kind in PieceKind::ALL {
            for idx in 0..4u8 {
                let s = shape_for_index(kind, idx).unwrap();
                for i in 0..4 {
                    for j in (i + 1)..4 {
                        assert_ne!(s[i], s[j], "{:?} rot {} repeats a mino", kind, idx);
                    }
                }
            }
        }
    }

    #[test]
    fn rotation_index_out_of_range_is_an_error() {
        assert_eq!(
            shape_for_index(PieceKind::T, 4),
            Err(CoreError::InvalidRotationState(4))
        );
    }

    #[test]
    fn first_kick_is_always_identity() {
        for kind in PieceKind::ALL {
            for from in 0..4u8 {
                let from = Rotation::from_index(from).unwrap();
                for dir in [RotationDirection::Clockwise, RotationDirection::CounterClockwise] {
                    assert_eq!(kicks(kind, from, dir)[0], (0, 0));
                }
            }
        }
    }

    #[test]
    fn kick_tables_are_mirrored_by_reverse_rotation() {
        // Rotating A->B with kick k and then B->A with the reverse kick must be
        // symmetric: table(B->A)[i] == -table(A->B)[i].
        for kind in [PieceKind::T, PieceKind::I] {
            for from_idx in 0..4u8 {
                let from = Rotation::from_index(from_idx).unwrap();
                let to = from.rotate_cw();
                let forward = kicks(kind, from, RotationDirection::Clockwise);
                let back = kicks(kind, to, RotationDirection::CounterClockwise);
                for i in 0..5 {
                    assert_eq!(back[i], (-forward[i].0, -forward[i].1));
                }
            }
        }
    }

    #[test]
    fn spawn_is_centered() {
        let piece = Tetromino::spawn(PieceKind::I, 10);
        assert_eq!((piece.x, piece.y), (3, 0));
        assert_eq!(piece.blocks(), [(3, 1), (4, 1), (5, 1), (6, 1)]);

        let narrow = Tetromino::spawn(PieceKind::T, 4);
        assert_eq!(narrow.x, 0);
    }
}
