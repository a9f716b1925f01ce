//! Shared types - data structures and constants used by every stackfall crate
//!
//! Everything here is plain data: no game rules, no I/O. The core engine, the
//! persistence adapters and the session store all speak in these types.
//!
//! # Board Dimensions
//!
//! The standard playfield is 10 columns by 20 rows. Boards are configurable
//! through [`GameSettings`] within [`MIN_BOARD_DIM`]..=[`MAX_BOARD_DIM`].
//! Coordinates are `(x, y)` with `y` growing downward (row 0 is the top).
//!
//! # Drop Intervals by Level
//!
//! Gravity speeds up with level (milliseconds per row, `Normal` difficulty):
//!
//! | Level | Interval |
//! |-------|----------|
//! | 0 | 1000ms |
//! | 1 | 800ms |
//! | 2 | 650ms |
//! | 3 | 500ms |
//! | 4 | 400ms |
//! | 5 | 320ms |
//! | 6 | 250ms |
//! | 7 | 200ms |
//! | 8 | 160ms |
//! | 9+ | -10ms per level, clamped at 100ms |
//!
//! # Examples
//!
//! ```
//! use stackfall_types::{GameIntent, PieceKind, Rotation, BOARD_HEIGHT, BOARD_WIDTH};
//!
//! assert_eq!(PieceKind::from_str("t"), Some(PieceKind::T));
//! assert_eq!(Rotation::North.rotate_cw(), Rotation::East);
//! assert_eq!(GameIntent::from_str("hardDrop"), Some(GameIntent::HardDrop));
//! assert_eq!((BOARD_WIDTH, BOARD_HEIGHT), (10, 20));
//! ```

use serde::{Deserialize, Serialize};

pub mod effects;
pub mod record;
pub mod settings;

pub use effects::{VisualEffectBurst, VisualEffectEvent};
pub use record::GameRecord;
pub use settings::{ControlScheme, Difficulty, GameSettings};

/// Standard board width in cells (10 columns)
pub const BOARD_WIDTH: u8 = 10;

/// Standard board height in cells (20 rows)
pub const BOARD_HEIGHT: u8 = 20;

/// Smallest accepted board dimension (a piece must fit in its 4x4 box)
pub const MIN_BOARD_DIM: u8 = 4;

/// Largest accepted board dimension
pub const MAX_BOARD_DIM: u8 = 64;

/// Drop intervals by level (milliseconds per row)
///
/// Index 0 = Level 0, Index 8 = Level 8
pub const DROP_INTERVALS: [u32; 9] = [1000, 800, 650, 500, 400, 320, 250, 200, 160];

/// Interval reduction per level beyond the table
pub const DROP_INTERVAL_STEP_MS: u32 = 10;

/// Absolute minimum drop interval (100ms)
pub const DROP_INTERVAL_MIN_MS: u32 = 100;

/// Default number of cleared lines per level
pub const DEFAULT_LINES_PER_LEVEL: u32 = 10;

/// Line clear scoring table (guideline values, multiplied by level + 1)
///
/// - 1 line: 100 points
/// - 2 lines: 300 points
/// - 3 lines: 500 points
/// - 4 lines: 800 points (Tetris)
pub const LINE_SCORES: [u32; 5] = [0, 100, 300, 500, 800];

/// Combo bonus per streak step, multiplied by level + 1
pub const COMBO_BASE: u32 = 50;

/// Back-to-back bonus numerator (3/2 = 1.5x multiplier)
pub const B2B_NUMERATOR: u32 = 3;

/// Back-to-back bonus denominator
pub const B2B_DENOMINATOR: u32 = 2;

/// Points per row for a soft drop
pub const SOFT_DROP_POINTS: u32 = 1;

/// Points per row for a hard drop
pub const HARD_DROP_POINTS: u32 = 2;

/// Maximum number of upcoming pieces exposed in snapshots
pub const MAX_PREVIEW: usize = 5;

/// The seven tetromino piece kinds
///
/// The kind doubles as the color id of the board cells it leaves behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl PieceKind {
    /// All kinds in canonical bag order
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// Parse piece kind from string (case-insensitive)
    ///
    /// ```
    /// use stackfall_types::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_str("i"), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_str("L"), Some(PieceKind::L));
    /// assert_eq!(PieceKind::from_str("x"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "i" => Some(PieceKind::I),
            "o" => Some(PieceKind::O),
            "t" => Some(PieceKind::T),
            "s" => Some(PieceKind::S),
            "z" => Some(PieceKind::Z),
            "j" => Some(PieceKind::J),
            "l" => Some(PieceKind::L),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::I => "i",
            PieceKind::O => "o",
            PieceKind::T => "t",
            PieceKind::S => "s",
            PieceKind::Z => "z",
            PieceKind::J => "j",
            PieceKind::L => "l",
        }
    }

    /// Stable index into per-kind tables (0..7)
    pub fn index(&self) -> usize {
        match self {
            PieceKind::I => 0,
            PieceKind::O => 1,
            PieceKind::T => 2,
            PieceKind::S => 3,
            PieceKind::Z => 4,
            PieceKind::J => 5,
            PieceKind::L => 6,
        }
    }
}

/// Rotation states following the Super Rotation System (SRS)
///
/// The cycle goes North → East → South → West → North, with North being the
/// spawn orientation. Index form is 0..=3 in the same order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rotation {
    North,
    East,
    South,
    West,
}

impl Rotation {
    /// Rotate clockwise (90°)
    pub fn rotate_cw(&self) -> Self {
        match self {
            Rotation::North => Rotation::East,
            Rotation::East => Rotation::South,
            Rotation::South => Rotation::West,
            Rotation::West => Rotation::North,
        }
    }

    /// Rotate counter-clockwise (-90°)
    pub fn rotate_ccw(&self) -> Self {
        match self {
            Rotation::North => Rotation::West,
            Rotation::West => Rotation::South,
            Rotation::South => Rotation::East,
            Rotation::East => Rotation::North,
        }
    }

    /// Rotation index (0 = North .. 3 = West)
    pub fn index(&self) -> u8 {
        match self {
            Rotation::North => 0,
            Rotation::East => 1,
            Rotation::South => 2,
            Rotation::West => 3,
        }
    }

    /// Rotation from index; `None` outside 0..=3
    ///
    /// ```
    /// use stackfall_types::Rotation;
    ///
    /// assert_eq!(Rotation::from_index(2), Some(Rotation::South));
    /// assert_eq!(Rotation::from_index(4), None);
    /// ```
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Rotation::North),
            1 => Some(Rotation::East),
            2 => Some(Rotation::South),
            3 => Some(Rotation::West),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rotation::North => "north",
            Rotation::East => "east",
            Rotation::South => "south",
            Rotation::West => "west",
        }
    }
}

/// A cell on the game board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cell {
    #[default]
    Empty,
    /// Filled, tagged with the color id of the piece that left it
    Occupied(PieceKind),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn is_occupied(&self) -> bool {
        matches!(self, Cell::Occupied(_))
    }

    pub fn kind(&self) -> Option<PieceKind> {
        match self {
            Cell::Empty => None,
            Cell::Occupied(kind) => Some(*kind),
        }
    }
}

/// Intents accepted by the session store
///
/// This is the closed set of inputs the engine reacts to. UI surfaces and the
/// gravity timer both produce them; nothing else mutates a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GameIntent {
    /// Move piece one cell left
    MoveLeft,
    /// Move piece one cell right
    MoveRight,
    /// Rotate piece 90° clockwise
    RotateCw,
    /// Rotate piece 90° counter-clockwise
    RotateCcw,
    /// Move piece one row down, locking it if it cannot move
    SoftDrop,
    /// Drop piece to its landing row and lock it
    HardDrop,
    /// Swap the active piece with the held piece (once per lock)
    Hold,
    /// Suspend gravity
    Pause,
    /// Resume gravity with a fresh interval
    Resume,
    /// Start a new game (the only intent accepted after game over)
    Restart,
    /// One gravity step, produced by the scheduler
    TickElapsed,
}

impl GameIntent {
    /// Parse intent from string (case-insensitive)
    ///
    /// ```
    /// use stackfall_types::GameIntent;
    ///
    /// assert_eq!(GameIntent::from_str("moveLeft"), Some(GameIntent::MoveLeft));
    /// assert_eq!(GameIntent::from_str("RESUME"), Some(GameIntent::Resume));
    /// assert_eq!(GameIntent::from_str("jump"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "moveleft" => Some(GameIntent::MoveLeft),
            "moveright" => Some(GameIntent::MoveRight),
            "rotatecw" => Some(GameIntent::RotateCw),
            "rotateccw" => Some(GameIntent::RotateCcw),
            "softdrop" => Some(GameIntent::SoftDrop),
            "harddrop" => Some(GameIntent::HardDrop),
            "hold" => Some(GameIntent::Hold),
            "pause" => Some(GameIntent::Pause),
            "resume" => Some(GameIntent::Resume),
            "restart" => Some(GameIntent::Restart),
            "tickelapsed" | "tick" => Some(GameIntent::TickElapsed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameIntent::MoveLeft => "moveLeft",
            GameIntent::MoveRight => "moveRight",
            GameIntent::RotateCw => "rotateCw",
            GameIntent::RotateCcw => "rotateCcw",
            GameIntent::SoftDrop => "softDrop",
            GameIntent::HardDrop => "hardDrop",
            GameIntent::Hold => "hold",
            GameIntent::Pause => "pause",
            GameIntent::Resume => "resume",
            GameIntent::Restart => "restart",
            GameIntent::TickElapsed => "tickElapsed",
        }
    }
}
