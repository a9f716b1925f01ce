//! Game settings - immutable configuration snapshots
//!
//! Settings are read at session start. A change never alters a running session;
//! the store picks it up on the next restart.

use serde::{Deserialize, Serialize};

use crate::{BOARD_HEIGHT, BOARD_WIDTH, DEFAULT_LINES_PER_LEVEL, MAX_BOARD_DIM, MAX_PREVIEW, MIN_BOARD_DIM};

/// Difficulty preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }

    /// Gravity interval scale in percent (higher is slower)
    pub fn gravity_percent(&self) -> u32 {
        match self {
            Difficulty::Easy => 125,
            Difficulty::Normal => 100,
            Difficulty::Hard => 70,
        }
    }

    /// Line-clear score multiplier in percent
    pub fn score_percent(&self) -> u32 {
        match self {
            Difficulty::Easy | Difficulty::Normal => 100,
            Difficulty::Hard => 150,
        }
    }
}

/// Input scheme preference; carried for presentation layers only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlScheme {
    #[default]
    Buttons,
    Gestures,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub difficulty: Difficulty,
    pub board_width: u8,
    pub board_height: u8,
    pub lines_per_level: u32,
    /// Number of upcoming pieces shown (1..=5)
    pub preview_count: u8,
    pub control_scheme: ControlScheme,
    pub show_ghost: bool,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Normal,
            board_width: BOARD_WIDTH,
            board_height: BOARD_HEIGHT,
            lines_per_level: DEFAULT_LINES_PER_LEVEL,
            preview_count: 1,
            control_scheme: ControlScheme::Buttons,
            show_ghost: true,
        }
    }
}

impl GameSettings {
    /// Check field ranges, returning a description of the first bad field
    pub fn validate(&self) -> Result<(), String> {
        let dims = MIN_BOARD_DIM..=MAX_BOARD_DIM;
        if !dims.contains(&self.board_width) || !dims.contains(&self.board_height) {
            return Err(format!(
                "board {}x{} outside {}..={}",
                self.board_width, self.board_height, MIN_BOARD_DIM, MAX_BOARD_DIM
            ));
        }
        if self.lines_per_level == 0 {
            return Err("lines_per_level must be at least 1".to_string());
        }
        if self.preview_count == 0 || self.preview_count as usize > MAX_PREVIEW {
            return Err(format!("preview_count must be 1..={}", MAX_PREVIEW));
        }
        Ok(())
    }
}
