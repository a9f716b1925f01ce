//! Scoring module - line clear points, combos, back-to-back, levels
//!
//! Line clears use the guideline table (100/300/500/800) times `level + 1`,
//! evaluated at the level held *before* the clear is counted. A Tetris that
//! directly follows another Tetris earns 3/2 of its base. Each consecutive
//! clearing lock after the first adds `COMBO_BASE * (streak - 1) * (level + 1)`.
//! Difficulty then scales the whole clear award. Drop points are separate and
//! never multiplied.

use crate::types::{
    Difficulty, B2B_DENOMINATOR, B2B_NUMERATOR, COMBO_BASE, HARD_DROP_POINTS, LINE_SCORES,
    SOFT_DROP_POINTS,
};

/// Score calculation result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreResult {
    /// Base points for the clear (includes B2B multiplier, excludes combo bonus).
    pub line_clear_score: u64,
    /// Combo bonus added on top of `line_clear_score`.
    pub combo_bonus: u64,
    /// Everything, after the difficulty multiplier.
    pub total: u64,
    pub qualifies_for_b2b: bool,
    /// Whether a B2B multiplier was applied to this clear.
    pub b2b_applied: bool,
}

/// Base line clear score; 0 for 0 or more than 4 lines
pub fn calculate_line_score(lines: usize, level: u32) -> u64 {
    if lines == 0 || lines > 4 {
        return 0;
    }
    LINE_SCORES[lines] as u64 * (level as u64 + 1)
}

/// Combo bonus for a streak (streak counts the current clear)
pub fn calculate_combo_bonus(combo_streak: u32, level: u32) -> u64 {
    if combo_streak <= 1 {
        return 0;
    }
    COMBO_BASE as u64 * (combo_streak as u64 - 1) * (level as u64 + 1)
}

/// B2B applies to consecutive Tetrises
pub fn qualifies_for_b2b(lines: usize) -> bool {
    lines == 4
}

/// Apply the B2B multiplier (3/2) to a point value.
pub fn apply_b2b_multiplier(points: u64) -> u64 {
    points.saturating_mul(B2B_NUMERATOR as u64) / B2B_DENOMINATOR as u64
}

/// Complete award for one clearing lock.
///
/// `combo_streak` already includes this clear; `previous_b2b` is whether the
/// last clearing lock was itself B2B-qualifying.
pub fn calculate_score(
    lines: usize,
    level: u32,
    combo_streak: u32,
    previous_b2b: bool,
    difficulty: Difficulty,
) -> ScoreResult {
    let qualifies = qualifies_for_b2b(lines);
    let base = calculate_line_score(lines, level);

    let b2b_applied = qualifies && previous_b2b;
    let line_clear_score = if b2b_applied {
        apply_b2b_multiplier(base)
    } else {
        base
    };

    let combo_bonus = calculate_combo_bonus(combo_streak, level);
    let total = line_clear_score.saturating_add(combo_bonus) * difficulty.score_percent() as u64 / 100;

    ScoreResult {
        line_clear_score,
        combo_bonus,
        total,
        qualifies_for_b2b: qualifies,
        b2b_applied,
    }
}

/// Drop score: soft drop +1 per row, hard drop +2 per row
pub fn calculate_drop_score(rows: u32, is_hard_drop: bool) -> u64 {
    let per_row = if is_hard_drop {
        HARD_DROP_POINTS
    } else {
        SOFT_DROP_POINTS
    };
    rows as u64 * per_row as u64
}

/// Level for a total line count
pub fn calculate_level(total_lines: u32, lines_per_level: u32) -> u32 {
    total_lines / lines_per_level.max(1)
}
