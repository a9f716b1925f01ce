//! Visual effect synthesis for line clears
//!
//! `burst_for_clear` is a pure function of the clear: the same clear always
//! yields the same burst apart from its id. The engine never re-reads a burst.

use crate::types::{VisualEffectBurst, VisualEffectEvent};

/// Maximum burst power
pub const MAX_POWER: f32 = 3.0;

/// Everything about a clearing lock that the effect layer needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClearEvent {
    /// Cleared row indices, top to bottom, before compaction
    pub rows: Vec<usize>,
    pub combo_streak: u32,
    pub back_to_back: bool,
    /// Points awarded for the clear (drop points excluded)
    pub points: u64,
}

impl ClearEvent {
    pub fn lines(&self) -> u32 {
        self.rows.len() as u32
    }
}

/// Normalized intensity in [0, 1]
pub fn clear_intensity(lines: u32, combo_streak: u32, back_to_back: bool) -> f32 {
    let combo = combo_streak.saturating_sub(1).min(5) as f32;
    let b2b = if back_to_back { 0.1 } else { 0.0 };
    (0.2 * lines as f32 + 0.04 * combo + b2b).clamp(0.0, 1.0)
}

/// Power scale in [1, MAX_POWER]
pub fn clear_power(combo_streak: u32, back_to_back: bool) -> f32 {
    let combo = combo_streak.saturating_sub(1) as f32;
    let b2b = if back_to_back { 0.5 } else { 0.0 };
    (1.0 + 0.25 * combo + b2b).min(MAX_POWER)
}

fn label(lines: u32) -> &'static str {
    match lines {
        1 => "Single",
        2 => "Double",
        3 => "Triple",
        _ => "Tetris",
    }
}

/// Floating text for a clear, e.g. "Tetris B2B x3 combo"
pub fn clear_text(lines: u32, combo_streak: u32, back_to_back: bool) -> String {
    let mut text = label(lines).to_string();
    if back_to_back {
        text.push_str(" B2B");
    }
    if combo_streak > 1 {
        text.push_str(&format!(" x{} combo", combo_streak));
    }
    text
}

/// Build the burst for one clearing lock
pub fn burst_for_clear(id: u64, clear: &ClearEvent) -> VisualEffectBurst {
    let lines = clear.lines();
    let intensity = clear_intensity(lines, clear.combo_streak, clear.back_to_back);
    let power = clear_power(clear.combo_streak, clear.back_to_back);

    let mut events: Vec<VisualEffectEvent> = clear
        .rows
        .iter()
        .rev()
        .map(|&row| VisualEffectEvent::Explosion {
            intensity,
            power,
            row: row as u8,
        })
        .collect();

    events.push(VisualEffectEvent::ScreenShake {
        intensity,
        power,
        duration_ms: 80 + 40 * lines,
    });

    if lines >= 3 || clear.combo_streak >= 3 || clear.back_to_back {
        events.push(VisualEffectEvent::ScreenFlash {
            intensity,
            power,
            duration_ms: 120,
        });
    }

    events.push(VisualEffectEvent::FloatingText {
        intensity,
        power,
        text: clear_text(lines, clear.combo_streak, clear.back_to_back),
        points: clear.points,
    });

    VisualEffectBurst {
        id,
        lines_cleared: lines,
        combo_streak: clear.combo_streak,
        intensity,
        power,
        events,
    }
}
