//! Visual effect descriptors emitted alongside line clears
//!
//! A burst is a one-way side channel: the engine produces it once per clearing
//! lock and never reads it back. Presentation layers decide how to animate it.

use serde::{Deserialize, Serialize};

/// One presentation event inside a burst
///
/// `intensity` is normalized to `[0, 1]`; `power` is a scale factor `>= 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum VisualEffectEvent {
    ScreenShake {
        intensity: f32,
        power: f32,
        duration_ms: u32,
    },
    FloatingText {
        intensity: f32,
        power: f32,
        text: String,
        points: u64,
    },
    ScreenFlash {
        intensity: f32,
        power: f32,
        duration_ms: u32,
    },
    /// Particle burst along a cleared row (row index before compaction)
    Explosion {
        intensity: f32,
        power: f32,
        row: u8,
    },
}

impl VisualEffectEvent {
    pub fn intensity(&self) -> f32 {
        match self {
            VisualEffectEvent::ScreenShake { intensity, .. }
            | VisualEffectEvent::FloatingText { intensity, .. }
            | VisualEffectEvent::ScreenFlash { intensity, .. }
            | VisualEffectEvent::Explosion { intensity, .. } => *intensity,
        }
    }

    pub fn power(&self) -> f32 {
        match self {
            VisualEffectEvent::ScreenShake { power, .. }
            | VisualEffectEvent::FloatingText { power, .. }
            | VisualEffectEvent::ScreenFlash { power, .. }
            | VisualEffectEvent::Explosion { power, .. } => *power,
        }
    }
}

/// Effects for a single line clear
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualEffectBurst {
    /// Monotonic within a store, across restarts
    pub id: u64,
    pub lines_cleared: u32,
    pub combo_streak: u32,
    pub intensity: f32,
    pub power: f32,
    pub events: Vec<VisualEffectEvent>,
}
