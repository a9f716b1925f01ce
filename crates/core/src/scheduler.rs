//! Gravity scheduling - phases, drop intervals, and timer directives
//!
//! This module holds the pure half of the scheduler. It decides *whether* the
//! gravity timer should run and *how long* each interval is; the session store
//! owns the actual timer task and feeds its ticks back as intents.
//!
//! Resume and restart re-arm the timer with a full interval. Time already spent
//! waiting on the interrupted interval is discarded, not carried over.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::{Difficulty, DROP_INTERVALS, DROP_INTERVAL_MIN_MS, DROP_INTERVAL_STEP_MS};

/// Session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionPhase {
    Running,
    Paused,
    /// Terminal until restart
    GameOver,
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionPhase::Running => "running",
            SessionPhase::Paused => "paused",
            SessionPhase::GameOver => "gameOver",
        }
    }
}

/// Gravity interval in milliseconds for `Normal` difficulty
pub fn base_interval_ms(level: u32) -> u32 {
    match DROP_INTERVALS.get(level as usize) {
        Some(&ms) => ms,
        None => {
            let last = DROP_INTERVALS[DROP_INTERVALS.len() - 1];
            let beyond = level - (DROP_INTERVALS.len() as u32 - 1);
            last.saturating_sub(beyond.saturating_mul(DROP_INTERVAL_STEP_MS))
        }
    }
}

/// Gravity interval for a level and difficulty.
///
/// Strictly decreasing with level until it hits the `DROP_INTERVAL_MIN_MS`
/// floor, where it stays.
pub fn gravity_interval(level: u32, difficulty: Difficulty) -> Duration {
    let scaled = base_interval_ms(level) as u64 * difficulty.gravity_percent() as u64 / 100;
    Duration::from_millis(scaled.max(DROP_INTERVAL_MIN_MS as u64))
}

/// What the gravity timer should be doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerDirective {
    Suspended,
    /// Tick every `interval`; a new `epoch` forces a fresh interval
    Armed { interval: Duration, epoch: u64 },
}

/// Tracks the current directive and decides when the timer must change
#[derive(Debug, Clone)]
pub struct GravityPlan {
    epoch: u64,
    current: TimerDirective,
}

impl GravityPlan {
    pub fn new() -> Self {
        Self {
            epoch: 0,
            current: TimerDirective::Suspended,
        }
    }

    pub fn current(&self) -> TimerDirective {
        self.current
    }

    /// Recompute the directive after a transition.
    ///
    /// `rearm` is set for transitions that must start a fresh interval even if
    /// the interval length did not change (resume, restart). Returns the new
    /// directive only when it differs from the previous one.
    pub fn update(&mut self, phase: SessionPhase, interval: Duration, rearm: bool) -> Option<TimerDirective> {
        let next = match phase {
            SessionPhase::Running => {
                let interval_changed = !matches!(
                    self.current,
                    TimerDirective::Armed { interval: current, .. } if current == interval
                );
                if rearm || interval_changed {
                    self.epoch += 1;
                }
                TimerDirective::Armed {
                    interval,
                    epoch: self.epoch,
                }
            }
            SessionPhase::Paused | SessionPhase::GameOver => TimerDirective::Suspended,
        };

        if next == self.current {
            return None;
        }
        self.current = next;
        Some(next)
    }
}

impl Default for GravityPlan {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_strictly_decreases_until_floor() {
        for difficulty in [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard] {
            let mut prev = gravity_interval(0, difficulty);
            let mut reached_floor = false;
            for level in 1..40 {
                let next = gravity_interval(level, difficulty);
                if prev == Duration::from_millis(DROP_INTERVAL_MIN_MS as u64) {
                    reached_floor = true;
                }
                if reached_floor {
                    assert_eq!(next, prev);
                } else {
                    assert!(next < prev, "{:?} level {}", difficulty, level);
                }
                prev = next;
            }
            assert!(reached_floor);
        }
    }

    #[test]
    fn intervals_follow_table() {
        assert_eq!(gravity_interval(0, Difficulty::Normal), Duration::from_millis(1000));
        assert_eq!(gravity_interval(5, Difficulty::Normal), Duration::from_millis(320));
        assert_eq!(gravity_interval(9, Difficulty::Normal), Duration::from_millis(150));
        assert_eq!(gravity_interval(0, Difficulty::Easy), Duration::from_millis(1250));
        assert_eq!(gravity_interval(0, Difficulty::Hard), Duration::from_millis(700));
        assert_eq!(gravity_interval(500, Difficulty::Normal), Duration::from_millis(100));
    }

    #[test]
    fn plan_suspends_and_rearms() {
        let mut plan = GravityPlan::new();
        let one_sec = Duration::from_secs(1);

        let armed = plan.update(SessionPhase::Running, one_sec, true);
        assert_eq!(
            armed,
            Some(TimerDirective::Armed {
                interval: one_sec,
                epoch: 1
            })
        );

        // Same phase and interval: nothing to do.
        assert_eq!(plan.update(SessionPhase::Running, one_sec, false), None);

        assert_eq!(
            plan.update(SessionPhase::Paused, one_sec, false),
            Some(TimerDirective::Suspended)
        );
        assert_eq!(plan.update(SessionPhase::Paused, one_sec, false), None);

        // Resume always starts a fresh interval.
        assert_eq!(
            plan.update(SessionPhase::Running, one_sec, true),
            Some(TimerDirective::Armed {
                interval: one_sec,
                epoch: 2
            })
        );

        // Level up shortens the interval.
        let faster = Duration::from_millis(800);
        assert_eq!(
            plan.update(SessionPhase::Running, faster, false),
            Some(TimerDirective::Armed {
                interval: faster,
                epoch: 3
            })
        );

        assert_eq!(
            plan.update(SessionPhase::GameOver, faster, false),
            Some(TimerDirective::Suspended)
        );
    }
}
