//! Score, line and level counters
//!
//! The engine only reports what happened in a step; these counters belong to
//! whoever drives the game and are updated from each [`StepOutcome`].

use crate::engine::StepOutcome;
use crate::settings::{Rules, TimingSettings};
use serde::{Deserialize, Serialize};

/// Counters for one game session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    /// Current score
    pub points: u32,
    /// Current level, starting at 1
    pub level: u32,
    /// Total lines cleared
    pub lines: u32,
}

impl Default for Score {
    fn default() -> Self {
        Self::new()
    }
}

impl Score {
    pub fn new() -> Self {
        Self {
            points: 0,
            level: 1,
            lines: 0,
        }
    }

    /// Apply a step's outcome. Returns true if any counter changed.
    pub fn apply(&mut self, outcome: &StepOutcome, rules: &Rules) -> bool {
        if outcome.lines_cleared == 0 && outcome.score_delta == 0 {
            return false;
        }
        self.points = self.points.saturating_add(outcome.score_delta);
        self.add_lines(outcome.lines_cleared, rules);
        true
    }

    /// Add cleared lines. The level goes up by one when the new total is an
    /// exact multiple of `lines_per_level`.
    pub fn add_lines(&mut self, lines: u32, rules: &Rules) {
        if lines == 0 {
            return;
        }
        self.lines = self.lines.saturating_add(lines);
        if rules.lines_per_level > 0 && self.lines % rules.lines_per_level == 0 {
            self.level = self.level.saturating_add(1).min(rules.max_level.max(1));
        }
    }

    /// Ticks that must elapse before the next gravity step at this level
    pub fn drop_interval(&self, rules: &Rules, timing: &TimingSettings) -> u32 {
        let max_level = rules.max_level.max(1) as f32;
        let norm = (self.level as f32 / max_level).min(1.0);
        let curve = norm * norm;
        let speed = timing.base_drop_speed as f32 - curve * timing.speed_curve_factor;
        (speed as u32).max(1)
    }
}
