//! Finish line marker
//!
//! Driven purely by elapsed race time: parked off-screen until the entry
//! threshold, then eases in from the right and rests.

use serde::{Deserialize, Serialize};

use super::easing::ease_out_quad;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinishLineMarker {
    /// Parked position, past the right edge of the playfield
    pub offscreen_x: f64,
    /// Resting position (the finish line racers are judged against)
    pub resting_x: f64,
    /// Elapsed time at which the marker starts moving (ms)
    pub entry_at_ms: f64,
    /// Length of the easing window (ms)
    pub enter_duration_ms: f64,
    /// Current position
    pub x: f64,
}

impl FinishLineMarker {
    pub fn new(offscreen_x: f64, resting_x: f64, entry_at_ms: f64, enter_duration_ms: f64) -> Self {
        Self {
            offscreen_x,
            resting_x,
            entry_at_ms,
            enter_duration_ms,
            x: offscreen_x,
        }
    }

    /// Park the marker off-screen
    pub fn reset(&mut self) {
        self.x = self.offscreen_x;
    }

    /// Recompute position for the given elapsed time
    pub fn update(&mut self, elapsed_ms: f64) {
        self.x = self.position_at(elapsed_ms);
    }

    /// Position at `elapsed_ms` without mutating the marker
    pub fn position_at(&self, elapsed_ms: f64) -> f64 {
        if elapsed_ms < self.entry_at_ms {
            return self.offscreen_x;
        }
        let progress = if self.enter_duration_ms > 0.0 {
            ((elapsed_ms - self.entry_at_ms) / self.enter_duration_ms).min(1.0)
        } else {
            1.0
        };
        crate::lerp(self.offscreen_x, self.resting_x, ease_out_quad(progress))
    }

    /// Whether the marker has finished easing in
    pub fn is_resting(&self) -> bool {
        self.x == self.resting_x
    }
}
