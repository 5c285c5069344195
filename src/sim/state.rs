//! Race state and core simulation types
//!
//! Everything a running race owns lives here; the controller mutates it.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::trajectory::Trajectory;

/// Race lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RaceState {
    /// Waiting for start
    #[default]
    Idle,
    /// Clock running
    Racing,
    /// Duration reached, winner declared
    Finished,
}

impl RaceState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RaceState::Idle => "idle",
            RaceState::Racing => "racing",
            RaceState::Finished => "finished",
        }
    }
}

/// Cosmetic skin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Doge,
    Viking,
    Astronaut,
    Mario,
    #[default]
    Plain,
}

impl Variant {
    pub const ALL: [Variant; 5] = [
        Variant::Doge,
        Variant::Viking,
        Variant::Astronaut,
        Variant::Mario,
        Variant::Plain,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Doge => "doge",
            Variant::Viking => "viking",
            Variant::Astronaut => "astronaut",
            Variant::Mario => "mario",
            Variant::Plain => "plain",
        }
    }

    /// Spritesheet frame range for the swim animation
    pub fn frames(&self) -> (u32, u32) {
        let start = *self as u32 * 3;
        (start, start + 2)
    }
}

/// A racer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceEntity {
    pub name: String,
    pub variant: Variant,
    /// Fixed lateral offset, assigned at creation
    pub lane_y: f64,
    /// Current target x (written by the controller every tick)
    pub target_x: f64,
    /// Set by the end-of-race stop signal, cleared by the next target
    pub stopped: bool,
}

impl RaceEntity {
    pub fn new(name: impl Into<String>, variant: Variant, lane_y: f64, start_x: f64) -> Self {
        Self {
            name: name.into(),
            variant,
            lane_y,
            target_x: start_x,
            stopped: true,
        }
    }

    /// Target position including the lane
    pub fn position(&self) -> DVec2 {
        DVec2::new(self.target_x, self.lane_y)
    }

    pub fn set_target(&mut self, x: f64) {
        self.target_x = x;
        self.stopped = false;
    }

    /// Snap to a position without starting movement
    pub fn snap_to(&mut self, x: f64) {
        self.target_x = x;
    }

    pub fn stop(&mut self) {
        self.stopped = true;
    }
}

/// The race aggregate: lifecycle, clock, winner and paths
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RaceSession {
    pub state: RaceState,
    /// Elapsed race time (ms), within `[0, duration]`
    pub elapsed_ms: f64,
    /// Resolved once per session; stable until reset
    pub winner_index: Option<usize>,
    /// One path per entity, in entity order
    pub trajectories: Vec<Trajectory>,
}

impl RaceSession {
    /// Back to a blank idle session
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Format remaining time as `MM:SS` for the race clock
pub fn format_clock(ms_remaining: f64) -> String {
    let total_secs = (ms_remaining.max(0.0) / 1000.0).floor() as u64;
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}
