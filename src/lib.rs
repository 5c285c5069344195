//! Duck Race - A deterministic multi-competitor race engine
//!
//! Core modules:
//! - `sim`: Deterministic race simulation (RNG, trajectories, state machine)
//! - `sink`: Position sink boundary toward the rendering layer
//! - `roster`: Participant names
//! - `lobby`: Session restart logic (entity creation, heats)
//! - `test_seam`: Injectable control surface for automated tests
//! - `config`: Data-driven race configuration

pub mod config;
pub mod lobby;
pub mod roster;
pub mod sim;
pub mod sink;
pub mod test_seam;

pub use config::{ConfigError, RaceConfig};
pub use lobby::{Lobby, LobbyError};
pub use roster::Roster;
pub use sim::{RaceController, RaceState};
pub use sink::PositionSink;
pub use test_seam::{TestSeam, TestState};

/// Race configuration constants
pub mod consts {
    /// Total race length (15 seconds)
    pub const RACE_DURATION_MS: f64 = 15_000.0;

    /// Playfield dimensions
    pub const PLAYFIELD_WIDTH: f64 = 1920.0;
    pub const PLAYFIELD_HEIGHT: f64 = 1080.0;
    pub const TILE_SIZE: f64 = 16.0;

    /// Shared start line, left of the visible playfield
    pub const RACE_START_X: f64 = -150.0;

    /// Finish line rests at this fraction of the playfield width
    pub const FINISH_LINE_X_RATIO: f64 = 0.5;
    /// Finish line starts easing in at this fraction of the race (12s of 15s)
    pub const FINISH_LINE_ENTRY_FRACTION: f64 = 0.8;
    /// Finish line easing window
    pub const FINISH_LINE_ENTER_DURATION_MS: f64 = 3_000.0;
    /// Finish line waits this far past the right edge
    pub const FINISH_LINE_OFFSCREEN_MARGIN: f64 = 100.0;

    /// Keyframe intervals per trajectory (31 keyframes, one every 500ms)
    pub const KEYFRAME_INTERVALS: usize = 30;

    /// Winner's target after the finish, relative to the finish line
    pub const WINNER_FINISH_MARGIN: f64 = 80.0;

    /// Cosmetic RNG seed offset from the race seed
    pub const COSMETIC_SEED_OFFSET: u32 = 1000;

    /// Roster limits
    pub const MAX_NAMES: usize = 25;
    pub const MIN_VIABLE_ROSTER: usize = 2;
}

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Current wall-clock time in milliseconds, folded to 32 bits for seeding
pub fn time_seed() -> u32 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u32)
        .unwrap_or(0)
}
