//! Race configuration
//!
//! Defaults reproduce the stock 15 second race on a 1920x1080 playfield.
//! Any subset of fields can be overridden from JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::{FinishLineMarker, TrackLayout, TrajectoryPolicy};

/// Errors raised while loading or validating a [`RaceConfig`]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{field} out of range: {value}")]
    RangeViolation { field: &'static str, value: f64 },
}

/// Race tuning and layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceConfig {
    /// Outcome RNG seed; `None` seeds from the clock (not reproducible)
    pub seed: Option<u32>,
    /// Race length (ms)
    pub duration_ms: f64,
    /// Shared start line x
    pub start_x: f64,

    // === Playfield ===
    pub playfield_width: f64,
    pub playfield_height: f64,
    pub tile_size: f64,

    // === Finish line ===
    /// Resting x as a fraction of playfield width
    pub finish_line_ratio: f64,
    /// Entry threshold as a fraction of race duration
    pub finish_line_entry_fraction: f64,
    /// Easing window (ms)
    pub finish_line_enter_duration_ms: f64,

    // === Trajectories ===
    pub keyframe_intervals: usize,
    pub policy: TrajectoryPolicy,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            seed: None,
            duration_ms: RACE_DURATION_MS,
            start_x: RACE_START_X,

            playfield_width: PLAYFIELD_WIDTH,
            playfield_height: PLAYFIELD_HEIGHT,
            tile_size: TILE_SIZE,

            finish_line_ratio: FINISH_LINE_X_RATIO,
            finish_line_entry_fraction: FINISH_LINE_ENTRY_FRACTION,
            finish_line_enter_duration_ms: FINISH_LINE_ENTER_DURATION_MS,

            keyframe_intervals: KEYFRAME_INTERVALS,
            policy: TrajectoryPolicy::SharedCurve,
        }
    }
}

impl RaceConfig {
    /// Default config with a fixed seed
    pub fn seeded(seed: u32) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded race config from {}", path.display());
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every field against its documented bounds
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn check(field: &'static str, value: f64, ok: bool) -> Result<(), ConfigError> {
            if ok && value.is_finite() {
                Ok(())
            } else {
                Err(ConfigError::RangeViolation { field, value })
            }
        }

        check("duration_ms", self.duration_ms, self.duration_ms > 0.0)?;
        check("start_x", self.start_x, true)?;
        check("playfield_width", self.playfield_width, self.playfield_width > 0.0)?;
        check("playfield_height", self.playfield_height, self.playfield_height > 0.0)?;
        check("tile_size", self.tile_size, self.tile_size >= 0.0)?;
        check(
            "finish_line_ratio",
            self.finish_line_ratio,
            self.finish_line_ratio > 0.0 && self.finish_line_ratio <= 1.0,
        )?;
        check(
            "finish_line_entry_fraction",
            self.finish_line_entry_fraction,
            (0.0..=1.0).contains(&self.finish_line_entry_fraction),
        )?;
        check(
            "finish_line_enter_duration_ms",
            self.finish_line_enter_duration_ms,
            self.finish_line_enter_duration_ms >= 0.0,
        )?;
        check(
            "keyframe_intervals",
            self.keyframe_intervals as f64,
            self.keyframe_intervals >= 1,
        )?;
        check("start_x", self.start_x, self.start_x < self.finish_x())?;
        Ok(())
    }

    /// Resting x of the finish line
    pub fn finish_x(&self) -> f64 {
        self.playfield_width * self.finish_line_ratio
    }

    /// Elapsed time at which the finish line starts moving in
    pub fn finish_line_entry_ms(&self) -> f64 {
        self.duration_ms * self.finish_line_entry_fraction
    }

    pub fn track_layout(&self) -> TrackLayout {
        TrackLayout {
            start_x: self.start_x,
            finish_x: self.finish_x(),
            duration_ms: self.duration_ms,
            keyframe_intervals: self.keyframe_intervals,
        }
    }

    /// Finish line parked off-screen, ready for a race
    pub fn finish_line_marker(&self) -> FinishLineMarker {
        FinishLineMarker::new(
            self.playfield_width + FINISH_LINE_OFFSCREEN_MARGIN,
            self.finish_x(),
            self.finish_line_entry_ms(),
            self.finish_line_enter_duration_ms,
        )
    }

    /// Seed for cosmetic draws, offset from the outcome seed
    pub fn cosmetic_seed(&self) -> Option<u32> {
        self.seed.map(|s| s.wrapping_add(COSMETIC_SEED_OFFSET))
    }

    /// Lane y for racer `index` of `count`, spread evenly over the water
    /// (below 5 sky rows, the shore row and the top water row; above the
    /// bottom water row)
    pub fn lane_y(&self, index: usize, count: usize) -> f64 {
        let water_start = 7.0 * self.tile_size;
        let water_end = self.playfield_height - self.tile_size;
        let spacing = (water_end - water_start) / (count as f64 + 1.0);
        water_start + spacing * (index as f64 + 1.0)
    }
}
