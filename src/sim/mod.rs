//! Deterministic race simulation
//!
//! All race logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only, one instance per concern
//! - Stable iteration order (entity order)
//! - Time advanced only by the caller's frame deltas
//! - No rendering or platform dependencies

pub mod controller;
pub mod easing;
pub mod finish_line;
pub mod interpolate;
pub mod rng;
pub mod state;
pub mod trajectory;

pub use controller::RaceController;
pub use finish_line::FinishLineMarker;
pub use interpolate::interpolate;
pub use rng::SeededRandom;
pub use state::{RaceEntity, RaceSession, RaceState, Variant, format_clock};
pub use trajectory::{Keyframe, TrackLayout, Trajectory, TrajectoryPolicy, generate_trajectories};
