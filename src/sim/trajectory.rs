//! Trajectory generation
//!
//! Every race start recomputes one keyframe path per racer from the outcome
//! RNG. Paths are fixed once generated; playback only reads them.

use std::f64::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

use super::easing::{divergence_ramp, ease_in_out_quad, oscillation_envelope, race_progress};
use super::interpolate::interpolate;
use super::rng::SeededRandom;

/// A single (time, position) sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Offset from race start (ms)
    pub time_ms: f64,
    /// Horizontal position
    pub x: f64,
}

/// Ordered keyframes for one racer, strictly increasing in time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    keyframes: Vec<Keyframe>,
}

impl Trajectory {
    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    /// Position where the path begins
    pub fn start_x(&self) -> Option<f64> {
        self.keyframes.first().map(|k| k.x)
    }

    /// Position where the path ends
    pub fn end_x(&self) -> Option<f64> {
        self.keyframes.last().map(|k| k.x)
    }

    /// Interpolated position at `time_ms`, clamped to the path's time span
    pub fn position_at(&self, time_ms: f64) -> Option<f64> {
        let duration = self.keyframes.last()?.time_ms;
        interpolate(&self.keyframes, time_ms, duration)
    }
}

/// How racer paths are shaped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrajectoryPolicy {
    /// One shared progress curve, per-racer oscillation under an envelope,
    /// late divergence toward each racer's finish offset
    #[default]
    SharedCurve,
    /// Per-racer eased curve toward its own endpoint with a mid-race wobble
    IndependentCurve,
}

impl TrajectoryPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrajectoryPolicy::SharedCurve => "shared_curve",
            TrajectoryPolicy::IndependentCurve => "independent_curve",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "shared_curve" | "shared" => Some(TrajectoryPolicy::SharedCurve),
            "independent_curve" | "independent" => Some(TrajectoryPolicy::IndependentCurve),
            _ => None,
        }
    }
}

/// Track geometry and timing a generator run needs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackLayout {
    pub start_x: f64,
    pub finish_x: f64,
    pub duration_ms: f64,
    /// Number of intervals; each path gets `keyframe_intervals + 1` keyframes
    pub keyframe_intervals: usize,
}

/// Shared curve: racers aim this far short of the finish line
const SHARED_END_SHORTFALL: f64 = 30.0;
/// Shared curve: oscillation amplitude tiers
const OSCILLATION_AMPLITUDES: [f64; 3] = [50.0, 30.0, 15.0];
const OSCILLATION_FREQ_MIN: f64 = 3.0;
const OSCILLATION_FREQ_MAX: f64 = 8.0;
const NOISE_AMPLITUDE: f64 = 10.0;
/// Shared curve: winner's final lead over the shared end point
const WINNER_FINAL_OFFSET: f64 = 110.0;
const LOSER_OFFSET_MIN: f64 = 20.0;
const LOSER_OFFSET_MAX: f64 = 80.0;

/// Independent curve tuning
const INDEPENDENT_WINNER_OVERSHOOT_MIN: f64 = 50.0;
const INDEPENDENT_WINNER_OVERSHOOT_MAX: f64 = 150.0;
const INDEPENDENT_LOSER_SHORTFALL_MIN: f64 = 50.0;
const INDEPENDENT_LOSER_SHORTFALL_MAX: f64 = 250.0;
const INDEPENDENT_WOBBLE_AMPLITUDE: f64 = 20.0;
const INDEPENDENT_WOBBLE_CYCLES: f64 = 2.0;
const INDEPENDENT_NOISE_AMPLITUDE: f64 = 15.0;

#[derive(Debug, Clone, Copy)]
struct OscillationLayer {
    amplitude: f64,
    frequency: f64,
    phase: f64,
}

/// Generate one trajectory per racer.
///
/// `winner` must index into `0..count`; only the winner's endpoint lands past
/// `layout.finish_x`. The RNG draw order is part of the reproducibility
/// contract, so any change here changes every seeded race.
pub fn generate_trajectories(
    count: usize,
    winner: usize,
    layout: &TrackLayout,
    policy: TrajectoryPolicy,
    rng: &mut SeededRandom,
) -> Vec<Trajectory> {
    if count == 0 {
        return Vec::new();
    }
    debug_assert!(winner < count, "winner {} out of range {}", winner, count);

    let trajectories = match policy {
        TrajectoryPolicy::SharedCurve => shared_curve(count, winner, layout, rng),
        TrajectoryPolicy::IndependentCurve => independent_curve(count, winner, layout, rng),
    };

    log::debug!(
        "Generated {} trajectories ({}), winner endpoint {:?}",
        trajectories.len(),
        policy.as_str(),
        trajectories.get(winner).and_then(Trajectory::end_x)
    );

    trajectories
}

/// Normalized time and absolute time of keyframe `i`
#[inline]
fn keyframe_time(i: usize, layout: &TrackLayout) -> (f64, f64) {
    let t = i as f64 / layout.keyframe_intervals as f64;
    (t, t * layout.duration_ms)
}

fn shared_curve(
    count: usize,
    winner: usize,
    layout: &TrackLayout,
    rng: &mut SeededRandom,
) -> Vec<Trajectory> {
    let n = layout.keyframe_intervals;
    let base_end = layout.finish_x - SHARED_END_SHORTFALL;
    let distance = base_end - layout.start_x;

    // Draw order: all oscillation layers, then loser offsets, then noise
    let layers: Vec<[OscillationLayer; 3]> = (0..count)
        .map(|_| {
            OSCILLATION_AMPLITUDES.map(|amplitude| OscillationLayer {
                amplitude,
                frequency: rng.next_range(OSCILLATION_FREQ_MIN, OSCILLATION_FREQ_MAX),
                phase: rng.next_range(0.0, TAU),
            })
        })
        .collect();

    let final_offsets: Vec<f64> = (0..count)
        .map(|i| {
            if i == winner {
                WINNER_FINAL_OFFSET
            } else {
                -rng.next_range(LOSER_OFFSET_MIN, LOSER_OFFSET_MAX)
            }
        })
        .collect();

    layers
        .iter()
        .zip(&final_offsets)
        .map(|(duck_layers, &final_offset)| {
            let mut keyframes = Vec::with_capacity(n + 1);
            for i in 0..=n {
                let (t, time_ms) = keyframe_time(i, layout);
                let mut x = layout.start_x + distance * race_progress(t);

                if i > 0 && i < n {
                    let envelope = oscillation_envelope(t);
                    let oscillation: f64 = duck_layers
                        .iter()
                        .map(|l| (t * TAU * l.frequency + l.phase).sin() * l.amplitude)
                        .sum();
                    x += oscillation * envelope;
                    x += rng.next_range(-NOISE_AMPLITUDE, NOISE_AMPLITUDE) * envelope;
                    x += final_offset * divergence_ramp(t);
                }

                keyframes.push(Keyframe { time_ms, x });
            }

            // Exact endpoints, no accumulated drift
            keyframes[0].x = layout.start_x;
            keyframes[n].x = base_end + final_offset;

            Trajectory { keyframes }
        })
        .collect()
}

fn independent_curve(
    count: usize,
    winner: usize,
    layout: &TrackLayout,
    rng: &mut SeededRandom,
) -> Vec<Trajectory> {
    let n = layout.keyframe_intervals;

    let plans: Vec<(f64, f64)> = (0..count)
        .map(|i| {
            let end_x = if i == winner {
                layout.finish_x
                    + rng.next_range(INDEPENDENT_WINNER_OVERSHOOT_MIN, INDEPENDENT_WINNER_OVERSHOOT_MAX)
            } else {
                layout.finish_x
                    - rng.next_range(INDEPENDENT_LOSER_SHORTFALL_MIN, INDEPENDENT_LOSER_SHORTFALL_MAX)
            };
            let phase = rng.next_range(0.0, TAU);
            (end_x, phase)
        })
        .collect();

    plans
        .iter()
        .map(|&(end_x, phase)| {
            let distance = end_x - layout.start_x;
            let mut keyframes = Vec::with_capacity(n + 1);
            for i in 0..=n {
                let (t, time_ms) = keyframe_time(i, layout);
                let mut x = layout.start_x + distance * ease_in_out_quad(t);

                if i > 0 && i < n {
                    // Peaks mid-race, zero at both ends
                    let swell = (t * PI).sin();
                    let wobble =
                        (t * TAU * INDEPENDENT_WOBBLE_CYCLES + phase).sin() * INDEPENDENT_WOBBLE_AMPLITUDE;
                    let noise =
                        rng.next_range(-INDEPENDENT_NOISE_AMPLITUDE, INDEPENDENT_NOISE_AMPLITUDE);
                    x += (wobble + noise) * swell;
                }

                keyframes.push(Keyframe { time_ms, x });
            }

            keyframes[0].x = layout.start_x;
            keyframes[n].x = end_x;

            Trajectory { keyframes }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;

    fn layout() -> TrackLayout {
        TrackLayout {
            start_x: RACE_START_X,
            finish_x: PLAYFIELD_WIDTH * FINISH_LINE_X_RATIO,
            duration_ms: RACE_DURATION_MS,
            keyframe_intervals: KEYFRAME_INTERVALS,
        }
    }

    fn generate(seed: u32, count: usize, winner: usize, policy: TrajectoryPolicy) -> Vec<Trajectory> {
        let mut rng = SeededRandom::with_seed(seed);
        generate_trajectories(count, winner, &layout(), policy, &mut rng)
    }

    #[test]
    fn test_keyframe_count_and_timing() {
        let paths = generate(42, 3, 1, TrajectoryPolicy::SharedCurve);
        assert_eq!(paths.len(), 3);
        for path in &paths {
            assert_eq!(path.len(), 31);
            let keys = path.keyframes();
            assert_eq!(keys[0].time_ms, 0.0);
            assert_eq!(keys[30].time_ms, RACE_DURATION_MS);
            assert!((keys[1].time_ms - 500.0).abs() < 1e-9);
            assert!(keys.windows(2).all(|w| w[0].time_ms < w[1].time_ms));
        }
    }

    #[test]
    fn test_shared_curve_exact_endpoints() {
        let layout = layout();
        let paths = generate(42, 3, 1, TrajectoryPolicy::SharedCurve);
        for (i, path) in paths.iter().enumerate() {
            assert_eq!(path.start_x(), Some(RACE_START_X));
            let end = path.end_x().unwrap();
            if i == 1 {
                assert_eq!(end, layout.finish_x - 30.0 + 110.0);
            } else {
                assert!(end <= layout.finish_x - 50.0 && end > layout.finish_x - 110.0);
            }
        }
    }

    #[test]
    fn test_only_winner_crosses_finish() {
        let layout = layout();
        for policy in [TrajectoryPolicy::SharedCurve, TrajectoryPolicy::IndependentCurve] {
            for winner in 0..6 {
                let paths = generate(1234, 6, winner, policy);
                for (i, path) in paths.iter().enumerate() {
                    let end = path.end_x().unwrap();
                    if i == winner {
                        assert!(end > layout.finish_x, "{:?} winner {}", policy, winner);
                    } else {
                        assert!(end < layout.finish_x, "{:?} loser {}", policy, i);
                    }
                }
            }
        }
    }

    #[test]
    fn test_same_seed_bit_identical() {
        for policy in [TrajectoryPolicy::SharedCurve, TrajectoryPolicy::IndependentCurve] {
            let a = generate(777, 8, 3, policy);
            let b = generate(777, 8, 3, policy);
            for (pa, pb) in a.iter().zip(&b) {
                for (ka, kb) in pa.keyframes().iter().zip(pb.keyframes()) {
                    assert_eq!(ka.x.to_bits(), kb.x.to_bits());
                    assert_eq!(ka.time_ms.to_bits(), kb.time_ms.to_bits());
                }
            }
        }
    }

    #[test]
    fn test_different_seed_changes_shape() {
        let a = generate(1, 3, 0, TrajectoryPolicy::SharedCurve);
        let b = generate(2, 3, 0, TrajectoryPolicy::SharedCurve);
        assert_ne!(a[1].keyframes()[10].x, b[1].keyframes()[10].x);
    }

    #[test]
    fn test_envelope_quiets_the_finish() {
        // Past 93% of the race only the shared curve and divergence remain,
        // so every racer's offset from the base curve is its scaled final offset
        let layout = layout();
        let paths = generate(5, 4, 2, TrajectoryPolicy::SharedCurve);
        let base_end = layout.finish_x - 30.0;
        let distance = base_end - layout.start_x;
        let i = 29;
        let t = i as f64 / 30.0;
        let base = layout.start_x + distance * race_progress(t);
        let winner_x = paths[2].keyframes()[i].x;
        assert!((winner_x - (base + 110.0 * divergence_ramp(t))).abs() < 1e-9);
    }

    #[test]
    fn test_single_racer_wins() {
        let paths = generate(9, 1, 0, TrajectoryPolicy::SharedCurve);
        assert_eq!(paths.len(), 1);
        assert!(paths[0].end_x().unwrap() > layout().finish_x);
    }

    #[test]
    fn test_empty_field() {
        let mut rng = SeededRandom::with_seed(9);
        let before = rng.clone();
        let paths = generate_trajectories(0, 0, &layout(), TrajectoryPolicy::SharedCurve, &mut rng);
        assert!(paths.is_empty());
        assert_eq!(rng, before, "no draws for an empty field");
    }

    #[test]
    fn test_position_at_matches_keyframes() {
        let paths = generate(42, 2, 0, TrajectoryPolicy::SharedCurve);
        let keys = paths[0].keyframes();
        assert_eq!(paths[0].position_at(keys[7].time_ms), Some(keys[7].x));
        let mid = (keys[7].time_ms + keys[8].time_ms) / 2.0;
        let expected = (keys[7].x + keys[8].x) / 2.0;
        assert!((paths[0].position_at(mid).unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_policy_names() {
        assert_eq!(
            TrajectoryPolicy::from_str("Independent-Curve"),
            Some(TrajectoryPolicy::IndependentCurve)
        );
        assert_eq!(TrajectoryPolicy::from_str("shared"), Some(TrajectoryPolicy::SharedCurve));
        assert_eq!(TrajectoryPolicy::from_str("zigzag"), None);
        assert_eq!(TrajectoryPolicy::default().as_str(), "shared_curve");
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        fn policy() -> impl Strategy<Value = TrajectoryPolicy> {
            prop_oneof![
                Just(TrajectoryPolicy::SharedCurve),
                Just(TrajectoryPolicy::IndependentCurve)
            ]
        }

        proptest! {
            #[test]
            fn endpoints_exact_and_only_winner_crosses(
                seed in any::<u32>(),
                (count, winner) in (1usize..=25).prop_flat_map(|n| (Just(n), 0..n)),
                policy in policy(),
            ) {
                let layout = layout();
                let paths = generate(seed, count, winner, policy);
                prop_assert_eq!(paths.len(), count);

                for (i, path) in paths.iter().enumerate() {
                    prop_assert_eq!(path.len(), KEYFRAME_INTERVALS + 1);
                    prop_assert_eq!(path.start_x(), Some(layout.start_x));
                    let end = path.end_x().unwrap();
                    if i == winner {
                        prop_assert!(end > layout.finish_x);
                    } else {
                        prop_assert!(end < layout.finish_x);
                    }
                }
            }

            #[test]
            fn same_seed_same_paths(seed in any::<u32>(), policy in policy()) {
                prop_assert_eq!(generate(seed, 8, 3, policy), generate(seed, 8, 3, policy));
            }
        }
    }
}
