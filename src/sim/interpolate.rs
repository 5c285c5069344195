//! Keyframe playback
//!
//! Resolves a continuous elapsed time to a position by blending the
//! bracketing keyframe pair. Keyframe counts are small and fixed, so a linear
//! scan is all this needs.

use super::trajectory::Keyframe;

/// Position at `time_ms` along `keyframes`, clamping the query to
/// `[0, duration_ms]`.
///
/// Returns `None` only for an empty keyframe list. A zero-width bracket
/// yields the lower keyframe's position.
pub fn interpolate(keyframes: &[Keyframe], time_ms: f64, duration_ms: f64) -> Option<f64> {
    let first = keyframes.first()?;
    let last = keyframes.last()?;
    let time = time_ms.max(0.0).min(duration_ms);

    let (lower, upper) = keyframes
        .windows(2)
        .find(|pair| pair[0].time_ms <= time && time <= pair[1].time_ms)
        .map(|pair| (pair[0], pair[1]))
        .unwrap_or((*first, *last));

    if upper.time_ms == lower.time_ms {
        return Some(lower.x);
    }

    let segment = (time - lower.time_ms) / (upper.time_ms - lower.time_ms);
    Some(crate::lerp(lower.x, upper.x, segment))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kf(time_ms: f64, x: f64) -> Keyframe {
        Keyframe { time_ms, x }
    }

    #[test]
    fn test_blend_between_keyframes() {
        let keys = [kf(0.0, 0.0), kf(100.0, 50.0), kf(200.0, 150.0)];
        assert_eq!(interpolate(&keys, 50.0, 200.0), Some(25.0));
        assert_eq!(interpolate(&keys, 150.0, 200.0), Some(100.0));
        assert_eq!(interpolate(&keys, 100.0, 200.0), Some(50.0));
    }

    #[test]
    fn test_query_is_clamped() {
        let keys = [kf(0.0, -150.0), kf(100.0, 50.0)];
        assert_eq!(interpolate(&keys, -20.0, 100.0), Some(-150.0));
        assert_eq!(interpolate(&keys, 5000.0, 100.0), Some(50.0));
    }

    #[test]
    fn test_degenerate_bracket_returns_lower() {
        let keys = [kf(0.0, 10.0), kf(0.0, 99.0)];
        assert_eq!(interpolate(&keys, 0.0, 0.0), Some(10.0));

        let single = [kf(0.0, 7.0)];
        assert_eq!(interpolate(&single, 30.0, 100.0), Some(7.0));
    }

    #[test]
    fn test_empty_trajectory() {
        assert_eq!(interpolate(&[], 10.0, 100.0), None);
    }
}
