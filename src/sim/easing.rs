//! Easing curves over normalized race time `t` in [0, 1]

/// End of the slow-start phase
pub const START_PHASE_END: f64 = 0.2;
/// Start of the sprint phase
pub const SPRINT_PHASE_START: f64 = 0.8;
/// Distance covered by the end of the slow start
const START_PHASE_DISTANCE: f64 = 0.08;
/// Distance covered during the cruise
const CRUISE_DISTANCE: f64 = 0.62;
/// Distance covered during the sprint
const SPRINT_DISTANCE: f64 = 0.30;

/// Envelope breakpoints
const ENVELOPE_RAMP_END: f64 = 0.05;
const ENVELOPE_HOLD_END: f64 = 0.75;
const ENVELOPE_FADE_END: f64 = 0.93;

/// Three-phase progress curve shared by every racer.
///
/// Slow cubic start (0-20% of time covers 8% of distance), constant cruise
/// (20-80% covers the next 62%), cubic ease-out sprint (final 30%).
pub fn race_progress(t: f64) -> f64 {
    if t < START_PHASE_END {
        let p = t / START_PHASE_END;
        START_PHASE_DISTANCE * p * p * p
    } else if t < SPRINT_PHASE_START {
        let p = (t - START_PHASE_END) / (SPRINT_PHASE_START - START_PHASE_END);
        START_PHASE_DISTANCE + CRUISE_DISTANCE * p
    } else {
        let p = (t - SPRINT_PHASE_START) / (1.0 - SPRINT_PHASE_START);
        START_PHASE_DISTANCE + CRUISE_DISTANCE + SPRINT_DISTANCE * ease_out_cubic(p)
    }
}

/// Oscillation intensity: ramps in, holds, then fades to zero before the
/// finish so the last stretch is clean.
pub fn oscillation_envelope(t: f64) -> f64 {
    if t < ENVELOPE_RAMP_END {
        t / ENVELOPE_RAMP_END
    } else if t < ENVELOPE_HOLD_END {
        1.0
    } else if t < ENVELOPE_FADE_END {
        let p = (t - ENVELOPE_HOLD_END) / (ENVELOPE_FADE_END - ENVELOPE_HOLD_END);
        1.0 - p * p * p
    } else {
        0.0
    }
}

/// Late divergence weight: zero until the sprint, cubic ramp to 1 at the finish
pub fn divergence_ramp(t: f64) -> f64 {
    if t > SPRINT_PHASE_START {
        let p = (t - SPRINT_PHASE_START) / (1.0 - SPRINT_PHASE_START);
        p * p * p
    } else {
        0.0
    }
}

#[inline]
pub fn ease_out_cubic(p: f64) -> f64 {
    let inv = 1.0 - p;
    1.0 - inv * inv * inv
}

#[inline]
pub fn ease_out_quad(p: f64) -> f64 {
    let inv = 1.0 - p;
    1.0 - inv * inv
}

#[inline]
pub fn ease_in_out_quad(p: f64) -> f64 {
    if p < 0.5 {
        2.0 * p * p
    } else {
        let inv = -2.0 * p + 2.0;
        1.0 - inv * inv / 2.0
    }
}
