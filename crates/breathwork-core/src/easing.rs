//! Interpolation and easing primitives.
//!
//! Every easing maps `t` in [0, 1] to [0, 1] (elastic overshoots in between)
//! and clamps its input, so callers may pass raw progress values.

use std::f32::consts::{PI, TAU};

#[inline]
pub fn linear(t: f32) -> f32 {
    t.clamp(0.0, 1.0)
}

#[inline]
pub fn ease_in_sine(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (t * PI / 2.0).cos()
}

#[inline]
pub fn ease_out_sine(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    (t * PI / 2.0).sin()
}

/// The breath curve: slow at both ends, fastest mid-phase.
#[inline]
pub fn ease_in_out_sine(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    (-((PI * t).cos() - 1.0) / 2.0).clamp(0.0, 1.0)
}

#[inline]
pub fn ease_in_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * t
}

#[inline]
pub fn ease_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

#[inline]
pub fn ease_in_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Springy settle past the target. Not monotonic.
#[inline]
pub fn ease_out_elastic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t == 0.0 || t == 1.0 {
        return t;
    }
    let c4 = TAU / 3.0;
    2f32.powf(-10.0 * t) * ((t * 10.0 - 0.75) * c4).sin() + 1.0
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Position of `value` between `a` and `b`, clamped to [0, 1].
#[inline]
pub fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
    if (b - a).abs() <= f32::EPSILON {
        return 0.0;
    }
    ((value - a) / (b - a)).clamp(0.0, 1.0)
}

/// Exponential approach of `current` toward `target`.
///
/// `rate` is per second, so the result is independent of frame rate.
#[inline]
pub fn approach(current: f32, target: f32, rate: f32, dt: f32) -> f32 {
    let blend = 1.0 - (-rate * dt.max(0.0)).exp();
    current + (target - current) * blend
}

/// Converts a per-frame multiplier tuned at 60 fps into one for `dt` seconds.
#[inline]
pub fn frame_decay(per_frame_at_60: f32, dt: f32) -> f32 {
    per_frame_at_60.clamp(0.0, 1.0).powf(dt.max(0.0) * 60.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sine_endpoints() {
        assert_eq!(ease_in_out_sine(0.0), 0.0);
        assert!((ease_in_out_sine(1.0) - 1.0).abs() < 1e-6);
        assert!((ease_in_out_sine(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn inputs_outside_unit_range_are_clamped() {
        assert_eq!(ease_in_out_sine(-3.0), 0.0);
        assert!((ease_in_out_sine(7.0) - 1.0).abs() < 1e-6);
        assert_eq!(ease_out_cubic(2.0), 1.0);
    }

    #[test]
    fn elastic_hits_endpoints_exactly() {
        assert_eq!(ease_out_elastic(0.0), 0.0);
        assert_eq!(ease_out_elastic(1.0), 1.0);
    }

    #[test]
    fn approach_is_frame_rate_independent() {
        let one_step = approach(0.0, 1.0, 4.0, 0.1);
        let mut two_steps = approach(0.0, 1.0, 4.0, 0.05);
        two_steps = approach(two_steps, 1.0, 4.0, 0.05);
        assert!((one_step - two_steps).abs() < 1e-5);
    }

    #[test]
    fn frame_decay_matches_per_frame_factor_at_60fps() {
        assert!((frame_decay(0.9, 1.0 / 60.0) - 0.9).abs() < 1e-5);
        assert_eq!(frame_decay(0.9, 0.0), 1.0);
    }

    #[test]
    fn inverse_lerp_handles_degenerate_range() {
        assert_eq!(inverse_lerp(1.0, 1.0, 5.0), 0.0);
        assert_eq!(inverse_lerp(0.0, 10.0, 5.0), 0.5);
    }
}
