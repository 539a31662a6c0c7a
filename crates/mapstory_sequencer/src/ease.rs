// SPDX-License-Identifier: MIT OR Apache-2.0
//! Blend curves for camera transitions.

/// Quadratic ease-in-out over a 0..1 progress value.
///
/// Input outside 0..1 is clamped first.
pub fn ease_in_out(progress: f64) -> f64 {
    let t = progress.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

/// Interpolation utilities for observers blending camera parameters
pub struct Interpolation;

impl Interpolation {
    /// Linear interpolation between two values
    pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
        a + (b - a) * t
    }

    /// Interpolate an angle in degrees along the shortest arc
    pub fn lerp_angle(a: f64, b: f64, t: f64) -> f64 {
        let mut delta = (b - a) % 360.0;
        if delta > 180.0 {
            delta -= 360.0;
        } else if delta < -180.0 {
            delta += 360.0;
        }
        a + delta * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_are_stable() {
        assert_eq!(ease_in_out(0.0), 0.0);
        assert_eq!(ease_in_out(0.5), 0.5);
        assert_eq!(ease_in_out(1.0), 1.0);
    }

    #[test]
    fn test_out_of_range_is_clamped() {
        assert_eq!(ease_in_out(-0.5), 0.0);
        assert_eq!(ease_in_out(2.0), 1.0);
    }

    #[test]
    fn test_curve_shape() {
        assert!((ease_in_out(0.25) - 0.125).abs() < 1e-12);
        assert!((ease_in_out(0.75) - 0.875).abs() < 1e-12);

        let mut last = 0.0;
        for i in 1..=100 {
            let eased = ease_in_out(i as f64 / 100.0);
            assert!(eased >= last);
            last = eased;
        }
    }

    #[test]
    fn test_lerp_angle_takes_short_arc() {
        assert!((Interpolation::lerp_angle(350.0, 10.0, 0.5) - 360.0).abs() < 1e-9);
        assert!((Interpolation::lerp_angle(10.0, 350.0, 0.5) - 0.0).abs() < 1e-9);
        assert_eq!(Interpolation::lerp(2.0, 4.0, 0.5), 3.0);
    }
}
