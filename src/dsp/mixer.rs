//! Mixer helpers: stereo panning and master-bus soft clipping.

use std::f64::consts::FRAC_PI_2;

/// Equal-power pan gains `(left, right)` for `pan` in [-1, 1].
///
/// Centre gives cos(pi/4) on both sides, matching StereoPannerNode for a
/// mono source.
#[inline]
pub fn pan_gains(pan: f64) -> (f64, f64) {
    let x = (pan.clamp(-1.0, 1.0) + 1.0) * 0.5;
    ((x * FRAC_PI_2).cos(), (x * FRAC_PI_2).sin())
}

/// Soft clipper using tanh to prevent harsh digital clipping.
#[inline]
pub fn soft_clip(x: f64) -> f64 {
    x.tanh()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centre_pan_is_equal_power() {
        let (l, r) = pan_gains(0.0);
        assert!((l - r).abs() < 1e-12);
        assert!((l * l + r * r - 1.0).abs() < 1e-12);
    }

    #[test]
    fn hard_pans() {
        let (l, r) = pan_gains(-1.0);
        assert!((l - 1.0).abs() < 1e-12 && r.abs() < 1e-12);
        let (l, r) = pan_gains(1.0);
        assert!(l.abs() < 1e-12 && (r - 1.0).abs() < 1e-12);
        assert_eq!(pan_gains(7.0), pan_gains(1.0), "pan is clamped");
    }

    #[test]
    fn soft_clip_prevents_overflow() {
        assert!(soft_clip(100.0) <= 1.0);
        assert!((soft_clip(0.01) - 0.01).abs() < 1e-5, "near-linear for small signals");
    }
}
