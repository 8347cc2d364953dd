//! Compressor: feed-forward dynamics processing.
//!
//! Threshold, knee, ratio, attack and release follow the
//! DynamicsCompressorNode parameter set. The master bus uses the
//! `master` preset; jazz voices carry a gentler per-layer compressor.

/// A stereo-linked dynamics compressor.
#[derive(Debug, Clone)]
pub struct Compressor {
    sample_rate: f64,

    /// Threshold in dB.
    pub threshold: f64,
    /// Compression ratio (e.g. 12.0 = 12:1).
    pub ratio: f64,
    /// Knee width in dB (0 = hard knee).
    pub knee: f64,
    /// Attack time in seconds.
    pub attack: f64,
    /// Release time in seconds.
    pub release: f64,

    envelope: f64,
}

impl Compressor {
    /// Create a compressor with the given curve and timing.
    pub fn with_params(
        sample_rate: f64,
        threshold: f64,
        knee: f64,
        ratio: f64,
        attack: f64,
        release: f64,
    ) -> Self {
        Self {
            sample_rate,
            threshold: threshold.clamp(-100.0, 0.0),
            knee: knee.clamp(0.0, 40.0),
            ratio: ratio.clamp(1.0, 20.0),
            attack: attack.clamp(0.0001, 1.0),
            release: release.clamp(0.001, 5.0),
            envelope: 0.0,
        }
    }

    /// Master bus: -24 dB threshold, 30 dB knee, 12:1.
    pub fn master(sample_rate: f64) -> Self {
        Self::with_params(sample_rate, -24.0, 30.0, 12.0, 0.003, 0.25)
    }

    /// Per-voice jazz compressor: -20 dB threshold, 3:1.
    pub fn gentle(sample_rate: f64) -> Self {
        Self::with_params(sample_rate, -20.0, 30.0, 3.0, 0.003, 0.25)
    }

    #[inline]
    fn linear_to_db(linear: f64) -> f64 {
        if linear <= 0.0 {
            -120.0
        } else {
            20.0 * linear.log10()
        }
    }

    #[inline]
    fn db_to_linear(db: f64) -> f64 {
        10.0_f64.powf(db / 20.0)
    }

    /// Gain change in dB (always <= 0) for an input level in dB.
    #[inline]
    fn compute_gain(&self, input_db: f64) -> f64 {
        let slope = 1.0 - 1.0 / self.ratio;
        if self.knee <= 0.0 {
            if input_db <= self.threshold {
                0.0
            } else {
                (self.threshold - input_db) * slope
            }
        } else {
            let half_knee = self.knee / 2.0;
            let knee_start = self.threshold - half_knee;
            let knee_end = self.threshold + half_knee;

            if input_db <= knee_start {
                0.0
            } else if input_db >= knee_end {
                (self.threshold - input_db) * slope
            } else {
                // Quadratic blend through the knee.
                let x = input_db - knee_start;
                -slope * x * x / (2.0 * self.knee)
            }
        }
    }

    /// Process a stereo sample pair; both channels share one detector.
    #[inline]
    pub fn process(&mut self, left: f32, right: f32) -> (f32, f32) {
        let gain = self.follow(left.abs().max(right.abs()) as f64) as f32;
        (left * gain, right * gain)
    }

    /// Process a single mono sample.
    #[inline]
    pub fn process_mono(&mut self, input: f64) -> f64 {
        input * self.follow(input.abs())
    }

    fn follow(&mut self, level: f64) -> f64 {
        let time = if level > self.envelope {
            self.attack
        } else {
            self.release
        };
        let coef = (-1.0 / (time * self.sample_rate)).exp();
        self.envelope = coef * self.envelope + (1.0 - coef) * level;
        Self::db_to_linear(self.compute_gain(Self::linear_to_db(self.envelope)))
    }

    /// Current gain reduction in dB (positive number).
    pub fn gain_reduction(&self) -> f64 {
        -self.compute_gain(Self::linear_to_db(self.envelope))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_signal_passes_through() {
        let mut comp = Compressor::master(44100.0);
        // -46 dB sits below the knee (-39 dB).
        for _ in 0..2000 {
            comp.process(0.005, 0.005);
        }
        let (out_l, out_r) = comp.process(0.005, 0.005);
        assert!((out_l - 0.005).abs() < 1e-5, "got {out_l}");
        assert_eq!(out_l, out_r);
        assert!(comp.gain_reduction() < 1e-9);
    }

    #[test]
    fn loud_signal_is_reduced() {
        let mut comp = Compressor::master(44100.0);
        for _ in 0..10_000 {
            comp.process(1.0, 1.0);
        }
        let (out_l, _) = comp.process(1.0, 1.0);
        // 0 dB in, 24 dB over threshold at 12:1 -> -22 dB.
        assert!(out_l < 0.12, "master compressor should clamp hard, got {out_l}");
        assert!(out_l > 0.05, "but not silence, got {out_l}");
    }

    #[test]
    fn gentle_ratio_reduces_less() {
        let mut master = Compressor::master(44100.0);
        let mut gentle = Compressor::gentle(44100.0);
        let mut a = 0.0;
        let mut b = 0.0;
        for _ in 0..10_000 {
            a = master.process_mono(0.8);
            b = gentle.process_mono(0.8);
        }
        assert!(b > a, "3:1 should leave more level than 12:1 ({b} vs {a})");
    }

    #[test]
    fn knee_is_continuous() {
        let comp = Compressor::master(44100.0);
        let edge = comp.threshold + comp.knee / 2.0;
        let inside = comp.compute_gain(edge - 1e-6);
        let outside = comp.compute_gain(edge + 1e-6);
        assert!((inside - outside).abs() < 1e-4);
        assert_eq!(comp.compute_gain(comp.threshold - comp.knee / 2.0), 0.0);
    }

    #[test]
    fn release_recovers_gain() {
        let mut comp = Compressor::with_params(44100.0, -20.0, 0.0, 10.0, 0.001, 0.05);
        for _ in 0..1000 {
            comp.process(1.0, 1.0);
        }
        let (compressed, _) = comp.process(0.1, 0.1);
        for _ in 0..5000 {
            comp.process(0.1, 0.1);
        }
        let (released, _) = comp.process(0.1, 0.1);
        assert!(
            released > compressed,
            "gain should recover: compressed={compressed}, released={released}"
        );
    }
}
