//! Biquad filter: matches WebAudio BiquadFilterNode coefficients.
//!
//! As in WebAudio, `q` for lowpass/highpass is a resonance in dB while
//! bandpass uses a linear Q.

use std::f64::consts::PI;

/// Filter type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    Lowpass,
    Highpass,
    Bandpass,
}

/// A biquad IIR filter (2nd order).
///
/// Direct Form II Transposed; coefficient formulas from the Audio EQ
/// Cookbook (Robert Bristow-Johnson).
#[derive(Debug, Clone)]
pub struct BiquadFilter {
    pub filter_type: FilterType,
    frequency: f64,
    q: f64,

    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,

    z1: f64,
    z2: f64,

    sample_rate: f64,
}

impl BiquadFilter {
    pub fn new(filter_type: FilterType, sample_rate: f64) -> Self {
        let mut f = BiquadFilter {
            filter_type,
            frequency: 350.0,
            q: 1.0,
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
            z1: 0.0,
            z2: 0.0,
            sample_rate,
        };
        f.update_coefficients();
        f
    }

    pub fn with_params(filter_type: FilterType, sample_rate: f64, frequency: f64, q: f64) -> Self {
        let mut f = Self::new(filter_type, sample_rate);
        f.set_params(frequency, q);
        f
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Retune the filter; coefficients are only recomputed on change.
    pub fn set_params(&mut self, frequency: f64, q: f64) {
        let nyquist = self.sample_rate * 0.5;
        let frequency = if frequency.is_finite() {
            frequency.clamp(10.0, nyquist * 0.98)
        } else {
            self.frequency
        };
        let q = if q.is_finite() { q } else { self.q };
        if (frequency - self.frequency).abs() > 1e-6 || (q - self.q).abs() > 1e-9 {
            self.frequency = frequency;
            self.q = q;
            self.update_coefficients();
        }
    }

    fn update_coefficients(&mut self) {
        let w0 = 2.0 * PI * self.frequency / self.sample_rate;
        let cos_w0 = w0.cos();
        let sin_w0 = w0.sin();

        let (b0, b1, b2, a0, a1, a2) = match self.filter_type {
            FilterType::Lowpass => {
                let alpha = sin_w0 / (2.0 * db_to_q(self.q));
                let b1 = 1.0 - cos_w0;
                let b0 = b1 / 2.0;
                (b0, b1, b0, 1.0 + alpha, -2.0 * cos_w0, 1.0 - alpha)
            }
            FilterType::Highpass => {
                let alpha = sin_w0 / (2.0 * db_to_q(self.q));
                let b0 = (1.0 + cos_w0) / 2.0;
                (b0, -(1.0 + cos_w0), b0, 1.0 + alpha, -2.0 * cos_w0, 1.0 - alpha)
            }
            FilterType::Bandpass => {
                let alpha = sin_w0 / (2.0 * self.q.max(0.0001));
                (alpha, 0.0, -alpha, 1.0 + alpha, -2.0 * cos_w0, 1.0 - alpha)
            }
        };

        self.b0 = b0 / a0;
        self.b1 = b1 / a0;
        self.b2 = b2 / a0;
        self.a1 = a1 / a0;
        self.a2 = a2 / a0;
    }

    /// Process a single sample through the filter.
    #[inline]
    pub fn process(&mut self, input: f64) -> f64 {
        let output = self.b0 * input + self.z1;
        self.z1 = self.b1 * input - self.a1 * output + self.z2;
        self.z2 = self.b2 * input - self.a2 * output;
        output
    }

    /// Reset filter state.
    pub fn reset(&mut self) {
        self.z1 = 0.0;
        self.z2 = 0.0;
    }
}

/// WebAudio lowpass/highpass resonance (dB) to a linear Q.
fn db_to_q(db: f64) -> f64 {
    10.0_f64.powf(db / 20.0).max(0.0001)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peak_after_transient(f: &mut BiquadFilter, freq: f64, sample_rate: f64) -> f64 {
        let mut max_out = 0.0_f64;
        for i in 0..8820 {
            let t = i as f64 / sample_rate;
            let out = f.process((2.0 * PI * freq * t).sin());
            if i > 2000 {
                max_out = max_out.max(out.abs());
            }
        }
        max_out
    }

    #[test]
    fn lowpass_passes_dc() {
        let mut f = BiquadFilter::with_params(FilterType::Lowpass, 44100.0, 5000.0, 1.0);
        let mut output = 0.0;
        for _ in 0..1000 {
            output = f.process(1.0);
        }
        assert!((output - 1.0).abs() < 0.001, "Lowpass should pass DC, got {output}");
    }

    #[test]
    fn highpass_blocks_dc() {
        let mut f = BiquadFilter::with_params(FilterType::Highpass, 44100.0, 1000.0, 0.7);
        let mut output = 0.0;
        for _ in 0..1000 {
            output = f.process(1.0);
        }
        assert!(output.abs() < 0.001, "Highpass should block DC, got {output}");
    }

    #[test]
    fn lowpass_attenuates_high_freq() {
        let mut f = BiquadFilter::with_params(FilterType::Lowpass, 44100.0, 200.0, 0.0);
        let max_out = peak_after_transient(&mut f, 10000.0, 44100.0);
        assert!(
            max_out < 0.01,
            "Lowpass@200Hz should strongly attenuate 10kHz, got amplitude {max_out}"
        );
    }

    #[test]
    fn resonance_in_db_boosts_cutoff() {
        // 12 dB of resonance should lift a tone at the cutoff well above unity.
        let mut f = BiquadFilter::with_params(FilterType::Lowpass, 44100.0, 1000.0, 12.0);
        let peak = peak_after_transient(&mut f, 1000.0, 44100.0);
        assert!(peak > 3.0 && peak < 5.0, "expected ~+12 dB at cutoff, got {peak}");
    }

    #[test]
    fn bandpass_centre_passes() {
        let mut f = BiquadFilter::with_params(FilterType::Bandpass, 44100.0, 1500.0, 3.0);
        let centre = peak_after_transient(&mut f, 1500.0, 44100.0);
        f.reset();
        let off = peak_after_transient(&mut f, 150.0, 44100.0);
        assert!(centre > 0.9, "bandpass centre gain ~1, got {centre}");
        assert!(off < 0.2, "off-band tone should be attenuated, got {off}");
    }

    #[test]
    fn frequency_is_clamped_below_nyquist() {
        let mut f = BiquadFilter::new(FilterType::Lowpass, 8000.0);
        f.set_params(50_000.0, 1.0);
        assert!(f.frequency() < 4000.0);
        f.set_params(-5.0, 1.0);
        assert_eq!(f.frequency(), 10.0);
        for i in 0..10000 {
            let input = if i % 100 == 0 { 1.0 } else { 0.0 };
            assert!(f.process(input).is_finite(), "output not finite at sample {i}");
        }
    }
}
