//! Waveshaper: table-lookup distortion with WaveShaperNode curve indexing.

/// Points in a generated distortion curve.
pub const CURVE_POINTS: usize = 256;

/// A waveshaper that maps input in [-1, 1] through a sampled transfer curve.
#[derive(Debug, Clone)]
pub struct WaveShaper {
    curve: Vec<f64>,
}

impl WaveShaper {
    /// Build from an explicit curve. An empty curve passes input through.
    pub fn new(curve: Vec<f64>) -> Self {
        WaveShaper { curve }
    }

    /// `tanh(x * saturation) * 0.7` sampled at `(i - 128) / 128`.
    pub fn tanh(saturation: f64) -> Self {
        let half = (CURVE_POINTS / 2) as f64;
        let curve = (0..CURVE_POINTS)
            .map(|i| ((i as f64 - half) / half * saturation).tanh() * 0.7)
            .collect();
        WaveShaper { curve }
    }

    /// Shape one sample. Inputs outside [-1, 1] take the end values.
    #[inline]
    pub fn process(&self, input: f64) -> f64 {
        let n = self.curve.len();
        if n == 0 {
            return input;
        }
        if n == 1 {
            return self.curve[0];
        }
        let position = ((input + 1.0) * 0.5 * (n - 1) as f64).clamp(0.0, (n - 1) as f64);
        let index = position.floor() as usize;
        if index >= n - 1 {
            return self.curve[n - 1];
        }
        let frac = position - index as f64;
        self.curve[index] + (self.curve[index + 1] - self.curve[index]) * frac
    }
}
