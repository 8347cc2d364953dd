//! Noise buffers for percussion, data bursts, and the reverb impulse.

use fastrand::Rng;

/// `seconds` of uniform white noise in [-1, 1).
pub fn white(rng: &mut Rng, seconds: f64, sample_rate: f64) -> Vec<f32> {
    let len = buffer_len(seconds, sample_rate);
    (0..len).map(|_| rng.f32() * 2.0 - 1.0).collect()
}

/// White noise under an exponential decay reaching 1/e at 30 % of the buffer.
pub fn decaying(rng: &mut Rng, seconds: f64, sample_rate: f64) -> Vec<f32> {
    let len = buffer_len(seconds, sample_rate);
    let tau = len as f32 * 0.3;
    (0..len)
        .map(|i| (rng.f32() * 2.0 - 1.0) * (-(i as f32) / tau).exp())
        .collect()
}

/// A stereo room impulse: independent noise per channel shaped by
/// `(1 - i/len)^1.5`.
pub fn impulse_response(rng: &mut Rng, seconds: f64, sample_rate: f64) -> [Vec<f32>; 2] {
    let len = buffer_len(seconds, sample_rate);
    let mut channel = || -> Vec<f32> {
        (0..len)
            .map(|i| (rng.f32() * 2.0 - 1.0) * (1.0 - i as f32 / len as f32).powf(1.5))
            .collect()
    };
    let left = channel();
    let right = channel();
    [left, right]
}

fn buffer_len(seconds: f64, sample_rate: f64) -> usize {
    ((seconds * sample_rate).max(1.0)) as usize
}
