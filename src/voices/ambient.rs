//! Ambient cues: near-inaudible texture that bypasses value mapping.

use fastrand::Rng;

use crate::chain::hex_suffix;
use crate::dsp::automation::Automation;
use crate::dsp::filter::FilterType;
use crate::dsp::oscillator::Waveform;
use crate::dsp::voice::{Bus, FilterStage, Layer, Voice};

use super::{interval, strike};

/// Loudest any ambient cue gets.
pub const AMBIENT_CEILING: f64 = 0.02;

/// Pending-transaction shimmer: two detuned sines gliding up half an
/// octave over two seconds.
pub fn pending(sample_rate: f64, rng: &mut Rng, now: f64) -> Voice {
    let base = 800.0 + rng.f64() * 400.0;
    let end = now + 2.0;
    let glide = |from: f64, to: f64| {
        let mut f = Automation::new(from);
        f.set_value_at(from, now).linear_ramp_to(to, end);
        f
    };

    let mut gain = Automation::new(0.0);
    gain.set_value_at(0.0, now)
        .linear_ramp_to(AMBIENT_CEILING, now + 0.5)
        .linear_ramp_to(AMBIENT_CEILING, now + 1.5)
        .linear_ramp_to(0.0, end);

    Voice::new("pending shimmer", Bus::Reverb)
        .layer(Layer::oscillator(
            Waveform::Sine,
            sample_rate,
            glide(base, base * 1.5),
            now,
            end,
        ))
        .layer(Layer::oscillator(
            Waveform::Sine,
            sample_rate,
            glide(base * 1.01, base * 1.51),
            now,
            end,
        ))
        .voice_filter(FilterStage::fixed(FilterType::Highpass, sample_rate, 600.0, 0.5))
        .output_gain(gain)
}

/// Pitch of the new-address chime: A5 plus the address's last eight hex
/// characters mod 12 semitones.
pub fn chime_frequency(address: &str) -> f64 {
    let offset = hex_suffix(address, 8).unwrap_or(0) % 12;
    880.0 * interval(offset as f64)
}

/// New-address chime.
pub fn new_address(sample_rate: f64, address: &str, now: f64) -> Voice {
    let end = now + 0.5;
    Voice::new("address chime", Bus::Reverb).layer(
        Layer::oscillator(
            Waveform::Sine,
            sample_rate,
            Automation::new(chime_frequency(address)),
            now,
            end,
        )
        .with_filter(FilterStage::fixed(FilterType::Highpass, sample_rate, 600.0, 1.0))
        .with_gain(strike(now, 0.01, AMBIENT_CEILING, end)),
    )
}

/// New-transaction tick: an 80 ms band-passed square.
pub fn new_transaction(sample_rate: f64, rng: &mut Rng, now: f64) -> Voice {
    let end = now + 0.08;
    Voice::new("transaction tick", Bus::Delay).layer(
        Layer::oscillator(
            Waveform::Square,
            sample_rate,
            Automation::new(1200.0 + rng.f64() * 400.0),
            now,
            end,
        )
        .with_filter(FilterStage::fixed(FilterType::Bandpass, sample_rate, 1500.0, 3.0))
        .with_gain(strike(now, 0.002, 0.015, end)),
    )
}
