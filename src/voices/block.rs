//! Block voice: bass swell, arpeggiated chord and one pluck per included
//! transaction.

use crate::dsp::automation::Automation;
use crate::dsp::filter::FilterType;
use crate::dsp::oscillator::Waveform;
use crate::dsp::voice::{Bus, FilterStage, Layer, Voice};
use crate::mapper::{PHRYGIAN, scale_note};

use super::{SILENCE, interval, strike};

/// Chord tones as multiples of the bass frequency.
const CHORD_RATIOS: [f64; 4] = [2.0, 2.5, 3.0, 4.0];
/// Most plucks one block can add.
pub const MAX_PLUCKS: usize = 8;
/// Seconds the bass rings.
pub const BASS_SECONDS: f64 = 2.0;

/// Two voices: the bass straight to master, and chord + plucks through the
/// shared filter.
pub fn block(sample_rate: f64, bass_frequency: f64, transaction_count: usize, now: f64) -> Vec<Voice> {
    vec![
        bass(sample_rate, bass_frequency, now),
        chord_and_plucks(sample_rate, bass_frequency, transaction_count, now),
    ]
}

fn bass(sample_rate: f64, bass_frequency: f64, now: f64) -> Voice {
    let end = now + BASS_SECONDS;
    let mut cutoff = Automation::new(50.0);
    cutoff
        .set_value_at(50.0, now)
        .exponential_ramp_to(500.0, now + 0.1)
        .exponential_ramp_to(50.0, end);

    let mut gain = Automation::new(0.0);
    gain.set_value_at(0.0, now)
        .linear_ramp_to(0.3, now + 0.05)
        .set_value_at(0.3, now + 0.5)
        .exponential_ramp_to(SILENCE, end);

    Voice::new("block bass", Bus::Master).layer(
        Layer::oscillator(Waveform::Square, sample_rate, Automation::new(bass_frequency), now, end)
            .with_filter(FilterStage::new(FilterType::Lowpass, sample_rate, cutoff, 10.0))
            .with_gain(gain),
    )
}

fn chord_and_plucks(sample_rate: f64, bass_frequency: f64, transaction_count: usize, now: f64) -> Voice {
    let mut voice = Voice::new("block chord", Bus::Filter);
    for (i, ratio) in CHORD_RATIOS.into_iter().enumerate() {
        let start = now + i as f64 * 0.05;
        voice = voice.layer(
            Layer::oscillator(
                Waveform::Triangle,
                sample_rate,
                Automation::new(bass_frequency * ratio),
                start,
                start + 1.0,
            )
            .with_gain(strike(start, 0.1, 0.05, start + 1.0)),
        );
    }

    for i in 0..transaction_count.min(MAX_PLUCKS) {
        let start = now + i as f64 * 0.1;
        let f = 440.0 * interval(scale_note(PHRYGIAN, i * 3) as f64);
        let mut cutoff = Automation::new(f * 4.0);
        cutoff
            .set_value_at(f * 4.0, start)
            .exponential_ramp_to(f * 0.5, start + 0.2);
        voice = voice.layer(
            Layer::oscillator(Waveform::Sawtooth, sample_rate, Automation::new(f), start, start + 0.3)
                .with_filter(FilterStage::new(FilterType::Lowpass, sample_rate, cutoff, 5.0))
                .with_gain(strike(start, 0.005, 0.1, start + 0.3)),
        );
    }
    voice
}
