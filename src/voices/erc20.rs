//! ERC-20 transfer voices: higher, shorter and simpler than transactions.

use crate::dsp::automation::Automation;
use crate::dsp::chorus::Chorus;
use crate::dsp::filter::FilterType;
use crate::dsp::oscillator::Waveform;
use crate::dsp::voice::{Bus, FilterStage, Layer, Voice};
use crate::mapper::Erc20Parameters;

use super::{interval, strike};

/// Semitone steps of the acid arpeggio for large transfers.
const ACID_ARPEGGIO: [f64; 4] = [0.0, 7.0, 12.0, 7.0];
/// Semitone steps of the retro arpeggio.
const RETRO_ARPEGGIO: [f64; 4] = [0.0, 4.0, 7.0, 12.0];

/// Ring-modulated sines through a highpass sweep, plus a quick arpeggio for
/// transfers over 100 tokens.
pub fn acid(sample_rate: f64, p: &Erc20Parameters, now: f64) -> Voice {
    let f = p.frequency;
    let end = now + p.duration;
    let mut cutoff = Automation::new(800.0);
    cutoff
        .set_value_at(800.0, now)
        .exponential_ramp_to(2000.0 + p.value * 200.0, now + 0.1)
        .exponential_ramp_to(800.0, end);

    let mut voice = Voice::new("acid transfer", Bus::Filter).layer(
        Layer::ring_mod(sample_rate, Automation::new(f), Automation::new(f * 1.5), now, end)
            .with_filter(FilterStage::new(
                FilterType::Highpass,
                sample_rate,
                cutoff,
                (5.0 + p.value * 2.0).min(30.0),
            ))
            .with_gain(strike(now, 0.005, p.volume, end)),
    );

    if p.value > 100.0 {
        for (i, semitones) in ACID_ARPEGGIO.into_iter().enumerate() {
            let start = now + i as f64 * 0.05;
            voice = voice.layer(
                Layer::oscillator(
                    Waveform::Triangle,
                    sample_rate,
                    Automation::new(f * interval(semitones)),
                    start,
                    start + 0.1,
                )
                .with_gain(strike(start, 0.002, 0.05, start + 0.1)),
            );
        }
    }
    voice
}

/// A bell an octave up, into the reverb.
pub fn jazz(sample_rate: f64, p: &Erc20Parameters, now: f64) -> Voice {
    let end = now + p.duration;
    Voice::new("jazz transfer", Bus::Reverb).layer(
        Layer::oscillator(Waveform::Sine, sample_rate, Automation::new(p.frequency * 2.0), now, end)
            .with_gain(strike(now, 0.01, p.volume, end)),
    )
}

/// Triangle under an opening lowpass, into the delay.
pub fn electronic(sample_rate: f64, p: &Erc20Parameters, now: f64) -> Voice {
    let f = p.frequency * 1.5;
    let end = now + p.duration;
    let mut cutoff = Automation::new(f * 2.0);
    cutoff
        .set_value_at(f * 2.0, now)
        .exponential_ramp_to(f * 3.0, end);
    Voice::new("electronic transfer", Bus::Delay).layer(
        Layer::oscillator(Waveform::Triangle, sample_rate, Automation::new(f), now, end)
            .with_filter(FilterStage::new(FilterType::Lowpass, sample_rate, cutoff, 3.0))
            .with_gain(strike(now, 0.01, p.volume, end)),
    )
}

/// A muted sine, into the reverb.
pub fn piano(sample_rate: f64, p: &Erc20Parameters, now: f64) -> Voice {
    let end = now + p.duration;
    Voice::new("piano transfer", Bus::Reverb).layer(
        Layer::oscillator(Waveform::Sine, sample_rate, Automation::new(p.frequency * 1.5), now, end)
            .with_filter(FilterStage::fixed(FilterType::Lowpass, sample_rate, 1500.0, 0.5))
            .with_gain(strike(now, 0.01, p.volume * 0.5, end)),
    )
}

/// A 50 ms sine tick two octaves up, straight to master.
pub fn minimal(sample_rate: f64, p: &Erc20Parameters, now: f64) -> Voice {
    let mut gain = Automation::new(0.0);
    gain.set_value_at(0.0, now)
        .linear_ramp_to(p.volume * 0.3, now + 0.002)
        .linear_ramp_to(0.0, now + 0.05);
    Voice::new("minimal transfer", Bus::Master).layer(
        Layer::oscillator(Waveform::Sine, sample_rate, Automation::new(p.frequency * 3.0), now, now + 0.05)
            .with_gain(gain)
            .until(now + p.duration),
    )
}

/// A square-wave major arpeggio through the retro chorus, into the reverb.
pub fn retro(sample_rate: f64, p: &Erc20Parameters, now: f64) -> Voice {
    let end = now + p.duration;
    let mut voice = Voice::new("retro transfer", Bus::Reverb).chorus(Chorus::retro(sample_rate));
    for (i, semitones) in RETRO_ARPEGGIO.into_iter().enumerate() {
        let start = now + i as f64 * 0.08;
        let note_end = start + 0.15;
        let mut gain = strike(start, 0.01, p.volume * 0.6, note_end);
        gain.set_value_at(0.0, note_end);
        voice = voice.layer(
            Layer::oscillator(
                Waveform::Square,
                sample_rate,
                Automation::new(p.frequency * interval(semitones)),
                start,
                note_end,
            )
            .with_gain(gain),
        );
    }
    // The last note carries the voice to its nominal end.
    if let Some(last) = voice.layers.pop() {
        voice = voice.layer(last.until(end));
    }
    voice
}
