//! Transaction voices, one per sound style.

use crate::dsp::automation::Automation;
use crate::dsp::chorus::Chorus;
use crate::dsp::compressor::Compressor;
use crate::dsp::filter::FilterType;
use crate::dsp::oscillator::Waveform;
use crate::dsp::shaper::WaveShaper;
use crate::dsp::voice::{Bus, FilterStage, Layer, Voice};
use crate::mapper::AudioParameters;

use super::{adsr, interval, strike};

/// Resonant sawtooth through a swept lowpass and tanh drive, into the
/// shared filter.
pub fn acid(sample_rate: f64, p: &AudioParameters, now: f64) -> Voice {
    let end = now + p.duration;
    let mut cutoff = Automation::new(150.0);
    cutoff
        .set_value_at(150.0, now)
        .exponential_ramp_to(150.0 + p.filter_sweep_range, now + 0.08)
        .exponential_ramp_to(150.0, now + p.duration * 0.9);

    Voice::new("acid transaction", Bus::Filter)
        .layer(
            Layer::oscillator(Waveform::Sawtooth, sample_rate, Automation::new(p.frequency), now, end)
                .with_filter(FilterStage::new(
                    FilterType::Lowpass,
                    sample_rate,
                    cutoff,
                    25.0 + p.resonance_boost,
                ))
                .with_shaper(WaveShaper::tanh(2.0 + p.saturation_amount * 3.0))
                .with_gain(strike(now, p.attack, p.volume * 1.2, end)),
        )
        .pan(p.pan)
}

/// Staggered chord (minor ninth for high values, major triad otherwise),
/// each note warmed and lightly compressed, into the reverb.
pub fn jazz(sample_rate: f64, p: &AudioParameters, now: f64) -> Voice {
    let chord: &[f64] = if p.is_high_value {
        &[0.0, 3.0, 7.0, 10.0, 14.0]
    } else {
        &[0.0, 4.0, 7.0]
    };
    let note_volume = p.volume / chord.len() as f64 * 0.8;
    let warmth = 3000.0 + p.value_in_eth * 500.0;

    let mut voice = Voice::new("jazz transaction", Bus::Reverb).pan(p.pan);
    for (i, &semitones) in chord.iter().enumerate() {
        let start = now + i as f64 * 0.03;
        let end = start + p.duration;
        let waveform = if i == 0 { Waveform::Triangle } else { Waveform::Sine };
        voice = voice.layer(
            Layer::oscillator(
                waveform,
                sample_rate,
                Automation::new(p.frequency * interval(semitones)),
                start,
                end,
            )
            .with_filter(FilterStage::fixed(FilterType::Lowpass, sample_rate, warmth, 0.7))
            .with_compressor(Compressor::gentle(sample_rate))
            .with_gain(adsr(
                start,
                p.attack,
                note_volume,
                p.decay,
                note_volume * p.sustain,
                end,
            )),
        );
    }
    voice
}

/// FM triangle through a lowpass swell with a short chorus tap, into the
/// delay.
pub fn electronic(sample_rate: f64, p: &AudioParameters, now: f64) -> Voice {
    let f = p.frequency;
    let end = now + p.duration;
    let depth = (f * 0.02 * (1.0 + p.value_in_eth * 0.3)).min(f);

    let mut cutoff = Automation::new((f * 2.0).min(1500.0));
    cutoff
        .set_value_at((f * 2.0).min(1500.0), now)
        .exponential_ramp_to((f * 3.0).min(2000.0), now + p.duration * 0.6)
        .exponential_ramp_to((f * 1.5).min(1200.0), end);

    Voice::new("electronic transaction", Bus::Delay)
        .layer(
            Layer::oscillator(Waveform::Triangle, sample_rate, Automation::new(f), now, end)
                .with_modulator(sample_rate, Automation::new(f * 0.5), Automation::new(depth))
                .with_filter(FilterStage::new(FilterType::Lowpass, sample_rate, cutoff, 2.0))
                .with_gain(strike(now, p.attack.max(0.015), p.volume * 0.5, end)),
        )
        .chorus(Chorus::tap(sample_rate, p.effects_intensity))
        .pan(p.pan)
}

const PIANO_HARMONICS: [(f64, f64); 3] = [(1.0, 0.7), (2.0, 0.2), (3.0, 0.1)];

/// Three sine partials under a soft lowpass, into the reverb.
pub fn piano(sample_rate: f64, p: &AudioParameters, now: f64) -> Voice {
    let end = now + p.duration;
    let attack = p.attack.max(0.02);
    let mut voice = Voice::new("piano transaction", Bus::Reverb)
        .voice_filter(FilterStage::fixed(
            FilterType::Lowpass,
            sample_rate,
            (1800.0 + p.value_in_eth * 200.0).min(2200.0),
            0.2,
        ))
        .pan(p.pan);
    for (harmonic, weight) in PIANO_HARMONICS {
        let level = weight * p.volume * 0.6;
        voice = voice.layer(
            Layer::oscillator(
                Waveform::Sine,
                sample_rate,
                Automation::new(p.frequency * harmonic),
                now,
                end,
            )
            .with_gain(adsr(now, attack, level, p.decay, level * p.sustain * 0.8, end)),
        );
    }
    voice
}

/// A short, plain sine blip straight to master.
pub fn minimal(sample_rate: f64, p: &AudioParameters, now: f64) -> Voice {
    let level = p.volume * 0.4;
    let short = p.duration.min(0.2 + p.value_in_eth * 0.1);
    let peak_at = now + p.attack;
    let mut gain = Automation::new(0.0);
    gain.set_value_at(0.0, now)
        .linear_ramp_to(level, peak_at)
        .linear_ramp_to(level * 0.8, (now + short * 0.3).max(peak_at))
        .linear_ramp_to(0.0, (now + short).max(peak_at));

    Voice::new("minimal transaction", Bus::Master)
        .layer(
            Layer::oscillator(Waveform::Sine, sample_rate, Automation::new(p.frequency), now, now + short)
                .with_filter(FilterStage::fixed(FilterType::Highpass, sample_rate, 150.0, 0.7))
                .with_gain(gain)
                .until(now + p.duration),
        )
        .pan(p.pan)
}

/// Bell-like FM sine through a fed-back chorus, into the reverb.
pub fn retro(sample_rate: f64, p: &AudioParameters, now: f64) -> Voice {
    let f = p.frequency;
    let end = now + p.duration;
    Voice::new("retro transaction", Bus::Reverb)
        .layer(
            Layer::oscillator(Waveform::Sine, sample_rate, Automation::new(f), now, end)
                .with_modulator(
                    sample_rate,
                    Automation::new(f * 2.1),
                    Automation::new(30.0 + p.value_range * 50.0),
                )
                .with_gain(adsr(now, 0.05, p.volume * 0.7, 0.4, p.volume * 0.4, end)),
        )
        .chorus(Chorus::retro(sample_rate))
        .pan(p.pan)
}
