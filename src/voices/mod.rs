//! Voice Library: recipes that turn mapped parameters into scheduled voices.
//!
//! Each recipe takes the sample rate, its parameters and the audio-clock
//! time to start at, and returns a fully scheduled [`Voice`]: envelopes start
//! at zero, decay to [`SILENCE`] or below, and every layer carries its stop
//! time. Nothing here touches the registry or the signal graph.

pub mod ambient;
pub mod block;
pub mod contract;
pub mod erc20;
pub mod percussion;
pub mod transaction;

use crate::dsp::automation::Automation;
use crate::dsp::voice::Voice;
use crate::mapper::{AudioParameters, Erc20Parameters};

/// Level every decaying envelope ends on.
pub const SILENCE: f64 = 0.001;

/// Recipe for a value-mapped transaction.
pub type TransactionRecipe = fn(f64, &AudioParameters, f64) -> Voice;

/// Recipe for an ERC-20 transfer.
pub type Erc20Recipe = fn(f64, &Erc20Parameters, f64) -> Voice;

/// Percussive envelope: 0 at `start`, linear to `peak` after `attack`,
/// exponential down to [`SILENCE`] at `end`.
pub fn strike(start: f64, attack: f64, peak: f64, end: f64) -> Automation {
    let peak_at = start + attack.max(0.0);
    let mut gain = Automation::new(0.0);
    gain.set_value_at(0.0, start)
        .linear_ramp_to(peak, peak_at)
        .exponential_ramp_to(SILENCE, end.max(peak_at));
    gain
}

/// Attack-decay-release envelope: 0 at `start`, linear to `peak` after
/// `attack`, exponential to `sustain_level` at `start + decay`, exponential
/// to [`SILENCE`] at `end`. Breakpoints are kept in order.
pub fn adsr(start: f64, attack: f64, peak: f64, decay: f64, sustain_level: f64, end: f64) -> Automation {
    let peak_at = start + attack.max(0.0);
    let decay_at = (start + decay).max(peak_at);
    let mut gain = Automation::new(0.0);
    gain.set_value_at(0.0, start)
        .linear_ramp_to(peak, peak_at)
        .exponential_ramp_to(sustain_level, decay_at)
        .exponential_ramp_to(SILENCE, end.max(decay_at));
    gain
}

/// Frequency ratio of `semitones`.
pub fn interval(semitones: f64) -> f64 {
    2f64.powf(semitones / 12.0)
}

#[cfg(test)]
pub(crate) fn assert_well_formed(voice: &Voice, start: f64, duration: f64) {
    assert!(voice.node_count() > 0, "{}: empty voice", voice.label);
    assert!(
        voice.stop() + 1e-9 >= start + duration,
        "{}: stops at {} before {}",
        voice.label,
        voice.stop(),
        start + duration
    );
    assert!(
        voice.final_gain() <= SILENCE + 1e-9,
        "{}: left sounding at {}",
        voice.label,
        voice.final_gain()
    );
    assert!(
        voice.stop() + 1e-9 >= voice.envelope_end(),
        "{}: stops before its envelope ends",
        voice.label
    );
    let mut probe = voice.clone();
    assert_eq!(probe.process(start), (0.0, 0.0), "{}: clicks on start", voice.label);
}
