//! Parameter mapper: chain event + settings to bounded synthesis parameters.
//!
//! Every function here is pure. Pitch and pan come only from hash or
//! selector characters, so the same event always sounds the same; volume is
//! always held under the hard ceiling and pitch inside the pleasant band.

use serde::Serialize;

use crate::chain::{TokenTransfer, Transaction, hex_suffix, parse_hex};
use crate::settings::{EngineSettings, MappingTuning, SoundStyle};
use crate::style;

// ── Scales ─────────────────────────────────────────────────

pub const PENTATONIC: &[i32] = &[0, 2, 4, 7, 9];
pub const DORIAN: &[i32] = &[0, 2, 3, 5, 7, 9, 10];
pub const WHOLE_TONE: &[i32] = &[0, 2, 4, 6, 8, 10];
pub const PHRYGIAN: &[i32] = &[0, 1, 3, 5, 7, 8, 10];

/// Lowest frequency handed to a voice without folding (Hz).
pub const BAND_LOW: f64 = 110.0;
/// Highest frequency handed to a voice without folding (Hz).
pub const BAND_HIGH: f64 = 1760.0;

/// Semitone offset of `index` in `scale`, octaves unbounded.
pub fn scale_note(scale: &[i32], index: usize) -> i32 {
    let len = scale.len().max(1);
    let octave = (index / len) as i32;
    scale.get(index % len).copied().unwrap_or(0) + octave * 12
}

/// Semitone offset from middle C for a hash-derived note index, constrained
/// to C3..C6: octave clamped to 0..=2 and shifted down one.
pub fn musical_note(scale: &[i32], note_index: usize) -> i32 {
    let len = scale.len().max(1);
    let octave = (note_index / len).min(2) as i32;
    let degree = scale.get(note_index % len).copied().unwrap_or(0);
    (degree + octave * 12 - 12).clamp(-12, 24)
}

/// Equal-tempered frequency of a MIDI note (A4 = 69 = 440 Hz).
pub fn midi_to_hz(midi: f64) -> f64 {
    440.0 * 2f64.powf((midi - 69.0) / 12.0)
}

/// Fold a frequency into the pleasant band: below 110 Hz into [110, 165),
/// above 1760 Hz into [880, 1320).
pub fn fold_frequency(frequency: f64) -> f64 {
    if !frequency.is_finite() || frequency <= 0.0 {
        BAND_LOW
    } else if frequency < BAND_LOW {
        BAND_LOW + frequency % 55.0
    } else if frequency > BAND_HIGH {
        880.0 + frequency % 440.0
    } else {
        frequency
    }
}

/// Logarithmic value compression: `log10(max(value, 0.001) + 1)`.
pub fn value_range(value: f64) -> f64 {
    (value.max(0.001) + 1.0).log10()
}

// ── Transactions ───────────────────────────────────────────

/// Synthesis parameters for a plain transaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioParameters {
    pub frequency: f64,
    pub volume: f64,
    pub duration: f64,
    pub value_in_eth: f64,
    pub value_range: f64,
    pub gas_price_gwei: f64,
    pub pan: f64,

    pub effects_intensity: f64,
    pub reverb_send: f64,
    pub delay_send: f64,

    pub harmonic_count: u32,
    pub harmonic_spread: f64,

    pub attack: f64,
    pub decay: f64,
    pub sustain: f64,
    pub release: f64,

    pub filter_sweep_range: f64,
    pub resonance_boost: f64,
    pub saturation_amount: f64,

    pub is_high_value: bool,
    pub is_medium_value: bool,
}

/// Map a transaction under the current style.
pub fn map_transaction(
    tx: &Transaction,
    settings: &EngineSettings,
    tuning: &MappingTuning,
) -> AudioParameters {
    let value_in_eth = tx.value_in_eth().max(0.0);
    let gas_price_gwei = tx.gas_price_gwei().max(0.0);
    let vr = value_range(value_in_eth);
    let is_high_value = value_in_eth > 1.0;
    let is_medium_value = value_in_eth > 0.1;

    let hash = tx.hash.as_deref().unwrap_or("");
    let frequency = transaction_frequency(hash, settings.sound_style);

    let mut volume = (tuning.volume_floor + vr * tuning.volume_slope).min(tuning.volume_pre_cap);
    if is_high_value {
        volume *= tuning.high_value_boost;
    }
    let volume = volume.clamp(0.0, tuning.ceiling());

    let mut duration = (tuning.duration_floor + vr * tuning.duration_slope).min(tuning.duration_cap);
    if is_high_value {
        duration *= tuning.high_value_stretch;
    }

    let pan_seed = if hash.is_empty() {
        128
    } else {
        hex_suffix(hash, 2).unwrap_or(128)
    };
    let pan = (pan_seed as f64 / 255.0 * 2.0 - 1.0).clamp(-1.0, 1.0);

    AudioParameters {
        frequency,
        volume,
        duration,
        value_in_eth,
        value_range: vr,
        gas_price_gwei,
        pan,
        effects_intensity: (0.3 + vr * 0.4 + gas_price_gwei / 100.0 * 0.2).min(1.0),
        reverb_send: if is_high_value { 0.8 } else { 0.4 },
        delay_send: if is_medium_value { 0.6 } else { 0.2 },
        harmonic_count: (2 + (vr * 2.0).floor() as u32).min(6),
        harmonic_spread: if is_high_value { 1.2 } else { 0.8 },
        attack: if is_high_value { 0.002 } else { 0.01 },
        decay: (vr * 0.1 + 0.05).min(1.0),
        sustain: (0.3 + vr * 0.3).min(0.8),
        release: duration * 0.7,
        filter_sweep_range: (200.0 + value_in_eth * 1000.0).clamp(200.0, 8000.0),
        resonance_boost: (gas_price_gwei / 5.0).min(15.0),
        saturation_amount: (vr * 0.3).min(0.7),
        is_high_value,
        is_medium_value,
    }
}

/// Hash-derived pitch: last 8 hex characters mod 24, through the style's
/// scale, from middle C, folded into the band.
pub fn transaction_frequency(hash: &str, sound_style: SoundStyle) -> f64 {
    let hash_int = hex_suffix(hash, 8).unwrap_or(0);
    let note_index = (hash_int % 24) as usize;
    let note = musical_note(style::profile(sound_style).scale, note_index);
    fold_frequency(midi_to_hz(60.0 + note as f64))
}

// ── ERC-20 transfers ───────────────────────────────────────

/// Synthesis parameters for a token transfer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Erc20Parameters {
    pub frequency: f64,
    pub volume: f64,
    pub duration: f64,
    /// Whole-token amount.
    pub value: f64,
    pub value_range: f64,
}

pub fn map_erc20(
    transfer: &TokenTransfer,
    settings: &EngineSettings,
    tuning: &MappingTuning,
) -> Erc20Parameters {
    let value = transfer.value_tokens().max(0.0);
    let vr = value_range(value);
    let index = ((value * 10.0).floor() % 12.0) as usize + vr.floor() as usize;
    let note = scale_note(PHRYGIAN, index);
    let frequency = fold_frequency(settings.transaction_pitch * 1.5 * 2f64.powf(note as f64 / 12.0));

    Erc20Parameters {
        frequency,
        volume: (0.03 + vr * 0.05).min(0.15).min(tuning.ceiling()),
        duration: (0.3 + vr * 0.2).min(1.0),
        value,
        value_range: vr,
    }
}

// ── Contract calls ─────────────────────────────────────────

/// Synthesis parameters for a contract call, keyed on the function selector.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractParameters {
    pub function_selector: String,
    pub selector_value: u32,
    /// 1..=7.
    pub complexity: u32,
    pub base_frequency: f64,
    /// `[1, 1.25, 1.5, 2] x base`, truncated to `complexity`.
    pub layer_frequencies: Vec<f64>,
    pub volume: f64,
    pub duration: f64,
    pub value_in_eth: f64,
    pub pan: f64,

    pub effects_intensity: f64,
    pub reverb_send: f64,
    pub delay_send: f64,

    pub mod_frequency: f64,
    pub mod_depth: f64,

    pub attack: f64,
    pub decay: f64,
    pub sustain: f64,
    pub release: f64,
}

pub fn map_contract_call(tx: &Transaction, tuning: &MappingTuning) -> ContractParameters {
    let value_in_eth = tx.value_in_eth().max(0.0);
    let gas_price_gwei = tx.gas_price_gwei().max(0.0);
    let function_selector = tx.function_selector();
    let selector_digits: String = function_selector.chars().skip(2).take(4).collect();
    let selector_value = parse_hex(&selector_digits) as u32;

    let complexity = selector_value % 7 + 1;
    let base_frequency = 150.0 + (selector_value % 600) as f64;
    let layer_frequencies = [1.0, 1.25, 1.5, 2.0]
        .iter()
        .take(complexity as usize)
        .map(|ratio| base_frequency * ratio)
        .collect();

    let volume = (0.05 + value_range(value_in_eth) * 0.08)
        .min(0.15)
        .min(tuning.ceiling());
    let duration = (1.2 + value_in_eth * 0.8 + gas_price_gwei * 0.02).min(4.0);
    let c = complexity as f64;

    ContractParameters {
        function_selector,
        selector_value,
        complexity,
        base_frequency,
        layer_frequencies,
        volume,
        duration,
        value_in_eth,
        pan: (selector_value as f64 * 0.01).sin() * 0.8,
        effects_intensity: 0.7 + c / 7.0 * 0.3,
        reverb_send: 0.9,
        delay_send: 0.8,
        mod_frequency: 1.0 + (selector_value % 20) as f64,
        mod_depth: 0.3 + c / 7.0 * 0.4,
        attack: 0.05 + c * 0.02,
        decay: duration * 0.3,
        sustain: (0.6 + value_in_eth * 0.2).clamp(0.1, 1.0),
        release: duration * 0.5,
    }
}
