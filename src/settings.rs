//! Engine settings and construction-time configuration.
//!
//! `EngineSettings` is the live, host-editable state (the JSON keys match the
//! page controls); `EngineConfig` is fixed when the engine is built.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Absolute volume ceiling for any value-mapped sound, as a fraction of full
/// scale. Tuning may lower it, never raise it.
pub const HARD_VOLUME_CEILING: f64 = 0.08;

/// Selectable timbre and percussion pack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum SoundStyle {
    Acid,
    Jazz,
    Electronic,
    Piano,
    #[default]
    Minimal,
    Retro,
}

impl SoundStyle {
    pub const ALL: [SoundStyle; 6] = [
        SoundStyle::Acid,
        SoundStyle::Jazz,
        SoundStyle::Electronic,
        SoundStyle::Piano,
        SoundStyle::Minimal,
        SoundStyle::Retro,
    ];

    /// Parse a style name; unknown names fall back to the default style.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "acid" => SoundStyle::Acid,
            "jazz" => SoundStyle::Jazz,
            "electronic" => SoundStyle::Electronic,
            "piano" => SoundStyle::Piano,
            "minimal" => SoundStyle::Minimal,
            "retro" => SoundStyle::Retro,
            _ => SoundStyle::default(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SoundStyle::Acid => "acid",
            SoundStyle::Jazz => "jazz",
            SoundStyle::Electronic => "electronic",
            SoundStyle::Piano => "piano",
            SoundStyle::Minimal => "minimal",
            SoundStyle::Retro => "retro",
        }
    }
}

impl From<String> for SoundStyle {
    fn from(name: String) -> Self {
        SoundStyle::from_name(&name)
    }
}

/// Live engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineSettings {
    /// Master volume, 0–100.
    pub master_volume: f64,
    /// Base pitch for token transfers (Hz); also sets the sequencer tempo.
    pub transaction_pitch: f64,
    /// Block bass frequency (Hz).
    pub block_bass: f64,
    /// Reverb send, 0–1. The dry path gets the complement.
    pub reverb_amount: f64,
    /// Shared filter cutoff (Hz).
    pub filter_cutoff: f64,
    /// Shared filter resonance (Q).
    pub filter_resonance: f64,
    /// Delay time (s).
    pub delay_time: f64,
    /// Delay feedback, 0–1.
    pub delay_feedback: f64,
    pub sound_style: SoundStyle,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            master_volume: 50.0,
            transaction_pitch: 440.0,
            block_bass: 80.0,
            reverb_amount: 0.3,
            filter_cutoff: 2000.0,
            filter_resonance: 10.0,
            delay_time: 0.375,
            delay_feedback: 0.5,
            sound_style: SoundStyle::default(),
        }
    }
}

impl EngineSettings {
    /// Merge a partial update, clamping every field into its safe range.
    pub fn apply(&mut self, patch: &SettingsPatch) {
        if let Some(v) = patch.master_volume {
            self.master_volume = finite_or(v, self.master_volume).clamp(0.0, 100.0);
        }
        if let Some(v) = patch.transaction_pitch {
            self.transaction_pitch = finite_or(v, self.transaction_pitch).clamp(20.0, 20_000.0);
        }
        if let Some(v) = patch.block_bass {
            self.block_bass = finite_or(v, self.block_bass).clamp(20.0, 1000.0);
        }
        if let Some(v) = patch.reverb_amount {
            self.reverb_amount = finite_or(v, self.reverb_amount).clamp(0.0, 1.0);
        }
        if let Some(v) = patch.filter_cutoff {
            self.filter_cutoff = finite_or(v, self.filter_cutoff).clamp(20.0, 20_000.0);
        }
        if let Some(v) = patch.filter_resonance {
            self.filter_resonance = finite_or(v, self.filter_resonance).clamp(0.0001, 30.0);
        }
        if let Some(v) = patch.delay_time {
            self.delay_time = finite_or(v, self.delay_time).clamp(0.0, 2.0);
        }
        if let Some(v) = patch.delay_feedback {
            self.delay_feedback = finite_or(v, self.delay_feedback).clamp(0.0, 0.95);
        }
        if let Some(style) = patch.sound_style {
            self.sound_style = style;
        }
    }

    /// Master gain as a linear factor.
    pub fn master_gain(&self) -> f64 {
        self.master_volume / 100.0
    }

    /// Sequencer tempo derived from the transaction pitch.
    pub fn tempo_bpm(&self) -> f64 {
        (100.0 + (self.transaction_pitch / 1000.0) * 60.0).clamp(100.0, 160.0)
    }
}

fn finite_or(v: f64, fallback: f64) -> f64 {
    if v.is_finite() { v } else { fallback }
}

/// A partial settings update. Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub master_volume: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_pitch: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_bass: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reverb_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_cutoff: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_resonance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay_feedback: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound_style: Option<SoundStyle>,
}

impl SettingsPatch {
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn is_empty(&self) -> bool {
        *self == SettingsPatch::default()
    }
}

/// What to do when a trigger arrives while the voice registry is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoicePolicy {
    /// Evict the voice that started first.
    #[default]
    DropOldest,
    /// Reject the incoming trigger.
    DropNew,
}

/// Tuning constants for the transaction mapping formulas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingTuning {
    pub volume_floor: f64,
    pub volume_slope: f64,
    pub volume_pre_cap: f64,
    pub high_value_boost: f64,
    /// Effective ceiling is `min(volume_ceiling, HARD_VOLUME_CEILING)`.
    pub volume_ceiling: f64,
    pub duration_floor: f64,
    pub duration_slope: f64,
    pub duration_cap: f64,
    pub high_value_stretch: f64,
}

impl Default for MappingTuning {
    fn default() -> Self {
        Self {
            volume_floor: 0.02,
            volume_slope: 0.06,
            volume_pre_cap: 0.12,
            high_value_boost: 1.1,
            volume_ceiling: HARD_VOLUME_CEILING,
            duration_floor: 0.4,
            duration_slope: 0.4,
            duration_cap: 3.0,
            high_value_stretch: 1.2,
        }
    }
}

impl MappingTuning {
    pub fn ceiling(&self) -> f64 {
        if self.volume_ceiling.is_finite() {
            self.volume_ceiling.clamp(0.0, HARD_VOLUME_CEILING)
        } else {
            HARD_VOLUME_CEILING
        }
    }
}

/// Construction-time engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub sample_rate: f64,
    /// Upper bound on simultaneously sounding voices.
    pub max_voices: usize,
    pub voice_policy: VoicePolicy,
    /// Seed for noise buffers, the reverb impulse, and ambient jitter.
    pub seed: u64,
    /// Transactions sampled from each block by [`crate::pacing`].
    pub max_transactions_per_block: usize,
    /// Seconds of audio-clock time a block's transactions are spread over.
    pub block_time: f64,
    pub tuning: MappingTuning,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100.0,
            max_voices: 96,
            voice_policy: VoicePolicy::default(),
            seed: 0x5eed_cafe,
            max_transactions_per_block: 10,
            block_time: 12.0,
            tuning: MappingTuning::default(),
        }
    }
}

impl EngineConfig {
    pub fn with_sample_rate(sample_rate: f64) -> Self {
        Self {
            sample_rate,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_page_controls() {
        let s = EngineSettings::default();
        assert_eq!(s.master_volume, 50.0);
        assert_eq!(s.sound_style, SoundStyle::Minimal);
        assert!((s.master_gain() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn patch_merges_only_present_keys() {
        let mut s = EngineSettings::default();
        let patch = SettingsPatch::from_json(r#"{"masterVolume": 80, "soundStyle": "jazz"}"#).unwrap();
        s.apply(&patch);
        assert_eq!(s.master_volume, 80.0);
        assert_eq!(s.sound_style, SoundStyle::Jazz);
        assert_eq!(s.filter_cutoff, 2000.0, "untouched keys keep their value");
    }

    #[test]
    fn patch_values_are_clamped() {
        let mut s = EngineSettings::default();
        s.apply(&SettingsPatch {
            master_volume: Some(250.0),
            reverb_amount: Some(-1.0),
            delay_feedback: Some(1.5),
            delay_time: Some(f64::NAN),
            ..Default::default()
        });
        assert_eq!(s.master_volume, 100.0);
        assert_eq!(s.reverb_amount, 0.0);
        assert_eq!(s.delay_feedback, 0.95);
        assert_eq!(s.delay_time, 0.375, "NaN keeps the previous value");
    }

    #[test]
    fn unknown_style_falls_back_to_default() {
        let patch = SettingsPatch::from_json(r#"{"soundStyle": "polka"}"#).unwrap();
        assert_eq!(patch.sound_style, Some(SoundStyle::Minimal));
        assert_eq!(SoundStyle::from_name(" Retro "), SoundStyle::Retro);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let patch = SettingsPatch::from_json(r#"{"visualIntensity": 3}"#).unwrap();
        assert!(patch.is_empty());
    }

    #[test]
    fn tempo_follows_transaction_pitch() {
        let mut s = EngineSettings::default();
        assert!((s.tempo_bpm() - 126.4).abs() < 1e-9);
        s.transaction_pitch = 5000.0;
        assert_eq!(s.tempo_bpm(), 160.0);
        s.transaction_pitch = 20.0;
        assert!((s.tempo_bpm() - 101.2).abs() < 1e-9);
    }

    #[test]
    fn tuning_cannot_raise_hard_ceiling() {
        let tuning = MappingTuning {
            volume_ceiling: 0.5,
            ..Default::default()
        };
        assert_eq!(tuning.ceiling(), HARD_VOLUME_CEILING);
        let quieter = MappingTuning {
            volume_ceiling: 0.05,
            ..Default::default()
        };
        assert_eq!(quieter.ceiling(), 0.05);
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let cfg: EngineConfig = serde_json::from_str(r#"{"sample_rate": 48000, "voice_policy": "drop_new"}"#).unwrap();
        assert_eq!(cfg.sample_rate, 48_000.0);
        assert_eq!(cfg.voice_policy, VoicePolicy::DropNew);
        assert_eq!(cfg.max_transactions_per_block, 10);
    }
}
