//! Offline renderer: plays a timed list of chain events through a fresh
//! engine and encodes the result as WAV bytes.

use crate::chain::ChainEvent;
use crate::engine::SonificationEngine;
use crate::error::EngineError;
use crate::settings::{EngineConfig, SettingsPatch};

/// Frames rendered between sequencer polls, matching one audio-worklet
/// quantum.
pub const RENDER_QUANTUM: usize = 128;

/// Render `seconds` of interleaved stereo. Each event fires at the first
/// quantum boundary at or after its time.
pub fn render_session(
    config: &EngineConfig,
    settings: &SettingsPatch,
    events: &[(f64, ChainEvent)],
    seconds: f64,
) -> Result<Vec<f32>, EngineError> {
    let mut engine = SonificationEngine::new(config.clone());
    engine.update_settings(settings);
    engine.init()?;

    let mut pending: Vec<&(f64, ChainEvent)> = events.iter().collect();
    pending.sort_by(|a, b| a.0.total_cmp(&b.0));
    let mut pending = pending.into_iter().peekable();

    let total_frames = (seconds.max(0.0) * config.sample_rate) as usize;
    let mut out = vec![0.0_f32; total_frames * 2];
    for block in out.chunks_mut(RENDER_QUANTUM * 2) {
        let now = engine.current_time();
        while let Some((_, event)) = pending.next_if(|(at, _)| *at <= now) {
            engine.play_event(event);
        }
        engine.tick();
        engine.render(block);
    }
    Ok(out)
}

/// Render a session straight to 16-bit stereo WAV bytes.
pub fn render_session_wav(
    config: &EngineConfig,
    settings: &SettingsPatch,
    events: &[(f64, ChainEvent)],
    seconds: f64,
) -> Result<Vec<u8>, EngineError> {
    let samples = render_session(config, settings, events, seconds)?;
    Ok(encode_wav(&samples, config.sample_rate as u32, 2))
}

/// Encode interleaved f32 samples as 16-bit PCM WAV bytes.
pub fn encode_wav(samples: &[f32], sample_rate: u32, channels: u16) -> Vec<u8> {
    let bits_per_sample: u16 = 16;
    let byte_rate = sample_rate * channels as u32 * (bits_per_sample as u32 / 8);
    let block_align = channels * (bits_per_sample / 8);
    let data_size = (samples.len() * 2) as u32;

    let mut buf = Vec::with_capacity(44 + data_size as usize);

    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&(36 + data_size).to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes());
    buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
    buf.extend_from_slice(&channels.to_le_bytes());
    buf.extend_from_slice(&sample_rate.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&block_align.to_le_bytes());
    buf.extend_from_slice(&bits_per_sample.to_le_bytes());

    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_size.to_le_bytes());
    for &sample in samples {
        let pcm = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        buf.extend_from_slice(&pcm.to_le_bytes());
    }

    buf
}
