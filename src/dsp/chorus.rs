//! Chorus: a short fixed delay used to thicken a single voice.
//!
//! Two wirings exist. Electronic voices tap the filtered signal through a
//! 20 ms line into a low-level side chain ([`ChorusMode::Tap`]); retro voices
//! pass their output through a 25 ms line with 0.3 feedback
//! ([`ChorusMode::Series`]).

use super::delay::DelayLine;

/// How the chorus line sits in a voice's chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChorusMode {
    /// Output is dry + `gain` x delayed.
    Tap { gain: f64 },
    /// Output is only the delayed (and recirculated) signal.
    Series,
}

/// A mono chorus delay with optional feedback.
#[derive(Debug, Clone)]
pub struct Chorus {
    line: DelayLine,
    delay_samples: f64,
    feedback: f32,
    pub mode: ChorusMode,
}

impl Chorus {
    pub fn new(sample_rate: f64, delay_seconds: f64, feedback: f64, mode: ChorusMode) -> Self {
        let delay_samples = (delay_seconds * sample_rate).max(1.0);
        Self {
            line: DelayLine::new(delay_samples.ceil() as usize + 1),
            delay_samples,
            feedback: feedback.clamp(0.0, 0.95) as f32,
            mode,
        }
    }

    /// Electronic side chain: 20 ms at `0.15 * effects` gain.
    pub fn tap(sample_rate: f64, effects_intensity: f64) -> Self {
        Self::new(
            sample_rate,
            0.02,
            0.0,
            ChorusMode::Tap {
                gain: 0.15 * effects_intensity,
            },
        )
    }

    /// Retro series chorus: 25 ms, 0.3 feedback.
    pub fn retro(sample_rate: f64) -> Self {
        Self::new(sample_rate, 0.025, 0.3, ChorusMode::Series)
    }

    /// Process one sample.
    #[inline]
    pub fn process(&mut self, input: f64) -> f64 {
        let delayed = self.line.read(self.delay_samples);
        self.line.write(input as f32 + delayed * self.feedback);
        match self.mode {
            ChorusMode::Tap { gain } => input + delayed as f64 * gain,
            ChorusMode::Series => delayed as f64,
        }
    }
}
