//! Step Sequencer: a free-running 16-step percussion clock.
//!
//! The sequencer is polled from the host's frame loop. It never looks at
//! chain data: each time the audio clock passes the next deadline it fires
//! the current step and moves the deadline one sixteenth note forward.

use log::trace;

/// Steps in one bar.
pub const STEPS: usize = 16;
/// Tempo before any settings change.
pub const DEFAULT_BPM: f64 = 130.0;

/// A percussion sound the pattern table can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hit {
    Kick,
    Snare,
    OpenHat,
    ClosedHat,
    /// Retro gated snare.
    GatedSnare,
}

/// A percussion pattern: which hits fire on a step.
pub type Pattern = fn(usize) -> Vec<Hit>;

fn hat(open: bool) -> Hit {
    if open { Hit::OpenHat } else { Hit::ClosedHat }
}

fn collect(hits: &[(bool, Hit)]) -> Vec<Hit> {
    hits.iter().filter(|(on, _)| *on).map(|&(_, hit)| hit).collect()
}

pub fn acid_pattern(step: usize) -> Vec<Hit> {
    collect(&[
        (step % 4 == 0, Hit::Kick),
        (step == 6 || step == 14, Hit::Snare),
        (step % 2 == 0, hat(step % 8 == 0)),
    ])
}

pub fn jazz_pattern(step: usize) -> Vec<Hit> {
    collect(&[
        (step == 0 || step == 12, Hit::Kick),
        (step == 4 || step == 12, Hit::Snare),
        (step % 3 == 0, Hit::ClosedHat),
    ])
}

pub fn electronic_pattern(step: usize) -> Vec<Hit> {
    collect(&[
        (step % 4 == 0, Hit::Kick),
        (step == 4 || step == 12, Hit::Snare),
        (true, hat(step % 4 == 2)),
    ])
}

pub fn piano_pattern(step: usize) -> Vec<Hit> {
    collect(&[
        (step == 0 || step == 8, Hit::Kick),
        (step == 6, Hit::Snare),
        (step % 4 == 2, Hit::ClosedHat),
    ])
}

pub fn minimal_pattern(step: usize) -> Vec<Hit> {
    collect(&[
        (step == 0, Hit::Kick),
        (step == 8, Hit::Snare),
        (step == 4 || step == 12, Hit::ClosedHat),
    ])
}

pub fn retro_pattern(step: usize) -> Vec<Hit> {
    collect(&[
        (step % 4 == 0, Hit::Kick),
        (step == 4 || step == 12, Hit::Snare),
        (step % 2 == 1, hat(step == 7 || step == 15)),
        (step == 6, Hit::GatedSnare),
    ])
}

/// A step that came due on a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FiredStep {
    /// Step index, 0..16.
    pub step: usize,
    /// The deadline the step was due at (audio-clock seconds).
    pub due: f64,
}

/// Counter + deadline. Starts unarmed; [`StepSequencer::start`] anchors it
/// to the audio clock once one exists.
#[derive(Debug, Clone)]
pub struct StepSequencer {
    step: usize,
    next_deadline: f64,
    bpm: f64,
    armed: bool,
}

impl Default for StepSequencer {
    fn default() -> Self {
        Self::new(DEFAULT_BPM)
    }
}

impl StepSequencer {
    pub fn new(bpm: f64) -> Self {
        StepSequencer {
            step: 0,
            next_deadline: 0.0,
            bpm: sanitize_bpm(bpm, DEFAULT_BPM),
            armed: false,
        }
    }

    /// Reset to step 0 with the first deadline at `now`.
    pub fn start(&mut self, now: f64) {
        self.step = 0;
        self.next_deadline = now;
        self.armed = true;
    }

    /// Forget the clock reference; ticks are skipped until the next start.
    pub fn stop(&mut self) {
        self.armed = false;
    }

    /// Seconds per step (a sixteenth note).
    pub fn step_length(&self) -> f64 {
        60.0 / self.bpm / 4.0
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    /// Change tempo; takes effect from the next deadline on.
    pub fn set_bpm(&mut self, bpm: f64) {
        self.bpm = sanitize_bpm(bpm, self.bpm);
    }

    /// The step that will fire next.
    pub fn step(&self) -> usize {
        self.step
    }

    pub fn next_deadline(&self) -> f64 {
        self.next_deadline
    }

    /// Poll at `now`. Fires at most one step. A clock that has fallen more
    /// than a step behind is re-anchored to `now` instead of replaying the
    /// backlog.
    pub fn tick(&mut self, now: f64) -> Option<FiredStep> {
        if !self.armed || now < self.next_deadline {
            return None;
        }
        let fired = FiredStep {
            step: self.step,
            due: self.next_deadline,
        };
        trace!("sequencer step {} due {:.3}s at {:.3}s", fired.step, fired.due, now);
        self.next_deadline += self.step_length();
        if self.next_deadline <= now {
            self.next_deadline = now + self.step_length();
        }
        self.step = (self.step + 1) % STEPS;
        Some(fired)
    }
}

fn sanitize_bpm(bpm: f64, fallback: f64) -> f64 {
    if bpm.is_finite() && bpm > 0.0 { bpm } else { fallback }
}
