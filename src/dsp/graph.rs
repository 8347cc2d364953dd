//! Signal graph: the persistent effect chain every voice feeds.
//!
//! ```text
//! Bus::Filter -> lowpass (cutoff + 800 Hz LFO) -> compressor --+--> dry gain ------+
//!                                                               +--> delay (+fb) x0.4+--> master gain -> soft clip
//!                                    Bus::Delay ----------------^                   |
//!                                                               +--> reverb x amount+
//!                                    Bus::Reverb ---------------^                   |
//!                                    Bus::Master -------------------------------------^
//! ```
//!
//! Built once per audio context; afterwards only the live parameters move.

use fastrand::Rng;

use crate::settings::EngineSettings;

use super::automation::Automation;
use super::compressor::Compressor;
use super::delay::FeedbackDelay;
use super::filter::{BiquadFilter, FilterType};
use super::mixer::soft_clip;
use super::noise;
use super::oscillator::{Oscillator, Waveform};
use super::reverb::{ConvolutionReverb, DEFAULT_BLOCK_SIZE};
use super::voice::{Bus, BusFrame};

/// Seconds every live parameter change glides over.
pub const RAMP_SECONDS: f64 = 0.1;
/// Rate of the shared filter's cutoff LFO (Hz).
pub const LFO_RATE: f64 = 0.2;
/// Depth of the shared filter's cutoff LFO (Hz).
pub const LFO_DEPTH: f64 = 800.0;
/// Fixed level of the delay return.
pub const DELAY_RETURN: f64 = 0.4;
/// Longest delay the line can hold (s).
pub const MAX_DELAY: f64 = 2.0;
/// Length of the synthesized reverb impulse (s).
pub const IMPULSE_SECONDS: f64 = 2.0;

/// Parameters that can be ramped while running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphParam {
    MasterGain,
    DryGain,
    ReverbGain,
    FilterCutoff,
    FilterResonance,
    DelayTime,
    DelayFeedback,
}

/// The fixed effect topology.
#[derive(Debug, Clone)]
pub struct SignalGraph {
    sample_rate: f64,
    filter: [BiquadFilter; 2],
    lfo: Oscillator,
    compressor: Compressor,
    delay: FeedbackDelay,
    reverb: ConvolutionReverb,

    master_gain: Automation,
    dry_gain: Automation,
    reverb_gain: Automation,
    cutoff: Automation,
    resonance: Automation,
    delay_time: Automation,
    delay_feedback: Automation,
}

impl SignalGraph {
    /// Wire the graph with `settings` as the initial parameter values.
    pub fn new(sample_rate: f64, settings: &EngineSettings, rng: &mut Rng) -> Self {
        let impulse = noise::impulse_response(rng, IMPULSE_SECONDS, sample_rate);
        let lowpass = || {
            BiquadFilter::with_params(
                FilterType::Lowpass,
                sample_rate,
                settings.filter_cutoff,
                settings.filter_resonance,
            )
        };
        SignalGraph {
            sample_rate,
            filter: [lowpass(), lowpass()],
            lfo: Oscillator::new(Waveform::Sine, sample_rate),
            compressor: Compressor::master(sample_rate),
            delay: FeedbackDelay::new(sample_rate, MAX_DELAY),
            reverb: ConvolutionReverb::new(&impulse, DEFAULT_BLOCK_SIZE),
            master_gain: Automation::new(settings.master_gain()),
            dry_gain: Automation::new(1.0 - settings.reverb_amount),
            reverb_gain: Automation::new(settings.reverb_amount),
            cutoff: Automation::new(settings.filter_cutoff),
            resonance: Automation::new(settings.filter_resonance),
            delay_time: Automation::new(settings.delay_time),
            delay_feedback: Automation::new(settings.delay_feedback),
        }
    }

    fn param_mut(&mut self, param: GraphParam) -> &mut Automation {
        match param {
            GraphParam::MasterGain => &mut self.master_gain,
            GraphParam::DryGain => &mut self.dry_gain,
            GraphParam::ReverbGain => &mut self.reverb_gain,
            GraphParam::FilterCutoff => &mut self.cutoff,
            GraphParam::FilterResonance => &mut self.resonance,
            GraphParam::DelayTime => &mut self.delay_time,
            GraphParam::DelayFeedback => &mut self.delay_feedback,
        }
    }

    /// Glide `param` to `target` over [`RAMP_SECONDS`] starting at `now`.
    pub fn ramp(&mut self, param: GraphParam, target: f64, now: f64) {
        self.param_mut(param).ramp_to(target, now, RAMP_SECONDS);
    }

    /// Current value of a live parameter.
    pub fn value(&self, param: GraphParam, time: f64) -> f64 {
        match param {
            GraphParam::MasterGain => self.master_gain.value_at(time),
            GraphParam::DryGain => self.dry_gain.value_at(time),
            GraphParam::ReverbGain => self.reverb_gain.value_at(time),
            GraphParam::FilterCutoff => self.cutoff.value_at(time),
            GraphParam::FilterResonance => self.resonance.value_at(time),
            GraphParam::DelayTime => self.delay_time.value_at(time),
            GraphParam::DelayFeedback => self.delay_feedback.value_at(time),
        }
    }

    /// Mix one frame of voice output through the effect chain.
    #[inline]
    pub fn process(&mut self, time: f64, buses: &BusFrame) -> (f32, f32) {
        let nyquist = self.sample_rate * 0.5;
        let cutoff = (self.cutoff.value_at(time) + self.lfo.next_sample(LFO_RATE) * LFO_DEPTH)
            .clamp(10.0, nyquist);
        let q = self.resonance.value_at(time);

        let (fl, fr) = buses.get(Bus::Filter);
        let [left, right] = &mut self.filter;
        left.set_params(cutoff, q);
        right.set_params(cutoff, q);
        let (cl, cr) = self
            .compressor
            .process(left.process(fl) as f32, right.process(fr) as f32);

        let (dl, dr) = buses.get(Bus::Delay);
        let (el, er) = self.delay.process(
            cl + dl as f32,
            cr + dr as f32,
            self.delay_time.value_at(time),
            self.delay_feedback.value_at(time),
        );

        let (rl, rr) = buses.get(Bus::Reverb);
        let (wl, wr) = self.reverb.process(cl + rl as f32, cr + rr as f32);

        let dry = self.dry_gain.value_at(time);
        let wet = self.reverb_gain.value_at(time);
        let (ml, mr) = buses.get(Bus::Master);
        let master = self.master_gain.value_at(time);

        let mix = |c: f32, e: f32, w: f32, m: f64| {
            let sum = c as f64 * dry + e as f64 * DELAY_RETURN + w as f64 * wet + m;
            soft_clip(sum * master) as f32
        };
        (mix(cl, el, wl, ml), mix(cr, er, wr, mr))
    }

    /// Forget automation history that can no longer matter.
    pub fn prune(&mut self, now: f64) {
        for param in [
            GraphParam::MasterGain,
            GraphParam::DryGain,
            GraphParam::ReverbGain,
            GraphParam::FilterCutoff,
            GraphParam::FilterResonance,
            GraphParam::DelayTime,
            GraphParam::DelayFeedback,
        ] {
            self.param_mut(param).prune_before(now);
        }
    }
}
