//! Voice: one ephemeral synthesized sound and the registry that owns it.
//!
//! A [`Voice`] is a small subgraph: one or more [`Layer`]s (source, filters,
//! shaper, compressor, gain envelope) summed into an optional shared filter,
//! output envelope and chorus, then panned into one of the signal graph's
//! [`Bus`]es. Every layer carries an explicit start and stop time on the
//! audio clock; the [`VoiceRegistry`] drops voices once their stop time has
//! passed.

use std::sync::Arc;

use log::debug;

use crate::error::EngineError;
use crate::settings::VoicePolicy;

use super::automation::Automation;
use super::chorus::{Chorus, ChorusMode};
use super::compressor::Compressor;
use super::filter::{BiquadFilter, FilterType};
use super::mixer::pan_gains;
use super::oscillator::{Oscillator, Waveform};
use super::shaper::WaveShaper;

/// Attachment points on the signal graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bus {
    /// The shared "psychedelic" lowpass ahead of the compressor.
    Filter,
    /// The feedback delay input.
    Delay,
    /// The convolution reverb input.
    Reverb,
    /// Straight into master gain, bypassing effects.
    Master,
}

impl Bus {
    pub const ALL: [Bus; 4] = [Bus::Filter, Bus::Delay, Bus::Reverb, Bus::Master];

    fn index(self) -> usize {
        match self {
            Bus::Filter => 0,
            Bus::Delay => 1,
            Bus::Reverb => 2,
            Bus::Master => 3,
        }
    }
}

/// A frequency modulator added to a carrier's frequency in Hz.
#[derive(Debug, Clone)]
pub struct Modulator {
    osc: Oscillator,
    frequency: Automation,
    depth: Automation,
}

/// What a layer plays.
#[derive(Debug, Clone)]
pub enum Source {
    Oscillator {
        osc: Oscillator,
        frequency: Automation,
        modulator: Option<Modulator>,
    },
    /// `carrier * (1 + modulator)`: a gain node whose gain is driven by
    /// the second oscillator.
    RingMod {
        carrier: Oscillator,
        carrier_frequency: Automation,
        modulator: Oscillator,
        modulator_frequency: Automation,
    },
    /// A one-shot buffer, fired once per trigger time.
    Noise {
        buffer: Arc<Vec<f32>>,
        triggers: Vec<f64>,
        sample_rate: f64,
    },
}

impl Source {
    fn next_sample(&mut self, time: f64) -> f64 {
        match self {
            Source::Oscillator {
                osc,
                frequency,
                modulator,
            } => {
                let mut hz = frequency.value_at(time);
                if let Some(m) = modulator {
                    hz += m.osc.next_sample(m.frequency.value_at(time)) * m.depth.value_at(time);
                }
                osc.next_sample(hz)
            }
            Source::RingMod {
                carrier,
                carrier_frequency,
                modulator,
                modulator_frequency,
            } => {
                let c = carrier.next_sample(carrier_frequency.value_at(time));
                let m = modulator.next_sample(modulator_frequency.value_at(time));
                c * (1.0 + m)
            }
            Source::Noise {
                buffer,
                triggers,
                sample_rate,
            } => triggers
                .iter()
                .filter_map(|&at| {
                    let offset = ((time - at) * *sample_rate).round();
                    if offset < 0.0 {
                        return None;
                    }
                    buffer.get(offset as usize).map(|&s| s as f64)
                })
                .sum(),
        }
    }

    /// Time the source runs dry on its own (noise buffers), if ever.
    fn natural_end(&self) -> Option<f64> {
        match self {
            Source::Noise {
                buffer,
                triggers,
                sample_rate,
            } => triggers
                .iter()
                .map(|&at| at + buffer.len() as f64 / sample_rate)
                .reduce(f64::max),
            _ => None,
        }
    }

    fn node_count(&self) -> usize {
        match self {
            Source::Oscillator { modulator, .. } => 1 + modulator.as_ref().map_or(0, |_| 2),
            Source::RingMod { .. } => 3,
            Source::Noise { triggers, .. } => triggers.len().max(1),
        }
    }
}

/// A low-frequency oscillator added to a filter's cutoff.
#[derive(Debug, Clone)]
struct Lfo {
    osc: Oscillator,
    frequency: f64,
    depth: f64,
}

/// A biquad whose cutoff follows an automation timeline.
#[derive(Debug, Clone)]
pub struct FilterStage {
    filter: BiquadFilter,
    frequency: Automation,
    q: f64,
    lfo: Option<Lfo>,
}

impl FilterStage {
    pub fn new(filter_type: FilterType, sample_rate: f64, frequency: Automation, q: f64) -> Self {
        let initial = frequency.value_at(0.0);
        FilterStage {
            filter: BiquadFilter::with_params(filter_type, sample_rate, initial, q),
            frequency,
            q,
            lfo: None,
        }
    }

    /// A filter at a fixed cutoff.
    pub fn fixed(filter_type: FilterType, sample_rate: f64, frequency: f64, q: f64) -> Self {
        Self::new(filter_type, sample_rate, Automation::new(frequency), q)
    }

    /// Sweep the cutoff with a sine LFO of `depth` Hz.
    pub fn with_lfo(mut self, sample_rate: f64, frequency: f64, depth: f64) -> Self {
        self.lfo = Some(Lfo {
            osc: Oscillator::new(Waveform::Sine, sample_rate),
            frequency,
            depth,
        });
        self
    }

    #[inline]
    fn process(&mut self, time: f64, input: f64) -> f64 {
        let mut cutoff = self.frequency.value_at(time);
        if let Some(lfo) = &mut self.lfo {
            cutoff += lfo.osc.next_sample(lfo.frequency) * lfo.depth;
        }
        self.filter.set_params(cutoff, self.q);
        self.filter.process(input)
    }

    fn node_count(&self) -> usize {
        1 + self.lfo.as_ref().map_or(0, |_| 2)
    }
}

/// One source and its private processing chain.
#[derive(Debug, Clone)]
pub struct Layer {
    pub source: Source,
    pub filters: Vec<FilterStage>,
    pub shaper: Option<WaveShaper>,
    pub compressor: Option<Compressor>,
    pub gain: Automation,
    /// A second gain stage, used for hard gates.
    pub gate: Option<Automation>,
    pub start: f64,
    pub stop: f64,
}

impl Layer {
    fn from_source(source: Source, start: f64, stop: f64) -> Self {
        Layer {
            source,
            filters: Vec::new(),
            shaper: None,
            compressor: None,
            gain: Automation::new(1.0),
            gate: None,
            start,
            stop,
        }
    }

    /// A plain oscillator sounding from `start` to `stop`.
    pub fn oscillator(
        waveform: Waveform,
        sample_rate: f64,
        frequency: Automation,
        start: f64,
        stop: f64,
    ) -> Self {
        Self::from_source(
            Source::Oscillator {
                osc: Oscillator::new(waveform, sample_rate),
                frequency,
                modulator: None,
            },
            start,
            stop,
        )
    }

    /// Add a sine frequency modulator (FM) to an oscillator layer.
    pub fn with_modulator(mut self, sample_rate: f64, frequency: Automation, depth: Automation) -> Self {
        if let Source::Oscillator { modulator, .. } = &mut self.source {
            *modulator = Some(Modulator {
                osc: Oscillator::new(Waveform::Sine, sample_rate),
                frequency,
                depth,
            });
        }
        self
    }

    /// Two sine oscillators, the second modulating the first's amplitude.
    pub fn ring_mod(
        sample_rate: f64,
        carrier_frequency: Automation,
        modulator_frequency: Automation,
        start: f64,
        stop: f64,
    ) -> Self {
        Self::from_source(
            Source::RingMod {
                carrier: Oscillator::new(Waveform::Sine, sample_rate),
                carrier_frequency,
                modulator: Oscillator::new(Waveform::Sine, sample_rate),
                modulator_frequency,
            },
            start,
            stop,
        )
    }

    /// A noise buffer fired at each of `triggers`; the layer stops when the
    /// last firing has played out.
    pub fn noise(buffer: Arc<Vec<f32>>, triggers: Vec<f64>, sample_rate: f64) -> Self {
        let start = triggers.iter().copied().reduce(f64::min).unwrap_or(0.0);
        let source = Source::Noise {
            buffer,
            triggers,
            sample_rate,
        };
        let stop = source.natural_end().unwrap_or(start);
        Self::from_source(source, start, stop)
    }

    pub fn with_filter(mut self, stage: FilterStage) -> Self {
        self.filters.push(stage);
        self
    }

    pub fn with_shaper(mut self, shaper: WaveShaper) -> Self {
        self.shaper = Some(shaper);
        self
    }

    pub fn with_compressor(mut self, compressor: Compressor) -> Self {
        self.compressor = Some(compressor);
        self
    }

    pub fn with_gain(mut self, gain: Automation) -> Self {
        self.gain = gain;
        self
    }

    pub fn with_gate(mut self, gate: Automation) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Stop no earlier than `time`.
    pub fn until(mut self, time: f64) -> Self {
        self.stop = self.stop.max(time);
        self
    }

    #[inline]
    fn process(&mut self, time: f64) -> f64 {
        if time < self.start || time >= self.stop {
            return 0.0;
        }
        let mut x = self.source.next_sample(time);
        for stage in &mut self.filters {
            x = stage.process(time, x);
        }
        if let Some(shaper) = &self.shaper {
            x = shaper.process(x);
        }
        if let Some(compressor) = &mut self.compressor {
            x = compressor.process_mono(x);
        }
        x *= self.gain.value_at(time);
        if let Some(gate) = &self.gate {
            x *= gate.value_at(time);
        }
        x
    }

    /// Gain this layer settles on after its envelope ends.
    pub fn final_gain(&self) -> f64 {
        let gate = self.gate.as_ref().map_or(1.0, Automation::final_value);
        self.gain.final_value().abs() * gate.abs()
    }

    fn envelope_end(&self) -> f64 {
        let gate = self.gate.as_ref().map_or(self.start, Automation::end_time);
        self.gain.end_time().max(gate)
    }

    fn node_count(&self) -> usize {
        self.source.node_count()
            + self.filters.iter().map(FilterStage::node_count).sum::<usize>()
            + usize::from(self.shaper.is_some())
            + usize::from(self.compressor.is_some())
            + 1
            + usize::from(self.gate.is_some())
    }
}

/// A complete transient sound.
#[derive(Debug, Clone)]
pub struct Voice {
    /// Short recipe name for logs, e.g. `"acid transaction"`.
    pub label: &'static str,
    pub bus: Bus,
    pub layers: Vec<Layer>,
    pub voice_filter: Option<FilterStage>,
    pub output_gain: Option<Automation>,
    pub chorus: Option<Chorus>,
    /// `None` leaves a mono voice centred at full level on both sides.
    pub pan: Option<f64>,
}

impl Voice {
    pub fn new(label: &'static str, bus: Bus) -> Self {
        Voice {
            label,
            bus,
            layers: Vec::new(),
            voice_filter: None,
            output_gain: None,
            chorus: None,
            pan: None,
        }
    }

    pub fn layer(mut self, layer: Layer) -> Self {
        self.layers.push(layer);
        self
    }

    pub fn voice_filter(mut self, stage: FilterStage) -> Self {
        self.voice_filter = Some(stage);
        self
    }

    pub fn output_gain(mut self, gain: Automation) -> Self {
        self.output_gain = Some(gain);
        self
    }

    pub fn chorus(mut self, chorus: Chorus) -> Self {
        self.chorus = Some(chorus);
        self
    }

    pub fn pan(mut self, pan: f64) -> Self {
        self.pan = Some(pan.clamp(-1.0, 1.0));
        self
    }

    /// Earliest layer start.
    pub fn start(&self) -> f64 {
        self.layers
            .iter()
            .map(|l| l.start)
            .reduce(f64::min)
            .unwrap_or(0.0)
    }

    /// Latest layer stop; the voice is silent and reclaimable after this.
    pub fn stop(&self) -> f64 {
        self.layers
            .iter()
            .map(|l| l.stop)
            .reduce(f64::max)
            .unwrap_or(0.0)
    }

    /// Time of the last scheduled envelope point.
    pub fn envelope_end(&self) -> f64 {
        let layers = self
            .layers
            .iter()
            .map(Layer::envelope_end)
            .reduce(f64::max)
            .unwrap_or(0.0);
        let output = self.output_gain.as_ref().map_or(0.0, Automation::end_time);
        layers.max(output)
    }

    /// Loudest gain any layer is left at once every envelope has finished.
    pub fn final_gain(&self) -> f64 {
        let output = self
            .output_gain
            .as_ref()
            .map_or(1.0, |g| g.final_value().abs());
        self.layers
            .iter()
            .map(Layer::final_gain)
            .reduce(f64::max)
            .unwrap_or(0.0)
            * output
    }

    /// WebAudio-equivalent node count.
    pub fn node_count(&self) -> usize {
        let chorus = match self.chorus.as_ref().map(|c| c.mode) {
            Some(ChorusMode::Tap { .. }) | Some(ChorusMode::Series) => 2,
            None => 0,
        };
        self.layers.iter().map(Layer::node_count).sum::<usize>()
            + self.voice_filter.as_ref().map_or(0, FilterStage::node_count)
            + usize::from(self.output_gain.is_some())
            + chorus
            + usize::from(self.pan.is_some())
    }

    /// Render one stereo frame at `time`.
    #[inline]
    pub fn process(&mut self, time: f64) -> (f64, f64) {
        let mut x: f64 = self.layers.iter_mut().map(|l| l.process(time)).sum();
        if let Some(stage) = &mut self.voice_filter {
            x = stage.process(time, x);
        }
        if let Some(gain) = &self.output_gain {
            x *= gain.value_at(time);
        }
        if let Some(chorus) = &mut self.chorus {
            x = chorus.process(x);
        }
        match self.pan {
            Some(pan) => {
                let (l, r) = pan_gains(pan);
                (x * l, x * r)
            }
            None => (x, x),
        }
    }
}

/// Handle to a voice in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VoiceId(pub u64);

/// Per-bus stereo sums for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BusFrame {
    frames: [(f64, f64); 4],
}

impl BusFrame {
    pub fn get(&self, bus: Bus) -> (f64, f64) {
        self.frames[bus.index()]
    }

    pub fn add(&mut self, bus: Bus, (l, r): (f64, f64)) {
        let slot = &mut self.frames[bus.index()];
        slot.0 += l;
        slot.1 += r;
    }
}

/// Owns every in-flight voice, keyed by a monotonically increasing id.
#[derive(Debug, Clone)]
pub struct VoiceRegistry {
    voices: Vec<(VoiceId, Voice)>,
    next_id: u64,
    max_voices: usize,
    policy: VoicePolicy,
}

impl VoiceRegistry {
    pub fn new(max_voices: usize, policy: VoicePolicy) -> Self {
        VoiceRegistry {
            voices: Vec::new(),
            next_id: 0,
            max_voices: max_voices.max(1),
            policy,
        }
    }

    /// Take ownership of a voice, applying the in-flight cap.
    pub fn insert(&mut self, voice: Voice) -> Result<VoiceId, EngineError> {
        if self.voices.len() >= self.max_voices {
            match self.policy {
                VoicePolicy::DropNew => {
                    return Err(EngineError::VoiceLimit {
                        limit: self.max_voices,
                    });
                }
                VoicePolicy::DropOldest => {
                    let oldest = self
                        .voices
                        .iter()
                        .enumerate()
                        .min_by(|a, b| a.1.1.start().total_cmp(&b.1.1.start()).then(a.1.0.cmp(&b.1.0)))
                        .map(|(i, _)| i);
                    if let Some(index) = oldest {
                        let (id, evicted) = self.voices.remove(index);
                        debug!("voice limit {} reached, evicting {:?} ({})", self.max_voices, id, evicted.label);
                    }
                }
            }
        }
        let id = VoiceId(self.next_id);
        self.next_id += 1;
        self.voices.push((id, voice));
        Ok(id)
    }

    /// Drop every voice whose stop time has passed. Returns how many went.
    pub fn sweep(&mut self, now: f64) -> usize {
        let before = self.voices.len();
        self.voices.retain(|(_, v)| v.stop() > now);
        before - self.voices.len()
    }

    /// Render one frame of every voice, grouped by bus.
    #[inline]
    pub fn process(&mut self, time: f64) -> BusFrame {
        let mut frame = BusFrame::default();
        for (_, voice) in &mut self.voices {
            let bus = voice.bus;
            frame.add(bus, voice.process(time));
        }
        frame
    }

    pub fn get(&self, id: VoiceId) -> Option<&Voice> {
        self.voices.iter().find(|(vid, _)| *vid == id).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (VoiceId, &Voice)> {
        self.voices.iter().map(|(id, v)| (*id, v))
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.voices.iter().map(|(_, v)| v.node_count()).sum()
    }
}
