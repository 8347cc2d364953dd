//! Percussion for the step sequencer. Each hit draws a fresh noise buffer.

use std::sync::Arc;

use fastrand::Rng;

use crate::dsp::automation::Automation;
use crate::dsp::filter::FilterType;
use crate::dsp::noise;
use crate::dsp::oscillator::Waveform;
use crate::dsp::voice::{Bus, FilterStage, Layer, Voice};
use crate::sequencer::Hit;

use super::strike;

/// Attack on every drum so no hit starts with a click.
const CLICK_GUARD: f64 = 0.001;

/// WebAudio's default biquad Q.
const DEFAULT_Q: f64 = 1.0;

pub fn kick(sample_rate: f64, now: f64) -> Voice {
    let end = now + 0.5;
    let mut pitch = Automation::new(60.0);
    pitch.set_value_at(60.0, now).exponential_ramp_to(30.0, now + 0.1);
    Voice::new("kick", Bus::Master).layer(
        Layer::oscillator(Waveform::Sine, sample_rate, pitch, now, end)
            .with_gain(strike(now, CLICK_GUARD, 0.5, end)),
    )
}

pub fn snare(sample_rate: f64, rng: &mut Rng, now: f64) -> Voice {
    let burst = Arc::new(noise::white(rng, 0.1, sample_rate));
    Voice::new("snare", Bus::Master).layer(
        Layer::noise(burst, vec![now], sample_rate)
            .with_filter(FilterStage::fixed(FilterType::Highpass, sample_rate, 1000.0, DEFAULT_Q))
            .with_gain(strike(now, CLICK_GUARD, 0.2, now + 0.1))
            .until(now + 0.1),
    )
}

pub fn hi_hat(sample_rate: f64, rng: &mut Rng, now: f64, open: bool) -> Voice {
    let end = now + if open { 0.3 } else { 0.05 };
    let burst = Arc::new(noise::white(rng, 0.05, sample_rate));
    Voice::new(if open { "open hat" } else { "closed hat" }, Bus::Master).layer(
        Layer::noise(burst, vec![now], sample_rate)
            .with_filter(FilterStage::fixed(FilterType::Highpass, sample_rate, 7000.0, DEFAULT_Q))
            .with_gain(strike(now, CLICK_GUARD, 0.05, end))
            .until(end),
    )
}

/// An 80s gated snare: a band-passed thump cut dead after 50 ms.
pub fn gated_snare(sample_rate: f64, rng: &mut Rng, now: f64) -> Voice {
    let burst = Arc::new(noise::white(rng, 0.1, sample_rate));
    let mut gate = Automation::new(1.0);
    gate.set_value_at(1.0, now)
        .set_value_at(1.0, now + 0.05)
        .linear_ramp_to(0.0, now + 0.051);
    Voice::new("gated snare", Bus::Reverb).layer(
        Layer::noise(burst, vec![now], sample_rate)
            .with_filter(FilterStage::fixed(FilterType::Bandpass, sample_rate, 200.0, 0.5))
            .with_gain(strike(now, CLICK_GUARD, 0.4, now + 0.1))
            .with_gate(gate)
            .until(now + 0.1),
    )
}

/// The voice for one pattern hit.
pub fn hit(sample_rate: f64, rng: &mut Rng, hit: Hit, now: f64) -> Voice {
    match hit {
        Hit::Kick => kick(sample_rate, now),
        Hit::Snare => snare(sample_rate, rng, now),
        Hit::OpenHat => hi_hat(sample_rate, rng, now, true),
        Hit::ClosedHat => hi_hat(sample_rate, rng, now, false),
        Hit::GatedSnare => gated_snare(sample_rate, rng, now),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voices::assert_well_formed;

    const SR: f64 = 22_050.0;

    #[test]
    fn every_hit_is_well_formed() {
        let mut rng = Rng::with_seed(7);
        let lengths = [
            (Hit::Kick, 0.5),
            (Hit::Snare, 0.1),
            (Hit::OpenHat, 0.3),
            (Hit::ClosedHat, 0.05),
            (Hit::GatedSnare, 0.1),
        ];
        for (h, length) in lengths {
            let voice = hit(SR, &mut rng, h, 3.0);
            assert_well_formed(&voice, 3.0, length);
        }
    }

    #[test]
    fn open_hat_outlasts_closed() {
        let mut rng = Rng::with_seed(7);
        let open = hi_hat(SR, &mut rng, 0.0, true);
        let closed = hi_hat(SR, &mut rng, 0.0, false);
        assert!(open.stop() > closed.stop());
        assert_eq!(open.label, "open hat");
    }

    #[test]
    fn gate_cuts_the_tail() {
        let mut rng = Rng::with_seed(7);
        let mut voice = gated_snare(SR, &mut rng, 0.0);
        assert_eq!(voice.bus, Bus::Reverb);
        let body: f64 = (0..1000).map(|i| voice.process(i as f64 / SR).0.abs()).sum();
        let tail: f64 = (1200..2200).map(|i| voice.process(i as f64 / SR).0.abs()).sum();
        assert!(body > 0.0);
        assert_eq!(tail, 0.0, "nothing passes the closed gate");
    }

    #[test]
    fn kick_pitch_drops() {
        let voice = kick(SR, 0.0);
        let crate::dsp::voice::Source::Oscillator { frequency, .. } = &voice.layers[0].source else {
            panic!("kick is an oscillator");
        };
        assert_eq!(frequency.value_at(0.0), 60.0);
        assert!((frequency.value_at(0.1) - 30.0).abs() < 1e-12);
    }
}
