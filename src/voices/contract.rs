//! Contract-call voice: drone, harmonic stack and data bursts under one
//! envelope. Shared by every style; the selector alone shapes it.

use std::sync::Arc;

use fastrand::Rng;

use crate::dsp::automation::Automation;
use crate::dsp::filter::FilterType;
use crate::dsp::noise;
use crate::dsp::oscillator::Waveform;
use crate::dsp::voice::{Bus, FilterStage, Layer, Voice};
use crate::mapper::ContractParameters;

use super::adsr;

/// Length of one data burst (s).
const BURST_SECONDS: f64 = 0.1;
/// Delay between successive harmonic layer starts (s).
const LAYER_STAGGER: f64 = 0.05;

pub fn contract_call(sample_rate: f64, c: &ContractParameters, rng: &mut Rng, now: f64) -> Voice {
    let base = c.base_frequency;
    let end = now + c.duration;

    let drone = Layer::oscillator(Waveform::Sawtooth, sample_rate, Automation::new(base * 0.5), now, end)
        .with_filter(
            FilterStage::fixed(FilterType::Lowpass, sample_rate, base * 2.0, 8.0).with_lfo(
                sample_rate,
                c.mod_frequency,
                base * c.mod_depth,
            ),
        )
        .with_gain(Automation::new(0.6));

    let mut voice = Voice::new("contract call", Bus::Reverb)
        .layer(drone)
        .output_gain(adsr(
            now,
            c.attack,
            c.volume,
            c.decay,
            c.volume * c.sustain,
            end,
        ))
        .pan(c.pan);

    let count = c.layer_frequencies.len().max(1) as f64;
    for (i, &f) in c.layer_frequencies.iter().enumerate() {
        let start = now + i as f64 * LAYER_STAGGER;
        let mut pitch = Automation::new(f);
        pitch
            .set_value_at(f, start)
            .linear_ramp_to(f * (1.0 + c.mod_depth), (now + c.duration * 0.3).max(start))
            .exponential_ramp_to(f * 0.8, end);
        voice = voice.layer(
            Layer::oscillator(Waveform::CYCLE[i % 4], sample_rate, pitch, start, end)
                .with_filter(FilterStage::fixed(
                    FilterType::Bandpass,
                    sample_rate,
                    f * 2.0,
                    10.0 + c.complexity as f64,
                ))
                .with_gain(Automation::new(c.volume / count * (1.0 - 0.15 * i as f64))),
        );
    }

    let burst = Arc::new(noise::decaying(rng, BURST_SECONDS, sample_rate));
    voice.layer(
        Layer::noise(burst, burst_times(c, now), sample_rate)
            .with_filter(FilterStage::fixed(FilterType::Highpass, sample_rate, base * 4.0, 5.0))
            .with_gain(Automation::new(c.volume * 0.3)),
    )
}

/// One burst at the end of the attack, then `complexity - 1` more spread
/// across the duration.
fn burst_times(c: &ContractParameters, now: f64) -> Vec<f64> {
    let spacing = c.duration / c.complexity.max(1) as f64;
    std::iter::once(now + c.attack)
        .chain((1..c.complexity).map(|i| now + spacing * i as f64))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::Transaction;
    use crate::dsp::voice::Source;
    use crate::mapper::map_contract_call;
    use crate::settings::MappingTuning;
    use crate::voices::assert_well_formed;

    const SR: f64 = 8000.0;

    fn params(calldata: &str, value: &str) -> ContractParameters {
        let tx = Transaction {
            to: Some("0xdac17f958d2ee523a2206206994597c13d831ec7".into()),
            value: Some(value.into()),
            calldata: Some(calldata.into()),
            ..Transaction::default()
        };
        map_contract_call(&tx, &MappingTuning::default())
    }

    #[test]
    fn transfer_selector_builds_three_harmonics() {
        let c = params("0xa9059cbb0000", "0x0");
        let voice = contract_call(SR, &c, &mut Rng::with_seed(1), 2.0);
        // drone + 3 harmonics + noise bursts
        assert_eq!(voice.layers.len(), 5);
        assert_eq!(voice.bus, Bus::Reverb);
        match &voice.layers[4].source {
            Source::Noise { triggers, .. } => assert_eq!(triggers.len(), 3),
            other => panic!("expected noise bursts, got {other:?}"),
        }
        assert_well_formed(&voice, 2.0, c.duration);
    }

    #[test]
    fn harmonic_waveforms_cycle() {
        // 0x095e = 2398, 2398 % 7 + 1 = 5 layers requested, 4 ratios available.
        let c = params("0x095ea7b3", "0x0");
        assert_eq!(c.complexity, 5);
        let voice = contract_call(SR, &c, &mut Rng::with_seed(1), 0.0);
        assert_eq!(voice.layers.len(), 1 + 4 + 1);
        for (i, layer) in voice.layers[1..5].iter().enumerate() {
            assert!((layer.start - i as f64 * 0.05).abs() < 1e-12);
        }
    }

    #[test]
    fn bursts_spread_over_duration() {
        let c = params("0x095ea7b3", "0x0");
        let times = burst_times(&c, 1.0);
        assert_eq!(times.len(), 5);
        assert!((times[0] - (1.0 + c.attack)).abs() < 1e-12);
        for (i, t) in times.iter().enumerate().skip(1) {
            assert!((t - (1.0 + c.duration / 5.0 * i as f64)).abs() < 1e-12);
        }
    }

    #[test]
    fn every_selector_is_well_formed() {
        for calldata in ["0x", "0x12", "0xa9059cbb", "0x095ea7b3", "0xffffffff", "0x00000000"] {
            let c = params(calldata, "0x8ac7230489e80000");
            let voice = contract_call(SR, &c, &mut Rng::with_seed(3), 0.25);
            assert_well_formed(&voice, 0.25, c.duration);
        }
    }

    #[test]
    fn audible_and_panned() {
        let c = params("0xa9059cbb", "0xde0b6b3a7640000");
        let mut voice = contract_call(SR, &c, &mut Rng::with_seed(9), 0.0);
        let (mut left, mut right) = (0.0, 0.0);
        for i in 0..(c.duration * SR) as usize {
            let (l, r) = voice.process(i as f64 / SR);
            left += l * l;
            right += r * r;
        }
        assert!(left + right > 1e-6);
        assert!(c.pan != 0.0);
        assert!((left > right) == (c.pan < 0.0), "pan {} gave {left} / {right}", c.pan);
    }
}
