//! Convolution reverb: uniformly partitioned overlap-save FFT convolution.
//!
//! The impulse response is cut into partitions of `block_size` taps whose
//! spectra are computed once. Every `block_size` input samples the newest
//! input window is transformed, pushed onto a frequency-domain delay line,
//! and multiplied against the partition spectra. Output lags input by
//! exactly one block.

use std::sync::Arc;

use rustfft::num_complex::Complex32;
use rustfft::{Fft, FftPlanner};

/// Default partition size in samples.
pub const DEFAULT_BLOCK_SIZE: usize = 1024;

#[derive(Clone)]
struct Channel {
    /// Spectra of the IR partitions, each `2 * block` bins.
    partitions: Vec<Vec<Complex32>>,
    /// Frequency-domain delay line of past input windows.
    history: Vec<Vec<Complex32>>,
    head: usize,
    /// Previous block followed by the block being filled.
    window: Vec<f32>,
    /// Output of the last computed block.
    output: Vec<f32>,
}

/// Stereo convolver: left input with the left IR, right with the right.
#[derive(Clone)]
pub struct ConvolutionReverb {
    block: usize,
    forward: Arc<dyn Fft<f32>>,
    inverse: Arc<dyn Fft<f32>>,
    channels: [Channel; 2],
    pos: usize,
    /// Consecutive silent input blocks; once the history is all silence
    /// the FFT work is skipped.
    quiet_blocks: usize,
    scratch: Vec<Complex32>,
    acc: Vec<Complex32>,
}

impl std::fmt::Debug for ConvolutionReverb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConvolutionReverb")
            .field("block", &self.block)
            .field("partitions", &self.channels[0].partitions.len())
            .finish()
    }
}

impl ConvolutionReverb {
    /// Build a convolver for a stereo impulse response.
    pub fn new(impulse: &[Vec<f32>; 2], block_size: usize) -> Self {
        let block = block_size.max(1);
        let size = 2 * block;
        let mut planner = FftPlanner::<f32>::new();
        let forward = planner.plan_fft_forward(size);
        let inverse = planner.plan_fft_inverse(size);

        let ir_len = impulse[0].len().max(impulse[1].len()).max(1);
        let count = ir_len.div_ceil(block);

        let channel = |ir: &[f32]| -> Channel {
            let partitions = (0..count)
                .map(|p| {
                    let mut spectrum = vec![Complex32::new(0.0, 0.0); size];
                    let start = (p * block).min(ir.len());
                    let end = ((p + 1) * block).min(ir.len());
                    for (bin, &tap) in spectrum.iter_mut().zip(&ir[start..end]) {
                        bin.re = tap;
                    }
                    forward.process(&mut spectrum);
                    spectrum
                })
                .collect();
            Channel {
                partitions,
                history: vec![vec![Complex32::new(0.0, 0.0); size]; count],
                head: 0,
                window: vec![0.0; size],
                output: vec![0.0; block],
            }
        };
        let channels = [channel(&impulse[0]), channel(&impulse[1])];

        Self {
            block,
            forward,
            inverse,
            channels,
            pos: 0,
            quiet_blocks: count + 1,
            scratch: vec![Complex32::new(0.0, 0.0); size],
            acc: vec![Complex32::new(0.0, 0.0); size],
        }
    }

    /// Samples of delay between input and the start of its response.
    pub fn latency(&self) -> usize {
        self.block
    }

    /// Process one stereo frame.
    #[inline]
    pub fn process(&mut self, left: f32, right: f32) -> (f32, f32) {
        let block = self.block;
        let out = (
            self.channels[0].output[self.pos],
            self.channels[1].output[self.pos],
        );
        self.channels[0].window[block + self.pos] = left;
        self.channels[1].window[block + self.pos] = right;
        self.pos += 1;
        if self.pos == block {
            self.pos = 0;
            self.run_block();
        }
        out
    }

    fn run_block(&mut self) {
        let block = self.block;
        let silent = self
            .channels
            .iter()
            .all(|c| c.window[block..].iter().all(|&s| s == 0.0));
        self.quiet_blocks = if silent { self.quiet_blocks + 1 } else { 0 };

        let count = self.channels[0].partitions.len();
        if self.quiet_blocks > count + 1 {
            for channel in &mut self.channels {
                channel.output.fill(0.0);
                channel.window.copy_within(block.., 0);
            }
            return;
        }

        let scale = 1.0 / (2 * block) as f32;
        for channel in &mut self.channels {
            for (bin, &s) in self.scratch.iter_mut().zip(&channel.window) {
                *bin = Complex32::new(s, 0.0);
            }
            self.forward.process(&mut self.scratch);

            channel.head = (channel.head + count - 1) % count;
            channel.history[channel.head].copy_from_slice(&self.scratch);

            self.acc.fill(Complex32::new(0.0, 0.0));
            for (k, partition) in channel.partitions.iter().enumerate() {
                let past = &channel.history[(channel.head + k) % count];
                for ((a, x), h) in self.acc.iter_mut().zip(past).zip(partition) {
                    *a += x * h;
                }
            }
            self.inverse.process(&mut self.acc);

            for (out, bin) in channel.output.iter_mut().zip(&self.acc[block..]) {
                *out = bin.re * scale;
            }
            channel.window.copy_within(block.., 0);
        }
    }
}
