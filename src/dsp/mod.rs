//! DSP: pure Rust synthesis and effects.
//!
//! Everything a voice or the shared signal graph needs, rendered sample by
//! sample against the audio clock. The same code serves real-time playback
//! through an AudioWorklet and the offline WAV renderer.

pub mod automation;
pub mod chorus;
pub mod compressor;
pub mod delay;
pub mod filter;
pub mod graph;
pub mod mixer;
pub mod noise;
pub mod oscillator;
pub mod renderer;
pub mod reverb;
pub mod shaper;
pub mod voice;
