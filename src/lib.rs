//! Efecto - Real-Time Stereo Effects Processor
//!
//! Efecto applies a fixed four-stage effect chain to a stereo audio
//! stream: low-cut filter, high-cut filter, gain, and reverb. Filter
//! cutoffs use Butterworth biquad cascades with selectable slope
//! (12/24/36 dB per octave).
//!
//! # Architecture
//!
//! - `params`: lock-free parameter store written from a control thread
//!   and snapshotted once per block by the audio thread
//! - `dsp`: the signal chain itself (coefficient design, cut filters,
//!   gain ramp, reverb, per-channel chain, stereo processor)
//! - `engine`: planar stereo buffers and WAV file I/O for offline use
//!
//! The audio path (`StereoProcessor::process_block`) never allocates,
//! locks, or returns errors. Out-of-range parameter values are clamped
//! when the snapshot is taken.

pub mod dsp;
pub mod engine;
pub mod error;
pub mod params;

pub use dsp::StereoProcessor;
pub use error::{EfectoError, Result};
pub use params::{ParamStore, ParameterSnapshot, Slope};
