//! DSP signal chain
//!
//! The per-block processing pipeline: coefficient design, cut filter
//! cascades, block-ramped gain, reverb, the per-channel chain, and the
//! stereo processor that drives it all from a parameter snapshot.

mod chain;
mod coefficients;
mod filter;
mod gain;
mod processor;
mod reverb;

pub use chain::ChannelChain;
pub use coefficients::{
    butterworth_qs, compute_cut_coefficients, BiquadCoeffs, CoeffCascade, FilterKind, MAX_SECTIONS,
};
pub use filter::{Biquad, CutFilter};
pub use gain::{db_to_linear, GainStage};
pub use processor::StereoProcessor;
pub use reverb::ReverbStage;
