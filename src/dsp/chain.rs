//! Per-channel processing chain
//!
//! A fixed four-stage pipeline applied to one audio channel, strictly
//! in order: low-cut, high-cut, gain, reverb. The stage set never
//! changes at runtime; constructed once and retained for the
//! processor's lifetime.

use tracing::debug;

use super::coefficients::CoeffCascade;
use super::filter::CutFilter;
use super::gain::GainStage;
use super::reverb::ReverbStage;

/// Ordered single-channel pipeline: LowCut -> HighCut -> Gain -> Reverb
#[derive(Debug, Clone, Default)]
pub struct ChannelChain {
    low_cut: CutFilter,
    high_cut: CutFilter,
    gain: GainStage,
    reverb: ReverbStage,
}

impl ChannelChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepare every stage for playback
    ///
    /// Called once before playback starts and again whenever sample
    /// rate or block size change. This is the only point where stages
    /// may allocate.
    pub fn prepare(&mut self, sample_rate: f64, max_block_size: usize) {
        debug!(sample_rate, max_block_size, "preparing channel chain");
        self.reverb.prepare(sample_rate, max_block_size);
        self.reset();
    }

    /// Install low-cut coefficients (state preserved)
    pub fn set_low_cut_coefficients(&mut self, cascade: &CoeffCascade) {
        self.low_cut.set_coefficients(cascade);
    }

    /// Install high-cut coefficients (state preserved)
    pub fn set_high_cut_coefficients(&mut self, cascade: &CoeffCascade) {
        self.high_cut.set_coefficients(cascade);
    }

    /// Set the gain target for the upcoming block
    pub fn set_gain_db(&mut self, db: f32) {
        self.gain.set_gain_db(db);
    }

    /// Set reverb dry/wet mix and amount, both 0..=1
    pub fn set_reverb(&mut self, mix: f32, amount: f32) {
        self.reverb.set_mix(mix);
        self.reverb.set_amount(amount);
    }

    /// Run the full chain over one channel's samples, in place
    pub fn process(&mut self, samples: &mut [f32]) {
        self.low_cut.process(samples);
        self.high_cut.process(samples);
        self.gain.process(samples);
        self.reverb.process(samples);
    }

    /// Clear all stage state (filter registers, reverb tail, gain ramp)
    ///
    /// For transport stop/start and sample-rate changes only; never
    /// called mid-block.
    pub fn reset(&mut self) {
        self.low_cut.reset();
        self.high_cut.reset();
        self.gain.reset();
        self.reverb.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::coefficients::{compute_cut_coefficients, FilterKind};
    use crate::params::Slope;

    fn sine(freq: f64, sample_rate: f64, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| {
                let t = i as f64 / sample_rate;
                (2.0 * std::f64::consts::PI * freq * t).sin() as f32
            })
            .collect()
    }

    fn rms(samples: &[f32]) -> f64 {
        let sum: f64 = samples.iter().map(|&s| f64::from(s) * f64::from(s)).sum();
        (sum / samples.len() as f64).sqrt()
    }

    #[test]
    fn test_silence_stays_silent() {
        let mut chain = ChannelChain::new();
        chain.prepare(48000.0, 512);
        chain.set_gain_db(6.0);
        chain.set_reverb(0.5, 0.5);
        chain.set_low_cut_coefficients(&compute_cut_coefficients(
            48000.0,
            200.0,
            Slope::Db36,
            FilterKind::HighPass,
        ));

        let mut samples = vec![0.0f32; 2048];
        chain.process(&mut samples);
        assert!(samples.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_stage_order_low_cut_before_gain() {
        // A low-cut at 5 kHz removes a 100 Hz tone; gain afterwards
        // cannot bring it back.
        let sample_rate = 48000.0;
        let mut chain = ChannelChain::new();
        chain.prepare(sample_rate, 512);
        chain.set_low_cut_coefficients(&compute_cut_coefficients(
            sample_rate,
            5000.0,
            Slope::Db36,
            FilterKind::HighPass,
        ));
        chain.set_gain_db(6.0);

        let mut samples = sine(100.0, sample_rate, 9600);
        let rms_in = rms(&samples);
        chain.process(&mut samples);
        let rms_out = rms(&samples[4800..]);
        assert!(
            rms_out / rms_in < 0.01,
            "low-frequency content survived the chain, ratio {}",
            rms_out / rms_in
        );
    }

    #[test]
    fn test_neutral_chain_is_near_identity() {
        let sample_rate = 48000.0;
        let mut chain = ChannelChain::new();
        chain.prepare(sample_rate, 512);
        // Cuts at the band edges, unity gain, no reverb
        chain.set_low_cut_coefficients(&compute_cut_coefficients(
            sample_rate,
            20.0,
            Slope::Db12,
            FilterKind::HighPass,
        ));
        chain.set_high_cut_coefficients(&compute_cut_coefficients(
            sample_rate,
            20000.0,
            Slope::Db12,
            FilterKind::LowPass,
        ));
        chain.set_gain_db(0.0);
        chain.set_reverb(0.5, 0.0);

        let signal = sine(1000.0, sample_rate, 9600);
        let mut samples = signal.clone();
        chain.process(&mut samples);

        let ratio = rms(&samples[4800..]) / rms(&signal[4800..]);
        assert!(
            (ratio - 1.0).abs() < 0.01,
            "neutral settings should be near-identity, gain ratio {}",
            ratio
        );
    }

    #[test]
    fn test_reset_after_signal() {
        let mut chain = ChannelChain::new();
        chain.prepare(48000.0, 512);
        chain.set_low_cut_coefficients(&compute_cut_coefficients(
            48000.0,
            1000.0,
            Slope::Db24,
            FilterKind::HighPass,
        ));

        let mut samples = sine(440.0, 48000.0, 1024);
        chain.process(&mut samples);
        chain.reset();

        let mut silence = vec![0.0f32; 512];
        chain.process(&mut silence);
        assert!(silence.iter().all(|&s| s == 0.0));
    }
}
