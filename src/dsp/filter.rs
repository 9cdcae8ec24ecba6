//! Cut filter stage: a fixed cascade of biquad sections
//!
//! One `CutFilter` implements a single cutoff (low-cut or high-cut) as
//! up to three cascaded 2nd-order sections. The cascade is a fixed
//! array with an active count; changing slope at runtime only changes
//! the count, never reallocates, and never touches delay state.

use super::coefficients::{BiquadCoeffs, CoeffCascade, MAX_SECTIONS};

/// One 2nd-order IIR section
///
/// Direct Form II Transposed, chosen for numerical stability. The delay
/// registers persist across blocks and across coefficient swaps; only
/// `reset` zeroes them.
#[derive(Debug, Clone, Copy, Default)]
pub struct Biquad {
    coeffs: BiquadCoeffs,
    z1: f64,
    z2: f64,
}

impl Biquad {
    /// Install new coefficients, keeping delay state intact
    ///
    /// Preserving z1/z2 across the swap is what keeps coefficient
    /// changes click-free mid-stream.
    pub fn set_coeffs(&mut self, coeffs: BiquadCoeffs) {
        self.coeffs = coeffs;
    }

    /// Process a single sample
    #[inline]
    pub fn process_sample(&mut self, input: f32) -> f32 {
        let x = f64::from(input);
        let c = &self.coeffs;

        let y = c.b0 * x + self.z1;
        self.z1 = c.b1 * x - c.a1 * y + self.z2;
        self.z2 = c.b2 * x - c.a2 * y;

        y as f32
    }

    /// Zero the delay registers
    pub fn reset(&mut self) {
        self.z1 = 0.0;
        self.z2 = 0.0;
    }
}

/// A chain of up to three cascaded biquad sections
#[derive(Debug, Clone, Copy, Default)]
pub struct CutFilter {
    sections: [Biquad; MAX_SECTIONS],
    active: usize,
}

impl CutFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a freshly designed cascade
    ///
    /// Slots beyond the cascade length become identity pass-throughs
    /// but keep their delay state, so a later slope increase resumes
    /// from wherever that section left off instead of clicking.
    pub fn set_coefficients(&mut self, cascade: &CoeffCascade) {
        let coeffs = cascade.as_slice();
        for (slot, section) in self.sections.iter_mut().enumerate() {
            match coeffs.get(slot) {
                Some(&c) => section.set_coeffs(c),
                None => section.set_coeffs(BiquadCoeffs::identity()),
            }
        }
        self.active = coeffs.len().min(MAX_SECTIONS);
    }

    /// Number of active (non-bypassed) sections
    pub fn active_sections(&self) -> usize {
        self.active
    }

    /// Run one sample through the active sections in order
    #[inline]
    pub fn process_sample(&mut self, input: f32) -> f32 {
        let mut sample = input;
        for section in &mut self.sections[..self.active] {
            sample = section.process_sample(sample);
        }
        sample
    }

    /// Filter a buffer in place
    pub fn process(&mut self, samples: &mut [f32]) {
        if self.active == 0 {
            return;
        }
        for sample in samples.iter_mut() {
            *sample = self.process_sample(*sample);
        }
    }

    /// Zero all delay registers, bypassed slots included
    ///
    /// Called on transport stop/start or sample-rate change, never
    /// mid-block.
    pub fn reset(&mut self) {
        for section in &mut self.sections {
            section.reset();
        }
    }
}
