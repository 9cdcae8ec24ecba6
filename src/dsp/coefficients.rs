//! Biquad coefficient design for the cut filters
//!
//! Maps (sample rate, cutoff, slope, kind) to a cascade of 2nd-order
//! sections approximating a Butterworth response. Sections use the RBJ
//! Audio EQ Cookbook low-pass/high-pass formulas, one per cascade
//! position, each with the Q of the corresponding analog Butterworth
//! pole pair.
//!
//! Pure functions only: invalid inputs are clamped, never rejected,
//! because the caller is the real-time thread.

use std::f64::consts::{FRAC_1_SQRT_2, PI};

use crate::params::Slope;

/// Fixed capacity of a cut filter cascade
pub const MAX_SECTIONS: usize = 3;

/// Fraction of the sample rate the cutoff is clamped below, keeping the
/// bilinear-transform design away from the Nyquist singularity
const NYQUIST_MARGIN: f64 = 0.49;

/// Cut filter kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// Removes content above the cutoff (the high-cut stage)
    LowPass,
    /// Removes content below the cutoff (the low-cut stage)
    HighPass,
}

/// Normalized biquad coefficients
///
/// Transfer function: H(z) = (b0 + b1*z^-1 + b2*z^-2) / (1 + a1*z^-1 + a2*z^-2)
///
/// A plain `Copy` value: recalculation always produces a fresh set that
/// replaces the previous one wholesale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoeffs {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
}

impl Default for BiquadCoeffs {
    fn default() -> Self {
        Self::identity()
    }
}

impl BiquadCoeffs {
    /// Unity-gain pass-through section
    pub fn identity() -> Self {
        Self {
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
        }
    }

    /// RBJ cookbook low-pass section
    pub fn low_pass(sample_rate: f64, cutoff_hz: f64, q: f64) -> Self {
        let w0 = 2.0 * PI * cutoff_hz / sample_rate;
        let cos_w0 = w0.cos();
        let alpha = w0.sin() / (2.0 * q);

        let b0 = (1.0 - cos_w0) / 2.0;
        let b1 = 1.0 - cos_w0;
        let b2 = (1.0 - cos_w0) / 2.0;
        let a0 = 1.0 + alpha;
        let a1 = -2.0 * cos_w0;
        let a2 = 1.0 - alpha;

        Self::normalized(b0, b1, b2, a0, a1, a2)
    }

    /// RBJ cookbook high-pass section
    pub fn high_pass(sample_rate: f64, cutoff_hz: f64, q: f64) -> Self {
        let w0 = 2.0 * PI * cutoff_hz / sample_rate;
        let cos_w0 = w0.cos();
        let alpha = w0.sin() / (2.0 * q);

        let b0 = (1.0 + cos_w0) / 2.0;
        let b1 = -(1.0 + cos_w0);
        let b2 = (1.0 + cos_w0) / 2.0;
        let a0 = 1.0 + alpha;
        let a1 = -2.0 * cos_w0;
        let a2 = 1.0 - alpha;

        Self::normalized(b0, b1, b2, a0, a1, a2)
    }

    fn normalized(b0: f64, b1: f64, b2: f64, a0: f64, a1: f64, a2: f64) -> Self {
        Self {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
        }
    }

    /// Magnitude response at the given frequency
    pub fn magnitude_at(&self, freq_hz: f64, sample_rate: f64) -> f64 {
        let w = 2.0 * PI * freq_hz / sample_rate;
        let (cos1, sin1) = (w.cos(), w.sin());
        let (cos2, sin2) = ((2.0 * w).cos(), (2.0 * w).sin());

        // |H(e^jw)| = |b0 + b1 e^-jw + b2 e^-2jw| / |1 + a1 e^-jw + a2 e^-2jw|
        let num_re = self.b0 + self.b1 * cos1 + self.b2 * cos2;
        let num_im = -(self.b1 * sin1 + self.b2 * sin2);
        let den_re = 1.0 + self.a1 * cos1 + self.a2 * cos2;
        let den_im = -(self.a1 * sin1 + self.a2 * sin2);

        (num_re * num_re + num_im * num_im).sqrt() / (den_re * den_re + den_im * den_im).sqrt()
    }
}

/// An ordered cascade of up to [`MAX_SECTIONS`] coefficient sets
///
/// Fixed-capacity so the audio thread never touches the heap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoeffCascade {
    sections: [BiquadCoeffs; MAX_SECTIONS],
    len: usize,
}

impl CoeffCascade {
    /// Active coefficient sets, in processing order
    pub fn as_slice(&self) -> &[BiquadCoeffs] {
        &self.sections[..self.len]
    }

    /// Number of active sections
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Combined magnitude response of the cascade
    pub fn magnitude_at(&self, freq_hz: f64, sample_rate: f64) -> f64 {
        self.as_slice()
            .iter()
            .map(|c| c.magnitude_at(freq_hz, sample_rate))
            .product()
    }
}

/// Per-section Q values for a cascaded Butterworth response
///
/// For an order-2N filter the pole pairs sit at angles
/// theta_k = pi * (2k + 1) / (4N), giving Q_k = 1 / (2 cos theta_k).
/// A single section uses the canonical 1/sqrt(2).
pub fn butterworth_qs(slope: Slope) -> &'static [f64] {
    match slope {
        Slope::Db12 => &[FRAC_1_SQRT_2],
        Slope::Db24 => &[0.5411961001461969, 1.3065629648763764],
        Slope::Db36 => &[0.5176380902050415, FRAC_1_SQRT_2, 1.9318516525781366],
    }
}

/// Design the coefficient cascade for one cut filter
///
/// `cutoff_hz` is clamped to [20 Hz, 0.49 * sample_rate] before the
/// design so the result is always stable. Returns one coefficient set
/// per cascaded section (1..=3 depending on slope).
pub fn compute_cut_coefficients(
    sample_rate: f64,
    cutoff_hz: f32,
    slope: Slope,
    kind: FilterKind,
) -> CoeffCascade {
    // NaN would survive clamp and poison every coefficient
    let cutoff = if cutoff_hz.is_nan() {
        20.0
    } else {
        f64::from(cutoff_hz).clamp(20.0, NYQUIST_MARGIN * sample_rate)
    };

    let qs = butterworth_qs(slope);
    let mut sections = [BiquadCoeffs::identity(); MAX_SECTIONS];
    for (section, &q) in sections.iter_mut().zip(qs) {
        *section = match kind {
            FilterKind::LowPass => BiquadCoeffs::low_pass(sample_rate, cutoff, q),
            FilterKind::HighPass => BiquadCoeffs::high_pass(sample_rate, cutoff, q),
        };
    }

    CoeffCascade {
        sections,
        len: qs.len(),
    }
}
