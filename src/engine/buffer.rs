//! Planar stereo buffer
//!
//! The processor consumes de-interleaved channels, so the offline
//! engine stores left and right as separate sample vectors and converts
//! to/from the interleaved layout used by audio files at the edges.

use crate::error::{EfectoError, Result};

/// De-interleaved stereo audio
#[derive(Debug, Clone)]
pub struct StereoBuffer {
    left: Vec<f32>,
    right: Vec<f32>,
    sample_rate: u32,
}

impl StereoBuffer {
    /// Create a silent buffer
    pub fn new(num_samples: usize, sample_rate: u32) -> Self {
        Self {
            left: vec![0.0; num_samples],
            right: vec![0.0; num_samples],
            sample_rate,
        }
    }

    /// Build from interleaved samples
    ///
    /// Mono input is duplicated to both channels; more than two
    /// channels is an error.
    pub fn from_interleaved(
        samples: &[f32],
        num_channels: usize,
        sample_rate: u32,
    ) -> Result<Self> {
        match num_channels {
            1 => Ok(Self {
                left: samples.to_vec(),
                right: samples.to_vec(),
                sample_rate,
            }),
            2 => {
                if samples.len() % 2 != 0 {
                    return Err(EfectoError::InvalidAudio {
                        reason: format!(
                            "interleaved stereo sample count {} is odd",
                            samples.len()
                        ),
                        source: None,
                    });
                }
                let mut left = Vec::with_capacity(samples.len() / 2);
                let mut right = Vec::with_capacity(samples.len() / 2);
                for frame in samples.chunks_exact(2) {
                    left.push(frame[0]);
                    right.push(frame[1]);
                }
                Ok(Self {
                    left,
                    right,
                    sample_rate,
                })
            }
            n => Err(EfectoError::UnsupportedFormat {
                format: format!("{}-channel audio (only mono/stereo supported)", n),
            }),
        }
    }

    /// Interleave back to [L0, R0, L1, R1, ...]
    pub fn to_interleaved(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.left.len() * 2);
        for (&l, &r) in self.left.iter().zip(&self.right) {
            out.push(l);
            out.push(r);
        }
        out
    }

    pub fn num_samples(&self) -> usize {
        self.left.len()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn duration_secs(&self) -> f64 {
        self.num_samples() as f64 / f64::from(self.sample_rate)
    }

    pub fn left(&self) -> &[f32] {
        &self.left
    }

    pub fn right(&self) -> &[f32] {
        &self.right
    }

    /// Mutable access to both channels at once, for block processing
    pub fn channels_mut(&mut self) -> (&mut [f32], &mut [f32]) {
        (&mut self.left, &mut self.right)
    }

    /// RMS level of one channel in dB (0 = left, 1 = right)
    pub fn rms_db(&self, channel: usize) -> f64 {
        let samples = if channel == 0 { &self.left } else { &self.right };
        if samples.is_empty() {
            return f64::NEG_INFINITY;
        }
        let sum_sq: f64 = samples.iter().map(|&s| f64::from(s) * f64::from(s)).sum();
        let rms = (sum_sq / samples.len() as f64).sqrt();
        if rms > 0.0 {
            20.0 * rms.log10()
        } else {
            f64::NEG_INFINITY
        }
    }

    /// Peak level of one channel in dB (0 = left, 1 = right)
    pub fn peak_db(&self, channel: usize) -> f64 {
        let samples = if channel == 0 { &self.left } else { &self.right };
        let peak = samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max);
        if peak > 0.0 {
            20.0 * f64::from(peak).log10()
        } else {
            f64::NEG_INFINITY
        }
    }

    /// True when every sample is finite and within sane bounds
    pub fn is_valid(&self) -> bool {
        self.left
            .iter()
            .chain(&self.right)
            .all(|&s| s.is_finite() && s.abs() <= 16.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_buffer() {
        let buf = StereoBuffer::new(1000, 44100);
        assert_eq!(buf.num_samples(), 1000);
        assert_eq!(buf.sample_rate(), 44100);
        assert!(buf.is_valid());
    }

    #[test]
    fn test_interleave_round_trip() {
        let interleaved = vec![0.1, -0.1, 0.2, -0.2, 0.3, -0.3];
        let buf = StereoBuffer::from_interleaved(&interleaved, 2, 48000).unwrap();
        assert_eq!(buf.left(), &[0.1, 0.2, 0.3]);
        assert_eq!(buf.right(), &[-0.1, -0.2, -0.3]);
        assert_eq!(buf.to_interleaved(), interleaved);
    }

    #[test]
    fn test_mono_duplicated() {
        let buf = StereoBuffer::from_interleaved(&[0.5, 0.6], 1, 44100).unwrap();
        assert_eq!(buf.left(), buf.right());
        assert_eq!(buf.num_samples(), 2);
    }

    #[test]
    fn test_rejects_surround() {
        let result = StereoBuffer::from_interleaved(&[0.0; 6], 6, 44100);
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_odd_stereo() {
        let result = StereoBuffer::from_interleaved(&[0.0; 3], 2, 44100);
        assert!(result.is_err());
    }

    #[test]
    fn test_rms_db_sine() {
        let mut buf = StereoBuffer::new(48000, 48000);
        let (left, _) = buf.channels_mut();
        for (i, sample) in left.iter_mut().enumerate() {
            let t = i as f64 / 48000.0;
            *sample = (2.0 * std::f64::consts::PI * 440.0 * t).sin() as f32;
        }
        // Unity sine RMS is 1/sqrt(2), about -3.01 dB; peak sits at 0 dB
        assert!((buf.rms_db(0) + 3.01).abs() < 0.1);
        assert!(buf.peak_db(0).abs() < 0.1);
        assert_eq!(buf.rms_db(1), f64::NEG_INFINITY);
        assert_eq!(buf.peak_db(1), f64::NEG_INFINITY);
    }

    #[test]
    fn test_is_valid_catches_nan() {
        let mut buf = StereoBuffer::new(16, 48000);
        assert!(buf.is_valid());
        buf.channels_mut().1[3] = f32::NAN;
        assert!(!buf.is_valid());
    }
}
