//! Gain stage
//!
//! dB-controlled gain with a linear ramp across the block whenever the
//! multiplier changed since the previous block. The ramp is a
//! correctness requirement: a stepped multiplier at a block boundary is
//! an audible click.

use crate::params::{GAIN_MAX_DB, GAIN_MIN_DB};

/// Convert decibels to linear amplitude
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

/// Block-ramped gain stage
#[derive(Debug, Clone, Copy)]
pub struct GainStage {
    gain_db: f32,
    /// Multiplier at the end of the previous block
    current: f32,
    /// Multiplier requested for this block
    target: f32,
}

impl Default for GainStage {
    fn default() -> Self {
        Self::new()
    }
}

impl GainStage {
    /// Unity gain
    pub fn new() -> Self {
        Self {
            gain_db: 0.0,
            current: 1.0,
            target: 1.0,
        }
    }

    /// Set the gain for the upcoming block, clamped to the valid range
    ///
    /// The linear conversion happens here, once per block, not per
    /// sample.
    pub fn set_gain_db(&mut self, db: f32) {
        self.gain_db = db.clamp(GAIN_MIN_DB, GAIN_MAX_DB);
        self.target = db_to_linear(self.gain_db);
    }

    pub fn gain_db(&self) -> f32 {
        self.gain_db
    }

    /// Apply the gain in place, ramping from the previous block's value
    pub fn process(&mut self, samples: &mut [f32]) {
        if samples.is_empty() {
            return;
        }

        if (self.current - self.target).abs() < f32::EPSILON {
            // Steady state; skip the multiply entirely at unity
            if (self.target - 1.0).abs() >= f32::EPSILON {
                for sample in samples.iter_mut() {
                    *sample *= self.target;
                }
            }
            return;
        }

        let step = (self.target - self.current) / samples.len() as f32;
        let mut gain = self.current;
        for sample in samples.iter_mut() {
            gain += step;
            *sample *= gain;
        }
        self.current = self.target;
    }

    /// Drop any pending ramp and land on the target immediately
    ///
    /// Used at prepare/reset time, when there is no audible stream to
    /// protect.
    pub fn reset(&mut self) {
        self.current = self.target;
    }
}
