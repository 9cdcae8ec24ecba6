//! Parameter store
//!
//! Holds the user-facing controls: gain, dry/wet, reverb amount, the
//! two cut frequencies, and the two cut slopes. Values are written from
//! a control/UI thread and read by the audio thread, so storage is
//! plain atomics (f32 bit patterns in `AtomicU32`, slopes in
//! `AtomicU8`) and the audio-side read never waits.

use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::{EfectoError, Result};

// ============================================================================
// Ranges and defaults
// ============================================================================

/// Gain range in dB
pub const GAIN_MIN_DB: f32 = -32.0;
pub const GAIN_MAX_DB: f32 = 6.0;

/// Percentage range for dry/wet and reverb amount
pub const PERCENT_MIN: f32 = 0.0;
pub const PERCENT_MAX: f32 = 100.0;

/// Cut frequency range in Hz
pub const FREQ_MIN_HZ: f32 = 20.0;
pub const FREQ_MAX_HZ: f32 = 20000.0;

const DEFAULT_GAIN_DB: f32 = 0.0;
const DEFAULT_DRY_WET: f32 = 50.0;
const DEFAULT_REVERB: f32 = 0.0;
const DEFAULT_LOW_CUT_HZ: f32 = 20.0;
const DEFAULT_HIGH_CUT_HZ: f32 = 20000.0;

/// NaN host values fall back to the field default; `f32::clamp`
/// propagates NaN, and a NaN parameter would poison the filter state
/// downstream. Infinities clamp to the range edge as usual.
fn sanitize(value: f32, fallback: f32) -> f32 {
    if value.is_nan() {
        fallback
    } else {
        value
    }
}

// ============================================================================
// Slope
// ============================================================================

/// Cut filter slope in dB per octave
///
/// Each step adds one cascaded 2nd-order section: 12 dB/oct is a single
/// biquad, 36 dB/oct is three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slope {
    #[default]
    Db12,
    Db24,
    Db36,
}

impl Slope {
    /// Number of cascaded biquad sections for this slope
    pub fn sections(self) -> usize {
        match self {
            Slope::Db12 => 1,
            Slope::Db24 => 2,
            Slope::Db36 => 3,
        }
    }

    /// Stable index for atomic storage and host enumeration
    pub fn index(self) -> u8 {
        match self {
            Slope::Db12 => 0,
            Slope::Db24 => 1,
            Slope::Db36 => 2,
        }
    }

    /// Inverse of [`Slope::index`]; out-of-range values fall back to 12 dB
    pub fn from_index(index: u8) -> Self {
        match index {
            1 => Slope::Db24,
            2 => Slope::Db36,
            _ => Slope::Db12,
        }
    }
}

// ============================================================================
// Snapshot
// ============================================================================

/// Immutable parameter values, read once per processing block
///
/// Construction clamps every field to its valid range; the processing
/// path trusts the snapshot and never re-validates. Low cut above high
/// cut is allowed and simply yields a band-reject-like response.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterSnapshot {
    pub gain_db: f32,
    pub dry_wet_percent: f32,
    pub reverb_percent: f32,
    pub low_cut_freq_hz: f32,
    pub high_cut_freq_hz: f32,
    pub low_cut_slope: Slope,
    pub high_cut_slope: Slope,
}

impl Default for ParameterSnapshot {
    fn default() -> Self {
        Self {
            gain_db: DEFAULT_GAIN_DB,
            dry_wet_percent: DEFAULT_DRY_WET,
            reverb_percent: DEFAULT_REVERB,
            low_cut_freq_hz: DEFAULT_LOW_CUT_HZ,
            high_cut_freq_hz: DEFAULT_HIGH_CUT_HZ,
            low_cut_slope: Slope::Db12,
            high_cut_slope: Slope::Db12,
        }
    }
}

impl ParameterSnapshot {
    /// Return a copy with every field clamped into its valid range
    ///
    /// NaN fields become their defaults; the result is always finite
    /// and in range no matter what the host supplied.
    pub fn clamped(mut self) -> Self {
        self.gain_db = sanitize(self.gain_db, DEFAULT_GAIN_DB).clamp(GAIN_MIN_DB, GAIN_MAX_DB);
        self.dry_wet_percent =
            sanitize(self.dry_wet_percent, DEFAULT_DRY_WET).clamp(PERCENT_MIN, PERCENT_MAX);
        self.reverb_percent =
            sanitize(self.reverb_percent, DEFAULT_REVERB).clamp(PERCENT_MIN, PERCENT_MAX);
        self.low_cut_freq_hz =
            sanitize(self.low_cut_freq_hz, DEFAULT_LOW_CUT_HZ).clamp(FREQ_MIN_HZ, FREQ_MAX_HZ);
        self.high_cut_freq_hz =
            sanitize(self.high_cut_freq_hz, DEFAULT_HIGH_CUT_HZ).clamp(FREQ_MIN_HZ, FREQ_MAX_HZ);
        self
    }
}

// ============================================================================
// Host-facing parameter descriptors
// ============================================================================

/// Descriptor for one float parameter, surfaced by the host's generic UI
#[derive(Debug, Clone, Serialize)]
pub struct ParamSpec {
    pub id: &'static str,
    pub display_name: &'static str,
    pub min: f32,
    pub max: f32,
    pub step: f32,
    pub default: f32,
}

/// Float parameter definitions, in host display order
pub fn parameter_specs() -> [ParamSpec; 5] {
    [
        ParamSpec {
            id: "Gain",
            display_name: "Gain",
            min: GAIN_MIN_DB,
            max: GAIN_MAX_DB,
            step: 0.5,
            default: DEFAULT_GAIN_DB,
        },
        ParamSpec {
            id: "Dry/Wet",
            display_name: "Dry/Wet",
            min: PERCENT_MIN,
            max: PERCENT_MAX,
            step: 1.0,
            default: DEFAULT_DRY_WET,
        },
        ParamSpec {
            id: "Reverb",
            display_name: "Reverb",
            min: PERCENT_MIN,
            max: PERCENT_MAX,
            step: 1.0,
            default: DEFAULT_REVERB,
        },
        ParamSpec {
            id: "LowCut Freq",
            display_name: "LowCut Freq",
            min: FREQ_MIN_HZ,
            max: FREQ_MAX_HZ,
            step: 1.0,
            default: DEFAULT_LOW_CUT_HZ,
        },
        ParamSpec {
            id: "HighCut Freq",
            display_name: "HighCut Freq",
            min: FREQ_MIN_HZ,
            max: FREQ_MAX_HZ,
            step: 1.0,
            default: DEFAULT_HIGH_CUT_HZ,
        },
    ]
}

// ============================================================================
// Store
// ============================================================================

/// Thread-safe parameter store
///
/// Writers (`set`, typed setters) run on the control thread; `snapshot`
/// and `get` run anywhere, including the audio thread, without locking.
/// Each field is an independent atomic, so a snapshot is coherent per
/// field rather than across fields; that matches the block-boundary
/// semantics the processor needs.
#[derive(Debug)]
pub struct ParamStore {
    gain_db: AtomicU32,
    dry_wet_percent: AtomicU32,
    reverb_percent: AtomicU32,
    low_cut_freq_hz: AtomicU32,
    high_cut_freq_hz: AtomicU32,
    low_cut_slope: AtomicU8,
    high_cut_slope: AtomicU8,
}

impl Default for ParamStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ParamStore {
    /// Create a store holding the default values
    pub fn new() -> Self {
        Self::from_snapshot(&ParameterSnapshot::default())
    }

    /// Create a store initialized from a snapshot (clamped)
    pub fn from_snapshot(snapshot: &ParameterSnapshot) -> Self {
        let s = snapshot.clamped();
        Self {
            gain_db: AtomicU32::new(s.gain_db.to_bits()),
            dry_wet_percent: AtomicU32::new(s.dry_wet_percent.to_bits()),
            reverb_percent: AtomicU32::new(s.reverb_percent.to_bits()),
            low_cut_freq_hz: AtomicU32::new(s.low_cut_freq_hz.to_bits()),
            high_cut_freq_hz: AtomicU32::new(s.high_cut_freq_hz.to_bits()),
            low_cut_slope: AtomicU8::new(s.low_cut_slope.index()),
            high_cut_slope: AtomicU8::new(s.high_cut_slope.index()),
        }
    }

    /// Read all current values as a clamped snapshot
    ///
    /// Wait-free; safe to call from the audio callback.
    pub fn snapshot(&self) -> ParameterSnapshot {
        ParameterSnapshot {
            gain_db: f32::from_bits(self.gain_db.load(Ordering::Relaxed)),
            dry_wet_percent: f32::from_bits(self.dry_wet_percent.load(Ordering::Relaxed)),
            reverb_percent: f32::from_bits(self.reverb_percent.load(Ordering::Relaxed)),
            low_cut_freq_hz: f32::from_bits(self.low_cut_freq_hz.load(Ordering::Relaxed)),
            high_cut_freq_hz: f32::from_bits(self.high_cut_freq_hz.load(Ordering::Relaxed)),
            low_cut_slope: Slope::from_index(self.low_cut_slope.load(Ordering::Relaxed)),
            high_cut_slope: Slope::from_index(self.high_cut_slope.load(Ordering::Relaxed)),
        }
        .clamped()
    }

    pub fn set_gain_db(&self, db: f32) {
        let v = sanitize(db, DEFAULT_GAIN_DB).clamp(GAIN_MIN_DB, GAIN_MAX_DB);
        self.gain_db.store(v.to_bits(), Ordering::Relaxed);
    }

    pub fn set_dry_wet_percent(&self, percent: f32) {
        let v = sanitize(percent, DEFAULT_DRY_WET).clamp(PERCENT_MIN, PERCENT_MAX);
        self.dry_wet_percent.store(v.to_bits(), Ordering::Relaxed);
    }

    pub fn set_reverb_percent(&self, percent: f32) {
        let v = sanitize(percent, DEFAULT_REVERB).clamp(PERCENT_MIN, PERCENT_MAX);
        self.reverb_percent.store(v.to_bits(), Ordering::Relaxed);
    }

    pub fn set_low_cut_freq_hz(&self, hz: f32) {
        let v = sanitize(hz, DEFAULT_LOW_CUT_HZ).clamp(FREQ_MIN_HZ, FREQ_MAX_HZ);
        self.low_cut_freq_hz.store(v.to_bits(), Ordering::Relaxed);
    }

    pub fn set_high_cut_freq_hz(&self, hz: f32) {
        let v = sanitize(hz, DEFAULT_HIGH_CUT_HZ).clamp(FREQ_MIN_HZ, FREQ_MAX_HZ);
        self.high_cut_freq_hz.store(v.to_bits(), Ordering::Relaxed);
    }

    pub fn set_low_cut_slope(&self, slope: Slope) {
        self.low_cut_slope.store(slope.index(), Ordering::Relaxed);
    }

    pub fn set_high_cut_slope(&self, slope: Slope) {
        self.high_cut_slope.store(slope.index(), Ordering::Relaxed);
    }

    /// Set a parameter by its host-facing name
    ///
    /// Floats are clamped into range; slopes accept indices 0/1/2.
    pub fn set(&self, name: &str, value: f32) -> Result<()> {
        match name {
            "Gain" => self.set_gain_db(value),
            "Dry/Wet" => self.set_dry_wet_percent(value),
            "Reverb" => self.set_reverb_percent(value),
            "LowCut Freq" => self.set_low_cut_freq_hz(value),
            "HighCut Freq" => self.set_high_cut_freq_hz(value),
            "LowCut Slope" => self.set_low_cut_slope(Slope::from_index(value as u8)),
            "HighCut Slope" => self.set_high_cut_slope(Slope::from_index(value as u8)),
            _ => {
                return Err(EfectoError::UnknownParameter {
                    name: name.to_string(),
                })
            }
        }
        Ok(())
    }

    /// Read a parameter by its host-facing name
    ///
    /// Slope parameters are reported as their index (0.0, 1.0, 2.0).
    pub fn get(&self, name: &str) -> Result<f32> {
        let s = self.snapshot();
        match name {
            "Gain" => Ok(s.gain_db),
            "Dry/Wet" => Ok(s.dry_wet_percent),
            "Reverb" => Ok(s.reverb_percent),
            "LowCut Freq" => Ok(s.low_cut_freq_hz),
            "HighCut Freq" => Ok(s.high_cut_freq_hz),
            "LowCut Slope" => Ok(f32::from(s.low_cut_slope.index())),
            "HighCut Slope" => Ok(f32::from(s.high_cut_slope.index())),
            _ => Err(EfectoError::UnknownParameter {
                name: name.to_string(),
            }),
        }
    }
}
