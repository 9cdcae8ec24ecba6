//! Reverb stage
//!
//! Freeverb-style algorithmic reverb: 8 parallel lowpass-feedback comb
//! filters followed by 4 series allpass filters for diffusion. Each
//! channel chain owns one mono instance.
//!
//! Two controls steer the stage:
//! - `set_mix` — the dry/wet blend (0 = dry, 1 = fully wet)
//! - `set_amount` — reverb amount; scales both the comb feedback (tail
//!   length) and the wet contribution, so amount 0 makes the stage an
//!   exact pass-through
//!
//! All delay buffers are allocated in `prepare`; `process` never
//! touches the heap.

/// Reference sample rate the delay constants are tuned for
const REFERENCE_SAMPLE_RATE: f64 = 44100.0;

/// Comb filter delays at 44100 Hz
const COMB_DELAYS: [usize; 8] = [1116, 1188, 1277, 1356, 1422, 1491, 1557, 1617];

/// Allpass filter delays at 44100 Hz
const ALLPASS_DELAYS: [usize; 4] = [556, 441, 341, 225];

/// Fixed gain for allpass filters
const ALLPASS_GAIN: f32 = 0.5;

/// Feedback mapping: feedback = amount * ROOM_SCALE + ROOM_OFFSET
const ROOM_SCALE: f32 = 0.28;
const ROOM_OFFSET: f32 = 0.7;

/// Fixed damping for the comb feedback low-pass
const DAMPING: f32 = 0.2;

/// Lowpass-feedback comb filter
#[derive(Debug, Clone)]
struct CombFilter {
    buffer: Vec<f32>,
    write_pos: usize,
    mask: usize,
    delay: usize,
    filter_state: f32,
    feedback: f32,
}

impl CombFilter {
    fn new(delay: usize) -> Self {
        let size = (delay + 1).next_power_of_two();
        Self {
            buffer: vec![0.0; size],
            write_pos: 0,
            mask: size - 1,
            delay,
            filter_state: 0.0,
            feedback: ROOM_OFFSET,
        }
    }

    fn set_feedback(&mut self, feedback: f32) {
        self.feedback = feedback;
    }

    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let read_pos = (self.write_pos + self.mask + 1 - self.delay) & self.mask;
        let output = self.buffer[read_pos];

        // One-pole low-pass in the feedback path (damping)
        self.filter_state = output * (1.0 - DAMPING) + self.filter_state * DAMPING;

        self.buffer[self.write_pos] = input + self.filter_state * self.feedback;
        self.write_pos = (self.write_pos + 1) & self.mask;

        output
    }

    fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.filter_state = 0.0;
        self.write_pos = 0;
    }
}

/// Allpass diffusion filter
#[derive(Debug, Clone)]
struct AllpassFilter {
    buffer: Vec<f32>,
    write_pos: usize,
    mask: usize,
    delay: usize,
}

impl AllpassFilter {
    fn new(delay: usize) -> Self {
        let size = (delay + 1).next_power_of_two();
        Self {
            buffer: vec![0.0; size],
            write_pos: 0,
            mask: size - 1,
            delay,
        }
    }

    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let read_pos = (self.write_pos + self.mask + 1 - self.delay) & self.mask;
        let delayed = self.buffer[read_pos];

        let output = delayed - ALLPASS_GAIN * input;
        self.buffer[self.write_pos] = input + ALLPASS_GAIN * output;
        self.write_pos = (self.write_pos + 1) & self.mask;

        output
    }

    fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}

/// Mono Freeverb reverb stage
#[derive(Debug, Clone)]
pub struct ReverbStage {
    combs: [CombFilter; 8],
    allpasses: [AllpassFilter; 4],
    sample_rate: f64,
    /// Dry/wet blend requested by the host, 0..=1
    mix: f32,
    /// Reverb amount, 0..=1
    amount: f32,
    /// Wet level actually applied (mix scaled by amount)
    wet_level: f32,
}

impl Default for ReverbStage {
    fn default() -> Self {
        Self::new()
    }
}

impl ReverbStage {
    pub fn new() -> Self {
        let mut stage = Self {
            combs: std::array::from_fn(|i| CombFilter::new(COMB_DELAYS[i])),
            allpasses: std::array::from_fn(|i| AllpassFilter::new(ALLPASS_DELAYS[i])),
            sample_rate: REFERENCE_SAMPLE_RATE,
            mix: 0.5,
            amount: 0.0,
            wet_level: 0.0,
        };
        stage.update_levels();
        stage
    }

    /// Set the dry/wet blend (clamped to 0..=1)
    ///
    /// The wet share `process` actually applies is `mix * amount`: a
    /// fully wet mix still passes dry signal until the amount reaches
    /// 1, and amount 0 keeps the stage a pass-through at any mix.
    pub fn set_mix(&mut self, mix: f32) {
        self.mix = mix.clamp(0.0, 1.0);
        self.update_levels();
    }

    /// Set the reverb amount (clamped to 0..=1)
    ///
    /// Scales both comb feedback and the wet level; amount 0 yields a
    /// pass-through stage.
    pub fn set_amount(&mut self, amount: f32) {
        self.amount = amount.clamp(0.0, 1.0);
        let feedback = self.amount * ROOM_SCALE + ROOM_OFFSET;
        for comb in &mut self.combs {
            comb.set_feedback(feedback);
        }
        self.update_levels();
    }

    fn update_levels(&mut self) {
        self.wet_level = self.mix * self.amount;
    }

    /// Rebuild delay lines for the given sample rate
    ///
    /// The only allocation point of the stage; call before playback and
    /// on sample-rate changes.
    pub fn prepare(&mut self, sample_rate: f64, _max_block_size: usize) {
        self.sample_rate = sample_rate;
        let scale = sample_rate / REFERENCE_SAMPLE_RATE;

        let feedback = self.amount * ROOM_SCALE + ROOM_OFFSET;
        self.combs = std::array::from_fn(|i| {
            let delay = ((COMB_DELAYS[i] as f64 * scale) as usize).max(1);
            let mut comb = CombFilter::new(delay);
            comb.set_feedback(feedback);
            comb
        });
        self.allpasses = std::array::from_fn(|i| {
            let delay = ((ALLPASS_DELAYS[i] as f64 * scale) as usize).max(1);
            AllpassFilter::new(delay)
        });
    }

    /// Blend reverberated signal with the dry input, in place
    pub fn process(&mut self, samples: &mut [f32]) {
        if self.wet_level <= 0.0 {
            // Pass-through; the tail buffers stay untouched so a later
            // amount change starts from silence, not stale state
            return;
        }

        let wet = self.wet_level;
        let dry = 1.0 - wet;

        for sample in samples.iter_mut() {
            let input = *sample;

            let mut comb_sum = 0.0;
            for comb in &mut self.combs {
                comb_sum += comb.process(input);
            }

            let mut output = comb_sum;
            for allpass in &mut self.allpasses {
                output = allpass.process(output);
            }

            *sample = input * dry + output * wet;
        }
    }

    /// Clear all delay lines
    pub fn reset(&mut self) {
        for comb in &mut self.combs {
            comb.clear();
        }
        for allpass in &mut self.allpasses {
            allpass.clear();
        }
    }
}
