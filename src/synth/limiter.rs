//! Output limiter — protects the summed mix from clipping.
//!
//! A feed-forward peak limiter with fixed threshold, ratio, attack and
//! release; the envelope follower and gain computation follow the
//! standard dB-domain design.

/// Fixed limiter parameters shared by all renders.
const THRESHOLD_DB: f64 = -1.0;
const RATIO: f64 = 20.0;
const ATTACK_SECONDS: f64 = 0.002;
const RELEASE_SECONDS: f64 = 0.1;

/// A mono peak limiter.
#[derive(Debug, Clone)]
pub struct Limiter {
    sample_rate: f64,
    envelope: f64,
}

impl Limiter {
    pub fn new(sample_rate: f64) -> Self {
        Self {
            sample_rate,
            envelope: 0.0,
        }
    }

    #[inline]
    fn linear_to_db(linear: f64) -> f64 {
        if linear <= 0.0 {
            -120.0
        } else {
            20.0 * linear.log10()
        }
    }

    #[inline]
    fn db_to_linear(db: f64) -> f64 {
        10.0_f64.powf(db / 20.0)
    }

    /// Gain reduction in dB for a given input level (hard knee).
    #[inline]
    fn compute_gain(input_db: f64) -> f64 {
        if input_db <= THRESHOLD_DB {
            0.0
        } else {
            (THRESHOLD_DB - input_db) * (1.0 - 1.0 / RATIO)
        }
    }

    /// Process a single sample.
    #[inline]
    pub fn process(&mut self, input: f64) -> f64 {
        let level = input.abs();

        let attack_coef = (-1.0 / (ATTACK_SECONDS * self.sample_rate)).exp();
        let release_coef = (-1.0 / (RELEASE_SECONDS * self.sample_rate)).exp();

        if level > self.envelope {
            self.envelope = attack_coef * self.envelope + (1.0 - attack_coef) * level;
        } else {
            self.envelope = release_coef * self.envelope + (1.0 - release_coef) * level;
        }

        let gain = Self::db_to_linear(Self::compute_gain(Self::linear_to_db(self.envelope)));
        input * gain
    }

    /// Limit a whole buffer in place.
    pub fn process_buffer(&mut self, buffer: &mut [f64]) {
        for s in buffer.iter_mut() {
            *s = self.process(*s);
        }
    }

    /// Reset the follower state.
    pub fn reset(&mut self) {
        self.envelope = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_signal_passes_through() {
        let mut limiter = Limiter::new(44100.0);
        // Settle the follower
        for _ in 0..4410 {
            limiter.process(0.1);
        }
        let out = limiter.process(0.1);
        assert!(
            (out - 0.1).abs() < 0.005,
            "below threshold output should match input: {out}"
        );
    }

    #[test]
    fn loud_signal_is_reduced() {
        let mut limiter = Limiter::new(44100.0);
        for _ in 0..4410 {
            limiter.process(2.0);
        }
        let out = limiter.process(2.0);
        assert!(out < 1.1, "sustained +6dB input should be pulled down: {out}");
        assert!(out > 0.5, "limiter should not mute the signal: {out}");
    }

    #[test]
    fn gain_recovers_after_peak() {
        let mut limiter = Limiter::new(44100.0);
        for _ in 0..4410 {
            limiter.process(2.0);
        }
        let pressed = limiter.process(0.2);
        // Let the release run
        for _ in 0..44100 {
            limiter.process(0.2);
        }
        let recovered = limiter.process(0.2);
        assert!(
            recovered > pressed,
            "gain should recover: {pressed} -> {recovered}"
        );
    }

    #[test]
    fn silence_is_untouched() {
        let mut limiter = Limiter::new(44100.0);
        let mut buffer = vec![0.0; 1024];
        limiter.process_buffer(&mut buffer);
        assert!(buffer.iter().all(|&s| s == 0.0));
    }
}
