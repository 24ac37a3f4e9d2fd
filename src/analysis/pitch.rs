//! Monophonic pitch detection via an average-magnitude-difference search.
//!
//! For each candidate lag τ the frame is compared against itself shifted
//! by τ; the lag minimizing the mean absolute difference is the
//! fundamental period. Aperiodic frames are rejected by comparing that
//! minimum against the frame's own RMS.

use crate::analysis::conditioner::rms;
use crate::config::AnalysisConfig;

/// Extra mean difference, as a fraction of frame RMS, a shorter lag may
/// carry and still be preferred over the global minimum.
const SUBPERIOD_SLACK: f64 = 0.1;

/// Outcome of pitch detection on one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct PitchEstimate {
    /// Estimated fundamental in Hz, or 0.0 when the frame is silent
    /// or non-periodic.
    pub frequency: f64,
    /// Periodicity measure in [0, 1] — 1.0 is a perfectly repeating
    /// frame, 0.0 means no usable period was found.
    pub clarity: f64,
}

impl PitchEstimate {
    /// The "no pitch" result used for silent and aperiodic frames.
    pub fn unpitched() -> Self {
        Self {
            frequency: 0.0,
            clarity: 0.0,
        }
    }

    pub fn is_pitched(&self) -> bool {
        self.frequency > 0.0
    }
}

/// Detect the fundamental frequency of one analysis frame.
///
/// `frame` is the conditioned (low-passed) signal the lag search runs
/// on; `energy` is the RMS of the *unconditioned* frame, so loudness
/// gating is not skewed by filter attenuation. Frames whose energy is
/// below `config.silence_rms` are rejected before the search runs. A
/// frame whose best mean difference exceeds `config.clarity_threshold`
/// × RMS is rejected as non-periodic.
pub fn detect_pitch(
    frame: &[f64],
    energy: f64,
    sample_rate: u32,
    config: &AnalysisConfig,
) -> PitchEstimate {
    let sr = sample_rate as f64;
    if energy < config.silence_rms {
        return PitchEstimate::unpitched();
    }
    let frame_rms = rms(frame);
    if frame_rms == 0.0 {
        return PitchEstimate::unpitched();
    }

    let min_lag = (sr / config.max_frequency_hz).floor().max(1.0) as usize;
    let max_lag = ((sr / config.min_frequency_hz).floor() as usize).min(frame.len() - 1);
    if min_lag >= max_lag {
        return PitchEstimate::unpitched();
    }

    // Fixed comparison span so sums are comparable across lags.
    let span = frame.len() - max_lag;
    if span < min_lag {
        return PitchEstimate::unpitched();
    }

    let mut best_lag = 0usize;
    let mut best_sum = f64::INFINITY;
    for lag in min_lag..=max_lag {
        let mut sum = 0.0;
        for j in 0..span {
            sum += (frame[j] - frame[j + lag]).abs();
            // Partial sum already worse than the best lag; bail early.
            if sum >= best_sum {
                break;
            }
        }
        if sum < best_sum {
            best_sum = sum;
            best_lag = lag;
        }
    }

    if best_lag == 0 {
        return PitchEstimate::unpitched();
    }

    // Every integer multiple of the true period is a near-zero minimum
    // too, and a longer multiple can align better with a non-integer
    // period than the period itself (a 100.23-sample period scores lag
    // 401 below lag 100). Take the first lag, scanning upward, whose
    // sum comes within a small slack of the winner, then settle into
    // its local minimum.
    let gate = config.clarity_threshold * frame_rms * span as f64;
    let threshold = (best_sum + SUBPERIOD_SLACK * frame_rms * span as f64).min(gate);
    for lag in min_lag..best_lag {
        let sum = lag_sum(frame, lag, span, threshold);
        if sum > threshold {
            continue;
        }
        let (mut lag, mut sum) = (lag, sum);
        while lag < max_lag {
            let next = lag_sum(frame, lag + 1, span, sum);
            if next < sum {
                lag += 1;
                sum = next;
            } else {
                break;
            }
        }
        best_lag = lag;
        best_sum = sum;
        break;
    }

    let mean_difference = best_sum / span as f64;
    if mean_difference > config.clarity_threshold * frame_rms {
        return PitchEstimate::unpitched();
    }

    PitchEstimate {
        frequency: sr / best_lag as f64,
        clarity: (1.0 - mean_difference / frame_rms).clamp(0.0, 1.0),
    }
}

/// AMDF sum at one lag, bailing once the running sum exceeds `bail`.
/// The partial sum is monotone, so a bailed result still compares
/// correctly against `bail`.
fn lag_sum(frame: &[f64], lag: usize, span: usize, bail: f64) -> f64 {
    let mut sum = 0.0;
    for j in 0..span {
        sum += (frame[j] - frame[j + lag]).abs();
        if sum > bail {
            break;
        }
    }
    sum
}
