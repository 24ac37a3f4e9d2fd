//! Signal conditioning — low-pass pre-filter, framing, and energy tracking.
//!
//! The pitch detector runs on a low-passed copy of the input so upper
//! harmonics don't pull the difference function off the fundamental.
//! Energy (RMS) is always measured on the *unfiltered* signal, because
//! the pre-filter attenuates loudness estimates.

use std::f64::consts::PI;

/// Apply a single-pole low-pass (exponential moving average) and return
/// the filtered copy. `alpha = dt / (rc + dt)` with `rc = 1 / (2π·cutoff)`.
pub fn lowpass(samples: &[f64], sample_rate: u32, cutoff_hz: f64) -> Vec<f64> {
    let dt = 1.0 / sample_rate as f64;
    let rc = 1.0 / (2.0 * PI * cutoff_hz);
    let alpha = dt / (rc + dt);

    let mut out = Vec::with_capacity(samples.len());
    let mut prev = 0.0;
    for &x in samples {
        prev += alpha * (x - prev);
        out.push(prev);
    }
    out
}

/// Root-mean-square of a slice.
pub fn rms(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = samples.iter().map(|s| s * s).sum();
    (sum_sq / samples.len() as f64).sqrt()
}

/// Start offsets of every full analysis window.
pub fn frame_starts(len: usize, window: usize, hop: usize) -> impl Iterator<Item = usize> {
    (0..)
        .map(move |i| i * hop)
        .take_while(move |&start| start + window <= len)
}

/// Per-frame RMS over the given (unfiltered) signal.
pub fn frame_rms(samples: &[f64], window: usize, hop: usize) -> Vec<f64> {
    frame_starts(samples.len(), window, hop)
        .map(|start| rms(&samples[start..start + window]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f64, sample_rate: u32, seconds: f64) -> Vec<f64> {
        let n = (sample_rate as f64 * seconds) as usize;
        (0..n)
            .map(|i| (2.0 * PI * freq * i as f64 / sample_rate as f64).sin())
            .collect()
    }

    #[test]
    fn lowpass_passes_low_frequency() {
        let input = sine(100.0, 44100, 0.5);
        let out = lowpass(&input, 44100, 1000.0);
        // Skip the settle-in transient, then compare energy
        let in_rms = rms(&input[4410..]);
        let out_rms = rms(&out[4410..]);
        assert!(
            out_rms > in_rms * 0.9,
            "100Hz through 1kHz lowpass should be nearly unattenuated: {out_rms} vs {in_rms}"
        );
    }

    #[test]
    fn lowpass_attenuates_high_frequency() {
        let input = sine(8000.0, 44100, 0.5);
        let out = lowpass(&input, 44100, 1000.0);
        let in_rms = rms(&input[4410..]);
        let out_rms = rms(&out[4410..]);
        assert!(
            out_rms < in_rms * 0.3,
            "8kHz through 1kHz lowpass should be strongly attenuated: {out_rms} vs {in_rms}"
        );
    }

    #[test]
    fn rms_of_constant() {
        assert!((rms(&[0.5; 100]) - 0.5).abs() < 1e-12);
        assert_eq!(rms(&[]), 0.0);
    }

    #[test]
    fn rms_of_sine_is_amplitude_over_sqrt2() {
        let s = sine(440.0, 44100, 1.0);
        let expected = 1.0 / 2.0_f64.sqrt();
        assert!((rms(&s) - expected).abs() < 0.01);
    }

    #[test]
    fn frame_starts_respect_bounds() {
        let starts: Vec<usize> = frame_starts(1000, 256, 128).collect();
        assert_eq!(starts.first(), Some(&0));
        for &s in &starts {
            assert!(s + 256 <= 1000);
        }
        // 0, 128, ..., 744 is the last start with a full window
        assert_eq!(starts.last(), Some(&640));
    }

    #[test]
    fn frame_rms_counts_match_frames() {
        let samples = vec![0.25; 4096];
        let energies = frame_rms(&samples, 1024, 256);
        assert_eq!(energies.len(), frame_starts(4096, 1024, 256).count());
        assert!(energies.iter().all(|&e| (e - 0.25).abs() < 1e-12));
    }
}
