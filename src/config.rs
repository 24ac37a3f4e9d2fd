//! Configuration parameters for melody extraction.

use serde::{Deserialize, Serialize};

/// Tunable parameters for the analysis pipeline.
///
/// All defaults are calibrated for monophonic instrument recordings
/// (guitar, voice, wind) at common sample rates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Analysis window length in samples (default: 2048).
    pub window_size: usize,

    /// Hop between consecutive windows in samples (default: 512).
    /// Must be smaller than `window_size` so frames overlap.
    pub hop_size: usize,

    /// Cutoff of the single-pole low-pass pre-filter in Hz (default: 1000.0).
    /// Suppresses harmonics above the fundamental range before the
    /// difference-function search.
    pub lowpass_cutoff_hz: f64,

    /// Lowest candidate fundamental in Hz (default: 70.0).
    pub min_frequency_hz: f64,

    /// Highest candidate fundamental in Hz (default: 1200.0).
    pub max_frequency_hz: f64,

    /// Absolute RMS below which a frame is treated as silence and the
    /// lag search is skipped entirely (default: 0.01).
    pub silence_rms: f64,

    /// Periodicity gate: a frame is rejected as non-periodic when the best
    /// mean absolute difference exceeds this fraction of the frame RMS
    /// (default: 0.8).
    pub clarity_threshold: f64,

    /// Sliding median window over per-frame semitone values, in frames.
    /// Must be odd (default: 5).
    pub median_window: usize,

    /// Runs lasting no longer than this are discarded as transients,
    /// in seconds; comparison is strict (default: 0.060).
    pub min_note_duration: f64,

    /// Velocity mapping: `clamp(max_rms * scale, floor, 1.0)`.
    pub velocity_scale: f64,
    /// Lower bound of the velocity mapping (default: 0.3).
    pub velocity_floor: f64,

    /// Lowest note number accepted by extraction (default: 36).
    pub min_note: u8,
    /// Highest note number accepted by extraction (default: 96).
    pub max_note: u8,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            window_size: 2048,
            hop_size: 512,
            lowpass_cutoff_hz: 1000.0,
            min_frequency_hz: 70.0,
            max_frequency_hz: 1200.0,
            silence_rms: 0.01,
            clarity_threshold: 0.8,
            median_window: 5,
            min_note_duration: 0.060,
            velocity_scale: 4.0,
            velocity_floor: 0.3,
            min_note: 36,
            max_note: 96,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_consistent() {
        let cfg = AnalysisConfig::default();
        assert!(cfg.hop_size < cfg.window_size, "frames must overlap");
        assert_eq!(cfg.median_window % 2, 1, "median window must be odd");
        assert!(cfg.min_frequency_hz < cfg.max_frequency_hz);
        assert!(cfg.min_note < cfg.max_note);
    }

    #[test]
    fn config_json_round_trip() {
        let cfg = AnalysisConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: AnalysisConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.window_size, cfg.window_size);
        assert_eq!(back.min_note_duration, cfg.min_note_duration);
        assert_eq!(back.velocity_floor, cfg.velocity_floor);
    }
}
