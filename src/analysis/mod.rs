//! Melody extraction — raw samples in, time-ordered note events out.
//!
//! The pipeline is strictly one-directional: the input is downmixed to
//! one analysis channel, low-passed for the pitch search while the
//! unfiltered copy feeds energy tracking, each overlapping frame yields
//! a semitone value (0 = silence), and the segmenter groups frames into
//! notes.

pub mod conditioner;
pub mod pitch;
pub mod segmenter;

use crate::buffer::SampleBuffer;
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::note::{NoteEvent, frequency_to_note};

/// Result of running extraction over a buffer. The raw per-frame values
/// are kept for diagnostics (piano-roll display, re-segmentation).
#[derive(Debug, Clone)]
pub struct Transcription {
    /// Extracted notes, time-ordered by start.
    pub notes: Vec<NoteEvent>,
    /// Semitone value per analysis frame, 0 where nothing was detected.
    pub frame_values: Vec<u8>,
    /// Hop interval between frames in seconds.
    pub frame_duration: f64,
}

/// Extract note events from a recording.
///
/// Degenerate input (silence, noise) produces an empty note list, not
/// an error; only malformed buffers fail.
pub fn extract_notes(
    buffer: &SampleBuffer,
    config: &AnalysisConfig,
) -> Result<Transcription, AnalysisError> {
    if config.window_size == 0 || config.hop_size == 0 || config.hop_size > config.window_size {
        return Err(AnalysisError::InvalidFraming {
            window: config.window_size,
            hop: config.hop_size,
        });
    }

    let mono = buffer.downmix_mono();
    let raw = mono.samples();
    let sample_rate = mono.sample_rate();

    log::debug!(
        "extracting notes: {} samples at {} Hz, window {} hop {}",
        raw.len(),
        sample_rate,
        config.window_size,
        config.hop_size
    );

    let filtered = conditioner::lowpass(raw, sample_rate, config.lowpass_cutoff_hz);

    // Energy from the unfiltered signal; pitch from the filtered one.
    // The unfiltered RMS also drives the silence gate, since the
    // low-pass attenuates loudness near and above its cutoff.
    let energies = conditioner::frame_rms(raw, config.window_size, config.hop_size);
    let frame_values: Vec<u8> =
        conditioner::frame_starts(filtered.len(), config.window_size, config.hop_size)
            .zip(energies.iter())
            .map(|(start, &energy)| {
                let frame = &filtered[start..start + config.window_size];
                let estimate = pitch::detect_pitch(frame, energy, sample_rate, config);
                frequency_to_note(estimate.frequency)
            })
            .collect();

    let frame_duration = config.hop_size as f64 / sample_rate as f64;
    let notes = segmenter::segment(&frame_values, &energies, frame_duration, config);

    log::debug!(
        "extraction finished: {} frames, {} pitched, {} notes",
        frame_values.len(),
        frame_values.iter().filter(|&&v| v != 0).count(),
        notes.len()
    );

    Ok(Transcription {
        notes,
        frame_values,
        frame_duration,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn sine_buffer(freq: f64, amplitude: f64, seconds: f64, sample_rate: u32) -> SampleBuffer {
        let n = (sample_rate as f64 * seconds) as usize;
        let samples: Vec<f64> = (0..n)
            .map(|i| amplitude * (2.0 * PI * freq * i as f64 / sample_rate as f64).sin())
            .collect();
        SampleBuffer::mono(samples, sample_rate).unwrap()
    }

    #[test]
    fn steady_a4_yields_single_note() {
        let buffer = sine_buffer(440.0, 0.5, 1.0, 44100);
        let result = extract_notes(&buffer, &AnalysisConfig::default()).unwrap();

        assert_eq!(result.notes.len(), 1, "got {:?}", result.notes);
        let note = &result.notes[0];
        assert_eq!(note.note_number, 69);
        assert!(
            note.duration > 0.9 && note.duration < 1.1,
            "duration should be within 90–110% of 1.0s, got {}",
            note.duration
        );
        assert!(note.velocity > 0.3, "velocity was {}", note.velocity);
    }

    #[test]
    fn silent_buffer_yields_no_notes() {
        let buffer = SampleBuffer::mono(vec![0.0; 44100], 44100).unwrap();
        let result = extract_notes(&buffer, &AnalysisConfig::default()).unwrap();
        assert!(result.notes.is_empty());
        assert!(result.frame_values.iter().all(|&v| v == 0));
    }

    #[test]
    fn two_tone_melody_yields_two_notes() {
        let sample_rate = 44100u32;
        let mut samples = Vec::new();
        for &freq in &[440.0, 523.25] {
            for i in 0..(sample_rate as usize / 2) {
                let t = i as f64 / sample_rate as f64;
                samples.push(0.5 * (2.0 * PI * freq * t).sin());
            }
        }
        let buffer = SampleBuffer::mono(samples, sample_rate).unwrap();
        let result = extract_notes(&buffer, &AnalysisConfig::default()).unwrap();

        let numbers: Vec<u8> = result.notes.iter().map(|n| n.note_number).collect();
        assert_eq!(numbers, vec![69, 72], "got {:?}", result.notes);
    }

    #[test]
    fn quiet_tone_near_cutoff_survives_the_silence_gate() {
        // 1150 Hz sits above the 1 kHz conditioning cutoff; the raw
        // RMS (~0.011) clears the gate even though the filtered copy
        // does not.
        let buffer = sine_buffer(1150.0, 0.016, 1.0, 44100);
        let result = extract_notes(&buffer, &AnalysisConfig::default()).unwrap();
        assert_eq!(result.notes.len(), 1, "got {:?}", result.notes);
        assert_eq!(result.notes[0].note_number, 86);
    }

    #[test]
    fn degenerate_framing_is_a_hard_error() {
        let buffer = sine_buffer(440.0, 0.5, 0.1, 44100);

        let cfg = AnalysisConfig {
            hop_size: 0,
            ..Default::default()
        };
        assert!(matches!(
            extract_notes(&buffer, &cfg),
            Err(AnalysisError::InvalidFraming { .. })
        ));

        let cfg = AnalysisConfig {
            window_size: 0,
            hop_size: 0,
            ..Default::default()
        };
        assert!(extract_notes(&buffer, &cfg).is_err());

        let defaults = AnalysisConfig::default();
        let cfg = AnalysisConfig {
            hop_size: defaults.window_size + 1,
            ..defaults
        };
        assert!(extract_notes(&buffer, &cfg).is_err());
    }

    #[test]
    fn stereo_input_is_downmixed() {
        let sample_rate = 44100u32;
        let n = sample_rate as usize / 2;
        let mut interleaved = Vec::with_capacity(n * 2);
        for i in 0..n {
            let t = i as f64 / sample_rate as f64;
            let s = 0.5 * (2.0 * PI * 440.0 * t).sin();
            interleaved.push(s);
            interleaved.push(s);
        }
        let buffer = SampleBuffer::new(interleaved, sample_rate, 2).unwrap();
        let result = extract_notes(&buffer, &AnalysisConfig::default()).unwrap();
        assert_eq!(result.notes.len(), 1);
        assert_eq!(result.notes[0].note_number, 69);
    }
}
