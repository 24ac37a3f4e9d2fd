//! Note events and pitch/frequency conversions.

use serde::{Deserialize, Serialize};

/// Note number of A4 in the equal-temperament mapping.
pub const A4_NOTE: u8 = 69;
/// Reference frequency for A4 in Hz.
pub const A4_FREQUENCY: f64 = 440.0;

/// A discrete note extracted from (or rendered into) audio.
///
/// Lists of note events are time-ordered by `start_time` once produced
/// by the segmenter; a finished list is never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteEvent {
    /// Semitone index, A4 = 69.
    pub note_number: u8,
    /// Onset in seconds from the start of the recording.
    pub start_time: f64,
    /// Length in seconds, always positive.
    pub duration: f64,
    /// Normalized loudness in [0, 1].
    pub velocity: f64,
}

impl NoteEvent {
    /// Fundamental frequency of this note in Hz.
    pub fn frequency(&self) -> f64 {
        note_to_frequency(self.note_number)
    }

    /// End of the note in seconds.
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }
}

/// Convert a note number to frequency: `440 · 2^((n − 69) / 12)`.
pub fn note_to_frequency(note: u8) -> f64 {
    A4_FREQUENCY * (2.0_f64).powf((note as f64 - A4_NOTE as f64) / 12.0)
}

/// Convert a frequency to the nearest note number.
///
/// Returns 0 (the "no pitch" sentinel) for non-positive frequencies;
/// otherwise the result is clamped to 1..=127.
pub fn frequency_to_note(freq: f64) -> u8 {
    if freq <= 0.0 {
        return 0;
    }
    let exact = A4_NOTE as f64 + 12.0 * (freq / A4_FREQUENCY).log2();
    exact.round().clamp(1.0, 127.0) as u8
}

/// Map a normalized velocity to the 10–127 range used by the
/// note-event container, so extracted notes never encode as silent.
pub fn velocity_to_midi(velocity: f64) -> u8 {
    let v = velocity.clamp(0.0, 1.0);
    (10.0 + v * 117.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a4_is_440() {
        assert!((note_to_frequency(69) - 440.0).abs() < 1e-9);
    }

    #[test]
    fn octaves_double() {
        assert!((note_to_frequency(81) - 880.0).abs() < 1e-9);
        assert!((note_to_frequency(57) - 220.0).abs() < 1e-9);
    }

    #[test]
    fn c4_frequency() {
        let f = note_to_frequency(60);
        assert!((f - 261.63).abs() < 0.01, "C4 should be ~261.63Hz, got {f}");
    }

    #[test]
    fn frequency_round_trips_through_note() {
        for note in 36..=96u8 {
            assert_eq!(frequency_to_note(note_to_frequency(note)), note);
        }
    }

    #[test]
    fn slightly_detuned_frequency_rounds_to_nearest() {
        // 441 Hz is ~4 cents sharp of A4
        assert_eq!(frequency_to_note(441.0), 69);
        // Quarter-tone boundary between A4 and A♯4: 440·2^(1/24) ≈ 452.89 Hz
        assert_eq!(frequency_to_note(452.8), 69);
        assert_eq!(frequency_to_note(453.0), 70);
    }

    #[test]
    fn zero_frequency_is_silence() {
        assert_eq!(frequency_to_note(0.0), 0);
        assert_eq!(frequency_to_note(-10.0), 0);
    }

    #[test]
    fn velocity_mapping_bounds() {
        assert_eq!(velocity_to_midi(0.0), 10);
        assert_eq!(velocity_to_midi(1.0), 127);
        assert_eq!(velocity_to_midi(2.0), 127);
        let mid = velocity_to_midi(0.5);
        assert!(mid > 10 && mid < 127);
    }

    #[test]
    fn note_event_json_round_trip() {
        let note = NoteEvent {
            note_number: 64,
            start_time: 1.25,
            duration: 0.5,
            velocity: 0.8,
        };
        let json = serde_json::to_string(&note).unwrap();
        let back: NoteEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, note);
    }
}
