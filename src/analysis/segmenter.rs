//! Note segmentation — turns the per-frame semitone stream into notes.
//!
//! A sliding median rejects single-frame glitches and octave blips,
//! run-length grouping finds contiguous same-pitch stretches, and a
//! minimum-duration filter drops bow/breath transients. Velocity comes
//! from the loudest unfiltered frame inside each run.

use crate::config::AnalysisConfig;
use crate::note::NoteEvent;

/// Sliding median over semitone values. At the boundaries only
/// in-bounds neighbors participate, so the sequence length is preserved.
pub fn median_smooth(values: &[u8], window: usize) -> Vec<u8> {
    if window <= 1 || values.is_empty() {
        return values.to_vec();
    }
    let half = window / 2;
    let mut out = Vec::with_capacity(values.len());
    let mut scratch: Vec<u8> = Vec::with_capacity(window);
    for i in 0..values.len() {
        let lo = i.saturating_sub(half);
        let hi = (i + half + 1).min(values.len());
        scratch.clear();
        scratch.extend_from_slice(&values[lo..hi]);
        scratch.sort_unstable();
        // Lower median: keeps truncated windows at the edges from
        // widening runs into neighboring silence.
        out.push(scratch[(scratch.len() - 1) / 2]);
    }
    out
}

/// Group smoothed frame values into note events.
///
/// `values[i]` is the semitone detected in frame `i` (0 = silence),
/// `frame_rms[i]` the RMS of the same frame measured on the unfiltered
/// signal, and `frame_duration` the hop interval in seconds.
pub fn segment(
    values: &[u8],
    frame_rms: &[f64],
    frame_duration: f64,
    config: &AnalysisConfig,
) -> Vec<NoteEvent> {
    let smoothed = median_smooth(values, config.median_window);

    let mut notes = Vec::new();
    let mut run_value = 0u8;
    let mut run_start = 0usize;

    for i in 0..=smoothed.len() {
        let value = smoothed.get(i).copied().unwrap_or(0);
        if i < smoothed.len() && value == run_value {
            continue;
        }
        // Close the run that just ended (the final open run included)
        if run_value != 0 {
            close_run(
                &mut notes,
                run_value,
                run_start,
                i,
                frame_rms,
                frame_duration,
                config,
            );
        }
        run_value = value;
        run_start = i;
    }

    notes
}

fn close_run(
    notes: &mut Vec<NoteEvent>,
    value: u8,
    start: usize,
    end: usize,
    frame_rms: &[f64],
    frame_duration: f64,
    config: &AnalysisConfig,
) {
    let duration = (end - start) as f64 * frame_duration;
    if duration <= config.min_note_duration {
        return;
    }
    if value < config.min_note || value > config.max_note {
        return;
    }

    let max_rms = frame_rms[start.min(frame_rms.len())..end.min(frame_rms.len())]
        .iter()
        .cloned()
        .fold(0.0, f64::max);
    let velocity = (max_rms * config.velocity_scale).clamp(config.velocity_floor, 1.0);

    notes.push(NoteEvent {
        note_number: value,
        start_time: start as f64 * frame_duration,
        duration,
        velocity,
    });
}
