//! Standard MIDI File (format 0) writer for note event lists.
//!
//! One track, 480 ticks per quarter note, a fixed 120 BPM tempo meta
//! event, so one second of wall time is exactly 960 ticks.

use crate::note::{velocity_to_midi, NoteEvent};

/// Ticks per quarter note declared in the header.
pub const TICKS_PER_QUARTER: u16 = 480;

/// Microseconds per quarter note at 120 BPM.
const TEMPO_MICROS: u32 = 500_000;

/// Ticks per second at 120 BPM with 480 TPQN.
const TICKS_PER_SECOND: f64 = 960.0;

/// Encode a note list as a format-0 Standard MIDI File.
///
/// Returns `None` when the list is empty; an empty performance has no
/// file, not an empty one.
pub fn encode_midi(notes: &[NoteEvent], track_label: &str) -> Option<Vec<u8>> {
    if notes.is_empty() {
        return None;
    }

    let track = encode_track(notes, track_label);

    let mut out = Vec::with_capacity(14 + 8 + track.len());
    out.extend_from_slice(b"MThd");
    out.extend_from_slice(&6u32.to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes()); // format 0
    out.extend_from_slice(&1u16.to_be_bytes()); // one track
    out.extend_from_slice(&TICKS_PER_QUARTER.to_be_bytes());

    out.extend_from_slice(b"MTrk");
    out.extend_from_slice(&(track.len() as u32).to_be_bytes());
    out.extend_from_slice(&track);
    Some(out)
}

/// One channel-voice instant in the flattened event stream.
struct Instant {
    tick: u64,
    status: u8,
    note: u8,
    velocity: u8,
}

fn encode_track(notes: &[NoteEvent], track_label: &str) -> Vec<u8> {
    let mut instants = Vec::with_capacity(notes.len() * 2);
    for event in notes {
        let note = event.note_number.clamp(1, 127);
        instants.push(Instant {
            tick: (event.start_time * TICKS_PER_SECOND).round() as u64,
            status: 0x90,
            note,
            velocity: velocity_to_midi(event.velocity),
        });
        instants.push(Instant {
            tick: (event.end_time() * TICKS_PER_SECOND).round() as u64,
            status: 0x80,
            note,
            velocity: 0,
        });
    }
    // stable sort keeps a note-off ahead of a re-strike on the same tick
    instants.sort_by_key(|instant| instant.tick);

    let mut track = Vec::new();

    // tempo meta
    write_vlq(&mut track, 0);
    track.extend_from_slice(&[0xFF, 0x51, 0x03]);
    track.extend_from_slice(&TEMPO_MICROS.to_be_bytes()[1..4]);

    // track name meta
    let label = track_label.as_bytes();
    write_vlq(&mut track, 0);
    track.extend_from_slice(&[0xFF, 0x03]);
    write_vlq(&mut track, label.len() as u64);
    track.extend_from_slice(label);

    let mut cursor = 0u64;
    for instant in &instants {
        write_vlq(&mut track, instant.tick - cursor);
        track.extend_from_slice(&[instant.status, instant.note, instant.velocity]);
        cursor = instant.tick;
    }

    // end of track
    write_vlq(&mut track, 0);
    track.extend_from_slice(&[0xFF, 0x2F, 0x00]);
    track
}

/// Variable-length quantity: 7 bits per byte, most significant group
/// first, high bit set on every byte but the last.
fn write_vlq(out: &mut Vec<u8>, mut value: u64) {
    let mut groups = [0u8; 10];
    let mut count = 0;
    loop {
        groups[count] = (value & 0x7F) as u8;
        count += 1;
        value >>= 7;
        if value == 0 {
            break;
        }
    }
    for i in (0..count).rev() {
        let continuation = if i == 0 { 0x00 } else { 0x80 };
        out.push(groups[i] | continuation);
    }
}
