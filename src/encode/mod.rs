//! Binary container writers.
//!
//! Two encoders, both producing plain byte vectors the caller can
//! write wherever it likes: a 16-bit PCM WAV writer for rendered
//! audio, and a format-0 Standard MIDI File writer for note lists.

pub mod midi;
pub mod wav;

pub use midi::{encode_midi, TICKS_PER_QUARTER};
pub use wav::encode_wav;
