//! # retimbre
//!
//! Offline monophonic transcription and resynthesis. A recording goes
//! in one end as a float sample buffer; notes come out of the analysis
//! stage; the synthesis stage plays those notes back on one of three
//! virtual instruments; the encoders turn either result into a WAV or
//! Standard MIDI File byte stream.
//!
//! Every stage is a pure function of its inputs. Synthesis takes an
//! explicit seed, so the same notes, instrument, rate and seed always
//! produce the same bytes.

pub mod analysis;
pub mod buffer;
pub mod config;
pub mod encode;
pub mod error;
pub mod note;
pub mod synth;

pub use analysis::Transcription;
pub use buffer::SampleBuffer;
pub use config::AnalysisConfig;
pub use error::RetimbreError;
pub use note::NoteEvent;
pub use synth::Instrument;

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Seed used by callers that do not care which seed they get.
pub const DEFAULT_RENDER_SEED: u64 = 0x5EED_0A11;

/// Extract a note sequence from a recording using the default analysis
/// configuration. See [`analysis::extract_notes`] for the configurable
/// form.
pub fn transcribe(buffer: &SampleBuffer) -> Result<Transcription, RetimbreError> {
    Ok(analysis::extract_notes(buffer, &AnalysisConfig::default())?)
}

/// Render a note list on an instrument into a new mono buffer.
///
/// The output covers `total_duration` plus a fixed release/reverb tail.
/// Pass [`DEFAULT_RENDER_SEED`] unless reproducing a specific render.
pub fn perform(
    notes: &[NoteEvent],
    instrument: Instrument,
    sample_rate: u32,
    total_duration: f64,
    seed: u64,
) -> Result<SampleBuffer, RetimbreError> {
    let samples = synth::render(notes, instrument, sample_rate, total_duration, seed)?;
    // render output is mono and non-empty by construction
    Ok(SampleBuffer::mono(samples, sample_rate)?)
}

/// Encode a rendered buffer as a 16-bit PCM WAV byte stream.
pub fn export_wav(buffer: &SampleBuffer) -> Vec<u8> {
    encode::encode_wav(buffer)
}

/// Encode a note list as a format-0 Standard MIDI File, or `None` when
/// the list is empty.
pub fn export_midi(notes: &[NoteEvent], track_label: &str) -> Option<Vec<u8>> {
    encode::encode_midi(notes, track_label)
}
