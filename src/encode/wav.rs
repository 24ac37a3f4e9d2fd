//! Uncompressed linear-PCM container writer (RIFF/WAVE, 16-bit).

use crate::buffer::SampleBuffer;

/// Encode a sample buffer as a 16-bit PCM WAV byte stream.
///
/// Floats are clamped to [-1, 1] and scaled asymmetrically — negative
/// values by 32768, non-negative by 32767 — matching the asymmetric
/// range of signed 16-bit PCM. Channels are interleaved per frame, as
/// the buffer already stores them.
pub fn encode_wav(buffer: &SampleBuffer) -> Vec<u8> {
    let channels = buffer.channels();
    let sample_rate = buffer.sample_rate();
    let bits_per_sample: u16 = 16;
    let block_align = channels * (bits_per_sample / 8);
    let byte_rate = sample_rate * block_align as u32;
    let data_size = (buffer.samples().len() * 2) as u32;
    let file_size = 36 + data_size;

    let mut out = Vec::with_capacity(44 + data_size as usize);

    // RIFF header
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&file_size.to_le_bytes());
    out.extend_from_slice(b"WAVE");

    // fmt chunk
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes()); // chunk size
    out.extend_from_slice(&1u16.to_le_bytes()); // PCM format
    out.extend_from_slice(&channels.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&bits_per_sample.to_le_bytes());

    // data chunk
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_size.to_le_bytes());
    for &sample in buffer.samples() {
        out.extend_from_slice(&float_to_i16(sample).to_le_bytes());
    }

    out
}

/// Clamp and scale one float sample to signed 16-bit.
fn float_to_i16(sample: f64) -> i16 {
    let clamped = sample.clamp(-1.0, 1.0);
    if clamped < 0.0 {
        (clamped * 32768.0) as i16
    } else {
        (clamped * 32767.0) as i16
    }
}
