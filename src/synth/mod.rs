//! Instrument synthesis — note events in, a rendered mono buffer out.
//!
//! Every render is a pure batch computation: each note gets its own
//! independent signal graph (oscillators, filters, envelope, noise),
//! graphs are summed sample-wise into one master buffer, a shared
//! reverb send adds space, and a limiter guards the sum. All noise is
//! drawn from one seeded generator, so identical inputs produce
//! bit-identical buffers.

pub mod envelope;
pub mod epiano;
pub mod filter;
pub mod limiter;
pub mod oscillator;
pub mod reed;
pub mod reverb;
pub mod strings;
pub mod voice;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::RenderError;
use crate::note::NoteEvent;
use limiter::Limiter;
use reverb::ReverbPreset;
use voice::InstrumentVoice;

/// Extra tail appended to every render so release and reverb tails are
/// not truncated.
pub const TAIL_SECONDS: f64 = 1.5;

/// The virtual instruments a note list can be performed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Instrument {
    Saxophone,
    Strings,
    ElectricPiano,
}

impl Instrument {
    /// Reverb space paired with this instrument.
    pub fn reverb(&self) -> ReverbPreset {
        match self {
            Instrument::Saxophone => ReverbPreset::small_room(),
            Instrument::Strings => ReverbPreset::large_hall(),
            Instrument::ElectricPiano => ReverbPreset::plate(),
        }
    }
}

/// Shared per-render state: target format plus the seeded noise source.
/// Built once per `render` call; nothing survives across calls.
struct RenderContext {
    sample_rate: f64,
    total_samples: usize,
    rng: ChaCha8Rng,
}

impl RenderContext {
    fn new(sample_rate: u32, total_duration: f64, seed: u64) -> Result<Self, RenderError> {
        if sample_rate == 0 {
            return Err(RenderError::InvalidSampleRate { rate: sample_rate });
        }
        if !(total_duration > 0.0) {
            return Err(RenderError::InvalidDuration {
                seconds: total_duration,
            });
        }
        let total_samples = ((total_duration + TAIL_SECONDS) * sample_rate as f64).ceil() as usize;
        Ok(Self {
            sample_rate: sample_rate as f64,
            total_samples,
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }
}

/// Render a note list on an instrument into a mono buffer of length
/// `ceil((total_duration + TAIL_SECONDS) · sample_rate)`.
///
/// An empty note list renders a full-length silent buffer; only
/// malformed parameters fail.
pub fn render(
    notes: &[NoteEvent],
    instrument: Instrument,
    sample_rate: u32,
    total_duration: f64,
    seed: u64,
) -> Result<Vec<f64>, RenderError> {
    let mut ctx = RenderContext::new(sample_rate, total_duration, seed)?;
    log::debug!(
        "rendering {} notes on {:?}: {} samples at {} Hz (seed {seed})",
        notes.len(),
        instrument,
        ctx.total_samples,
        sample_rate
    );

    let mut master = vec![0.0_f64; ctx.total_samples];

    for note in notes {
        let start = (note.start_time * ctx.sample_rate) as usize;
        let release = (note.duration * ctx.sample_rate) as usize;
        let noise_seed = ctx.rng.random::<u64>();
        let mut voice = InstrumentVoice::new(
            instrument,
            note.frequency(),
            note.velocity,
            ctx.sample_rate,
            noise_seed,
        );

        let mut offset = 0usize;
        loop {
            let index = start + offset;
            if index >= ctx.total_samples || voice.is_finished() {
                break;
            }
            if offset == release {
                voice.note_off();
            }
            master[index] += voice.next_sample();
            offset += 1;
        }
    }

    reverb::apply(&mut master, &instrument.reverb(), sample_rate, &mut ctx.rng);
    Limiter::new(ctx.sample_rate).process_buffer(&mut master);

    Ok(master)
}
