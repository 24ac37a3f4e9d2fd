//! Per-note voice dispatch across the three instruments.

use super::Instrument;
use super::epiano::EPianoVoice;
use super::reed::ReedVoice;
use super::strings::StringsVoice;

/// One sounding note of whichever instrument the render targets.
#[derive(Debug, Clone)]
pub enum InstrumentVoice {
    Reed(ReedVoice),
    Strings(StringsVoice),
    EPiano(EPianoVoice),
}

impl InstrumentVoice {
    pub fn new(
        instrument: Instrument,
        frequency: f64,
        velocity: f64,
        sample_rate: f64,
        noise_seed: u64,
    ) -> Self {
        match instrument {
            Instrument::Saxophone => {
                InstrumentVoice::Reed(ReedVoice::new(frequency, velocity, sample_rate, noise_seed))
            }
            Instrument::Strings => InstrumentVoice::Strings(StringsVoice::new(
                frequency,
                velocity,
                sample_rate,
                noise_seed,
            )),
            Instrument::ElectricPiano => {
                InstrumentVoice::EPiano(EPianoVoice::new(frequency, velocity, sample_rate))
            }
        }
    }

    pub fn next_sample(&mut self) -> f64 {
        match self {
            InstrumentVoice::Reed(v) => v.next_sample(),
            InstrumentVoice::Strings(v) => v.next_sample(),
            InstrumentVoice::EPiano(v) => v.next_sample(),
        }
    }

    pub fn note_off(&mut self) {
        match self {
            InstrumentVoice::Reed(v) => v.note_off(),
            InstrumentVoice::Strings(v) => v.note_off(),
            InstrumentVoice::EPiano(v) => v.note_off(),
        }
    }

    pub fn is_finished(&self) -> bool {
        match self {
            InstrumentVoice::Reed(v) => v.is_finished(),
            InstrumentVoice::Strings(v) => v.is_finished(),
            InstrumentVoice::EPiano(v) => v.is_finished(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_instruments_produce_output() {
        for instrument in [
            Instrument::Saxophone,
            Instrument::Strings,
            Instrument::ElectricPiano,
        ] {
            let mut voice = InstrumentVoice::new(instrument, 440.0, 0.8, 44100.0, 13);
            let mut peak = 0.0_f64;
            for _ in 0..8820 {
                peak = peak.max(voice.next_sample().abs());
            }
            assert!(peak > 0.01, "{instrument:?} should produce output");
        }
    }

    #[test]
    fn all_instruments_finish_after_release() {
        for instrument in [
            Instrument::Saxophone,
            Instrument::Strings,
            Instrument::ElectricPiano,
        ] {
            let mut voice = InstrumentVoice::new(instrument, 330.0, 0.5, 44100.0, 13);
            for _ in 0..441 {
                voice.next_sample();
            }
            voice.note_off();
            for _ in 0..44100 {
                voice.next_sample();
            }
            assert!(voice.is_finished(), "{instrument:?} should finish");
        }
    }
}
