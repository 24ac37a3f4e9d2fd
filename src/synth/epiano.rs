//! Electric-piano voice — a 2-operator FM pair: sine carrier at the
//! note frequency, sine modulator at twice the frequency. The
//! modulation index starts high for a bright attack and collapses
//! exponentially; the amplitude envelope is percussive.

use super::envelope::{DecayShape, Envelope};
use super::oscillator::{Oscillator, Waveform};

/// Modulation index at the onset: `base + span · velocity`.
const INDEX_BASE: f64 = 1.2;
const INDEX_SPAN: f64 = 1.3;
/// Time constant of the brightness collapse, in seconds.
const INDEX_TAU: f64 = 0.25;

/// A single electric-piano note.
#[derive(Debug, Clone)]
pub struct EPianoVoice {
    carrier: Oscillator,
    modulator: Oscillator,
    envelope: Envelope,
    base_frequency: f64,
    start_index: f64,
    velocity: f64,
    sample_rate: f64,
    sample_counter: usize,
}

impl EPianoVoice {
    pub fn new(frequency: f64, velocity: f64, sample_rate: f64) -> Self {
        let mut carrier = Oscillator::new(Waveform::Sine, sample_rate);
        carrier.frequency = frequency;

        let mut modulator = Oscillator::new(Waveform::Sine, sample_rate);
        modulator.frequency = frequency * 2.0;

        let mut envelope = Envelope::new(sample_rate);
        envelope.attack = 0.002;
        envelope.decay = 1.1;
        envelope.sustain = 0.0;
        envelope.release = 0.12;
        envelope.decay_shape = DecayShape::Exponential;
        envelope.gate_on();

        EPianoVoice {
            carrier,
            modulator,
            envelope,
            base_frequency: frequency,
            start_index: INDEX_BASE + INDEX_SPAN * velocity,
            velocity,
            sample_rate,
            sample_counter: 0,
        }
    }

    pub fn note_off(&mut self) {
        self.envelope.gate_off();
    }

    pub fn next_sample(&mut self) -> f64 {
        if self.is_finished() {
            return 0.0;
        }

        let t = self.sample_counter as f64 / self.sample_rate;
        self.sample_counter += 1;

        // Brightness collapse: the modulator's reach over the carrier
        // frequency decays from its onset value toward zero
        let index = self.start_index * (-t / INDEX_TAU).exp();
        let modulation = self.modulator.next_sample();
        self.carrier.frequency = self.base_frequency * (1.0 + index * modulation);

        let env = self.envelope.next_sample();
        self.carrier.next_sample() * env * self.velocity * 0.7
    }

    pub fn is_finished(&self) -> bool {
        self.envelope.is_finished()
    }
}
