//! Reed/brass voice — square lead with a sawtooth sub-octave, a
//! sub-harmonic "growl" modulator on the primary pitch, a band-passed
//! breath-noise layer, and a velocity-tracking low-pass that opens on
//! the attack.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::envelope::Envelope;
use super::filter::{BiquadFilter, FilterType};
use super::oscillator::{Oscillator, Waveform};

/// Pitch deviation of the growl modulator, as a fraction of the
/// fundamental.
const GROWL_DEPTH: f64 = 0.006;
/// Breath noise level relative to the oscillator mix.
const BREATH_LEVEL: f64 = 0.12;
/// Tone filter sweep: `cutoff = base + span · velocity · envelope`.
const CUTOFF_BASE_HZ: f64 = 500.0;
const CUTOFF_SPAN_HZ: f64 = 3500.0;
/// Biquad coefficients are refreshed at this interval while the cutoff
/// tracks the envelope.
const CUTOFF_REFRESH_SAMPLES: usize = 64;

/// A single reed/brass note.
#[derive(Debug, Clone)]
pub struct ReedVoice {
    primary: Oscillator,
    sub: Oscillator,
    growl: Oscillator,
    envelope: Envelope,
    breath_filter: BiquadFilter,
    tone_filter: BiquadFilter,
    noise: ChaCha8Rng,
    base_frequency: f64,
    velocity: f64,
    sample_counter: usize,
}

impl ReedVoice {
    pub fn new(frequency: f64, velocity: f64, sample_rate: f64, noise_seed: u64) -> Self {
        let mut primary = Oscillator::new(Waveform::Square, sample_rate);
        primary.frequency = frequency;

        // Sub-oscillator one octave down
        let mut sub = Oscillator::new(Waveform::Sawtooth, sample_rate);
        sub.frequency = frequency / 2.0;

        // Growl modulator well below the fundamental
        let mut growl = Oscillator::new(Waveform::Sine, sample_rate);
        growl.frequency = frequency / 8.0;

        let mut envelope = Envelope::new(sample_rate);
        envelope.attack = 0.035;
        envelope.decay = 0.08;
        envelope.sustain = 0.75;
        envelope.release = 0.25;
        envelope.gate_on();

        let mut breath_filter = BiquadFilter::new(FilterType::Bandpass, sample_rate);
        breath_filter.frequency = 2500.0;
        breath_filter.q = 1.0;
        breath_filter.update_coefficients();

        let mut tone_filter = BiquadFilter::new(FilterType::Lowpass, sample_rate);
        tone_filter.frequency = CUTOFF_BASE_HZ;
        tone_filter.q = 1.2;
        tone_filter.update_coefficients();

        ReedVoice {
            primary,
            sub,
            growl,
            envelope,
            breath_filter,
            tone_filter,
            noise: ChaCha8Rng::seed_from_u64(noise_seed),
            base_frequency: frequency,
            velocity,
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

        // Growl pushes the primary pitch around its nominal frequency
        let growl = self.growl.next_sample();
        self.primary.frequency = self.base_frequency * (1.0 + GROWL_DEPTH * growl);

        let mix = self.primary.next_sample() * 0.6 + self.sub.next_sample() * 0.3;

        let white = self.noise.random::<f64>() * 2.0 - 1.0;
        let breath = self.breath_filter.process(white) * BREATH_LEVEL * self.velocity;

        let env = self.envelope.next_sample();

        // Cutoff opens with the attack, scaled by how hard the note was
        // played ("wah" on loud notes)
        if self.sample_counter % CUTOFF_REFRESH_SAMPLES == 0 {
            self.tone_filter
                .set_frequency(CUTOFF_BASE_HZ + CUTOFF_SPAN_HZ * self.velocity * env);
        }
        self.sample_counter += 1;

        self.tone_filter.process(mix + breath) * env * self.velocity
    }

    pub fn is_finished(&self) -> bool {
        self.envelope.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn produces_sound_then_silence() {
        let mut voice = ReedVoice::new(440.0, 0.8, 44100.0, 7);
        let mut peak = 0.0_f64;
        for _ in 0..4410 {
            peak = peak.max(voice.next_sample().abs());
        }
        assert!(peak > 0.01, "reed voice should produce output, peak {peak}");

        voice.note_off();
        for _ in 0..44100 {
            voice.next_sample();
        }
        assert!(voice.is_finished());
        assert_eq!(voice.next_sample(), 0.0);
    }

    #[test]
    fn identical_seeds_render_identically() {
        let mut a = ReedVoice::new(220.0, 1.0, 44100.0, 42);
        let mut b = ReedVoice::new(220.0, 1.0, 44100.0, 42);
        for _ in 0..2048 {
            assert_eq!(a.next_sample(), b.next_sample());
        }
    }

    #[test]
    fn differing_seeds_change_breath_noise() {
        let mut a = ReedVoice::new(220.0, 1.0, 44100.0, 1);
        let mut b = ReedVoice::new(220.0, 1.0, 44100.0, 2);
        let diverged = (0..2048).any(|_| a.next_sample() != b.next_sample());
        assert!(diverged, "breath noise should depend on the seed");
    }
}
