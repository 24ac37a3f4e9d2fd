//! Bowed-string ensemble voice — three detuned sawtooth oscillators
//! under a shared vibrato LFO, a high-passed noise burst gated to the
//! attack ("bow scratch"), and a body filter pair that tames the upper
//! harmonics.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::envelope::Envelope;
use super::filter::{BiquadFilter, FilterType};
use super::oscillator::{Oscillator, Waveform};

/// ±0.2% ensemble detune expressed in cents.
const DETUNE_CENTS: f64 = 3.46;
/// Shared vibrato rate in Hz.
const VIBRATO_RATE_HZ: f64 = 5.5;
/// Vibrato pitch deviation as a fraction of the fundamental.
const VIBRATO_DEPTH: f64 = 0.004;
/// Bow scratch window after the onset, in seconds.
const SCRATCH_SECONDS: f64 = 0.08;
/// Time constant of the scratch burst decay, in seconds.
const SCRATCH_TAU: f64 = 0.02;
const SCRATCH_LEVEL: f64 = 0.2;

/// A single ensemble-string note.
#[derive(Debug, Clone)]
pub struct StringsVoice {
    oscillators: [Oscillator; 3],
    vibrato: Oscillator,
    envelope: Envelope,
    scratch_filter: BiquadFilter,
    body_lowpass: BiquadFilter,
    body_resonance: BiquadFilter,
    noise: ChaCha8Rng,
    base_frequency: f64,
    velocity: f64,
    sample_rate: f64,
    sample_counter: usize,
}

impl StringsVoice {
    pub fn new(frequency: f64, velocity: f64, sample_rate: f64, noise_seed: u64) -> Self {
        let oscillators = [0.0, -DETUNE_CENTS, DETUNE_CENTS].map(|cents| {
            let mut osc = Oscillator::new(Waveform::Sawtooth, sample_rate);
            osc.frequency = frequency;
            osc.detune = cents;
            osc
        });

        let mut vibrato = Oscillator::new(Waveform::Sine, sample_rate);
        vibrato.frequency = VIBRATO_RATE_HZ;

        let mut envelope = Envelope::new(sample_rate);
        envelope.attack = 0.12;
        envelope.decay = 0.1;
        envelope.sustain = 0.85;
        envelope.release = 0.4;
        envelope.gate_on();

        let mut scratch_filter = BiquadFilter::new(FilterType::Highpass, sample_rate);
        scratch_filter.frequency = 2500.0;
        scratch_filter.update_coefficients();

        let mut body_lowpass = BiquadFilter::new(FilterType::Lowpass, sample_rate);
        body_lowpass.frequency = 2800.0;
        body_lowpass.update_coefficients();

        let mut body_resonance = BiquadFilter::new(FilterType::Peaking, sample_rate);
        body_resonance.frequency = 250.0;
        body_resonance.q = 1.2;
        body_resonance.gain_db = 4.0;
        body_resonance.update_coefficients();

        StringsVoice {
            oscillators,
            vibrato,
            envelope,
            scratch_filter,
            body_lowpass,
            body_resonance,
            noise: ChaCha8Rng::seed_from_u64(noise_seed),
            base_frequency: frequency,
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

        // One LFO modulates all three oscillators so the ensemble
        // stays coherent
        let vibrato = self.vibrato.next_sample();
        let pitch = self.base_frequency * (1.0 + VIBRATO_DEPTH * vibrato);

        let mut sum = 0.0;
        for osc in self.oscillators.iter_mut() {
            osc.frequency = pitch;
            sum += osc.next_sample();
        }
        let ensemble = sum / 3.0;

        // Scratch burst exists only during the attack window
        let t = self.sample_counter as f64 / self.sample_rate;
        let scratch = if t < SCRATCH_SECONDS {
            let white = self.noise.random::<f64>() * 2.0 - 1.0;
            self.scratch_filter.process(white)
                * (-t / SCRATCH_TAU).exp()
                * SCRATCH_LEVEL
                * self.velocity
        } else {
            0.0
        };
        self.sample_counter += 1;

        let env = self.envelope.next_sample();
        let shaped = self
            .body_resonance
            .process(self.body_lowpass.process(ensemble * 0.5 + scratch));
        shaped * env * self.velocity
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
        let mut voice = StringsVoice::new(220.0, 0.9, 44100.0, 11);
        let mut peak = 0.0_f64;
        for _ in 0..8820 {
            peak = peak.max(voice.next_sample().abs());
        }
        assert!(peak > 0.01, "strings voice should produce output, peak {peak}");

        voice.note_off();
        for _ in 0..44100 {
            voice.next_sample();
        }
        assert!(voice.is_finished());
    }

    #[test]
    fn scratch_is_gated_to_attack() {
        // After the scratch window, two voices with different seeds
        // must be identical sample-for-sample.
        let mut a = StringsVoice::new(330.0, 1.0, 44100.0, 3);
        let mut b = StringsVoice::new(330.0, 1.0, 44100.0, 4);
        let scratch_samples = (SCRATCH_SECONDS * 44100.0) as usize;

        let mut diverged_early = false;
        for _ in 0..scratch_samples {
            if a.next_sample() != b.next_sample() {
                diverged_early = true;
            }
        }
        assert!(diverged_early, "scratch noise should differ between seeds");

        // Filter state differs slightly after the burst; run past the
        // burst tail, then outputs must converge to near-identical.
        for _ in 0..8820 {
            a.next_sample();
            b.next_sample();
        }
        for _ in 0..100 {
            let (sa, sb) = (a.next_sample(), b.next_sample());
            assert!(
                (sa - sb).abs() < 1e-6,
                "voices should converge after the scratch window: {sa} vs {sb}"
            );
        }
    }

    #[test]
    fn deterministic_for_same_seed() {
        let mut a = StringsVoice::new(196.0, 0.7, 44100.0, 9);
        let mut b = StringsVoice::new(196.0, 0.7, 44100.0, 9);
        for _ in 0..4096 {
            assert_eq!(a.next_sample(), b.next_sample());
        }
    }
}
