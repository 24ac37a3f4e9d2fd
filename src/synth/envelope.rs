//! ADSR envelope generator.
//!
//! Attack and release are linear; the decay segment is linear for the
//! sustained instruments and exponential for the percussive
//! electric-piano profile.

/// Envelope stages.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Stage {
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

/// Shape of the decay segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DecayShape {
    Linear,
    /// `level = sustain + (1 − sustain) · e^(−6t)` over the decay time;
    /// snaps to sustain at the end of the segment.
    Exponential,
}

/// ADSR envelope.
#[derive(Debug, Clone)]
pub struct Envelope {
    /// Attack time in seconds.
    pub attack: f64,
    /// Decay time in seconds.
    pub decay: f64,
    /// Sustain level [0, 1].
    pub sustain: f64,
    /// Release time in seconds.
    pub release: f64,
    /// Decay curve.
    pub decay_shape: DecayShape,

    stage: Stage,
    level: f64,
    sample_rate: f64,
    /// Samples remaining in current stage.
    stage_samples: usize,
    stage_counter: usize,
    /// Level at the start of the current stage (for release).
    start_level: f64,
}

impl Envelope {
    pub fn new(sample_rate: f64) -> Self {
        Envelope {
            attack: 0.01,
            decay: 0.1,
            sustain: 0.7,
            release: 0.3,
            decay_shape: DecayShape::Linear,
            stage: Stage::Idle,
            level: 0.0,
            sample_rate,
            stage_samples: 0,
            stage_counter: 0,
            start_level: 0.0,
        }
    }

    /// Trigger the envelope (note on).
    pub fn gate_on(&mut self) {
        self.stage = Stage::Attack;
        self.stage_samples = (self.attack * self.sample_rate) as usize;
        self.stage_counter = 0;
        self.start_level = self.level;
    }

    /// Release the envelope (note off).
    pub fn gate_off(&mut self) {
        if self.stage == Stage::Idle {
            return;
        }
        self.stage = Stage::Release;
        self.stage_samples = (self.release * self.sample_rate) as usize;
        self.stage_counter = 0;
        self.start_level = self.level;
    }

    /// Generate the next envelope sample [0, 1].
    pub fn next_sample(&mut self) -> f64 {
        match self.stage {
            Stage::Idle => {
                self.level = 0.0;
            }
            Stage::Attack => {
                if self.stage_samples == 0 {
                    self.level = 1.0;
                    self.enter_decay();
                } else {
                    let t = self.stage_counter as f64 / self.stage_samples as f64;
                    self.level = self.start_level + (1.0 - self.start_level) * t;
                    self.stage_counter += 1;
                    if self.stage_counter >= self.stage_samples {
                        self.level = 1.0;
                        self.enter_decay();
                    }
                }
            }
            Stage::Decay => {
                if self.stage_samples == 0 {
                    self.level = self.sustain;
                    self.stage = Stage::Sustain;
                } else {
                    let t = self.stage_counter as f64 / self.stage_samples as f64;
                    self.level = match self.decay_shape {
                        DecayShape::Linear => 1.0 - (1.0 - self.sustain) * t,
                        DecayShape::Exponential => {
                            self.sustain + (1.0 - self.sustain) * (-6.0 * t).exp()
                        }
                    };
                    self.stage_counter += 1;
                    if self.stage_counter >= self.stage_samples {
                        self.level = self.sustain;
                        self.stage = Stage::Sustain;
                    }
                }
            }
            Stage::Sustain => {
                self.level = self.sustain;
            }
            Stage::Release => {
                if self.stage_samples == 0 {
                    self.level = 0.0;
                    self.stage = Stage::Idle;
                } else {
                    let t = self.stage_counter as f64 / self.stage_samples as f64;
                    self.level = self.start_level * (1.0 - t);
                    self.stage_counter += 1;
                    if self.stage_counter >= self.stage_samples {
                        self.level = 0.0;
                        self.stage = Stage::Idle;
                    }
                }
            }
        }
        self.level
    }

    /// Current envelope level; also used as a modulation source
    /// (filter-cutoff tracking in the reed voice).
    pub fn level(&self) -> f64 {
        self.level
    }

    /// Returns true if the envelope has finished (idle after release).
    pub fn is_finished(&self) -> bool {
        self.stage == Stage::Idle
    }

    fn enter_decay(&mut self) {
        self.stage = Stage::Decay;
        self.stage_samples = (self.decay * self.sample_rate) as usize;
        self.stage_counter = 0;
    }
}
