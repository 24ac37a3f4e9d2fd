//! Sample buffers — the unit of exchange between pipeline stages.

use crate::error::AnalysisError;

/// An immutable chunk of audio: interleaved f64 samples in [-1, 1],
/// tagged with a sample rate and channel count.
///
/// Each pipeline stage consumes a buffer and produces a new one; no
/// stage mutates a buffer it did not allocate.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    samples: Vec<f64>,
    sample_rate: u32,
    channels: u16,
}

impl SampleBuffer {
    /// Wrap interleaved samples. Fails on a zero sample rate, zero
    /// channels, an empty buffer, or a length that does not divide
    /// evenly into frames.
    pub fn new(
        samples: Vec<f64>,
        sample_rate: u32,
        channels: u16,
    ) -> Result<Self, AnalysisError> {
        if sample_rate == 0 {
            return Err(AnalysisError::InvalidSampleRate { rate: sample_rate });
        }
        if samples.is_empty() {
            return Err(AnalysisError::EmptyBuffer);
        }
        if channels == 0 || samples.len() % channels as usize != 0 {
            return Err(AnalysisError::ChannelMismatch {
                len: samples.len(),
                channels,
            });
        }
        Ok(Self {
            samples,
            sample_rate,
            channels,
        })
    }

    /// Wrap a mono buffer.
    pub fn mono(samples: Vec<f64>, sample_rate: u32) -> Result<Self, AnalysisError> {
        Self::new(samples, sample_rate, 1)
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Number of sample frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    pub fn duration_seconds(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    /// Reduce to one analysis channel by averaging across channels.
    /// A mono buffer is returned as a copy.
    pub fn downmix_mono(&self) -> SampleBuffer {
        if self.channels == 1 {
            return self.clone();
        }
        let ch = self.channels as usize;
        let mixed: Vec<f64> = self
            .samples
            .chunks_exact(ch)
            .map(|frame| frame.iter().sum::<f64>() / ch as f64)
            .collect();
        SampleBuffer {
            samples: mixed,
            sample_rate: self.sample_rate,
            channels: 1,
        }
    }
}
