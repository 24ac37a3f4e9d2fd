use std::fmt;

/// Top-level error type for the transcription/resynthesis pipeline.
#[derive(Debug)]
pub enum RetimbreError {
    Analysis(AnalysisError),
    Render(RenderError),
}

/// Errors raised by the analysis stages (conditioning, pitch, segmentation).
///
/// Degenerate but well-formed input (silence, noise, no pitched content)
/// is *not* an error; it flows through as empty results. Only contract
/// violations surface here.
#[derive(Debug)]
pub enum AnalysisError {
    /// The input buffer contained no samples.
    EmptyBuffer,
    /// The sample rate was zero.
    InvalidSampleRate { rate: u32 },
    /// Interleaved sample count is not divisible by the channel count.
    ChannelMismatch { len: usize, channels: u16 },
    /// Frame parameters that cannot produce a valid analysis: a zero
    /// window or hop, or a hop wider than the window.
    InvalidFraming { window: usize, hop: usize },
}

/// Errors raised by the synthesis stage.
#[derive(Debug)]
pub enum RenderError {
    /// The requested sample rate was zero.
    InvalidSampleRate { rate: u32 },
    /// The requested total duration was zero or negative.
    InvalidDuration { seconds: f64 },
}

impl fmt::Display for RetimbreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetimbreError::Analysis(e) => write!(f, "Analysis error: {e}"),
            RetimbreError::Render(e) => write!(f, "Render error: {e}"),
        }
    }
}

impl std::error::Error for RetimbreError {}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::EmptyBuffer => write!(f, "Empty sample buffer"),
            AnalysisError::InvalidSampleRate { rate } => {
                write!(f, "Invalid sample rate: {rate}")
            }
            AnalysisError::ChannelMismatch { len, channels } => {
                write!(f, "{len} samples not divisible by {channels} channels")
            }
            AnalysisError::InvalidFraming { window, hop } => {
                write!(f, "Invalid framing: window {window}, hop {hop}")
            }
        }
    }
}

impl std::error::Error for AnalysisError {}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::InvalidSampleRate { rate } => {
                write!(f, "Invalid sample rate: {rate}")
            }
            RenderError::InvalidDuration { seconds } => {
                write!(f, "Invalid render duration: {seconds}s")
            }
        }
    }
}

impl std::error::Error for RenderError {}

impl From<AnalysisError> for RetimbreError {
    fn from(e: AnalysisError) -> Self {
        RetimbreError::Analysis(e)
    }
}

impl From<RenderError> for RetimbreError {
    fn from(e: RenderError) -> Self {
        RetimbreError::Render(e)
    }
}
