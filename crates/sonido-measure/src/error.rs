//! Error types for measurement operations.

use crate::fft::FftError;
use thiserror::Error;

/// Errors that can occur while generating, deconvolving, or analyzing
/// measurement signals.
///
/// Every variant describes caller misuse or a failed transform; none of them
/// is transient, so nothing in this crate retries.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeasureError {
    /// A sweep frequency is zero, negative, or NaN
    #[error("frequency must be positive")]
    InvalidFrequency,

    /// Sweep duration is zero, negative, or NaN
    #[error("duration must be positive")]
    InvalidDuration,

    /// Sample rate is zero, negative, or NaN
    #[error("sample rate must be positive")]
    InvalidSampleRate,

    /// Start frequency is not below end frequency
    #[error("start frequency must be less than end frequency")]
    FrequencyOrder,

    /// The recorded response handed to deconvolution was empty
    #[error("response signal is empty")]
    EmptyResponse,

    /// Harmonic separation needs at least the linear IR and H2
    #[error("max harmonic must be >= 2, got {0}")]
    MaxHarmonicTooLow(usize),

    /// The FFT primitive rejected a buffer
    #[error("transform failed: {0}")]
    Transform(#[from] FftError),

    /// An impulse response handed to IR analysis was empty
    #[error("impulse response is empty")]
    EmptyImpulseResponse,

    /// A time boundary for clarity/definition was not positive
    #[error("time boundary must be positive, got {0} ms")]
    InvalidTime(f64),

    /// The Schroeder curve never decays far enough for a reverb time
    #[error("insufficient decay for reverberation time")]
    NoDecay,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MeasureError>;
