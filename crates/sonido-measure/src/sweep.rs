//! Swept-sine excitation signals and their inverse filters
//!
//! Two sweep shapes share one validated [`SweepSpec`]:
//!
//! - [`LogSweep`]: exponential frequency rise (Farina method). Every octave
//!   takes the same time, which is what lets harmonic distortion products
//!   separate cleanly in time after deconvolution. Its inverse filter is
//!   known in closed form.
//! - [`LinearSweep`]: linear chirp. Its inverse filter is built by
//!   regularized spectral division.
//!
//! Both implement [`Excitation`], whose default
//! [`deconvolve`](Excitation::deconvolve) convolves a recorded response
//! with the variant's inverse filter.
//!
//! # Example
//!
//! ```rust
//! use sonido_measure::{Excitation, LogSweep, SweepSpec};
//!
//! let sweep = LogSweep::new(SweepSpec::new(20.0, 20000.0, 1.0, 48000.0)).unwrap();
//! let excitation = sweep.generate();
//! // ... play `excitation` through the system under test and record it ...
//! let ir = sweep.deconvolve(&excitation).unwrap();
//! assert_eq!(ir.len(), 2 * excitation.len() - 1);
//! ```

use crate::deconvolve::fft_convolve;
use crate::error::{MeasureError, Result};
use crate::fft::{Fft, next_power_of_two};
use crate::harmonics::{extract_regions, harmonic_regions};
use std::f64::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Regularization added to `|H|²` when inverting a linear sweep spectrum.
pub const DEFAULT_REGULARIZATION: f64 = 1e-6;

/// Frequency range, duration, and sample rate of a sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SweepSpec {
    /// Start frequency in Hz
    pub start_freq: f64,
    /// End frequency in Hz
    pub end_freq: f64,
    /// Sweep duration in seconds
    pub duration: f64,
    /// Sample rate in Hz
    pub sample_rate: f64,
}

impl SweepSpec {
    /// Create a sweep specification (not yet validated)
    pub fn new(start_freq: f64, end_freq: f64, duration: f64, sample_rate: f64) -> Self {
        Self {
            start_freq,
            end_freq,
            duration,
            sample_rate,
        }
    }

    /// Check the specification, reporting the first violated rule.
    ///
    /// Frequencies are checked before their order, then duration, then
    /// sample rate. NaN fails every check it reaches.
    pub fn validate(&self) -> Result<()> {
        if !is_positive(self.start_freq) || !is_positive(self.end_freq) {
            return Err(MeasureError::InvalidFrequency);
        }
        if self.start_freq >= self.end_freq {
            return Err(MeasureError::FrequencyOrder);
        }
        if !is_positive(self.duration) {
            return Err(MeasureError::InvalidDuration);
        }
        if !is_positive(self.sample_rate) {
            return Err(MeasureError::InvalidSampleRate);
        }
        Ok(())
    }

    /// Number of samples: `round(duration × sample_rate)`
    pub fn num_samples(&self) -> usize {
        (self.duration * self.sample_rate).round() as usize
    }

    /// `ln(end_freq / start_freq)`
    pub(crate) fn ln_ratio(&self) -> f64 {
        (self.end_freq / self.start_freq).ln()
    }
}

fn is_positive(v: f64) -> bool {
    v > 0.0
}

/// Capability shared by the sweep variants.
pub trait Excitation {
    /// The validated specification this sweep was built from
    fn spec(&self) -> &SweepSpec;

    /// Generate the excitation signal (`num_samples()` long, first sample 0)
    fn generate(&self) -> Vec<f64>;

    /// Build the filter that turns the recorded sweep back into an impulse
    fn inverse_filter(&self) -> Result<Vec<f64>>;

    /// Compute the impulse response from a recorded sweep response.
    ///
    /// The result is the full linear convolution of `response` with
    /// [`inverse_filter`](Excitation::inverse_filter).
    fn deconvolve(&self, response: &[f64]) -> Result<Vec<f64>> {
        if response.is_empty() {
            return Err(MeasureError::EmptyResponse);
        }
        let inverse = self.inverse_filter()?;
        fft_convolve(response, &inverse)
    }
}

/// Exponential sine sweep generator for IR capture
///
/// Uses the Farina method for deconvolution-based impulse response measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogSweep {
    spec: SweepSpec,
}

impl LogSweep {
    /// Validate `spec` and build a log sweep from it
    pub fn new(spec: SweepSpec) -> Result<Self> {
        spec.validate()?;
        Ok(Self { spec })
    }

    /// Time in seconds by which harmonic `order` arrives ahead of the
    /// linear IR: `T · ln(order) / ln(f2/f1)`.
    pub fn harmonic_delay(&self, order: usize) -> f64 {
        self.spec.duration * (order as f64).ln() / self.spec.ln_ratio()
    }

    /// Split a recorded response into per-harmonic impulse responses.
    ///
    /// Deconvolves `response`, then cuts a window around each harmonic's
    /// predicted arrival. Index 0 of the result is the linear IR, index `i`
    /// the IR of harmonic order `i + 1`.
    ///
    /// # Errors
    ///
    /// [`MeasureError::MaxHarmonicTooLow`] if `max_harmonic < 2`, otherwise
    /// any error from [`deconvolve`](Excitation::deconvolve).
    pub fn extract_harmonic_irs(
        &self,
        response: &[f64],
        max_harmonic: usize,
    ) -> Result<Vec<Vec<f64>>> {
        let regions = harmonic_regions(&self.spec, max_harmonic)?;
        let deconv = self.deconvolve(response)?;
        Ok(extract_regions(&deconv, &regions))
    }
}

impl Excitation for LogSweep {
    fn spec(&self) -> &SweepSpec {
        &self.spec
    }

    /// Generate the exponential sine sweep
    ///
    /// ```text
    /// x(t) = sin(2π·f1·T / ln(f2/f1) · (exp(t/T · ln(f2/f1)) − 1))
    /// ```
    fn generate(&self) -> Vec<f64> {
        let s = &self.spec;
        let k = s.ln_ratio();

        (0..s.num_samples())
            .map(|i| {
                let t = i as f64 / s.sample_rate;
                let phase = 2.0 * PI * s.start_freq * s.duration / k
                    * ((k * t / s.duration).exp() - 1.0);
                phase.sin()
            })
            .collect()
    }

    /// Time-reversed sweep with a 6 dB/octave amplitude roll-off.
    ///
    /// Sample `i` of the filter is sweep sample `j = N − 1 − i` scaled by
    /// `f1 / f_inst(t_j)`. The whole filter is then divided by
    /// `T·f1/ln(f2/f1)·fs` so the sweep convolved with it peaks near unity.
    fn inverse_filter(&self) -> Result<Vec<f64>> {
        let s = &self.spec;
        let sweep = self.generate();
        let n = sweep.len();
        let k = s.ln_ratio();

        let norm = s.duration * s.start_freq / k * s.sample_rate;
        let scale = if norm > 0.0 { 1.0 / norm } else { 1.0 };

        Ok((0..n)
            .map(|i| {
                let j = n - 1 - i;
                let t = j as f64 / s.sample_rate;
                let f_inst = s.start_freq * (t / s.duration * k).exp();
                sweep[j] * (s.start_freq / f_inst) * scale
            })
            .collect())
    }
}

/// Linear chirp generator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearSweep {
    spec: SweepSpec,
    regularization: f64,
}

impl LinearSweep {
    /// Validate `spec` and build a linear sweep from it
    pub fn new(spec: SweepSpec) -> Result<Self> {
        spec.validate()?;
        Ok(Self {
            spec,
            regularization: DEFAULT_REGULARIZATION,
        })
    }

    /// Set the regularization `ε` used by the inverse filter
    pub fn with_regularization(mut self, epsilon: f64) -> Self {
        self.regularization = epsilon;
        self
    }

    /// Regularization `ε` used by the inverse filter
    pub fn regularization(&self) -> f64 {
        self.regularization
    }
}

impl Excitation for LinearSweep {
    fn spec(&self) -> &SweepSpec {
        &self.spec
    }

    /// ```text
    /// x(t) = sin(2π·(f1·t + ½·k·t²)),  k = (f2 − f1) / T
    /// ```
    fn generate(&self) -> Vec<f64> {
        let s = &self.spec;
        let k = (s.end_freq - s.start_freq) / s.duration;

        (0..s.num_samples())
            .map(|i| {
                let t = i as f64 / s.sample_rate;
                (2.0 * PI * (s.start_freq * t + 0.5 * k * t * t)).sin()
            })
            .collect()
    }

    /// `conj(H) / (|H|² + ε)` over a `2N`-padded spectrum, first `N` samples
    fn inverse_filter(&self) -> Result<Vec<f64>> {
        let sweep = self.generate();
        let n = sweep.len();
        let fft = Fft::new(next_power_of_two(2 * n))?;

        let mut spectrum = fft.forward_real(&sweep);
        for h in spectrum.iter_mut() {
            *h = h.conj() / (h.norm_sqr() + self.regularization);
        }
        fft.inverse(&mut spectrum)?;

        Ok(spectrum.iter().take(n).map(|c| c.re).collect())
    }
}
