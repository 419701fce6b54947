//! FFT primitive for deconvolution and spectral analysis
//!
//! Thin wrapper over `rustfft` working in `f64`. A plan is built for one
//! size and checks every buffer against it, so a mismatched buffer becomes
//! an [`FftError`] instead of a panic inside the transform.

use rustfft::{FftPlanner, num_complex::Complex};
use std::sync::Arc;
use thiserror::Error;

/// Failures reported by the FFT primitive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FftError {
    /// A plan was requested for zero points
    #[error("FFT size must be non-zero")]
    ZeroSize,

    /// A buffer did not match the planned size
    #[error("buffer length {actual} does not match FFT size {expected}")]
    LengthMismatch {
        /// Size the plan was built for.
        expected: usize,
        /// Length of the buffer that was passed in.
        actual: usize,
    },
}

/// Returns the smallest power of two that is `>= n`, or 1 for `n <= 1`.
pub fn next_power_of_two(n: usize) -> usize {
    if n <= 1 {
        return 1;
    }
    n.next_power_of_two()
}

/// Forward/inverse complex FFT for a fixed size.
pub struct Fft {
    fft: Arc<dyn rustfft::Fft<f64>>,
    ifft: Arc<dyn rustfft::Fft<f64>>,
    size: usize,
}

impl Fft {
    /// Plan forward and inverse transforms for `size` points.
    pub fn new(size: usize) -> Result<Self, FftError> {
        if size == 0 {
            return Err(FftError::ZeroSize);
        }

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        let ifft = planner.plan_fft_inverse(size);

        Ok(Self { fft, ifft, size })
    }

    /// Get FFT size
    pub fn size(&self) -> usize {
        self.size
    }

    fn check(&self, len: usize) -> Result<(), FftError> {
        if len == self.size {
            Ok(())
        } else {
            Err(FftError::LengthMismatch {
                expected: self.size,
                actual: len,
            })
        }
    }

    /// Forward FFT on a complex buffer (in-place)
    pub fn forward(&self, buffer: &mut [Complex<f64>]) -> Result<(), FftError> {
        self.check(buffer.len())?;
        self.fft.process(buffer);
        Ok(())
    }

    /// Inverse FFT on a complex buffer (in-place), normalized by `1/size`
    pub fn inverse(&self, buffer: &mut [Complex<f64>]) -> Result<(), FftError> {
        self.check(buffer.len())?;
        self.ifft.process(buffer);

        let scale = 1.0 / self.size as f64;
        for c in buffer.iter_mut() {
            *c *= scale;
        }
        Ok(())
    }

    /// Forward FFT of a real signal.
    ///
    /// The input is zero-padded or truncated to the FFT size. Returns the
    /// full `size`-point spectrum.
    pub fn forward_real(&self, input: &[f64]) -> Vec<Complex<f64>> {
        let mut buffer = to_complex(input, self.size);
        self.fft.process(&mut buffer);
        buffer
    }
}

/// Copy a real signal into a zero-padded complex buffer of `len` points.
///
/// Samples beyond `len` are dropped.
pub fn to_complex(input: &[f64], len: usize) -> Vec<Complex<f64>> {
    let mut buffer: Vec<Complex<f64>> = input
        .iter()
        .take(len)
        .map(|&x| Complex::new(x, 0.0))
        .collect();
    buffer.resize(len, Complex::new(0.0, 0.0));
    buffer
}
