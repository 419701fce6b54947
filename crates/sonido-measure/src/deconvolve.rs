//! FFT-based linear convolution used to deconvolve recorded sweep responses
//!
//! Convolving a recorded response with a sweep's inverse filter collapses
//! the sweep back into the system's impulse response. Both signals are
//! zero-padded to the next power of two at or above the full linear
//! convolution length, so the circular product never wraps.

use crate::error::{MeasureError, Result};
use crate::fft::{Fft, next_power_of_two, to_complex};

/// Full linear convolution of `response` with `filter` via FFT.
///
/// The output has `response.len() + filter.len() - 1` samples. When
/// `filter` is the inverse filter of a log sweep, the linear impulse
/// response peaks at offset `filter.len() - 1`.
///
/// # Errors
///
/// [`MeasureError::EmptyResponse`] if `response` is empty, and
/// [`MeasureError::Transform`] if the FFT rejects a buffer.
pub fn fft_convolve(response: &[f64], filter: &[f64]) -> Result<Vec<f64>> {
    if response.is_empty() {
        return Err(MeasureError::EmptyResponse);
    }

    let n = response.len() + filter.len().saturating_sub(1);
    let fft_size = next_power_of_two(n);
    let fft = Fft::new(fft_size)?;

    #[cfg(feature = "tracing")]
    tracing::debug!(
        response_len = response.len(),
        filter_len = filter.len(),
        fft_size,
        "fft_convolve"
    );

    let mut response_freq = to_complex(response, fft_size);
    let mut filter_freq = to_complex(filter, fft_size);

    fft.forward(&mut response_freq)?;
    fft.forward(&mut filter_freq)?;

    for (r, f) in response_freq.iter_mut().zip(filter_freq.iter()) {
        *r *= *f;
    }

    fft.inverse(&mut response_freq)?;

    Ok(response_freq.iter().take(n).map(|c| c.re).collect())
}

/// Index of the sample with the largest absolute value (first one on ties).
///
/// Returns 0 for an empty signal.
pub fn peak_index(signal: &[f64]) -> usize {
    let mut peak_idx = 0;
    let mut peak_val = 0.0;
    for (i, &v) in signal.iter().enumerate() {
        if v.abs() > peak_val {
            peak_val = v.abs();
            peak_idx = i;
        }
    }
    peak_idx
}

#[cfg(test)]
mod tests {
    use super::*;

    fn direct_convolve(a: &[f64], b: &[f64]) -> Vec<f64> {
        let mut out = vec![0.0; a.len() + b.len() - 1];
        for (i, &x) in a.iter().enumerate() {
            for (j, &y) in b.iter().enumerate() {
                out[i + j] += x * y;
            }
        }
        out
    }

    #[test]
    fn test_empty_response() {
        assert_eq!(fft_convolve(&[], &[1.0]), Err(MeasureError::EmptyResponse));
    }

    #[test]
    fn test_matches_direct_convolution() {
        let a = [1.0, -2.0, 0.5, 3.0, 0.25];
        let b = [0.5, 0.0, -1.0];

        let fast = fft_convolve(&a, &b).unwrap();
        let slow = direct_convolve(&a, &b);

        assert_eq!(fast.len(), 7);
        for (x, y) in fast.iter().zip(&slow) {
            assert!((x - y).abs() < 1e-12, "{x} vs {y}");
        }
    }

    #[test]
    fn test_delta_filter_is_identity() {
        let signal = [0.1, 0.2, -0.3, 0.4];
        let out = fft_convolve(&signal, &[1.0]).unwrap();
        assert_eq!(out.len(), signal.len());
        for (x, y) in out.iter().zip(&signal) {
            assert!((x - y).abs() < 1e-12);
        }
    }

    #[test]
    fn test_single_sample_inputs() {
        let out = fft_convolve(&[2.0], &[3.0]).unwrap();
        assert_eq!(out.len(), 1);
        assert!((out[0] - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_peak_index() {
        assert_eq!(peak_index(&[]), 0);
        assert_eq!(peak_index(&[0.1, -0.9, 0.5, 0.9]), 1);
    }
}
