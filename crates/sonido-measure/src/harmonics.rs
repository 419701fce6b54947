//! Separation of harmonic distortion IRs from a deconvolved log sweep
//!
//! When a log sweep passes through a nonlinear system, harmonic `k` of the
//! sweep lines up with the inverse filter `Δt_k = T·ln(k)/ln(f2/f1)` seconds
//! early. After deconvolution each harmonic therefore shows up as its own
//! impulse response ahead of the linear one:
//!
//! ```text
//!   ... H4  H3    H2        H1 (linear, at N − 1)
//!   ----|---|-----|---------|--------------------> samples
//! ```
//!
//! Each harmonic is cut out with a window whose half-width is half the gap
//! to its lower-order neighbour.

use crate::error::{MeasureError, Result};
use crate::sweep::SweepSpec;
use std::ops::Range;

/// Window around one harmonic IR inside a deconvolved response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HarmonicRegion {
    /// Harmonic order (1 = linear IR)
    pub order: usize,
    /// Predicted IR position in the deconvolved response; may be negative
    /// for short sweeps where the harmonic arrives before sample 0
    pub center: isize,
    /// Half-width of the extraction window in samples (at least 1)
    pub half_width: usize,
}

impl HarmonicRegion {
    /// Sample range `[center − half_width, center + half_width)` clamped to
    /// a signal of `len` samples. Empty when the window lies outside it.
    pub fn bounds(&self, len: usize) -> Range<usize> {
        let hw = self.half_width as isize;
        let start = (self.center - hw).max(0) as usize;
        let end = (self.center + hw).clamp(0, len as isize) as usize;
        start.min(end)..end
    }
}

/// Compute the extraction windows for orders `1..=max_harmonic`.
///
/// The linear IR sits at `main_offset = N − 1` where `N` is the sweep
/// length; harmonic `k` is centered `round(Δt_k · fs)` samples earlier.
pub fn harmonic_regions(spec: &SweepSpec, max_harmonic: usize) -> Result<Vec<HarmonicRegion>> {
    if max_harmonic < 2 {
        return Err(MeasureError::MaxHarmonicTooLow(max_harmonic));
    }

    let main_offset = spec.num_samples() as isize - 1;
    let ln_ratio = spec.ln_ratio();

    let centers: Vec<isize> = (1..=max_harmonic)
        .map(|k| {
            let delay = spec.duration * (k as f64).ln() / ln_ratio * spec.sample_rate;
            main_offset - delay.round() as isize
        })
        .collect();

    // centers[k - 1] is harmonic k
    let gap = |lower: usize, higher: usize| (centers[lower - 1] - centers[higher - 1]) / 2;

    let regions: Vec<HarmonicRegion> = (1..=max_harmonic)
        .map(|k| {
            // the last harmonic reuses the spacing to its predecessor, which
            // for max_harmonic == 2 is the H1/H2 gap
            let half_width = if k == 1 { gap(1, 2) } else { gap(k - 1, k) };

            HarmonicRegion {
                order: k,
                center: centers[k - 1],
                half_width: half_width.max(1) as usize,
            }
        })
        .collect();

    #[cfg(feature = "tracing")]
    for r in &regions {
        tracing::debug!(
            order = r.order,
            center = r.center,
            half_width = r.half_width,
            "harmonic region"
        );
    }

    Ok(regions)
}

/// Cut each region out of an already-deconvolved response.
///
/// A region that falls entirely outside `deconv` yields a single zero
/// sample so every order keeps an entry.
pub fn extract_regions(deconv: &[f64], regions: &[HarmonicRegion]) -> Vec<Vec<f64>> {
    regions
        .iter()
        .map(|region| {
            let range = region.bounds(deconv.len());
            if range.is_empty() {
                vec![0.0]
            } else {
                deconv[range].to_vec()
            }
        })
        .collect()
}
