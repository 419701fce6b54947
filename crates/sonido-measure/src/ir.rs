//! Room-acoustic metrics of a measured impulse response
//!
//! Decay times come from the Schroeder backward-integrated energy curve:
//! a least-squares line is fitted between two levels and extrapolated to
//! −60 dB.
//!
//! | Metric | Fit range        |
//! |--------|------------------|
//! | EDT    | 0 to −10 dB      |
//! | T20    | −5 to −25 dB     |
//! | T30    | −5 to −35 dB     |
//!
//! Energy ratios (clarity `C`, definition `D`) split the response at a
//! time boundary given in milliseconds.

use crate::error::{MeasureError, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Level assigned to Schroeder samples with no remaining energy
const SCHROEDER_FLOOR_DB: f64 = -200.0;

/// Fraction of the peak at which an impulse is considered to start (−20 dB)
const IMPULSE_START_RATIO: f64 = 0.1;

/// Impulse response analysis results
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IrMetrics {
    /// Reverberation time in seconds (T30, or T20 when T30 is unavailable)
    pub rt60: f64,
    /// Early decay time in seconds
    pub edt: f64,
    /// Reverberation time from the −5 to −25 dB slope
    pub t20: f64,
    /// Reverberation time from the −5 to −35 dB slope
    pub t30: f64,
    /// Clarity at 50 ms in dB
    pub c50: f64,
    /// Clarity at 80 ms in dB
    pub c80: f64,
    /// Definition at 50 ms (0 to 1)
    pub d50: f64,
    /// Definition at 80 ms (0 to 1)
    pub d80: f64,
    /// Energy centroid in seconds
    pub center_time: f64,
    /// Index of the absolute peak
    pub peak_index: usize,
}

/// Computes [`IrMetrics`] for impulse responses at one sample rate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IrAnalyzer {
    sample_rate: f64,
}

impl IrAnalyzer {
    /// Create an analyzer for the given sample rate
    pub fn new(sample_rate: f64) -> Self {
        Self { sample_rate }
    }

    /// Get sample rate
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    fn check(&self, ir: &[f64]) -> Result<()> {
        if ir.is_empty() {
            return Err(MeasureError::EmptyImpulseResponse);
        }
        if self.sample_rate > 0.0 {
            Ok(())
        } else {
            Err(MeasureError::InvalidSampleRate)
        }
    }

    /// Compute every metric.
    ///
    /// The response is analyzed from its absolute peak onward, so leading
    /// silence or pre-ringing does not skew the ratios.
    pub fn analyze(&self, ir: &[f64]) -> Result<IrMetrics> {
        self.check(ir)?;

        let peak_index = crate::deconvolve::peak_index(ir);
        let tail = &ir[peak_index..];
        let curve = schroeder_db(tail);

        let t20 = self.reverb_time(&curve, -5.0, -25.0);
        let t30 = self.reverb_time(&curve, -5.0, -35.0);

        let metrics = IrMetrics {
            rt60: if t30 > 0.0 { t30 } else { t20 },
            edt: self.reverb_time(&curve, 0.0, -10.0),
            t20,
            t30,
            c50: self.clarity_unchecked(tail, 50.0),
            c80: self.clarity_unchecked(tail, 80.0),
            d50: self.definition_unchecked(tail, 50.0),
            d80: self.definition_unchecked(tail, 80.0),
            center_time: self.center_time_unchecked(tail),
            peak_index,
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(
            peak_index,
            rt60 = metrics.rt60,
            edt = metrics.edt,
            "impulse response analyzed"
        );

        Ok(metrics)
    }

    /// Schroeder backward integral in dB, normalized to 0 dB at the start.
    ///
    /// ```text
    /// S(t) = 10·log10( ∫ₜ^∞ h²(τ) dτ / ∫₀^∞ h²(τ) dτ )
    /// ```
    ///
    /// Samples with no energy left sit at −200 dB. An all-zero response
    /// yields all zeros.
    pub fn schroeder_integral(&self, ir: &[f64]) -> Result<Vec<f64>> {
        if ir.is_empty() {
            return Err(MeasureError::EmptyImpulseResponse);
        }
        Ok(schroeder_db(ir))
    }

    /// Reverberation time: T30 when the curve reaches −35 dB, else T20.
    ///
    /// # Errors
    ///
    /// [`MeasureError::NoDecay`] when neither fit range is reached with a
    /// falling slope.
    pub fn rt60(&self, ir: &[f64]) -> Result<f64> {
        self.check(ir)?;
        let curve = schroeder_db(ir);

        [(-5.0, -35.0), (-5.0, -25.0)]
            .into_iter()
            .map(|(start, end)| self.reverb_time(&curve, start, end))
            .find(|&rt| rt > 0.0)
            .ok_or(MeasureError::NoDecay)
    }

    /// Definition `D(t)`: energy before `time_ms` over total energy (0 to 1)
    pub fn definition(&self, ir: &[f64], time_ms: f64) -> Result<f64> {
        self.check(ir)?;
        check_time(time_ms)?;
        Ok(self.definition_unchecked(ir, time_ms))
    }

    /// Clarity `C(t)`: energy before `time_ms` over energy after it, in dB
    pub fn clarity(&self, ir: &[f64], time_ms: f64) -> Result<f64> {
        self.check(ir)?;
        check_time(time_ms)?;
        Ok(self.clarity_unchecked(ir, time_ms))
    }

    /// Energy centroid `Σ t·h² / Σ h²` in seconds
    pub fn center_time(&self, ir: &[f64]) -> Result<f64> {
        self.check(ir)?;
        Ok(self.center_time_unchecked(ir))
    }

    /// Index of the first sample whose magnitude reaches 10% of the peak.
    ///
    /// Useful for trimming pre-delay from a recorded IR.
    pub fn find_impulse_start(&self, ir: &[f64]) -> Result<usize> {
        if ir.is_empty() {
            return Err(MeasureError::EmptyImpulseResponse);
        }
        let peak = ir.iter().fold(0.0f64, |m, &x| m.max(x.abs()));
        let threshold = peak * IMPULSE_START_RATIO;
        Ok(ir.iter().position(|x| x.abs() >= threshold).unwrap_or(0))
    }

    fn boundary_sample(&self, time_ms: f64) -> usize {
        let n = (time_ms * 0.001 * self.sample_rate).round();
        if n > 0.0 { n as usize } else { 0 }
    }

    fn definition_unchecked(&self, ir: &[f64], time_ms: f64) -> f64 {
        let boundary = self.boundary_sample(time_ms);
        if boundary == 0 {
            return 0.0;
        }
        if boundary >= ir.len() {
            return 1.0;
        }

        let (early, late) = energy_split(ir, boundary);
        let total = early + late;
        if total <= 0.0 { 0.0 } else { early / total }
    }

    fn clarity_unchecked(&self, ir: &[f64], time_ms: f64) -> f64 {
        let boundary = self.boundary_sample(time_ms);
        if boundary == 0 {
            return f64::NEG_INFINITY;
        }
        if boundary >= ir.len() {
            return f64::INFINITY;
        }

        let (early, late) = energy_split(ir, boundary);
        if late <= 0.0 {
            f64::INFINITY
        } else if early <= 0.0 {
            f64::NEG_INFINITY
        } else {
            10.0 * (early / late).log10()
        }
    }

    fn center_time_unchecked(&self, ir: &[f64]) -> f64 {
        let mut weighted = 0.0;
        let mut total = 0.0;
        for (i, &x) in ir.iter().enumerate() {
            let e = x * x;
            weighted += i as f64 / self.sample_rate * e;
            total += e;
        }
        if total <= 0.0 { 0.0 } else { weighted / total }
    }

    /// Fit the Schroeder curve between `start_db` and `end_db` and
    /// extrapolate to −60 dB. Returns 0 when the range is not reached or
    /// the slope does not fall.
    fn reverb_time(&self, curve: &[f64], start_db: f64, end_db: f64) -> f64 {
        let Some(start) = curve.iter().position(|&v| v <= start_db) else {
            return 0.0;
        };
        let Some(end) = curve[start..].iter().position(|&v| v <= end_db).map(|i| i + start) else {
            return 0.0;
        };
        if end <= start {
            return 0.0;
        }

        let mut sum_x = 0.0;
        let mut sum_y = 0.0;
        let mut sum_xx = 0.0;
        let mut sum_xy = 0.0;
        for (i, &y) in curve[start..=end].iter().enumerate() {
            let x = i as f64;
            sum_x += x;
            sum_y += y;
            sum_xx += x * x;
            sum_xy += x * y;
        }

        let n = (end - start + 1) as f64;
        let denom = n * sum_xx - sum_x * sum_x;
        if denom == 0.0 {
            return 0.0;
        }

        // dB per sample
        let slope = (n * sum_xy - sum_x * sum_y) / denom;
        if slope >= 0.0 {
            return 0.0;
        }

        let rt = -60.0 / (slope * self.sample_rate);
        rt.max(0.0)
    }
}

fn check_time(time_ms: f64) -> Result<()> {
    if time_ms > 0.0 {
        Ok(())
    } else {
        Err(MeasureError::InvalidTime(time_ms))
    }
}

fn energy(samples: &[f64]) -> f64 {
    samples.iter().map(|x| x * x).sum()
}

/// (early, late) energy on either side of `boundary`
fn energy_split(ir: &[f64], boundary: usize) -> (f64, f64) {
    let (early, late) = ir.split_at(boundary.min(ir.len()));
    (energy(early), energy(late))
}

/// Backward cumulative energy in dB relative to the total
fn schroeder_db(ir: &[f64]) -> Vec<f64> {
    let mut curve = vec![0.0; ir.len()];
    let mut sum = 0.0;
    for (c, &x) in curve.iter_mut().zip(ir).rev() {
        sum += x * x;
        *c = sum;
    }

    let total = sum;
    if total <= 0.0 {
        return curve;
    }

    for c in curve.iter_mut() {
        let ratio = *c / total;
        *c = if ratio > 0.0 {
            10.0 * ratio.log10()
        } else {
            SCHROEDER_FLOOR_DB
        };
    }
    curve
}
