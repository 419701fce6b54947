//! Window functions and their spectral characteristics
//!
//! Coefficients are generated in symmetric form: sample `n` of an `N`-point
//! window sits at normalized position `x = n / (N - 1)`. Cosine-sum windows
//! evaluate `Σ a_k · cos(2πkx)`.
//!
//! [`analyze`] measures a coefficient set numerically by evaluating its DFT
//! directly, which works for any window including the parametric ones.
//! [`Window::first_null_bins`] is the closed-form shortcut for the windows
//! whose main-lobe width is known analytically.

use std::f64::consts::{LN_2, PI};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const HANN: [f64; 2] = [0.5, -0.5];
const HAMMING: [f64; 2] = [0.54, -0.46];
const BLACKMAN: [f64; 3] = [0.42, -0.5, 0.08];
const EXACT_BLACKMAN: [f64; 3] = [7938.0 / 18608.0, -9240.0 / 18608.0, 1430.0 / 18608.0];
const BLACKMAN_HARRIS_3: [f64; 3] = [0.42323, -0.49755, 0.07922];
const BLACKMAN_HARRIS_4: [f64; 4] = [0.35875, -0.48829, 0.14128, -0.01168];
const BLACKMAN_NUTTALL: [f64; 4] = [0.3635819, -0.4891775, 0.1365995, -0.0106411];
const NUTTALL_CTD: [f64; 4] = [0.338946, -0.481973, 0.161054, -0.018027];
const NUTTALL_CFD: [f64; 4] = [0.355768, -0.487396, 0.144232, -0.012604];
const FLAT_TOP: [f64; 5] = [
    0.21557895,
    -0.41663158,
    0.277263158,
    -0.083578947,
    0.006947368,
];

/// Window function types
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Window {
    /// Rectangular (no windowing)
    Rectangular,
    /// Hann window (raised cosine)
    #[default]
    Hann,
    /// Hamming window
    Hamming,
    /// Blackman window
    Blackman,
    /// Blackman window with exact zero-placing coefficients
    ExactBlackman,
    /// Minimum 3-term Blackman-Harris (-67 dB sidelobes)
    BlackmanHarris3Term,
    /// Minimum 4-term Blackman-Harris (-92 dB sidelobes)
    BlackmanHarris4Term,
    /// Blackman-Nuttall 4-term window
    BlackmanNuttall,
    /// Nuttall 4-term window with continuous third derivative
    NuttallCtd,
    /// Nuttall 4-term window with continuous first derivative
    NuttallCfd,
    /// 5-term flat-top window (accurate amplitude, wide main lobe)
    FlatTop,
    /// Kaiser window with shape parameter `beta`
    Kaiser {
        /// Shape parameter; 0 degenerates to rectangular
        beta: f64,
    },
    /// Tukey (tapered cosine) window; `alpha` is the tapered fraction
    Tukey {
        /// Tapered fraction in `[0, 1]`
        alpha: f64,
    },
    /// Triangle window (zero at both ends)
    Triangle,
    /// Cosine (sine) window
    Cosine,
    /// Welch (parabolic) window
    Welch,
    /// Lanczos (sinc) window
    Lanczos,
    /// Gaussian window; `alpha` scales the width (larger is narrower)
    Gauss {
        /// Width parameter, must be positive
        alpha: f64,
    },
}

impl Window {
    /// Window value at normalized position `x ∈ [0, 1]`.
    pub fn value_at(&self, x: f64) -> f64 {
        let x = x.clamp(0.0, 1.0);
        match *self {
            Window::Rectangular => 1.0,
            Window::Hann => cosine_sum(x, &HANN),
            Window::Hamming => cosine_sum(x, &HAMMING),
            Window::Blackman => cosine_sum(x, &BLACKMAN),
            Window::ExactBlackman => cosine_sum(x, &EXACT_BLACKMAN),
            Window::BlackmanHarris3Term => cosine_sum(x, &BLACKMAN_HARRIS_3),
            Window::BlackmanHarris4Term => cosine_sum(x, &BLACKMAN_HARRIS_4),
            Window::BlackmanNuttall => cosine_sum(x, &BLACKMAN_NUTTALL),
            Window::NuttallCtd => cosine_sum(x, &NUTTALL_CTD),
            Window::NuttallCfd => cosine_sum(x, &NUTTALL_CFD),
            Window::FlatTop => cosine_sum(x, &FLAT_TOP),
            Window::Kaiser { beta } => kaiser_at(x, beta),
            Window::Tukey { alpha } => tukey_at(x, alpha),
            Window::Triangle => {
                if x <= 0.5 {
                    2.0 * x
                } else {
                    2.0 * (1.0 - x)
                }
            }
            Window::Cosine => (PI * x).sin(),
            Window::Welch => {
                let d = x - 0.5;
                1.0 - 4.0 * d * d
            }
            Window::Lanczos => sinc(2.0 * x - 1.0),
            Window::Gauss { alpha } => {
                let v = (2.0 * x - 1.0) * alpha;
                (-LN_2 * v * v).exp()
            }
        }
    }

    /// Get window coefficients
    pub fn coefficients(&self, size: usize) -> Vec<f64> {
        (0..size)
            .map(|n| self.value_at(sample_position(n, size)))
            .collect()
    }

    /// Apply window to a buffer
    pub fn apply(&self, buffer: &mut [f64]) {
        let n = buffer.len();
        if matches!(self, Window::Rectangular) {
            return;
        }
        for (i, sample) in buffer.iter_mut().enumerate() {
            *sample *= self.value_at(sample_position(i, n));
        }
    }

    /// Analytic first-null position of the main lobe, in bins.
    ///
    /// Returns `None` for windows whose main-lobe width depends on their
    /// parameters in a way that has no table entry; measure those with
    /// [`first_minimum_bins`].
    pub fn first_null_bins(&self) -> Option<f64> {
        match self {
            Window::Rectangular => Some(1.0),
            Window::Hann | Window::Hamming | Window::Triangle | Window::Cosine | Window::Welch => {
                Some(2.0)
            }
            Window::Blackman
            | Window::ExactBlackman
            | Window::Kaiser { .. }
            | Window::BlackmanHarris3Term => Some(3.0),
            Window::BlackmanHarris4Term
            | Window::BlackmanNuttall
            | Window::NuttallCtd
            | Window::NuttallCfd => Some(4.0),
            Window::FlatTop => Some(5.0),
            Window::Tukey { .. } | Window::Lanczos | Window::Gauss { .. } => None,
        }
    }
}

fn sample_position(n: usize, size: usize) -> f64 {
    if size <= 1 {
        return 0.0;
    }
    n as f64 / (size - 1) as f64
}

fn cosine_sum(x: f64, coeffs: &[f64]) -> f64 {
    let phase = 2.0 * PI * x;
    coeffs
        .iter()
        .enumerate()
        .map(|(k, &c)| c * (k as f64 * phase).cos())
        .sum()
}

fn kaiser_at(x: f64, beta: f64) -> f64 {
    if beta <= 0.0 {
        return 1.0;
    }
    let r = 2.0 * x - 1.0;
    let term = (1.0 - r * r).max(0.0).sqrt();
    bessel_i0(beta * term) / bessel_i0(beta)
}

fn tukey_at(x: f64, alpha: f64) -> f64 {
    if alpha <= 0.0 {
        return 1.0;
    }
    if alpha >= 1.0 {
        return cosine_sum(x, &HANN);
    }

    let a = alpha / 2.0;
    if x < a {
        0.5 * (1.0 + (PI * (2.0 * x / alpha - 1.0)).cos())
    } else if x <= 1.0 - a {
        1.0
    } else {
        0.5 * (1.0 + (PI * (2.0 * x / alpha - 2.0 / alpha + 1.0)).cos())
    }
}

fn sinc(x: f64) -> f64 {
    if x == 0.0 {
        return 1.0;
    }
    let px = PI * x;
    px.sin() / px
}

/// Polynomial approximation of the modified Bessel function I0
/// (Abramowitz & Stegun 9.8.1 / 9.8.2).
fn bessel_i0(x: f64) -> f64 {
    let ax = x.abs();
    if ax < 3.75 {
        let y = (x / 3.75) * (x / 3.75);
        return 1.0
            + y * (3.5156229
                + y * (3.0899424 + y * (1.2067492 + y * (0.2659732 + y * (0.0360768 + y * 0.0045813)))));
    }

    let y = 3.75 / ax;
    (ax.exp() / ax.sqrt())
        * (0.39894228
            + y * (0.01328592
                + y * (0.00225319
                    + y * (-0.00157565
                        + y * (0.00916281
                            + y * (-0.02057706
                                + y * (0.02635537 + y * (-0.01647633 + y * 0.00392377))))))))
}

/// Numerically measured spectral properties of a window.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WindowAnalysis {
    /// `Σw / N`, the DC response of the window
    pub coherent_gain: f64,
    /// Equivalent noise bandwidth in bins
    pub enbw: f64,
    /// Two-sided half-power main-lobe width in bins
    pub bandwidth_3db: f64,
    /// Highest sidelobe relative to DC in dB
    pub highest_sidelobe_db: f64,
    /// First main-lobe null, in bins from DC
    pub first_minimum_bins: f64,
    /// Amplitude error for a tone half a bin off-center, in dB
    pub scallop_loss_db: f64,
}

/// Measure the spectral properties of a coefficient set.
///
/// Cost grows with the square of the window length because the sidelobe
/// search evaluates the DFT across the whole band.
pub fn analyze(coeffs: &[f64]) -> WindowAnalysis {
    let n = coeffs.len();
    if n == 0 {
        return WindowAnalysis::default();
    }

    let dc_ref = dft_mag_sq(coeffs, 0.0);
    if dc_ref == 0.0 {
        return WindowAnalysis::default();
    }

    let sum: f64 = coeffs.iter().sum();
    let sum_sq: f64 = coeffs.iter().map(|c| c * c).sum();
    let coherent_gain = sum / n as f64;
    let enbw = n as f64 * sum_sq / (sum * sum);

    let half_bin = dft_mag_sq(coeffs, 0.5 / n as f64);
    let scallop_loss_db = if half_bin > 0.0 {
        10.0 * (half_bin / dc_ref).log10()
    } else {
        0.0
    };

    let first_minimum_bins = first_minimum_bins(coeffs);

    WindowAnalysis {
        coherent_gain,
        enbw,
        bandwidth_3db: search_bandwidth(coeffs, dc_ref),
        highest_sidelobe_db: search_highest_sidelobe(coeffs, dc_ref, first_minimum_bins),
        first_minimum_bins,
        scallop_loss_db,
    }
}

/// Equivalent noise bandwidth of a window in bins.
///
/// Returns `None` for an empty window or one with zero coherent gain.
pub fn equivalent_noise_bandwidth(coeffs: &[f64]) -> Option<f64> {
    let sum: f64 = coeffs.iter().sum();
    if coeffs.is_empty() || sum == 0.0 {
        return None;
    }
    let sum_sq: f64 = coeffs.iter().map(|c| c * c).sum();
    Some(coeffs.len() as f64 * sum_sq / (sum * sum))
}

/// `|DFT(freq)|²` at normalized frequency `freq` (cycles per sample).
fn dft_mag_sq(coeffs: &[f64], freq: f64) -> f64 {
    let w = 2.0 * PI * freq;
    let (re, im) = coeffs
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(re, im), (k, &c)| {
            let phase = w * k as f64;
            (re + c * phase.cos(), im - c * phase.sin())
        });
    re * re + im * im
}

/// Half-power point by bisection on `[0, Nyquist]`, reported two-sided.
fn search_bandwidth(coeffs: &[f64], dc_ref: f64) -> f64 {
    let mut lo = 0.0;
    let mut hi = 0.5;
    for _ in 0..80 {
        let mid = (lo + hi) / 2.0;
        if dft_mag_sq(coeffs, mid) / dc_ref > 0.5 {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    2.0 * lo * coeffs.len() as f64
}

/// First spectral null of the main lobe, in bins.
///
/// Scans outward from DC in 1/8-bin steps for the first turn-around after
/// the response has dropped below 10% of DC (so flat-top plateaus are not
/// mistaken for a null), then refines with a golden-section search.
pub fn first_minimum_bins(coeffs: &[f64]) -> f64 {
    let n = coeffs.len();
    if n == 0 {
        return 0.0;
    }
    let nf = n as f64;
    let step = 1.0 / (nf * 8.0);

    let dc = dft_mag_sq(coeffs, 0.0);
    let threshold = dc * 0.1;
    let mut prev = dc;
    let mut coarse = step;

    let mut freq = step;
    while freq < 0.5 {
        let val = dft_mag_sq(coeffs, freq);
        if prev < threshold && val > prev {
            coarse = freq - step;
            break;
        }
        prev = val;
        freq += step;
    }

    const PHI: f64 = 0.618_033_988_749_894_9;
    let mut a = (coarse - 2.0 * step).max(0.0);
    let mut b = (coarse + 2.0 * step).min(0.5);
    let mut c = b - PHI * (b - a);
    let mut d = a + PHI * (b - a);
    for _ in 0..80 {
        if dft_mag_sq(coeffs, c) < dft_mag_sq(coeffs, d) {
            b = d;
        } else {
            a = c;
        }
        c = b - PHI * (b - a);
        d = a + PHI * (b - a);
    }

    (a + b) / 2.0 * nf
}

fn search_highest_sidelobe(coeffs: &[f64], dc_ref: f64, first_min_bins: f64) -> f64 {
    let nf = coeffs.len() as f64;
    let start = first_min_bins / nf;
    let step = 1.0 / (nf * 8.0);

    let mut peak_val = 0.0;
    let mut peak_freq = start;
    let mut freq = start;
    while freq < 0.5 {
        let val = dft_mag_sq(coeffs, freq);
        if val > peak_val {
            peak_val = val;
            peak_freq = freq;
        }
        freq += step;
    }

    let fine = step / 32.0;
    let mut refined = peak_val;
    let mut freq = (peak_freq - step).max(0.0);
    while freq <= peak_freq + step {
        refined = refined.max(dft_mag_sq(coeffs, freq));
        freq += fine;
    }

    if refined <= 0.0 {
        return f64::NEG_INFINITY;
    }
    10.0 * (refined / dc_ref).log10()
}
