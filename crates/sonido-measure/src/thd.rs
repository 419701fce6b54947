//! Harmonic distortion analysis (THD, THD+N, SINAD, rub & buzz)
//!
//! Works on the non-negative half of a spectrum. Each harmonic's level is
//! the sum of bin magnitudes within `capture_bins` of its center bin, which
//! gathers the energy a non-rectangular window spreads into neighbouring
//! bins. Everything in range that is neither the fundamental nor a harmonic
//! counts as noise.
//!
//! Three entry points share one algorithm:
//!
//! - [`analyze`] / [`ThdCalculator::calculate`]: complex FFT output
//! - [`analyze_signal`] / [`ThdCalculator::analyze_signal`]: time-domain
//!   signal, windowed and transformed first
//! - [`ThdCalculator::calculate_from_magnitude`]: squared magnitudes
//!
//! Degenerate inputs never fail; they produce a zeroed or partial
//! [`ThdResult`].
//!
//! # Example
//!
//! ```rust
//! use sonido_measure::{ThdConfig, thd};
//! use std::f64::consts::PI;
//!
//! let sample_rate = 48000.0;
//! let signal: Vec<f64> = (0..4096)
//!     .map(|i| {
//!         let t = i as f64 / sample_rate;
//!         (2.0 * PI * 750.0 * t).sin() + 0.01 * (2.0 * PI * 1500.0 * t).sin()
//!     })
//!     .collect();
//!
//! let result = thd::analyze_signal(&signal, &ThdConfig::new(sample_rate, 4096));
//! assert!((result.fundamental_freq - 750.0).abs() < 1e-9);
//! assert!((result.thd - 0.01).abs() < 1e-3);
//! ```

use crate::fft::{Fft, next_power_of_two};
use crate::window::{Window, first_minimum_bins};
use rustfft::num_complex::Complex;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default lower edge of the analysis range (Hz)
pub const DEFAULT_RANGE_LOWER_HZ: f64 = 20.0;
/// Default upper edge of the analysis range (Hz)
pub const DEFAULT_RANGE_UPPER_HZ: f64 = 20000.0;
/// Default first harmonic counted as rub & buzz
pub const DEFAULT_RUB_N_BUZZ_START: usize = 10;

/// Longest window generated when the capture width has to be measured.
const MAX_CAPTURE_ANALYSIS_LEN: usize = 4096;

/// THD analysis settings.
///
/// Zero or unset fields are filled in by [`normalized`](Self::normalized);
/// `sample_rate` and `fft_size` fall back to values derived from the input
/// when left at zero.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ThdConfig {
    /// Sample rate in Hz (0 = use the FFT size, giving 1 Hz bins)
    pub sample_rate: f64,
    /// FFT size (0 = derive from the input length)
    pub fft_size: usize,
    /// Known fundamental in Hz (`None` = strongest bin in range)
    pub fundamental_freq: Option<f64>,
    /// Lower edge of the analysis range in Hz
    pub range_lower_freq: f64,
    /// Upper edge of the analysis range in Hz
    pub range_upper_freq: f64,
    /// Bins summed on each side of a tone (`None` or 0 = derive from the window)
    pub capture_bins: Option<usize>,
    /// Harmonics to evaluate, starting at H2 (`None` = all in range)
    pub max_harmonics: Option<usize>,
    /// Lowest harmonic order counted as rub & buzz
    pub rub_n_buzz_start: usize,
    /// Window applied by [`analyze_signal`]; also selects the auto capture width
    pub window: Window,
}

impl Default for ThdConfig {
    fn default() -> Self {
        Self {
            sample_rate: 0.0,
            fft_size: 0,
            fundamental_freq: None,
            range_lower_freq: DEFAULT_RANGE_LOWER_HZ,
            range_upper_freq: DEFAULT_RANGE_UPPER_HZ,
            capture_bins: None,
            max_harmonics: None,
            rub_n_buzz_start: DEFAULT_RUB_N_BUZZ_START,
            window: Window::Hann,
        }
    }
}

impl ThdConfig {
    /// Create a config for the given sample rate and FFT size
    pub fn new(sample_rate: f64, fft_size: usize) -> Self {
        Self {
            sample_rate,
            fft_size,
            ..Self::default()
        }
    }

    /// Set a known fundamental frequency
    pub fn with_fundamental(mut self, freq: f64) -> Self {
        self.fundamental_freq = Some(freq);
        self
    }

    /// Set the analysis frequency range
    pub fn with_range(mut self, lower: f64, upper: f64) -> Self {
        self.range_lower_freq = lower;
        self.range_upper_freq = upper;
        self
    }

    /// Set the number of capture bins on each side of a tone (0 = auto)
    pub fn with_capture_bins(mut self, bins: usize) -> Self {
        self.capture_bins = Some(bins);
        self
    }

    /// Limit the number of harmonics evaluated
    pub fn with_max_harmonics(mut self, max: usize) -> Self {
        self.max_harmonics = Some(max);
        self
    }

    /// Set the first harmonic order counted as rub & buzz
    pub fn with_rub_n_buzz_start(mut self, order: usize) -> Self {
        self.rub_n_buzz_start = order;
        self
    }

    /// Set the window function
    pub fn with_window(mut self, window: Window) -> Self {
        self.window = window;
        self
    }

    /// Resolve defaults.
    ///
    /// - a non-positive range edge becomes 20 Hz / 20 kHz; an upper edge
    ///   below the lower one is raised to it
    /// - `rub_n_buzz_start` below 1 becomes 10
    /// - a non-positive fundamental means auto-detect
    /// - `max_harmonics` of `Some(0)` means unbounded
    /// - `capture_bins` of `Some(0)` means derive from the window
    pub fn normalized(&self) -> Self {
        let mut cfg = *self;

        cfg.range_lower_freq = positive_or(cfg.range_lower_freq, DEFAULT_RANGE_LOWER_HZ);
        cfg.range_upper_freq = positive_or(cfg.range_upper_freq, DEFAULT_RANGE_UPPER_HZ);
        if cfg.range_upper_freq < cfg.range_lower_freq {
            cfg.range_upper_freq = cfg.range_lower_freq;
        }
        if cfg.rub_n_buzz_start == 0 {
            cfg.rub_n_buzz_start = DEFAULT_RUB_N_BUZZ_START;
        }
        cfg.fundamental_freq = cfg.fundamental_freq.filter(|&f| f > 0.0);
        cfg.max_harmonics = cfg.max_harmonics.filter(|&n| n > 0);
        cfg.capture_bins = cfg.capture_bins.filter(|&n| n > 0);

        cfg
    }
}

/// Result of a THD analysis. All ratios are relative to the fundamental level.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ThdResult {
    /// Frequency of the fundamental bin (Hz)
    pub fundamental_freq: f64,
    /// Fundamental level (summed bin magnitudes)
    pub fundamental_level: f64,
    /// Harmonic distortion ratio
    pub thd: f64,
    /// Harmonic distortion plus noise ratio
    pub thdn: f64,
    /// THD in dB
    pub thd_db: f64,
    /// THD+N in dB
    pub thdn_db: f64,
    /// Odd-order harmonics (H3, H5, ...)
    pub odd_hd: f64,
    /// Even-order harmonics (H2, H4, ...)
    pub even_hd: f64,
    /// Everything in range that is neither fundamental nor harmonic
    pub noise: f64,
    /// Harmonics from `rub_n_buzz_start` upward
    pub rub_n_buzz: f64,
    /// Ratio of each non-zero harmonic, in order
    pub harmonics: Vec<f64>,
    /// Signal to noise and distortion in dB (`+inf` when THD+N is zero)
    pub sinad: f64,
}

/// THD calculator holding a normalized configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThdCalculator {
    config: ThdConfig,
}

impl ThdCalculator {
    /// Create a calculator; the config is normalized once here
    pub fn new(config: ThdConfig) -> Self {
        Self {
            config: config.normalized(),
        }
    }

    /// The normalized configuration in use
    pub fn config(&self) -> &ThdConfig {
        &self.config
    }

    /// Analyze a complex spectrum (full FFT output, `fft_size` points).
    ///
    /// Only bins `0..=len/2` are used. A zero `fft_size` is taken from the
    /// spectrum length and a zero sample rate from the FFT size.
    pub fn calculate(&self, spectrum: &[Complex<f64>]) -> ThdResult {
        if spectrum.is_empty() {
            return ThdResult::default();
        }
        let bin_count = spectrum.len() / 2 + 1;
        if bin_count <= 1 {
            return ThdResult::default();
        }

        let mag_squared: Vec<f64> = spectrum[..bin_count].iter().map(|c| c.norm_sqr()).collect();

        let mut config = self.config;
        if config.fft_size == 0 {
            config.fft_size = spectrum.len();
        }
        config.sample_rate = positive_or(config.sample_rate, config.fft_size as f64);

        Self { config }.calculate_from_magnitude(&mag_squared)
    }

    /// Window, transform, and analyze a time-domain signal.
    ///
    /// The FFT size is the configured one or the next power of two above
    /// the signal length. At most `fft_size` samples are used; they are
    /// windowed over their own length and zero-padded.
    pub fn analyze_signal(&self, signal: &[f64]) -> ThdResult {
        if signal.is_empty() {
            return ThdResult::default();
        }

        let mut config = self.config;
        if config.fft_size == 0 {
            config.fft_size = next_power_of_two(signal.len());
        }
        if config.fft_size <= 1 {
            return ThdResult::default();
        }
        config.sample_rate = positive_or(config.sample_rate, config.fft_size as f64);

        let Ok(fft) = Fft::new(config.fft_size) else {
            return ThdResult::default();
        };

        let used = signal.len().min(config.fft_size);
        let mut windowed = signal[..used].to_vec();
        config.window.apply(&mut windowed);

        let spectrum = fft.forward_real(&windowed);
        Self { config }.calculate(&spectrum)
    }

    /// Analyze squared magnitudes of bins `0..=Nyquist`.
    pub fn calculate_from_magnitude(&self, mag_squared: &[f64]) -> ThdResult {
        if mag_squared.len() <= 1 {
            return ThdResult::default();
        }

        let cfg = &self.config;
        let fft_size = if cfg.fft_size == 0 {
            2 * (mag_squared.len() - 1)
        } else {
            cfg.fft_size
        };
        if fft_size <= 1 {
            return ThdResult::default();
        }
        let sample_rate = positive_or(cfg.sample_rate, fft_size as f64);

        let max_bin = mag_squared.len() - 1;
        let bin_hz = sample_rate / fft_size as f64;

        let lower_bin = freq_to_bin(cfg.range_lower_freq, bin_hz).clamp(1, max_bin);
        let upper_bin = freq_to_bin(cfg.range_upper_freq, bin_hz).clamp(lower_bin, max_bin);

        let fundamental_bin = match cfg.fundamental_freq {
            Some(freq) => freq_to_bin(freq, bin_hz).clamp(lower_bin, upper_bin),
            None => strongest_bin(mag_squared, lower_bin, upper_bin),
        };

        let mut capture = cfg
            .capture_bins
            .unwrap_or_else(|| auto_capture_bins(cfg.window, fft_size));
        if capture > fundamental_bin / 2 {
            capture = fundamental_bin / 2;
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            lower_bin,
            upper_bin,
            fundamental_bin,
            capture,
            "resolved THD bins"
        );

        let fundamental_freq = fundamental_bin as f64 * bin_hz;
        let fundamental_level = bin_value(mag_squared, fundamental_bin, capture);
        if fundamental_level <= 0.0 {
            return ThdResult {
                fundamental_freq,
                ..ThdResult::default()
            };
        }

        let mut thd_abs = 0.0;
        let mut odd_abs = 0.0;
        let mut even_abs = 0.0;
        let mut rub_abs = 0.0;
        let mut harmonics = Vec::with_capacity(8);
        let mut count = 0;

        for k in 2.. {
            if cfg.max_harmonics.is_some_and(|max| count >= max) {
                break;
            }
            let bin = k * fundamental_bin;
            if bin > upper_bin || bin > max_bin {
                break;
            }
            if bin < lower_bin {
                continue;
            }

            let value = bin_value(mag_squared, bin, capture);
            thd_abs += value;
            if k % 2 == 0 {
                even_abs += value;
            } else {
                odd_abs += value;
            }
            if k >= cfg.rub_n_buzz_start {
                rub_abs += value;
            }
            if value > 0.0 {
                harmonics.push(value / fundamental_level);
            }
            count += 1;
        }

        let total_abs: f64 = mag_squared[lower_bin..=upper_bin]
            .iter()
            .map(|&m| sqrt_positive(m))
            .sum();
        let thdn_abs = (total_abs - fundamental_level).max(0.0);
        let noise_abs = (thdn_abs - thd_abs).max(0.0);

        let thd = thd_abs / fundamental_level;
        let thdn = thdn_abs / fundamental_level;
        let sinad = if thdn > 0.0 {
            20.0 * (1.0 / thdn).log10()
        } else {
            f64::INFINITY
        };

        ThdResult {
            fundamental_freq,
            fundamental_level,
            thd,
            thdn,
            thd_db: ratio_to_db(thd),
            thdn_db: ratio_to_db(thdn),
            odd_hd: odd_abs / fundamental_level,
            even_hd: even_abs / fundamental_level,
            noise: noise_abs / fundamental_level,
            rub_n_buzz: rub_abs / fundamental_level,
            harmonics,
            sinad,
        }
    }
}

/// One-shot analysis of a complex spectrum
pub fn analyze(spectrum: &[Complex<f64>], config: &ThdConfig) -> ThdResult {
    ThdCalculator::new(*config).calculate(spectrum)
}

/// One-shot analysis of a time-domain signal
pub fn analyze_signal(signal: &[f64], config: &ThdConfig) -> ThdResult {
    ThdCalculator::new(*config).analyze_signal(signal)
}

/// `20·log10(v)`, or negative infinity for `v <= 0`
pub fn ratio_to_db(v: f64) -> f64 {
    if v > 0.0 {
        20.0 * v.log10()
    } else {
        f64::NEG_INFINITY
    }
}

/// Level of a tone at `bin`: the sum of bin magnitudes within `capture`
/// bins on each side, clamped to the spectrum.
pub fn bin_value(mag_squared: &[f64], bin: usize, capture: usize) -> f64 {
    if bin >= mag_squared.len() {
        return 0.0;
    }
    if capture == 0 {
        return sqrt_positive(mag_squared[bin]);
    }

    let lo = bin.saturating_sub(capture);
    let hi = bin.saturating_add(capture).min(mag_squared.len() - 1);
    mag_squared[lo..=hi].iter().map(|&m| sqrt_positive(m)).sum()
}

fn positive_or(v: f64, fallback: f64) -> f64 {
    if v > 0.0 { v } else { fallback }
}

fn sqrt_positive(v: f64) -> f64 {
    if v > 0.0 { v.sqrt() } else { 0.0 }
}

fn freq_to_bin(freq: f64, bin_hz: f64) -> usize {
    let bin = (freq / bin_hz).round();
    if bin > 0.0 { bin as usize } else { 0 }
}

/// First bin holding the largest value in `lower..=upper`
fn strongest_bin(mag_squared: &[f64], lower: usize, upper: usize) -> usize {
    let mut best_bin = lower;
    let mut best_val = -1.0;
    for (i, &v) in mag_squared.iter().enumerate().take(upper + 1).skip(lower) {
        if v > best_val {
            best_val = v;
            best_bin = i;
        }
    }
    best_bin
}

/// Capture width from the window's first null, measured numerically for
/// windows without a tabulated value.
fn auto_capture_bins(window: Window, fft_size: usize) -> usize {
    if let Some(bins) = window.first_null_bins() {
        return bins.round() as usize;
    }

    let n = fft_size.min(MAX_CAPTURE_ANALYSIS_LEN);
    if n == 0 {
        return 0;
    }
    let bins = first_minimum_bins(&window.coefficients(n));
    if bins.is_nan() || bins <= 0.0 {
        return 0;
    }
    bins.round() as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    /// 16384-point FFT at 16384 Hz: one bin per Hz, 8193 magnitude bins
    fn unit_bin_config() -> ThdConfig {
        ThdConfig::new(16384.0, 16384)
    }

    fn spectrum_with(bins: &[(usize, f64)]) -> Vec<f64> {
        let mut mag = vec![0.0; 8193];
        for &(bin, value) in bins {
            mag[bin] = value;
        }
        mag
    }

    #[test]
    fn test_normalized_defaults() {
        let cfg = ThdConfig {
            range_lower_freq: 0.0,
            range_upper_freq: -5.0,
            rub_n_buzz_start: 0,
            fundamental_freq: Some(0.0),
            max_harmonics: Some(0),
            capture_bins: Some(0),
            ..ThdConfig::default()
        }
        .normalized();

        assert_eq!(cfg.range_lower_freq, DEFAULT_RANGE_LOWER_HZ);
        assert_eq!(cfg.range_upper_freq, DEFAULT_RANGE_UPPER_HZ);
        assert_eq!(cfg.rub_n_buzz_start, DEFAULT_RUB_N_BUZZ_START);
        assert_eq!(cfg.fundamental_freq, None);
        assert_eq!(cfg.max_harmonics, None);
        assert_eq!(cfg.capture_bins, None);
        assert_eq!(cfg.window, Window::Hann);
    }

    #[test]
    fn test_normalized_inverted_range() {
        let cfg = ThdConfig::default().with_range(500.0, 100.0).normalized();
        assert_eq!(cfg.range_lower_freq, 500.0);
        assert_eq!(cfg.range_upper_freq, 500.0);
    }

    #[test]
    fn test_metrics_from_magnitude() {
        let mag = spectrum_with(&[
            (1000, 1.0),
            (2000, 0.1 * 0.1),
            (3000, 0.05 * 0.05),
            (4500, 0.02 * 0.02),
        ]);
        // zero capture falls back to the Hann width, which reaches no
        // neighbouring energy in this spectrum
        let cfg = unit_bin_config()
            .with_capture_bins(0)
            .with_rub_n_buzz_start(3);

        let r = ThdCalculator::new(cfg).calculate_from_magnitude(&mag);

        assert!((r.fundamental_freq - 1000.0).abs() < 1e-12);
        assert!((r.fundamental_level - 1.0).abs() < 1e-12);
        assert!((r.thd - 0.15).abs() < 1e-12);
        assert!((r.thdn - 0.17).abs() < 1e-12);
        assert!((r.noise - 0.02).abs() < 1e-12);
        assert!((r.odd_hd - 0.05).abs() < 1e-12);
        assert!((r.even_hd - 0.1).abs() < 1e-12);
        assert!((r.rub_n_buzz - 0.05).abs() < 1e-12);
        assert_eq!(r.harmonics.len(), 2);
        assert!((r.harmonics[0] - 0.1).abs() < 1e-12);
        assert!((r.harmonics[1] - 0.05).abs() < 1e-12);
        assert!((r.sinad - 20.0 * (1.0 / 0.17f64).log10()).abs() < 1e-9);
        assert!((r.thd_db - 20.0 * 0.15f64.log10()).abs() < 1e-9);
    }

    #[test]
    fn test_auto_detects_strongest_tone() {
        let mag = spectrum_with(&[(1000, 0.8 * 0.8), (1200, 1.2 * 1.2)]);
        let r = ThdCalculator::new(unit_bin_config())
            .calculate_from_magnitude(&mag);
        assert!((r.fundamental_freq - 1200.0).abs() < 1e-12);
    }

    #[test]
    fn test_given_fundamental_is_clamped_to_range() {
        let mag = spectrum_with(&[(1000, 1.0)]);
        let cfg = unit_bin_config()
            .with_range(100.0, 5000.0)
            .with_fundamental(9000.0);
        let r = ThdCalculator::new(cfg).calculate_from_magnitude(&mag);
        assert!((r.fundamental_freq - 5000.0).abs() < 1e-12);
        // nothing at bin 5000
        assert_eq!(r.fundamental_level, 0.0);
        assert_eq!(r.thd, 0.0);
    }

    #[test]
    fn test_capture_bins_sum_neighbours() {
        let mag = spectrum_with(&[
            (999, 0.04),
            (1000, 1.0),
            (1001, 0.04),
            (2000, 0.01),
            (2001, 0.0025),
        ]);
        let r = ThdCalculator::new(unit_bin_config().with_capture_bins(1))
            .calculate_from_magnitude(&mag);

        assert!((r.fundamental_level - 1.4).abs() < 1e-12);
        assert!((r.thd - 0.15 / 1.4).abs() < 1e-12);
    }

    #[test]
    fn test_capture_clamped_to_half_fundamental_bin() {
        // fundamental at bin 4 allows at most 2 capture bins
        let mut mag = vec![0.0; 65];
        mag[4] = 1.0;
        mag[1] = 1.0;
        let cfg = ThdConfig::new(128.0, 128)
            .with_range(1.0, 64.0)
            .with_fundamental(4.0)
            .with_capture_bins(10);
        let r = ThdCalculator::new(cfg).calculate_from_magnitude(&mag);
        // bin 1 lies outside 4 ± 2
        assert!((r.fundamental_level - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_capture_derives_from_window() {
        let mag = spectrum_with(&[(999, 0.25), (1000, 1.0), (1001, 0.25)]);

        let zero = ThdCalculator::new(unit_bin_config().with_capture_bins(0))
            .calculate_from_magnitude(&mag);
        let unset = ThdCalculator::new(unit_bin_config()).calculate_from_magnitude(&mag);

        // Hann spreads the tone over its neighbours; both pick them up
        assert!((zero.fundamental_level - 2.0).abs() < 1e-12);
        assert_eq!(zero, unset);
    }

    #[test]
    fn test_huge_capture_is_clamped() {
        let mag = spectrum_with(&[(400, 0.25), (1000, 1.0), (2000, 0.01)]);
        let cfg = unit_bin_config()
            .with_fundamental(1000.0)
            .with_capture_bins(usize::MAX);
        let r = ThdCalculator::new(cfg).calculate_from_magnitude(&mag);

        // capture clamps to 500, so bin 400 stays outside the fundamental
        assert!((r.fundamental_level - 1.0).abs() < 1e-12);
        assert!((r.thd - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_max_harmonics_limit() {
        let mag = spectrum_with(&[(1000, 1.0), (2000, 0.01), (3000, 0.01), (4000, 0.01)]);
        let cfg = unit_bin_config().with_max_harmonics(2);
        let r = ThdCalculator::new(cfg).calculate_from_magnitude(&mag);

        assert_eq!(r.harmonics.len(), 2);
        assert!((r.thd - 0.2).abs() < 1e-12);
        // H4 falls back into noise
        assert!((r.noise - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_pure_tone() {
        let mag = spectrum_with(&[(1000, 4.0)]);
        let r = ThdCalculator::new(unit_bin_config())
            .calculate_from_magnitude(&mag);

        assert!((r.fundamental_level - 2.0).abs() < 1e-12);
        assert_eq!(r.thd, 0.0);
        assert_eq!(r.thdn, 0.0);
        assert_eq!(r.thd_db, f64::NEG_INFINITY);
        assert_eq!(r.sinad, f64::INFINITY);
        assert!(r.harmonics.is_empty());
    }

    #[test]
    fn test_degenerate_inputs() {
        let calc = ThdCalculator::new(ThdConfig::default());
        assert_eq!(calc.calculate(&[]), ThdResult::default());
        assert_eq!(calc.calculate_from_magnitude(&[1.0]), ThdResult::default());
        assert_eq!(calc.analyze_signal(&[]), ThdResult::default());
        assert_eq!(calc.analyze_signal(&[1.0]), ThdResult::default());
        assert_eq!(
            calc.calculate(&[Complex::new(1.0, 0.0)]),
            ThdResult::default()
        );
    }

    #[test]
    fn test_silent_spectrum_reports_frequency_only() {
        let mag = vec![0.0; 8193];
        let r = ThdCalculator::new(unit_bin_config()).calculate_from_magnitude(&mag);
        assert!((r.fundamental_freq - 20.0).abs() < 1e-12);
        assert_eq!(r.fundamental_level, 0.0);
        assert!(r.harmonics.is_empty());
        assert_eq!(r.sinad, 0.0);
    }

    #[test]
    fn test_calculate_defaults_size_and_rate() {
        // 64-point spectrum with no rate: 1 Hz bins, bins 0..=32
        let mut spectrum = vec![Complex::new(0.0, 0.0); 64];
        spectrum[25] = Complex::new(3.0, 4.0);
        let r = analyze(&spectrum, &ThdConfig::default());
        assert!((r.fundamental_freq - 25.0).abs() < 1e-12);
        assert!((r.fundamental_level - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_bin_value() {
        let mag = [4.0, 9.0, -1.0, 16.0];
        assert_eq!(bin_value(&mag, 1, 0), 3.0);
        assert_eq!(bin_value(&mag, 2, 0), 0.0);
        assert_eq!(bin_value(&mag, 0, 1), 5.0);
        assert_eq!(bin_value(&mag, 3, 2), 7.0);
        assert_eq!(bin_value(&mag, 10, 1), 0.0);
        assert_eq!(bin_value(&mag, 1, usize::MAX), 9.0);
    }

    #[test]
    fn test_ratio_to_db() {
        assert_eq!(ratio_to_db(0.0), f64::NEG_INFINITY);
        assert_eq!(ratio_to_db(-1.0), f64::NEG_INFINITY);
        assert!((ratio_to_db(0.1) + 20.0).abs() < 1e-12);
        assert!(ratio_to_db(1.0).abs() < 1e-12);
    }

    #[test]
    fn test_auto_capture_bins() {
        assert_eq!(auto_capture_bins(Window::Rectangular, 4096), 1);
        assert_eq!(auto_capture_bins(Window::Hann, 4096), 2);
        assert_eq!(auto_capture_bins(Window::Blackman, 4096), 3);
        assert_eq!(auto_capture_bins(Window::FlatTop, 4096), 5);
        // Tukey(0.5) has no table entry; its main lobe sits between
        // rectangular and Hann
        let tukey = auto_capture_bins(Window::Tukey { alpha: 0.5 }, 4096);
        assert!((1..=2).contains(&tukey), "tukey capture {tukey}");
        assert_eq!(auto_capture_bins(Window::Lanczos, 0), 0);
    }

    fn tone_with_harmonic(n: usize, sample_rate: f64, freq: f64, h2: f64) -> Vec<f64> {
        (0..n)
            .map(|i| {
                let t = i as f64 / sample_rate;
                (2.0 * PI * freq * t).sin() + h2 * (2.0 * PI * 2.0 * freq * t).sin()
            })
            .collect()
    }

    #[test]
    fn test_analyze_signal_rectangular() {
        // 750 Hz is bin 64 of a 4096-point FFT at 48 kHz
        let signal = tone_with_harmonic(4096, 48000.0, 750.0, 0.1);
        let cfg = ThdConfig::new(48000.0, 4096)
            .with_window(Window::Rectangular);
        let r = analyze_signal(&signal, &cfg);

        assert!((r.fundamental_freq - 750.0).abs() < 1e-9);
        assert!((r.thd - 0.1).abs() < 1e-9);
        assert!((r.even_hd - 0.1).abs() < 1e-9);
        assert!(r.odd_hd.abs() < 1e-9);
    }

    #[test]
    fn test_analyze_signal_hann() {
        let signal = tone_with_harmonic(4096, 48000.0, 750.0, 0.1);
        let r = analyze_signal(&signal, &ThdConfig::new(48000.0, 4096));

        assert!((r.fundamental_freq - 750.0).abs() < 1e-9);
        assert!((r.thd - 0.1).abs() < 1e-3, "thd {}", r.thd);
    }

    #[test]
    fn test_analyze_signal_truncates_to_fft_size() {
        let long = tone_with_harmonic(8192, 48000.0, 750.0, 0.1);
        let cfg = ThdConfig::new(48000.0, 4096);

        let full = analyze_signal(&long, &cfg);
        let head = analyze_signal(&long[..4096], &cfg);
        assert_eq!(full, head);
    }

    #[test]
    fn test_analyze_signal_auto_fft_size() {
        // 3000 samples pad to 4096; 1 Hz bins at sample rate 4096
        let signal: Vec<f64> = (0..3000)
            .map(|i| (2.0 * PI * 256.0 * i as f64 / 4096.0).sin())
            .collect();
        let r = analyze_signal(&signal, &ThdConfig::default());
        assert!((r.fundamental_freq - 256.0).abs() < 1e-9);
    }
}
