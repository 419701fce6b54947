//! Sonido Measure - Swept-sine acoustic measurement
//!
//! Generates sweep excitations, recovers impulse responses from recorded
//! sweep responses, separates harmonic distortion products, and computes
//! distortion and room-acoustic metrics:
//!
//! - [`sweep`] - Logarithmic and linear sweeps with their inverse filters
//! - [`deconvolve`] - FFT linear convolution
//! - [`harmonics`] - Harmonic IR separation for log sweeps
//! - [`thd`] - THD, THD+N, SINAD, odd/even and rub & buzz metrics
//! - [`ir`] - Reverberation time, clarity, definition, center time
//! - [`window`] - Window functions and their spectral properties
//! - [`fft`] - FFT primitive over `f64`
//!
//! Every operation is a synchronous, side-effect-free function over caller
//! buffers; FFT plans live for a single call.
//!
//! ## Feature Flags
//!
//! - `serde` - `Serialize`/`Deserialize` for specs, configs, and results
//! - `tracing` - `debug!` events for transform sizes and resolved bins
//!
//! ## Example Workflow
//!
//! ```rust
//! use sonido_measure::{Excitation, IrAnalyzer, LogSweep, SweepSpec};
//!
//! // 1. Generate test signal
//! let sweep = LogSweep::new(SweepSpec::new(50.0, 8000.0, 0.5, 16000.0)).unwrap();
//! let excitation = sweep.generate();
//!
//! // 2. Record the system response (external); here the system is a wire
//! let recorded = excitation.clone();
//!
//! // 3. Split into linear and harmonic impulse responses
//! let irs = sweep.extract_harmonic_irs(&recorded, 3).unwrap();
//! assert_eq!(irs.len(), 3);
//!
//! // 4. Analyze the linear IR
//! let metrics = IrAnalyzer::new(16000.0).analyze(&irs[0]).unwrap();
//! assert!(metrics.d50 > 0.9);
//! ```
//!
//! ## Distortion Analysis
//!
//! ```rust,ignore
//! use sonido_measure::{ThdConfig, thd};
//!
//! let config = ThdConfig::new(48000.0, 8192).with_fundamental(1000.0);
//! let result = thd::analyze_signal(&recorded_tone, &config);
//! println!("THD: {:.3}% ({:.1} dB)", result.thd * 100.0, result.thd_db);
//! ```

pub mod deconvolve;
pub mod error;
pub mod fft;
pub mod harmonics;
pub mod ir;
pub mod sweep;
pub mod thd;
pub mod window;

// Re-export main types
pub use deconvolve::{fft_convolve, peak_index};
pub use error::{MeasureError, Result};
pub use fft::{Fft, FftError, next_power_of_two};
pub use harmonics::{HarmonicRegion, extract_regions, harmonic_regions};
pub use ir::{IrAnalyzer, IrMetrics};
pub use sweep::{DEFAULT_REGULARIZATION, Excitation, LinearSweep, LogSweep, SweepSpec};
pub use thd::{ThdCalculator, ThdConfig, ThdResult, ratio_to_db};
pub use window::{Window, WindowAnalysis};
