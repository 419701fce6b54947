//! Criterion benchmarks for sonido-measure
//!
//! Run with: cargo bench -p sonido-measure

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use sonido_measure::{
    Excitation, IrAnalyzer, LinearSweep, LogSweep, SweepSpec, ThdConfig, Window, fft_convolve,
    thd, window,
};
use std::f64::consts::PI;

const SAMPLE_RATE: f64 = 48000.0;

fn spec(duration: f64) -> SweepSpec {
    SweepSpec::new(20.0, 20000.0, duration, SAMPLE_RATE)
}

/// Sine with a little cubic distortion
fn generate_distorted_sine(size: usize, frequency: f64) -> Vec<f64> {
    (0..size)
        .map(|i| {
            let x = (2.0 * PI * frequency * i as f64 / SAMPLE_RATE).sin();
            x + 0.05 * x * x * x
        })
        .collect()
}

/// Exponentially decaying noise with the given RT60
fn generate_room_ir(size: usize, rt60: f64) -> Vec<f64> {
    let tau = rt60 / 1000f64.ln();
    let mut state = 0x12345678u32;
    (0..size)
        .map(|i| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            let n = (state as i32 as f64) / (i32::MAX as f64);
            n * (-(i as f64) / SAMPLE_RATE / tau).exp()
        })
        .collect()
}

// ============================================================================
// Sweep benchmarks
// ============================================================================

fn bench_sweep_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("Sweep_Generate");

    for duration in [0.5, 1.0, 2.0] {
        let log = LogSweep::new(spec(duration)).unwrap();
        let linear = LinearSweep::new(spec(duration)).unwrap();

        group.bench_with_input(BenchmarkId::new("log", duration), &log, |b, sweep| {
            b.iter(|| black_box(sweep.generate()))
        });
        group.bench_with_input(BenchmarkId::new("linear", duration), &linear, |b, sweep| {
            b.iter(|| black_box(sweep.generate()))
        });
    }

    group.finish();
}

fn bench_deconvolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("Deconvolve");
    group.sample_size(20);

    for duration in [0.5, 1.0] {
        let sweep = LogSweep::new(spec(duration)).unwrap();
        let response = sweep.generate();

        group.bench_with_input(
            BenchmarkId::new("log", duration),
            &response,
            |b, response| b.iter(|| black_box(sweep.deconvolve(black_box(response)))),
        );
        group.bench_with_input(
            BenchmarkId::new("harmonics_5", duration),
            &response,
            |b, response| {
                b.iter(|| black_box(sweep.extract_harmonic_irs(black_box(response), 5)))
            },
        );
    }

    group.finish();
}

fn bench_convolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("FFT_Convolve");

    for size in [1024, 8192, 65536] {
        let a = generate_distorted_sine(size, 440.0);
        let b_sig = generate_room_ir(size / 4, 0.3);

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| black_box(fft_convolve(black_box(&a), black_box(&b_sig))))
        });
    }

    group.finish();
}

// ============================================================================
// Analysis benchmarks
// ============================================================================

fn bench_thd(c: &mut Criterion) {
    let mut group = c.benchmark_group("THD");

    for fft_size in [4096, 16384, 65536] {
        let signal = generate_distorted_sine(fft_size, 1000.0);
        let config = ThdConfig::new(SAMPLE_RATE, fft_size);

        group.bench_with_input(
            BenchmarkId::new("analyze_signal", fft_size),
            &signal,
            |b, signal| b.iter(|| black_box(thd::analyze_signal(black_box(signal), &config))),
        );
    }

    group.finish();
}

fn bench_window_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("Window_Analysis");

    let windows = [
        ("hann", Window::Hann),
        ("blackman_harris", Window::BlackmanHarris4Term),
        ("kaiser", Window::Kaiser { beta: 8.0 }),
    ];

    for (name, w) in windows {
        let coeffs = w.coefficients(4096);
        group.bench_function(name, |b| {
            b.iter(|| black_box(window::analyze(black_box(&coeffs))))
        });
    }

    group.finish();
}

fn bench_ir_metrics(c: &mut Criterion) {
    let mut group = c.benchmark_group("IR_Metrics");

    for rt60 in [0.3, 1.0] {
        let ir = generate_room_ir((SAMPLE_RATE * rt60 * 1.5) as usize, rt60);
        let analyzer = IrAnalyzer::new(SAMPLE_RATE);

        group.bench_with_input(BenchmarkId::new("analyze", rt60), &ir, |b, ir| {
            b.iter(|| black_box(analyzer.analyze(black_box(ir))))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_sweep_generate,
    bench_deconvolve,
    bench_convolve,
    bench_thd,
    bench_window_analysis,
    bench_ir_metrics,
);
criterion_main!(benches);
