//! Measurement demo: sweep a soft-clipping system, split its harmonic
//! impulse responses, then measure THD and room metrics.
//!
//! Run with: cargo run -p sonido-measure --example measure_demo

use sonido_measure::{
    Excitation, IrAnalyzer, LogSweep, SweepSpec, ThdConfig, Window, fft_convolve, thd, window,
};
use std::f64::consts::PI;

fn main() -> sonido_measure::Result<()> {
    let sample_rate = 48000.0;

    // --- Harmonic IRs of a waveshaper ---
    println!("=== Log Sweep Through tanh(2x) / tanh(2) ===\n");

    let sweep = LogSweep::new(SweepSpec::new(20.0, 6000.0, 1.0, sample_rate))?;
    let excitation = sweep.generate();
    let drive = 2.0f64;
    let response: Vec<f64> = excitation
        .iter()
        .map(|&x| (drive * x).tanh() / drive.tanh())
        .collect();

    let irs = sweep.extract_harmonic_irs(&response, 5)?;
    let linear_peak = peak(&irs[0]);
    for (i, ir) in irs.iter().enumerate() {
        let level = peak(ir) / linear_peak;
        println!(
            "  H{}: {:>7} samples, delay {:>7.2} ms, peak {:>7.1} dB",
            i + 1,
            ir.len(),
            sweep.harmonic_delay(i + 1) * 1000.0,
            20.0 * level.max(1e-12).log10()
        );
    }

    // --- THD of a steady tone through the same curve ---
    println!("\n=== THD at 1 kHz ===\n");

    let fft_size = 16384;
    let tone: Vec<f64> = (0..fft_size)
        .map(|i| {
            let x = 0.5 * (2.0 * PI * 1000.0 * i as f64 / sample_rate).sin();
            (drive * x).tanh() / drive.tanh()
        })
        .collect();

    for w in [Window::Hann, Window::BlackmanHarris4Term, Window::FlatTop] {
        let config = ThdConfig::new(sample_rate, fft_size)
            .with_fundamental(1000.0)
            .with_window(w);
        let r = thd::analyze_signal(&tone, &config);
        println!(
            "  {:<20} THD {:>7.3}%  THD+N {:>7.3}%  odd {:>7.3}%  even {:>7.3}%  SINAD {:>6.1} dB",
            format!("{w:?}"),
            r.thd * 100.0,
            r.thdn * 100.0,
            r.odd_hd * 100.0,
            r.even_hd * 100.0,
            r.sinad
        );
    }

    // --- Window properties ---
    println!("\n=== Window Properties (4096 points) ===\n");

    for w in [Window::Hann, Window::BlackmanHarris4Term, Window::FlatTop] {
        let a = window::analyze(&w.coefficients(4096));
        println!(
            "  {:<20} ENBW {:.3} bins, sidelobe {:>6.1} dB, first minimum {:.2} bins",
            format!("{w:?}"),
            a.enbw,
            a.highest_sidelobe_db,
            a.first_minimum_bins
        );
    }

    // --- Room IR through a sweep measurement ---
    println!("\n=== Synthetic Room (RT60 = 0.6 s) ===\n");

    let room = decaying_noise((sample_rate * 0.9) as usize, 0.6, sample_rate);
    let recorded = fft_convolve(&excitation, &room)?;
    let ir = sweep.deconvolve(&recorded)?;
    let measured = &ir[excitation.len() - 1..excitation.len() - 1 + room.len()];

    let metrics = IrAnalyzer::new(sample_rate).analyze(measured)?;
    println!("  RT60:        {:.3} s", metrics.rt60);
    println!("  EDT:         {:.3} s", metrics.edt);
    println!("  T20 / T30:   {:.3} s / {:.3} s", metrics.t20, metrics.t30);
    println!("  C50 / C80:   {:.1} dB / {:.1} dB", metrics.c50, metrics.c80);
    println!("  D50 / D80:   {:.3} / {:.3}", metrics.d50, metrics.d80);
    println!("  Center time: {:.1} ms", metrics.center_time * 1000.0);

    Ok(())
}

fn peak(signal: &[f64]) -> f64 {
    signal.iter().fold(0.0f64, |m, &x| m.max(x.abs()))
}

fn decaying_noise(len: usize, rt60: f64, sample_rate: f64) -> Vec<f64> {
    let tau = rt60 / 1000f64.ln();
    let mut state = 0x9e37_79b9u32;
    (0..len)
        .map(|i| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            let n = (state as i32 as f64) / (i32::MAX as f64);
            n * (-(i as f64) / sample_rate / tau).exp()
        })
        .collect()
}
