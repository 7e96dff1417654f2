//! Common test utilities

use std::f64::consts::PI;

pub const SAMPLE_RATE: u32 = 44_100;

/// `amplitude * sin(2*pi*freq*t)` sampled at `sample_rate`
pub fn tone(freq: f64, amplitude: f64, len: usize, sample_rate: u32) -> Vec<f64> {
    (0..len)
        .map(|i| {
            let t = i as f64 / sample_rate as f64;
            amplitude * (2.0 * PI * freq * t).sin()
        })
        .collect()
}

/// Tone sitting exactly on FFT bin `bin` of a `frame_size`-point transform
#[allow(dead_code)]
pub fn bin_tone(bin: usize, frame_size: usize, len: usize) -> Vec<f64> {
    (0..len)
        .map(|n| 0.5 * (2.0 * PI * bin as f64 * n as f64 / frame_size as f64).sin())
        .collect()
}

#[allow(dead_code)]
pub fn max_abs_error(a: &[f64], b: &[f64]) -> f64 {
    assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}

#[allow(dead_code)]
pub fn max_abs(signal: &[f64]) -> f64 {
    signal.iter().fold(0.0, |m, x| m.max(x.abs()))
}
