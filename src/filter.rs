/*MIT License

Copyright (c) 2025 David Maseda Neira

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/

//! Time-domain Butterworth low-pass
//!
//! An even-order Butterworth response built as a cascade of second-order
//! sections (bilinear transform, cutoff prewarped so `|H(cutoff)| = 1/sqrt(2)`).
//! Each call to [`ButterworthLowPass::filter`] starts from zero state, so frames
//! stay independent of each other.

use std::f64::consts::PI;

use crate::fft_backend::{Complex, FftNum};

/// Normalized biquad coefficients (`a0 = 1`)
#[derive(Debug, Clone, Copy, PartialEq)]
struct BiquadCoeffs {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
}

impl BiquadCoeffs {
    fn lowpass(freq: f64, q: f64, sample_rate: f64) -> Self {
        let omega = 2.0 * PI * freq / sample_rate;
        let sin_omega = omega.sin();
        let cos_omega = omega.cos();
        let alpha = sin_omega / (2.0 * q);

        let b0 = (1.0 - cos_omega) / 2.0;
        let b1 = 1.0 - cos_omega;
        let b2 = (1.0 - cos_omega) / 2.0;
        let a0 = 1.0 + alpha;
        let a1 = -2.0 * cos_omega;
        let a2 = 1.0 - alpha;

        Self {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
        }
    }

    fn response(&self, omega: f64) -> Complex<f64> {
        let z1 = Complex::from_polar(1.0, -omega);
        let z2 = z1 * z1;
        let num = Complex::new(self.b0, 0.0) + z1 * self.b1 + z2 * self.b2;
        let den = Complex::new(1.0, 0.0) + z1 * self.a1 + z2 * self.a2;
        num / den
    }
}

#[derive(Debug, Clone)]
pub struct ButterworthLowPass<T: FftNum> {
    stages: Vec<[T; 5]>,
    design: Vec<BiquadCoeffs>,
    cutoff: f64,
    sample_rate: f64,
}

impl<T: FftNum> ButterworthLowPass<T> {
    /// Design an `order`-pole low-pass. `order` must be even and `cutoff_hz`
    /// must lie in `(0, sample_rate / 2)`; [`AncConfig::validate`](crate::AncConfig::validate)
    /// enforces both before a pipeline builds one.
    pub fn new(order: usize, cutoff_hz: f64, sample_rate: u32) -> Self {
        let sample_rate = sample_rate as f64;
        let sections = order / 2;

        let design: Vec<BiquadCoeffs> = (0..sections)
            .map(|k| {
                // Pole pair k of the analog prototype
                let theta = PI * (2 * k + 1) as f64 / (2 * order) as f64;
                let q = 1.0 / (2.0 * theta.cos());
                BiquadCoeffs::lowpass(cutoff_hz, q, sample_rate)
            })
            .collect();

        let stages = design
            .iter()
            .map(|c| {
                [
                    T::from_f64(c.b0).unwrap(),
                    T::from_f64(c.b1).unwrap(),
                    T::from_f64(c.b2).unwrap(),
                    T::from_f64(c.a1).unwrap(),
                    T::from_f64(c.a2).unwrap(),
                ]
            })
            .collect();

        Self {
            stages,
            design,
            cutoff: cutoff_hz,
            sample_rate,
        }
    }

    pub fn order(&self) -> usize {
        self.stages.len() * 2
    }

    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    /// Magnitude response at `freq_hz`, linear
    pub fn magnitude_at(&self, freq_hz: f64) -> f64 {
        let omega = 2.0 * PI * freq_hz / self.sample_rate;
        self.design
            .iter()
            .fold(Complex::new(1.0, 0.0), |h, stage| h * stage.response(omega))
            .norm()
    }

    /// Filter `input` into `output` (transposed direct form II, zero initial state).
    ///
    /// # Panics
    ///
    /// Panics if the slices differ in length.
    pub fn filter(&self, input: &[T], output: &mut [T]) {
        assert_eq!(input.len(), output.len(), "Frame length mismatch");

        output.copy_from_slice(input);
        for &[b0, b1, b2, a1, a2] in &self.stages {
            let mut z1 = T::zero();
            let mut z2 = T::zero();
            for sample in output.iter_mut() {
                let x = *sample;
                let y = b0 * x + z1;
                z1 = b1 * x - a1 * y + z2;
                z2 = b2 * x - a2 * y;
                *sample = y;
            }
        }
    }
}
