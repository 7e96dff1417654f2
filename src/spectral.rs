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

//! Frequency-domain stages of the frame pipeline
//!
//! analysis (window + forward FFT) -> band selection -> phase inversion ->
//! reconstruction (inverse FFT, real part, gain)

use std::sync::Arc;

use num_traits::Float;

use crate::fft_backend::{Complex, FftBackend, FftNum, FftPlanner, FftPlannerTrait};
use crate::{WindowType, apply_window, generate_window};

/// Signed centre frequency of every FFT bin, numpy `fftfreq` convention.
///
/// Bins `0..=(n-1)/2` are non-negative; the rest fold to negative frequencies,
/// so for even `n` the Nyquist bin reports `-sample_rate / 2`.
pub fn fft_frequencies<T: FftNum>(n: usize, sample_rate: u32) -> Vec<T> {
    let resolution = T::from_u32(sample_rate).unwrap() / T::from_usize(n).unwrap();
    let positive = (n.saturating_sub(1)) / 2 + 1;

    (0..n)
        .map(|k| {
            if k < positive {
                T::from_usize(k).unwrap() * resolution
            } else {
                -T::from_usize(n - k).unwrap() * resolution
            }
        })
        .collect()
}

/// Windows a frame and takes its forward DFT (unnormalized).
pub struct SpectralAnalyzer<T: FftNum> {
    window: Vec<T>,
    fft: Arc<dyn FftBackend<T>>,
}

impl<T: FftNum> SpectralAnalyzer<T> {
    pub fn new(frame_size: usize, window: WindowType) -> Self {
        let mut planner = FftPlanner::new();
        Self {
            window: generate_window(window, frame_size),
            fft: planner.plan_fft_forward(frame_size),
        }
    }

    pub fn frame_size(&self) -> usize {
        self.window.len()
    }

    pub fn window(&self) -> &[T] {
        &self.window
    }

    /// Multiply `frame` by the analysis window into `out`.
    pub fn apply_window(&self, frame: &[T], out: &mut [T]) {
        apply_window(frame, &self.window, out);
    }

    /// Forward transform of an already windowed frame.
    ///
    /// # Panics
    ///
    /// Panics if either slice is not `frame_size` long.
    pub fn forward(&self, windowed: &[T], spectrum: &mut [Complex<T>]) {
        assert_eq!(windowed.len(), self.frame_size(), "Frame length mismatch");
        assert_eq!(spectrum.len(), self.frame_size(), "Spectrum length mismatch");

        for (bin, &sample) in spectrum.iter_mut().zip(windowed) {
            *bin = Complex::new(sample, T::zero());
        }
        self.fft.process(spectrum);
    }

    /// Window `frame` and transform it in one pass.
    ///
    /// # Panics
    ///
    /// Panics if either slice is not `frame_size` long.
    pub fn analyze(&self, frame: &[T], spectrum: &mut [Complex<T>]) {
        assert_eq!(frame.len(), self.frame_size(), "Frame length mismatch");
        assert_eq!(spectrum.len(), self.frame_size(), "Spectrum length mismatch");

        for ((bin, &sample), &w) in spectrum.iter_mut().zip(frame).zip(&self.window) {
            *bin = Complex::new(sample * w, T::zero());
        }
        self.fft.process(spectrum);
    }
}

/// Brick-wall mask: bins with `|f| > cutoff` are zeroed, all others untouched.
///
/// The mask is symmetric in `|f|`, so a conjugate-symmetric spectrum stays
/// conjugate-symmetric and its inverse stays real.
#[derive(Debug, Clone)]
pub struct BandSelector<T: FftNum> {
    cutoff: T,
    keep: Vec<bool>,
}

impl<T: FftNum> BandSelector<T> {
    pub fn new(frame_size: usize, sample_rate: u32, cutoff: T) -> Self {
        let keep = fft_frequencies::<T>(frame_size, sample_rate)
            .into_iter()
            .map(|f| Float::abs(f) <= cutoff)
            .collect();
        Self { cutoff, keep }
    }

    pub fn cutoff(&self) -> T {
        self.cutoff
    }

    pub fn is_passed(&self, bin: usize) -> bool {
        self.keep[bin]
    }

    /// Number of bins that survive the mask
    pub fn passband_bins(&self) -> usize {
        self.keep.iter().filter(|&&keep| keep).count()
    }

    /// # Panics
    ///
    /// Panics if `spectrum` does not have one entry per bin.
    pub fn apply(&self, spectrum: &mut [Complex<T>]) {
        assert_eq!(spectrum.len(), self.keep.len(), "Spectrum length mismatch");

        for (bin, &keep) in spectrum.iter_mut().zip(&self.keep) {
            if !keep {
                *bin = Complex::new(T::zero(), T::zero());
            }
        }
    }
}

/// Negate every coefficient: a uniform 180 degree shift at every frequency.
pub fn invert_phase<T: FftNum>(spectrum: &mut [Complex<T>]) {
    for bin in spectrum.iter_mut() {
        *bin = -*bin;
    }
}

/// Time-domain counterpart of [`invert_phase`].
pub fn invert_polarity<T: FftNum>(samples: &mut [T]) {
    for sample in samples.iter_mut() {
        *sample = -*sample;
    }
}

/// Inverse DFT, real part, `1/N` normalization and output gain.
pub struct SpectralReconstructor<T: FftNum> {
    ifft: Arc<dyn FftBackend<T>>,
    gain: T,
    scale: T,
}

impl<T: FftNum> SpectralReconstructor<T> {
    pub fn new(frame_size: usize, gain: T) -> Self {
        let mut planner = FftPlanner::new();
        Self {
            ifft: planner.plan_fft_inverse(frame_size),
            gain,
            scale: gain / T::from_usize(frame_size).unwrap(),
        }
    }

    pub fn frame_size(&self) -> usize {
        self.ifft.len()
    }

    pub fn gain(&self) -> T {
        self.gain
    }

    /// Transform `spectrum` in place back to the time domain and write the
    /// scaled real part into `out`. The imaginary part is discarded.
    ///
    /// # Panics
    ///
    /// Panics if either slice is not `frame_size` long.
    pub fn reconstruct(&self, spectrum: &mut [Complex<T>], out: &mut [T]) {
        assert_eq!(spectrum.len(), self.frame_size(), "Spectrum length mismatch");
        assert_eq!(out.len(), self.frame_size(), "Frame length mismatch");

        self.ifft.process(spectrum);
        for (sample, bin) in out.iter_mut().zip(spectrum.iter()) {
            *sample = bin.re * self.scale;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    const SAMPLE_RATE: u32 = 44_100;
    const FRAME: usize = 1024;

    /// Tone centred exactly on `bin`. The symmetric Hann window still leaks a
    /// little into every other bin, decaying fast away from `bin`.
    fn bin_tone(bin: usize) -> Vec<f64> {
        (0..FRAME)
            .map(|n| (2.0 * PI * bin as f64 * n as f64 / FRAME as f64).sin() * 0.5)
            .collect()
    }

    #[test]
    fn test_fft_frequencies_even() {
        let freqs = fft_frequencies::<f64>(8, 8);
        assert_eq!(freqs, vec![0.0, 1.0, 2.0, 3.0, -4.0, -3.0, -2.0, -1.0]);
    }

    #[test]
    fn test_fft_frequencies_odd() {
        let freqs = fft_frequencies::<f64>(5, 5);
        assert_eq!(freqs, vec![0.0, 1.0, 2.0, -2.0, -1.0]);
    }

    #[test]
    fn test_forward_inverse_roundtrip() {
        let analyzer = SpectralAnalyzer::<f64>::new(FRAME, WindowType::Hann);
        let reconstructor = SpectralReconstructor::<f64>::new(FRAME, 1.0);

        let frame: Vec<f64> = (0..FRAME).map(|i| (i as f64 * 0.013).sin() * 0.7).collect();
        let mut windowed = vec![0.0; FRAME];
        analyzer.apply_window(&frame, &mut windowed);

        let mut spectrum = vec![Complex::new(0.0, 0.0); FRAME];
        analyzer.forward(&windowed, &mut spectrum);
        let mut restored = vec![0.0; FRAME];
        reconstructor.reconstruct(&mut spectrum, &mut restored);

        let peak = windowed.iter().fold(0.0f64, |m, x| m.max(x.abs()));
        for (a, b) in windowed.iter().zip(&restored) {
            assert!((a - b).abs() <= 1e-9 * peak, "{} vs {}", a, b);
        }
    }

    #[test]
    fn test_analyze_matches_window_then_forward() {
        let analyzer = SpectralAnalyzer::<f64>::new(64, WindowType::Hann);
        let frame: Vec<f64> = (0..64).map(|i| i as f64 / 64.0).collect();

        let mut windowed = vec![0.0; 64];
        analyzer.apply_window(&frame, &mut windowed);
        let mut a = vec![Complex::new(0.0, 0.0); 64];
        analyzer.forward(&windowed, &mut a);

        let mut b = vec![Complex::new(0.0, 0.0); 64];
        analyzer.analyze(&frame, &mut b);

        assert_eq!(a, b);
    }

    #[test]
    fn test_band_rejection_zeroes_everything() {
        let analyzer = SpectralAnalyzer::<f64>::new(FRAME, WindowType::Hann);
        let selector = BandSelector::<f64>::new(FRAME, SAMPLE_RATE, 800.0);

        // bin 100 is ~4.3 kHz; only far-off leakage lands below 800 Hz
        let mut spectrum = vec![Complex::new(0.0, 0.0); FRAME];
        analyzer.analyze(&bin_tone(100), &mut spectrum);
        let total: f64 = spectrum.iter().map(|c| c.norm_sqr()).sum();
        selector.apply(&mut spectrum);

        let left: f64 = spectrum.iter().map(|c| c.norm_sqr()).sum();
        assert!(left < 1e-9 * total, "energy left: {} of {}", left, total);
    }

    #[test]
    fn test_band_selector_invariant() {
        let selector = BandSelector::<f64>::new(FRAME, SAMPLE_RATE, 800.0);
        let freqs = fft_frequencies::<f64>(FRAME, SAMPLE_RATE);

        let mut spectrum = vec![Complex::new(1.0, -1.0); FRAME];
        selector.apply(&mut spectrum);

        for (k, (bin, f)) in spectrum.iter().zip(&freqs).enumerate() {
            if f.abs() > 800.0 {
                assert_eq!(*bin, Complex::new(0.0, 0.0), "bin {} ({} Hz)", k, f);
                assert!(!selector.is_passed(k));
            } else {
                assert_eq!(*bin, Complex::new(1.0, -1.0));
            }
        }
        // DC plus 18 positive and 18 negative bins below 800 Hz
        assert_eq!(selector.passband_bins(), 37);
    }

    #[test]
    fn test_cutoff_on_bin_frequency_is_inclusive() {
        // 48 kHz / 2048 puts bin 34 at exactly 796.875 Hz
        let cutoff = 48_000.0 / 2048.0 * 34.0;
        let selector = BandSelector::<f64>::new(2048, 48_000, cutoff);

        assert!(selector.is_passed(34));
        assert!(selector.is_passed(2048 - 34));
        assert!(!selector.is_passed(35));
        assert!(!selector.is_passed(2048 - 35));
        assert_eq!(selector.passband_bins(), 69);

        let mut spectrum = vec![Complex::new(1.0, 0.5); 2048];
        selector.apply(&mut spectrum);
        assert_eq!(spectrum[34], Complex::new(1.0, 0.5));
        assert_eq!(spectrum[2048 - 34], Complex::new(1.0, 0.5));
        assert_eq!(spectrum[35], Complex::new(0.0, 0.0));
        assert_eq!(spectrum[2048 - 35], Complex::new(0.0, 0.0));
    }

    #[test]
    fn test_cutoff_above_nyquist_passes_all() {
        let selector = BandSelector::<f32>::new(16, 16, 100.0);
        assert_eq!(selector.passband_bins(), 16);
    }

    #[test]
    fn test_invert_phase_is_sign_flip() {
        let mut spectrum = vec![Complex::new(1.0f32, 2.0), Complex::new(-3.0, 0.5)];
        invert_phase(&mut spectrum);
        assert_eq!(spectrum, vec![Complex::new(-1.0, -2.0), Complex::new(3.0, -0.5)]);

        let mut samples = vec![0.25f32, -0.5];
        invert_polarity(&mut samples);
        assert_eq!(samples, vec![-0.25, 0.5]);
    }

    #[test]
    fn test_reconstructor_applies_gain() {
        let analyzer = SpectralAnalyzer::<f64>::new(FRAME, WindowType::Hann);
        let unity = SpectralReconstructor::<f64>::new(FRAME, 1.0);
        let scaled = SpectralReconstructor::<f64>::new(FRAME, 0.6);
        assert_eq!(scaled.gain(), 0.6);

        let frame = bin_tone(5);
        let mut spectrum = vec![Complex::new(0.0, 0.0); FRAME];

        analyzer.analyze(&frame, &mut spectrum);
        let mut base = vec![0.0; FRAME];
        unity.reconstruct(&mut spectrum, &mut base);

        analyzer.analyze(&frame, &mut spectrum);
        let mut out = vec![0.0; FRAME];
        scaled.reconstruct(&mut spectrum, &mut out);

        for (b, o) in base.iter().zip(&out) {
            assert!((b * 0.6 - o).abs() < 1e-12);
        }
    }
}
