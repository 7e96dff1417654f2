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

//! Frame-based spectral active noise cancellation (ANC) simulator.
//!
//! A captured noise buffer is cut into fixed frames; each frame is windowed,
//! transformed, restricted to a low-frequency band, phase-inverted and
//! transformed back into an "anti-noise" frame. Adding anti-noise to the
//! original gives an idealized residual, and the run reports SPL before and
//! after plus average per-frame latency.
//!
//! ```
//! use anc_rs::prelude::*;
//!
//! let config = AncConfigF64::reference();
//! let pipeline = AncPipeline::new(config).unwrap();
//!
//! let tone: Vec<f64> = (0..44_100)
//!     .map(|i| 0.5 * (2.0 * std::f64::consts::PI * 400.0 * i as f64 / 44_100.0).sin())
//!     .collect();
//! let output = pipeline.process(&SampleBuffer::mono(tone, 44_100)).unwrap();
//!
//! assert_eq!(output.metrics.frame_count, 43);
//! assert!(output.metrics.reduction_db > 0.0);
//! ```

use num_traits::Float;
use serde::{Deserialize, Serialize};

pub mod buffer;
pub mod config;
pub mod error;
pub mod fft_backend;
pub mod filter;
pub mod metrics;
pub mod pipeline;
pub mod segment;
pub mod spectral;
pub mod utils;

pub use buffer::{ChannelPolicy, SampleBuffer};
pub use config::{AncConfig, BandLimitMode, ExecutionMode};
pub use error::{AncError, AncResult, ConfigError};
pub use filter::ButterworthLowPass;
pub use metrics::{LatencyProbe, Metrics, average_latency_ms, rms, spl_db};
pub use pipeline::{AncOutput, AncPipeline, FrameScratch, Rendered, estimate_residual};
pub use segment::{Frame, FrameSegmenter, frame_count};
pub use spectral::{
    BandSelector, SpectralAnalyzer, SpectralReconstructor, fft_frequencies, invert_phase,
    invert_polarity,
};
pub use utils::{downmix_mean, extract_channel, interleave};

pub mod prelude {
    pub use crate::{
        AncConfig, AncConfigF32, AncConfigF64, AncError, AncOutput, AncPipeline, AncPipelineF32,
        AncPipelineF64, BandLimitMode, ChannelPolicy, ExecutionMode, Metrics, SampleBuffer,
        WindowType,
    };
}

pub type AncConfigF32 = AncConfig<f32>;
pub type AncConfigF64 = AncConfig<f64>;
pub type AncPipelineF32 = AncPipeline<f32>;
pub type AncPipelineF64 = AncPipeline<f64>;
pub type SampleBufferF32 = SampleBuffer<f32>;
pub type SampleBufferF64 = SampleBuffer<f64>;

/// Analysis windows. All are the symmetric form (denominator `N - 1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WindowType {
    #[default]
    Hann,
    Hamming,
    Blackman,
}

/// Generate `size` window coefficients.
pub fn generate_window<T: Float>(window_type: WindowType, size: usize) -> Vec<T> {
    if size < 2 {
        return vec![T::one(); size];
    }

    let pi = T::from(std::f64::consts::PI).unwrap();
    let two = T::from(2.0).unwrap();
    let size_m1 = T::from(size - 1).unwrap();

    (0..size)
        .map(|i| {
            let angle = two * pi * T::from(i).unwrap() / size_m1;
            match window_type {
                WindowType::Hann => T::from(0.5).unwrap() - T::from(0.5).unwrap() * angle.cos(),
                WindowType::Hamming => {
                    T::from(0.54).unwrap() - T::from(0.46).unwrap() * angle.cos()
                }
                WindowType::Blackman => {
                    T::from(0.42).unwrap() - T::from(0.5).unwrap() * angle.cos()
                        + T::from(0.08).unwrap() * (two * angle).cos()
                }
            }
        })
        .collect()
}

/// Element-wise `out[n] = frame[n] * window[n]`.
///
/// # Panics
///
/// Panics if the three slices differ in length.
pub fn apply_window<T: Float>(frame: &[T], window: &[T], out: &mut [T]) {
    assert_eq!(frame.len(), window.len(), "Window length mismatch");
    assert_eq!(out.len(), window.len(), "Output length mismatch");

    for ((o, &x), &w) in out.iter_mut().zip(frame).zip(window) {
        *o = x * w;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hann_matches_formula() {
        let n = 1024;
        let window: Vec<f64> = generate_window(WindowType::Hann, n);
        for (i, &w) in window.iter().enumerate() {
            let expected =
                0.5 - 0.5 * (2.0 * std::f64::consts::PI * i as f64 / (n - 1) as f64).cos();
            assert!((w - expected).abs() < 1e-15);
        }
        assert!(window[0].abs() < 1e-15);
        assert!(window[n - 1].abs() < 1e-15);
    }

    #[test]
    fn test_windows_are_symmetric() {
        for window_type in [WindowType::Hann, WindowType::Hamming, WindowType::Blackman] {
            let window: Vec<f32> = generate_window(window_type, 257);
            for i in 0..window.len() / 2 {
                assert!(
                    (window[i] - window[window.len() - 1 - i]).abs() < 1e-6,
                    "{:?} asymmetric at {}",
                    window_type,
                    i
                );
            }
            assert!((window[128] - 1.0).abs() < 1e-6, "{:?} peak", window_type);
        }
    }

    #[test]
    fn test_degenerate_window_sizes() {
        assert!(generate_window::<f32>(WindowType::Hann, 0).is_empty());
        assert_eq!(generate_window::<f32>(WindowType::Hann, 1), vec![1.0]);
    }

    #[test]
    fn test_apply_window() {
        let frame = [2.0f32, 2.0, 2.0];
        let window = [0.0f32, 1.0, 0.5];
        let mut out = [0.0f32; 3];
        apply_window(&frame, &window, &mut out);
        assert_eq!(out, [0.0, 2.0, 1.0]);
    }
}
