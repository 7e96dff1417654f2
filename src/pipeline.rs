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

//! Frame loop: anti-noise synthesis and residual estimation
//!
//! ```text
//! frame ─► window ─► FFT ─► band mask ─► negate ─► IFFT (re) ─► × gain ─► anti-noise
//!   │                                                                        │
//!   └──────────────────────────────► + ◄─────────────────────────────────────┘
//!                                    ▼
//!                                 residual
//! ```
//!
//! With [`BandLimitMode::Butterworth`] the FFT/mask/IFFT chain is replaced by
//! a time-domain low-pass followed by polarity inversion.

use rayon::prelude::*;

use crate::buffer::SampleBuffer;
use crate::config::{AncConfig, BandLimitMode, ExecutionMode};
use crate::error::{AncError, AncResult};
use crate::fft_backend::{Complex, FftNum};
use crate::filter::ButterworthLowPass;
use crate::metrics::{LatencyProbe, Metrics};
use crate::segment::FrameSegmenter;
use crate::spectral::{
    BandSelector, SpectralAnalyzer, SpectralReconstructor, invert_phase, invert_polarity,
};
use crate::utils::interleave;

/// Ideal linear superposition: `residual[n] = original[n] + anti_noise[n]`.
///
/// No clipping is applied.
///
/// # Panics
///
/// Panics if the slices differ in length.
pub fn estimate_residual<T: FftNum>(original: &[T], anti_noise: &[T], residual: &mut [T]) {
    assert_eq!(original.len(), anti_noise.len(), "Anti-noise length mismatch");
    assert_eq!(original.len(), residual.len(), "Residual length mismatch");

    for ((r, &x), &a) in residual.iter_mut().zip(original).zip(anti_noise) {
        *r = x + a;
    }
}

/// Per-worker working memory for [`AncPipeline::process_frame`].
pub struct FrameScratch<T: FftNum> {
    windowed: Vec<T>,
    spectrum: Vec<Complex<T>>,
}

impl<T: FftNum> FrameScratch<T> {
    pub fn new(frame_size: usize) -> Self {
        Self {
            windowed: vec![T::zero(); frame_size],
            spectrum: vec![Complex::new(T::zero(), T::zero()); frame_size],
        }
    }

    /// Spectrum left by the last spectral-mask frame, after inversion and the
    /// in-place inverse transform.
    pub fn spectrum(&self) -> &[Complex<T>] {
        &self.spectrum
    }
}

enum BandLimiter<T: FftNum> {
    Spectral {
        selector: BandSelector<T>,
        reconstructor: SpectralReconstructor<T>,
    },
    Butterworth(ButterworthLowPass<T>),
}

/// Output of the frame loop alone, without validation or metrics.
#[derive(Debug, Clone)]
pub struct Rendered<T> {
    pub anti_noise: Vec<T>,
    pub residual: Vec<T>,
    pub frame_count: usize,
    /// Trailing input samples that did not fill a frame
    pub dropped_samples: usize,
}

/// Everything a run hands back to the caller.
///
/// All buffers have length `frame_count * frame_size`. Trailing input samples
/// past the last full frame are left out of every buffer and of the metrics,
/// so `metrics.spl_before_db` is the level of `original`, not of the whole input.
#[derive(Debug, Clone)]
pub struct AncOutput<T> {
    /// The frame-aligned mono input the other buffers correspond to
    pub original: Vec<T>,
    pub anti_noise: Vec<T>,
    pub residual: Vec<T>,
    pub metrics: Metrics,
    pub dropped_samples: usize,
}

impl<T: FftNum> AncOutput<T> {
    /// Interleaved stereo: original noise on the left, anti-noise on the right.
    pub fn to_stereo(&self) -> Vec<T> {
        interleave(&[self.original.clone(), self.anti_noise.clone()])
    }
}

pub struct AncPipeline<T: FftNum> {
    config: AncConfig<T>,
    analyzer: SpectralAnalyzer<T>,
    limiter: BandLimiter<T>,
}

impl<T: FftNum> AncPipeline<T> {
    pub fn new(config: AncConfig<T>) -> Result<Self, AncError> {
        config.validate()?;

        let analyzer = SpectralAnalyzer::new(config.frame_size, config.window);
        let limiter = match config.band_limit {
            BandLimitMode::SpectralMask => BandLimiter::Spectral {
                selector: BandSelector::new(
                    config.frame_size,
                    config.sample_rate,
                    config.low_freq_cutoff,
                ),
                reconstructor: SpectralReconstructor::new(config.frame_size, config.gain),
            },
            BandLimitMode::Butterworth { order } => BandLimiter::Butterworth(
                ButterworthLowPass::new(
                    order,
                    config.low_freq_cutoff.to_f64().unwrap_or(0.0),
                    config.sample_rate,
                ),
            ),
        };

        log::debug!(
            "ANC pipeline: {} Hz, frame {} ({:.2} ms), cutoff {:?} Hz, gain {:?}, {:?}, {:?}",
            config.sample_rate,
            config.frame_size,
            config.frame_duration().as_secs_f64() * 1000.0,
            config.low_freq_cutoff,
            config.gain,
            config.window,
            config.band_limit
        );

        Ok(Self {
            config,
            analyzer,
            limiter,
        })
    }

    pub fn config(&self) -> &AncConfig<T> {
        &self.config
    }

    pub fn frame_size(&self) -> usize {
        self.config.frame_size
    }

    pub fn scratch(&self) -> FrameScratch<T> {
        FrameScratch::new(self.config.frame_size)
    }

    /// Compute the anti-noise for one frame. Pure: no clock, no logging, no
    /// shared state, so frames may run in any order or concurrently.
    ///
    /// # Panics
    ///
    /// Panics if `frame` or `anti_noise` is not `frame_size` long.
    pub fn process_frame(
        &self,
        frame: &[T],
        anti_noise: &mut [T],
        scratch: &mut FrameScratch<T>,
    ) {
        match &self.limiter {
            BandLimiter::Spectral {
                selector,
                reconstructor,
            } => {
                self.analyzer.analyze(frame, &mut scratch.spectrum);
                selector.apply(&mut scratch.spectrum);
                invert_phase(&mut scratch.spectrum);
                reconstructor.reconstruct(&mut scratch.spectrum, anti_noise);
            }
            BandLimiter::Butterworth(lowpass) => {
                self.analyzer.apply_window(frame, &mut scratch.windowed);
                lowpass.filter(&scratch.windowed, anti_noise);
                invert_polarity(anti_noise);
                let gain = self.config.gain;
                for sample in anti_noise.iter_mut() {
                    *sample = *sample * gain;
                }
            }
        }
    }

    /// Allocating convenience wrapper around [`process_frame`](Self::process_frame).
    pub fn anti_noise_frame(&self, frame: &[T]) -> Vec<T> {
        let mut scratch = self.scratch();
        let mut anti_noise = vec![T::zero(); self.config.frame_size];
        self.process_frame(frame, &mut anti_noise, &mut scratch);
        anti_noise
    }

    /// Run the frame loop over a mono buffer. Trailing samples that do not fill
    /// a frame are left out of every output.
    pub fn render(&self, mono: &[T]) -> Rendered<T> {
        let frame_size = self.config.frame_size;
        let segmenter = FrameSegmenter::new(mono, frame_size);
        let frame_count = segmenter.num_frames();
        let dropped_samples = segmenter.remainder().len();
        let aligned = segmenter.aligned();

        let mut anti_noise = vec![T::zero(); aligned.len()];
        let mut residual = vec![T::zero(); aligned.len()];

        match self.config.execution {
            ExecutionMode::Sequential => {
                let mut scratch = self.scratch();
                for frame in segmenter {
                    let range = frame.offset..frame.offset + frame_size;
                    let anti = &mut anti_noise[range.clone()];
                    self.process_frame(frame.samples, anti, &mut scratch);
                    estimate_residual(frame.samples, anti, &mut residual[range]);
                }
            }
            ExecutionMode::Parallel => {
                anti_noise
                    .par_chunks_mut(frame_size)
                    .zip(residual.par_chunks_mut(frame_size))
                    .zip(aligned.par_chunks(frame_size))
                    .for_each_init(
                        || self.scratch(),
                        |scratch, ((anti, res), frame)| {
                            self.process_frame(frame, anti, scratch);
                            estimate_residual(frame, anti, res);
                        },
                    );
            }
        }

        Rendered {
            anti_noise,
            residual,
            frame_count,
            dropped_samples,
        }
    }

    /// Validate `input`, run every frame under the latency probe and compute metrics.
    ///
    /// Fails before touching any frame when the sample rate differs from the
    /// configured one, when the channel policy rejects the input, or when the
    /// input is shorter than one frame.
    pub fn process(&self, input: &SampleBuffer<T>) -> AncResult<AncOutput<T>> {
        if input.sample_rate() != self.config.sample_rate {
            return Err(AncError::SampleRateMismatch {
                expected: self.config.sample_rate,
                actual: input.sample_rate(),
            });
        }

        let mono = input.to_mono(self.config.channel_policy)?;
        let empty = || AncError::EmptyInput {
            samples: mono.len(),
            frame_size: self.config.frame_size,
        };
        if mono.len() < self.config.frame_size {
            return Err(empty());
        }

        let (rendered, elapsed) = LatencyProbe::measure(|| self.render(&mono));

        if rendered.dropped_samples > 0 {
            log::warn!(
                "Dropped {} trailing samples that do not fill a frame",
                rendered.dropped_samples
            );
        }

        let original = mono[..rendered.anti_noise.len()].to_vec();
        let metrics =
            Metrics::compute(&original, &rendered.residual, rendered.frame_count, elapsed)
                .ok_or_else(empty)?;

        Ok(AncOutput {
            original,
            anti_noise: rendered.anti_noise,
            residual: rendered.residual,
            metrics,
            dropped_samples: rendered.dropped_samples,
        })
    }
}
