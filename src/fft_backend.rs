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

//! FFT backend abstraction layer
//!
//! The analyzer and reconstructor only see the [`FftBackend`] trait, so the
//! transform engine can be swapped without touching the frame pipeline.
//! `rustfft` is the only engine wired in.

use std::fmt;
use std::sync::Arc;

use num_traits::{Float, FromPrimitive};
use rustfft::{Fft, FftPlanner as RustFftPlanner};

pub use rustfft::num_complex::Complex;

/// Sample types the pipeline can run on (`f32` and `f64`).
pub trait FftNum: Float + FromPrimitive + rustfft::FftNum + fmt::Debug + Send + Sync + 'static {}

impl FftNum for f32 {}
impl FftNum for f64 {}

/// In-place complex transform of a fixed size.
pub trait FftBackend<T: FftNum>: Send + Sync {
    /// Process FFT in-place. Inverse transforms are unnormalized.
    fn process(&self, buffer: &mut [Complex<T>]);

    /// Get the FFT size
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Creates forward and inverse transforms of a given size.
pub trait FftPlannerTrait<T: FftNum> {
    fn new() -> Self;

    fn plan_fft_forward(&mut self, size: usize) -> Arc<dyn FftBackend<T>>;

    fn plan_fft_inverse(&mut self, size: usize) -> Arc<dyn FftBackend<T>>;
}

struct RustFftWrapper<T: FftNum> {
    fft: Arc<dyn Fft<T>>,
}

impl<T: FftNum> FftBackend<T> for RustFftWrapper<T> {
    fn process(&self, buffer: &mut [Complex<T>]) {
        self.fft.process(buffer);
    }

    fn len(&self) -> usize {
        self.fft.len()
    }
}

/// Planner backed by `rustfft`. Works for any frame size, not only powers of two.
pub struct FftPlanner<T: FftNum> {
    planner: RustFftPlanner<T>,
}

impl<T: FftNum> FftPlannerTrait<T> for FftPlanner<T> {
    fn new() -> Self {
        Self {
            planner: RustFftPlanner::new(),
        }
    }

    fn plan_fft_forward(&mut self, size: usize) -> Arc<dyn FftBackend<T>> {
        Arc::new(RustFftWrapper {
            fft: self.planner.plan_fft_forward(size),
        })
    }

    fn plan_fft_inverse(&mut self, size: usize) -> Arc<dyn FftBackend<T>> {
        Arc::new(RustFftWrapper {
            fft: self.planner.plan_fft_inverse(size),
        })
    }
}
