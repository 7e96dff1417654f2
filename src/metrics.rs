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

//! Cancellation-quality metrics and the wall-clock latency probe
//!
//! SPL figures are relative dB (`20 * log10(rms)`), not calibrated acoustic levels.

use std::fmt;
use std::time::{Duration, Instant};

use num_traits::Float;
use serde::{Deserialize, Serialize};

/// Added to the RMS before taking the log so silence stays finite.
pub const SPL_EPSILON: f64 = 1e-6;

/// Root mean square of a buffer. An empty buffer has RMS 0.
pub fn rms<T: Float>(signal: &[T]) -> T {
    if signal.is_empty() {
        return T::zero();
    }
    let sum = signal.iter().fold(T::zero(), |acc, &x| acc + x * x);
    (sum / T::from(signal.len()).unwrap()).sqrt()
}

/// `20 * log10(rms + 1e-6)`; finite for any finite input, including all zeros.
pub fn spl_db<T: Float>(signal: &[T]) -> T {
    let epsilon = T::from(SPL_EPSILON).unwrap();
    T::from(20.0).unwrap() * (rms(signal) + epsilon).log10()
}

/// Mean wall-clock time per frame in milliseconds, `None` when no frame ran.
pub fn average_latency_ms(elapsed: Duration, frame_count: usize) -> Option<f64> {
    if frame_count == 0 {
        return None;
    }
    Some(elapsed.as_secs_f64() / frame_count as f64 * 1000.0)
}

/// Wall-clock timing around a batch of work.
///
/// Latency is measured around the whole frame loop and divided by the frame
/// count, for sequential and parallel runs alike.
#[derive(Debug, Clone, Default)]
pub struct LatencyProbe {
    total: Duration,
    runs: usize,
}

impl LatencyProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `work` once and return its result with the elapsed time.
    pub fn measure<R>(work: impl FnOnce() -> R) -> (R, Duration) {
        let start = Instant::now();
        let result = work();
        (result, start.elapsed())
    }

    /// Like [`measure`](Self::measure), but accumulates into this probe.
    pub fn time<R>(&mut self, work: impl FnOnce() -> R) -> R {
        let (result, elapsed) = Self::measure(work);
        self.total += elapsed;
        self.runs += 1;
        result
    }

    pub fn total(&self) -> Duration {
        self.total
    }

    pub fn runs(&self) -> usize {
        self.runs
    }

    pub fn average(&self) -> Option<Duration> {
        (self.runs > 0).then(|| self.total / self.runs as u32)
    }
}

/// Summary of one run. Computed once after the last frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub frame_count: usize,
    pub avg_latency_ms: f64,
    pub spl_before_db: f64,
    pub spl_after_db: f64,
    pub reduction_db: f64,
}

impl Metrics {
    /// Compare the original buffer with the residual over their full length.
    ///
    /// [`AncPipeline::process`](crate::AncPipeline::process) passes the
    /// frame-aligned input here, so samples dropped after the last frame do
    /// not count towards `spl_before_db`.
    ///
    /// Returns `None` for `frame_count == 0` instead of dividing by zero;
    /// the pipeline reports that case as [`AncError::EmptyInput`](crate::AncError::EmptyInput).
    pub fn compute<T: Float>(
        original: &[T],
        residual: &[T],
        frame_count: usize,
        elapsed: Duration,
    ) -> Option<Self> {
        let avg_latency_ms = average_latency_ms(elapsed, frame_count)?;
        let spl_before_db = spl_db(original).to_f64().unwrap_or(f64::NAN);
        let spl_after_db = spl_db(residual).to_f64().unwrap_or(f64::NAN);

        Some(Self {
            frame_count,
            avg_latency_ms,
            spl_before_db,
            spl_after_db,
            reduction_db: spl_before_db - spl_after_db,
        })
    }

    pub fn log_summary(&self) {
        log::info!("Frames processed: {}", self.frame_count);
        log::info!("Avg processing latency: {:.3} ms/frame", self.avg_latency_ms);
        log::info!(
            "SPL before: {:.2} dB, after: {:.2} dB, reduction: {:.2} dB",
            self.spl_before_db,
            self.spl_after_db,
            self.reduction_db
        );
    }
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Frames processed       : {}", self.frame_count)?;
        writeln!(f, "Avg processing latency : {:.2} ms/frame", self.avg_latency_ms)?;
        writeln!(f, "SPL before ANC         : {:.2} dB", self.spl_before_db)?;
        writeln!(f, "SPL after ANC          : {:.2} dB", self.spl_after_db)?;
        write!(f, "Estimated reduction    : {:.2} dB", self.reduction_db)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rms() {
        assert_eq!(rms::<f64>(&[]), 0.0);
        assert_eq!(rms(&[3.0f64, -3.0, 3.0, -3.0]), 3.0);
        assert!((rms(&[1.0f64, 0.0]) - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-12);
    }

    #[test]
    fn test_spl_of_silence_is_finite() {
        let silence = vec![0.0f32; 4096];
        let spl = spl_db(&silence);
        assert!(spl.is_finite());
        assert!((spl - -120.0).abs() < 1e-3);
        assert!(spl_db::<f64>(&[]).is_finite());
    }

    #[test]
    fn test_spl_full_scale_square() {
        let square = [1.0f64, -1.0, 1.0, -1.0];
        assert!(spl_db(&square).abs() < 1e-4);
    }

    #[test]
    fn test_average_latency() {
        assert_eq!(average_latency_ms(Duration::from_millis(10), 0), None);
        let avg = average_latency_ms(Duration::from_millis(10), 4).unwrap();
        assert!((avg - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_metrics_compute() {
        let original = [0.5f64, -0.5, 0.5, -0.5];
        let residual = [0.05f64, -0.05, 0.05, -0.05];
        let metrics = Metrics::compute(&original, &residual, 2, Duration::from_millis(1)).unwrap();

        assert_eq!(metrics.frame_count, 2);
        assert!((metrics.avg_latency_ms - 0.5).abs() < 1e-9);
        assert!((metrics.reduction_db - 20.0).abs() < 1e-3);
        assert_eq!(metrics.reduction_db, metrics.spl_before_db - metrics.spl_after_db);
    }

    #[test]
    fn test_metrics_guard_zero_frames() {
        assert!(Metrics::compute(&[0.0f32; 8], &[0.0f32; 8], 0, Duration::ZERO).is_none());
    }

    #[test]
    fn test_metrics_display() {
        let metrics = Metrics {
            frame_count: 215,
            avg_latency_ms: 0.0123,
            spl_before_db: -9.03,
            spl_after_db: -11.75,
            reduction_db: 2.72,
        };
        let report = metrics.to_string();
        assert!(report.contains("Frames processed       : 215"));
        assert!(report.contains("Estimated reduction    : 2.72 dB"));
    }

    #[test]
    fn test_latency_probe_accumulates() {
        let mut probe = LatencyProbe::new();
        assert_eq!(probe.average(), None);

        let value = probe.time(|| 21 * 2);
        probe.time(|| ());

        assert_eq!(value, 42);
        assert_eq!(probe.runs(), 2);
        assert!(probe.average().unwrap() <= probe.total());
    }
}
