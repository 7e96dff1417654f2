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

//! Error types for the cancellation pipeline

use thiserror::Error;

/// Rejected configuration values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid sample rate: {0} Hz")]
    InvalidSampleRate(u32),

    #[error("Invalid frame size: {0} (must be at least 2 samples)")]
    InvalidFrameSize(usize),

    #[error("Invalid cutoff frequency: {0} Hz")]
    InvalidCutoff(f64),

    #[error("Invalid gain: {0}")]
    InvalidGain(f64),

    #[error("Invalid Butterworth order: {0} (must be even, 2..=16)")]
    InvalidFilterOrder(usize),

    #[error("Cutoff {cutoff} Hz must lie strictly between 0 and Nyquist ({nyquist} Hz)")]
    CutoffAboveNyquist { cutoff: f64, nyquist: f64 },

    #[error("Malformed configuration: {0}")]
    Parse(String),
}

/// Errors raised by a pipeline run.
///
/// Every variant is detected before the first frame is processed, so a run
/// either returns complete output or nothing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AncError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Sample rate mismatch: pipeline expects {expected} Hz, input is {actual} Hz")]
    SampleRateMismatch { expected: u32, actual: u32 },

    #[error("Input too short: {samples} samples yield no complete frame of {frame_size}")]
    EmptyInput { samples: usize, frame_size: usize },

    #[error("Expected mono input, got {channels} channels")]
    ChannelMismatch { channels: usize },

    #[error("Buffer of {len} samples cannot hold {channels} interleaved channels")]
    InvalidBuffer { len: usize, channels: usize },
}

/// Result type for pipeline operations
pub type AncResult<T> = Result<T, AncError>;
