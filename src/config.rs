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

//! Pipeline configuration
//!
//! All run parameters travel in one [`AncConfig`] value handed to
//! [`AncPipeline::new`](crate::AncPipeline::new); there is no process-wide state.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::WindowType;
use crate::buffer::ChannelPolicy;
use crate::error::ConfigError;
use crate::fft_backend::FftNum;

/// Butterworth order used when none is given.
pub const DEFAULT_BUTTERWORTH_ORDER: usize = 4;

/// How a frame is restricted to the target band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BandLimitMode {
    /// Zero every FFT bin whose |frequency| exceeds the cutoff.
    #[default]
    SpectralMask,
    /// Time-domain Butterworth low-pass, state reset on every frame.
    Butterworth { order: usize },
}

impl BandLimitMode {
    pub fn butterworth() -> Self {
        Self::Butterworth {
            order: DEFAULT_BUTTERWORTH_ORDER,
        }
    }
}

/// How frames are scheduled within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExecutionMode {
    #[default]
    Sequential,
    /// Frames are spread over the rayon pool; output regions are disjoint.
    Parallel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, bound(deserialize = "T: FftNum + Deserialize<'de>"))]
pub struct AncConfig<T: FftNum> {
    /// Expected input sample rate in Hz
    pub sample_rate: u32,
    /// Samples per frame
    pub frame_size: usize,
    /// Upper edge of the cancelled band in Hz
    pub low_freq_cutoff: T,
    /// Linear multiplier applied to every anti-noise frame
    pub gain: T,
    pub window: WindowType,
    pub band_limit: BandLimitMode,
    pub channel_policy: ChannelPolicy,
    pub execution: ExecutionMode,
}

impl<T: FftNum> AncConfig<T> {
    pub const REFERENCE_SAMPLE_RATE: u32 = 44_100;
    pub const REFERENCE_FRAME_SIZE: usize = 1024;
    pub const REFERENCE_CUTOFF_HZ: f64 = 800.0;
    pub const REFERENCE_GAIN: f64 = 0.6;

    pub fn new(
        sample_rate: u32,
        frame_size: usize,
        low_freq_cutoff: T,
        gain: T,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            sample_rate,
            frame_size,
            low_freq_cutoff,
            gain,
            window: WindowType::Hann,
            band_limit: BandLimitMode::SpectralMask,
            channel_policy: ChannelPolicy::default(),
            execution: ExecutionMode::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// 44.1 kHz, 1024-sample frames, 800 Hz cutoff, gain 0.6, Hann window, spectral mask
    pub fn reference() -> Self {
        Self {
            sample_rate: Self::REFERENCE_SAMPLE_RATE,
            frame_size: Self::REFERENCE_FRAME_SIZE,
            low_freq_cutoff: T::from_f64(Self::REFERENCE_CUTOFF_HZ).unwrap(),
            gain: T::from_f64(Self::REFERENCE_GAIN).unwrap(),
            window: WindowType::Hann,
            band_limit: BandLimitMode::SpectralMask,
            channel_policy: ChannelPolicy::default(),
            execution: ExecutionMode::default(),
        }
    }

    /// Parse a JSON document. Omitted fields take their reference values.
    pub fn from_json(json: &str) -> Result<Self, ConfigError>
    where
        T: DeserializeOwned,
    {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError>
    where
        T: Serialize,
    {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn with_window(mut self, window: WindowType) -> Self {
        self.window = window;
        self
    }

    pub fn with_band_limit(mut self, band_limit: BandLimitMode) -> Self {
        self.band_limit = band_limit;
        self
    }

    pub fn with_channel_policy(mut self, policy: ChannelPolicy) -> Self {
        self.channel_policy = policy;
        self
    }

    pub fn with_execution(mut self, execution: ExecutionMode) -> Self {
        self.execution = execution;
        self
    }

    pub fn nyquist(&self) -> T {
        T::from_u32(self.sample_rate).unwrap() / T::from_f64(2.0).unwrap()
    }

    /// Spacing between adjacent FFT bins in Hz
    pub fn bin_resolution(&self) -> T {
        T::from_u32(self.sample_rate).unwrap() / T::from_usize(self.frame_size).unwrap()
    }

    /// Audio time covered by one frame. A real-time variant would have to finish
    /// each frame within this budget.
    pub fn frame_duration(&self) -> Duration {
        Duration::from_secs_f64(self.frame_size as f64 / self.sample_rate as f64)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rate == 0 {
            return Err(ConfigError::InvalidSampleRate(self.sample_rate));
        }
        if self.frame_size < 2 {
            return Err(ConfigError::InvalidFrameSize(self.frame_size));
        }

        let cutoff = self.low_freq_cutoff.to_f64().unwrap_or(f64::NAN);
        if !cutoff.is_finite() || cutoff < 0.0 {
            return Err(ConfigError::InvalidCutoff(cutoff));
        }

        let gain = self.gain.to_f64().unwrap_or(f64::NAN);
        if !gain.is_finite() {
            return Err(ConfigError::InvalidGain(gain));
        }

        if let BandLimitMode::Butterworth { order } = self.band_limit {
            if order == 0 || order % 2 != 0 || order > 16 {
                return Err(ConfigError::InvalidFilterOrder(order));
            }
            let nyquist = self.sample_rate as f64 / 2.0;
            if cutoff <= 0.0 || cutoff >= nyquist {
                return Err(ConfigError::CutoffAboveNyquist { cutoff, nyquist });
            }
        }

        Ok(())
    }
}

impl<T: FftNum> Default for AncConfig<T> {
    fn default() -> Self {
        Self::reference()
    }
}
