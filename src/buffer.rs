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

//! Input sample buffers and channel handling

use std::borrow::Cow;

use num_traits::Float;
use serde::{Deserialize, Serialize};

use crate::error::{AncError, AncResult};
use crate::utils::{downmix_mean, extract_channel};

/// What to do with multi-channel input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChannelPolicy {
    /// Fail with [`AncError::ChannelMismatch`] unless the input is mono.
    #[default]
    Reject,
    /// Keep channel 0, discard the rest (logged).
    FirstChannel,
    /// Average all channels (logged).
    Downmix,
}

/// Captured audio handed to the pipeline. Immutable once built.
///
/// Multi-channel data is stored interleaved.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer<T: Float> {
    samples: Vec<T>,
    sample_rate: u32,
    channels: usize,
}

impl<T: Float> SampleBuffer<T> {
    pub fn mono(samples: Vec<T>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
            channels: 1,
        }
    }

    pub fn interleaved(samples: Vec<T>, sample_rate: u32, channels: usize) -> AncResult<Self> {
        if channels == 0 || samples.len() % channels != 0 {
            return Err(AncError::InvalidBuffer {
                len: samples.len(),
                channels,
            });
        }

        Ok(Self {
            samples,
            sample_rate,
            channels,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Samples per channel
    pub fn len(&self) -> usize {
        self.samples.len() / self.channels
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Raw (interleaved) samples
    pub fn samples(&self) -> &[T] {
        &self.samples
    }

    pub fn channel(&self, index: usize) -> Option<Vec<T>> {
        (index < self.channels).then(|| extract_channel(&self.samples, self.channels, index))
    }

    /// Resolve the buffer to a single channel according to `policy`.
    ///
    /// Mono input is borrowed as-is whatever the policy.
    pub fn to_mono(&self, policy: ChannelPolicy) -> AncResult<Cow<'_, [T]>> {
        if self.channels == 1 {
            return Ok(Cow::Borrowed(&self.samples));
        }

        match policy {
            ChannelPolicy::Reject => Err(AncError::ChannelMismatch {
                channels: self.channels,
            }),
            ChannelPolicy::FirstChannel => {
                log::warn!(
                    "Input has {} channels, discarding all but the first",
                    self.channels
                );
                Ok(Cow::Owned(extract_channel(&self.samples, self.channels, 0)))
            }
            ChannelPolicy::Downmix => {
                log::warn!("Input has {} channels, averaging to mono", self.channels);
                Ok(Cow::Owned(downmix_mean(&self.samples, self.channels)))
            }
        }
    }
}
