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

//! Channel (de)interleaving helpers used by [`SampleBuffer`](crate::SampleBuffer)
//! and [`AncOutput`](crate::AncOutput).

use num_traits::Float;

/// Copy one channel out of interleaved data.
///
/// # Panics
///
/// Panics if `num_channels` is 0 or `channel >= num_channels`.
pub fn extract_channel<T: Float>(data: &[T], num_channels: usize, channel: usize) -> Vec<T> {
    assert!(num_channels > 0, "num_channels must be greater than 0");
    assert!(
        channel < num_channels,
        "channel {} out of range for {} channels",
        channel,
        num_channels
    );

    data.iter()
        .skip(channel)
        .step_by(num_channels)
        .copied()
        .collect()
}

/// Average all channels of interleaved data into one.
///
/// # Panics
///
/// Panics if `num_channels` is 0.
pub fn downmix_mean<T: Float>(data: &[T], num_channels: usize) -> Vec<T> {
    assert!(num_channels > 0, "num_channels must be greater than 0");

    let scale = T::one() / T::from(num_channels).unwrap();
    data.chunks_exact(num_channels)
        .map(|frame| frame.iter().fold(T::zero(), |acc, &s| acc + s) * scale)
        .collect()
}

/// Interleave equally long channels into a single buffer.
///
/// # Panics
///
/// Panics if `channels` is empty or the channels differ in length.
///
/// # Example
///
/// ```
/// use anc_rs::interleave;
///
/// let noise = vec![0.5, -0.5];
/// let anti = vec![-0.3, 0.3];
///
/// assert_eq!(interleave(&[noise, anti]), vec![0.5, -0.3, -0.5, 0.3]);
/// ```
pub fn interleave<T: Float>(channels: &[Vec<T>]) -> Vec<T> {
    assert!(!channels.is_empty(), "channels must not be empty");

    let samples_per_channel = channels[0].len();
    for (i, channel) in channels.iter().enumerate() {
        assert_eq!(
            channel.len(),
            samples_per_channel,
            "Channel {} has length {}, expected {}",
            i,
            channel.len(),
            samples_per_channel
        );
    }

    let mut interleaved = Vec::with_capacity(samples_per_channel * channels.len());
    for sample_idx in 0..samples_per_channel {
        for channel in channels {
            interleaved.push(channel[sample_idx]);
        }
    }

    interleaved
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_channel() {
        let data = [1.0f32, 10.0, 2.0, 20.0, 3.0, 30.0];
        assert_eq!(extract_channel(&data, 2, 0), vec![1.0, 2.0, 3.0]);
        assert_eq!(extract_channel(&data, 2, 1), vec![10.0, 20.0, 30.0]);
    }

    #[test]
    #[should_panic]
    fn test_extract_channel_out_of_range() {
        extract_channel(&[0.0f32; 4], 2, 2);
    }

    #[test]
    fn test_downmix_mean() {
        let data = [1.0f64, 3.0, -2.0, 2.0];
        assert_eq!(downmix_mean(&data, 2), vec![2.0, 0.0]);
    }

    #[test]
    fn test_interleave_then_extract() {
        let left = vec![1.0f32, 2.0, 3.0];
        let right = vec![-1.0f32, -2.0, -3.0];
        let data = interleave(&[left.clone(), right.clone()]);
        assert_eq!(extract_channel(&data, 2, 0), left);
        assert_eq!(extract_channel(&data, 2, 1), right);
    }
}
