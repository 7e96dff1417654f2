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

//! Fixed-size, non-overlapping framing
//!
//! A buffer of `L` samples yields `floor(L / F)` frames at offsets `0, F, 2F, ...`.
//! The trailing `L mod F` samples never reach any frame; [`FrameSegmenter::remainder`]
//! exposes them so callers can see exactly what was dropped.

use std::iter::FusedIterator;

/// Number of complete frames in `len` samples.
///
/// # Panics
///
/// Panics if `frame_size` is 0.
pub fn frame_count(len: usize, frame_size: usize) -> usize {
    assert!(frame_size > 0, "frame_size must be greater than 0");
    len / frame_size
}

/// Samples left over after the last complete frame.
pub fn remainder(len: usize, frame_size: usize) -> usize {
    len - frame_count(len, frame_size) * frame_size
}

/// One frame: a borrowed view into the source buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame<'a, T> {
    pub index: usize,
    /// Position of the first sample in the source buffer
    pub offset: usize,
    pub samples: &'a [T],
}

#[derive(Debug, Clone)]
pub struct FrameSegmenter<'a, T> {
    samples: &'a [T],
    frame_size: usize,
    next_index: usize,
    num_frames: usize,
}

impl<'a, T> FrameSegmenter<'a, T> {
    /// # Panics
    ///
    /// Panics if `frame_size` is 0.
    pub fn new(samples: &'a [T], frame_size: usize) -> Self {
        Self {
            samples,
            frame_size,
            next_index: 0,
            num_frames: frame_count(samples.len(), frame_size),
        }
    }

    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    pub fn num_frames(&self) -> usize {
        self.num_frames
    }

    /// Length of the frame-aligned prefix, `num_frames * frame_size`.
    pub fn aligned_len(&self) -> usize {
        self.num_frames * self.frame_size
    }

    /// The frame-aligned prefix that frames cover.
    pub fn aligned(&self) -> &'a [T] {
        &self.samples[..self.aligned_len()]
    }

    /// Trailing samples that are not processed.
    pub fn remainder(&self) -> &'a [T] {
        &self.samples[self.aligned_len()..]
    }
}

impl<'a, T> Iterator for FrameSegmenter<'a, T> {
    type Item = Frame<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_index >= self.num_frames {
            return None;
        }

        let index = self.next_index;
        let offset = index * self.frame_size;
        self.next_index += 1;

        Some(Frame {
            index,
            offset,
            samples: &self.samples[offset..offset + self.frame_size],
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.num_frames - self.next_index;
        (left, Some(left))
    }
}

impl<T> ExactSizeIterator for FrameSegmenter<'_, T> {}

impl<T> FusedIterator for FrameSegmenter<'_, T> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_count_law() {
        for (len, size) in [(0, 4), (3, 4), (4, 4), (7, 4), (8, 4), (220_500, 1024)] {
            assert_eq!(frame_count(len, size), len / size);
            assert_eq!(remainder(len, size), len % size);
        }
        assert_eq!(frame_count(220_500, 1024), 215);
    }

    #[test]
    #[should_panic]
    fn test_zero_frame_size() {
        frame_count(10, 0);
    }

    #[test]
    fn test_offsets_and_contents() {
        let samples: Vec<u32> = (0..10).collect();
        let frames: Vec<_> = FrameSegmenter::new(&samples, 3).collect();

        assert_eq!(frames.len(), 3);
        for (i, frame) in frames.iter().enumerate() {
            assert_eq!(frame.index, i);
            assert_eq!(frame.offset, i * 3);
            assert_eq!(frame.samples.len(), 3);
            assert_eq!(frame.samples[0], (i * 3) as u32);
        }
    }

    #[test]
    fn test_remainder_never_framed() {
        let samples: Vec<u32> = (0..10).collect();
        let segmenter = FrameSegmenter::new(&samples, 4);

        assert_eq!(segmenter.aligned(), &samples[..8]);
        assert_eq!(segmenter.remainder(), &[8, 9]);
        assert_eq!(segmenter.len(), 2);

        let framed: Vec<u32> = segmenter.flat_map(|f| f.samples.iter().copied()).collect();
        assert!(!framed.contains(&8));
        assert!(!framed.contains(&9));
    }

    #[test]
    fn test_short_input_yields_nothing() {
        let samples = [0.0f32; 100];
        let mut segmenter = FrameSegmenter::new(&samples, 1024);
        assert_eq!(segmenter.num_frames(), 0);
        assert!(segmenter.next().is_none());
        assert_eq!(segmenter.remainder().len(), 100);
    }
}
