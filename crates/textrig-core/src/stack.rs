// this_file: crates/textrig-core/src/stack.rs

//! Mask stacks and grayscale bitmaps, plus bounding-box trimming.

use crate::{Result, TextrigError};

/// 3-D grid of 8-bit values indexed `(channel, row, column)`.
///
/// Channel 0 holds the full rendering; channels 1..N hold one binary mask
/// per cluster, aligned to the same raster frame. All channels always share
/// the same height and width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskStack {
    channels: usize,
    height: usize,
    width: usize,
    data: Vec<u8>,
}

impl MaskStack {
    /// Create a zero-filled stack.
    pub fn new(channels: usize, height: usize, width: usize) -> Self {
        Self {
            channels,
            height,
            width,
            data: vec![0; channels * height * width],
        }
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// True when the raster frame has no pixels.
    pub fn is_empty(&self) -> bool {
        self.height == 0 || self.width == 0
    }

    fn idx(&self, channel: usize, row: usize, col: usize) -> usize {
        (channel * self.height + row) * self.width + col
    }

    pub fn get(&self, channel: usize, row: usize, col: usize) -> u8 {
        self.data[self.idx(channel, row, col)]
    }

    pub fn set(&mut self, channel: usize, row: usize, col: usize, value: u8) {
        let i = self.idx(channel, row, col);
        self.data[i] = value;
    }

    /// One channel as a contiguous row-major slice.
    pub fn channel(&self, channel: usize) -> &[u8] {
        let plane = self.height * self.width;
        &self.data[channel * plane..(channel + 1) * plane]
    }

    pub fn channel_mut(&mut self, channel: usize) -> &mut [u8] {
        let plane = self.height * self.width;
        &mut self.data[channel * plane..(channel + 1) * plane]
    }

    pub fn fill_channel(&mut self, channel: usize, value: u8) {
        self.channel_mut(channel).fill(value);
    }

    /// Crop every channel to the bounding box of channel 0's foreground.
    ///
    /// Background is 0, or 255 when `white_bg` is set. Fails with
    /// [`TextrigError::EmptyForeground`] when channel 0 is entirely
    /// background.
    pub fn trim(&self, white_bg: bool) -> Result<MaskStack> {
        if self.channels == 0 {
            return Err(TextrigError::EmptyForeground);
        }
        let bg = if white_bg { 255 } else { 0 };
        let (top, bottom, left, right) =
            foreground_bounds(self.height, self.width, bg, |row, col| {
                self.get(0, row, col)
            })?;

        let height = bottom - top + 1;
        let width = right - left + 1;
        let mut out = MaskStack::new(self.channels, height, width);
        for c in 0..self.channels {
            for row in 0..height {
                for col in 0..width {
                    out.set(c, row, col, self.get(c, top + row, left + col));
                }
            }
        }
        Ok(out)
    }
}

/// Owned 2-D grayscale image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl Bitmap {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height],
        }
    }

    pub fn from_data(width: usize, height: usize, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), width * height);
        Self {
            width,
            height,
            data,
        }
    }

    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.data[row * self.width + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: u8) {
        self.data[row * self.width + col] = value;
    }

    /// Crop to the bounding box of non-background pixels.
    ///
    /// Background is 0, or 255 when `white_bg` is set.
    pub fn trim(&self, white_bg: bool) -> Result<Bitmap> {
        let bg = if white_bg { 255 } else { 0 };
        let (top, bottom, left, right) =
            foreground_bounds(self.height, self.width, bg, |row, col| self.get(row, col))?;

        let height = bottom - top + 1;
        let width = right - left + 1;
        let mut out = Bitmap::new(width, height);
        for row in 0..height {
            for col in 0..width {
                out.set(row, col, self.get(top + row, left + col));
            }
        }
        Ok(out)
    }
}

/// Inclusive `(top, bottom, left, right)` bounds of pixels differing from
/// `bg`, or [`TextrigError::EmptyForeground`] when there are none.
fn foreground_bounds(
    height: usize,
    width: usize,
    bg: u8,
    sample: impl Fn(usize, usize) -> u8,
) -> Result<(usize, usize, usize, usize)> {
    let mut top = None;
    let mut bottom = 0;
    let mut left = width;
    let mut right = 0;

    for row in 0..height {
        for col in 0..width {
            if sample(row, col) != bg {
                if top.is_none() {
                    top = Some(row);
                }
                bottom = row;
                left = left.min(col);
                right = right.max(col);
            }
        }
    }

    match top {
        Some(top) => Ok((top, bottom, left, right)),
        None => Err(TextrigError::EmptyForeground),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trim_all_background_fails() {
        let img = Bitmap::new(10, 10);
        assert!(matches!(
            img.trim(false),
            Err(TextrigError::EmptyForeground)
        ));
    }

    #[test]
    fn trim_single_pixel_returns_1x1() {
        let mut img = Bitmap::new(10, 10);
        img.set(3, 4, 7);
        let trimmed = img.trim(false).unwrap();
        assert_eq!((trimmed.width, trimmed.height), (1, 1));
        assert_eq!(trimmed.get(0, 0), 7);
    }

    #[test]
    fn trim_is_idempotent() {
        let mut img = Bitmap::new(8, 6);
        img.set(1, 2, 50);
        img.set(4, 5, 200);
        let once = img.trim(false).unwrap();
        let twice = once.trim(false).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn trim_white_background() {
        let mut img = Bitmap::new(5, 5);
        img.data.fill(255);
        img.set(2, 2, 0);
        let trimmed = img.trim(true).unwrap();
        assert_eq!((trimmed.width, trimmed.height), (1, 1));
    }

    #[test]
    fn stack_trim_uses_channel_zero_for_all_channels() {
        let mut stack = MaskStack::new(3, 6, 6);
        stack.fill_channel(0, 255);
        // Ink square on channel 0 rows 1..=2, cols 2..=4.
        for row in 1..3 {
            for col in 2..5 {
                stack.set(0, row, col, 10);
            }
        }
        // Mask pixel outside channel 0's extent gets cropped away.
        stack.set(1, 5, 5, 1);
        stack.set(2, 1, 2, 1);

        let trimmed = stack.trim(true).unwrap();
        assert_eq!(trimmed.channels(), 3);
        assert_eq!((trimmed.height(), trimmed.width()), (2, 3));
        assert_eq!(trimmed.get(2, 0, 0), 1);
        assert_eq!(trimmed.channel(1).iter().filter(|&&v| v != 0).count(), 0);
    }

    #[test]
    fn stack_trim_empty_frame_fails() {
        let stack = MaskStack::new(2, 0, 0);
        assert!(matches!(
            stack.trim(true),
            Err(TextrigError::EmptyForeground)
        ));
    }

    #[test]
    fn channel_slices_are_disjoint_planes() {
        let mut stack = MaskStack::new(2, 2, 2);
        stack.fill_channel(0, 9);
        assert!(stack.channel(0).iter().all(|&v| v == 9));
        assert!(stack.channel(1).iter().all(|&v| v == 0));
    }
}
