// THEORY:
// `PixelGrid` is the real-valued image the overlay is painted on. It is either the
// time-average of every frame or a copy of the first frame, and keeping it in `f64`
// means the average does not lose precision before the final clip to 8 bits.
//
// `AverageAccumulator` builds the average image as a running per-channel sum, divided
// once by the frame count at the end. The sum is order independent, so frames may be
// added in any order.

use crate::error::{HeatmapError, HeatmapResult};
use image::{Rgb, RgbImage};

const CHANNELS: usize = 3;

/// A `height x width x 3` grid of real-valued color samples.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelGrid {
    width: u32,
    height: u32,
    data: Vec<f64>,
}

impl PixelGrid {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The three channel values at `(x, y)`, in the decoder's channel order.
    pub fn channels(&self, x: u32, y: u32) -> [f64; CHANNELS] {
        let i = self.offset(x, y);
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * CHANNELS
    }

    /// Rounds and clips every sample into an 8-bit image.
    pub fn to_rgb_image(&self) -> RgbImage {
        RgbImage::from_fn(self.width, self.height, |x, y| {
            let [c0, c1, c2] = self.channels(x, y);
            Rgb([clip8(c0), clip8(c1), clip8(c2)])
        })
    }
}

impl From<&RgbImage> for PixelGrid {
    fn from(image: &RgbImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            data: image.as_raw().iter().map(|&v| v as f64).collect(),
        }
    }
}

/// Clips a real channel value into `[0, 255]` and rounds it to the nearest integer.
pub fn clip8(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.clamp(0.0, 255.0).round() as u8
}

/// Running per-pixel sum of frames, used to build the average image.
#[derive(Debug, Clone)]
pub struct AverageAccumulator {
    width: u32,
    height: u32,
    sum: Vec<f64>,
    frames: usize,
}

impl AverageAccumulator {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            sum: vec![0.0; width as usize * height as usize * CHANNELS],
            frames: 0,
        }
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn add(&mut self, frame: &RgbImage) {
        debug_assert_eq!(frame.dimensions(), (self.width, self.height));
        for (acc, &v) in self.sum.iter_mut().zip(frame.as_raw().iter()) {
            *acc += v as f64;
        }
        self.frames += 1;
    }

    /// Divides the sum by the number of frames added.
    pub fn finish(self) -> HeatmapResult<PixelGrid> {
        if self.frames == 0 {
            return Err(HeatmapError::InvalidConfig(
                "cannot average an empty frame sequence".to_string(),
            ));
        }
        let count = self.frames as f64;
        Ok(PixelGrid {
            width: self.width,
            height: self.height,
            data: self.sum.into_iter().map(|v| v / count).collect(),
        })
    }
}
