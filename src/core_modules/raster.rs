// THEORY:
// The `Raster` is the "dumb" data container the whole engine works on: a width x
// height grid of 8-bit samples with a fixed number of interleaved channels per
// pixel. It is the input of a warp call and, with identical dimensions and channel
// count, its output.
//
// Key principles:
// 1.  **Flat Interleaved Storage**: Samples are laid out row-major, pixel after
//     pixel, channel after channel, exactly like the buffers produced by the
//     `image` crate. Conversion in and out is a copy at most.
// 2.  **Shape Checked Once**: `Raster::new` rejects empty dimensions and buffers
//     whose length does not match `width * height * channels`. Channel arity is
//     checked by the luminance stage, which is the first stage that has to
//     interpret the channels.
// 3.  **No Channel-Level Logic**: Resamplers copy or blend whole pixels; the
//     raster only knows how to hand out pixel slices.

use crate::core_modules::error::{WarpError, WarpResult};

pub type Sample = u8;

/// Channel arities the engine accepts: gray, RGB, RGBA.
pub const SUPPORTED_CHANNELS: [u8; 3] = [1, 3, 4];

/// An owned, interleaved 8-bit image buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    channels: u8,
    data: Vec<Sample>,
}

impl Raster {
    /// Wraps an interleaved buffer after checking its shape.
    pub fn new(width: u32, height: u32, channels: u8, data: Vec<Sample>) -> WarpResult<Self> {
        if width == 0 || height == 0 {
            return Err(WarpError::invalid_image(format!(
                "zero-sized raster {width}x{height}"
            )));
        }
        if channels == 0 {
            return Err(WarpError::invalid_image("raster has no channels"));
        }
        let expected = width as usize * height as usize * channels as usize;
        if data.len() != expected {
            return Err(WarpError::invalid_image(format!(
                "buffer holds {} samples, {width}x{height}x{channels} needs {expected}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Creates a raster where every pixel equals `pixel`.
    pub fn from_pixel(width: u32, height: u32, pixel: &[Sample]) -> WarpResult<Self> {
        let count = width as usize * height as usize;
        let data = pixel.repeat(count);
        Self::new(width, height, pixel.len() as u8, data)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn as_bytes(&self) -> &[Sample] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<Sample> {
        self.data
    }

    /// True when the channel count is one of [`SUPPORTED_CHANNELS`].
    pub fn has_supported_layout(&self) -> bool {
        SUPPORTED_CHANNELS.contains(&self.channels)
    }

    /// The samples of pixel `(x, y)`.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> &[Sample] {
        let start = self.byte_offset(x, y);
        &self.data[start..start + self.channels as usize]
    }

    #[inline]
    fn byte_offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * self.channels as usize
    }

    /// Iterates over pixels in row-major order.
    pub fn pixels(&self) -> std::slice::ChunksExact<'_, Sample> {
        self.data.chunks_exact(self.channels as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mismatched_buffer() {
        let err = Raster::new(2, 2, 3, vec![0; 11]).unwrap_err();
        assert!(matches!(err, WarpError::InvalidImage { .. }));
    }

    #[test]
    fn rejects_zero_dimensions() {
        assert!(Raster::new(0, 4, 3, Vec::new()).is_err());
        assert!(Raster::new(4, 0, 3, Vec::new()).is_err());
    }

    #[test]
    fn pixel_addressing_is_row_major() {
        let data: Vec<u8> = (0..12).collect();
        let raster = Raster::new(2, 2, 3, data).unwrap();
        assert_eq!(raster.pixel(0, 0), &[0, 1, 2]);
        assert_eq!(raster.pixel(1, 0), &[3, 4, 5]);
        assert_eq!(raster.pixel(0, 1), &[6, 7, 8]);
        assert_eq!(raster.pixels().count(), 4);
    }

    #[test]
    fn two_channel_raster_is_constructible_but_unsupported() {
        let raster = Raster::new(1, 1, 2, vec![10, 255]).unwrap();
        assert!(!raster.has_supported_layout());
    }
}
