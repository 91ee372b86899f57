//! Pixel buffers, tensor conversion, and the image I/O boundaries.

mod codec;
mod fetch;
mod load;
mod save;

pub use codec::{decode, encode, Normalization};
pub use fetch::{fetch_image, fetch_image_with_limit, DEFAULT_MAX_FETCH_BYTES};
pub use load::{load_image, open_source, open_source_with_limit};
pub use save::save_image;

use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbImage};
use ndarray::Array4;

use crate::error::{Error, Result};

/// Image tensor in NHWC format (batch, height, width, channels).
/// Value range depends on the [`Normalization`] it was encoded with.
pub type ImageTensor = Array4<f32>;

/// Number of channels in RGB images.
pub const RGB_CHANNELS: usize = 3;

/// Byte order of the three color samples in a raw buffer.
///
/// Everything inside the pipeline is RGB. Conversion happens only in
/// [`PixelBuffer::from_raw`] and [`PixelBuffer::to_raw`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelOrder {
    #[default]
    Rgb,
    Bgr,
}

impl ChannelOrder {
    fn reorder(self, data: &mut [u8]) {
        if self == Self::Bgr {
            for px in data.chunks_exact_mut(RGB_CHANNELS) {
                px.swap(0, 2);
            }
        }
    }
}

/// A dense, non-empty, 3-channel 8-bit image in RGB order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    image: RgbImage,
}

impl PixelBuffer {
    /// Wrap an RGB image.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Shape`] if either dimension is zero.
    pub fn new(image: RgbImage) -> Result<Self> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(Error::shape(
                "non-empty image",
                format!("{width}x{height}"),
            ));
        }
        Ok(Self { image })
    }

    /// Build a buffer from interleaved samples in the given channel order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Shape`] if `channels` is not 3, a dimension is zero,
    /// or `data` does not hold exactly `width * height * channels` samples.
    pub fn from_raw(
        width: u32,
        height: u32,
        channels: usize,
        mut data: Vec<u8>,
        order: ChannelOrder,
    ) -> Result<Self> {
        if channels != RGB_CHANNELS {
            return Err(Error::shape(
                format!("{RGB_CHANNELS} channels"),
                format!("{channels} channels"),
            ));
        }

        let expected = width as usize * height as usize * RGB_CHANNELS;
        if data.len() != expected {
            return Err(Error::shape(
                format!("{expected} samples for {width}x{height}x{RGB_CHANNELS}"),
                format!("{} samples", data.len()),
            ));
        }

        order.reorder(&mut data);
        let image = RgbImage::from_raw(width, height, data)
            .ok_or_else(|| Error::shape("valid raw buffer", format!("{width}x{height}")))?;
        Self::new(image)
    }

    /// Convert any decoded image to an RGB pixel buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Shape`] if the image is empty.
    pub fn from_dynamic(image: &DynamicImage) -> Result<Self> {
        Self::new(image.to_rgb8())
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// `(width, height)` in pixels.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Borrow the underlying RGB image.
    #[must_use]
    pub const fn as_rgb(&self) -> &RgbImage {
        &self.image
    }

    /// Take the underlying RGB image.
    #[must_use]
    pub fn into_rgb(self) -> RgbImage {
        self.image
    }

    /// Resample to `width` x `height` with Lanczos3.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Shape`] if either target dimension is zero.
    pub fn resized(&self, width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::shape(
                "non-empty target size",
                format!("{width}x{height}"),
            ));
        }
        if self.dimensions() == (width, height) {
            return Ok(self.clone());
        }
        Self::new(imageops::resize(&self.image, width, height, FilterType::Lanczos3))
    }

    /// Derive a buffer of the same dimensions through an image transform.
    pub(crate) fn map_image(&self, f: impl FnOnce(&RgbImage) -> RgbImage) -> Self {
        let image = f(&self.image);
        debug_assert_eq!(
            image.dimensions(),
            self.image.dimensions(),
            "image transform changed dimensions"
        );
        Self { image }
    }

    /// Copy the samples out in the requested channel order.
    #[must_use]
    pub fn to_raw(&self, order: ChannelOrder) -> Vec<u8> {
        let mut data = self.image.as_raw().clone();
        order.reorder(&mut data);
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_rgb_channels() {
        let err = PixelBuffer::from_raw(2, 2, 4, vec![0; 16], ChannelOrder::Rgb).unwrap_err();
        assert!(matches!(err, Error::Shape { .. }));
    }

    #[test]
    fn test_rejects_empty() {
        let err = PixelBuffer::from_raw(0, 2, 3, Vec::new(), ChannelOrder::Rgb).unwrap_err();
        assert!(matches!(err, Error::Shape { .. }));
    }

    #[test]
    fn test_rejects_short_buffer() {
        let err = PixelBuffer::from_raw(2, 2, 3, vec![0; 11], ChannelOrder::Rgb).unwrap_err();
        assert!(matches!(err, Error::Shape { .. }));
    }

    #[test]
    fn test_bgr_boundary() {
        let buffer =
            PixelBuffer::from_raw(1, 1, 3, vec![10, 20, 30], ChannelOrder::Bgr).unwrap();
        assert_eq!(buffer.as_rgb().get_pixel(0, 0).0, [30, 20, 10]);
        assert_eq!(buffer.to_raw(ChannelOrder::Bgr), vec![10, 20, 30]);
        assert_eq!(buffer.to_raw(ChannelOrder::Rgb), vec![30, 20, 10]);
    }

    #[test]
    fn test_resized() {
        let buffer = PixelBuffer::new(RgbImage::new(6, 4)).unwrap();
        assert_eq!(buffer.resized(3, 9).unwrap().dimensions(), (3, 9));
        assert!(matches!(buffer.resized(0, 9), Err(Error::Shape { .. })));
    }
}
