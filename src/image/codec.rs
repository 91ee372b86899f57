//! Conversion between pixel buffers and normalized model tensors.

use ndarray::Array4;

use crate::error::{Error, Result};

use super::{ChannelOrder, ImageTensor, PixelBuffer, RGB_CHANNELS};

/// Affine map from `[0, 255]` samples to a model's float range.
///
/// A sample `v` becomes `v * scale + offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalization {
    pub scale: f32,
    pub offset: f32,
}

impl Normalization {
    /// `[0, 255]` to `[0, 1]`, the contract of the style prediction and transfer models.
    pub const UNIT: Self = Self {
        scale: 1.0 / 255.0,
        offset: 0.0,
    };

    /// `[0, 255]` to `[-1, 1]`.
    pub const SIGNED: Self = Self {
        scale: 1.0 / 127.5,
        offset: -1.0,
    };

    /// Map one sample into the normalized range.
    #[inline]
    #[must_use]
    pub fn normalize(self, value: u8) -> f32 {
        f32::from(value).mul_add(self.scale, self.offset)
    }

    /// Map a normalized value back to a sample, rounding and clamping.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn denormalize(self, value: f32) -> u8 {
        // Safe: clamped to [0, 255] before casting; NaN casts to 0
        ((value - self.offset) / self.scale).round().clamp(0.0, 255.0) as u8
    }
}

impl Default for Normalization {
    fn default() -> Self {
        Self::UNIT
    }
}

/// Convert a pixel buffer into a `(1, height, width, 3)` tensor.
///
/// The buffer is resampled with Lanczos3 when it does not already match
/// `target` (`(width, height)`).
///
/// # Errors
///
/// Returns [`Error::Shape`] if `target` has a zero dimension.
pub fn encode(
    buffer: &PixelBuffer,
    target: (u32, u32),
    normalization: Normalization,
) -> Result<ImageTensor> {
    let (width, height) = target;
    if width == 0 || height == 0 {
        return Err(Error::shape(
            "non-empty target shape",
            format!("{width}x{height}"),
        ));
    }

    let resized;
    let buffer = if buffer.dimensions() == target {
        buffer
    } else {
        resized = buffer.resized(width, height)?;
        &resized
    };

    let (width, height) = (width as usize, height as usize);
    let samples = buffer
        .as_rgb()
        .as_raw()
        .iter()
        .map(|&v| normalization.normalize(v))
        .collect();

    Array4::from_shape_vec((1, height, width, RGB_CHANNELS), samples)
        .map_err(|err| Error::shape(format!("1x{height}x{width}x{RGB_CHANNELS}"), err.to_string()))
}

/// Convert a `(1, height, width, 3)` tensor back into a pixel buffer.
///
/// Out-of-range values are clamped, never wrapped.
///
/// # Errors
///
/// Returns [`Error::Shape`] if the tensor is not a single non-empty RGB image.
#[allow(clippy::cast_possible_truncation)]
pub fn decode(tensor: &ImageTensor, normalization: Normalization) -> Result<PixelBuffer> {
    let (batch, height, width, channels) = tensor.dim();
    if batch != 1 || channels != RGB_CHANNELS || height == 0 || width == 0 {
        return Err(Error::shape(
            "1xHxWx3 tensor",
            format!("{batch}x{height}x{width}x{channels}"),
        ));
    }

    let data = tensor
        .iter()
        .map(|&v| normalization.denormalize(v))
        .collect();

    // Safe: tensor dimensions come from an image and fit in u32
    PixelBuffer::from_raw(
        width as u32,
        height as u32,
        RGB_CHANNELS,
        data,
        ChannelOrder::Rgb,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;
    use rand::{Rng, SeedableRng};

    fn random_buffer(rng: &mut rand::rngs::StdRng, width: u32, height: u32) -> PixelBuffer {
        let mut img = RgbImage::new(width, height);
        for px in img.pixels_mut() {
            px.0 = [rng.random(), rng.random(), rng.random()];
        }
        PixelBuffer::new(img).unwrap()
    }

    #[test]
    fn test_round_trip_within_one() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        for normalization in [Normalization::UNIT, Normalization::SIGNED] {
            for (w, h) in [(1, 1), (3, 5), (17, 9)] {
                let buffer = random_buffer(&mut rng, w, h);
                let tensor = encode(&buffer, buffer.dimensions(), normalization).unwrap();
                let back = decode(&tensor, normalization).unwrap();

                assert_eq!(back.dimensions(), buffer.dimensions());
                for (a, b) in buffer.as_rgb().as_raw().iter().zip(back.as_rgb().as_raw()) {
                    assert!(a.abs_diff(*b) <= 1, "{a} vs {b}");
                }
            }
        }
    }

    #[test]
    fn test_tensor_layout() {
        let mut img = RgbImage::new(4, 2);
        img.put_pixel(3, 1, image::Rgb([255, 0, 51]));
        let buffer = PixelBuffer::new(img).unwrap();

        let tensor = encode(&buffer, (4, 2), Normalization::UNIT).unwrap();
        assert_eq!(tensor.shape(), &[1, 2, 4, 3]);
        assert!((tensor[[0, 1, 3, 0]] - 1.0).abs() < 1e-6);
        assert!((tensor[[0, 1, 3, 2]] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_signed_range() {
        let buffer = PixelBuffer::new(RgbImage::new(2, 2)).unwrap();
        let tensor = encode(&buffer, (2, 2), Normalization::SIGNED).unwrap();
        assert!(tensor.iter().all(|&v| (v + 1.0).abs() < 1e-6));
    }

    #[test]
    fn test_encode_resizes() {
        let buffer = PixelBuffer::new(RgbImage::new(10, 20)).unwrap();
        let tensor = encode(&buffer, (8, 8), Normalization::UNIT).unwrap();
        assert_eq!(tensor.shape(), &[1, 8, 8, 3]);
    }

    #[test]
    fn test_encode_rejects_empty_target() {
        let buffer = PixelBuffer::new(RgbImage::new(2, 2)).unwrap();
        assert!(matches!(
            encode(&buffer, (0, 4), Normalization::UNIT),
            Err(Error::Shape { .. })
        ));
    }

    #[test]
    fn test_decode_clamps() {
        let mut tensor = ImageTensor::zeros((1, 1, 2, 3));
        tensor[[0, 0, 0, 0]] = 2.0;
        tensor[[0, 0, 0, 1]] = -3.0;
        tensor[[0, 0, 1, 2]] = f32::NAN;

        let buffer = decode(&tensor, Normalization::UNIT).unwrap();
        assert_eq!(buffer.as_rgb().get_pixel(0, 0).0, [255, 0, 0]);
        assert_eq!(buffer.as_rgb().get_pixel(1, 0).0, [0, 0, 0]);
    }

    #[test]
    fn test_decode_rejects_bad_shape() {
        let tensor = ImageTensor::zeros((1, 2, 2, 4));
        assert!(matches!(
            decode(&tensor, Normalization::UNIT),
            Err(Error::Shape { .. })
        ));

        let tensor = ImageTensor::zeros((2, 2, 2, 3));
        assert!(matches!(
            decode(&tensor, Normalization::UNIT),
            Err(Error::Shape { .. })
        ));
    }

    #[test]
    fn test_denormalize() {
        assert_eq!(Normalization::SIGNED.denormalize(-1.0), 0);
        assert_eq!(Normalization::SIGNED.denormalize(1.0), 255);
        assert_eq!(Normalization::UNIT.denormalize(0.2), 51);
    }
}
