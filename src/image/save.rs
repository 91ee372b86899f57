//! Image saving utilities.

use std::path::Path;

use image::DynamicImage;

use crate::error::{Error, Result};

use super::PixelBuffer;

/// Save a pixel buffer as an image file.
///
/// The format follows the extension: `jpg`/`jpeg` are written with the given
/// quality, everything else defaults to PNG.
///
/// # Arguments
///
/// * `buffer` - RGB pixel buffer
/// * `path` - Output file path
/// * `quality` - JPEG quality (1-100), ignored for other formats
///
/// # Errors
///
/// Returns an error if the image cannot be saved.
pub fn save_image<P: AsRef<Path>>(buffer: &PixelBuffer, path: P, quality: u8) -> Result<()> {
    let path = path.as_ref();
    let img = DynamicImage::ImageRgb8(buffer.as_rgb().clone());

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("png")
        .to_lowercase();

    let save_err = |source: image::ImageError| Error::ImageSave {
        path: path.to_path_buf(),
        source,
    };

    match extension.as_str() {
        "jpg" | "jpeg" => {
            let mut output = std::fs::File::create(path)
                .map_err(|err| save_err(image::ImageError::IoError(err)))?;
            let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut output, quality);
            img.write_with_encoder(encoder).map_err(save_err)?;
        }
        "png" => img.save(path).map_err(save_err)?,
        _ => img
            .save_with_format(path, image::ImageFormat::Png)
            .map_err(save_err)?,
    }

    tracing::debug!("Saved {}x{} image to {}", img.width(), img.height(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::image::load_image;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_png_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        let buffer = PixelBuffer::new(RgbImage::from_pixel(5, 4, Rgb([9, 99, 199]))).unwrap();

        save_image(&buffer, &path, 95).unwrap();
        let back = load_image(&path).unwrap();

        assert_eq!(back, buffer);
    }

    #[test]
    fn test_unknown_extension_is_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.img");
        let buffer = PixelBuffer::new(RgbImage::new(2, 2)).unwrap();

        save_image(&buffer, &path, 95).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }

    #[test]
    fn test_jpeg_keeps_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jpg");
        let buffer = PixelBuffer::new(RgbImage::new(7, 3)).unwrap();

        save_image(&buffer, &path, 80).unwrap();
        assert_eq!(load_image(&path).unwrap().dimensions(), (7, 3));
    }

    #[test]
    fn test_unwritable_path_is_output_error() {
        let dir = tempfile::tempdir().unwrap();
        let buffer = PixelBuffer::new(RgbImage::new(2, 2)).unwrap();

        for name in ["out.png", "out.jpg"] {
            let path = dir.path().join("missing").join(name);
            let err = save_image(&buffer, &path, 90).unwrap_err();
            assert!(matches!(err, Error::ImageSave { .. }), "{name}: {err}");
            assert_eq!(err.kind(), ErrorKind::Output);
            assert!(!err.kind().is_caller_error());
        }
    }
}
