//! Image loading utilities.

use std::path::Path;

use crate::error::{Error, Result};

use super::{fetch_image_with_limit, PixelBuffer, DEFAULT_MAX_FETCH_BYTES};

/// Load an image from disk into an RGB pixel buffer.
///
/// Any format the `image` crate decodes is accepted; alpha is dropped and
/// grayscale is expanded to three channels.
///
/// # Errors
///
/// Returns an error if the image cannot be loaded or is empty.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<PixelBuffer> {
    let path = path.as_ref();

    let img = image::open(path).map_err(|source| Error::ImageLoad {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!(
        "Loaded {} ({}x{})",
        path.display(),
        img.width(),
        img.height()
    );

    PixelBuffer::from_dynamic(&img)
}

/// Load an image from either an `http(s)://` URL or a filesystem path.
///
/// # Errors
///
/// Returns an error if the image cannot be fetched, read, or decoded.
pub fn open_source(source: &str) -> Result<PixelBuffer> {
    open_source_with_limit(source, DEFAULT_MAX_FETCH_BYTES)
}

/// Like [`open_source`], capping fetched bodies at `max_fetch_bytes`.
///
/// # Errors
///
/// Returns an error if the image cannot be fetched, read, or decoded.
pub fn open_source_with_limit(source: &str, max_fetch_bytes: u64) -> Result<PixelBuffer> {
    if is_url(source) {
        fetch_image_with_limit(source, max_fetch_bytes)
    } else {
        load_image(source)
    }
}

fn is_url(source: &str) -> bool {
    let lower = source.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
