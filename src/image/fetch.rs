//! Remote image acquisition.

use std::io::{self, Read};

use indicatif::{ProgressBar, ProgressStyle};

use crate::error::{Error, Result};

use super::PixelBuffer;

/// Default cap on a fetched image body (32 MiB).
pub const DEFAULT_MAX_FETCH_BYTES: u64 = 32 * 1024 * 1024;

/// Download an image and decode it into an RGB pixel buffer.
///
/// Bodies larger than [`DEFAULT_MAX_FETCH_BYTES`] are rejected.
///
/// # Errors
///
/// Returns an error if the request fails, the server responds with an
/// error status, the body is too large, or it is not a decodable image.
pub fn fetch_image(url: &str) -> Result<PixelBuffer> {
    fetch_image_with_limit(url, DEFAULT_MAX_FETCH_BYTES)
}

/// Like [`fetch_image`], with an explicit cap on the body size in bytes.
///
/// # Errors
///
/// See [`fetch_image`].
pub fn fetch_image_with_limit(url: &str, max_bytes: u64) -> Result<PixelBuffer> {
    tracing::info!("Fetching image from {url}");

    let fetch_err = |source| Error::Fetch {
        url: url.to_string(),
        source,
    };

    let client = reqwest::blocking::Client::new();
    let response = client
        .get(url)
        .send()
        .and_then(reqwest::blocking::Response::error_for_status)
        .map_err(fetch_err)?;

    if response.content_length().is_some_and(|len| len > max_bytes) {
        return Err(too_large(url, max_bytes));
    }

    let pb = response
        .content_length()
        .map_or_else(ProgressBar::new_spinner, ProgressBar::new);
    let template = "{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes}";
    if let Ok(style) = ProgressStyle::default_bar().template(template) {
        pb.set_style(style.progress_chars("#>-"));
    }

    let body = read_body(response, url, max_bytes, &pb);
    pb.finish_and_clear();
    let body = body?;

    let img = image::load_from_memory(&body).map_err(|source| Error::ImageDecode {
        url: url.to_string(),
        source,
    })?;

    PixelBuffer::from_dynamic(&img)
}

/// Read a response body, failing once it grows past `max_bytes`.
fn read_body<R: Read>(
    mut reader: R,
    url: &str,
    max_bytes: u64,
    pb: &ProgressBar,
) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(source) => {
                return Err(Error::FetchRead {
                    url: url.to_string(),
                    source,
                })
            }
        };
        if (body.len() + bytes_read) as u64 > max_bytes {
            return Err(too_large(url, max_bytes));
        }
        body.extend_from_slice(&buffer[..bytes_read]);
        pb.inc(bytes_read as u64);
    }

    Ok(body)
}

fn too_large(url: &str, limit: u64) -> Error {
    Error::FetchTooLarge {
        url: url.to_string(),
        limit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const URL: &str = "https://example.com/cat.png";

    /// Yields `good` bytes, then fails.
    struct BrokenStream {
        good: usize,
    }

    impl Read for BrokenStream {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.good == 0 {
                return Err(io::ErrorKind::ConnectionReset.into());
            }
            let n = self.good.min(buf.len());
            buf[..n].fill(7);
            self.good -= n;
            Ok(n)
        }
    }

    #[test]
    fn test_body_within_limit() {
        let data = vec![1u8; 20_000];
        let body =
            read_body(Cursor::new(data.clone()), URL, 20_000, &ProgressBar::hidden()).unwrap();
        assert_eq!(body, data);
    }

    #[test]
    fn test_body_over_limit_is_rejected() {
        let data = vec![1u8; 20_001];
        let err = read_body(Cursor::new(data), URL, 20_000, &ProgressBar::hidden()).unwrap_err();
        assert!(matches!(err, Error::FetchTooLarge { limit: 20_000, .. }), "{err}");
        assert!(err.kind().is_caller_error());
    }

    #[test]
    fn test_truncated_body_is_fetch_error() {
        let err =
            read_body(BrokenStream { good: 100 }, URL, 1024, &ProgressBar::hidden()).unwrap_err();
        assert!(matches!(err, Error::FetchRead { ref url, .. } if url == URL), "{err}");
        assert!(err.kind().is_caller_error());
    }
}
