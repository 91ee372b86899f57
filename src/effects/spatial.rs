//! Neighborhood filters.

use image::imageops;
use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::edges::canny;
use imageproc::filter::filter3x3;

use super::tone::luma;

const SHARPEN: [f32; 9] = [0.0, -1.0, 0.0, -1.0, 5.0, -1.0, 0.0, -1.0, 0.0];
const EMBOSS: [f32; 9] = [-2.0, -1.0, 0.0, -1.0, 1.0, 1.0, 0.0, 1.0, 2.0];

/// Canny thresholds tuned for photographs.
const EDGE_LOW: f32 = 50.0;
const EDGE_HIGH: f32 = 100.0;

/// Number of color levels kept per channel by the cartoon filter.
const CARTOON_LEVELS: u8 = 6;

pub(super) fn blur(img: &RgbImage) -> RgbImage {
    imageops::blur(img, 2.0)
}

// Borders are padded by continuity, so flat regions pass through unchanged.
pub(super) fn sharpen(img: &RgbImage) -> RgbImage {
    filter3x3::<_, f32, u8>(img, &SHARPEN)
}

pub(super) fn emboss(img: &RgbImage) -> RgbImage {
    filter3x3::<_, f32, u8>(img, &EMBOSS)
}

pub(super) fn edges(img: &RgbImage) -> RgbImage {
    let edges = canny(&gray(img), EDGE_LOW, EDGE_HIGH);
    expand(&edges)
}

/// Pencil sketch: color-dodge the grayscale image with its blurred negative.
#[allow(clippy::cast_possible_truncation)]
pub(super) fn sketch(img: &RgbImage) -> RgbImage {
    let gray = gray(img);
    let mut negative = gray.clone();
    imageops::invert(&mut negative);
    let blurred = imageops::blur(&negative, 5.0);

    let dodged = GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let base = u32::from(gray.get_pixel(x, y)[0]);
        let mask = u32::from(blurred.get_pixel(x, y)[0]);
        let value = if mask == 255 {
            255
        } else {
            (base * 255 / (255 - mask)).min(255)
        };
        // Safe: clamped to 255 above
        Luma([value as u8])
    });

    expand(&dodged)
}

/// Posterized colors with dark outlines.
pub(super) fn cartoon(img: &RgbImage) -> RgbImage {
    let step = 256 / u16::from(CARTOON_LEVELS);
    let outline = canny(&gray(img), EDGE_LOW, EDGE_HIGH);

    let mut out = imageops::blur(img, 1.5);
    for (x, y, px) in out.enumerate_pixels_mut() {
        if outline.get_pixel(x, y)[0] > 0 {
            *px = Rgb([0, 0, 0]);
        } else {
            px.0 = px.0.map(|v| quantize(v, step));
        }
    }
    out
}

#[allow(clippy::cast_possible_truncation)]
fn quantize(value: u8, step: u16) -> u8 {
    let level = u16::from(value) / step;
    // Safe: centre of the bucket is always below 256
    (level * step + step / 2).min(255) as u8
}

fn gray(img: &RgbImage) -> GrayImage {
    GrayImage::from_fn(img.width(), img.height(), |x, y| {
        Luma([luma(*img.get_pixel(x, y))])
    })
}

fn expand(gray: &GrayImage) -> RgbImage {
    RgbImage::from_fn(gray.width(), gray.height(), |x, y| {
        let v = gray.get_pixel(x, y)[0];
        Rgb([v, v, v])
    })
}
