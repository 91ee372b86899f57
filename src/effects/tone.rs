//! Per-pixel color transforms.

use image::{Rgb, RgbImage};

/// BT.601 luma, rounded.
#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(super) fn luma(px: Rgb<u8>) -> u8 {
    let [r, g, b] = px.0.map(f32::from);
    // Safe: clamped to [0, 255] before casting
    0.299_f32
        .mul_add(r, 0.587_f32.mul_add(g, 0.114 * b))
        .round()
        .clamp(0.0, 255.0) as u8
}

pub(super) fn grayscale(img: &RgbImage) -> RgbImage {
    let mut out = img.clone();
    for px in out.pixels_mut() {
        let y = luma(*px);
        *px = Rgb([y, y, y]);
    }
    out
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(super) fn sepia(img: &RgbImage) -> RgbImage {
    const WEIGHTS: [[f32; 3]; 3] = [
        [0.393, 0.769, 0.189],
        [0.349, 0.686, 0.168],
        [0.272, 0.534, 0.131],
    ];

    let mut out = img.clone();
    for px in out.pixels_mut() {
        let rgb = px.0.map(f32::from);
        px.0 = WEIGHTS.map(|[wr, wg, wb]| {
            wr.mul_add(rgb[0], wg.mul_add(rgb[1], wb * rgb[2]))
                .round()
                .clamp(0.0, 255.0) as u8
        });
    }
    out
}

pub(super) fn invert(img: &RgbImage) -> RgbImage {
    let mut out = img.clone();
    image::imageops::invert(&mut out);
    out
}
