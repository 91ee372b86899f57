//! Linear interpolation between style embeddings.

use ndarray::Zip;

use crate::error::{Error, Result};
use crate::model::StyleEmbedding;

/// Interpolation weight in `[0, 1]`; `0` keeps the first style, `1` the second.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct BlendRatio(f32);

impl BlendRatio {
    /// Validate a ratio.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if `ratio` is NaN or outside `[0, 1]`.
    pub fn new(ratio: f32) -> Result<Self> {
        if (0.0..=1.0).contains(&ratio) {
            Ok(Self(ratio))
        } else {
            Err(Error::invalid("ratio", "must be between 0.0 and 1.0"))
        }
    }

    #[must_use]
    pub const fn get(self) -> f32 {
        self.0
    }
}

impl TryFrom<f32> for BlendRatio {
    type Error = Error;

    fn try_from(ratio: f32) -> Result<Self> {
        Self::new(ratio)
    }
}

/// Blend two embeddings elementwise: `a * (1 - ratio) + b * ratio`.
///
/// # Errors
///
/// Returns [`Error::DimensionMismatch`] if the embeddings differ in length.
#[allow(clippy::suboptimal_flops)]
pub fn blend(a: &StyleEmbedding, b: &StyleEmbedding, ratio: BlendRatio) -> Result<StyleEmbedding> {
    if a.len() != b.len() {
        return Err(Error::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let r = ratio.get();
    let blended = Zip::from(a.values())
        .and(b.values())
        .map_collect(|&x, &y| x * (1.0 - r) + y * r);

    StyleEmbedding::new(blended)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn embedding(values: &[f32]) -> StyleEmbedding {
        StyleEmbedding::try_from(values.to_vec()).unwrap()
    }

    #[test]
    fn test_endpoints_exact() {
        let a = embedding(&[0.1, -2.5, 3.3, 0.0]);
        let b = embedding(&[7.0, 0.25, -1.0, 1e-3]);

        assert_eq!(blend(&a, &b, BlendRatio::new(0.0).unwrap()).unwrap(), a);
        assert_eq!(blend(&a, &b, BlendRatio::new(1.0).unwrap()).unwrap(), b);
    }

    #[test]
    fn test_midpoint() {
        let a = embedding(&[0.0, 2.0]);
        let b = embedding(&[1.0, 4.0]);
        let mid = blend(&a, &b, BlendRatio::new(0.5).unwrap()).unwrap();
        assert_eq!(mid, embedding(&[0.5, 3.0]));
        assert_eq!(blend(&b, &a, BlendRatio::new(0.5).unwrap()).unwrap(), mid);
    }

    #[test]
    #[allow(clippy::cast_precision_loss)]
    fn test_monotonic_between_endpoints() {
        let a = embedding(&[-1.0, 0.3, 5.0, 2.0]);
        let b = embedding(&[1.0, 0.1, -5.0, 2.0]);

        let mut previous = a.clone();
        for step in 0..=20 {
            let ratio = BlendRatio::new(step as f32 / 20.0).unwrap();
            let current = blend(&a, &b, ratio).unwrap();

            for i in 0..a.len() {
                let (lo, hi) = {
                    let (x, y) = (a.values()[i], b.values()[i]);
                    (x.min(y), x.max(y))
                };
                let v = current.values()[i];
                assert!(v >= lo - 1e-6 && v <= hi + 1e-6, "{v} outside [{lo}, {hi}]");

                let delta = v - previous.values()[i];
                let direction = b.values()[i] - a.values()[i];
                assert!(delta * direction >= -1e-6, "not monotonic at {i}");
            }
            previous = current;
        }
    }

    #[test]
    fn test_length_mismatch() {
        let pairs = [(1, 2), (100, 99), (3, 1)];
        for (left, right) in pairs {
            let a = embedding(&vec![0.0; left]);
            let b = embedding(&vec![1.0; right]);
            let err = blend(&a, &b, BlendRatio::new(0.5).unwrap()).unwrap_err();
            assert!(matches!(err, Error::DimensionMismatch { left: l, right: r } if l == left && r == right));
        }
    }

    #[test]
    fn test_ratio_bounds() {
        assert!(BlendRatio::new(0.0).is_ok());
        assert!(BlendRatio::new(1.0).is_ok());
        for bad in [-0.01, 1.01, f32::NAN, f32::INFINITY] {
            assert!(matches!(
                BlendRatio::try_from(bad),
                Err(Error::InvalidParameter { .. })
            ));
        }
    }
}
