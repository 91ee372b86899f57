//! Style transfer stage.

use crate::error::{Error, Result};
use crate::image::ImageTensor;
use crate::model::{ModelKey, ModelRegistry, StyleEmbedding};

use super::check_image_tensor;

/// Stylize a content tensor with `style` using the transfer model for `key`.
///
/// The output has the same shape as `content`.
///
/// # Errors
///
/// Returns [`Error::Shape`] for a malformed input or an output whose shape
/// differs from the content, [`Error::ModelRole`] if `key` is not a transfer
/// model, [`Error::ModelLoad`] if the model cannot be loaded, or
/// [`Error::Inference`] if the forward pass fails.
pub fn transfer(
    registry: &ModelRegistry,
    content: &ImageTensor,
    style: &StyleEmbedding,
    key: ModelKey,
) -> Result<ImageTensor> {
    check_image_tensor(content)?;

    let transformer = registry.transformer(key)?;
    let stylized = transformer.transfer(content, style)?;

    if stylized.dim() != content.dim() {
        return Err(Error::shape(
            format!("{:?} stylized tensor", content.shape()),
            format!("{:?}", stylized.shape()),
        ));
    }

    Ok(stylized)
}
