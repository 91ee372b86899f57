//! Style prediction stage.

use crate::error::Result;
use crate::image::ImageTensor;
use crate::model::{ModelKey, ModelRegistry, StyleEmbedding};

use super::check_image_tensor;

/// Run a style image through the prediction model for `key`.
///
/// The model is loaded on first use and shared afterwards.
///
/// # Arguments
///
/// * `registry` - Shared model registry
/// * `style` - Style image tensor, `(1, H, W, 3)`
/// * `key` - A style prediction model
///
/// # Errors
///
/// Returns [`crate::Error::Shape`] for a malformed tensor,
/// [`crate::Error::ModelRole`] if `key` is not a prediction model,
/// [`crate::Error::ModelLoad`] if the model cannot be loaded, or
/// [`crate::Error::Inference`] if the forward pass fails.
pub fn predict_embedding(
    registry: &ModelRegistry,
    style: &ImageTensor,
    key: ModelKey,
) -> Result<StyleEmbedding> {
    check_image_tensor(style)?;

    let predictor = registry.predictor(key)?;
    let embedding = predictor.predict(style)?;

    tracing::debug!("Predicted style embedding of length {}", embedding.len());
    Ok(embedding)
}
