//! Pipeline configuration.

use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::image::Normalization;
use crate::model::{ModelKey, ModelRole, DEFAULT_MODEL_DIR};

/// Largest square side a model input may be resized to.
pub const MAX_MODEL_SIDE: u32 = 4096;

/// Configuration for the style pipeline.
#[derive(Debug, Clone)]
pub struct Config {
    /// Versioned directory holding model artifacts and style reference images.
    pub model_dir: PathBuf,

    /// Square side style images are resized to before prediction.
    pub style_size: u32,

    /// Square side content images are resized to before transfer.
    /// `None` feeds content at its native size.
    pub content_size: Option<u32>,

    /// Model producing style embeddings.
    pub prediction_model: ModelKey,

    /// Model applying style embeddings.
    pub transfer_model: ModelKey,

    /// Sample range both models expect.
    pub normalization: Normalization,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from(DEFAULT_MODEL_DIR),
            style_size: 256,
            content_size: Some(384),
            prediction_model: ModelKey::Prediction,
            transfer_model: ModelKey::Transfer,
            normalization: Normalization::UNIT,
        }
    }
}

impl Config {
    /// Use the int8-quantized model pair.
    #[must_use]
    pub fn quantized(mut self) -> Self {
        self.prediction_model = ModelKey::PredictionInt8;
        self.transfer_model = ModelKey::TransferInt8;
        self
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any parameter is out of valid range.
    pub fn validate(&self) -> Result<()> {
        check_side("style_size", self.style_size)?;

        if let Some(size) = self.content_size {
            check_side("content_size", size)?;
        }

        self.prediction_model.expect_role(ModelRole::Prediction)?;
        self.transfer_model.expect_role(ModelRole::Transfer)?;

        let Normalization { scale, offset } = self.normalization;
        if !scale.is_normal() || !offset.is_finite() {
            return Err(Error::invalid(
                "normalization",
                "scale must be finite and non-zero, offset finite",
            ));
        }

        Ok(())
    }
}

fn check_side(name: &str, side: u32) -> Result<()> {
    if (1..=MAX_MODEL_SIDE).contains(&side) {
        Ok(())
    } else {
        Err(Error::invalid(
            name,
            format!("must be between 1 and {MAX_MODEL_SIDE}"),
        ))
    }
}
