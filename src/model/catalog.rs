//! Closed catalogues of model artifacts and named styles.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Which pipeline stage a model serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelRole {
    /// Style image to style embedding.
    Prediction,
    /// Content image plus style embedding to stylized image.
    Transfer,
}

impl fmt::Display for ModelRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prediction => f.write_str("style prediction"),
            Self::Transfer => f.write_str("style transfer"),
        }
    }
}

/// Model artifacts used by the pipeline.
///
/// The filename doubles as the key's external name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelKey {
    /// Float style prediction network.
    Prediction,
    /// Float style transfer network.
    Transfer,
    /// Int8-quantized style prediction network.
    PredictionInt8,
    /// Int8-quantized style transfer network.
    TransferInt8,
}

impl ModelKey {
    /// Every known model artifact.
    pub const ALL: [Self; 4] = [
        Self::Prediction,
        Self::Transfer,
        Self::PredictionInt8,
        Self::TransferInt8,
    ];

    /// Get the filename for this model.
    #[must_use]
    pub const fn filename(&self) -> &'static str {
        match self {
            Self::Prediction => "prediction.onnx",
            Self::Transfer => "transfer.onnx",
            Self::PredictionInt8 => "prediction_int8.onnx",
            Self::TransferInt8 => "transfer_int8.onnx",
        }
    }

    /// Get the stage this model serves.
    #[must_use]
    pub const fn role(&self) -> ModelRole {
        match self {
            Self::Prediction | Self::PredictionInt8 => ModelRole::Prediction,
            Self::Transfer | Self::TransferInt8 => ModelRole::Transfer,
        }
    }

    /// Ensure this key serves the expected stage.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ModelRole`] on mismatch.
    pub fn expect_role(self, expected: ModelRole) -> Result<Self> {
        if self.role() == expected {
            Ok(self)
        } else {
            Err(Error::ModelRole {
                key: self.filename().to_string(),
                expected: expected.to_string(),
            })
        }
    }
}

impl fmt::Display for ModelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.filename())
    }
}

impl FromStr for ModelKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim();
        let stem = name.strip_suffix(".onnx").unwrap_or(name);
        Self::ALL
            .into_iter()
            .find(|key| key.filename().strip_suffix(".onnx") == Some(stem))
            .ok_or_else(|| Error::UnknownModel(s.to_string()))
    }
}

/// Styles shipped with a reference image under `styles/` in the model directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleName {
    Candy,
    CompositionVii,
    Feathers,
    LaMuse,
    Mosaic,
    StarryNight,
    TheScream,
    TheWave,
    Udnie,
}

impl StyleName {
    /// Every bundled style.
    pub const ALL: [Self; 9] = [
        Self::Candy,
        Self::CompositionVii,
        Self::Feathers,
        Self::LaMuse,
        Self::Mosaic,
        Self::StarryNight,
        Self::TheScream,
        Self::TheWave,
        Self::Udnie,
    ];

    /// Canonical name, also the stem of the reference image file.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Candy => "candy",
            Self::CompositionVii => "composition_vii",
            Self::Feathers => "feathers",
            Self::LaMuse => "la_muse",
            Self::Mosaic => "mosaic",
            Self::StarryNight => "starry_night",
            Self::TheScream => "the_scream",
            Self::TheWave => "the_wave",
            Self::Udnie => "udnie",
        }
    }

    /// Reference image path relative to the model directory.
    #[must_use]
    pub fn image_file(&self) -> String {
        format!("styles/{}.jpg", self.name())
    }
}

impl fmt::Display for StyleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StyleName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|style| style.name() == normalized)
            .ok_or_else(|| Error::UnknownModel(s.to_string()))
    }
}
