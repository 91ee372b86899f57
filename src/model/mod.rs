//! Model artifacts, inference capabilities, and the process-wide registry.
//!
//! The inference runtime is reached only through [`StylePredictor`] and
//! [`StyleTransformer`]. [`ModelRegistry`] hands out shared instances,
//! loading each [`ModelKey`] at most once.

mod catalog;
mod loader;
mod onnx;
mod registry;

pub use catalog::{ModelKey, ModelRole, StyleName};
pub use loader::{ModelStore, DEFAULT_MODEL_DIR};
pub use onnx::{OnnxPredictor, OnnxTransformer};
pub use registry::ModelRegistry;

use std::fmt;
use std::sync::Arc;

use ndarray::Array1;

use crate::error::{Error, Result};
use crate::image::ImageTensor;

/// Fixed-length style descriptor produced by a style prediction model.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleEmbedding(Array1<f32>);

impl StyleEmbedding {
    /// Wrap a vector of style features.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Shape`] if `values` is empty.
    pub fn new(values: Array1<f32>) -> Result<Self> {
        if values.is_empty() {
            return Err(Error::shape("non-empty style embedding", "0 values"));
        }
        Ok(Self(values))
    }

    /// Number of features.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no features. Never true for a constructed embedding.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the feature vector.
    #[must_use]
    pub const fn values(&self) -> &Array1<f32> {
        &self.0
    }

    /// Take the feature vector.
    #[must_use]
    pub fn into_inner(self) -> Array1<f32> {
        self.0
    }
}

impl TryFrom<Vec<f32>> for StyleEmbedding {
    type Error = Error;

    fn try_from(values: Vec<f32>) -> Result<Self> {
        Self::new(Array1::from_vec(values))
    }
}

/// Runs a style image through a style prediction network.
pub trait StylePredictor: Send + Sync {
    /// One forward pass on a `(1, H, W, 3)` style tensor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Inference`] if the forward pass fails.
    fn predict(&self, style: &ImageTensor) -> Result<StyleEmbedding>;
}

/// Runs a content image through a style transfer network.
pub trait StyleTransformer: Send + Sync {
    /// One forward pass conditioned on `style`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Inference`] if the forward pass fails.
    fn transfer(&self, content: &ImageTensor, style: &StyleEmbedding) -> Result<ImageTensor>;
}

/// A loaded model, shared read-only across requests.
#[derive(Clone)]
pub enum LoadedModel {
    Predictor(Arc<dyn StylePredictor>),
    Transformer(Arc<dyn StyleTransformer>),
}

impl LoadedModel {
    /// The stage this model serves.
    #[must_use]
    pub const fn role(&self) -> ModelRole {
        match self {
            Self::Predictor(_) => ModelRole::Prediction,
            Self::Transformer(_) => ModelRole::Transfer,
        }
    }
}

impl fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LoadedModel({})", self.role())
    }
}

/// Turns a [`ModelKey`] into a ready-to-run model.
pub trait ModelLoader: Send + Sync {
    /// Load the artifact for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ModelLoad`] if the artifact is missing or corrupt.
    fn load(&self, key: ModelKey) -> Result<LoadedModel>;
}
