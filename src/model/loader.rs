//! On-disk model artifacts and ONNX session loading.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ort::session::Session;

use crate::error::{Error, Result};

use super::{
    LoadedModel, ModelKey, ModelLoader, ModelRole, OnnxPredictor, OnnxTransformer, StyleName,
};

/// Default versioned artifact directory, relative to the working directory.
pub const DEFAULT_MODEL_DIR: &str = "models/v1";

/// A directory of model artifacts named by [`ModelKey::filename`], with
/// style reference images under `styles/`.
#[derive(Debug, Clone)]
pub struct ModelStore {
    root: PathBuf,
}

impl ModelStore {
    /// Create a store rooted at `root`. Nothing is read until a model loads.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The artifact directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the path to a model file.
    #[must_use]
    pub fn model_path(&self, key: ModelKey) -> PathBuf {
        self.root.join(key.filename())
    }

    /// Get the path to a named style's reference image.
    #[must_use]
    pub fn style_image_path(&self, style: StyleName) -> PathBuf {
        self.root.join(style.image_file())
    }

    /// Load an ONNX model session.
    ///
    /// # Errors
    ///
    /// Returns an error if the model file is missing or cannot be loaded.
    pub fn load_session(&self, key: ModelKey) -> Result<Session> {
        let path = self.model_path(key);
        let load_err = |source: ort::Error| Error::ModelLoad {
            name: key.filename().to_string(),
            source: source.into(),
        };

        if !path.is_file() {
            return Err(Error::ModelLoad {
                name: key.filename().to_string(),
                source: io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("{} does not exist", path.display()),
                )
                .into(),
            });
        }

        Session::builder()
            .map_err(load_err)?
            .commit_from_file(&path)
            .map_err(load_err)
    }
}

impl Default for ModelStore {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL_DIR)
    }
}

impl ModelLoader for ModelStore {
    fn load(&self, key: ModelKey) -> Result<LoadedModel> {
        let session = self.load_session(key)?;
        let model = match key.role() {
            ModelRole::Prediction => {
                LoadedModel::Predictor(Arc::new(OnnxPredictor::new(key, session)))
            }
            ModelRole::Transfer => {
                LoadedModel::Transformer(Arc::new(OnnxTransformer::new(key, session)))
            }
        };
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        let store = ModelStore::new("/srv/models/v1");
        assert_eq!(
            store.model_path(ModelKey::TransferInt8),
            Path::new("/srv/models/v1/transfer_int8.onnx")
        );
        assert_eq!(
            store.style_image_path(StyleName::Udnie),
            Path::new("/srv/models/v1/styles/udnie.jpg")
        );
    }

    #[test]
    fn test_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::new(dir.path());

        let err = store.load(ModelKey::Prediction).unwrap_err();
        assert!(matches!(err, Error::ModelLoad { ref name, .. } if name == "prediction.onnx"));
    }
}
