//! Single-flight, lazily populated model registry.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{Error, Result};

use super::{LoadedModel, ModelKey, ModelLoader, ModelRole, StylePredictor, StyleTransformer};

/// Process-wide holder of loaded models, keyed by [`ModelKey`].
///
/// Each key has its own slot and lock. The first caller for a key loads it
/// while holding that lock, so concurrent first use loads once, and a slow
/// load of one key never blocks another. Loaded models are never replaced.
/// A failed load leaves the slot empty; the next caller tries again.
pub struct ModelRegistry {
    loader: Box<dyn ModelLoader>,
    slots: HashMap<ModelKey, Mutex<Option<LoadedModel>>>,
}

impl ModelRegistry {
    /// Create an empty registry backed by `loader`.
    pub fn new(loader: impl ModelLoader + 'static) -> Self {
        let slots = ModelKey::ALL
            .into_iter()
            .map(|key| (key, Mutex::new(None)))
            .collect();

        Self {
            loader: Box::new(loader),
            slots,
        }
    }

    /// Get the style predictor for `key`, loading it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ModelRole`] if `key` is not a prediction model, or
    /// [`Error::ModelLoad`] if loading fails.
    pub fn predictor(&self, key: ModelKey) -> Result<Arc<dyn StylePredictor>> {
        key.expect_role(ModelRole::Prediction)?;
        match self.get(key)? {
            LoadedModel::Predictor(predictor) => Ok(predictor),
            LoadedModel::Transformer(_) => Err(wrong_role(key, ModelRole::Transfer)),
        }
    }

    /// Get the style transformer for `key`, loading it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ModelRole`] if `key` is not a transfer model, or
    /// [`Error::ModelLoad`] if loading fails.
    pub fn transformer(&self, key: ModelKey) -> Result<Arc<dyn StyleTransformer>> {
        key.expect_role(ModelRole::Transfer)?;
        match self.get(key)? {
            LoadedModel::Transformer(transformer) => Ok(transformer),
            LoadedModel::Predictor(_) => Err(wrong_role(key, ModelRole::Prediction)),
        }
    }

    /// Load `keys` now instead of on first use.
    ///
    /// # Errors
    ///
    /// Returns the first load failure.
    pub fn preload(&self, keys: impl IntoIterator<Item = ModelKey>) -> Result<()> {
        for key in keys {
            self.get(key)?;
        }
        Ok(())
    }

    /// Whether `key` has been loaded.
    #[must_use]
    pub fn is_loaded(&self, key: ModelKey) -> bool {
        self.slots
            .get(&key)
            .is_some_and(|slot| slot.lock().is_some())
    }

    fn get(&self, key: ModelKey) -> Result<LoadedModel> {
        let slot = self
            .slots
            .get(&key)
            .ok_or_else(|| Error::UnknownModel(key.to_string()))?;

        let mut guard = slot.lock();
        if let Some(model) = guard.as_ref() {
            return Ok(model.clone());
        }

        tracing::info!("Loading model {key}...");
        let model = self.loader.load(key).inspect_err(|err| {
            tracing::warn!("Failed to load model {key}: {err}");
        })?;

        if model.role() != key.role() {
            return Err(wrong_role(key, model.role()));
        }

        *guard = Some(model.clone());
        tracing::info!("Model {key} loaded");
        Ok(model)
    }
}

impl fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let loaded: Vec<_> = ModelKey::ALL
            .into_iter()
            .filter(|key| self.is_loaded(*key))
            .collect();
        f.debug_struct("ModelRegistry")
            .field("loaded", &loaded)
            .finish_non_exhaustive()
    }
}

fn wrong_role(key: ModelKey, actual: ModelRole) -> Error {
    Error::ModelLoad {
        name: key.to_string(),
        source: format!("artifact provides a {actual} model").into(),
    }
}
