//! In-process model doubles for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use image::{Rgb, RgbImage};

use crate::error::{Error, Result};
use crate::image::{ImageTensor, PixelBuffer};
use crate::model::{
    LoadedModel, ModelKey, ModelLoader, ModelRole, StyleEmbedding, StylePredictor,
    StyleTransformer,
};

/// Embedding length produced by [`MeanPredictor`].
pub const EMBEDDING_LEN: usize = 100;

#[derive(Debug, Default)]
pub struct Counters {
    pub loads: AtomicUsize,
    pub inferences: AtomicUsize,
}

/// Embedding whose every feature is the mean of the style tensor.
pub struct MeanPredictor {
    len: usize,
    counters: Arc<Counters>,
}

impl StylePredictor for MeanPredictor {
    fn predict(&self, style: &ImageTensor) -> Result<StyleEmbedding> {
        self.counters.inferences.fetch_add(1, Ordering::SeqCst);
        let mean = style.mean().unwrap_or_default();
        StyleEmbedding::try_from(vec![mean; self.len])
    }
}

/// Pulls every sample halfway towards the embedding mean.
pub struct TintTransformer {
    counters: Arc<Counters>,
    shrink: bool,
}

impl StyleTransformer for TintTransformer {
    fn transfer(&self, content: &ImageTensor, style: &StyleEmbedding) -> Result<ImageTensor> {
        self.counters.inferences.fetch_add(1, Ordering::SeqCst);
        if self.shrink {
            return Ok(ImageTensor::zeros((1, 1, 1, 3)));
        }
        let shift = style.values().mean().unwrap_or_default();
        Ok(content.mapv(|v| (v + shift) / 2.0))
    }
}

/// Fails every forward pass.
pub struct FailingModel;

impl StylePredictor for FailingModel {
    fn predict(&self, _style: &ImageTensor) -> Result<StyleEmbedding> {
        Err(Error::Inference {
            model: "failing".to_string(),
            source: "forward pass raised".into(),
        })
    }
}

impl StyleTransformer for FailingModel {
    fn transfer(&self, _content: &ImageTensor, _style: &StyleEmbedding) -> Result<ImageTensor> {
        Err(Error::Inference {
            model: "failing".to_string(),
            source: "forward pass raised".into(),
        })
    }
}

/// Loader handing out the doubles above, counting loads and forward passes.
pub struct MockLoader {
    counters: Arc<Counters>,
    delay: Duration,
    missing: Vec<ModelKey>,
    failing: Vec<ModelKey>,
    shrink: bool,
}

impl MockLoader {
    pub fn new() -> Self {
        Self {
            counters: Arc::default(),
            delay: Duration::ZERO,
            missing: Vec::new(),
            failing: Vec::new(),
            shrink: false,
        }
    }

    pub fn counters(&self) -> Arc<Counters> {
        Arc::clone(&self.counters)
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn missing(mut self, key: ModelKey) -> Self {
        self.missing.push(key);
        self
    }

    pub fn failing(mut self, key: ModelKey) -> Self {
        self.failing.push(key);
        self
    }

    pub fn shrinking(mut self) -> Self {
        self.shrink = true;
        self
    }
}

impl ModelLoader for MockLoader {
    fn load(&self, key: ModelKey) -> Result<LoadedModel> {
        std::thread::sleep(self.delay);
        self.counters.loads.fetch_add(1, Ordering::SeqCst);

        if self.missing.contains(&key) {
            return Err(Error::ModelLoad {
                name: key.to_string(),
                source: "artifact not found".into(),
            });
        }

        let failing = self.failing.contains(&key);
        let model = match key.role() {
            ModelRole::Prediction if failing => LoadedModel::Predictor(Arc::new(FailingModel)),
            ModelRole::Transfer if failing => LoadedModel::Transformer(Arc::new(FailingModel)),
            ModelRole::Prediction => LoadedModel::Predictor(Arc::new(MeanPredictor {
                len: EMBEDDING_LEN,
                counters: self.counters(),
            })),
            ModelRole::Transfer => LoadedModel::Transformer(Arc::new(TintTransformer {
                counters: self.counters(),
                shrink: self.shrink,
            })),
        };
        Ok(model)
    }
}

/// Solid-color buffer.
pub fn solid(width: u32, height: u32, rgb: [u8; 3]) -> PixelBuffer {
    PixelBuffer::new(RgbImage::from_pixel(width, height, Rgb(rgb))).unwrap()
}
