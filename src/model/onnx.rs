//! ONNX Runtime backends for the style prediction and transfer networks.
//!
//! Both networks take NHWC float tensors in `[0, 1]`. The prediction network
//! maps a style image to a `(1, 1, 1, L)` bottleneck; the transfer network
//! takes the content image first and that bottleneck second.

use ndarray::Array4;
use ort::session::Session;
use ort::value::Tensor;
use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::image::ImageTensor;

use super::{ModelKey, StyleEmbedding, StylePredictor, StyleTransformer};

/// Style prediction network backed by an ONNX session.
pub struct OnnxPredictor {
    key: ModelKey,
    session: Mutex<Session>,
}

impl OnnxPredictor {
    #[must_use]
    pub fn new(key: ModelKey, session: Session) -> Self {
        Self {
            key,
            session: Mutex::new(session),
        }
    }
}

impl StylePredictor for OnnxPredictor {
    fn predict(&self, style: &ImageTensor) -> Result<StyleEmbedding> {
        let fail = inference_error(self.key);
        let input_value = Tensor::from_array(style.clone()).map_err(fail)?;

        // Session::run needs exclusive access
        let mut session = self.session.lock();
        let outputs = session.run(ort::inputs![input_value]).map_err(fail)?;

        let output = outputs
            .values()
            .next()
            .ok_or_else(|| empty_output(self.key, "session produced no outputs"))?;

        let (_, data) = output.try_extract_tensor::<f32>().map_err(fail)?;
        embedding_from_output(self.key, data)
    }
}

/// Style transfer network backed by an ONNX session.
pub struct OnnxTransformer {
    key: ModelKey,
    session: Mutex<Session>,
}

impl OnnxTransformer {
    #[must_use]
    pub fn new(key: ModelKey, session: Session) -> Self {
        Self {
            key,
            session: Mutex::new(session),
        }
    }
}

impl StyleTransformer for OnnxTransformer {
    fn transfer(&self, content: &ImageTensor, style: &StyleEmbedding) -> Result<ImageTensor> {
        let fail = inference_error(self.key);

        let bottleneck = Array4::from_shape_vec((1, 1, 1, style.len()), style.values().to_vec())
            .map_err(|err| Error::shape("1x1x1xL style bottleneck", err.to_string()))?;

        let content_value = Tensor::from_array(content.clone()).map_err(fail)?;
        let style_value = Tensor::from_array(bottleneck).map_err(fail)?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![content_value, style_value])
            .map_err(fail)?;

        let output = outputs
            .values()
            .next()
            .ok_or_else(|| empty_output(self.key, "session produced no outputs"))?;

        extract_array4(self.key, &output)
    }
}

fn inference_error(key: ModelKey) -> impl Fn(ort::Error) -> Error + Copy {
    move |source| Error::Inference {
        model: key.to_string(),
        source: source.into(),
    }
}

fn empty_output(key: ModelKey, reason: &str) -> Error {
    Error::Inference {
        model: key.to_string(),
        source: reason.into(),
    }
}

fn embedding_from_output(key: ModelKey, data: &[f32]) -> Result<StyleEmbedding> {
    if data.is_empty() {
        return Err(empty_output(key, "empty style bottleneck"));
    }
    StyleEmbedding::try_from(data.to_vec())
}

/// Extract a 4D array from an ONNX value.
#[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
fn extract_array4(key: ModelKey, value: &ort::value::ValueRef<'_>) -> Result<Array4<f32>> {
    let (shape_info, data) = value
        .try_extract_tensor::<f32>()
        .map_err(inference_error(key))?;

    // Safe: tensor dimensions are always non-negative and within bounds
    let dims: Vec<usize> = shape_info.iter().map(|&x| x as usize).collect();

    if data.is_empty() {
        return Err(empty_output(key, "empty output tensor"));
    }
    if dims.len() != 4 {
        return Err(Error::shape("4D tensor", format!("{}D tensor", dims.len())));
    }

    Array4::from_shape_vec((dims[0], dims[1], dims[2], dims[3]), data.to_vec())
        .map_err(|_| Error::shape(format!("{dims:?}"), "reshape failed"))
}
