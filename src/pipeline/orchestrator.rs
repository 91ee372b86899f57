//! Request sequencing and structured failure reporting.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::effects::{self, Effect};
use crate::error::{Error, ErrorKind, Result};
use crate::image::{self, ImageTensor, PixelBuffer};
use crate::model::{ModelRegistry, ModelStore, StyleEmbedding, StyleName};

use super::{blend, predict_embedding, transfer, BlendRatio, Config};

/// Where a request is in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Decoding,
    FilterApply,
    Predicting,
    Blending,
    Transferring,
    Encoding,
    Done,
    Failed(ErrorKind),
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Decoding => f.write_str("decoding"),
            Self::FilterApply => f.write_str("filter"),
            Self::Predicting => f.write_str("predicting"),
            Self::Blending => f.write_str("blending"),
            Self::Transferring => f.write_str("transferring"),
            Self::Encoding => f.write_str("encoding"),
            Self::Done => f.write_str("done"),
            Self::Failed(kind) => write!(f, "failed({kind})"),
        }
    }
}

/// Where the style of a single-style request comes from.
#[derive(Debug, Clone)]
pub enum StyleSource {
    /// A bundled style, read from the model directory.
    Named(StyleName),
    /// A caller-provided style image.
    Image(PixelBuffer),
}

/// One transformation request. Inputs are already decoded.
#[derive(Debug, Clone)]
pub enum Request {
    /// Apply a classic filter.
    Filter { content: PixelBuffer, effect: Effect },
    /// Apply one neural style.
    Style {
        content: PixelBuffer,
        style: StyleSource,
    },
    /// Blend the styles of `first` and `second`, then apply the result.
    Blend {
        content: PixelBuffer,
        first: PixelBuffer,
        second: PixelBuffer,
        ratio: BlendRatio,
    },
}

impl Request {
    /// Short name for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Filter { .. } => "filter",
            Self::Style { .. } => "style",
            Self::Blend { .. } => "blend",
        }
    }
}

/// A completed request.
#[derive(Debug)]
pub struct Output {
    /// Result image, same dimensions as the content image.
    pub image: PixelBuffer,
    /// Stages visited, from `Idle` to `Done`.
    pub trace: Vec<Stage>,
}

/// A request that stopped at `stage`. No partial output is kept.
#[derive(Debug, Error)]
#[error("{kind} failure while {stage}: {error}")]
pub struct Failure {
    pub stage: Stage,
    pub kind: ErrorKind,
    #[source]
    pub error: Error,
    /// Stages visited, ending in `Failed(kind)`.
    pub trace: Vec<Stage>,
}

impl Failure {
    /// Whether the request itself was invalid.
    #[must_use]
    pub const fn is_caller_error(&self) -> bool {
        self.kind.is_caller_error()
    }
}

struct Trace {
    stages: Vec<Stage>,
}

impl Trace {
    fn new() -> Self {
        Self {
            stages: vec![Stage::Idle],
        }
    }

    /// Fail a request whose parameters were rejected before it was built.
    fn rejected(error: Error) -> Failure {
        let mut trace = Self::new();
        trace.enter(Stage::Decoding);
        trace.fail(error)
    }

    fn current(&self) -> Stage {
        self.stages.last().copied().unwrap_or(Stage::Idle)
    }

    fn enter(&mut self, stage: Stage) {
        tracing::debug!("{} -> {stage}", self.current());
        self.stages.push(stage);
    }

    fn finish(mut self, image: PixelBuffer) -> Output {
        self.enter(Stage::Done);
        Output {
            image,
            trace: self.stages,
        }
    }

    fn fail(mut self, error: Error) -> Failure {
        let stage = self.current();
        let kind = error.kind();
        tracing::warn!("Request failed while {stage}: {error}");
        self.enter(Stage::Failed(kind));
        Failure {
            stage,
            kind,
            error,
            trace: self.stages,
        }
    }
}

/// Sequences filter, style, and blend requests over a shared model registry.
///
/// A `Pipeline` is `Send + Sync`; requests run to completion on the calling
/// thread and share nothing but the loaded models.
#[derive(Debug)]
pub struct Pipeline {
    config: Config,
    registry: Arc<ModelRegistry>,
    store: ModelStore,
}

impl Pipeline {
    /// Create a pipeline owning `registry`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: Config, registry: ModelRegistry) -> Result<Self> {
        Self::with_shared_registry(config, Arc::new(registry))
    }

    /// Create a pipeline over a registry shared with other pipelines.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn with_shared_registry(config: Config, registry: Arc<ModelRegistry>) -> Result<Self> {
        config.validate()?;

        tracing::info!("Initializing pipeline with config: {config:?}");
        let store = ModelStore::new(&config.model_dir);

        Ok(Self {
            config,
            registry,
            store,
        })
    }

    /// Create a pipeline loading ONNX models from `config.model_dir` on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn from_config(config: Config) -> Result<Self> {
        let registry = ModelRegistry::new(ModelStore::new(&config.model_dir));
        Self::new(config, registry)
    }

    /// Load the configured models now rather than on first request.
    ///
    /// # Errors
    ///
    /// Returns an error if either model cannot be loaded.
    pub fn preload(&self) -> Result<()> {
        self.registry
            .preload([self.config.prediction_model, self.config.transfer_model])
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Run one request end to end.
    ///
    /// # Errors
    ///
    /// Returns a [`Failure`] naming the stage that failed.
    pub fn run(&self, request: Request) -> std::result::Result<Output, Failure> {
        tracing::info!("Processing {} request", request.kind());

        let mut trace = Trace::new();
        match self.execute(request, &mut trace) {
            Ok(image) => Ok(trace.finish(image)),
            Err(error) => Err(trace.fail(error)),
        }
    }

    /// Apply the effect called `effect`.
    ///
    /// # Errors
    ///
    /// Returns a [`Failure`] at `Decoding` for an unknown effect name.
    pub fn filter(
        &self,
        content: PixelBuffer,
        effect: &str,
    ) -> std::result::Result<Output, Failure> {
        let effect = effect.parse::<Effect>().map_err(Trace::rejected)?;
        self.run(Request::Filter { content, effect })
    }

    /// Apply the bundled style called `style`.
    ///
    /// # Errors
    ///
    /// Returns a [`Failure`] at `Decoding` for an unknown style name, or at
    /// the stage that failed.
    pub fn style(&self, content: PixelBuffer, style: &str) -> std::result::Result<Output, Failure> {
        let style = style.parse::<StyleName>().map_err(Trace::rejected)?;
        self.run(Request::Style {
            content,
            style: StyleSource::Named(style),
        })
    }

    /// Blend the styles of `first` and `second` at `ratio` and apply the result.
    ///
    /// The ratio is checked before any model is touched.
    ///
    /// # Errors
    ///
    /// Returns a [`Failure`] at `Decoding` for a ratio outside `[0, 1]`, or at
    /// the stage that failed.
    pub fn blend(
        &self,
        content: PixelBuffer,
        first: PixelBuffer,
        second: PixelBuffer,
        ratio: f32,
    ) -> std::result::Result<Output, Failure> {
        let ratio = BlendRatio::new(ratio).map_err(Trace::rejected)?;
        self.run(Request::Blend {
            content,
            first,
            second,
            ratio,
        })
    }

    fn execute(&self, request: Request, trace: &mut Trace) -> Result<PixelBuffer> {
        trace.enter(Stage::Decoding);

        match request {
            Request::Filter { content, effect } => {
                trace.enter(Stage::FilterApply);
                let filtered = effects::apply(&content, effect);
                trace.enter(Stage::Encoding);
                Ok(filtered)
            }
            Request::Style { content, style } => {
                let style = self.resolve_style(style)?;
                let content_tensor = self.encode_content(&content)?;
                let style_tensor = self.encode_style(&style)?;

                trace.enter(Stage::Predicting);
                let embedding = self.predict(&style_tensor)?;

                self.stylize(&content, &content_tensor, &embedding, trace)
            }
            Request::Blend {
                content,
                first,
                second,
                ratio,
            } => {
                let content_tensor = self.encode_content(&content)?;
                let first = self.encode_style(&first)?;
                let second = self.encode_style(&second)?;

                trace.enter(Stage::Predicting);
                let first = self.predict(&first)?;
                trace.enter(Stage::Predicting);
                let second = self.predict(&second)?;

                trace.enter(Stage::Blending);
                let blended = blend(&first, &second, ratio)?;
                tracing::debug!("Blended styles at ratio {}", ratio.get());

                self.stylize(&content, &content_tensor, &blended, trace)
            }
        }
    }

    fn predict(&self, style: &ImageTensor) -> Result<StyleEmbedding> {
        predict_embedding(&self.registry, style, self.config.prediction_model)
    }

    fn stylize(
        &self,
        content: &PixelBuffer,
        content_tensor: &ImageTensor,
        embedding: &StyleEmbedding,
        trace: &mut Trace,
    ) -> Result<PixelBuffer> {
        trace.enter(Stage::Transferring);
        let stylized = transfer(
            &self.registry,
            content_tensor,
            embedding,
            self.config.transfer_model,
        )?;

        trace.enter(Stage::Encoding);
        let (width, height) = content.dimensions();
        image::decode(&stylized, self.config.normalization)?.resized(width, height)
    }

    fn resolve_style(&self, style: StyleSource) -> Result<PixelBuffer> {
        match style {
            StyleSource::Image(buffer) => Ok(buffer),
            StyleSource::Named(name) => {
                let path = self.store.style_image_path(name);
                // Bundled style images are artifacts like the models.
                image::load_image(&path).map_err(|err| Error::ModelLoad {
                    name: name.image_file(),
                    source: Box::new(err),
                })
            }
        }
    }

    fn encode_content(&self, content: &PixelBuffer) -> Result<ImageTensor> {
        let target = self
            .config
            .content_size
            .map_or_else(|| content.dimensions(), |side| (side, side));
        image::encode(content, target, self.config.normalization)
    }

    fn encode_style(&self, style: &PixelBuffer) -> Result<ImageTensor> {
        let side = self.config.style_size;
        image::encode(style, (side, side), self.config.normalization)
    }
}
