//! # styleblend
//!
//! Classic image filters, single-style neural style transfer, and blending of
//! two neural styles at a chosen ratio.
//!
//! Neural styles use a two-stage architecture: a prediction network turns a
//! style image into a fixed-length style embedding, and a transfer network
//! applies an embedding to a content image. Blending interpolates two
//! embeddings before transfer.
//!
//! ## Example
//!
//! ```no_run
//! use styleblend::{image, Config, Pipeline};
//!
//! # fn main() -> anyhow::Result<()> {
//! let pipeline = Pipeline::from_config(Config::default())?;
//!
//! let content = image::load_image("content.png")?;
//! let first = image::load_image("wave.jpg")?;
//! let second = image::load_image("mosaic.jpg")?;
//!
//! let output = pipeline.blend(content, first, second, 0.3)?;
//! image::save_image(&output.image, "blended.png", 95)?;
//! # Ok(())
//! # }
//! ```

pub mod effects;
pub mod error;
pub mod image;
pub mod model;
pub mod pipeline;

#[cfg(test)]
mod testing;

pub use effects::Effect;
pub use error::{Error, ErrorKind, Result};
pub use crate::image::{ChannelOrder, PixelBuffer};
pub use model::{ModelKey, ModelRegistry, StyleEmbedding, StyleName};
pub use pipeline::{BlendRatio, Config, Failure, Output, Pipeline, Request, Stage, StyleSource};
