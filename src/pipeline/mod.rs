//! Filter, style transfer, and style blending pipeline.

mod blend;
mod config;
mod orchestrator;
mod predict;
mod transfer;

pub use blend::{blend, BlendRatio};
pub use config::{Config, MAX_MODEL_SIDE};
pub use orchestrator::{Failure, Output, Pipeline, Request, Stage, StyleSource};
pub use predict::predict_embedding;
pub use transfer::transfer;

use crate::error::{Error, Result};
use crate::image::{ImageTensor, RGB_CHANNELS};

/// Ensure a tensor holds exactly one non-empty RGB image.
fn check_image_tensor(tensor: &ImageTensor) -> Result<()> {
    let (batch, height, width, channels) = tensor.dim();
    if batch == 1 && height > 0 && width > 0 && channels == RGB_CHANNELS {
        Ok(())
    } else {
        Err(Error::shape(
            "1xHxWx3 tensor",
            format!("{batch}x{height}x{width}x{channels}"),
        ))
    }
}
