//! Classic image filters.
//!
//! The catalogue is closed: [`Effect`] enumerates every filter, and names
//! outside it are rejected with [`Error::UnknownEffect`].

mod spatial;
mod tone;

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::image::PixelBuffer;

/// A named classic filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Effect {
    Grayscale,
    Sepia,
    Invert,
    Blur,
    Sharpen,
    Emboss,
    Edges,
    Sketch,
    Cartoon,
}

impl Effect {
    /// Every registered effect.
    pub const ALL: [Self; 9] = [
        Self::Grayscale,
        Self::Sepia,
        Self::Invert,
        Self::Blur,
        Self::Sharpen,
        Self::Emboss,
        Self::Edges,
        Self::Sketch,
        Self::Cartoon,
    ];

    /// Canonical name of this effect.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Grayscale => "grayscale",
            Self::Sepia => "sepia",
            Self::Invert => "invert",
            Self::Blur => "blur",
            Self::Sharpen => "sharpen",
            Self::Emboss => "emboss",
            Self::Edges => "edges",
            Self::Sketch => "sketch",
            Self::Cartoon => "cartoon",
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Effect {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let effect = match s.trim().to_ascii_lowercase().as_str() {
            "grayscale" | "greyscale" | "gray" | "grey" => Self::Grayscale,
            "sepia" => Self::Sepia,
            "invert" | "negative" => Self::Invert,
            "blur" => Self::Blur,
            "sharpen" => Self::Sharpen,
            "emboss" => Self::Emboss,
            "edges" | "edge" | "canny" => Self::Edges,
            "sketch" | "pencil" => Self::Sketch,
            "cartoon" => Self::Cartoon,
            _ => return Err(Error::UnknownEffect(s.to_string())),
        };
        Ok(effect)
    }
}

/// Apply an effect, producing a new buffer of identical dimensions.
#[must_use]
pub fn apply(buffer: &PixelBuffer, effect: Effect) -> PixelBuffer {
    tracing::debug!("Applying effect {effect}");
    buffer.map_image(|rgb| match effect {
        Effect::Grayscale => tone::grayscale(rgb),
        Effect::Sepia => tone::sepia(rgb),
        Effect::Invert => tone::invert(rgb),
        Effect::Blur => spatial::blur(rgb),
        Effect::Sharpen => spatial::sharpen(rgb),
        Effect::Emboss => spatial::emboss(rgb),
        Effect::Edges => spatial::edges(rgb),
        Effect::Sketch => spatial::sketch(rgb),
        Effect::Cartoon => spatial::cartoon(rgb),
    })
}

/// Look up an effect by name and apply it.
///
/// # Errors
///
/// Returns [`Error::UnknownEffect`] if `name` is not in the catalogue.
pub fn apply_named(buffer: &PixelBuffer, name: &str) -> Result<PixelBuffer> {
    let effect = name.parse::<Effect>()?;
    Ok(apply(buffer, effect))
}
