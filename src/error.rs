//! Custom error types for styleblend.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Opaque error raised at a runtime boundary (model loading, inference).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for the styleblend library.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to load an image file.
    #[error("failed to load image from {path}: {source}")]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Failed to decode an image fetched over the network.
    #[error("failed to decode image fetched from {url}: {source}")]
    ImageDecode {
        url: String,
        #[source]
        source: image::ImageError,
    },

    /// Failed to save an image file.
    #[error("failed to save image to {path}: {source}")]
    ImageSave {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Failed to fetch a remote image.
    #[error("failed to fetch image from {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Reading a remote image body failed part-way.
    #[error("failed to read image body from {url}: {source}")]
    FetchRead {
        url: String,
        #[source]
        source: std::io::Error,
    },

    /// Remote image body exceeds the configured size cap.
    #[error("image at {url} exceeds {limit} bytes")]
    FetchTooLarge { url: String, limit: u64 },

    /// Malformed buffer or tensor dimensions.
    #[error("shape mismatch: expected {expected}, got {actual}")]
    Shape { expected: String, actual: String },

    /// Effect name not present in the filter registry.
    #[error("unknown effect: {0}")]
    UnknownEffect(String),

    /// Model key or style name not present in the model catalogue.
    #[error("unknown model or style: {0}")]
    UnknownModel(String),

    /// A model key was used for a stage it does not serve.
    #[error("model {key} is not a {expected} model")]
    ModelRole { key: String, expected: String },

    /// Two style embeddings of differing length.
    #[error("style embedding length mismatch: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },

    /// Invalid parameter value.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    /// Model artifact missing or corrupt.
    #[error("failed to load model {name}: {source}")]
    ModelLoad {
        name: String,
        #[source]
        source: BoxError,
    },

    /// Model forward pass failed.
    #[error("inference failed for model {model}: {source}")]
    Inference {
        model: String,
        #[source]
        source: BoxError,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of an [`Error`], used for structured failure reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Shape,
    UnknownEffect,
    UnknownModel,
    DimensionMismatch,
    InvalidParameter,
    ModelLoad,
    Inference,
    /// Reading or fetching an input image.
    Input,
    /// Writing output or other local IO.
    Output,
}

impl ErrorKind {
    /// Whether the failure was caused by the request rather than the service.
    ///
    /// Routing layers map `true` to a 400-class response and `false` to 500.
    #[must_use]
    pub const fn is_caller_error(self) -> bool {
        matches!(
            self,
            Self::UnknownEffect
                | Self::UnknownModel
                | Self::DimensionMismatch
                | Self::InvalidParameter
                | Self::Input
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Shape => "shape",
            Self::UnknownEffect => "unknown-effect",
            Self::UnknownModel => "unknown-model",
            Self::DimensionMismatch => "dimension-mismatch",
            Self::InvalidParameter => "invalid-parameter",
            Self::ModelLoad => "model-load",
            Self::Inference => "inference",
            Self::Input => "input",
            Self::Output => "output",
        };
        f.write_str(name)
    }
}

impl Error {
    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Shape { .. } => ErrorKind::Shape,
            Self::UnknownEffect(_) => ErrorKind::UnknownEffect,
            Self::UnknownModel(_) | Self::ModelRole { .. } => ErrorKind::UnknownModel,
            Self::DimensionMismatch { .. } => ErrorKind::DimensionMismatch,
            Self::InvalidParameter { .. } => ErrorKind::InvalidParameter,
            Self::ModelLoad { .. } => ErrorKind::ModelLoad,
            Self::Inference { .. } => ErrorKind::Inference,
            Self::ImageLoad { .. }
            | Self::ImageDecode { .. }
            | Self::Fetch { .. }
            | Self::FetchRead { .. }
            | Self::FetchTooLarge { .. } => ErrorKind::Input,
            Self::ImageSave { .. } | Self::Io(_) => ErrorKind::Output,
        }
    }

    pub(crate) fn shape(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::Shape {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub(crate) fn invalid(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for styleblend operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caller_errors() {
        assert!(Error::UnknownEffect("x".into()).kind().is_caller_error());
        assert!(Error::DimensionMismatch { left: 1, right: 2 }
            .kind()
            .is_caller_error());
        assert!(!Error::shape("a", "b").kind().is_caller_error());
        assert!(!Error::Inference {
            model: "transfer.onnx".into(),
            source: "boom".into(),
        }
        .kind()
        .is_caller_error());
    }

    #[test]
    fn test_input_errors_blame_caller() {
        let too_large = Error::FetchTooLarge {
            url: "https://example.com/huge.png".into(),
            limit: 16,
        };
        assert_eq!(too_large.kind(), ErrorKind::Input);
        assert!(too_large.kind().is_caller_error());

        let truncated = Error::FetchRead {
            url: "https://example.com/cat.png".into(),
            source: std::io::ErrorKind::ConnectionReset.into(),
        };
        assert!(truncated.kind().is_caller_error());

        let unreadable = Error::ImageLoad {
            path: "missing.png".into(),
            source: image::ImageError::IoError(std::io::ErrorKind::NotFound.into()),
        };
        assert!(unreadable.kind().is_caller_error());
    }

    #[test]
    fn test_output_errors_blame_service() {
        let save = Error::ImageSave {
            path: "/readonly/out.png".into(),
            source: image::ImageError::IoError(std::io::ErrorKind::PermissionDenied.into()),
        };
        assert_eq!(save.kind(), ErrorKind::Output);
        assert!(!save.kind().is_caller_error());

        let disk_full = Error::from(std::io::Error::other("no space left on device"));
        assert_eq!(disk_full.kind(), ErrorKind::Output);
        assert!(!disk_full.kind().is_caller_error());
    }

    #[test]
    fn test_role_error_is_unknown_model() {
        let err = Error::ModelRole {
            key: "transfer.onnx".into(),
            expected: "style prediction".into(),
        };
        assert_eq!(err.kind(), ErrorKind::UnknownModel);
        assert_eq!(
            err.to_string(),
            "model transfer.onnx is not a style prediction model"
        );
    }
}
