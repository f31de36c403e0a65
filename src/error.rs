//! Error types for aug_vision.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the aug_vision library.
#[derive(Error, Debug)]
pub enum Error {
    /// The source image could not be opened or decoded.
    #[error("failed to load image from {path}: {source}")]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// A rendered figure could not be written.
    #[error("failed to save image to {path}: {source}")]
    ImageSave {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The title font could not be read from disk.
    #[error("rendering backend unavailable, cannot read font {path}: {source}")]
    FontLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The title font was read but is not a usable TrueType/OpenType font.
    #[error("rendering backend unavailable, invalid font {path}")]
    InvalidFont { path: PathBuf },

    /// The augmentation config file could not be read.
    #[error("failed to read config from {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The augmentation config file is not valid JSON for `AugmentationConfig`.
    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Invalid parameter value.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    /// A parallel augmentation worker panicked or was cancelled.
    #[error("augmentation worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn invalid(name: &str, reason: impl Into<String>) -> Self {
        Error::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for aug_vision operations.
pub type Result<T> = std::result::Result<T, Error>;
