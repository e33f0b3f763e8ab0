use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the plate pipeline.
///
/// Failing to find a plate is not an error; see [`crate::Recognition`].
#[derive(Debug, Error)]
pub enum AnprError {
    #[error("image: {0}")]
    Image(#[from] image::ImageError),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to parse config {path}: {source}")]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("debug directory is not empty: {0}")]
    DebugDirNotEmpty(PathBuf),

    #[error("OCR engine unavailable: {0}")]
    OcrInit(String),

    #[error("OCR failed: {0}")]
    Ocr(String),
}

pub type Result<T> = std::result::Result<T, AnprError>;
