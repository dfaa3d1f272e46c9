//! Unified error types for romtext_engine

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for romtext_engine operations.
///
/// Only loading and exporting can fail. Rendering itself never returns an
/// error; broken assets degrade to "nothing drawn" and are logged instead.
#[derive(Debug, Error)]
pub enum EngineError {
    // === I/O Errors ===
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read file '{path}': {message}")]
    ReadFile { path: PathBuf, message: String },

    // === Color Errors ===
    #[error("Invalid hex color: {value}")]
    InvalidHexColor { value: String },

    // === Asset Errors ===
    #[error("Invalid image source: {message}")]
    InvalidImageSource { message: String },

    #[error("Failed to load font '{name}': {message}")]
    FontLoad { name: String, message: String },

    // === Profile Errors ===
    #[error("Invalid profile: {message}")]
    InvalidProfile { message: String },

    #[error("Unknown text module: {id}")]
    UnknownModule { id: String },

    // === Export Errors ===
    #[error("Batch capture failed at frame {frame}: {message}")]
    BatchCapture { frame: usize, message: String },

    // === External Errors ===
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Base64 error: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Result type alias for romtext_engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

impl EngineError {
    /// Create a read file error
    pub fn read_file(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::ReadFile {
            path: path.into(),
            message: msg.into(),
        }
    }

    pub fn invalid_profile(msg: impl Into<String>) -> Self {
        Self::InvalidProfile { message: msg.into() }
    }

    pub fn font_load(name: impl Into<String>, msg: impl std::fmt::Display) -> Self {
        Self::FontLoad {
            name: name.into(),
            message: msg.to_string(),
        }
    }
}
