// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Error types for the gesture library.

use std::fmt;

/// Result type alias for gesture operations.
pub type Result<T> = std::result::Result<T, GestureError>;

/// Main error type for the gesture library.
///
/// Lost tracking and short buffers are not errors; they are handled by the
/// continuity state machine and the classifier precondition respectively.
#[derive(Debug)]
pub enum GestureError {
    /// Error loading the ONNX gesture model.
    ModelLoadError(String),
    /// Error during a classifier forward pass.
    InferenceError(String),
    /// Invalid configuration provided.
    ConfigError(String),
    /// Malformed recorded frame input.
    InputError(String),
    /// Error parsing model metadata.
    MetadataError(String),
    /// The classifier failed to initialize and is disabled for the session.
    ClassifierDisabled,
    /// IO error (file not found, permission denied, etc.).
    IoError(String),
    /// Wrapped `std::io::Error`
    Io(std::io::Error),
}

impl fmt::Display for GestureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ModelLoadError(msg) => write!(f, "Model load error: {msg}"),
            Self::InferenceError(msg) => write!(f, "Inference error: {msg}"),
            Self::ConfigError(msg) => write!(f, "Config error: {msg}"),
            Self::InputError(msg) => write!(f, "Input error: {msg}"),
            Self::MetadataError(msg) => write!(f, "Metadata error: {msg}"),
            Self::ClassifierDisabled => write!(f, "Gesture classifier is disabled"),
            Self::IoError(msg) => write!(f, "IO error: {msg}"),
            Self::Io(err) => write!(f, "IO error: {err}"),
        }
    }
}

impl std::error::Error for GestureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for GestureError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for GestureError {
    fn from(err: serde_json::Error) -> Self {
        Self::InputError(err.to_string())
    }
}
