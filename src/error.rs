//! Error taxonomy for the validator.
//!
//! Only [`InputFormatError`] and [`ConfigError`] ever reach a caller. Load and
//! inference errors are recovered inside the validator and only logged.

use std::path::PathBuf;

/// Caller-supplied sides could not be read as finite numbers.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputFormatError {
    #[error("side {field} is not a number: {text:?}")]
    NotANumber { field: char, text: String },

    #[error("side {field} must be finite, got {value}")]
    NotFinite { field: char, value: f64 },

    #[error("expected three sides, got {0}")]
    WrongCount(usize),
}

/// Misconfiguration detected while building a validator. Fatal.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("unsupported inference backend {0:?} (expected one of: mlp, knn)")]
    UnsupportedBackend(String),

    #[error("threshold must be a finite value in [0, 1), got {0}")]
    InvalidThreshold(f64),

    #[error("could not read config file {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("could not parse config: {0}")]
    Parse(String),
}

/// The model artifact is missing or corrupt.
#[derive(Debug, thiserror::Error)]
pub enum ModelLoadError {
    #[error("model file {path} could not be read: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("model file {path} is not a valid model: {message}")]
    Corrupt { path: PathBuf, message: String },
}

/// The scaler artifact is missing or corrupt.
#[derive(Debug, thiserror::Error)]
pub enum ScalerLoadError {
    #[error("scaler file {path} could not be read: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("scaler file {path} is not a valid scaler: {message}")]
    Corrupt { path: PathBuf, message: String },
}

/// A single prediction failed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InferenceError {
    #[error("input shape mismatch: {0}")]
    Shape(String),

    #[error("backend failure: {0}")]
    Backend(String),

    #[error("score {0} is outside [0, 1]")]
    ScoreOutOfRange(f64),
}

/// Crate-level error for operations that can fail outright.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    InputFormat(#[from] InputFormatError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for the validator
pub type Result<T> = std::result::Result<T, Error>;
