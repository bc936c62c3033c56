use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

/// Custom error types for the wavehash library
#[derive(Error, Debug)]
pub enum Error {
    /// Image could not be read or decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Unknown subband mode, quantization method, wavelet or criterion,
    /// or an out-of-range configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Two bit arrays (or a distance/label pair) of different lengths
    #[error("Length mismatch: {left} != {right}")]
    LengthMismatch { left: usize, right: usize },

    /// Malformed hex hash string
    #[error("Invalid hex hash: {0}")]
    InvalidHex(String),

    /// An operation that needs at least one sample got none
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// Directory or file not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// I/O operation error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Worker pool could not be created
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// JSON (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::Decode(err.to_string())
    }
}
