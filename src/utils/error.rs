//! Error types for the re-encoding pipeline.
//!
//! Provides a hierarchy of error types using `thiserror` for ergonomic error handling.

use std::io;
use std::path::PathBuf;
use thiserror::Error;
use serde::Serialize;

/// File path errors.
#[derive(Error, Debug, Serialize)]
pub enum PathError {
    /// File does not exist
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    /// Path exists but is not a file
    #[error("Not a file: {0}")]
    NotFile(PathBuf),
    /// IO error accessing the path
    #[error("IO error: {0}")]
    IO(String),
}

/// Main error type for the re-encoding library.
///
/// Every fallible operation in the crate converges on this type. Per-item
/// failures inside a batch are additionally wrapped in [`RecodeError::BatchItem`]
/// before being recorded on the failed task.
#[derive(Error, Debug, Serialize)]
pub enum RecodeError {
    /// Probing the source image for attributes failed; aborts that item's
    /// optimization only
    #[error("Attribute analysis failed: {0}")]
    AttributeAnalysis(String),

    /// The codec collaborator could not decode an input
    #[error("Decode failed: {0}")]
    Decode(String),

    /// The codec collaborator could not produce an encoded output
    #[error("Encode failed: {0}")]
    Encode(String),

    /// Pixel buffers handed to the comparison engine disagree in length
    #[error("Buffer size mismatch: {0}")]
    SizeMismatch(String),

    /// Parameter or configuration validation failed
    #[error("Validation error: {0}")]
    Validation(String),

    /// File IO error
    #[error("IO error: {0}")]
    IO(String),

    /// A batch item failed; wraps the causal error's message
    #[error("Batch item failed: {0}")]
    BatchItem(String),
}

/// Convenience result type for re-encoding operations.
pub type RecodeResult<T> = Result<T, RecodeError>;

// Helper methods for error creation
impl RecodeError {
    pub fn attribute_analysis<T: Into<String>>(msg: T) -> Self {
        Self::AttributeAnalysis(msg.into())
    }

    pub fn decode<T: Into<String>>(msg: T) -> Self {
        Self::Decode(msg.into())
    }

    pub fn encode<T: Into<String>>(msg: T) -> Self {
        Self::Encode(msg.into())
    }

    pub fn size_mismatch<T: Into<String>>(msg: T) -> Self {
        Self::SizeMismatch(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        Self::Validation(msg.into())
    }

    pub fn batch_item<T: Into<String>>(msg: T) -> Self {
        Self::BatchItem(msg.into())
    }
}

// Convert std::io::Error to RecodeError
impl From<io::Error> for RecodeError {
    fn from(err: io::Error) -> Self {
        Self::IO(err.to_string())
    }
}

// Convert io::Error to PathError
impl From<io::Error> for PathError {
    fn from(err: io::Error) -> Self {
        Self::IO(err.to_string())
    }
}

// Convert PathError to RecodeError
impl From<PathError> for RecodeError {
    fn from(err: PathError) -> Self {
        match err {
            PathError::IO(msg) => Self::IO(msg),
            other => Self::Validation(other.to_string()),
        }
    }
}
