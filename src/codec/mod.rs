//! Image codec collaborator seam.
//!
//! Decode, encode and attribute probing are delegated behind [`ImageCodec`]
//! so the pipeline never touches pixel transforms directly. Implementations
//! are blocking; async callers isolate them with `spawn_blocking`.

mod webp;

pub use webp::GifWebpCodec;

use std::path::Path;
use serde::Serialize;
use thiserror::Error;

use crate::core::{EncodeParameters, ImageAttributes};

/// Failure modes of a codec implementation.
///
/// The pipeline translates these into `RecodeError::Decode`/`RecodeError::Encode`
/// at the call site, where the operation being attempted is known.
#[derive(Error, Debug, Serialize)]
pub enum CodecError {
    /// Underlying file IO failed
    #[error("IO error: {0}")]
    Io(String),
    /// The input is not a format this codec handles
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    /// The input exceeds the codec's pixel ceiling
    #[error("Input too large: {0}")]
    OversizeInput(String),
    /// The codec itself rejected the data
    #[error("Codec error: {0}")]
    Codec(String),
}

impl From<std::io::Error> for CodecError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// A raw decoded pixel buffer: interleaved samples, `channels` per pixel.
#[derive(Debug, Clone)]
pub struct RawPixels {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub channels: u8,
}

impl RawPixels {
    /// Expected buffer length for the dimensions and channel count.
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * self.channels as usize
    }
}

/// External image codec collaborator.
///
/// All methods are fallible and blocking. `decode_to_raw` optionally resamples
/// to a target resolution so two buffers can be compared pixel-for-pixel.
pub trait ImageCodec: Send + Sync {
    /// Probe a source file for the attributes the optimizer consumes.
    fn probe(&self, path: &Path) -> Result<ImageAttributes, CodecError>;

    /// Decode a file to raw interleaved pixels (first frame for animations).
    fn decode_to_raw(
        &self,
        path: &Path,
        target: Option<(u32, u32)>,
    ) -> Result<RawPixels, CodecError>;

    /// Encode the file's pixels with the given parameters, returning the
    /// encoded bytes.
    fn encode(&self, path: &Path, params: &EncodeParameters) -> Result<Vec<u8>, CodecError>;
}
