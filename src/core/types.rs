//! Core types for re-encode parameters, predictions and quality results.

use serde::{Deserialize, Serialize};
use crate::utils::{RecodeError, RecodeResult, SourceFormat};

/// Lowest quality the encoder will be asked for.
pub const MIN_QUALITY: u8 = 30;
/// Highest quality the encoder will be asked for.
pub const MAX_QUALITY: u8 = 100;
/// Highest effort level libwebp-style encoders accept.
pub const MAX_EFFORT: u8 = 6;

/// Attributes probed from a source image.
///
/// Immutable once derived; the optimizer consumes these without touching
/// the file again.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAttributes {
    /// Source file size in bytes
    pub file_size: u64,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Estimated number of frames (1 for still images)
    pub estimated_frame_count: u32,
    /// Container format of the source
    pub format: SourceFormat,
    /// Whether the source carries an alpha channel
    pub has_alpha: bool,
}

impl ImageAttributes {
    /// Pixel area of a single frame.
    pub fn pixel_area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Total pixel volume across all frames.
    pub fn pixel_volume(&self) -> u64 {
        self.pixel_area() * self.estimated_frame_count.max(1) as u64
    }
}

/// Parameters handed to the encoder for one re-encode.
///
/// Value object; validated at construction. `quality` is ignored by encoders
/// when `lossless` is set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodeParameters {
    /// Encoder quality (30-100)
    pub quality: u8,
    /// Encoder effort level (0-6, higher is smaller and slower)
    pub effort: u8,
    /// Preserve exact pixel values
    pub lossless: bool,
}

impl EncodeParameters {
    pub fn new(quality: u8, effort: u8, lossless: bool) -> RecodeResult<Self> {
        if !(MIN_QUALITY..=MAX_QUALITY).contains(&quality) {
            return Err(RecodeError::validation(format!(
                "Invalid quality value: {}. Must be between {} and {}",
                quality, MIN_QUALITY, MAX_QUALITY
            )));
        }
        if effort > MAX_EFFORT {
            return Err(RecodeError::validation(format!(
                "Invalid effort value: {}. Must be between 0 and {}",
                effort, MAX_EFFORT
            )));
        }
        Ok(Self { quality, effort, lossless })
    }

    /// Parameters for a lossless re-encode at the given effort.
    pub fn lossless(effort: u8) -> RecodeResult<Self> {
        Self::new(MAX_QUALITY, effort, true)
    }
}

/// The parameter-selection strategy used for a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Compression,
    Quality,
    Balanced,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Compression => write!(f, "compression"),
            Self::Quality => write!(f, "quality"),
            Self::Balanced => write!(f, "balanced"),
        }
    }
}

/// Output of the adaptive optimizer: chosen parameters plus the predicted
/// outcome of encoding with them.
///
/// Predictions come from curve-fit constants, not measurements; treat them as
/// estimates until the encode actually runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationResult {
    /// The encode parameters to use
    pub parameters: EncodeParameters,
    /// Predicted output size in bytes
    pub predicted_size: u64,
    /// Predicted compression ratio (fraction of bytes removed, 0-1)
    pub predicted_compression_ratio: f64,
    /// Predicted PSNR in dB (infinite for lossless)
    pub predicted_psnr: f64,
    /// Strategy that produced this result
    pub strategy: Strategy,
    /// Human-readable explanation of why this strategy was selected
    pub rationale: String,
}

/// Discrete quality classification derived from metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityGrade {
    Excellent,
    Good,
    Acceptable,
    Poor,
    Unacceptable,
    /// Sentinel used when a comparison could not be completed at all
    Error,
}

impl std::fmt::Display for QualityGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Excellent => write!(f, "excellent"),
            Self::Good => write!(f, "good"),
            Self::Acceptable => write!(f, "acceptable"),
            Self::Poor => write!(f, "poor"),
            Self::Unacceptable => write!(f, "unacceptable"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Fidelity metrics for one completed original-vs-reencode comparison.
///
/// Produced once per comparison; immutable afterwards. `psnr` is infinite
/// exactly when `mse` is zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityMetrics {
    /// Mean squared error across compared channels
    pub mse: f64,
    /// Peak signal-to-noise ratio in dB
    pub psnr: f64,
    /// SSIM estimate in [0, 1] (approximated from PSNR, see comparison module)
    pub ssim_estimate: f64,
    /// Observed compression ratio (fraction of bytes removed, 0-1)
    pub compression_ratio: f64,
    /// Composite quality score in [0, 100]
    pub quality_score: f64,
    /// Grade classification for the score/psnr pair
    pub grade: QualityGrade,
}

impl QualityMetrics {
    /// Sentinel metrics recorded when the comparison itself failed.
    ///
    /// Keeps aggregate reporting computable over partial failures: the grade
    /// is `error`, every numeric field is zero.
    pub fn error_sentinel(compression_ratio: f64) -> Self {
        Self {
            mse: 0.0,
            psnr: 0.0,
            ssim_estimate: 0.0,
            compression_ratio,
            quality_score: 0.0,
            grade: QualityGrade::Error,
        }
    }
}

/// Caller-supplied acceptance thresholds for a re-encode.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityCriteria {
    /// Minimum acceptable PSNR in dB
    pub min_psnr: f64,
    /// Minimum acceptable composite score
    pub min_score: f64,
    /// Minimum acceptable compression ratio
    pub min_ratio: f64,
    /// Maximum acceptable compression ratio
    pub max_ratio: f64,
}

impl Default for QualityCriteria {
    fn default() -> Self {
        Self {
            min_psnr: 30.0,
            min_score: 60.0,
            min_ratio: 0.0,
            max_ratio: 1.0,
        }
    }
}

/// One of the independent checks behind [`QualityCriteria`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CriteriaCheck {
    Psnr,
    Score,
    CompressionRatio,
}

impl std::fmt::Display for CriteriaCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Psnr => write!(f, "psnr"),
            Self::Score => write!(f, "score"),
            Self::CompressionRatio => write!(f, "compressionRatio"),
        }
    }
}

/// Outcome of validating metrics against criteria.
///
/// Unmet criteria are reported, never thrown; the batch keeps running.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriteriaReport {
    /// Whether every check passed
    pub passed: bool,
    /// The individual checks that failed, for diagnostics
    pub failed_checks: Vec<CriteriaCheck>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_parameters_validate_bounds() {
        assert!(EncodeParameters::new(30, 0, false).is_ok());
        assert!(EncodeParameters::new(100, 6, true).is_ok());
        assert!(EncodeParameters::new(29, 4, false).is_err());
        assert!(EncodeParameters::new(101, 4, false).is_err());
        assert!(EncodeParameters::new(80, 7, false).is_err());
    }

    #[test]
    fn pixel_volume_counts_frames() {
        let attrs = ImageAttributes {
            file_size: 1000,
            width: 100,
            height: 50,
            estimated_frame_count: 4,
            format: SourceFormat::Gif,
            has_alpha: false,
        };
        assert_eq!(attrs.pixel_area(), 5_000);
        assert_eq!(attrs.pixel_volume(), 20_000);
    }

    #[test]
    fn error_sentinel_has_error_grade() {
        let m = QualityMetrics::error_sentinel(0.25);
        assert_eq!(m.grade, QualityGrade::Error);
        assert_eq!(m.quality_score, 0.0);
        assert_eq!(m.compression_ratio, 0.25);
    }
}
