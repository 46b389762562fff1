//! Pixel comparison engine and quality scoring.
//!
//! Pure functions only: metrics from raw buffers, composite scoring, grading
//! and criteria validation. Decoding the images being compared is the codec
//! collaborator's job.

mod metrics;
mod scoring;

pub use metrics::{
    compute_mse, compute_psnr, compute_psnr_8bit, estimate_ssim, MAX_SAMPLE_8BIT,
};
pub use scoring::{calculate_quality_score, quality_grade, validate_quality_criteria};

use crate::core::{QualityGrade, QualityMetrics};
use crate::utils::RecodeResult;

/// Run the full comparison over two interleaved pixel buffers and assemble
/// the metrics record.
///
/// `compression_ratio` is the observed byte saving of the re-encode, used by
/// the composite score and carried through for reporting.
pub fn compare_buffers(
    original: &[u8],
    reencoded: &[u8],
    channels: usize,
    compression_ratio: f64,
) -> RecodeResult<QualityMetrics> {
    let mse = compute_mse(original, reencoded, channels)?;
    let psnr = compute_psnr_8bit(mse);
    let ssim_estimate = estimate_ssim(psnr);
    let quality_score = calculate_quality_score(psnr, ssim_estimate, compression_ratio);
    let grade = if mse == 0.0 {
        QualityGrade::Excellent
    } else {
        quality_grade(psnr, quality_score)
    };

    Ok(QualityMetrics {
        mse,
        psnr,
        ssim_estimate,
        compression_ratio,
        quality_score,
        grade,
    })
}
