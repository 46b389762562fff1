//! Composite quality scoring, grading and criteria validation.

use crate::core::{CriteriaCheck, CriteriaReport, QualityCriteria, QualityGrade, QualityMetrics};

/// One row of the grading ladder: PSNR floor in dB and composite-score floor.
#[derive(Debug, Clone, Copy)]
struct GradeTier {
    grade: QualityGrade,
    min_psnr: f64,
    min_score: f64,
}

/// Grading thresholds, highest tier first.
const TIERS: [GradeTier; 5] = [
    GradeTier { grade: QualityGrade::Excellent, min_psnr: 40.0, min_score: 90.0 },
    GradeTier { grade: QualityGrade::Good, min_psnr: 35.0, min_score: 75.0 },
    GradeTier { grade: QualityGrade::Acceptable, min_psnr: 30.0, min_score: 60.0 },
    GradeTier { grade: QualityGrade::Poor, min_psnr: 25.0, min_score: 40.0 },
    GradeTier { grade: QualityGrade::Unacceptable, min_psnr: 20.0, min_score: 20.0 },
];

/// PSNR component of the composite score.
///
/// Piecewise-linear between adjacent tier boundaries: 100 at or above the
/// excellent threshold, 80-100 across good-excellent, 60-80 across
/// acceptable-good, and below acceptable scaled linearly from 0.
fn psnr_score(psnr: f64) -> f64 {
    if psnr.is_infinite() || psnr >= 40.0 {
        100.0
    } else if psnr >= 35.0 {
        80.0 + (psnr - 35.0) / 5.0 * 20.0
    } else if psnr >= 30.0 {
        60.0 + (psnr - 30.0) / 5.0 * 20.0
    } else {
        (psnr.max(0.0) / 30.0) * 60.0
    }
}

/// Composite quality score in [0, 100].
///
/// Weighted blend: 60% PSNR component, 30% SSIM, 10% a compression bonus
/// capped at 10 points-worth (`min(10, ratio·15)`).
pub fn calculate_quality_score(psnr: f64, ssim: f64, compression_ratio: f64) -> f64 {
    let composite = 0.6 * psnr_score(psnr)
        + 0.3 * (ssim * 100.0)
        + 0.1 * (compression_ratio * 15.0).min(10.0);
    composite.clamp(0.0, 100.0)
}

/// Grade for a psnr/score pair.
///
/// A tier is reached only when both its PSNR and score floors are met,
/// checked from highest to lowest. When none of excellent/good/acceptable
/// match, falls back to poor for psnr >= 25 dB, else unacceptable. The SSIM
/// estimate already feeds the score, so it does not gate tiers separately.
pub fn quality_grade(psnr: f64, score: f64) -> QualityGrade {
    for tier in &TIERS[..3] {
        if psnr >= tier.min_psnr && score >= tier.min_score {
            return tier.grade;
        }
    }
    if psnr >= TIERS[3].min_psnr {
        QualityGrade::Poor
    } else {
        QualityGrade::Unacceptable
    }
}

/// Validate metrics against caller-supplied acceptance thresholds.
///
/// Pure AND of three independent checks; the report names each failed check
/// so diagnostics can say which threshold was missed. Identical inputs always
/// produce identical reports.
pub fn validate_quality_criteria(
    metrics: &QualityMetrics,
    criteria: &QualityCriteria,
) -> CriteriaReport {
    let mut failed_checks = Vec::new();

    if metrics.psnr < criteria.min_psnr {
        failed_checks.push(CriteriaCheck::Psnr);
    }
    if metrics.quality_score < criteria.min_score {
        failed_checks.push(CriteriaCheck::Score);
    }
    if metrics.compression_ratio < criteria.min_ratio
        || metrics.compression_ratio > criteria.max_ratio
    {
        failed_checks.push(CriteriaCheck::CompressionRatio);
    }

    CriteriaReport {
        passed: failed_checks.is_empty(),
        failed_checks,
    }
}
