//! The three prediction strategies.
//!
//! The numeric constants in the predicted size/ratio/PSNR formulas are
//! curve-fit values carried over for compatibility with earlier runs; they
//! are not validated ground truth. Recalibrate against measured outcomes
//! before leaning on them for anything beyond ordering candidates.

use super::{OptimizerConfig, MIB};
use crate::core::{EncodeParameters, ImageAttributes, OptimizationResult, Strategy};

/// Quality penalty scale applied per unit of missing target ratio.
const TARGET_RATIO_PENALTY_SCALE: f64 = 30.0;
/// Extra quality penalty for frames larger than one megapixel.
const LARGE_AREA_PENALTY: i32 = 10;
/// Extra quality penalty for animations longer than this many frames.
const LONG_ANIMATION_FRAMES: u32 = 20;
const LONG_ANIMATION_PENALTY: i32 = 5;

/// Effort used by quality-favoring predictions; fidelity gains from encoder
/// effort plateau well below the maximum.
const QUALITY_STRATEGY_EFFORT: u8 = 4;

fn clamp_quality(config: &OptimizerConfig, quality: i32) -> u8 {
    quality.clamp(config.min_quality as i32, config.max_quality as i32) as u8
}

fn predicted_size(file_size: u64, ratio: f64) -> u64 {
    (file_size as f64 * (1.0 - ratio)).round().max(0.0) as u64
}

/// PSNR prediction shared by the quality and balanced strategies.
fn quality_psnr(config: &OptimizerConfig, quality: u8) -> f64 {
    (30.0 + quality as f64 / 100.0 * 25.0).max(config.min_psnr)
}

/// Compression-favoring prediction: drive quality down toward the target
/// ratio, penalizing large frames and long animations further.
pub(super) fn compression(
    config: &OptimizerConfig,
    attributes: &ImageAttributes,
) -> OptimizationResult {
    let base = super::predict_base_quality(
        attributes.width,
        attributes.height,
        attributes.estimated_frame_count,
    ) as i32;

    let mut quality = base
        - ((1.0 - config.target_compression_ratio) * TARGET_RATIO_PENALTY_SCALE).floor() as i32;
    if attributes.pixel_area() > 1_000_000 {
        quality -= LARGE_AREA_PENALTY;
    }
    if attributes.estimated_frame_count > LONG_ANIMATION_FRAMES {
        quality -= LONG_ANIMATION_PENALTY;
    }
    let quality = clamp_quality(config, quality);

    let ratio = (0.3 + (100 - quality) as f64 / 100.0 * 0.4).min(0.8);
    OptimizationResult {
        parameters: EncodeParameters {
            quality,
            effort: config.max_effort,
            lossless: false,
        },
        predicted_size: predicted_size(attributes.file_size, ratio),
        predicted_compression_ratio: ratio,
        predicted_psnr: (25.0 + quality as f64 / 100.0 * 20.0).max(30.0),
        strategy: Strategy::Compression,
        rationale: format!("compression strategy at quality {}", quality),
    }
}

/// Quality-favoring prediction: quality from absolute file size, with a
/// lossless path for small sources when allowed.
pub(super) fn quality(
    config: &OptimizerConfig,
    attributes: &ImageAttributes,
) -> OptimizationResult {
    if config.allow_lossless && attributes.file_size < 2 * MIB {
        let ratio = 0.3;
        return OptimizationResult {
            parameters: EncodeParameters {
                quality: config.max_quality,
                effort: config.max_effort,
                lossless: true,
            },
            predicted_size: predicted_size(attributes.file_size, ratio),
            predicted_compression_ratio: ratio,
            predicted_psnr: f64::INFINITY,
            strategy: Strategy::Quality,
            rationale: "quality strategy: small source encoded lossless".to_string(),
        };
    }

    let base: i32 = if attributes.file_size > 5 * MIB {
        80
    } else if attributes.file_size > MIB {
        85
    } else {
        90
    };
    let quality = clamp_quality(config, base);

    let ratio = (0.2 + (100 - quality) as f64 / 100.0 * 0.3).min(0.6);
    OptimizationResult {
        parameters: EncodeParameters {
            quality,
            effort: QUALITY_STRATEGY_EFFORT.min(config.max_effort),
            lossless: false,
        },
        predicted_size: predicted_size(attributes.file_size, ratio),
        predicted_compression_ratio: ratio,
        predicted_psnr: quality_psnr(config, quality),
        strategy: Strategy::Quality,
        rationale: format!("quality strategy at quality {}", quality),
    }
}

/// Balanced prediction: the mean of the other two strategies, with PSNR
/// recomputed from the blended quality.
pub(super) fn balanced(
    config: &OptimizerConfig,
    attributes: &ImageAttributes,
) -> OptimizationResult {
    let comp = compression(config, attributes);
    let qual = quality(config, attributes);

    let quality = ((comp.parameters.quality as u32 + qual.parameters.quality as u32) / 2) as u8;
    let quality = clamp_quality(config, quality as i32);
    let effort = ((comp.parameters.effort as u32 + qual.parameters.effort as u32) / 2) as u8;
    let ratio = (comp.predicted_compression_ratio + qual.predicted_compression_ratio) / 2.0;

    OptimizationResult {
        parameters: EncodeParameters {
            quality,
            effort,
            lossless: false,
        },
        predicted_size: predicted_size(attributes.file_size, ratio),
        predicted_compression_ratio: ratio,
        predicted_psnr: quality_psnr(config, quality),
        strategy: Strategy::Balanced,
        rationale: format!("balanced strategy at quality {}", quality),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::SourceFormat;

    fn attrs(file_size: u64, width: u32, height: u32, frames: u32) -> ImageAttributes {
        ImageAttributes {
            file_size,
            width,
            height,
            estimated_frame_count: frames,
            format: SourceFormat::Gif,
            has_alpha: false,
        }
    }

    #[test]
    fn compression_applies_area_and_frame_penalties() {
        let config = OptimizerConfig::default();
        // Volume 62M -> base 65; target 0.7 -> -9; area > 1M -> -10;
        // frames > 20 -> -5 => 41.
        let r = compression(&config, &attrs(12_000_000, 1920, 1080, 30));
        assert_eq!(r.parameters.quality, 41);
        assert_eq!(r.parameters.effort, 6);
        assert!(!r.parameters.lossless);
        // ratio = min(0.8, 0.3 + 59/100*0.4) = 0.536
        assert!((r.predicted_compression_ratio - 0.536).abs() < 1e-9);
        assert_eq!(r.predicted_size, 5_568_000);
        // psnr = max(30, 25 + 0.41*20) = 33.2
        assert!((r.predicted_psnr - 33.2).abs() < 1e-9);
    }

    #[test]
    fn compression_clamps_to_min_quality() {
        let config = OptimizerConfig {
            target_compression_ratio: 0.0,
            ..Default::default()
        };
        // base 65 - 30 - 10 - 5 = 20 -> clamped to 30.
        let r = compression(&config, &attrs(12_000_000, 1920, 1080, 30));
        assert_eq!(r.parameters.quality, config.min_quality);
    }

    #[test]
    fn quality_file_size_tiers() {
        let config = OptimizerConfig {
            allow_lossless: false,
            ..Default::default()
        };
        // Boundary checks just above/below the 1 MiB and 5 MiB thresholds.
        assert_eq!(quality(&config, &attrs(MIB, 100, 100, 1)).parameters.quality, 90);
        assert_eq!(quality(&config, &attrs(MIB + 1, 100, 100, 1)).parameters.quality, 85);
        assert_eq!(quality(&config, &attrs(1_500_000, 1000, 800, 10)).parameters.quality, 85);
        assert_eq!(quality(&config, &attrs(5 * MIB, 100, 100, 1)).parameters.quality, 85);
        assert_eq!(quality(&config, &attrs(5 * MIB + 1, 100, 100, 1)).parameters.quality, 80);
    }

    #[test]
    fn quality_small_source_goes_lossless() {
        let config = OptimizerConfig::default();
        let r = quality(&config, &attrs(1_500_000, 1000, 800, 10));
        assert!(r.parameters.lossless);
        assert_eq!(r.parameters.quality, 100);
        assert!(r.predicted_psnr.is_infinite());
        assert!((r.predicted_compression_ratio - 0.3).abs() < 1e-9);

        // At and above 2 MiB the lossless path is off the table.
        let r = quality(&config, &attrs(2 * MIB, 1000, 800, 10));
        assert!(!r.parameters.lossless);
    }

    #[test]
    fn balanced_means_the_other_two() {
        let config = OptimizerConfig {
            allow_lossless: false,
            ..Default::default()
        };
        let a = attrs(3 * MIB, 800, 600, 12);
        let comp = compression(&config, &a);
        let qual = quality(&config, &a);
        let bal = balanced(&config, &a);

        let expected_q = (comp.parameters.quality as u32 + qual.parameters.quality as u32) / 2;
        assert_eq!(bal.parameters.quality as u32, expected_q);
        let expected_ratio =
            (comp.predicted_compression_ratio + qual.predicted_compression_ratio) / 2.0;
        assert!((bal.predicted_compression_ratio - expected_ratio).abs() < 1e-9);
        // PSNR recomputed from the blended quality, not averaged.
        let expected_psnr = 30.0 + bal.parameters.quality as f64 / 100.0 * 25.0;
        assert!((bal.predicted_psnr - expected_psnr.max(config.min_psnr)).abs() < 1e-9);
    }
}
