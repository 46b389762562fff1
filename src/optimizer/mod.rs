//! Adaptive encode-parameter optimizer.
//!
//! Pure and deterministic: given already-probed [`ImageAttributes`], predicts
//! encode parameters and the expected outcome under one of three strategies,
//! or picks a strategy from the attributes via an ordered rule list. Probing
//! itself is the codec collaborator's job; a failed probe surfaces as
//! `RecodeError::AttributeAnalysis` upstream and never reaches this module.

mod selector;
mod strategies;

pub use selector::{select_strategy, DEFAULT_RATIONALE};

use tracing::debug;

use crate::core::{ImageAttributes, OptimizationResult, Strategy, MAX_EFFORT, MAX_QUALITY, MIN_QUALITY};

pub(crate) const KIB: u64 = 1024;
pub(crate) const MIB: u64 = KIB * 1024;

/// Pixel-volume buckets for [`predict_base_quality`], smallest first.
///
/// Chosen boundaries, not measured ones; follow-up calibration replaces the
/// numbers, not the structure.
const VOLUME_TIERS: [(u64, u8); 4] = [
    (500_000, 85),
    (2_000_000, 80),
    (8_000_000, 75),
    (20_000_000, 70),
];

/// Base quality for anything above the largest tier.
const VOLUME_FLOOR_QUALITY: u8 = 65;

/// Base encoder quality from total pixel volume (width x height x frames).
///
/// Five tiers from 85 down to 65: the more pixels an encode has to spend
/// bits on, the lower the starting quality.
pub fn predict_base_quality(width: u32, height: u32, frames: u32) -> u8 {
    let volume = width as u64 * height as u64 * frames.max(1) as u64;
    for (limit, quality) in VOLUME_TIERS {
        if volume <= limit {
            return quality;
        }
    }
    VOLUME_FLOOR_QUALITY
}

/// Tunable bounds and targets for parameter prediction.
#[derive(Debug, Clone)]
pub struct OptimizerConfig {
    /// Lower clamp for predicted quality
    pub min_quality: u8,
    /// Upper clamp for predicted quality
    pub max_quality: u8,
    /// Effort ceiling; compression-favoring predictions pin this
    pub max_effort: u8,
    /// Compression ratio the compression strategy aims for (fraction removed)
    pub target_compression_ratio: f64,
    /// PSNR floor for quality predictions in dB
    pub min_psnr: f64,
    /// Whether the quality strategy may choose lossless for small sources
    pub allow_lossless: bool,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            min_quality: MIN_QUALITY,
            max_quality: MAX_QUALITY,
            max_effort: MAX_EFFORT,
            target_compression_ratio: 0.7,
            min_psnr: 30.0,
            allow_lossless: true,
        }
    }
}

/// Deterministic heuristic optimizer over probed image attributes.
#[derive(Debug, Clone, Default)]
pub struct AdaptiveOptimizer {
    config: OptimizerConfig,
}

impl AdaptiveOptimizer {
    pub fn new(config: OptimizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Predict parameters under an explicitly chosen strategy.
    pub fn optimize_with_strategy(
        &self,
        attributes: &ImageAttributes,
        strategy: Strategy,
    ) -> OptimizationResult {
        match strategy {
            Strategy::Compression => strategies::compression(&self.config, attributes),
            Strategy::Quality => strategies::quality(&self.config, attributes),
            Strategy::Balanced => strategies::balanced(&self.config, attributes),
        }
    }

    /// Predict parameters, choosing the strategy from the attributes.
    ///
    /// Selection walks the ordered rule list; the first matching rule wins
    /// and the rationale records every condition that fired.
    pub fn optimize(&self, attributes: &ImageAttributes) -> OptimizationResult {
        let (strategy, rationale) = select_strategy(attributes);
        debug!(
            strategy = %strategy,
            file_size = attributes.file_size,
            area = attributes.pixel_area(),
            frames = attributes.estimated_frame_count,
            "Selected optimization strategy"
        );

        let mut result = self.optimize_with_strategy(attributes, strategy);
        result.rationale = rationale;
        result
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
    fn base_quality_decreases_with_volume() {
        assert_eq!(predict_base_quality(500, 500, 1), 85); // 250K
        assert_eq!(predict_base_quality(1000, 1000, 1), 80); // 1M
        assert_eq!(predict_base_quality(1000, 1000, 5), 75); // 5M
        assert_eq!(predict_base_quality(1000, 1000, 15), 70); // 15M
        assert_eq!(predict_base_quality(1920, 1080, 30), 65); // 62M
    }

    #[test]
    fn base_quality_treats_zero_frames_as_one() {
        assert_eq!(predict_base_quality(100, 100, 0), predict_base_quality(100, 100, 1));
    }

    #[test]
    fn optimizer_output_within_bounds_for_all_strategies() {
        let optimizer = AdaptiveOptimizer::default();
        let cases = [
            attrs(10_000, 50, 50, 1),
            attrs(1_500_000, 1000, 800, 10),
            attrs(12_000_000, 1920, 1080, 30),
            attrs(80_000_000, 4000, 4000, 120),
        ];
        for a in &cases {
            for strategy in [Strategy::Compression, Strategy::Quality, Strategy::Balanced] {
                let r = optimizer.optimize_with_strategy(a, strategy);
                assert!(
                    (optimizer.config.min_quality..=optimizer.config.max_quality)
                        .contains(&r.parameters.quality),
                    "quality {} out of bounds for {:?}/{}",
                    r.parameters.quality,
                    a.file_size,
                    strategy
                );
                assert!(r.parameters.effort <= MAX_EFFORT);
                assert!(r.predicted_compression_ratio >= 0.0);
                assert!(r.predicted_compression_ratio <= 1.0);
            }
        }
    }

    #[test]
    fn adaptive_large_file_picks_compression_with_size_trigger() {
        let optimizer = AdaptiveOptimizer::default();
        let result = optimizer.optimize(&attrs(12_000_000, 1920, 1080, 30));
        assert_eq!(result.strategy, Strategy::Compression);
        assert!(
            result.rationale.contains("large file"),
            "rationale must mention the size trigger: {}",
            result.rationale
        );
    }

    #[test]
    fn adaptive_default_is_balanced() {
        let optimizer = AdaptiveOptimizer::default();
        // 800KiB, modest area, few frames: no rule fires.
        let result = optimizer.optimize(&attrs(800 * KIB, 640, 480, 8));
        assert_eq!(result.strategy, Strategy::Balanced);
        assert_eq!(result.rationale, DEFAULT_RATIONALE);
    }
}
