//! Per-item evaluate-and-encode pipeline.
//!
//! One `run` call takes a source file through probe, parameter prediction,
//! encode, and the original-vs-result comparison. This is the job the batch
//! orchestrator fans out; it is injected there rather than hard-wired so test
//! doubles and alternative pipelines slot in.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::task;
use tracing::{debug, warn};

use crate::codec::ImageCodec;
use crate::comparison::{compare_buffers, validate_quality_criteria};
use crate::core::{CriteriaReport, OptimizationResult, QualityCriteria, QualityMetrics};
use crate::optimizer::AdaptiveOptimizer;
use crate::utils::{ensure_parent_dir, file_size, validate_input_path, RecodeError, RecodeResult};

/// Result of one completed per-item re-encode.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecodeOutcome {
    /// Path to the original input file
    pub input_path: String,
    /// Path the re-encoded output was written to
    pub output_path: String,
    /// Original file size in bytes
    pub original_size: u64,
    /// Re-encoded file size in bytes
    pub optimized_size: u64,
    /// Bytes saved (negative if the file grew)
    pub saved_bytes: i64,
    /// Observed compression ratio (fraction of bytes removed)
    pub compression_ratio: f64,
    /// The optimizer prediction that drove the encode
    pub optimization: OptimizationResult,
    /// Measured fidelity of the re-encode
    pub metrics: QualityMetrics,
    /// Criteria validation, when thresholds were configured
    pub criteria: Option<CriteriaReport>,
}

/// Wires the codec collaborator, the optimizer and the comparison engine
/// into the standard per-item job.
pub struct RecodePipeline {
    codec: Arc<dyn ImageCodec>,
    optimizer: AdaptiveOptimizer,
    criteria: Option<QualityCriteria>,
}

impl RecodePipeline {
    pub fn new(codec: Arc<dyn ImageCodec>) -> Self {
        Self {
            codec,
            optimizer: AdaptiveOptimizer::default(),
            criteria: None,
        }
    }

    pub fn with_optimizer(mut self, optimizer: AdaptiveOptimizer) -> Self {
        self.optimizer = optimizer;
        self
    }

    /// Enable criteria validation; misses are reported on the outcome,
    /// never raised as errors.
    pub fn with_criteria(mut self, criteria: QualityCriteria) -> Self {
        self.criteria = Some(criteria);
        self
    }

    /// Sibling `.webp` path for an input file.
    pub fn derive_output_path(input: &Path) -> PathBuf {
        input.with_extension("webp")
    }

    /// Run the full evaluate-and-encode pipeline for one file.
    pub async fn run(
        &self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
    ) -> RecodeResult<RecodeOutcome> {
        let input = input.as_ref().to_path_buf();
        let output = output.as_ref().to_path_buf();

        validate_input_path(&input).await?;
        let original_size = file_size(&input).await?;

        let attributes = {
            let codec = Arc::clone(&self.codec);
            let path = input.clone();
            task::spawn_blocking(move || codec.probe(&path))
                .await
                .map_err(|e| RecodeError::attribute_analysis(format!("probe task failed: {}", e)))?
                .map_err(|e| {
                    RecodeError::attribute_analysis(format!("{}: {}", input.display(), e))
                })?
        };

        let optimization = self.optimizer.optimize(&attributes);
        debug!(
            input = %input.display(),
            strategy = %optimization.strategy,
            quality = optimization.parameters.quality,
            "Optimized encode parameters"
        );

        let encoded = {
            let codec = Arc::clone(&self.codec);
            let path = input.clone();
            let params = optimization.parameters;
            task::spawn_blocking(move || codec.encode(&path, &params))
                .await
                .map_err(|e| RecodeError::encode(format!("encode task failed: {}", e)))?
                .map_err(|e| RecodeError::encode(format!("{}: {}", input.display(), e)))?
        };

        ensure_parent_dir(&output).await?;
        tokio::fs::write(&output, &encoded)
            .await
            .map_err(|e| RecodeError::IO(format!("Failed to write {}: {}", output.display(), e)))?;

        let optimized_size = encoded.len() as u64;
        let saved_bytes = original_size as i64 - optimized_size as i64;
        let compression_ratio = if original_size > 0 {
            saved_bytes as f64 / original_size as f64
        } else {
            0.0
        };

        // A failed comparison downgrades to the error-grade sentinel; the
        // encode itself succeeded and the batch keeps its aggregate math.
        let metrics = match self.compare(&input, &output, compression_ratio).await {
            Ok(metrics) => metrics,
            Err(e) => {
                warn!(
                    input = %input.display(),
                    error = %e,
                    "Comparison failed; recording error-grade metrics"
                );
                QualityMetrics::error_sentinel(compression_ratio)
            }
        };

        let criteria = self
            .criteria
            .as_ref()
            .map(|c| validate_quality_criteria(&metrics, c));
        if let Some(report) = &criteria {
            if !report.passed {
                warn!(
                    input = %input.display(),
                    failed = ?report.failed_checks,
                    "Quality criteria not met"
                );
            }
        }

        Ok(RecodeOutcome {
            input_path: input.to_string_lossy().to_string(),
            output_path: output.to_string_lossy().to_string(),
            original_size,
            optimized_size,
            saved_bytes,
            compression_ratio,
            optimization,
            metrics,
            criteria,
        })
    }

    async fn compare(
        &self,
        original: &Path,
        reencoded: &Path,
        compression_ratio: f64,
    ) -> RecodeResult<QualityMetrics> {
        let original_raw = {
            let codec = Arc::clone(&self.codec);
            let path = original.to_path_buf();
            task::spawn_blocking(move || codec.decode_to_raw(&path, None))
                .await
                .map_err(|e| RecodeError::decode(format!("decode task failed: {}", e)))?
                .map_err(|e| {
                    RecodeError::decode(format!("{}: {}", original.display(), e))
                })?
        };

        let reencoded_raw = {
            let codec = Arc::clone(&self.codec);
            let path = reencoded.to_path_buf();
            let target = Some((original_raw.width, original_raw.height));
            task::spawn_blocking(move || codec.decode_to_raw(&path, target))
                .await
                .map_err(|e| RecodeError::decode(format!("decode task failed: {}", e)))?
                .map_err(|e| {
                    RecodeError::decode(format!("{}: {}", reencoded.display(), e))
                })?
        };

        compare_buffers(
            &original_raw.data,
            &reencoded_raw.data,
            original_raw.channels as usize,
            compression_ratio,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_path_is_webp_sibling() {
        let out = RecodePipeline::derive_output_path(Path::new("/data/anim.gif"));
        assert_eq!(out, PathBuf::from("/data/anim.webp"));
    }
}
