//! Batch task and run records.

use serde::{Deserialize, Serialize};
use crate::core::types::{OptimizationResult, QualityMetrics};

/// Lifecycle state of one batch item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
    /// Never started because the run stopped on an earlier error
    Skipped,
}

impl TaskStatus {
    /// Whether the task has reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Skipped)
    }
}

/// One item of a batch run.
///
/// Created at submission; mutated only by the orchestrator's coordinator loop
/// and retained until the run's final report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchTask {
    /// Path to the source file
    pub input_path: String,
    /// Current lifecycle state
    pub status: TaskStatus,
    /// Optimizer output, once the item ran far enough to have one
    pub optimization: Option<OptimizationResult>,
    /// Comparison metrics, once the item completed
    pub metrics: Option<QualityMetrics>,
    /// Causal message when the item failed
    pub error: Option<String>,
}

impl BatchTask {
    pub fn new(input_path: impl Into<String>) -> Self {
        Self {
            input_path: input_path.into(),
            status: TaskStatus::Pending,
            optimization: None,
            metrics: None,
            error: None,
        }
    }
}

/// Finalized record of a batch run.
///
/// Byte totals cover completed tasks only, so the derived savings ratio stays
/// meaningful over partial failures; `failed_count` still reflects every
/// failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRun {
    /// All submitted tasks, in submission order
    pub tasks: Vec<BatchTask>,
    /// Tasks that completed successfully
    pub processed_count: usize,
    /// Tasks that failed
    pub failed_count: usize,
    /// Tasks skipped after a stop-on-error trigger
    pub skipped_count: usize,
    /// Input bytes across completed tasks
    pub total_bytes_before: u64,
    /// Output bytes across completed tasks
    pub total_bytes_after: u64,
    /// Wall-clock duration of the run
    #[serde(with = "duration_secs")]
    pub elapsed: std::time::Duration,
}

impl BatchRun {
    /// Fraction of bytes removed across completed tasks, 0 when nothing completed.
    pub fn savings_ratio(&self) -> f64 {
        if self.total_bytes_before == 0 {
            0.0
        } else {
            (self.total_bytes_before as f64 - self.total_bytes_after as f64)
                / self.total_bytes_before as f64
        }
    }

    /// Total number of submitted tasks.
    pub fn total_count(&self) -> usize {
        self.tasks.len()
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        Ok(Duration::from_secs_f64(secs.max(0.0)))
    }
}
