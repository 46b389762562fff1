use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::{BatchRun, QualityGrade, TaskStatus};
use crate::processing::RecodeOutcome;

fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", safe_div(bytes as f64, GB as f64))
    } else if bytes >= MB {
        format!("{:.2} MB", safe_div(bytes as f64, MB as f64))
    } else if bytes >= KB {
        format!("{:.2} KB", safe_div(bytes as f64, KB as f64))
    } else {
        format!("{} B", bytes)
    }
}

fn format_psnr(psnr: f64) -> String {
    if psnr.is_infinite() {
        "lossless".to_string()
    } else {
        format!("{:.2} dB", psnr)
    }
}

/// Report for one completed re-encode.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleReport {
    pub outcome: RecodeOutcome,
}

impl SingleReport {
    pub fn from_outcome(outcome: RecodeOutcome) -> Self {
        Self { outcome }
    }

    /// Structured form of the report.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for SingleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let o = &self.outcome;
        writeln!(f, "=== Re-encode Quality Report ===")?;
        writeln!(f)?;
        writeln!(f, "File:")?;
        writeln!(f, "- Input: {}", o.input_path)?;
        writeln!(f, "- Output: {}", o.output_path)?;
        writeln!(
            f,
            "- Size: {} → {} ({:.1}% saved)",
            format_bytes(o.original_size),
            format_bytes(o.optimized_size),
            o.compression_ratio * 100.0
        )?;
        writeln!(f)?;

        writeln!(f, "Encode Parameters ({} strategy):", o.optimization.strategy)?;
        writeln!(f, "- Quality: {}", o.optimization.parameters.quality)?;
        writeln!(f, "- Effort: {}", o.optimization.parameters.effort)?;
        writeln!(f, "- Lossless: {}", o.optimization.parameters.lossless)?;
        writeln!(f, "- Rationale: {}", o.optimization.rationale)?;
        writeln!(f)?;

        writeln!(f, "Quality Metrics:")?;
        writeln!(f, "- PSNR: {}", format_psnr(o.metrics.psnr))?;
        writeln!(f, "- SSIM (estimated): {:.4}", o.metrics.ssim_estimate)?;
        writeln!(f, "- Score: {:.1}/100", o.metrics.quality_score)?;
        writeln!(f, "- Grade: {}", o.metrics.grade)?;

        if let Some(criteria) = &o.criteria {
            writeln!(f)?;
            writeln!(f, "Criteria Validation:")?;
            if criteria.passed {
                writeln!(f, "- Passed")?;
            } else {
                writeln!(f, "- Failed checks:")?;
                for check in &criteria.failed_checks {
                    writeln!(f, "  └── {}", check)?;
                }
            }
        }
        Ok(())
    }
}

/// Per-item row of an aggregate report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateItem {
    pub input_path: String,
    pub status: TaskStatus,
    pub grade: Option<QualityGrade>,
    pub psnr: Option<f64>,
    pub error: Option<String>,
}

/// Report over a finished batch run.
///
/// Successes and failures are both enumerated with per-item reasons; nothing
/// is dropped from the summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateReport {
    pub total_tasks: usize,
    pub processed_count: usize,
    pub failed_count: usize,
    pub skipped_count: usize,
    pub total_bytes_before: u64,
    pub total_bytes_after: u64,
    pub savings_ratio: f64,
    pub elapsed_secs: f64,
    pub grade_counts: Vec<(QualityGrade, usize)>,
    pub items: Vec<AggregateItem>,
}

impl AggregateReport {
    pub fn from_run(run: &BatchRun) -> Self {
        const GRADES: [QualityGrade; 6] = [
            QualityGrade::Excellent,
            QualityGrade::Good,
            QualityGrade::Acceptable,
            QualityGrade::Poor,
            QualityGrade::Unacceptable,
            QualityGrade::Error,
        ];
        let grade_counts = GRADES
            .iter()
            .map(|grade| {
                let count = run
                    .tasks
                    .iter()
                    .filter(|t| t.metrics.as_ref().map(|m| m.grade) == Some(*grade))
                    .count();
                (*grade, count)
            })
            .filter(|(_, count)| *count > 0)
            .collect();

        let items = run
            .tasks
            .iter()
            .map(|task| AggregateItem {
                input_path: task.input_path.clone(),
                status: task.status,
                grade: task.metrics.as_ref().map(|m| m.grade),
                psnr: task.metrics.as_ref().map(|m| m.psnr),
                error: task.error.clone(),
            })
            .collect();

        Self {
            total_tasks: run.total_count(),
            processed_count: run.processed_count,
            failed_count: run.failed_count,
            skipped_count: run.skipped_count,
            total_bytes_before: run.total_bytes_before,
            total_bytes_after: run.total_bytes_after,
            savings_ratio: run.savings_ratio(),
            elapsed_secs: run.elapsed.as_secs_f64(),
            grade_counts,
            items,
        }
    }

    /// Structured form of the report.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for AggregateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Batch Re-encode Report ===")?;
        writeln!(f)?;

        writeln!(f, "Task Statistics:")?;
        writeln!(f, "- Total: {}", self.total_tasks)?;
        writeln!(f, "- Completed: {}", self.processed_count)?;
        writeln!(f, "- Failed: {}", self.failed_count)?;
        writeln!(f, "- Skipped: {}", self.skipped_count)?;
        writeln!(f, "- Elapsed: {:.2}s", self.elapsed_secs)?;
        writeln!(f)?;

        writeln!(f, "Size Reductions (completed tasks):")?;
        writeln!(
            f,
            "- Total: {} → {} ({:.1}% saved)",
            format_bytes(self.total_bytes_before),
            format_bytes(self.total_bytes_after),
            self.savings_ratio * 100.0
        )?;
        writeln!(f)?;

        if !self.grade_counts.is_empty() {
            writeln!(f, "Grade Distribution:")?;
            for (grade, count) in &self.grade_counts {
                writeln!(f, "  └── {}: {}", grade, count)?;
            }
            writeln!(f)?;
        }

        writeln!(f, "Items:")?;
        for item in &self.items {
            match (&item.error, item.grade) {
                (Some(error), _) => {
                    writeln!(f, "  └── {} [{:?}]: {}", item.input_path, item.status, error)?
                }
                (None, Some(grade)) => writeln!(
                    f,
                    "  └── {} [{:?}]: grade {}, PSNR {}",
                    item.input_path,
                    item.status,
                    grade,
                    format_psnr(item.psnr.unwrap_or(0.0))
                )?,
                (None, None) => {
                    writeln!(f, "  └── {} [{:?}]", item.input_path, item.status)?
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BatchTask, QualityMetrics};

    fn run_with_mixed_results() -> BatchRun {
        let mut ok = BatchTask::new("a.gif");
        ok.status = TaskStatus::Completed;
        ok.metrics = Some(QualityMetrics {
            mse: 2.0,
            psnr: 41.0,
            ssim_estimate: 0.91,
            compression_ratio: 0.5,
            quality_score: 92.0,
            grade: QualityGrade::Excellent,
        });

        let mut bad = BatchTask::new("b.gif");
        bad.status = TaskStatus::Failed;
        bad.error = Some("Decode failed: truncated".to_string());

        BatchRun {
            tasks: vec![ok, bad],
            processed_count: 1,
            failed_count: 1,
            skipped_count: 0,
            total_bytes_before: 1000,
            total_bytes_after: 500,
            elapsed: std::time::Duration::from_secs(2),
        }
    }

    #[test]
    fn aggregate_report_enumerates_successes_and_failures() {
        let report = AggregateReport::from_run(&run_with_mixed_results());
        assert_eq!(report.total_tasks, 2);
        assert_eq!(report.grade_counts, vec![(QualityGrade::Excellent, 1)]);

        let text = report.to_string();
        assert!(text.contains("a.gif"));
        assert!(text.contains("b.gif"));
        assert!(text.contains("truncated"));
        assert!(text.contains("50.0% saved"));
    }

    #[test]
    fn aggregate_report_serializes() {
        let report = AggregateReport::from_run(&run_with_mixed_results());
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"failedCount\":1"));
    }
}
