use serde::{Deserialize, Serialize};
use crate::processing::RecodeOutcome;

/// Progress message type
#[derive(Debug, Deserialize, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ProgressType {
    Start,
    Progress,
    Complete,
    Error,
}

/// Progress event emitted by the batch orchestrator.
///
/// One event per terminal task (completed, failed or skipped), delivered
/// strictly after the task's record is finalized, plus a start/complete pair
/// bracketing the run. Ordering across tasks follows completion order, not
/// submission order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    /// Progress type (start, progress, complete, error)
    pub progress_type: ProgressType,
    /// Number of tasks that reached a terminal state so far
    pub completed_tasks: usize,
    /// Total number of tasks in the run
    pub total_tasks: usize,
    /// Progress percentage (0-100)
    pub progress_percentage: usize,
    /// Current status message
    pub status: String,
    /// Input path of the task this event refers to, if any
    #[serde(default)]
    pub task_id: Option<String>,
    /// Result payload for completed tasks
    #[serde(default)]
    pub result: Option<RecodeOutcome>,
    /// Error message for failed tasks
    #[serde(default)]
    pub error: Option<String>,
}

impl Progress {
    /// Create a new Progress instance with basic information
    pub fn new(
        progress_type: ProgressType,
        completed_tasks: usize,
        total_tasks: usize,
        status: &str,
    ) -> Self {
        let progress_percentage = if total_tasks > 0 {
            (completed_tasks * 100) / total_tasks
        } else {
            0
        };

        Self {
            progress_type,
            completed_tasks,
            total_tasks,
            progress_percentage,
            status: status.to_string(),
            task_id: None,
            result: None,
            error: None,
        }
    }

    pub fn with_task_id(mut self, task_id: impl Into<String>) -> Self {
        self.task_id = Some(task_id.into());
        self
    }

    pub fn with_result(mut self, result: RecodeOutcome) -> Self {
        self.result = Some(result);
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

/// Registration point for receiving batch progress events.
///
/// Implementations must be panic-tolerant in spirit: the orchestrator isolates
/// observer panics so they cannot corrupt the run, but a well-behaved observer
/// returns quickly and never blocks.
pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, event: &Progress);
}

/// Observer backed by a plain closure.
pub struct FnObserver<F: Fn(&Progress) + Send + Sync>(pub F);

impl<F: Fn(&Progress) + Send + Sync> ProgressObserver for FnObserver<F> {
    fn on_progress(&self, event: &Progress) {
        (self.0)(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_is_derived_from_counts() {
        let p = Progress::new(ProgressType::Progress, 3, 4, "processing");
        assert_eq!(p.progress_percentage, 75);

        let empty = Progress::new(ProgressType::Start, 0, 0, "start");
        assert_eq!(empty.progress_percentage, 0);
    }
}
