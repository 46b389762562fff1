//! Bounded-concurrency batch orchestrator.
//!
//! Work-pool scheduling: at most `concurrency` per-item jobs in flight, the
//! next queued item admitted the moment a permit frees. Every state mutation
//! (task records, run counters, the shared statistics accumulator) is routed
//! through one coordinating loop fed by worker events, so concurrent
//! completions never race on shared state.

use std::future::Future;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{mpsc, Mutex, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::core::{
    BatchRun, BatchTask, Progress, ProgressObserver, ProgressType, TaskStatus,
};
use crate::processing::RecodeOutcome;
use crate::utils::{collect_files_with_extensions, RecodeError, RecodeResult, SourceFormat};
use super::{BatchConfig, BatchStats};

/// Terminal outcome a worker reports for one item.
enum ItemOutcome {
    Completed(Box<RecodeOutcome>),
    Failed(String),
    Skipped,
}

/// Worker-to-coordinator event.
enum TaskEvent {
    Started { index: usize },
    Finished { index: usize, outcome: ItemOutcome },
}

/// Runs a caller-supplied per-item job over many inputs under a concurrency
/// bound, tracking task status and aggregate statistics.
pub struct BatchProcessor {
    config: BatchConfig,
    stats: Arc<Mutex<BatchStats>>,
    observer: Option<Arc<dyn ProgressObserver>>,
}

impl BatchProcessor {
    pub fn new(config: BatchConfig) -> RecodeResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            stats: Arc::new(Mutex::new(BatchStats::default())),
            observer: None,
        })
    }

    /// Register the progress observer for subsequent runs.
    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Snapshot of the statistics accumulator.
    pub async fn stats(&self) -> BatchStats {
        self.stats.lock().await.clone()
    }

    /// Clear the statistics accumulator.
    pub async fn reset_stats(&self) {
        self.stats.lock().await.reset();
    }

    /// Deliver a progress event, isolating observer panics from the run.
    fn notify(&self, event: &Progress) {
        if let Some(observer) = &self.observer {
            let delivery = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                observer.on_progress(event)
            }));
            if delivery.is_err() {
                warn!("Progress observer panicked; run continues");
            }
        }
    }

    /// Run `job` over `inputs` with at most `concurrency` items in flight.
    ///
    /// Per-item failures are recorded on the task and never abort the run;
    /// with `stop_on_error`, the first failure freezes admission and every
    /// not-yet-started item is marked skipped while in-flight items finish.
    pub async fn process<J, Fut>(&self, inputs: Vec<String>, job: J) -> BatchRun
    where
        J: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = RecodeResult<RecodeOutcome>> + Send + 'static,
    {
        let total = inputs.len();
        let started_at = Instant::now();
        let mut tasks: Vec<BatchTask> = inputs.iter().map(BatchTask::new).collect();

        info!(
            "Processing batch of {} tasks with concurrency {}",
            total, self.config.concurrency
        );
        self.notify(&Progress::new(ProgressType::Start, 0, total, "batch started"));

        let semaphore = Arc::new(Semaphore::new(self.config.concurrency));
        let stop = Arc::new(AtomicBool::new(false));
        let stop_on_error = self.config.stop_on_error;
        let (events_tx, mut events_rx) = mpsc::unbounded_channel::<TaskEvent>();
        let job = Arc::new(job);

        let mut workers = JoinSet::new();
        for (index, input) in inputs.into_iter().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            let stop = Arc::clone(&stop);
            let events = events_tx.clone();
            let job = Arc::clone(&job);
            workers.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        let _ = events.send(TaskEvent::Finished {
                            index,
                            outcome: ItemOutcome::Failed("worker pool closed".to_string()),
                        });
                        return;
                    }
                };

                // Admission check happens after the permit so a queued item
                // skips rather than runs once the stop flag is up.
                if stop.load(Ordering::SeqCst) {
                    let _ = events.send(TaskEvent::Finished {
                        index,
                        outcome: ItemOutcome::Skipped,
                    });
                    return;
                }

                let _ = events.send(TaskEvent::Started { index });
                let outcome = match job(input).await {
                    Ok(result) => ItemOutcome::Completed(Box::new(result)),
                    Err(e) => {
                        // Raise the flag here, not in the coordinator: no new
                        // admission may happen after this failure finalizes.
                        if stop_on_error {
                            stop.store(true, Ordering::SeqCst);
                        }
                        ItemOutcome::Failed(RecodeError::batch_item(e.to_string()).to_string())
                    }
                };
                let _ = events.send(TaskEvent::Finished { index, outcome });
            });
        }
        drop(events_tx);

        // Coordinator: the single writer for task records and statistics.
        let mut terminal = 0usize;
        let mut processed = 0usize;
        let mut failed = 0usize;
        let mut skipped = 0usize;
        let mut bytes_before = 0u64;
        let mut bytes_after = 0u64;

        while terminal < total {
            let Some(event) = events_rx.recv().await else {
                break;
            };
            match event {
                TaskEvent::Started { index } => {
                    tasks[index].status = TaskStatus::Running;
                    debug!(input = %tasks[index].input_path, "Task started");
                }
                TaskEvent::Finished { index, outcome } => {
                    terminal += 1;
                    match outcome {
                        ItemOutcome::Completed(result) => {
                            processed += 1;
                            bytes_before += result.original_size;
                            bytes_after += result.optimized_size;
                            tasks[index].status = TaskStatus::Completed;
                            tasks[index].optimization = Some(result.optimization.clone());
                            tasks[index].metrics = Some(result.metrics.clone());
                            self.stats
                                .lock()
                                .await
                                .record_completed(result.original_size, result.optimized_size);

                            let progress =
                                Progress::new(ProgressType::Progress, terminal, total, "task completed")
                                    .with_task_id(&tasks[index].input_path)
                                    .with_result(*result);
                            self.notify(&progress);
                        }
                        ItemOutcome::Failed(message) => {
                            failed += 1;
                            tasks[index].status = TaskStatus::Failed;
                            tasks[index].error = Some(message.clone());
                            self.stats.lock().await.record_failed();
                            warn!(input = %tasks[index].input_path, error = %message, "Task failed");

                            let progress =
                                Progress::new(ProgressType::Error, terminal, total, "task failed")
                                    .with_task_id(&tasks[index].input_path)
                                    .with_error(message);
                            self.notify(&progress);
                        }
                        ItemOutcome::Skipped => {
                            skipped += 1;
                            tasks[index].status = TaskStatus::Skipped;
                            self.stats.lock().await.record_skipped();

                            let progress =
                                Progress::new(ProgressType::Progress, terminal, total, "task skipped")
                                    .with_task_id(&tasks[index].input_path);
                            self.notify(&progress);
                        }
                    }
                }
            }
        }

        while workers.join_next().await.is_some() {}

        // A worker that died without reporting (job panic) leaves its task
        // non-terminal; record it as failed so the counts still sum to total.
        for task in &mut tasks {
            if !task.status.is_terminal() {
                task.status = TaskStatus::Failed;
                task.error = Some("worker terminated unexpectedly".to_string());
                failed += 1;
                self.stats.lock().await.record_failed();
            }
        }

        self.notify(&Progress::new(
            ProgressType::Complete,
            terminal,
            total,
            "batch complete",
        ));

        let run = BatchRun {
            tasks,
            processed_count: processed,
            failed_count: failed,
            skipped_count: skipped,
            total_bytes_before: bytes_before,
            total_bytes_after: bytes_after,
            elapsed: started_at.elapsed(),
        };

        if run.failed_count > 0 {
            warn!(
                "Batch completed with {} failed tasks out of {}",
                run.failed_count, total
            );
        } else {
            info!(
                "Batch completed successfully: {} of {} tasks processed",
                run.processed_count, total
            );
        }
        run
    }

    /// Directory variant: recursively enumerate matching source files and
    /// feed them through [`BatchProcessor::process`].
    pub async fn process_directory<J, Fut>(
        &self,
        dir: impl AsRef<Path>,
        job: J,
    ) -> RecodeResult<BatchRun>
    where
        J: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = RecodeResult<RecodeOutcome>> + Send + 'static,
    {
        let files =
            collect_files_with_extensions(dir.as_ref(), SourceFormat::Gif.extensions()).await?;
        debug!(
            dir = %dir.as_ref().display(),
            count = files.len(),
            "Enumerated batch inputs"
        );
        let inputs = files
            .into_iter()
            .map(|p| p.to_string_lossy().to_string())
            .collect();
        Ok(self.process(inputs, job).await)
    }
}
