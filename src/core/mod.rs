//! Core types shared across the library:
//! - [`ImageAttributes`]: probed source-image attributes
//! - [`EncodeParameters`]: validated encoder settings
//! - [`OptimizationResult`]: optimizer prediction
//! - [`QualityMetrics`]: comparison results with score and grade
//! - [`BatchTask`] / [`BatchRun`]: batch bookkeeping
//! - [`Progress`]: progress events for batch operations

mod progress;
mod task;
mod types;

pub use progress::{FnObserver, Progress, ProgressObserver, ProgressType};
pub use task::{BatchRun, BatchTask, TaskStatus};
pub use types::{
    CriteriaCheck, CriteriaReport, EncodeParameters, ImageAttributes, OptimizationResult,
    QualityCriteria, QualityGrade, QualityMetrics, Strategy, MAX_EFFORT, MAX_QUALITY, MIN_QUALITY,
};
