// Module declarations in dependency order
pub mod utils;
pub mod core;
pub mod comparison;
pub mod optimizer;
pub mod codec;
pub mod processing;
pub mod reporting;

// Public exports for external consumers
pub use core::{
    BatchRun, BatchTask, EncodeParameters, ImageAttributes, OptimizationResult, Progress,
    ProgressObserver, ProgressType, QualityCriteria, QualityGrade, QualityMetrics, Strategy,
    TaskStatus,
};
pub use codec::{CodecError, GifWebpCodec, ImageCodec, RawPixels};
pub use optimizer::{AdaptiveOptimizer, OptimizerConfig};
pub use processing::{BatchConfig, BatchProcessor, BatchStats, RecodeOutcome, RecodePipeline};
pub use reporting::{AggregateReport, SingleReport};
pub use utils::{init_tracing, RecodeError, RecodeResult, SourceFormat};
