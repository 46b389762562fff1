mod batch;
mod recode;

pub use batch::{BatchConfig, BatchProcessor, BatchStats};
pub use recode::{RecodeOutcome, RecodePipeline};
