use crate::utils::{RecodeError, RecodeResult};

/// Settings for a batch run.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Maximum number of in-flight per-item jobs
    pub concurrency: usize,
    /// Stop admitting new items after the first failure; in-flight items
    /// still run to completion
    pub stop_on_error: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: num_cpus::get().max(1),
            stop_on_error: false,
        }
    }
}

impl BatchConfig {
    pub fn new(concurrency: usize, stop_on_error: bool) -> RecodeResult<Self> {
        let config = Self { concurrency, stop_on_error };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> RecodeResult<()> {
        if self.concurrency == 0 {
            return Err(RecodeError::validation(
                "Concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
