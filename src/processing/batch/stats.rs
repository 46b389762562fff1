use serde::{Deserialize, Serialize};

/// Run-level statistics accumulator.
///
/// The only state shared across concurrent completions; every update goes
/// through the orchestrator's coordinator loop, which holds the accumulator
/// behind a mutex for the accessor/reset surface. Byte totals cover completed
/// tasks only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchStats {
    /// Tasks completed successfully
    pub processed_count: usize,
    /// Tasks that failed
    pub failed_count: usize,
    /// Tasks skipped after a stop-on-error trigger
    pub skipped_count: usize,
    /// Input bytes across completed tasks
    pub total_bytes_before: u64,
    /// Output bytes across completed tasks
    pub total_bytes_after: u64,
}

impl BatchStats {
    pub fn record_completed(&mut self, bytes_before: u64, bytes_after: u64) {
        self.processed_count += 1;
        self.total_bytes_before += bytes_before;
        self.total_bytes_after += bytes_after;
    }

    pub fn record_failed(&mut self) {
        self.failed_count += 1;
    }

    pub fn record_skipped(&mut self) {
        self.skipped_count += 1;
    }

    /// Fraction of bytes removed across completed tasks.
    pub fn savings_ratio(&self) -> f64 {
        if self.total_bytes_before == 0 {
            0.0
        } else {
            (self.total_bytes_before as f64 - self.total_bytes_after as f64)
                / self.total_bytes_before as f64
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_and_resets() {
        let mut stats = BatchStats::default();
        stats.record_completed(1000, 600);
        stats.record_completed(500, 300);
        stats.record_failed();
        stats.record_skipped();

        assert_eq!(stats.processed_count, 2);
        assert_eq!(stats.failed_count, 1);
        assert_eq!(stats.skipped_count, 1);
        assert!((stats.savings_ratio() - 0.4).abs() < 1e-9);

        stats.reset();
        assert_eq!(stats.processed_count, 0);
        assert_eq!(stats.total_bytes_before, 0);
        assert_eq!(stats.savings_ratio(), 0.0);
    }
}
