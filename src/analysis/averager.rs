/// Period averaging of raw voltage samples
use std::time::Duration;

use crate::analysis::stats::mean;
use crate::error::TrackerError;

/// Accumulates raw samples over a fixed period and emits their mean
#[derive(Debug, Clone)]
pub struct PeriodAverager {
    period: Duration,
    period_start: Duration,
    samples: Vec<f64>,
}

impl PeriodAverager {
    pub fn new(period: Duration, started_at: Duration) -> Self {
        Self {
            period,
            period_start: started_at,
            samples: Vec::new(),
        }
    }

    pub fn record(&mut self, sample: f64) {
        self.samples.push(sample);
    }

    pub fn period_elapsed(&self, now: Duration) -> bool {
        now.saturating_sub(self.period_start) >= self.period
    }

    /// Close the current period and return its average.
    ///
    /// Fails with `InsufficientData` when nothing was recorded, which happens
    /// if sampling is slower than the period. The period is left open in that
    /// case so the next sample still lands in it.
    pub fn close_period(&mut self, now: Duration) -> Result<f64, TrackerError> {
        let average = mean(&self.samples)?;
        self.samples.clear();
        self.period_start = now;
        Ok(average)
    }

    pub fn pending(&self) -> usize {
        self.samples.len()
    }
}
