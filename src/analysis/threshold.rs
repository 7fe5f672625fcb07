/// Adaptive blink threshold from the rolling average series
use crate::analysis::ring_buffer::RingBuffer;
use crate::analysis::stats::{mean, stddev, Deviation};
use crate::error::TrackerError;
use crate::models::Threshold;

/// Smallest distance between the window mean and the threshold, in volts
pub const DEFAULT_MIN_DISTANCE: f64 = 0.5;

#[derive(Debug, Clone, Copy)]
pub struct AdaptiveThreshold {
    sensitivity: f64,
    min_distance: f64,
}

impl AdaptiveThreshold {
    pub fn new(sensitivity: f64, min_distance: f64) -> Self {
        Self {
            sensitivity,
            min_distance,
        }
    }

    /// Compute the threshold from the rolling average window.
    ///
    /// distance = max(sensitivity * stddev, min_distance), placed below the
    /// window mean. Refuses to run until the window has filled once.
    pub fn compute(&self, window: &RingBuffer<f64>) -> Result<Threshold, TrackerError> {
        if !window.is_ready() {
            return Err(TrackerError::WindowNotReady {
                filled: window.len(),
                required: window.capacity(),
            });
        }

        let averages = window.snapshot();
        let reference = mean(&averages)?;
        let spread = stddev(&averages, Deviation::Population)?;
        let distance = (self.sensitivity * spread).max(self.min_distance);

        Ok(Threshold {
            reference,
            distance,
        })
    }
}

impl Default for AdaptiveThreshold {
    fn default() -> Self {
        Self::new(10.0, DEFAULT_MIN_DISTANCE)
    }
}
