use std::time::Duration;

/// A completed blink: the interval during which the eye signal stayed past
/// the adaptive threshold. Times are monotonic offsets from tracker start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Blink {
    pub started_at: Duration,
    pub ended_at: Duration,
}

impl Blink {
    pub fn duration(&self) -> Duration {
        self.ended_at.saturating_sub(self.started_at)
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration().as_secs_f64()
    }
}

/// Voltage crossing point derived from the rolling average series
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Threshold {
    /// Mean of the rolling average window
    pub reference: f64,
    /// Offset below the reference, already clamped to the minimum distance
    pub distance: f64,
}

impl Threshold {
    pub fn level(&self) -> f64 {
        self.reference - self.distance
    }

    /// A reading below the level counts as an eye closure
    pub fn is_crossed(&self, voltage: f64) -> bool {
        voltage < self.level()
    }
}

/// Edge reported by the drowsiness evaluator on a single evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertTransition {
    /// Alert switched on
    Activated,
    /// Cooldown elapsed and the condition still holds; timer restarted
    Refreshed,
    /// Cooldown elapsed and the condition no longer holds
    Cleared,
    /// Active and still inside the cooldown window
    Held,
    /// Inactive and the condition is not met
    Idle,
}

/// What happened during one tick of the tracker
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub period_average: Option<f64>,
    pub threshold: Option<Threshold>,
    pub blink: Option<Blink>,
    pub calibrated_baseline: Option<f64>,
    pub alert: Option<AlertTransition>,
    pub alert_active: bool,
}
