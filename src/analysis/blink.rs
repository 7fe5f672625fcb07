/// Blink state machine and one-shot calibration
use std::time::Duration;

use crate::analysis::stats::mean;
use crate::models::{Blink, Threshold};

#[derive(Debug, Clone, Copy, PartialEq)]
enum EyeState {
    Idle,
    Blinking { started_at: Duration },
}

/// Two-state detector. Holding the open blink inside the state makes a
/// second, nested blink unrepresentable.
#[derive(Debug, Clone)]
pub struct BlinkDetector {
    state: EyeState,
}

impl BlinkDetector {
    pub fn new() -> Self {
        Self {
            state: EyeState::Idle,
        }
    }

    /// Feed one reading. Returns the blink that just ended, if any.
    pub fn update(&mut self, voltage: f64, threshold: &Threshold, now: Duration) -> Option<Blink> {
        match self.state {
            EyeState::Idle => {
                if threshold.is_crossed(voltage) {
                    self.state = EyeState::Blinking { started_at: now };
                }
                None
            }
            EyeState::Blinking { started_at } => {
                if threshold.is_crossed(voltage) {
                    // Still closed; repeated triggers are ignored
                    return None;
                }
                self.state = EyeState::Idle;
                Some(Blink {
                    started_at,
                    ended_at: now,
                })
            }
        }
    }

    pub fn is_blinking(&self) -> bool {
        matches!(self.state, EyeState::Blinking { .. })
    }

    /// Start time of the blink in progress
    pub fn open_since(&self) -> Option<Duration> {
        match self.state {
            EyeState::Blinking { started_at } => Some(started_at),
            EyeState::Idle => None,
        }
    }
}

impl Default for BlinkDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Where a completed blink ended up
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalibrationStep {
    /// Kept as a calibration sample; `collected` of the target so far
    Collected { collected: usize },
    /// This blink completed calibration with the given baseline (seconds)
    Completed { baseline: f64 },
    /// Calibration already finished; the blink belongs to the history
    Passed(Blink),
}

/// Collects the first `target` blinks and derives the baseline duration
#[derive(Debug, Clone)]
pub struct Calibration {
    target: usize,
    durations: Vec<f64>,
    baseline: Option<f64>,
}

impl Calibration {
    pub fn new(target: usize) -> Self {
        Self {
            target: target.max(1),
            durations: Vec::with_capacity(target),
            baseline: None,
        }
    }

    pub fn is_calibrating(&self) -> bool {
        self.baseline.is_none()
    }

    /// Baseline blink duration in seconds, once calibrated
    pub fn baseline(&self) -> Option<f64> {
        self.baseline
    }

    pub fn collected(&self) -> usize {
        self.durations.len()
    }

    pub fn target(&self) -> usize {
        self.target
    }

    pub fn route(&mut self, blink: Blink) -> CalibrationStep {
        if self.baseline.is_some() {
            return CalibrationStep::Passed(blink);
        }

        self.durations.push(blink.duration_secs());
        if self.durations.len() < self.target {
            return CalibrationStep::Collected {
                collected: self.durations.len(),
            };
        }

        match mean(&self.durations) {
            Ok(baseline) => {
                self.baseline = Some(baseline);
                self.durations = Vec::new();
                CalibrationStep::Completed { baseline }
            }
            // target >= 1 so the list is never empty here
            Err(_) => CalibrationStep::Collected {
                collected: self.durations.len(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn threshold() -> Threshold {
        Threshold {
            reference: 1.0,
            distance: 0.5,
        }
    }

    fn blink_of(secs: f64) -> Blink {
        Blink {
            started_at: Duration::from_secs(10),
            ended_at: Duration::from_secs(10) + Duration::from_secs_f64(secs),
        }
    }

    #[test]
    fn test_dip_and_recover_emits_one_blink() {
        let mut detector = BlinkDetector::new();
        let t = threshold();

        assert_eq!(detector.update(1.0, &t, ms(0)), None);
        assert_eq!(detector.update(0.0, &t, ms(100)), None);
        assert!(detector.is_blinking());

        let blink = detector.update(1.0, &t, ms(200)).unwrap();
        assert_eq!(blink.started_at, ms(100));
        assert_eq!(blink.duration(), ms(100));
        assert!(!detector.is_blinking());
    }

    #[test]
    fn test_bounce_below_threshold_does_not_nest() {
        let mut detector = BlinkDetector::new();
        let t = threshold();

        detector.update(0.2, &t, ms(0));
        // Oscillation that never climbs back to the level
        for (i, v) in [0.1, 0.4, 0.0, 0.49, 0.3].iter().enumerate() {
            assert_eq!(detector.update(*v, &t, ms(10 * (i as u64 + 1))), None);
            assert_eq!(detector.open_since(), Some(ms(0)));
        }

        let blink = detector.update(0.9, &t, ms(80)).unwrap();
        assert_eq!(blink.started_at, ms(0));
        assert_eq!(detector.update(0.9, &t, ms(90)), None);
    }

    #[test]
    fn test_reading_at_level_closes_blink() {
        let mut detector = BlinkDetector::new();
        let t = threshold();
        detector.update(0.4, &t, ms(0));
        assert!(detector.update(0.5, &t, ms(50)).is_some());
    }

    #[test]
    fn test_calibration_fires_once() {
        let mut calibration = Calibration::new(3);
        assert!(calibration.is_calibrating());

        assert_eq!(
            calibration.route(blink_of(0.2)),
            CalibrationStep::Collected { collected: 1 }
        );
        assert_eq!(
            calibration.route(blink_of(0.3)),
            CalibrationStep::Collected { collected: 2 }
        );

        match calibration.route(blink_of(0.25)) {
            CalibrationStep::Completed { baseline } => assert!((baseline - 0.25).abs() < 1e-6),
            other => panic!("expected completion, got {:?}", other),
        }
        assert!(!calibration.is_calibrating());

        let fourth = blink_of(0.9);
        assert_eq!(calibration.route(fourth), CalibrationStep::Passed(fourth));
        assert_eq!(calibration.collected(), 0);
        assert!((calibration.baseline().unwrap() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_calibration_without_enough_blinks_has_no_baseline() {
        let mut calibration = Calibration::new(3);
        calibration.route(blink_of(0.2));
        assert!(calibration.is_calibrating());
        assert_eq!(calibration.baseline(), None);
    }
}
