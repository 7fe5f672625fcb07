/// Drowsiness decision over recent blink durations, with cooldown-gated alerting
use std::time::Duration;

use crate::analysis::ring_buffer::RingBuffer;
use crate::analysis::stats::mean;
use crate::error::TrackerError;
use crate::models::{AlertTransition, Blink};

/// Number of most recent blinks compared against the baseline
pub const RECENT_BLINKS: usize = 3;

/// Alert output state. `activated_at` is set exactly while `active` is.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AlertState {
    pub active: bool,
    pub activated_at: Option<Duration>,
}

impl AlertState {
    fn activate(&mut self, now: Duration) {
        self.active = true;
        self.activated_at = Some(now);
    }

    fn deactivate(&mut self) {
        self.active = false;
        self.activated_at = None;
    }
}

#[derive(Debug, Clone)]
pub struct DrowsinessEvaluator {
    multiplier: f64,
    cooldown: Duration,
    min_blinks: usize,
    alert: AlertState,
}

impl DrowsinessEvaluator {
    pub fn new(multiplier: f64, cooldown: Duration, min_blinks: usize) -> Self {
        Self {
            multiplier,
            cooldown,
            min_blinks: min_blinks.max(RECENT_BLINKS),
            alert: AlertState::default(),
        }
    }

    pub fn alert(&self) -> AlertState {
        self.alert
    }

    /// History holds enough blinks to be evaluated
    pub fn is_ready(&self, history: &RingBuffer<Blink>) -> bool {
        history.len() >= self.min_blinks
    }

    /// Mean duration in seconds of the last `RECENT_BLINKS` blinks
    pub fn recent_mean(&self, history: &RingBuffer<Blink>) -> Result<f64, TrackerError> {
        if !self.is_ready(history) {
            return Err(TrackerError::WindowNotReady {
                filled: history.len(),
                required: self.min_blinks,
            });
        }

        let durations: Vec<f64> = history
            .last(RECENT_BLINKS)
            .unwrap_or_default()
            .iter()
            .map(Blink::duration_secs)
            .collect();
        mean(&durations)
    }

    /// Run one evaluation against the calibration baseline (seconds).
    ///
    /// While the alert is active and inside its cooldown the condition is not
    /// consulted at all. After the cooldown it is refreshed if the condition
    /// still holds, or cleared otherwise.
    pub fn evaluate(
        &mut self,
        history: &RingBuffer<Blink>,
        baseline: f64,
        now: Duration,
    ) -> Result<AlertTransition, TrackerError> {
        if let Some(activated_at) = self.alert.activated_at {
            if now.saturating_sub(activated_at) < self.cooldown {
                return Ok(AlertTransition::Held);
            }
        }

        let drowsy = self.recent_mean(history)? >= baseline * self.multiplier;

        let transition = match (self.alert.active, drowsy) {
            (false, true) => {
                self.alert.activate(now);
                AlertTransition::Activated
            }
            (false, false) => AlertTransition::Idle,
            (true, true) => {
                self.alert.activate(now);
                AlertTransition::Refreshed
            }
            (true, false) => {
                self.alert.deactivate();
                AlertTransition::Cleared
            }
        };

        Ok(transition)
    }

    /// Switch the alert off regardless of cooldown
    pub fn reset(&mut self) {
        self.alert.deactivate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history_of(durations: &[f64]) -> RingBuffer<Blink> {
        let mut history = RingBuffer::new(16);
        for (i, d) in durations.iter().enumerate() {
            let started_at = Duration::from_secs(i as u64 * 5);
            history.write(Blink {
                started_at,
                ended_at: started_at + Duration::from_secs_f64(*d),
            });
        }
        history
    }

    fn evaluator() -> DrowsinessEvaluator {
        DrowsinessEvaluator::new(2.0, Duration::from_secs(30), 5)
    }

    #[test]
    fn test_not_ready_below_min_blinks() {
        let mut evaluator = evaluator();
        let history = history_of(&[0.6, 0.6, 0.6, 0.6]);
        assert!(!evaluator.is_ready(&history));
        assert!(matches!(
            evaluator.evaluate(&history, 0.25, Duration::from_secs(100)),
            Err(TrackerError::WindowNotReady { filled: 4, required: 5 })
        ));
    }

    #[test]
    fn test_recent_mean_uses_last_three() {
        let evaluator = evaluator();
        let history = history_of(&[5.0, 5.0, 0.5, 0.6, 0.7]);
        assert!((evaluator.recent_mean(&history).unwrap() - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_recent_mean_across_wrap_boundary() {
        let evaluator = evaluator();
        let mut history = RingBuffer::new(5);
        for (i, d) in [9.0, 9.0, 9.0, 9.0, 0.3, 0.6, 0.9].iter().enumerate() {
            let started_at = Duration::from_secs(i as u64);
            history.write(Blink {
                started_at,
                ended_at: started_at + Duration::from_secs_f64(*d),
            });
        }
        // Cursor sits at index 2, so the last three are slots 4, 0 and 1
        assert!((evaluator.recent_mean(&history).unwrap() - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_long_blinks_activate_alert() {
        let mut evaluator = evaluator();
        let history = history_of(&[0.2, 0.3, 0.5, 0.6, 0.7]);
        let now = Duration::from_secs(40);

        let transition = evaluator.evaluate(&history, 0.25, now).unwrap();
        assert_eq!(transition, AlertTransition::Activated);
        assert_eq!(
            evaluator.alert(),
            AlertState {
                active: true,
                activated_at: Some(now)
            }
        );
    }

    #[test]
    fn test_normal_blinks_stay_idle() {
        let mut evaluator = evaluator();
        let history = history_of(&[0.25; 6]);
        let transition = evaluator.evaluate(&history, 0.25, Duration::from_secs(40)).unwrap();
        assert_eq!(transition, AlertTransition::Idle);
        assert!(!evaluator.alert().active);
    }

    #[test]
    fn test_alert_holds_through_cooldown() {
        let mut evaluator = evaluator();
        let drowsy = history_of(&[0.6; 5]);
        let alert_on = Duration::from_secs(40);
        evaluator.evaluate(&drowsy, 0.25, alert_on).unwrap();

        // Condition goes false immediately, alert must not drop
        let rested = history_of(&[0.2; 5]);
        for offset in [0, 1, 15, 29] {
            let now = alert_on + Duration::from_secs(offset);
            assert_eq!(
                evaluator.evaluate(&rested, 0.25, now).unwrap(),
                AlertTransition::Held
            );
            assert!(evaluator.alert().active);
        }

        let after = alert_on + Duration::from_secs(30);
        assert_eq!(
            evaluator.evaluate(&rested, 0.25, after).unwrap(),
            AlertTransition::Cleared
        );
        assert_eq!(evaluator.alert(), AlertState::default());
    }

    #[test]
    fn test_alert_refreshes_when_still_drowsy() {
        let mut evaluator = evaluator();
        let drowsy = history_of(&[0.6; 5]);
        evaluator.evaluate(&drowsy, 0.25, Duration::from_secs(40)).unwrap();

        let later = Duration::from_secs(75);
        assert_eq!(
            evaluator.evaluate(&drowsy, 0.25, later).unwrap(),
            AlertTransition::Refreshed
        );
        assert_eq!(evaluator.alert().activated_at, Some(later));
    }

    #[test]
    fn test_cleared_alert_can_activate_again() {
        let mut evaluator = evaluator();
        let drowsy = history_of(&[0.6; 5]);
        let rested = history_of(&[0.2; 5]);

        evaluator.evaluate(&drowsy, 0.25, Duration::from_secs(0)).unwrap();
        evaluator.evaluate(&rested, 0.25, Duration::from_secs(31)).unwrap();
        assert_eq!(
            evaluator.evaluate(&drowsy, 0.25, Duration::from_secs(32)).unwrap(),
            AlertTransition::Activated
        );
    }
}
