/// Per-tick orchestration of the blink and drowsiness pipeline
///
/// read -> accumulate -> close period -> threshold -> blink state ->
/// calibration or history -> drowsiness -> indicator.
use log::{debug, warn};
use std::future::Future;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};

use crate::analysis::{
    AdaptiveThreshold, AlertState, BlinkDetector, Calibration, CalibrationStep, DrowsinessEvaluator,
    PeriodAverager, RingBuffer,
};
use crate::config::TrackerConfig;
use crate::hardware::{Clock, Indicator, Sensor};
use crate::models::{AlertTransition, Blink, Threshold, TickReport};
use crate::report::{Diagnostics, Reporter, DIAGNOSTIC_INTERVAL};

/// All mutable tracker state, owned by the run loop
pub struct Tracker {
    averager: PeriodAverager,
    averages: RingBuffer<f64>,
    roll_keep: Option<usize>,
    threshold: AdaptiveThreshold,
    current_threshold: Option<Threshold>,
    detector: BlinkDetector,
    calibration: Calibration,
    history: RingBuffer<Blink>,
    evaluator: DrowsinessEvaluator,
    reporter: Reporter,
    ticks: u32,
}

impl Tracker {
    /// `config` is expected to have passed `TrackerConfig::validate`
    pub fn new(config: &TrackerConfig, reporter: Reporter, started_at: Duration) -> Self {
        Self {
            averager: PeriodAverager::new(config.period, started_at),
            averages: RingBuffer::new(config.average_window),
            roll_keep: config.roll_keep_count(),
            threshold: AdaptiveThreshold::new(config.sensitivity, config.min_threshold_distance),
            current_threshold: None,
            detector: BlinkDetector::new(),
            calibration: Calibration::new(config.calibration_blinks),
            history: RingBuffer::new(config.blink_window),
            evaluator: DrowsinessEvaluator::new(
                config.drowsy_multiplier,
                config.cooldown,
                config.min_blinks,
            ),
            reporter,
            ticks: 0,
        }
    }

    /// Read the sensor, advance one tick and drive the indicator.
    ///
    /// A failed read skips the tick and returns `None`.
    pub fn poll<S, I, C>(
        &mut self,
        sensor: &mut S,
        indicator: &mut I,
        clock: &C,
    ) -> Option<TickReport>
    where
        S: Sensor + ?Sized,
        I: Indicator + ?Sized,
        C: Clock + ?Sized,
    {
        let voltage = match sensor.read() {
            Ok(voltage) => voltage,
            Err(e) => {
                warn!("Sensor read failed, skipping tick: {}", e);
                return None;
            }
        };

        let report = self.tick(voltage, clock.now());

        if let Err(e) = indicator.set(report.alert_active) {
            warn!("Failed to drive indicator: {}", e);
        }

        Some(report)
    }

    /// Poll once per `sample_interval` until `stop` resolves, then switch the
    /// indicator off. Returns the number of ticks taken.
    ///
    /// Ticks missed while a poll overran are dropped rather than replayed in
    /// a burst.
    pub async fn run<S, I, C, F>(
        &mut self,
        sensor: &mut S,
        indicator: &mut I,
        clock: &C,
        sample_interval: Duration,
        stop: F,
    ) -> u64
    where
        S: Sensor + ?Sized,
        I: Indicator + ?Sized,
        C: Clock + ?Sized,
        F: Future<Output = ()>,
    {
        let mut ticker = interval(sample_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(stop);

        let mut ticks = 0u64;
        loop {
            tokio::select! {
                biased;
                _ = &mut stop => break,
                _ = ticker.tick() => {
                    ticks += 1;
                    self.poll(sensor, indicator, clock);
                }
            }
        }

        self.shutdown(indicator);
        ticks
    }

    /// Advance the pipeline with one reading taken at `now`
    pub fn tick(&mut self, voltage: f64, now: Duration) -> TickReport {
        self.ticks = self.ticks.wrapping_add(1);
        let mut report = TickReport::default();

        self.averager.record(voltage);
        if self.averager.period_elapsed(now) {
            report.period_average = self.roll_period(now);
        }

        if let Some(threshold) = self.current_threshold {
            if let Some(blink) = self.detector.update(voltage, &threshold, now) {
                self.reporter.blink(&blink);
                report.calibrated_baseline = self.route_blink(blink);
                report.blink = Some(blink);
            }
        }

        if let Some(baseline) = self.calibration.baseline() {
            if self.evaluator.is_ready(&self.history) {
                match self.evaluator.evaluate(&self.history, baseline, now) {
                    Ok(transition) => {
                        if matches!(
                            transition,
                            AlertTransition::Activated
                                | AlertTransition::Refreshed
                                | AlertTransition::Cleared
                        ) {
                            self.reporter
                                .alert(transition, self.evaluator.recent_mean(&self.history).ok());
                        }
                        report.alert = Some(transition);
                    }
                    Err(e) => debug!("Drowsiness evaluation skipped: {}", e),
                }
            }
        }

        if self.ticks % DIAGNOSTIC_INTERVAL == 0 {
            self.reporter.diagnostics(&self.diagnostics());
        }
        self.reporter.plot(voltage, self.current_threshold.as_ref());

        report.threshold = self.current_threshold;
        report.alert_active = self.evaluator.alert().active;
        report
    }

    /// Close the elapsed period, push its average and refresh the threshold
    fn roll_period(&mut self, now: Duration) -> Option<f64> {
        let average = match self.averager.close_period(now) {
            Ok(average) => average,
            Err(e) => {
                debug!("Period closed without samples: {}", e);
                return None;
            }
        };

        self.averages.write(average);
        if self.averages.is_full() {
            if let Some(keep) = self.roll_keep {
                self.averages.retain_recent(keep);
            }
        }

        if self.averages.is_ready() {
            match self.threshold.compute(&self.averages) {
                Ok(threshold) => self.current_threshold = Some(threshold),
                Err(e) => debug!("Threshold not updated: {}", e),
            }
        }

        self.reporter.period(average, self.current_threshold.as_ref());
        Some(average)
    }

    /// Send a finished blink to calibration or the history window.
    /// Returns the baseline if this blink completed calibration.
    fn route_blink(&mut self, blink: Blink) -> Option<f64> {
        match self.calibration.route(blink) {
            CalibrationStep::Collected { collected } => {
                self.reporter
                    .calibration_progress(collected, self.calibration.target());
                None
            }
            CalibrationStep::Completed { baseline } => {
                self.reporter.calibrated(baseline);
                Some(baseline)
            }
            CalibrationStep::Passed(blink) => {
                self.history.write(blink);
                None
            }
        }
    }

    fn diagnostics(&self) -> Diagnostics {
        Diagnostics {
            recent_mean: self.evaluator.recent_mean(&self.history).ok(),
            averages_filled: self.averages.len(),
            averages_capacity: self.averages.capacity(),
            blinks_recorded: self.history.len(),
            calibrating: self.calibration.is_calibrating(),
            blink_open: self.detector.is_blinking(),
            alert: self.evaluator.alert(),
        }
    }

    /// Drop any active alert and switch the indicator off
    pub fn shutdown<I: Indicator + ?Sized>(&mut self, indicator: &mut I) {
        self.evaluator.reset();
        if let Err(e) = indicator.set(false) {
            warn!("Failed to switch indicator off: {}", e);
        }
        self.reporter.stopped();
    }

    pub fn alert(&self) -> AlertState {
        self.evaluator.alert()
    }

    pub fn baseline(&self) -> Option<f64> {
        self.calibration.baseline()
    }

    pub fn threshold(&self) -> Option<Threshold> {
        self.current_threshold
    }

    pub fn averages(&self) -> &RingBuffer<f64> {
        &self.averages
    }

    pub fn history(&self) -> &RingBuffer<Blink> {
        &self.history
    }
}
