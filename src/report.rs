/// Log-mode gated reporting of tracker events
use log::info;
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;

use crate::analysis::AlertState;
use crate::error::TrackerError;
use crate::models::{AlertTransition, Blink, Threshold};
use crate::utils::format_datetime;

/// Ticks between verbose diagnostic reports
pub const DIAGNOSTIC_INTERVAL: u32 = 256;

/// Console verbosity selected at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogMode {
    BlinksOnly,
    #[default]
    Essentials,
    Verbose,
    /// Only `(voltage, threshold)` tuples on stdout
    Plotting,
}

/// Categories of events the tracker emits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Blink,
    Calibration,
    Alert,
    Lifecycle,
    Period,
    Diagnostic,
    Plot,
}

impl LogMode {
    pub fn enables(self, kind: EventKind) -> bool {
        match self {
            LogMode::BlinksOnly => kind == EventKind::Blink,
            LogMode::Essentials => matches!(
                kind,
                EventKind::Blink | EventKind::Calibration | EventKind::Alert | EventKind::Lifecycle
            ),
            LogMode::Verbose => kind != EventKind::Plot,
            LogMode::Plotting => kind == EventKind::Plot,
        }
    }
}

impl FromStr for LogMode {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "blinks_only" => Ok(LogMode::BlinksOnly),
            "essentials" => Ok(LogMode::Essentials),
            "verbose" => Ok(LogMode::Verbose),
            "plotting" => Ok(LogMode::Plotting),
            other => Err(TrackerError::InvalidConfiguration(format!(
                "unknown log mode '{}', expected blinks_only, essentials, verbose or plotting",
                other
            ))),
        }
    }
}

impl fmt::Display for LogMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogMode::BlinksOnly => "blinks_only",
            LogMode::Essentials => "essentials",
            LogMode::Verbose => "verbose",
            LogMode::Plotting => "plotting",
        };
        f.write_str(name)
    }
}

/// Snapshot passed to the periodic diagnostic report
#[derive(Debug, Clone, Copy)]
pub struct Diagnostics {
    pub recent_mean: Option<f64>,
    pub averages_filled: usize,
    pub averages_capacity: usize,
    pub blinks_recorded: usize,
    pub calibrating: bool,
    pub blink_open: bool,
    pub alert: AlertState,
}

#[derive(Debug, Clone, Copy)]
pub struct Reporter {
    mode: LogMode,
}

impl Reporter {
    pub fn new(mode: LogMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> LogMode {
        self.mode
    }

    pub fn started(&self, calibration_blinks: usize) {
        if self.mode.enables(EventKind::Lifecycle) {
            info!(
                "Initialized successfully: starting blink calibration ({} blinks)",
                calibration_blinks
            );
        }
    }

    pub fn stopped(&self) {
        if self.mode.enables(EventKind::Lifecycle) {
            info!("Blink tracker stopped");
        }
    }

    pub fn blink(&self, blink: &Blink) {
        if self.mode.enables(EventKind::Blink) {
            info!("New blink of {:.3} seconds", blink.duration_secs());
        }
    }

    pub fn calibration_progress(&self, collected: usize, target: usize) {
        if self.mode.enables(EventKind::Diagnostic) {
            info!("Calibration blink {}/{}", collected, target);
        }
    }

    pub fn calibrated(&self, baseline: f64) {
        if self.mode.enables(EventKind::Calibration) {
            info!("Calibrated. Baseline blink time is {:.3} seconds", baseline);
            info!("Starting drowsiness detection");
        }
    }

    pub fn alert(&self, transition: AlertTransition, recent_mean: Option<f64>) {
        if !self.mode.enables(EventKind::Alert) {
            return;
        }

        let stamp = format_datetime(&OffsetDateTime::now_utc());
        let recent = recent_mean.unwrap_or(f64::NAN);
        match transition {
            AlertTransition::Activated => info!(
                "Drowsiness detected at {} (recent blink mean {:.3} s): indicator on",
                stamp, recent
            ),
            AlertTransition::Refreshed => info!(
                "Still drowsy at {} (recent blink mean {:.3} s): cooldown restarted",
                stamp, recent
            ),
            AlertTransition::Cleared => info!("Alert cleared at {}: indicator off", stamp),
            AlertTransition::Held | AlertTransition::Idle => {}
        }
    }

    pub fn period(&self, average: f64, threshold: Option<&Threshold>) {
        if !self.mode.enables(EventKind::Period) {
            return;
        }

        match threshold {
            Some(t) => info!(
                "Period average {:.4} V, threshold {:.4} V (mean {:.4}, distance {:.4})",
                average,
                t.level(),
                t.reference,
                t.distance
            ),
            None => info!("Period average {:.4} V, window filling", average),
        }
    }

    pub fn diagnostics(&self, diagnostics: &Diagnostics) {
        if !self.mode.enables(EventKind::Diagnostic) {
            return;
        }

        match diagnostics.recent_mean {
            Some(mean) => info!("Mean duration of last three blinks was {:.3} seconds", mean),
            None => info!("Not enough blinks recorded for a recent mean"),
        }
        info!(
            "Status: averages {}/{}, blinks {}, calibrating {}, eye {}, alert {}",
            diagnostics.averages_filled,
            diagnostics.averages_capacity,
            diagnostics.blinks_recorded,
            diagnostics.calibrating,
            if diagnostics.blink_open { "closed" } else { "open" },
            if diagnostics.alert.active { "on" } else { "off" }
        );
    }

    pub fn plot(&self, voltage: f64, threshold: Option<&Threshold>) {
        if !self.mode.enables(EventKind::Plot) {
            return;
        }

        match threshold {
            Some(t) => println!("({:.4}, {:.4})", voltage, t.level()),
            None => println!("({:.4},)", voltage),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_modes() {
        assert_eq!("blinks_only".parse::<LogMode>().unwrap(), LogMode::BlinksOnly);
        assert_eq!(" Verbose ".parse::<LogMode>().unwrap(), LogMode::Verbose);
        assert_eq!("PLOTTING".parse::<LogMode>().unwrap(), LogMode::Plotting);
        assert!(matches!(
            "chatty".parse::<LogMode>(),
            Err(TrackerError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_display_round_trips_names() {
        for mode in [
            LogMode::BlinksOnly,
            LogMode::Essentials,
            LogMode::Verbose,
            LogMode::Plotting,
        ] {
            assert_eq!(mode.to_string().parse::<LogMode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_blinks_only_subset() {
        let mode = LogMode::BlinksOnly;
        assert!(mode.enables(EventKind::Blink));
        assert!(!mode.enables(EventKind::Calibration));
        assert!(!mode.enables(EventKind::Alert));
        assert!(!mode.enables(EventKind::Plot));
    }

    #[test]
    fn test_essentials_excludes_chatter() {
        let mode = LogMode::Essentials;
        assert!(mode.enables(EventKind::Blink));
        assert!(mode.enables(EventKind::Calibration));
        assert!(mode.enables(EventKind::Alert));
        assert!(!mode.enables(EventKind::Period));
        assert!(!mode.enables(EventKind::Diagnostic));
    }

    #[test]
    fn test_verbose_and_plotting_are_disjoint() {
        for kind in [
            EventKind::Blink,
            EventKind::Calibration,
            EventKind::Alert,
            EventKind::Lifecycle,
            EventKind::Period,
            EventKind::Diagnostic,
            EventKind::Plot,
        ] {
            assert_ne!(
                LogMode::Verbose.enables(kind),
                LogMode::Plotting.enables(kind),
                "{:?}",
                kind
            );
        }
    }
}
