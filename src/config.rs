use log::debug;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::TrackerError;
use crate::report::LogMode;
use crate::utils::seconds_to_duration;

/// Signal-processing parameters for the tracker pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    /// Gain applied to the average window's stddev
    pub sensitivity: f64,
    /// Lower bound on the threshold distance, in volts
    pub min_threshold_distance: f64,
    /// Length of one averaging period
    pub period: Duration,
    pub average_window: usize,
    /// Fraction of the average window kept each time it fills
    pub average_roll_keep: Option<f64>,
    pub blink_window: usize,
    /// Blinks required in the history before drowsiness is evaluated
    pub min_blinks: usize,
    pub calibration_blinks: usize,
    pub drowsy_multiplier: f64,
    pub cooldown: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            sensitivity: 10.0,
            min_threshold_distance: 0.5,
            period: Duration::from_millis(500),
            average_window: 8,
            average_roll_keep: None,
            blink_window: 16,
            min_blinks: 5,
            calibration_blinks: 3,
            drowsy_multiplier: 2.0,
            cooldown: Duration::from_secs(30),
        }
    }
}

impl TrackerConfig {
    pub fn validate(&self) -> Result<(), TrackerError> {
        if !(self.sensitivity > 0.0 && self.sensitivity.is_finite()) {
            return Err(invalid(format!("SENSITIVITY must be positive, got {}", self.sensitivity)));
        }
        if !(self.min_threshold_distance >= 0.0 && self.min_threshold_distance.is_finite()) {
            return Err(invalid(format!(
                "MIN_THRESHOLD_DISTANCE must be non-negative, got {}",
                self.min_threshold_distance
            )));
        }
        if self.period.is_zero() {
            return Err(invalid("PERIOD_SECS must be positive".to_string()));
        }
        if self.average_window < 2 {
            return Err(invalid(format!(
                "AVERAGE_WINDOW must hold at least 2 averages, got {}",
                self.average_window
            )));
        }
        if let Some(keep) = self.average_roll_keep {
            if !(keep > 0.0 && keep <= 1.0) {
                return Err(invalid(format!("AVERAGE_ROLL_KEEP must be in (0, 1], got {}", keep)));
            }
            if self.roll_keep_count().unwrap_or(0) < 2 {
                return Err(invalid(format!(
                    "AVERAGE_ROLL_KEEP {} keeps fewer than 2 of {} averages",
                    keep, self.average_window
                )));
            }
        }
        if self.blink_window < 3 {
            return Err(invalid(format!(
                "BLINK_WINDOW must hold at least 3 blinks, got {}",
                self.blink_window
            )));
        }
        if self.min_blinks < 3 || self.min_blinks > self.blink_window {
            return Err(invalid(format!(
                "MIN_BLINKS must be between 3 and BLINK_WINDOW ({}), got {}",
                self.blink_window, self.min_blinks
            )));
        }
        if self.calibration_blinks == 0 {
            return Err(invalid("CALIBRATION_BLINKS must be at least 1".to_string()));
        }
        if !(self.drowsy_multiplier > 0.0 && self.drowsy_multiplier.is_finite()) {
            return Err(invalid(format!(
                "DROWSY_MULTIPLIER must be positive, got {}",
                self.drowsy_multiplier
            )));
        }
        Ok(())
    }

    /// Number of averages kept when the window is rolled
    pub fn roll_keep_count(&self) -> Option<usize> {
        self.average_roll_keep
            .map(|keep| (self.average_window as f64 * keep).round() as usize)
    }
}

/// Full startup configuration: hardware wiring plus pipeline parameters
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub sensor_path: PathBuf,
    pub reference_voltage: f64,
    pub resolution_bits: u32,
    pub indicator_path: Option<PathBuf>,
    pub sample_interval: Duration,
    pub log_mode: LogMode,
    pub tracker: TrackerConfig,
}

impl AppConfig {
    pub fn new() -> Result<Self, TrackerError> {
        // Load environment variables
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key/value source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, TrackerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let sensor_path = lookup_value(&lookup, "SENSOR_PATH")
            .map(PathBuf::from)
            .ok_or_else(|| invalid("SENSOR_PATH environment variable not set".to_string()))?;
        let indicator_path = lookup_value(&lookup, "INDICATOR_PATH").map(PathBuf::from);

        let reference_voltage: f64 = parse_var(&lookup, "SENSOR_REFERENCE_VOLTAGE", 3.3)?;
        let resolution_bits: u32 = parse_var(&lookup, "SENSOR_RESOLUTION_BITS", 16)?;
        let sample_interval_ms: u64 = parse_var(&lookup, "SAMPLE_INTERVAL_MS", 10)?;
        let log_mode: LogMode = parse_var(&lookup, "LOG_MODE", LogMode::default())?;

        let defaults = TrackerConfig::default();
        let tracker = TrackerConfig {
            sensitivity: parse_var(&lookup, "SENSITIVITY", defaults.sensitivity)?,
            min_threshold_distance: parse_var(
                &lookup,
                "MIN_THRESHOLD_DISTANCE",
                defaults.min_threshold_distance,
            )?,
            period: seconds_to_duration(
                "PERIOD_SECS",
                parse_var(&lookup, "PERIOD_SECS", defaults.period.as_secs_f64())?,
            )?,
            average_window: parse_var(&lookup, "AVERAGE_WINDOW", defaults.average_window)?,
            average_roll_keep: match lookup_value(&lookup, "AVERAGE_ROLL_KEEP") {
                Some(raw) => Some(parse_value("AVERAGE_ROLL_KEEP", &raw)?),
                None => None,
            },
            blink_window: parse_var(&lookup, "BLINK_WINDOW", defaults.blink_window)?,
            min_blinks: parse_var(&lookup, "MIN_BLINKS", defaults.min_blinks)?,
            calibration_blinks: parse_var(
                &lookup,
                "CALIBRATION_BLINKS",
                defaults.calibration_blinks,
            )?,
            drowsy_multiplier: parse_var(
                &lookup,
                "DROWSY_MULTIPLIER",
                defaults.drowsy_multiplier,
            )?,
            cooldown: seconds_to_duration(
                "COOLDOWN_SECS",
                parse_var(&lookup, "COOLDOWN_SECS", defaults.cooldown.as_secs_f64())?,
            )?,
        };

        let config = AppConfig {
            sensor_path,
            reference_voltage,
            resolution_bits,
            indicator_path,
            sample_interval: Duration::from_millis(sample_interval_ms),
            log_mode,
            tracker,
        };
        config.validate()?;

        debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), TrackerError> {
        if !(self.reference_voltage > 0.0 && self.reference_voltage.is_finite()) {
            return Err(invalid(format!(
                "SENSOR_REFERENCE_VOLTAGE must be positive, got {}",
                self.reference_voltage
            )));
        }
        if !(1..=32).contains(&self.resolution_bits) {
            return Err(invalid(format!(
                "SENSOR_RESOLUTION_BITS must be between 1 and 32, got {}",
                self.resolution_bits
            )));
        }
        if self.sample_interval.is_zero() {
            return Err(invalid("SAMPLE_INTERVAL_MS must be positive".to_string()));
        }
        self.tracker.validate()
    }
}

fn invalid(message: String) -> TrackerError {
    TrackerError::InvalidConfiguration(message)
}

/// Blank values count as unset
fn lookup_value<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> Result<T, TrackerError> {
    raw.parse()
        .map_err(|_| invalid(format!("{} has unparsable value '{}'", key, raw)))
}

fn parse_var<T, F>(lookup: &F, key: &str, default: T) -> Result<T, TrackerError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup_value(lookup, key) {
        Some(raw) => parse_value(key, &raw),
        None => Ok(default),
    }
}
