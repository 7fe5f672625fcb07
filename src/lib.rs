//! Blink detection and drowsiness alerting for an analog eye sensor.
//!
//! Raw voltage readings are averaged per period into a rolling window, an
//! adaptive threshold is derived from that window, and dips below it are
//! tracked as blinks. After a short calibration the mean of the latest blink
//! durations is compared against the calibrated baseline to drive a warning
//! indicator.

pub mod analysis;
pub mod config;
pub mod error;
pub mod hardware;
pub mod models;
pub mod report;
pub mod tracker;
pub mod utils;

pub use config::{AppConfig, TrackerConfig};
pub use error::{IndicatorError, SensorError, TrackerError};
pub use models::{AlertTransition, Blink, Threshold, TickReport};
pub use tracker::Tracker;
