use log::{error, info, warn};
use tokio::time::{sleep, Duration};

use blink_tracker::hardware::{
    AdcFileSensor, Clock, FileIndicator, Indicator, LogIndicator, MonotonicClock,
};
use blink_tracker::report::{LogMode, Reporter};
use blink_tracker::{AppConfig, Tracker};

const STARTUP_DELAY_SECS: u64 = 1;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .format_timestamp_secs()
        .init();

    // Load configuration
    let config = match AppConfig::new() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let reporter = Reporter::new(config.log_mode);
    if reporter.mode() != LogMode::Plotting {
        info!(
            "Reading {} every {} ms (log mode {})",
            config.sensor_path.display(),
            config.sample_interval.as_millis(),
            config.log_mode
        );
    }

    let mut sensor = AdcFileSensor::new(
        &config.sensor_path,
        config.reference_voltage,
        config.resolution_bits,
    );
    let mut indicator: Box<dyn Indicator> = match &config.indicator_path {
        Some(path) => Box::new(FileIndicator::new(path)),
        None => Box::new(LogIndicator::default()),
    };

    sleep(Duration::from_secs(STARTUP_DELAY_SECS)).await;

    let clock = MonotonicClock::new();
    let mut tracker = Tracker::new(&config.tracker, reporter, clock.now());
    reporter.started(config.tracker.calibration_blinks);

    // Handle Ctrl+C gracefully
    let (tx, rx) = tokio::sync::oneshot::channel();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                let _ = tx.send(());
            }
            Err(e) => {
                warn!("Failed to listen for Ctrl+C: {}", e);
                // Keep the sender alive so the tracker is not stopped
                std::future::pending::<()>().await;
            }
        }
    });
    let shutdown = async {
        if rx.await.is_ok() {
            info!("Program terminated by user. Exiting gracefully.");
        }
    };

    let ticks = tracker
        .run(
            &mut sensor,
            indicator.as_mut(),
            &clock,
            config.sample_interval,
            shutdown,
        )
        .await;

    info!(
        "Session summary: {} ticks, {} blinks in history, baseline {}, averages {}/{}",
        ticks,
        tracker.history().len(),
        tracker
            .baseline()
            .map(|b| format!("{:.3} s", b))
            .unwrap_or_else(|| "not calibrated".to_string()),
        tracker.averages().len(),
        tracker.averages().capacity()
    );

    Ok(())
}
