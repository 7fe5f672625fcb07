/// Analog eye-sensor input read from a raw ADC value file
use log::trace;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::SensorError;

/// Source of calibrated voltage readings
pub trait Sensor {
    fn read(&mut self) -> Result<f64, SensorError>;
}

/// Convert a raw ADC count into volts
///
/// voltage = raw * reference / 2^bits, so a 16-bit converter against 3.3 V
/// maps 65536 counts onto the reference range.
pub fn raw_to_voltage(
    raw: u64,
    reference_voltage: f64,
    resolution_bits: u32,
) -> Result<f64, SensorError> {
    let full_scale = 1u64 << resolution_bits;
    if raw >= full_scale {
        return Err(SensorError::OutOfRange {
            raw,
            bits: resolution_bits,
        });
    }
    Ok(raw as f64 * reference_voltage / full_scale as f64)
}

/// Reads integer counts from a file such as a Linux IIO
/// `in_voltageN_raw` attribute
#[derive(Debug, Clone)]
pub struct AdcFileSensor {
    path: PathBuf,
    reference_voltage: f64,
    resolution_bits: u32,
}

impl AdcFileSensor {
    pub fn new(path: impl AsRef<Path>, reference_voltage: f64, resolution_bits: u32) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            reference_voltage,
            resolution_bits,
        }
    }
}

impl Sensor for AdcFileSensor {
    fn read(&mut self) -> Result<f64, SensorError> {
        let contents = fs::read_to_string(&self.path).map_err(|source| SensorError::Io {
            path: self.path.clone(),
            source,
        })?;

        let raw = contents.trim();
        let count: u64 = raw.parse().map_err(|_| SensorError::Parse {
            path: self.path.clone(),
            raw: raw.to_string(),
        })?;

        let voltage = raw_to_voltage(count, self.reference_voltage, self.resolution_bits)?;
        trace!("Raw count {} -> {:.4} V", count, voltage);
        Ok(voltage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::process;

    fn scratch_file(name: &str, contents: &str) -> PathBuf {
        let path = env::temp_dir().join(format!("blink-tracker-{}-{}", process::id(), name));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_raw_to_voltage_16_bit() {
        assert_eq!(raw_to_voltage(0, 3.3, 16).unwrap(), 0.0);
        assert!((raw_to_voltage(32768, 3.3, 16).unwrap() - 1.65).abs() < 1e-9);
        assert!(raw_to_voltage(65535, 3.3, 16).unwrap() < 3.3);
        assert!(matches!(
            raw_to_voltage(65536, 3.3, 16),
            Err(SensorError::OutOfRange { raw: 65536, bits: 16 })
        ));
    }

    #[test]
    fn test_raw_to_voltage_12_bit() {
        assert!((raw_to_voltage(2048, 3.3, 12).unwrap() - 1.65).abs() < 1e-9);
        assert!(raw_to_voltage(4096, 3.3, 12).is_err());
    }

    #[test]
    fn test_reads_count_from_file() {
        let path = scratch_file("adc-ok", "16384\n");
        let mut sensor = AdcFileSensor::new(&path, 3.3, 16);
        let voltage = sensor.read().unwrap();
        assert!((voltage - 0.825).abs() < 1e-9);
        fs::remove_file(path).ok();
    }

    #[test]
    fn test_garbage_and_missing_files_fail() {
        let path = scratch_file("adc-garbage", "n/a");
        let mut sensor = AdcFileSensor::new(&path, 3.3, 16);
        assert!(matches!(sensor.read(), Err(SensorError::Parse { .. })));
        fs::remove_file(&path).ok();

        let missing_path = env::temp_dir().join("blink-tracker-no-such-adc");
        let mut missing = AdcFileSensor::new(missing_path, 3.3, 16);
        assert!(matches!(missing.read(), Err(SensorError::Io { .. })));
    }
}
