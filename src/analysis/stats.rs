/// Mean and standard deviation over finite sequences
use crate::error::TrackerError;

/// Divisor used for the variance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Deviation {
    /// Divide by N
    #[default]
    Population,
    /// Divide by N - 1
    Sample,
}

/// Arithmetic mean. Fails on an empty sequence.
pub fn mean(data: &[f64]) -> Result<f64, TrackerError> {
    if data.is_empty() {
        return Err(TrackerError::InsufficientData {
            operation: "mean",
            required: 1,
            actual: 0,
        });
    }

    Ok(data.iter().sum::<f64>() / data.len() as f64)
}

/// Standard deviation. Needs at least two data points for either divisor.
pub fn stddev(data: &[f64], deviation: Deviation) -> Result<f64, TrackerError> {
    let n = data.len();
    if n < 2 {
        return Err(TrackerError::InsufficientData {
            operation: "stddev",
            required: 2,
            actual: n,
        });
    }

    let centre = mean(data)?;
    let squares: f64 = data.iter().map(|x| (x - centre) * (x - centre)).sum();

    let divisor = match deviation {
        Deviation::Population => n as f64,
        Deviation::Sample => (n - 1) as f64,
    };

    Ok((squares / divisor).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_mean_basic() {
        assert!((mean(&[1.0, 2.0, 3.0, 4.0]).unwrap() - 2.5).abs() < EPSILON);
        assert!((mean(&[0.0]).unwrap()).abs() < EPSILON);
    }

    #[test]
    fn test_mean_empty_fails() {
        assert_eq!(
            mean(&[]),
            Err(TrackerError::InsufficientData {
                operation: "mean",
                required: 1,
                actual: 0
            })
        );
    }

    #[test]
    fn test_population_stddev_matches_definition() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let m = mean(&data).unwrap();
        let squares: f64 = data.iter().map(|x| (x - m).powi(2)).sum();
        let expected = (squares / data.len() as f64).sqrt();

        let actual = stddev(&data, Deviation::Population).unwrap();
        assert!((actual - expected).abs() < EPSILON);
        assert!((actual - 2.0).abs() < EPSILON);
    }

    #[test]
    fn test_sample_stddev_divides_by_n_minus_one() {
        let data = [1.0, 2.0, 3.0, 4.0];
        // Sum of squared deviations is 5.0
        let sample = stddev(&data, Deviation::Sample).unwrap();
        assert!((sample - (5.0f64 / 3.0).sqrt()).abs() < EPSILON);

        let population = stddev(&data, Deviation::default()).unwrap();
        assert!((population - (5.0f64 / 4.0).sqrt()).abs() < EPSILON);
    }

    #[test]
    fn test_stddev_needs_two_points() {
        assert!(matches!(
            stddev(&[1.0], Deviation::Population),
            Err(TrackerError::InsufficientData { required: 2, actual: 1, .. })
        ));
        assert!(stddev(&[], Deviation::Sample).is_err());
    }

    #[test]
    fn test_constant_sequence_has_zero_spread() {
        let data = [1.0; 8];
        assert!(stddev(&data, Deviation::Population).unwrap().abs() < EPSILON);
    }
}
