//! Lookback windows for sequence models

use crate::error::{ForecastError, Result};

/// Sliding windows of `lookback` values, each paired with the value that follows it.
/// Produces `values.len() - lookback` samples.
pub fn sliding_windows(values: &[f64], lookback: usize) -> Result<(Vec<Vec<f64>>, Vec<f64>)> {
    if lookback == 0 {
        return Err(ForecastError::InvalidParameter(
            "lookback must be positive".to_string(),
        ));
    }
    if values.len() <= lookback {
        return Err(ForecastError::insufficient(
            "lookback windows",
            lookback + 1,
            values.len(),
        ));
    }

    let (windows, targets) = (lookback..values.len())
        .map(|i| (values[i - lookback..i].to_vec(), values[i]))
        .unzip();
    Ok((windows, targets))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_windows_and_targets() {
        let values: Vec<f64> = (0..6).map(f64::from).collect();
        let (x, y) = sliding_windows(&values, 3).unwrap();
        assert_eq!(x.len(), 3);
        assert_eq!(x[0], vec![0.0, 1.0, 2.0]);
        assert_eq!(y, vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_not_enough_values() {
        assert!(sliding_windows(&[1.0, 2.0], 2).is_err());
        assert!(sliding_windows(&[1.0, 2.0], 0).is_err());
    }
}
