//! SMA (Simple Moving Average) indicator

use crate::error::{ForecastError, Result};
use crate::indicators::Indicator;
use ta::indicators::SimpleMovingAverage;
use ta::Next;

/// SMA indicator wrapper
#[derive(Debug)]
pub struct SMA {
    inner: SimpleMovingAverage,
    period: usize,
    update_count: usize,
    last_value: Option<f64>,
}

impl SMA {
    /// Create new SMA indicator
    pub fn new(period: usize) -> Result<Self> {
        let inner = SimpleMovingAverage::new(period).map_err(|e| {
            ForecastError::InvalidParameter(format!("SMA period {period}: {e:?}"))
        })?;
        Ok(Self {
            inner,
            period,
            update_count: 0,
            last_value: None,
        })
    }
}

impl Indicator for SMA {
    fn update(&mut self, value: f64) {
        let sma_value = self.inner.next(value);
        self.update_count += 1;
        if self.update_count >= self.period {
            self.last_value = Some(sma_value);
        }
    }

    fn value(&self) -> Option<f64> {
        self.last_value
    }
}

/// Calculate SMA from a series of values; the first `period - 1` entries are `None`
pub fn calculate_sma(values: &[f64], period: usize) -> Result<Vec<Option<f64>>> {
    let mut sma = SMA::new(period)?;
    let mut results = Vec::with_capacity(values.len());

    for &value in values {
        sma.update(value);
        results.push(sma.value());
    }

    Ok(results)
}

/// Trailing moving averages of closing prices, e.g. MA100 and MA200
pub fn moving_averages(closes: &[f64], periods: &[usize]) -> Result<Vec<(usize, Vec<Option<f64>>)>> {
    periods
        .iter()
        .map(|&p| calculate_sma(closes, p).map(|ma| (p, ma)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ma100_over_linear_closes() {
        let closes: Vec<f64> = (0..110).map(|i| 50.0 + i as f64 * 0.5).collect();
        let ma = calculate_sma(&closes, 100).unwrap();

        assert_eq!(ma.len(), 110);
        assert!(ma[..99].iter().all(|v| v.is_none()));
        let expected = closes[..100].iter().sum::<f64>() / 100.0;
        assert!((ma[99].unwrap() - expected).abs() < 1e-9);
        let expected_last = closes[10..110].iter().sum::<f64>() / 100.0;
        assert!((ma[109].unwrap() - expected_last).abs() < 1e-9);
    }

    #[test]
    fn test_zero_period_is_rejected() {
        assert!(SMA::new(0).is_err());
    }

    #[test]
    fn test_short_series_never_ready() {
        let ma = calculate_sma(&[1.0, 2.0, 3.0], 5).unwrap();
        assert!(ma.iter().all(|v| v.is_none()));
    }
}
