//! Min-max feature scaling

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};

/// Per-column min-max scaler mapping each feature into `feature_range`.
/// Constant columns get a unit scale so they map onto the range minimum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    feature_range: (f64, f64),
    data_min: Vec<f64>,
    data_max: Vec<f64>,
    scale: Vec<f64>,
    min: Vec<f64>,
}

impl MinMaxScaler {
    /// Fit on row-major data into `[0, 1]`
    pub fn fit(rows: &[Vec<f64>]) -> Result<Self> {
        Self::fit_with_range(rows, (0.0, 1.0))
    }

    /// Fit on row-major data into a custom range
    pub fn fit_with_range(rows: &[Vec<f64>], feature_range: (f64, f64)) -> Result<Self> {
        let (lo, hi) = feature_range;
        if lo >= hi {
            return Err(ForecastError::InvalidParameter(format!(
                "feature range ({lo}, {hi}) is empty"
            )));
        }
        let width = rows.first().map(Vec::len).ok_or_else(|| {
            ForecastError::insufficient("min-max scaling", 1, 0)
        })?;

        let mut data_min = vec![f64::INFINITY; width];
        let mut data_max = vec![f64::NEG_INFINITY; width];
        for row in rows {
            check_width(row, width)?;
            for (j, v) in row.iter().enumerate() {
                data_min[j] = data_min[j].min(*v);
                data_max[j] = data_max[j].max(*v);
            }
        }

        let scale: Vec<f64> = data_min
            .iter()
            .zip(&data_max)
            .map(|(mn, mx)| {
                let span = mx - mn;
                if span == 0.0 {
                    hi - lo
                } else {
                    (hi - lo) / span
                }
            })
            .collect();
        let min = data_min.iter().zip(&scale).map(|(mn, s)| lo - mn * s).collect();

        Ok(Self {
            feature_range,
            data_min,
            data_max,
            scale,
            min,
        })
    }

    /// Fit a scaler on a single column
    pub fn fit_column(values: &[f64]) -> Result<Self> {
        Self::fit(&as_rows(values))
    }

    /// Fit, then transform the same data
    pub fn fit_transform(rows: &[Vec<f64>]) -> Result<(Self, Vec<Vec<f64>>)> {
        let scaler = Self::fit(rows)?;
        let scaled = scaler.transform(rows)?;
        Ok((scaler, scaled))
    }

    /// Scale rows into the feature range
    pub fn transform(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        rows.iter()
            .map(|row| {
                check_width(row, self.width())?;
                Ok(row
                    .iter()
                    .enumerate()
                    .map(|(j, v)| v * self.scale[j] + self.min[j])
                    .collect())
            })
            .collect()
    }

    /// Undo [`MinMaxScaler::transform`]
    pub fn inverse_transform(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        rows.iter()
            .map(|row| {
                check_width(row, self.width())?;
                Ok(row
                    .iter()
                    .enumerate()
                    .map(|(j, v)| (v - self.min[j]) / self.scale[j])
                    .collect())
            })
            .collect()
    }

    /// Scale a single column with the first fitted feature
    pub fn transform_column(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|v| v * self.scale[0] + self.min[0]).collect()
    }

    /// Undo [`MinMaxScaler::transform_column`]
    pub fn inverse_column(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|v| (v - self.min[0]) / self.scale[0]).collect()
    }

    /// Number of fitted features
    pub fn width(&self) -> usize {
        self.scale.len()
    }

    /// Multiplicative factor per feature
    pub fn scale(&self) -> &[f64] {
        &self.scale
    }

    /// Observed minimum per feature
    pub fn data_min(&self) -> &[f64] {
        &self.data_min
    }

    /// Observed maximum per feature
    pub fn data_max(&self) -> &[f64] {
        &self.data_max
    }

    /// Target range
    pub fn feature_range(&self) -> (f64, f64) {
        self.feature_range
    }
}

fn check_width(row: &[f64], width: usize) -> Result<()> {
    if row.len() != width {
        return Err(ForecastError::InvalidParameter(format!(
            "expected {width} features, got {}",
            row.len()
        )));
    }
    Ok(())
}

/// Wrap a column as single-feature rows
pub fn as_rows(values: &[f64]) -> Vec<Vec<f64>> {
    values.iter().map(|v| vec![*v]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix() -> Vec<Vec<f64>> {
        vec![
            vec![1.0, -5.0, 7.0],
            vec![3.0, 10.0, 7.0],
            vec![2.0, 0.0, 7.0],
            vec![9.5, 2.5, 7.0],
        ]
    }

    #[test]
    fn test_transform_into_unit_range() {
        let (scaler, scaled) = MinMaxScaler::fit_transform(&matrix()).unwrap();
        assert_eq!(scaled[0][0], 0.0);
        assert_eq!(scaled[3][0], 1.0);
        assert_eq!(scaled[1][1], 1.0);
        // constant column maps to the lower bound
        assert!(scaled.iter().all(|r| r[2] == 0.0));
        assert_eq!(scaler.scale()[2], 1.0);
    }

    #[test]
    fn test_inverse_transform_round_trip() {
        let data = matrix();
        let (scaler, scaled) = MinMaxScaler::fit_transform(&data).unwrap();
        let restored = scaler.inverse_transform(&scaled).unwrap();
        for (orig, back) in data.iter().zip(&restored) {
            for (a, b) in orig.iter().zip(back) {
                assert!((a - b).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_column_helpers() {
        let closes = [100.0, 150.0, 125.0, 200.0];
        let scaler = MinMaxScaler::fit_column(&closes).unwrap();
        let scaled = scaler.transform_column(&closes);
        assert_eq!(scaled, vec![0.0, 0.5, 0.25, 1.0]);
        assert_eq!(scaler.inverse_column(&[0.75]), vec![175.0]);
        assert_eq!(scaler.scale()[0], 0.01);
    }

    #[test]
    fn test_width_mismatch() {
        let scaler = MinMaxScaler::fit(&matrix()).unwrap();
        assert!(scaler.transform(&[vec![1.0]]).is_err());
        assert!(MinMaxScaler::fit(&[]).is_err());
    }
}
