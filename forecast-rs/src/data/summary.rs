//! Descriptive statistics over a price-history table

use crate::data::{CandleSeries, Column};
use serde::{Deserialize, Serialize};

/// Count, mean, spread and quartiles of one column (missing values skipped)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnStats {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub q50: f64,
    pub q75: f64,
    pub max: f64,
}

impl ColumnStats {
    /// Describe a slice of values
    pub fn from_values(column: impl Into<String>, values: &[f64]) -> Self {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let count = sorted.len();

        let (mean, std) = mean_std(&sorted);
        Self {
            column: column.into(),
            count,
            mean,
            std,
            min: sorted.first().copied().unwrap_or(f64::NAN),
            q25: quantile(&sorted, 0.25),
            q50: quantile(&sorted, 0.50),
            q75: quantile(&sorted, 0.75),
            max: sorted.last().copied().unwrap_or(f64::NAN),
        }
    }
}

/// Mean and sample standard deviation
fn mean_std(values: &[f64]) -> (f64, f64) {
    let n = values.len();
    if n == 0 {
        return (f64::NAN, f64::NAN);
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    if n < 2 {
        return (mean, f64::NAN);
    }
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    (mean, var.sqrt())
}

/// Linear-interpolated quantile of an ascending slice
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Describe every column of the table
pub fn describe(series: &CandleSeries) -> Vec<ColumnStats> {
    Column::ALL
        .iter()
        .map(|c| ColumnStats::from_values(c.name(), &series.column(*c)))
        .collect()
}

/// Share of missing values in one column, as a percentage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingShare {
    pub column: String,
    pub percent: f64,
}

/// Percentage of missing values per column
pub fn missing_percentages(series: &CandleSeries) -> Vec<MissingShare> {
    Column::ALL
        .iter()
        .map(|c| {
            let values = series.column(*c);
            let missing = values.iter().filter(|v| !v.is_finite()).count();
            let percent = if values.is_empty() {
                0.0
            } else {
                missing as f64 / values.len() as f64 * 100.0
            };
            MissingShare {
                column: c.name().to_string(),
                percent,
            }
        })
        .collect()
}

/// Pearson correlation between two columns over rows where both are present
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .map(|(x, y)| (*x, *y))
        .collect();
    let n = pairs.len();
    if n < 2 {
        return f64::NAN;
    }
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n as f64;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n as f64;
    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in &pairs {
        cov += (x - mean_x) * (y - mean_y);
        var_x += (x - mean_x).powi(2);
        var_y += (y - mean_y).powi(2);
    }
    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }
    cov / (var_x.sqrt() * var_y.sqrt())
}

/// Square correlation matrix with labelled rows and columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<Column>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    /// Compute pairwise correlations between the given columns
    pub fn compute(series: &CandleSeries, columns: &[Column]) -> Self {
        let data: Vec<Vec<f64>> = columns.iter().map(|c| series.column(*c)).collect();
        let values = data
            .iter()
            .map(|a| data.iter().map(|b| pearson(a, b)).collect())
            .collect();
        Self {
            columns: columns.to_vec(),
            values,
        }
    }

    /// Correlation between two columns, if both are in the matrix
    pub fn get(&self, a: Column, b: Column) -> Option<f64> {
        let i = self.columns.iter().position(|c| *c == a)?;
        let j = self.columns.iter().position(|c| *c == b)?;
        Some(self.values[i][j])
    }

    /// Columns whose absolute correlation with `target` exceeds `threshold`, target included
    pub fn correlated_with(&self, target: Column, threshold: f64) -> Vec<Column> {
        self.columns
            .iter()
            .copied()
            .filter(|c| {
                self.get(*c, target)
                    .map(|v| v.abs() > threshold)
                    .unwrap_or(false)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Candle;
    use chrono::{Duration, NaiveDate};

    fn series(n: usize) -> CandleSeries {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let candles = (0..n)
            .map(|i| {
                let p = 10.0 + i as f64;
                let volume = if i % 2 == 0 { 500.0 } else { 100.0 };
                Candle::new(start + Duration::days(i as i64), p, p + 1.0, p - 1.0, p, p, volume)
            })
            .collect();
        CandleSeries::from_vec("TEST", candles)
    }

    #[test]
    fn test_describe_matches_dataframe_semantics() {
        let stats = ColumnStats::from_values("x", &[1.0, 2.0, 3.0, 4.0, f64::NAN]);
        assert_eq!(stats.count, 4);
        assert_eq!(stats.mean, 2.5);
        assert!((stats.std - 1.2909944487358056).abs() < 1e-12);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.q25, 1.75);
        assert_eq!(stats.q50, 2.5);
        assert_eq!(stats.q75, 3.25);
        assert_eq!(stats.max, 4.0);
    }

    #[test]
    fn test_describe_covers_all_columns() {
        let stats = describe(&series(10));
        assert_eq!(stats.len(), 6);
        assert_eq!(stats[3].column, "Close");
        assert_eq!(stats[3].count, 10);
    }

    #[test]
    fn test_missing_percentages() {
        let mut s = series(4);
        s.push(Candle::new(
            NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
            f64::NAN,
            1.0,
            1.0,
            1.0,
            1.0,
            1.0,
        ));
        let missing = missing_percentages(&s);
        assert_eq!(missing[0].column, "Open");
        assert_eq!(missing[0].percent, 20.0);
        assert_eq!(missing[1].percent, 0.0);
    }

    #[test]
    fn test_correlation_selection() {
        let matrix = CorrelationMatrix::compute(&series(20), &Column::ALL);
        assert!((matrix.get(Column::Open, Column::Close).unwrap() - 1.0).abs() < 1e-12);
        let selected = matrix.correlated_with(Column::Close, 0.6);
        assert!(selected.contains(&Column::Close));
        assert!(selected.contains(&Column::High));
        assert!(!selected.contains(&Column::Volume));
    }

    #[test]
    fn test_pearson_constant_is_nan() {
        assert!(pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).is_nan());
    }
}
