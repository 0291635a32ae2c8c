//! Decision tree regression on close prices shifted 100 days into the future

use crate::apps::report::{LineChart, Overview, Series, XAxis};
use crate::apps::AppSettings;
use crate::data::CandleSeries;
use crate::dataset::{as_rows, future_pairs, shuffled_split, take};
use crate::error::{ForecastError, Result};
use crate::models::{LinearRegressor, ModelScore, Regressor, TreeRegressor};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Forecast horizon in trading days
pub const FUTURE_DAYS: usize = 100;
/// Held-out share of the random split
pub const TEST_SIZE: f64 = 0.2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTreeReport {
    pub overview: Overview,
    pub future_days: usize,
    pub tree_predictions: Vec<f64>,
    pub linear_predictions: Vec<f64>,
    /// Held-out R² of both models
    pub scores: Vec<ModelScore>,
    /// Original close, the last `future_days` closes and the tree predictions aligned to them
    pub chart: LineChart,
}

pub fn analyze(series: &CandleSeries, settings: &AppSettings) -> Result<DecisionTreeReport> {
    let closes = series.closes();
    let n = closes.len();
    if n < 2 * FUTURE_DAYS {
        return Err(ForecastError::insufficient(
            "a 100-day future shift",
            2 * FUTURE_DAYS,
            n,
        ));
    }

    let (features, labels) = future_pairs(&closes, FUTURE_DAYS);
    let x = as_rows(&features);
    let split = shuffled_split(x.len(), TEST_SIZE, settings.seed)?;
    let (x_train, y_train) = (take(&x, &split.train), take(&labels, &split.train));
    let (x_test, y_test) = (take(&x, &split.test), take(&labels, &split.test));

    let tree = TreeRegressor::fit(&x_train, &y_train)?;
    let linear = LinearRegressor::fit(&x_train, &y_train)?;
    let scores = vec![
        ModelScore::r2(tree.name(), &y_test, &tree.predict(&x_test)?),
        ModelScore::r2(linear.name(), &y_test, &linear.predict(&x_test)?),
    ];

    // last 100 labelled rows: closes N-200..N-100
    let x_future = &x[x.len() - FUTURE_DAYS..];
    let tree_predictions = tree.predict(x_future)?;
    let linear_predictions = linear.predict(x_future)?;
    info!(
        rows = n,
        train = split.train.len(),
        tree_r2 = scores[0].value,
        linear_r2 = scores[1].value,
        "decision tree app finished"
    );

    let chart = LineChart::new("Stock Prices Over Time", XAxis::Dates(series.dates()))
        .labels("Days", "Closing Price USD ($)")
        .with(Series::dense("Original", &closes))
        .with(Series::tail_aligned("Valid", n, &closes[n - FUTURE_DAYS..]))
        .with(Series::tail_aligned("Predicted", n, &tree_predictions));

    Ok(DecisionTreeReport {
        overview: Overview::of(series),
        future_days: FUTURE_DAYS,
        tree_predictions,
        linear_predictions,
        scores,
        chart,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apps::test_support::trending_series;

    #[test]
    fn test_predictions_align_to_last_rows() {
        let series = trending_series(260);
        let settings = AppSettings {
            seed: Some(42),
            ..Default::default()
        };
        let report = analyze(&series, &settings).unwrap();

        assert_eq!(report.tree_predictions.len(), FUTURE_DAYS);
        assert_eq!(report.linear_predictions.len(), FUTURE_DAYS);
        assert_eq!(report.chart.series.len(), 3);
        let predicted = &report.chart.series[2];
        assert_eq!(predicted.len(), 260);
        assert!(predicted.values[..160].iter().all(Option::is_none));
        assert!(predicted.values[160..].iter().all(Option::is_some));
        assert_eq!(report.scores[1].model, "Linear Regression");
        assert!(report.scores[1].value > 0.9);
    }

    #[test]
    fn test_requires_two_horizons() {
        let err = analyze(&trending_series(150), &AppSettings::default()).unwrap_err();
        assert!(matches!(
            err,
            ForecastError::InsufficientRows { needed: 200, got: 150, .. }
        ));
    }
}
