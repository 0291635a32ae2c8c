//! Linear regression and a 1-D CNN on the columns most correlated with the close

use crate::apps::report::{LineChart, Overview, Series, XAxis};
use crate::apps::AppSettings;
use crate::data::{missing_percentages, CandleSeries, Column, CorrelationMatrix, MissingShare};
use crate::dataset::{ordered_split, take, MinMaxScaler};
use crate::error::{ForecastError, Result};
use crate::models::{ConvRegressor, LinearRegressor, ModelScore, Regressor};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Minimum absolute correlation with the close for a column to become a feature
pub const CORRELATION_THRESHOLD: f64 = 0.6;
/// Trailing share of rows held out
pub const TEST_SIZE: f64 = 0.4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearCnnReport {
    /// Overview of the table after incomplete rows were dropped
    pub overview: Overview,
    pub dropped_rows: usize,
    /// Missing share per column before the drop
    pub missing: Vec<MissingShare>,
    pub correlation: CorrelationMatrix,
    pub features: Vec<Column>,
    pub scores: Vec<ModelScore>,
    pub linear_chart: LineChart,
    pub cnn_chart: LineChart,
}

/// Feature columns: correlated with the close beyond the threshold, close excluded
pub fn select_features(correlation: &CorrelationMatrix) -> Result<Vec<Column>> {
    let features: Vec<Column> = correlation
        .correlated_with(Column::Close, CORRELATION_THRESHOLD)
        .into_iter()
        .filter(|c| *c != Column::Close)
        .collect();
    if features.is_empty() {
        return Err(ForecastError::DegenerateData(format!(
            "no column correlates with Close above {CORRELATION_THRESHOLD}"
        )));
    }
    Ok(features)
}

fn comparison_chart(truth: &[f64], name: &str, predicted: &[f64]) -> LineChart {
    LineChart::new(format!("True vs {name}"), XAxis::Steps(truth.len()))
        .labels("Time", "Price")
        .with(Series::dense("True", truth))
        .with(Series::dense(name, predicted))
}

pub fn analyze(series: &CandleSeries, settings: &AppSettings) -> Result<LinearCnnReport> {
    let missing = missing_percentages(series);
    let clean = series.drop_incomplete();
    let dropped_rows = series.len() - clean.len();
    if dropped_rows > 0 {
        warn!(dropped_rows, "dropped incomplete rows");
    }

    let correlation = CorrelationMatrix::compute(&clean, &Column::ALL);
    let features = select_features(&correlation)?;

    let x: Vec<Vec<f64>> = clean
        .candles()
        .iter()
        .map(|c| features.iter().map(|f| c.get(*f)).collect())
        .collect();
    let y = clean.closes();
    let split = ordered_split(x.len(), TEST_SIZE)?;
    let (_, x) = MinMaxScaler::fit_transform(&x)?;
    let (x_train, y_train) = (take(&x, &split.train), take(&y, &split.train));
    let (x_test, y_test) = (take(&x, &split.test), take(&y, &split.test));

    let linear = LinearRegressor::fit(&x_train, &y_train)?;
    let linear_pred = linear.predict(&x_test)?;
    let cnn = ConvRegressor::fit(&x_train, &y_train, &settings.cnn_config())?;
    let cnn_pred = cnn.predict(&x_test)?;

    let scores = vec![
        ModelScore::r2(linear.name(), &y_test, &linear_pred),
        ModelScore::r2(cnn.name(), &y_test, &cnn_pred),
    ];
    info!(
        features = features.len(),
        train = split.train.len(),
        linear_r2 = scores[0].value,
        cnn_r2 = scores[1].value,
        "linear/cnn app finished"
    );

    Ok(LinearCnnReport {
        overview: Overview::of(&clean),
        dropped_rows,
        missing,
        correlation,
        features,
        linear_chart: comparison_chart(&y_test, linear.name(), &linear_pred),
        cnn_chart: comparison_chart(&y_test, cnn.name(), &cnn_pred),
        scores,
    })
}
