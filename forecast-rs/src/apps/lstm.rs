//! Pre-trained LSTM over min-max scaled closing prices

use crate::apps::report::{close_chart, LineChart, Overview, Series, XAxis};
use crate::data::CandleSeries;
use crate::dataset::{chronological_split, sliding_windows, MinMaxScaler};
use crate::error::{ForecastError, Result};
use crate::indicators::moving_averages;
use crate::models::{ModelScore, WindowPredictor};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Leading share of rows treated as training history
pub const TRAIN_FRACTION: f64 = 0.7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LstmReport {
    pub overview: Overview,
    pub close_chart: LineChart,
    pub ma100_chart: LineChart,
    pub ma200_chart: LineChart,
    pub predictor: String,
    pub lookback: usize,
    pub predicted: Vec<f64>,
    pub score: ModelScore,
    /// Testing closes against the predicted prices
    pub chart: LineChart,
}

fn moving_average_charts(series: &CandleSeries) -> Result<(LineChart, LineChart)> {
    let closes = series.closes();
    let averages = moving_averages(&closes, &[100, 200])?;
    let (ma100, ma200) = (&averages[0].1, &averages[1].1);

    let with_100 = LineChart::new(
        "Closing Price vs Time chart with 100MA",
        XAxis::Dates(series.dates()),
    )
    .labels("Date", "Price")
    .with(Series::new("MA100", ma100.clone()))
    .with(Series::dense("Close", &closes));
    let with_both = LineChart::new(
        "Closing Price vs Time chart with 100MA & 200MA",
        XAxis::Dates(series.dates()),
    )
    .labels("Date", "Price")
    .with(Series::new("MA100", ma100.clone()))
    .with(Series::new("MA200", ma200.clone()))
    .with(Series::dense("Close", &closes));
    Ok((with_100, with_both))
}

pub fn analyze(series: &CandleSeries, predictor: &dyn WindowPredictor) -> Result<LstmReport> {
    let closes = series.closes();
    let lookback = predictor.window();
    let (training, testing) = chronological_split(&closes, TRAIN_FRACTION)?;
    if training.len() < lookback {
        return Err(ForecastError::insufficient(
            "LSTM lookback in the training partition",
            lookback,
            training.len(),
        ));
    }
    if testing.is_empty() {
        return Err(ForecastError::insufficient("LSTM testing partition", 1, 0));
    }

    // the last `lookback` training closes seed the first test window
    let mut frame = training[training.len() - lookback..].to_vec();
    frame.extend_from_slice(&testing);
    let scaler = MinMaxScaler::fit_column(&frame)?;
    let scaled = scaler.transform_column(&frame);
    let (windows, _) = sliding_windows(&scaled, lookback)?;
    debug!(windows = windows.len(), lookback, "LSTM input prepared");

    let predicted = scaler.inverse_column(&predictor.predict_batch(&windows)?);
    let score = ModelScore::r2(predictor.name(), &testing, &predicted);
    info!(
        predictor = predictor.name(),
        test = testing.len(),
        r2 = score.value,
        "lstm app finished"
    );

    let chart = LineChart::new("Predictions vs Original", XAxis::Steps(testing.len()))
        .labels("Time", "Price")
        .with(Series::dense("Original Price", &testing))
        .with(Series::dense("Predicted Price", &predicted));
    let (ma100_chart, ma200_chart) = moving_average_charts(series)?;

    Ok(LstmReport {
        overview: Overview::of(series),
        close_chart: close_chart(series, "Closing Price vs Time chart"),
        ma100_chart,
        ma200_chart,
        predictor: predictor.name().to_string(),
        lookback,
        predicted,
        score,
        chart,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apps::test_support::trending_series;
    use crate::models::LastValuePredictor;

    #[test]
    fn test_last_value_predictions_are_prices() {
        let series = trending_series(400);
        let report = analyze(&series, &LastValuePredictor::new(100)).unwrap();
        let closes = series.closes();

        assert_eq!(report.predicted.len(), 120);
        // naive predictor returns the previous close once scaled back
        assert!((report.predicted[0] - closes[279]).abs() < 1e-9);
        assert!((report.predicted[119] - closes[398]).abs() < 1e-9);
        assert_eq!(report.chart.series[0].values[0], Some(closes[280]));
        assert_eq!(report.ma200_chart.series.len(), 3);
    }

    #[test]
    fn test_short_training_partition() {
        let err = analyze(&trending_series(120), &LastValuePredictor::new(100)).unwrap_err();
        assert!(matches!(
            err,
            ForecastError::InsufficientRows { needed: 100, got: 84, .. }
        ));
    }
}
