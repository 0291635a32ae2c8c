//! Support-vector classification of next-day direction and the strategy it implies

use crate::apps::report::{LineChart, Overview, Series, XAxis};
use crate::data::CandleSeries;
use crate::dataset::{boundary, cumsum, direction_labels, pct_change};
use crate::error::{ForecastError, Result};
use crate::models::{svc_fit_predict, ModelScore};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Leading share of rows used for training
pub const SPLIT_FRACTION: f64 = 0.1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SvmReport {
    pub overview: Overview,
    pub train_rows: usize,
    /// Raw test-partition predictions (0 = down, 1 = up)
    pub predictions: Vec<u8>,
    pub score: ModelScore,
    /// Cumulative buy-and-hold return against the cumulative strategy return
    pub chart: LineChart,
}

/// Strategy return for day `i` is the day's return times the previous day's signal
pub fn strategy_returns(returns: &[Option<f64>], signal: &[u8]) -> Vec<Option<f64>> {
    (0..returns.len())
        .map(|i| {
            let prev = i.checked_sub(1).and_then(|p| signal.get(p))?;
            returns[i].map(|r| r * f64::from(*prev))
        })
        .collect()
}

pub fn analyze(series: &CandleSeries) -> Result<SvmReport> {
    let clean = series.drop_incomplete();
    let candles = clean.candles();
    let closes = clean.closes();
    // the last row has no successor to label
    let labelled = candles.len().saturating_sub(1);
    let features: Vec<Vec<f64>> = candles[..labelled]
        .iter()
        .map(|c| vec![c.open_close(), c.range()])
        .collect();
    let labels: Vec<u8> = direction_labels(&closes).into_iter().flatten().collect();

    let split = boundary(labelled, SPLIT_FRACTION);
    if split < 2 {
        return Err(ForecastError::insufficient("SVM training partition", 2, split));
    }
    if split == labelled {
        return Err(ForecastError::insufficient("SVM test partition", 1, 0));
    }

    let predictions = svc_fit_predict(&features[..split], &labels[..split], &features[split..])?;
    let score = ModelScore::accuracy("SVC", &labels[split..], &predictions);

    let mut signal = vec![0u8; split];
    signal.extend_from_slice(&predictions);

    let returns = pct_change(&closes[..labelled]);
    let strategy = strategy_returns(&returns, &signal);
    let dates = clean.dates()[..labelled].to_vec();
    let chart = LineChart::new("Cumulative Returns", XAxis::Dates(dates))
        .labels("Date", "Cumulative Returns")
        .with(Series::new("Buy and Hold", cumsum(&returns)))
        .with(Series::new("SVM Strategy", cumsum(&strategy)));

    info!(
        rows = labelled,
        dropped = series.len() - clean.len(),
        train = split,
        accuracy = score.value,
        "svm app finished"
    );

    Ok(SvmReport {
        overview: Overview::of(series),
        train_rows: split,
        predictions,
        score,
        chart,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apps::test_support::trending_series;

    #[test]
    fn test_strategy_uses_previous_signal() {
        let returns = vec![None, Some(0.1), Some(-0.05), Some(0.02)];
        let strategy = strategy_returns(&returns, &[1, 0, 1, 1]);
        assert_eq!(strategy, vec![None, Some(0.1), Some(-0.0), Some(0.02)]);
    }

    #[test]
    fn test_report_shapes() {
        let series = trending_series(120);
        let report = analyze(&series).unwrap();
        assert_eq!(report.train_rows, 11);
        assert_eq!(report.predictions.len(), 119 - 11);
        assert_eq!(report.chart.series[0].len(), 119);
        assert_eq!(report.chart.series[1].values[0], None);
        assert!(report.score.value >= 0.0 && report.score.value <= 1.0);
    }

    #[test]
    fn test_incomplete_rows_are_dropped() {
        let mut candles = trending_series(120).candles().to_vec();
        candles[5].open = f64::NAN;
        candles[40].high = f64::NAN;
        let series = CandleSeries::from_vec("TEST", candles);

        let report = analyze(&series).unwrap();
        // 118 complete rows, 117 of them labelled
        assert_eq!(report.train_rows, 11);
        assert_eq!(report.predictions.len(), 117 - 11);
        assert_eq!(report.chart.series[0].len(), 117);
        assert!(report.score.value.is_finite());
        assert_eq!(report.overview.rows, 120);
    }

    #[test]
    fn test_too_few_rows() {
        assert!(matches!(
            analyze(&trending_series(15)),
            Err(ForecastError::InsufficientRows { .. })
        ));
    }
}
