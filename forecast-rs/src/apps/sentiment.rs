//! Headline sentiment added on top of the latest close

use crate::apps::report::{close_chart, LineChart};
use crate::data::CandleSeries;
use crate::error::{ForecastError, Result};
use crate::sentiment::{
    categorize, predicted_price, score_headlines, Headline, ScoredHeadline, SentimentCategory,
    SentimentScorer,
};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentReport {
    pub symbol: String,
    pub company: String,
    pub close_chart: LineChart,
    pub actual_price: f64,
    pub predicted_price: f64,
    pub total_polarity: f64,
    pub category: SentimentCategory,
    pub headlines: Vec<ScoredHeadline>,
}

pub fn analyze(
    series: &CandleSeries,
    company: &str,
    headlines: Vec<Headline>,
    scorer: &dyn SentimentScorer,
) -> Result<SentimentReport> {
    let actual_price = series
        .last()
        .map(|c| c.close)
        .ok_or_else(|| ForecastError::insufficient("sentiment price history", 1, 0))?;

    let fetched = headlines.len();
    let headlines = score_headlines(headlines, company, scorer);
    let polarities: Vec<f64> = headlines.iter().map(|h| h.polarity).collect();
    let predicted = predicted_price(actual_price, &polarities);
    let category = categorize(actual_price, predicted);
    info!(
        company,
        fetched,
        matched = headlines.len(),
        %category,
        "sentiment app finished"
    );

    Ok(SentimentReport {
        symbol: series.symbol().to_string(),
        company: company.to_string(),
        close_chart: close_chart(series, "Stock Data"),
        actual_price,
        predicted_price: predicted,
        total_polarity: polarities.iter().sum(),
        category,
        headlines,
    })
}
