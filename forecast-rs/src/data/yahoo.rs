//! Yahoo Finance chart API client
//!
//! Fetches daily OHLCV history for a symbol between two dates. The end date is
//! exclusive, like the usual dataframe download helpers.

use crate::data::{Candle, CandleSeries, HistoryQuery, MarketDataProvider};
use crate::error::{ForecastError, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime};
use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct YahooResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteData>,
    #[serde(default)]
    adjclose: Vec<AdjCloseData>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Default, Deserialize)]
struct AdjCloseData {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

/// Yahoo Finance client
#[derive(Debug, Clone)]
pub struct YahooClient {
    base_url: String,
    client: reqwest::Client,
}

impl YahooClient {
    /// Create a new Yahoo Finance client
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("Mozilla/5.0")
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Chart endpoint for the query; the symbol is a single percent-encoded path segment
    fn chart_url(&self, query: &HistoryQuery) -> Result<Url> {
        let bad_base = || {
            ForecastError::InvalidParameter(format!("invalid Yahoo base URL '{}'", self.base_url))
        };
        let mut url = Url::parse(&self.base_url).map_err(|_| bad_base())?;
        url.path_segments_mut()
            .map_err(|_| bad_base())?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", query.symbol.as_str()]);
        url.query_pairs_mut()
            .append_pair("interval", "1d")
            .append_pair("period1", &day_start_timestamp(query.start).to_string())
            .append_pair("period2", &day_start_timestamp(query.end).to_string())
            .append_pair("events", "history")
            .append_pair("includeAdjustedClose", "true");
        Ok(url)
    }
}

#[async_trait]
impl MarketDataProvider for YahooClient {
    fn name(&self) -> &str {
        "yahoo"
    }

    async fn fetch(&self, query: &HistoryQuery) -> Result<CandleSeries> {
        let url = self.chart_url(query)?;
        info!("Fetching Yahoo data from: {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(%status, bytes = body.len(), "Yahoo response received");

        // Unknown symbols come back as 404 with a JSON error body, so parse before checking status
        match parse_chart(query, &body) {
            Err(ForecastError::Decode(err)) if !status.is_success() => Err(ForecastError::Provider {
                symbol: query.symbol.clone(),
                message: format!("HTTP {status}: {err}"),
            }),
            other => other,
        }
    }
}

fn day_start_timestamp(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

fn value_at(values: &[Option<f64>], i: usize) -> f64 {
    values.get(i).copied().flatten().unwrap_or(f64::NAN)
}

/// Decode a chart API body into a series; rows without a close are skipped
pub fn parse_chart(query: &HistoryQuery, body: &str) -> Result<CandleSeries> {
    let response: YahooResponse = serde_json::from_str(body)?;

    if let Some(error) = response.chart.error {
        if error.code.eq_ignore_ascii_case("Not Found") {
            return Err(query.empty_history());
        }
        return Err(ForecastError::Provider {
            symbol: query.symbol.clone(),
            message: format!("{} - {}", error.code, error.description),
        });
    }

    let Some(result) = response.chart.result.and_then(|r| r.into_iter().next()) else {
        return Err(query.empty_history());
    };

    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let adjclose = result
        .indicators
        .adjclose
        .into_iter()
        .next()
        .unwrap_or_default()
        .adjclose;

    let mut series = CandleSeries::new(query.symbol.clone());
    for (i, &ts) in result.timestamp.iter().enumerate() {
        let Some(date) = DateTime::from_timestamp(ts, 0).map(|dt| dt.date_naive()) else {
            continue;
        };
        let close = value_at(&quote.close, i);
        if !close.is_finite() {
            continue;
        }
        let adj_close = match adjclose.get(i).copied().flatten() {
            Some(v) => v,
            None if adjclose.is_empty() => close,
            None => f64::NAN,
        };
        series.push(Candle::new(
            date,
            value_at(&quote.open, i),
            value_at(&quote.high, i),
            value_at(&quote.low, i),
            close,
            adj_close,
            value_at(&quote.volume, i),
        ));
    }
    series.sort_by_time();

    if series.is_empty() {
        return Err(query.empty_history());
    }
    info!("Fetched {} data points for {}", series.len(), query.symbol);
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query() -> HistoryQuery {
        HistoryQuery::new(
            "AAPL",
            NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2022, 2, 1).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_parse_chart_rows() {
        let body = r#"{"chart":{"result":[{"timestamp":[1641220200,1641306600,1641393000],
            "indicators":{"quote":[{"open":[177.83,182.63,null],"high":[182.88,182.94,180.17],
            "low":[177.71,179.12,174.64],"close":[182.01,179.70,null],
            "volume":[104487900,99310400,94537600]}],
            "adjclose":[{"adjclose":[179.95,177.66,null]}]}}],"error":null}}"#;
        let series = parse_chart(&query(), body).unwrap();
        assert_eq!(series.len(), 2);
        let first = series.get(0).unwrap();
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2022, 1, 3).unwrap());
        assert_eq!(first.close, 182.01);
        assert_eq!(first.adj_close, 179.95);
        assert_eq!(first.volume, 104487900.0);
    }

    #[test]
    fn test_parse_chart_unknown_symbol() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let err = parse_chart(&query(), body).unwrap_err();
        assert!(matches!(err, ForecastError::EmptyHistory { .. }));
    }

    #[test]
    fn test_parse_chart_empty_result() {
        let body = r#"{"chart":{"result":[{"timestamp":[],"indicators":{"quote":[{}]}}],"error":null}}"#;
        let err = parse_chart(&query(), body).unwrap_err();
        assert!(matches!(err, ForecastError::EmptyHistory { .. }));
    }

    #[test]
    fn test_chart_url_uses_exclusive_end() {
        let client = YahooClient::new("https://query1.finance.yahoo.com/", 5).unwrap();
        let url = client.chart_url(&query()).unwrap().to_string();
        assert!(url.starts_with("https://query1.finance.yahoo.com/v8/finance/chart/AAPL?"));
        assert!(url.contains("period1=1640995200"));
        assert!(url.contains("period2=1643673600"));
    }

    #[test]
    fn test_chart_url_encodes_symbol() {
        let client = YahooClient::new("https://query1.finance.yahoo.com", 5).unwrap();
        let start = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2022, 2, 1).unwrap();

        let url = client
            .chart_url(&HistoryQuery::new("x/y", start, end).unwrap())
            .unwrap();
        assert_eq!(url.path(), "/v8/finance/chart/X%2FY");

        for symbol in ["A&period1=0", "A?interval=1wk"] {
            let url = client
                .chart_url(&HistoryQuery::new(symbol, start, end).unwrap())
                .unwrap();
            let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
            let period1: Vec<_> = pairs.iter().filter(|(k, _)| k == "period1").collect();
            assert_eq!(period1.len(), 1);
            assert_eq!(period1[0].1, "1640995200");
            let interval: Vec<_> = pairs.iter().filter(|(k, _)| k == "interval").collect();
            assert_eq!(interval.len(), 1);
            assert_eq!(interval[0].1, "1d");
        }
    }
}
