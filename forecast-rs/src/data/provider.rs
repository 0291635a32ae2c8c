//! Market data provider abstraction

use crate::data::CandleSeries;
use crate::error::{ForecastError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A request for daily history: symbol plus `[start, end)` date range
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HistoryQuery {
    pub symbol: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl HistoryQuery {
    /// Build a validated query; the symbol is trimmed and upper-cased
    pub fn new(symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<Self> {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(ForecastError::EmptySymbol);
        }
        if start >= end {
            return Err(ForecastError::InvalidDateRange { start, end });
        }
        Ok(Self { symbol, start, end })
    }

    /// Error for a provider answer without rows
    pub fn empty_history(&self) -> ForecastError {
        ForecastError::EmptyHistory {
            symbol: self.symbol.clone(),
            start: self.start,
            end: self.end,
        }
    }
}

/// Source of daily OHLCV history
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Provider name, for logs
    fn name(&self) -> &str;

    /// Fetch daily history; implementations fail with `EmptyHistory` rather than return no rows
    async fn fetch(&self, query: &HistoryQuery) -> Result<CandleSeries>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_normalizes_symbol() {
        let start = NaiveDate::from_ymd_opt(2010, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2022, 12, 31).unwrap();
        let query = HistoryQuery::new("  aapl ", start, end).unwrap();
        assert_eq!(query.symbol, "AAPL");
    }

    #[test]
    fn test_query_rejects_bad_input() {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        assert!(matches!(
            HistoryQuery::new("", start, start.succ_opt().unwrap()),
            Err(ForecastError::EmptySymbol)
        ));
        assert!(matches!(
            HistoryQuery::new("AAPL", start, start),
            Err(ForecastError::InvalidDateRange { .. })
        ));
    }
}
