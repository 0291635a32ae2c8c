//! Daily OHLCV candle data structures

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One trading day of OHLCV data
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Trading day
    pub date: NaiveDate,
    /// Opening price
    pub open: f64,
    /// High price
    pub high: f64,
    /// Low price
    pub low: f64,
    /// Closing price
    pub close: f64,
    /// Close adjusted for splits and dividends
    pub adj_close: f64,
    /// Volume
    pub volume: f64,
}

impl Candle {
    /// Create a new candle
    pub fn new(
        date: NaiveDate,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        adj_close: f64,
        volume: f64,
    ) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            adj_close,
            volume,
        }
    }

    /// Open minus close
    pub fn open_close(&self) -> f64 {
        self.open - self.close
    }

    /// Get total range (high - low)
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// Value of a single column
    pub fn get(&self, column: Column) -> f64 {
        match column {
            Column::Open => self.open,
            Column::High => self.high,
            Column::Low => self.low,
            Column::Close => self.close,
            Column::AdjClose => self.adj_close,
            Column::Volume => self.volume,
        }
    }

    /// True when every numeric field holds a finite value
    pub fn is_complete(&self) -> bool {
        Column::ALL.iter().all(|c| self.get(*c).is_finite())
    }
}

/// Numeric columns of the price-history table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Column {
    Open,
    High,
    Low,
    Close,
    AdjClose,
    Volume,
}

impl Column {
    /// All columns in table order
    pub const ALL: [Column; 6] = [
        Column::Open,
        Column::High,
        Column::Low,
        Column::Close,
        Column::AdjClose,
        Column::Volume,
    ];

    /// Display name, matching the provider's table headers
    pub fn name(&self) -> &'static str {
        match self {
            Column::Open => "Open",
            Column::High => "High",
            Column::Low => "Low",
            Column::Close => "Close",
            Column::AdjClose => "Adj Close",
            Column::Volume => "Volume",
        }
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Price history for one symbol, oldest first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandleSeries {
    symbol: String,
    candles: Vec<Candle>,
}

impl CandleSeries {
    /// Create new empty series
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            candles: Vec::new(),
        }
    }

    /// Create from vector of candles
    pub fn from_vec(symbol: impl Into<String>, candles: Vec<Candle>) -> Self {
        Self {
            symbol: symbol.into(),
            candles,
        }
    }

    /// Ticker symbol
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Add a candle
    pub fn push(&mut self, candle: Candle) {
        self.candles.push(candle);
    }

    /// Get number of candles
    pub fn len(&self) -> usize {
        self.candles.len()
    }

    /// Check if series is empty
    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// Get candle at index
    pub fn get(&self, index: usize) -> Option<&Candle> {
        self.candles.get(index)
    }

    /// Get last candle
    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    /// Get all candles
    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    /// First `n` rows
    pub fn head(&self, n: usize) -> &[Candle] {
        &self.candles[..n.min(self.candles.len())]
    }

    /// Values of one column
    pub fn column(&self, column: Column) -> Vec<f64> {
        self.candles.iter().map(|c| c.get(column)).collect()
    }

    /// Get close prices as vector
    pub fn closes(&self) -> Vec<f64> {
        self.column(Column::Close)
    }

    /// Trading days as vector
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.candles.iter().map(|c| c.date).collect()
    }

    /// Copy of the series without rows holding missing values
    pub fn drop_incomplete(&self) -> Self {
        Self {
            symbol: self.symbol.clone(),
            candles: self
                .candles
                .iter()
                .filter(|c| c.is_complete())
                .copied()
                .collect(),
        }
    }

    /// Sort by date (oldest first)
    pub fn sort_by_time(&mut self) {
        self.candles.sort_by_key(|c| c.date);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, 3, d).unwrap()
    }

    #[test]
    fn test_drop_incomplete_removes_nan_rows() {
        let series = CandleSeries::from_vec(
            "AAPL",
            vec![
                Candle::new(day(1), 1.0, 2.0, 0.5, 1.5, 1.5, 100.0),
                Candle::new(day(2), f64::NAN, 2.0, 0.5, 1.5, 1.5, 100.0),
                Candle::new(day(3), 1.0, 2.0, 0.5, 1.7, 1.7, 120.0),
            ],
        );
        let clean = series.drop_incomplete();
        assert_eq!(clean.len(), 2);
        assert_eq!(clean.dates(), vec![day(1), day(3)]);
        assert_eq!(clean.symbol(), "AAPL");
    }

    #[test]
    fn test_sort_and_head() {
        let mut series = CandleSeries::new("MSFT");
        series.push(Candle::new(day(3), 3.0, 3.0, 3.0, 3.0, 3.0, 3.0));
        series.push(Candle::new(day(1), 1.0, 1.0, 1.0, 1.0, 1.0, 1.0));
        series.push(Candle::new(day(2), 2.0, 2.0, 2.0, 2.0, 2.0, 2.0));
        series.sort_by_time();
        assert_eq!(series.closes(), vec![1.0, 2.0, 3.0]);
        assert_eq!(series.head(2).len(), 2);
        assert_eq!(series.head(10).len(), 3);
    }

    #[test]
    fn test_candle_spreads() {
        let candle = Candle::new(day(1), 100.0, 110.0, 95.0, 105.0, 104.0, 1000.0);
        assert_eq!(candle.open_close(), -5.0);
        assert_eq!(candle.range(), 15.0);
        assert_eq!(candle.get(Column::AdjClose), 104.0);
        assert_eq!(Column::AdjClose.name(), "Adj Close");
    }
}
