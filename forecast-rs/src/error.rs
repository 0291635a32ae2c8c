//! Error types surfaced to the dashboard

use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a forecast interaction
#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("Ticker symbol must not be empty")]
    EmptySymbol,

    #[error("Invalid date range: start {start} must be before end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("No price data found for {symbol} between {start} and {end}")]
    EmptyHistory {
        symbol: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("Market data provider error for {symbol}: {message}")]
    Provider { symbol: String, message: String },

    #[error("Not enough rows for {what}: need {needed}, got {got}")]
    InsufficientRows {
        what: String,
        needed: usize,
        got: usize,
    },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Degenerate training data: {0}")]
    DegenerateData(String),

    #[error("Model artifact not found at {}", .0.display())]
    ModelArtifactMissing(PathBuf),

    #[error("Model failure: {0}")]
    Model(String),

    #[error("News API key is not configured (set NEWS_API_KEY)")]
    MissingNewsApiKey,

    #[error("News provider error: {0}")]
    News(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Tensor error: {0}")]
    Tensor(#[from] candle_core::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ForecastError {
    /// Shorthand for the row-count guard used by every pipeline
    pub fn insufficient(what: impl Into<String>, needed: usize, got: usize) -> Self {
        Self::InsufficientRows {
            what: what.into(),
            needed,
            got,
        }
    }

    /// Whether the error was caused by user input rather than an upstream failure
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::EmptySymbol
                | Self::InvalidDateRange { .. }
                | Self::EmptyHistory { .. }
                | Self::InsufficientRows { .. }
                | Self::InvalidParameter(_)
                | Self::DegenerateData(_)
        )
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ForecastError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_errors_are_classified() {
        assert!(ForecastError::EmptySymbol.is_user_error());
        assert!(ForecastError::insufficient("MA100", 100, 20).is_user_error());
        assert!(!ForecastError::MissingNewsApiKey.is_user_error());
        assert!(!ForecastError::Model("boom".into()).is_user_error());
    }

    #[test]
    fn test_insufficient_rows_message() {
        let err = ForecastError::insufficient("LSTM lookback window", 100, 42);
        assert_eq!(
            err.to_string(),
            "Not enough rows for LSTM lookback window: need 100, got 42"
        );
    }
}
