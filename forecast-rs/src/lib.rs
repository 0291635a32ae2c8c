//! Forecast-RS: stock price forecasting demos
//!
//! This crate holds everything the dashboard computes, decoupled from how it
//! is presented:
//! - [smartcore](https://github.com/smartcorelib/smartcore) for decision trees, SVMs and linear regression
//! - [candle](https://github.com/huggingface/candle) for the LSTM and 1-D CNN
//! - [ta-rs](https://github.com/greyblake/ta-rs) for moving averages
//!
//! # Features
//!
//! - **Data Management**: daily OHLCV history from Yahoo with a TTL/LRU fetch cache
//! - **Dataset Shaping**: future-shifted labels, direction labels, min-max scaling, splits, windows
//! - **Models**: thin wrappers over library estimators with held-out metrics
//! - **Sentiment**: headline fetching and lexicon polarity scoring
//! - **Apps**: the five forecast demos, each a pure function returning a render-ready report
//!
//! # Example
//!
//! ```no_run
//! use forecast_rs::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let market = Arc::new(YahooClient::new("https://query1.finance.yahoo.com", 30)?);
//!     let dashboard = Dashboard::builder(market).build();
//!     let request = ForecastRequest::new(AppKind::DecisionTree, "AAPL");
//!     let report = dashboard.run(&request).await?;
//!     println!("{}", report.title());
//!     Ok(())
//! }
//! ```

pub mod apps;
pub mod data;
pub mod dataset;
pub mod error;
pub mod indicators;
pub mod models;
pub mod sentiment;

// Re-export commonly used types
pub mod prelude {
    pub use crate::apps::{
        compute, AppKind, AppReport, AppSettings, Dashboard, DashboardBuilder,
        DecisionTreeReport, ForecastRequest, LineChart, LinearCnnReport, LstmReport, Overview,
        SentimentReport, Series, SvmReport, XAxis,
    };
    pub use crate::data::*;
    pub use crate::dataset::*;
    pub use crate::error::*;
    pub use crate::indicators::*;
    pub use crate::models::*;
    pub use crate::sentiment::*;
}

pub use error::{ForecastError, Result};
