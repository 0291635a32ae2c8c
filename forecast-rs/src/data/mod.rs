//! Data management module
//!
//! Handles daily OHLCV history: fetching, caching and descriptive statistics.

pub mod cache;
pub mod candle;
pub mod provider;
pub mod summary;
pub mod yahoo;

pub use cache::*;
pub use candle::*;
pub use provider::*;
pub use summary::*;
pub use yahoo::*;
