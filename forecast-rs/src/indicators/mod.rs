//! Technical indicators module
//!
//! Provides technical analysis indicators using the `ta` crate.

pub mod sma;

pub use sma::*;

/// Streaming indicator fed one value at a time
pub trait Indicator {
    /// Update indicator with new value
    fn update(&mut self, value: f64);

    /// Current value; `None` until enough values have been seen
    fn value(&self) -> Option<f64>;
}
