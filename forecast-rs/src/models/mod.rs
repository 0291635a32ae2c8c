//! Model wrappers
//!
//! Thin adapters around smartcore (tree, linear regression, SVC) and candle
//! (LSTM inference, convolutional regressor) with a shared error type.

pub mod cnn;
pub mod lstm;
pub mod metrics;
pub mod regression;
pub mod svm;

pub use cnn::*;
pub use lstm::*;
pub use metrics::*;
pub use regression::*;
pub use svm::*;

use crate::error::Result;

/// Fitted model mapping feature rows to one value each
pub trait Regressor {
    fn name(&self) -> &str;

    fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>>;
}
