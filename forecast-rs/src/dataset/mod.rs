//! Supervised-learning dataset shaping
//!
//! Turns price columns into feature/label arrays: future-shifted labels,
//! up/down direction labels, min-max scaling, train/test splits and
//! lookback windows.

pub mod labels;
pub mod scaler;
pub mod split;
pub mod window;

pub use labels::*;
pub use scaler::*;
pub use split::*;
pub use window::*;
