//! Held-out evaluation metrics

use serde::{Deserialize, Serialize};

/// Coefficient of determination. A constant target scores 1.0 when matched
/// exactly and 0.0 otherwise; mismatched or empty inputs give `NaN`.
pub fn r2(y_true: &[f64], y_pred: &[f64]) -> f64 {
    let n = y_true.len();
    if n == 0 || n != y_pred.len() {
        return f64::NAN;
    }
    let mean = y_true.iter().sum::<f64>() / n as f64;
    let ss_tot: f64 = y_true.iter().map(|t| (t - mean).powi(2)).sum();
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p).powi(2))
        .sum();

    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

/// Share of exactly matching labels, in `[0, 1]`
pub fn accuracy<T: PartialEq>(y_true: &[T], y_pred: &[T]) -> f64 {
    if y_true.is_empty() || y_true.len() != y_pred.len() {
        return f64::NAN;
    }
    let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    correct as f64 / y_true.len() as f64
}

/// Named score attached to a fitted model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelScore {
    pub model: String,
    pub metric: String,
    pub value: f64,
}

impl ModelScore {
    pub fn r2(model: impl Into<String>, y_true: &[f64], y_pred: &[f64]) -> Self {
        Self {
            model: model.into(),
            metric: "R²".to_string(),
            value: r2(y_true, y_pred),
        }
    }

    pub fn accuracy<T: PartialEq>(model: impl Into<String>, y_true: &[T], y_pred: &[T]) -> Self {
        Self {
            model: model.into(),
            metric: "Accuracy".to_string(),
            value: accuracy(y_true, y_pred),
        }
    }
}
