//! Support-vector classification for up/down labels

use crate::error::{ForecastError, Result};
use crate::models::regression::to_matrix;
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::svm::svc::{SVCParameters, SVC};
use smartcore::svm::Kernels;
use tracing::debug;

/// RBF width for a training matrix, `1 / (n_features * var(X))`
pub fn scale_gamma(x: &[Vec<f64>]) -> f64 {
    let width = x.first().map(Vec::len).unwrap_or(0);
    let values: Vec<f64> = x.iter().flatten().copied().collect();
    if width == 0 || values.is_empty() {
        return 1.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    if var == 0.0 {
        1.0
    } else {
        1.0 / (width as f64 * var)
    }
}

/// Fit an RBF-kernel SVC on `0/1` labels and predict `0/1` labels for `test_x`.
/// Both classes must be present in `train_y`.
pub fn svc_fit_predict(train_x: &[Vec<f64>], train_y: &[u8], test_x: &[Vec<f64>]) -> Result<Vec<u8>> {
    if train_x.len() != train_y.len() {
        return Err(ForecastError::InvalidParameter(format!(
            "{} feature rows but {} labels",
            train_x.len(),
            train_y.len()
        )));
    }
    let ups = train_y.iter().filter(|l| **l == 1).count();
    if ups == 0 || ups == train_y.len() {
        return Err(ForecastError::DegenerateData(
            "training partition holds a single class".to_string(),
        ));
    }
    if test_x.is_empty() {
        return Ok(Vec::new());
    }

    let x = to_matrix(train_x)?;
    let y: Vec<i32> = train_y.iter().map(|l| if *l == 1 { 1 } else { -1 }).collect();
    let test = to_matrix(test_x)?;
    let gamma = scale_gamma(train_x);
    let params: SVCParameters<f64, i32, DenseMatrix<f64>, Vec<i32>> = SVCParameters::default()
        .with_c(1.0)
        .with_kernel(Kernels::rbf().with_gamma(gamma));

    let model = SVC::fit(&x, &y, &params).map_err(|e| ForecastError::Model(format!("svc: {e}")))?;
    let raw = model
        .predict(&test)
        .map_err(|e| ForecastError::Model(format!("svc: {e}")))?;
    debug!(train = train_x.len(), test = test_x.len(), gamma, "svc fitted");

    Ok(raw.into_iter().map(|v| u8::from(v > 0.0)).collect())
}
