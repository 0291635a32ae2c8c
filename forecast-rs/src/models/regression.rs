//! Regression models backed by smartcore

use crate::error::{ForecastError, Result};
use crate::models::Regressor;
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linear::linear_regression::{
    LinearRegression, LinearRegressionParameters, LinearRegressionSolverName,
};
use smartcore::tree::decision_tree_regressor::{
    DecisionTreeRegressor, DecisionTreeRegressorParameters,
};
use tracing::debug;

/// Build a dense row-major matrix, rejecting empty or ragged input
pub fn to_matrix(rows: &[Vec<f64>]) -> Result<DenseMatrix<f64>> {
    let width = rows
        .first()
        .map(Vec::len)
        .ok_or_else(|| ForecastError::insufficient("model input", 1, 0))?;
    if width == 0 || rows.iter().any(|r| r.len() != width) {
        return Err(ForecastError::InvalidParameter(
            "model input rows must share a non-zero width".to_string(),
        ));
    }
    Ok(DenseMatrix::from_2d_vec(&rows.to_vec()))
}

/// Single-feature matrix from one column
pub fn column_matrix(values: &[f64]) -> Result<DenseMatrix<f64>> {
    to_matrix(&values.iter().map(|v| vec![*v]).collect::<Vec<_>>())
}

fn check_lengths(x: &[Vec<f64>], y: &[f64]) -> Result<()> {
    if x.len() != y.len() {
        return Err(ForecastError::InvalidParameter(format!(
            "{} feature rows but {} labels",
            x.len(),
            y.len()
        )));
    }
    Ok(())
}

/// CART regression tree with library defaults
#[derive(Debug)]
pub struct TreeRegressor {
    model: DecisionTreeRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>,
}

impl TreeRegressor {
    pub fn fit(x: &[Vec<f64>], y: &[f64]) -> Result<Self> {
        check_lengths(x, y)?;
        let matrix = to_matrix(x)?;
        let model = DecisionTreeRegressor::fit(
            &matrix,
            &y.to_vec(),
            DecisionTreeRegressorParameters::default(),
        )
        .map_err(|e| ForecastError::Model(format!("decision tree: {e}")))?;
        debug!(rows = x.len(), "decision tree fitted");
        Ok(Self { model })
    }
}

impl Regressor for TreeRegressor {
    fn name(&self) -> &str {
        "Decision Tree"
    }

    fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>> {
        let matrix = to_matrix(x)?;
        self.model
            .predict(&matrix)
            .map_err(|e| ForecastError::Model(format!("decision tree: {e}")))
    }
}

/// Ordinary least squares, solved by SVD so collinear features stay stable
#[derive(Debug)]
pub struct LinearRegressor {
    model: LinearRegression<f64, f64, DenseMatrix<f64>, Vec<f64>>,
}

impl LinearRegressor {
    pub fn fit(x: &[Vec<f64>], y: &[f64]) -> Result<Self> {
        check_lengths(x, y)?;
        let matrix = to_matrix(x)?;
        let params = LinearRegressionParameters::default()
            .with_solver(LinearRegressionSolverName::SVD);
        let model = LinearRegression::fit(&matrix, &y.to_vec(), params)
            .map_err(|e| ForecastError::Model(format!("linear regression: {e}")))?;
        debug!(rows = x.len(), "linear regression fitted");
        Ok(Self { model })
    }
}

impl Regressor for LinearRegressor {
    fn name(&self) -> &str {
        "Linear Regression"
    }

    fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>> {
        let matrix = to_matrix(x)?;
        self.model
            .predict(&matrix)
            .map_err(|e| ForecastError::Model(format!("linear regression: {e}")))
    }
}
