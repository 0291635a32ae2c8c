//! One-dimensional convolutional regressor over a feature row

use crate::error::{ForecastError, Result};
use crate::models::Regressor;
use candle_core::{DType, Device, Tensor};
use candle_nn::{
    AdamW, Conv1d, Conv1dConfig, Linear, Module, Optimizer, ParamsAdamW, VarBuilder, VarMap,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Training hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CnnConfig {
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    /// Minibatch order seed
    pub seed: Option<u64>,
}

impl Default for CnnConfig {
    fn default() -> Self {
        Self {
            epochs: 50,
            batch_size: 32,
            learning_rate: 1e-3,
            seed: None,
        }
    }
}

/// conv(32,k3) -> conv(64,k3) -> conv(128,k5) -> dense(50) -> dense(1), ReLU between,
/// "same" padding so every conv keeps the feature length
#[derive(Debug)]
struct ConvNet {
    c1: Conv1d,
    c2: Conv1d,
    c3: Conv1d,
    fc1: Linear,
    fc2: Linear,
}

fn same_padding(kernel: usize) -> Conv1dConfig {
    Conv1dConfig {
        padding: kernel / 2,
        ..Default::default()
    }
}

impl ConvNet {
    fn new(n_features: usize, vb: VarBuilder) -> Result<Self> {
        Ok(Self {
            c1: candle_nn::conv1d(1, 32, 3, same_padding(3), vb.pp("c1"))?,
            c2: candle_nn::conv1d(32, 64, 3, same_padding(3), vb.pp("c2"))?,
            c3: candle_nn::conv1d(64, 128, 5, same_padding(5), vb.pp("c3"))?,
            fc1: candle_nn::linear(128 * n_features, 50, vb.pp("fc1"))?,
            fc2: candle_nn::linear(50, 1, vb.pp("fc2"))?,
        })
    }
}

impl Module for ConvNet {
    fn forward(&self, xs: &Tensor) -> candle_core::Result<Tensor> {
        let xs = self.c1.forward(xs)?.relu()?;
        let xs = self.c2.forward(&xs)?.relu()?;
        let xs = self.c3.forward(&xs)?.relu()?;
        let xs = xs.flatten_from(1)?;
        let xs = self.fc1.forward(&xs)?.relu()?;
        self.fc2.forward(&xs)
    }
}

/// Convolutional network trained with Adam on mean squared error
#[derive(Debug)]
pub struct ConvRegressor {
    net: ConvNet,
    n_features: usize,
    device: Device,
    losses: Vec<f64>,
}

impl ConvRegressor {
    /// Train on rows of `n_features` values each
    pub fn fit(x: &[Vec<f64>], y: &[f64], config: &CnnConfig) -> Result<Self> {
        let n_features = x.first().map(Vec::len).unwrap_or(0);
        if x.is_empty() || n_features == 0 {
            return Err(ForecastError::insufficient("CNN training rows", 1, x.len()));
        }
        if x.len() != y.len() {
            return Err(ForecastError::InvalidParameter(format!(
                "{} feature rows but {} labels",
                x.len(),
                y.len()
            )));
        }
        if config.batch_size == 0 {
            return Err(ForecastError::InvalidParameter(
                "batch size must be positive".to_string(),
            ));
        }

        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let net = ConvNet::new(n_features, vb)?;
        let mut optimizer = AdamW::new(
            varmap.all_vars(),
            ParamsAdamW {
                lr: config.learning_rate,
                weight_decay: 0.0,
                ..Default::default()
            },
        )?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut order: Vec<usize> = (0..x.len()).collect();
        let mut losses = Vec::with_capacity(config.epochs);

        for epoch in 0..config.epochs {
            order.shuffle(&mut rng);
            let mut total = 0.0;
            let mut batches = 0;
            for chunk in order.chunks(config.batch_size) {
                let rows: Vec<Vec<f64>> = chunk.iter().map(|&i| x[i].clone()).collect();
                let xs = to_input(&rows, n_features, &device)?;
                let ys = Tensor::from_vec(
                    chunk.iter().map(|&i| y[i] as f32).collect::<Vec<_>>(),
                    (chunk.len(), 1),
                    &device,
                )?;
                let loss = candle_nn::loss::mse(&net.forward(&xs)?, &ys)?;
                optimizer.backward_step(&loss)?;
                total += f64::from(loss.to_scalar::<f32>()?);
                batches += 1;
            }
            let mean = total / batches as f64;
            debug!(epoch, loss = mean, "cnn epoch");
            losses.push(mean);
        }
        info!(
            rows = x.len(),
            features = n_features,
            epochs = config.epochs,
            final_loss = losses.last().copied().unwrap_or(f64::NAN),
            "cnn trained"
        );

        Ok(Self {
            net,
            n_features,
            device,
            losses,
        })
    }

    /// Mean training loss per epoch
    pub fn losses(&self) -> &[f64] {
        &self.losses
    }
}

fn to_input(rows: &[Vec<f64>], n_features: usize, device: &Device) -> Result<Tensor> {
    if rows.iter().any(|r| r.len() != n_features) {
        return Err(ForecastError::InvalidParameter(format!(
            "CNN expects {n_features} features per row"
        )));
    }
    let flat: Vec<f32> = rows.iter().flatten().map(|v| *v as f32).collect();
    Ok(Tensor::from_vec(flat, (rows.len(), 1, n_features), device)?)
}

impl Regressor for ConvRegressor {
    fn name(&self) -> &str {
        "CNN"
    }

    fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>> {
        if x.is_empty() {
            return Ok(Vec::new());
        }
        let xs = to_input(x, self.n_features, &self.device)?;
        let out = self.net.forward(&xs)?.flatten_all()?.to_vec1::<f32>()?;
        Ok(out.into_iter().map(f64::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(n: usize) -> (Vec<Vec<f64>>, Vec<f64>) {
        let x: Vec<Vec<f64>> = (0..n)
            .map(|i| {
                let t = i as f64 / n as f64;
                vec![t, t * 0.9, t * 1.1]
            })
            .collect();
        let y = x.iter().map(|r| r.iter().sum::<f64>()).collect();
        (x, y)
    }

    #[test]
    fn test_training_reduces_loss() {
        let (x, y) = dataset(64);
        let config = CnnConfig {
            epochs: 30,
            seed: Some(1),
            ..Default::default()
        };
        let model = ConvRegressor::fit(&x, &y, &config).unwrap();
        assert_eq!(model.losses().len(), 30);
        assert!(model.losses()[29] < model.losses()[0]);

        let pred = model.predict(&x[..5]).unwrap();
        assert_eq!(pred.len(), 5);
        assert!(pred.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_rejects_wrong_width() {
        let (x, y) = dataset(8);
        let config = CnnConfig {
            epochs: 1,
            ..Default::default()
        };
        let model = ConvRegressor::fit(&x, &y, &config).unwrap();
        assert!(model.predict(&[vec![1.0]]).is_err());
        assert!(ConvRegressor::fit(&[], &[], &config).is_err());
    }
}
