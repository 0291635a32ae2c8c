//! Sequence predictors: window of scaled closes -> next scaled close

use crate::error::{ForecastError, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::rnn::{LSTMConfig, RNN};
use candle_nn::{Linear, Module, VarBuilder, LSTM};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Predicts the value following a fixed-length window
pub trait WindowPredictor: Send + Sync {
    /// Short name shown in reports
    fn name(&self) -> &str;

    /// Number of values each window must hold
    fn window(&self) -> usize;

    /// Predict one value per window
    fn predict_batch(&self, windows: &[Vec<f64>]) -> Result<Vec<f64>>;

    /// Predict the value following a single window
    fn predict(&self, window: &[f64]) -> Result<f64> {
        self.predict_batch(&[window.to_vec()])?
            .into_iter()
            .next()
            .ok_or_else(|| ForecastError::Model(format!("{} returned no prediction", self.name())))
    }
}

fn check_windows(windows: &[Vec<f64>], lookback: usize) -> Result<()> {
    if let Some(bad) = windows.iter().find(|w| w.len() != lookback) {
        return Err(ForecastError::InvalidParameter(format!(
            "window holds {} values, expected {lookback}",
            bad.len()
        )));
    }
    Ok(())
}

/// Shape of the stacked LSTM stored in a weights file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LstmArchitecture {
    /// Hidden units per stacked layer, first layer first
    pub hidden_sizes: Vec<usize>,
    /// Window length
    pub lookback: usize,
}

impl Default for LstmArchitecture {
    fn default() -> Self {
        Self {
            hidden_sizes: vec![50, 60, 80, 120],
            lookback: 100,
        }
    }
}

/// Stacked LSTM layers followed by a single-unit dense head.
///
/// Weight names: `lstm.{i}.weight_ih_l0`, `lstm.{i}.weight_hh_l0`,
/// `lstm.{i}.bias_ih_l0`, `lstm.{i}.bias_hh_l0` per layer and
/// `dense.weight`, `dense.bias` for the head.
#[derive(Debug)]
pub struct LstmNetwork {
    layers: Vec<LSTM>,
    head: Linear,
}

impl LstmNetwork {
    pub fn new(arch: &LstmArchitecture, vb: VarBuilder) -> Result<Self> {
        if arch.hidden_sizes.is_empty() || arch.lookback == 0 {
            return Err(ForecastError::InvalidParameter(
                "LSTM needs at least one layer and a positive lookback".to_string(),
            ));
        }
        let mut layers = Vec::with_capacity(arch.hidden_sizes.len());
        let mut input = 1;
        for (i, &hidden) in arch.hidden_sizes.iter().enumerate() {
            layers.push(candle_nn::lstm(
                input,
                hidden,
                LSTMConfig::default(),
                vb.pp(format!("lstm.{i}")),
            )?);
            input = hidden;
        }
        let head = candle_nn::linear(input, 1, vb.pp("dense"))?;
        Ok(Self { layers, head })
    }

    /// `xs` is `(batch, seq_len, 1)`; returns `(batch, 1)`
    pub fn forward(&self, xs: &Tensor) -> Result<Tensor> {
        let mut seq = xs.clone();
        let mut last_hidden = None;
        for layer in &self.layers {
            let states = layer.seq(&seq)?;
            last_hidden = states.last().map(|s| s.h().clone());
            seq = layer.states_to_tensor(&states)?;
        }
        let hidden = last_hidden
            .ok_or_else(|| ForecastError::Model("empty input sequence".to_string()))?;
        Ok(self.head.forward(&hidden)?)
    }
}

/// Pre-trained LSTM loaded from a safetensors file
#[derive(Debug)]
pub struct LstmPredictor {
    network: LstmNetwork,
    arch: LstmArchitecture,
    device: Device,
}

impl LstmPredictor {
    /// Load weights; a missing file reports [`ForecastError::ModelArtifactMissing`]
    pub fn load(path: impl AsRef<Path>, arch: LstmArchitecture) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ForecastError::ModelArtifactMissing(path.to_path_buf()));
        }
        let device = Device::Cpu;
        let tensors = candle_core::safetensors::load(path, &device)?;
        let vb = VarBuilder::from_tensors(tensors, DType::F32, &device);
        let network = LstmNetwork::new(&arch, vb)?;
        info!(path = %path.display(), layers = arch.hidden_sizes.len(), "LSTM weights loaded");
        Ok(Self {
            network,
            arch,
            device,
        })
    }

    pub fn architecture(&self) -> &LstmArchitecture {
        &self.arch
    }
}

impl WindowPredictor for LstmPredictor {
    fn name(&self) -> &str {
        "LSTM"
    }

    fn window(&self) -> usize {
        self.arch.lookback
    }

    fn predict_batch(&self, windows: &[Vec<f64>]) -> Result<Vec<f64>> {
        if windows.is_empty() {
            return Ok(Vec::new());
        }
        check_windows(windows, self.arch.lookback)?;
        let flat: Vec<f32> = windows.iter().flatten().map(|v| *v as f32).collect();
        let xs = Tensor::from_vec(flat, (windows.len(), self.arch.lookback, 1), &self.device)?;
        let out = self.network.forward(&xs)?.flatten_all()?.to_vec1::<f32>()?;
        debug!(windows = windows.len(), "LSTM batch predicted");
        Ok(out.into_iter().map(f64::from).collect())
    }
}

/// Repeats the last value of each window
#[derive(Debug, Clone)]
pub struct LastValuePredictor {
    lookback: usize,
}

impl LastValuePredictor {
    pub fn new(lookback: usize) -> Self {
        Self { lookback }
    }
}

impl WindowPredictor for LastValuePredictor {
    fn name(&self) -> &str {
        "Last value"
    }

    fn window(&self) -> usize {
        self.lookback
    }

    fn predict_batch(&self, windows: &[Vec<f64>]) -> Result<Vec<f64>> {
        check_windows(windows, self.lookback)?;
        Ok(windows
            .iter()
            .map(|w| w.last().copied().unwrap_or(f64::NAN))
            .collect())
    }
}

/// Stands in for a weights file that could not be found at startup
#[derive(Debug, Clone)]
pub struct MissingArtifact {
    path: PathBuf,
    lookback: usize,
}

impl MissingArtifact {
    pub fn new(path: impl Into<PathBuf>, lookback: usize) -> Self {
        Self {
            path: path.into(),
            lookback,
        }
    }
}

impl WindowPredictor for MissingArtifact {
    fn name(&self) -> &str {
        "LSTM"
    }

    fn window(&self) -> usize {
        self.lookback
    }

    fn predict_batch(&self, _windows: &[Vec<f64>]) -> Result<Vec<f64>> {
        Err(ForecastError::ModelArtifactMissing(self.path.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_nn::VarMap;

    fn small_arch() -> LstmArchitecture {
        LstmArchitecture {
            hidden_sizes: vec![4, 3],
            lookback: 5,
        }
    }

    #[test]
    fn test_load_saved_weights() {
        let arch = small_arch();
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        let network = LstmNetwork::new(&arch, vb).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lstm.safetensors");
        varmap.save(&path).unwrap();

        let predictor = LstmPredictor::load(&path, arch.clone()).unwrap();
        let windows = vec![vec![0.1, 0.2, 0.3, 0.4, 0.5], vec![0.5, 0.4, 0.3, 0.2, 0.1]];
        let predicted = predictor.predict_batch(&windows).unwrap();
        assert_eq!(predicted.len(), 2);
        assert!(predicted.iter().all(|v| v.is_finite()));

        let xs = Tensor::from_vec(
            windows.iter().flatten().map(|v| *v as f32).collect::<Vec<_>>(),
            (2, 5, 1),
            &Device::Cpu,
        )
        .unwrap();
        let direct = network.forward(&xs).unwrap().flatten_all().unwrap().to_vec1::<f32>().unwrap();
        assert!((predicted[0] - f64::from(direct[0])).abs() < 1e-6);

        let single = predictor.predict(&windows[1]).unwrap();
        assert!((single - predicted[1]).abs() < 1e-6);
    }

    #[test]
    fn test_missing_weights_file() {
        let err = LstmPredictor::load("does/not/exist.safetensors", small_arch()).unwrap_err();
        assert!(matches!(err, ForecastError::ModelArtifactMissing(_)));

        let stub = MissingArtifact::new("models/lstm.safetensors", 5);
        assert!(matches!(
            stub.predict(&[0.0; 5]),
            Err(ForecastError::ModelArtifactMissing(_))
        ));
    }

    #[test]
    fn test_last_value_predictor() {
        let p = LastValuePredictor::new(3);
        assert_eq!(p.predict(&[1.0, 2.0, 3.0]).unwrap(), 3.0);
        assert!(p.predict(&[1.0]).is_err());
    }
}
