use anyhow::{bail, Context};
use dotenv::dotenv;
use forecast_rs::apps::AppSettings;
use forecast_rs::models::LstmArchitecture;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Where LSTM predictions come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictorKind {
    /// Weights loaded from `LSTM_MODEL_PATH`
    File,
    /// Repeat the last value of each window
    Naive,
}

impl FromStr for PredictorKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "file" => Ok(Self::File),
            "naive" => Ok(Self::Naive),
            other => bail!("LSTM_PREDICTOR must be 'file' or 'naive', got '{other}'"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => bail!("LOG_FORMAT must be 'pretty' or 'json', got '{other}'"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub yahoo_base_url: String,
    pub news_api_base_url: String,
    /// Unset leaves the sentiment app reporting a missing key
    pub news_api_key: Option<String>,
    pub http_timeout_secs: u64,
    pub cache_ttl_secs: u64,
    pub cache_capacity: usize,
    pub lstm_predictor: PredictorKind,
    pub lstm_model_path: PathBuf,
    pub lstm_hidden_sizes: Vec<usize>,
    pub lstm_lookback: usize,
    pub cnn_epochs: usize,
    pub random_seed: Option<u64>,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source; blank values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, anyhow::Error> {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let text = |name: &str, default: &str| get(name).unwrap_or_else(|| default.to_string());

        Ok(Config {
            bind_addr: text("BIND_ADDR", "0.0.0.0:9999"),
            yahoo_base_url: text("YAHOO_BASE_URL", "https://query1.finance.yahoo.com"),
            news_api_base_url: text("NEWS_API_BASE_URL", "https://newsapi.org"),
            news_api_key: get("NEWS_API_KEY"),
            http_timeout_secs: parsed(get("HTTP_TIMEOUT_SECS"), "HTTP_TIMEOUT_SECS", 30)?,
            cache_ttl_secs: parsed(get("CACHE_TTL_SECS"), "CACHE_TTL_SECS", 900)?,
            cache_capacity: parsed(get("CACHE_CAPACITY"), "CACHE_CAPACITY", 32)?,
            lstm_predictor: parsed(get("LSTM_PREDICTOR"), "LSTM_PREDICTOR", PredictorKind::File)?,
            lstm_model_path: PathBuf::from(text("LSTM_MODEL_PATH", "models/lstm.safetensors")),
            lstm_hidden_sizes: hidden_sizes(get("LSTM_HIDDEN_SIZES"))?,
            lstm_lookback: parsed(get("LSTM_LOOKBACK"), "LSTM_LOOKBACK", 100)?,
            cnn_epochs: parsed(get("CNN_EPOCHS"), "CNN_EPOCHS", 50)?,
            random_seed: get("RANDOM_SEED")
                .map(|v| v.parse().with_context(|| format!("RANDOM_SEED is not a number: {v}")))
                .transpose()?,
            log_format: parsed(get("LOG_FORMAT"), "LOG_FORMAT", LogFormat::Pretty)?,
        })
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn lstm_architecture(&self) -> LstmArchitecture {
        LstmArchitecture {
            hidden_sizes: self.lstm_hidden_sizes.clone(),
            lookback: self.lstm_lookback,
        }
    }

    pub fn app_settings(&self) -> AppSettings {
        AppSettings {
            cnn_epochs: self.cnn_epochs,
            seed: self.random_seed,
        }
    }
}

fn parsed<T>(value: Option<String>, name: &str, default: T) -> Result<T, anyhow::Error>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        None => Ok(default),
        Some(v) => v
            .parse()
            .map_err(|e| anyhow::anyhow!("{name} has an invalid value '{v}': {e}")),
    }
}

fn hidden_sizes(value: Option<String>) -> Result<Vec<usize>, anyhow::Error> {
    let Some(value) = value else {
        return Ok(vec![50, 60, 80, 120]);
    };
    let sizes = value
        .split(',')
        .map(|s| {
            s.trim()
                .parse::<usize>()
                .with_context(|| format!("LSTM_HIDDEN_SIZES entry '{s}' is not a number"))
        })
        .collect::<Result<Vec<_>, _>>()?;
    if sizes.is_empty() || sizes.contains(&0) {
        bail!("LSTM_HIDDEN_SIZES needs at least one positive size");
    }
    Ok(sizes)
}
