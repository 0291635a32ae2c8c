use anyhow::Result;
use forecast_rs::apps::Dashboard;
use forecast_rs::data::{CachedProvider, YahooClient};
use forecast_rs::models::{LastValuePredictor, LstmPredictor, MissingArtifact, WindowPredictor};
use forecast_rs::sentiment::{LexiconScorer, NewsApiClient};
use shared::{Config, PredictorKind};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    pub dashboard: Dashboard,
}

impl AppState {
    pub fn new(dashboard: Dashboard) -> Self {
        Self { dashboard }
    }

    /// Wire the real providers described by `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        let yahoo = YahooClient::new(&config.yahoo_base_url, config.http_timeout_secs)?;
        let market = CachedProvider::new(yahoo, config.cache_capacity, config.cache_ttl());

        let news = NewsApiClient::new(
            &config.news_api_base_url,
            config.news_api_key.clone(),
            config.http_timeout_secs,
        )?;
        if !news.has_key() {
            warn!("NEWS_API_KEY is not set; the sentiment app will report it");
        }

        let dashboard = Dashboard::builder(Arc::new(market))
            .news(Arc::new(news))
            .predictor(load_predictor(config))
            .scorer(Arc::new(LexiconScorer::new()))
            .settings(config.app_settings())
            .build();
        Ok(Self::new(dashboard))
    }
}

/// Weights are loaded once; a failure keeps the server up and surfaces on the LSTM app
fn load_predictor(config: &Config) -> Arc<dyn WindowPredictor> {
    let arch = config.lstm_architecture();
    match config.lstm_predictor {
        PredictorKind::Naive => {
            info!(lookback = arch.lookback, "Using last-value predictor for the LSTM app");
            Arc::new(LastValuePredictor::new(arch.lookback))
        }
        PredictorKind::File => {
            let lookback = arch.lookback;
            match LstmPredictor::load(&config.lstm_model_path, arch) {
                Ok(predictor) => Arc::new(predictor),
                Err(e) => {
                    warn!(
                        path = %config.lstm_model_path.display(),
                        error = %e,
                        "LSTM weights unavailable"
                    );
                    Arc::new(MissingArtifact::new(&config.lstm_model_path, lookback))
                }
            }
        }
    }
}
