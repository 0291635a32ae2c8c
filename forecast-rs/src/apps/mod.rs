//! The five forecast demos
//!
//! Every app is a pure function from a price history (plus collaborators)
//! to a render-ready report. [`Dashboard`] wires them to the providers:
//! it fetches asynchronously and runs the CPU-bound part on the blocking pool.

pub mod decision_tree;
pub mod linear_cnn;
pub mod lstm;
pub mod report;
pub mod sentiment;
pub mod svm;

pub use decision_tree::DecisionTreeReport;
pub use linear_cnn::LinearCnnReport;
pub use lstm::LstmReport;
pub use report::*;
pub use sentiment::SentimentReport;
pub use svm::SvmReport;

use crate::data::{CandleSeries, HistoryQuery, MarketDataProvider};
use crate::error::{ForecastError, Result};
use crate::models::{CnnConfig, LastValuePredictor, WindowPredictor};
use crate::sentiment::{Headline, LexiconScorer, NewsProvider, SentimentScorer};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, info_span, Instrument, Span};
use uuid::Uuid;

/// Which demo to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppKind {
    DecisionTree,
    Svm,
    Lstm,
    LinearCnn,
    Sentiment,
}

impl AppKind {
    /// Dropdown order
    pub const ALL: [AppKind; 5] = [
        AppKind::DecisionTree,
        AppKind::Svm,
        AppKind::Lstm,
        AppKind::LinearCnn,
        AppKind::Sentiment,
    ];

    /// Title shown to the user
    pub fn label(&self) -> &'static str {
        match self {
            Self::DecisionTree => "Decision Tree Regression",
            Self::Svm => "SVM",
            Self::Lstm => "LSTM",
            Self::LinearCnn => "Linear Regression & CNN",
            Self::Sentiment => "Sentiment Analysis",
        }
    }

    /// Identifier used in query strings
    pub fn slug(&self) -> &'static str {
        match self {
            Self::DecisionTree => "decision_tree",
            Self::Svm => "svm",
            Self::Lstm => "lstm",
            Self::LinearCnn => "linear_cnn",
            Self::Sentiment => "sentiment",
        }
    }
}

impl fmt::Display for AppKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AppKind {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|k| k.slug().eq_ignore_ascii_case(wanted) || k.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ForecastError::InvalidParameter(format!("unknown app '{wanted}'")))
    }
}

pub const DEFAULT_TICKER: &str = "AAPL";

pub fn default_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2010, 1, 1).unwrap_or(NaiveDate::MIN)
}

pub fn default_end() -> NaiveDate {
    NaiveDate::from_ymd_opt(2022, 12, 31).unwrap_or(NaiveDate::MAX)
}

/// One interaction's inputs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastRequest {
    pub app: AppKind,
    pub ticker: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// News query for the sentiment app
    pub company: Option<String>,
}

impl ForecastRequest {
    /// Request over the default 2010-01-01..2022-12-31 range
    pub fn new(app: AppKind, ticker: impl Into<String>) -> Self {
        Self {
            app,
            ticker: ticker.into(),
            start: default_start(),
            end: default_end(),
            company: None,
        }
    }

    pub fn with_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    pub fn query(&self) -> Result<HistoryQuery> {
        HistoryQuery::new(&self.ticker, self.start, self.end)
    }

    /// Company symbol for the news query; falls back to the ticker when blank
    pub fn company_symbol(&self) -> String {
        self.company
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.ticker.trim().to_uppercase())
    }
}

/// Knobs shared by the model-fitting apps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    pub cnn_epochs: usize,
    /// Seeds random splits and minibatch order; entropy when unset
    pub seed: Option<u64>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            cnn_epochs: 50,
            seed: None,
        }
    }
}

impl AppSettings {
    pub fn cnn_config(&self) -> CnnConfig {
        CnnConfig {
            epochs: self.cnn_epochs,
            seed: self.seed,
            ..Default::default()
        }
    }
}

/// Result of one interaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "app", rename_all = "snake_case")]
pub enum AppReport {
    DecisionTree(DecisionTreeReport),
    Svm(SvmReport),
    Lstm(LstmReport),
    LinearCnn(LinearCnnReport),
    Sentiment(SentimentReport),
}

impl AppReport {
    pub fn kind(&self) -> AppKind {
        match self {
            Self::DecisionTree(_) => AppKind::DecisionTree,
            Self::Svm(_) => AppKind::Svm,
            Self::Lstm(_) => AppKind::Lstm,
            Self::LinearCnn(_) => AppKind::LinearCnn,
            Self::Sentiment(_) => AppKind::Sentiment,
        }
    }

    pub fn title(&self) -> &'static str {
        self.kind().label()
    }
}

/// Run the CPU-bound part of an app on an already fetched history
pub fn compute(
    app: AppKind,
    history: &CandleSeries,
    company: &str,
    headlines: Vec<Headline>,
    settings: &AppSettings,
    predictor: &dyn WindowPredictor,
    scorer: &dyn SentimentScorer,
) -> Result<AppReport> {
    Ok(match app {
        AppKind::DecisionTree => AppReport::DecisionTree(decision_tree::analyze(history, settings)?),
        AppKind::Svm => AppReport::Svm(svm::analyze(history)?),
        AppKind::Lstm => AppReport::Lstm(lstm::analyze(history, predictor)?),
        AppKind::LinearCnn => AppReport::LinearCnn(linear_cnn::analyze(history, settings)?),
        AppKind::Sentiment => {
            AppReport::Sentiment(sentiment::analyze(history, company, headlines, scorer)?)
        }
    })
}

/// Collaborators and settings for running interactions
#[derive(Clone)]
pub struct Dashboard {
    market: Arc<dyn MarketDataProvider>,
    news: Option<Arc<dyn NewsProvider>>,
    predictor: Arc<dyn WindowPredictor>,
    scorer: Arc<dyn SentimentScorer>,
    settings: AppSettings,
}

impl fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dashboard")
            .field("market", &self.market.name())
            .field("news", &self.news.as_ref().map(|n| n.name()))
            .field("predictor", &self.predictor.name())
            .field("scorer", &self.scorer.name())
            .field("settings", &self.settings)
            .finish()
    }
}

/// Builder for [`Dashboard`]
pub struct DashboardBuilder {
    market: Arc<dyn MarketDataProvider>,
    news: Option<Arc<dyn NewsProvider>>,
    predictor: Option<Arc<dyn WindowPredictor>>,
    scorer: Option<Arc<dyn SentimentScorer>>,
    settings: AppSettings,
}

impl DashboardBuilder {
    pub fn news(mut self, news: Arc<dyn NewsProvider>) -> Self {
        self.news = Some(news);
        self
    }

    pub fn predictor(mut self, predictor: Arc<dyn WindowPredictor>) -> Self {
        self.predictor = Some(predictor);
        self
    }

    pub fn scorer(mut self, scorer: Arc<dyn SentimentScorer>) -> Self {
        self.scorer = Some(scorer);
        self
    }

    pub fn settings(mut self, settings: AppSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Unset collaborators default to a last-value predictor over 100 days
    /// and the lexicon scorer; without a news provider the sentiment app
    /// reports a missing API key.
    pub fn build(self) -> Dashboard {
        Dashboard {
            market: self.market,
            news: self.news,
            predictor: self
                .predictor
                .unwrap_or_else(|| Arc::new(LastValuePredictor::new(100))),
            scorer: self.scorer.unwrap_or_else(|| Arc::new(LexiconScorer::new())),
            settings: self.settings,
        }
    }
}

impl Dashboard {
    pub fn builder(market: Arc<dyn MarketDataProvider>) -> DashboardBuilder {
        DashboardBuilder {
            market,
            news: None,
            predictor: None,
            scorer: None,
            settings: AppSettings::default(),
        }
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn predictor_name(&self) -> &str {
        self.predictor.name()
    }

    /// Run one interaction inside a span tagged with a fresh run id
    pub async fn run(&self, request: &ForecastRequest) -> Result<AppReport> {
        let run_id = Uuid::new_v4();
        let span = info_span!(
            "forecast",
            %run_id,
            app = request.app.slug(),
            symbol = %request.ticker.trim(),
        );
        self.run_inner(request).instrument(span).await
    }

    async fn run_inner(&self, request: &ForecastRequest) -> Result<AppReport> {
        let query = request.query()?;
        info!(
            provider = self.market.name(),
            start = %query.start,
            end = %query.end,
            "fetching history"
        );
        let history = self.market.fetch(&query).await?;
        if history.is_empty() {
            return Err(query.empty_history());
        }

        let company = request.company_symbol();
        let headlines = match request.app {
            AppKind::Sentiment => {
                let news = self.news.as_ref().ok_or(ForecastError::MissingNewsApiKey)?;
                news.top_headlines(&company).await?
            }
            _ => Vec::new(),
        };

        let app = request.app;
        let settings = self.settings.clone();
        let predictor = Arc::clone(&self.predictor);
        let scorer = Arc::clone(&self.scorer);
        let span = Span::current();
        let report = tokio::task::spawn_blocking(move || {
            let _entered = span.enter();
            compute(
                app,
                &history,
                &company,
                headlines,
                &settings,
                predictor.as_ref(),
                scorer.as_ref(),
            )
        })
        .await??;

        info!(app = report.title(), "interaction finished");
        Ok(report)
    }
}
