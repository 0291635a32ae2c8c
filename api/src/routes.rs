use crate::error::ApiError;
use crate::state::AppState;
use askama::Template;
use axum::extract::{Query, State};
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;
use forecast_rs::apps::{default_end, default_start, AppKind, AppReport, ForecastRequest, DEFAULT_TICKER};
use serde::Deserialize;
use serde_json::{json, Value};
use shared::templates::{build_info, BuildInfo, DashboardTemplate, FormValues, ReportView};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard))
        .route("/api/forecast", get(forecast))
        .route("/health", get(health_check))
        .route("/version", get(version))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Raw query string; every field is optional so the bare page renders
#[derive(Debug, Default, Deserialize)]
pub struct FormQuery {
    pub app: Option<String>,
    pub ticker: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub company: Option<String>,
}

fn parse_date(value: Option<&str>, field: &str, default: NaiveDate) -> Result<NaiveDate, ApiError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(default),
        Some(v) => NaiveDate::parse_from_str(v, "%Y-%m-%d")
            .map_err(|_| ApiError::BadRequest(format!("Invalid {field} date '{v}', expected YYYY-MM-DD"))),
    }
}

impl FormQuery {
    fn app(&self) -> Result<AppKind, ApiError> {
        match self.app.as_deref() {
            None => Ok(AppKind::DecisionTree),
            Some(app) => app.parse().map_err(ApiError::from),
        }
    }

    pub fn to_request(&self) -> Result<ForecastRequest, ApiError> {
        let ticker = self.ticker.as_deref().unwrap_or(DEFAULT_TICKER);
        let start = parse_date(self.start.as_deref(), "start", default_start())?;
        let end = parse_date(self.end.as_deref(), "end", default_end())?;
        let mut request = ForecastRequest::new(self.app()?, ticker).with_range(start, end);
        if let Some(company) = &self.company {
            request = request.with_company(company.clone());
        }
        Ok(request)
    }

    /// Values echoed back into the form, kept as typed
    fn form_values(&self) -> FormValues {
        FormValues {
            app: self.app().unwrap_or(AppKind::DecisionTree),
            ticker: self.ticker.clone().unwrap_or_else(|| DEFAULT_TICKER.to_string()),
            start: self.start.clone().unwrap_or_else(|| default_start().to_string()),
            end: self.end.clone().unwrap_or_else(|| default_end().to_string()),
            company: self.company.clone().unwrap_or_default(),
        }
    }
}

async fn run(state: &AppState, query: &FormQuery) -> Result<AppReport, ApiError> {
    let request = query.to_request()?;
    Ok(state.dashboard.run(&request).await?)
}

/// Form page; with an `app` parameter the interaction runs and its report
/// (or the error banner) is rendered under the form
async fn dashboard(
    State(state): State<AppState>,
    Query(query): Query<FormQuery>,
) -> Result<Html<String>, ApiError> {
    let page = DashboardTemplate::new(query.form_values());
    let page = if query.app.is_none() {
        page
    } else {
        render_outcome(page, run(&state, &query).await)
    };
    Ok(Html(page.render()?))
}

/// Attach the report, or a banner when the run or its charts failed
fn render_outcome(page: DashboardTemplate, outcome: Result<AppReport, ApiError>) -> DashboardTemplate {
    let view = outcome.and_then(|report| {
        ReportView::from_report(&report)
            .map_err(|e| ApiError::Internal(e.context("Failed to render report")))
    });
    match view {
        Ok(view) => page.with_report(view),
        Err(e) => {
            info!(error = %e.message(), "Interaction failed");
            page.with_error(e.message())
        }
    }
}

async fn forecast(
    State(state): State<AppState>,
    Query(query): Query<FormQuery>,
) -> Result<Json<AppReport>, ApiError> {
    Ok(Json(run(&state, &query).await?))
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn version() -> Json<BuildInfo> {
    Json(build_info())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use chrono::Duration;
    use forecast_rs::apps::{Dashboard, LineChart, LinearCnnReport, Overview, XAxis};
    use forecast_rs::data::{Candle, CandleSeries, CorrelationMatrix, HistoryQuery, MarketDataProvider};
    use forecast_rs::sentiment::{Headline, NewsProvider};
    use std::sync::Arc;
    use tower::ServiceExt;

    struct WaveProvider;

    #[async_trait]
    impl MarketDataProvider for WaveProvider {
        fn name(&self) -> &str {
            "wave"
        }

        async fn fetch(&self, query: &HistoryQuery) -> forecast_rs::Result<CandleSeries> {
            if query.symbol == "EMPTY" {
                return Ok(CandleSeries::new("EMPTY"));
            }
            let start = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
            let candles = (0..120)
                .map(|i| {
                    let t = i as f64;
                    let close = 50.0 + 0.3 * t + 3.0 * (t * 0.9).sin();
                    let open = close + 0.5 * (t * 1.3).cos();
                    Candle::new(
                        start + Duration::days(i),
                        open,
                        open.max(close) + 1.0,
                        open.min(close) - 1.0,
                        close,
                        close,
                        1_000_000.0 + 1_000.0 * t,
                    )
                })
                .collect();
            Ok(CandleSeries::from_vec(query.symbol.clone(), candles))
        }
    }

    struct OneHeadline;

    #[async_trait]
    impl NewsProvider for OneHeadline {
        fn name(&self) -> &str {
            "one"
        }

        async fn top_headlines(&self, query: &str) -> forecast_rs::Result<Vec<Headline>> {
            Ok(vec![Headline::new(format!("{query} shares surge on strong growth"), None)])
        }
    }

    fn app(with_news: bool) -> Router {
        let mut builder = Dashboard::builder(Arc::new(WaveProvider));
        if with_news {
            builder = builder.news(Arc::new(OneHeadline));
        }
        router(AppState::new(builder.build()))
    }

    async fn get(router: Router, uri: &str) -> (StatusCode, String) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get(app(false), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"status":"ok"}"#);
    }

    #[tokio::test]
    async fn test_bare_form() {
        let (status, body) = get(app(false), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<form"));
        assert!(body.contains(r#"value="2010-01-01""#));
        assert!(!body.contains(r#"class="error""#));
    }

    #[tokio::test]
    async fn test_svm_report_page() {
        let (status, body) = get(app(false), "/?app=svm&ticker=TEST").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Stock Price Forecasting with SVM"));
        assert!(body.contains("data:image/svg+xml;base64,"));
    }

    #[tokio::test]
    async fn test_bad_date_shows_banner() {
        let (status, body) = get(app(false), "/?app=svm&ticker=TEST&start=01/02/2020").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(r#"class="error""#));
        assert!(body.contains("Invalid start date"));
        assert!(body.contains(r#"value="01/02/2020""#) || body.contains("01&#x2f;02&#x2f;2020"));
    }

    #[test]
    fn test_chart_failure_becomes_banner() {
        let history = CandleSeries::new("TEST");
        let report = AppReport::LinearCnn(LinearCnnReport {
            overview: Overview::of(&history),
            dropped_rows: 0,
            missing: Vec::new(),
            correlation: CorrelationMatrix {
                columns: Vec::new(),
                values: Vec::new(),
            },
            features: Vec::new(),
            scores: Vec::new(),
            linear_chart: LineChart::new("Linear", XAxis::Steps(0)),
            cnn_chart: LineChart::new("CNN", XAxis::Steps(0)),
        });
        let form = FormQuery {
            app: Some("linear_cnn".to_string()),
            ..Default::default()
        };
        let page = render_outcome(DashboardTemplate::new(form.form_values()), Ok(report));
        assert!(page.report.is_none());
        let html = page.render().unwrap();
        assert!(html.contains(r#"class="error""#));
        assert!(html.contains("Failed to render report"));
    }

    #[tokio::test]
    async fn test_sentiment_json() {
        let (status, body) = get(app(true), "/api/forecast?app=sentiment&ticker=test").await;
        assert_eq!(status, StatusCode::OK);
        let report: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(report["app"], "sentiment");
        assert_eq!(report["company"], "TEST");
        assert_eq!(report["category"], "Positive");
    }

    #[tokio::test]
    async fn test_sentiment_without_key() {
        let (status, body) = get(app(false), "/api/forecast?app=sentiment&ticker=TEST").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body.contains("NEWS_API_KEY"));
    }

    #[tokio::test]
    async fn test_empty_history_is_not_found() {
        let (status, _) = get(app(false), "/api/forecast?app=lstm&ticker=EMPTY").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_app() {
        let (status, body) = get(app(false), "/api/forecast?app=prophet").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("unknown app"));
    }
}
