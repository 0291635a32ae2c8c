use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use forecast_rs::ForecastError;
use serde_json::json;
use tracing::{error, warn};

/// Errors returned by the JSON endpoints
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Forecast(ForecastError),
    Internal(anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Forecast(e) => match e {
                ForecastError::EmptyHistory { .. } => StatusCode::NOT_FOUND,
                e if e.is_user_error() => StatusCode::BAD_REQUEST,
                ForecastError::Http(_)
                | ForecastError::Provider { .. }
                | ForecastError::News(_)
                | ForecastError::Decode(_) => StatusCode::BAD_GATEWAY,
                ForecastError::MissingNewsApiKey | ForecastError::ModelArtifactMissing(_) => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown in the dashboard banner
    pub fn message(&self) -> String {
        match self {
            Self::BadRequest(msg) => msg.clone(),
            Self::Forecast(e) => e.to_string(),
            Self::Internal(e) => format!("Internal error: {e}"),
        }
    }
}

impl From<ForecastError> for ApiError {
    fn from(e: ForecastError) -> Self {
        Self::Forecast(e)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        Self::Internal(e)
    }
}

impl From<askama::Error> for ApiError {
    fn from(e: askama::Error) -> Self {
        Self::Internal(e.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), "{}", self.message());
        } else {
            warn!(status = status.as_u16(), "{}", self.message());
        }
        (status, Json(json!({ "error": self.message() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_status_mapping() {
        let day = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let empty = ForecastError::EmptyHistory {
            symbol: "XYZ".into(),
            start: day,
            end: day,
        };
        assert_eq!(ApiError::from(empty).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::from(ForecastError::EmptySymbol).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(ForecastError::News("rateLimited: slow down".into())).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::from(ForecastError::MissingNewsApiKey).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::from(ForecastError::Model("nan loss".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
