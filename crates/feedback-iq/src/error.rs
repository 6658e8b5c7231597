use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::dispatch::SinkError;
use crate::workflows::feedback::{DatasetError, UnknownPriorityLevel};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Dataset(DatasetError),
    Export(csv::Error),
    Selection(UnknownPriorityLevel),
    SinkSetup(SinkError),
    SinkNotConfigured,
    UnknownFeedback(String),
    Background(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Dataset(err) => write!(f, "dataset error: {}", err),
            AppError::Export(err) => write!(f, "export error: {}", err),
            AppError::Selection(err) => write!(f, "invalid selection: {}", err),
            AppError::SinkSetup(err) => write!(f, "dispatch sink unavailable: {}", err),
            AppError::SinkNotConfigured => {
                write!(f, "dispatch sink is not configured (set FEEDBACK_SINK_URL)")
            }
            AppError::UnknownFeedback(id) => {
                write!(f, "feedback '{}' is not in the selected priorities", id)
            }
            AppError::Background(reason) => write!(f, "background task failed: {}", reason),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Dataset(err) => Some(err),
            AppError::Export(err) => Some(err),
            AppError::Selection(err) => Some(err),
            AppError::SinkSetup(err) => Some(err),
            AppError::SinkNotConfigured
            | AppError::UnknownFeedback(_)
            | AppError::Background(_) => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Dataset(_) | AppError::Selection(_) => StatusCode::BAD_REQUEST,
            AppError::UnknownFeedback(_) => StatusCode::NOT_FOUND,
            AppError::SinkNotConfigured | AppError::SinkSetup(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Export(_)
            | AppError::Background(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<DatasetError> for AppError {
    fn from(value: DatasetError) -> Self {
        Self::Dataset(value)
    }
}

impl From<csv::Error> for AppError {
    fn from(value: csv::Error) -> Self {
        Self::Export(value)
    }
}

impl From<UnknownPriorityLevel> for AppError {
    fn from(value: UnknownPriorityLevel) -> Self {
        Self::Selection(value)
    }
}

impl From<SinkError> for AppError {
    fn from(value: SinkError) -> Self {
        Self::SinkSetup(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_4xx() {
        let response = AppError::UnknownFeedback("FB-404".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = AppError::Selection(UnknownPriorityLevel("URGENT".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = AppError::SinkNotConfigured.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
