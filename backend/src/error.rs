//! Error handling for the Agri Advisor server
//!
//! Two response envelopes are used. The advice endpoints (solution generation,
//! crop recommendation, option lookup) answer `{error}` for bad input and
//! `{error, traceback}` for failures. The location endpoints answer
//! `{status: "error", error}` so the map page can always render something.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{Map, Value};
use shared::{FeatureError, LocationInputError, RequestError};
use thiserror::Error;

use crate::services::crop::ModelError;
use crate::services::location::StoreError;

/// Errors raised by the advice endpoints
#[derive(Error, Debug)]
pub enum AppError {
    // Request errors
    #[error("Request must be JSON")]
    NotJson,

    #[error("Invalid JSON body: {0}")]
    MalformedJson(String),

    #[error(transparent)]
    Feature(#[from] FeatureError),

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error("Language not supported: {0}")]
    UnsupportedLanguage(String),

    // Adapter errors
    #[error("Crop recommendation model is not loaded")]
    ModelUnavailable,

    #[error("Crop recommendation failed: {0}")]
    Model(#[from] ModelError),

    #[error("Solution generation failed: {0}")]
    Generation(String),

    #[error("Failed to archive solution: {0}")]
    Archive(#[source] std::io::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Error body of the advice endpoints
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traceback: Option<String>,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotJson
            | AppError::MalformedJson(_)
            | AppError::Feature(_)
            | AppError::Request(_)
            | AppError::UnsupportedLanguage(_) => StatusCode::BAD_REQUEST,
            AppError::ModelUnavailable
            | AppError::Model(_)
            | AppError::Generation(_)
            | AppError::Archive(_)
            | AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let traceback = if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
            Some(traceback(&self))
        } else {
            tracing::debug!("Rejected request: {}", self);
            None
        };

        let body = ErrorResponse {
            error: self.to_string(),
            traceback,
        };
        (status, Json(body)).into_response()
    }
}

/// Debug form of the error followed by its cause chain
fn traceback(error: &(dyn std::error::Error + 'static)) -> String {
    let mut out = format!("{:?}", error);
    let mut source = error.source();
    while let Some(cause) = source {
        out.push_str("\nCaused by: ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::MissingJsonContentType(_) => AppError::NotJson,
            other => AppError::MalformedJson(other.body_text()),
        }
    }
}

/// Require the body to be a JSON object
pub fn json_object(body: Value) -> Result<Map<String, Value>, AppError> {
    match body {
        Value::Object(map) => Ok(map),
        _ => Err(AppError::MalformedJson("expected a JSON object".to_string())),
    }
}

/// Errors raised by the location endpoints
#[derive(Error, Debug)]
pub enum LocationError {
    #[error("Request must be JSON")]
    NotJson,

    #[error("Invalid JSON body: {0}")]
    MalformedJson(String),

    #[error(transparent)]
    Input(#[from] LocationInputError),

    #[error("Missing required field: locations")]
    MissingLocations,

    #[error("{message}")]
    Store {
        message: &'static str,
        #[source]
        source: StoreError,
    },
}

/// Error body of the location endpoints
#[derive(Debug, Serialize)]
pub struct LocationErrorResponse {
    pub status: &'static str,
    pub error: String,
}

impl LocationError {
    pub fn store(message: &'static str, source: StoreError) -> Self {
        LocationError::Store { message, source }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            LocationError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for LocationError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            LocationError::Store { source, .. } => tracing::error!("{}: {}", self, source),
            _ => tracing::debug!("Rejected location request: {}", self),
        }

        let body = LocationErrorResponse {
            status: "error",
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for LocationError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::MissingJsonContentType(_) => LocationError::NotJson,
            other => LocationError::MalformedJson(other.body_text()),
        }
    }
}

/// Result type alias for the advice handlers
pub type AppResult<T> = Result<T, AppError>;
