use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::modules::audio::model::{Language, UnsupportedLanguage};
use crate::store::StoreError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Every failure a handler can report, mapped to a status and `{"error": ...}` body.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid language. Supported languages: {}", Language::supported_list())]
    InvalidLanguage,
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("Invalid request body: {0}")]
    InvalidBody(String),
    #[error("No audio found for language: {0}")]
    NotFound(Language),
    #[error("Database connection not available")]
    Unavailable,
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidLanguage
            | ApiError::MissingField(_)
            | ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<UnsupportedLanguage> for ApiError {
    fn from(_: UnsupportedLanguage) -> Self {
        ApiError::InvalidLanguage
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "request rejected");
        }

        (status, Json(ErrorResponse { error: self.to_string() })).into_response()
    }
}
