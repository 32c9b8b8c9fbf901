use axum::{
    Json,
    response::{IntoResponse, Response},
};
use fabula_core::HttpError;
use http::StatusCode;
use serde::Serialize;
use thiserror::Error;

/// Rejections of a request envelope, returned to the client as HTTP errors
#[derive(Debug, Error)]
pub enum SkillError {
    /// Body is not declared as JSON
    #[error("unsupported content type, expected application/json")]
    UnsupportedMediaType,

    /// Body exceeds the accepted size
    #[error("request body is too large, limit is {limit} bytes")]
    PayloadTooLarge { limit: usize },

    /// Body could not be read or parsed as a request envelope
    #[error("invalid request body: {0}")]
    InvalidBody(String),
}

/// A well-formed request that no turn can handle
///
/// Answered with a spoken apology, never with an HTTP error status.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TurnError {
    /// Intent arrived without a required slot value
    #[error("intent is missing the '{0}' slot")]
    MissingSlot(&'static str),

    /// No handler for this request kind or intent
    #[error("unhandled request: {0}")]
    Unhandled(String),
}

impl HttpError for SkillError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::InvalidBody(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_type(&self) -> &str {
        match self {
            Self::UnsupportedMediaType => "unsupported_media_type",
            Self::PayloadTooLarge { .. } => "payload_too_large",
            Self::InvalidBody(_) => "invalid_request_error",
        }
    }

    fn client_message(&self) -> String {
        self.to_string()
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorDetails,
}

#[derive(Debug, Serialize)]
struct ErrorDetails {
    message: String,
    r#type: String,
    code: u16,
}

impl IntoResponse for SkillError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = ErrorResponse {
            error: ErrorDetails {
                message: self.client_message(),
                r#type: self.error_type().to_string(),
                code: status.as_u16(),
            },
        };

        (status, Json(body)).into_response()
    }
}
