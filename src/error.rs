//! Relay error taxonomy and the OpenAI-compatible error envelope.
//!
//! Every failure is recovered at the request boundary and rendered as
//! `{"error": {"message", "type", "code"?}}`.

use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// Errors surfaced to callers.
#[derive(Debug, Error)]
pub enum RelayError {
    /// No upstream credential configured.
    #[error("NVIDIA_API_KEY not configured")]
    MissingCredential,

    /// Request body is not valid JSON of the expected shape.
    #[error("Invalid request body: {0}")]
    InvalidRequest(#[from] serde_json::Error),

    /// Request body could not be read (too large, aborted, ...).
    #[error("{message}")]
    BodyRejected { status: StatusCode, message: String },

    /// Upstream answered with a non-2xx status, or the call failed in transit.
    #[error("{message}")]
    Upstream {
        status: Option<StatusCode>,
        message: String,
    },

    /// Listing models failed for any reason.
    #[error("Failed to fetch models")]
    ModelsUnavailable,
}

impl RelayError {
    /// Status code returned to the caller.
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::MissingCredential | RelayError::ModelsUnavailable => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            RelayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            RelayError::BodyRejected { status, .. } => *status,
            RelayError::Upstream { status, .. } => {
                status.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }

    /// The envelope's `type` discriminant.
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::MissingCredential => "configuration_error",
            RelayError::InvalidRequest(_) | RelayError::BodyRejected { .. } => {
                "invalid_request_error"
            }
            RelayError::Upstream { .. } | RelayError::ModelsUnavailable => "api_error",
        }
    }

    /// Build the envelope for this error.
    pub fn envelope(&self) -> ErrorEnvelope {
        let code = match self {
            RelayError::Upstream { .. } => Some(self.status().as_u16()),
            _ => None,
        };
        ErrorEnvelope {
            error: ErrorDetail {
                message: self.to_string(),
                kind: self.kind(),
                code,
            },
        }
    }
}

impl From<BytesRejection> for RelayError {
    fn from(rejection: BytesRejection) -> Self {
        RelayError::BodyRejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<reqwest::Error> for RelayError {
    fn from(err: reqwest::Error) -> Self {
        RelayError::Upstream {
            status: err.status(),
            message: err.to_string(),
        }
    }
}

/// JSON error response body.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub message: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            RelayError::MissingCredential => {
                tracing::error!("Rejecting request: upstream credential is not configured")
            }
            RelayError::InvalidRequest(e) => {
                tracing::warn!(error = %e, "Rejecting malformed request body")
            }
            RelayError::BodyRejected { message, .. } => {
                tracing::warn!(status = %status, error = %message, "Rejecting unreadable request body")
            }
            RelayError::Upstream { message, .. } => {
                tracing::error!(status = %status, error = %message, "Upstream request failed")
            }
            RelayError::ModelsUnavailable => {}
        }

        (status, Json(self.envelope())).into_response()
    }
}
