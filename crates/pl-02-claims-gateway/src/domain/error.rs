//! Gateway error type and its HTTP rendering.
//!
//! Every failure leaves the gateway as
//! `{ success: false, error, message, conflicts?, existingStatus?, retryable? }`
//! with a status derived from the ledger's error taxonomy.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pl_01_settlement_ledger::{ClaimStatus, ErrorKind, LedgerError, LockConflict};
use serde::Serialize;
use std::fmt;
use tracing::error;

/// Stable error codes that do not come from the ledger
pub mod codes {
    pub const MALFORMED_BODY: &str = "MalformedBody";
    pub const NOT_FOUND: &str = "NotFound";
    pub const PAYLOAD_TOO_LARGE: &str = "PayloadTooLarge";
    pub const TIMEOUT: &str = "Timeout";
}

/// Response body for a failed request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub success: bool,
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflicts: Option<Vec<LockConflict>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing_status: Option<ClaimStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retryable: Option<bool>,
}

/// API error with HTTP status
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    /// Create a new API error
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                success: false,
                error: code,
                message: message.into(),
                conflicts: None,
                existing_status: None,
                retryable: None,
            },
        }
    }

    /// Body could not be decoded into a submission
    pub fn malformed_body(details: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            codes::MALFORMED_BODY,
            format!("Malformed request body: {}", details.into()),
        )
    }

    /// No route matched
    pub fn not_found(path: &str) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            codes::NOT_FOUND,
            format!("No route for {path}"),
        )
    }

    /// Request exceeded the gateway deadline
    pub fn timeout(details: impl Into<String>) -> Self {
        let mut err = Self::new(StatusCode::GATEWAY_TIMEOUT, codes::TIMEOUT, details);
        err.body.retryable = Some(true);
        err
    }

    pub fn code(&self) -> &'static str {
        self.body.error
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.status.as_u16(), self.body.message)
    }
}

impl std::error::Error for ApiError {}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        let status = match err.kind() {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Authorization => match err {
                LedgerError::Forbidden(_) => StatusCode::FORBIDDEN,
                _ => StatusCode::UNAUTHORIZED,
            },
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Transient | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Internal detail stays in the log.
        let message = if err.kind() == ErrorKind::Internal {
            error!(error = %err, "Settlement failed with an internal error");
            "An unexpected error occurred".to_string()
        } else {
            err.to_string()
        };

        let mut api = Self::new(status, err.code(), message);
        if err.is_retryable() {
            api.body.retryable = Some(true);
        }
        match err {
            LedgerError::MonthlyMemberVisitAlreadyCompleted { conflicts } => {
                api.body.conflicts = Some(conflicts);
            }
            LedgerError::ClaimAlreadyExists { status, .. } => {
                api.body.existing_status = Some(status);
            }
            _ => {}
        }
        api
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(self.body)).into_response();
        if self.status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                axum::http::header::WWW_AUTHENTICATE,
                axum::http::HeaderValue::from_static("Bearer"),
            );
        }
        response
    }
}
