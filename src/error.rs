//! Application error type and its HTTP mapping.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

/// Serialized error payload returned by every failing endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Errors surfaced by services and handlers.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed request body or URL.
    #[error("{message}")]
    Validation { message: String, details: Value },

    /// Unknown (or expired) short code.
    #[error("{message}")]
    NotFound { message: String, details: Value },

    /// The store rejected an insert because the short code is taken.
    #[error("Short code already exists: {code}")]
    DuplicateCode { code: String },

    /// Random generation kept colliding until the attempt budget ran out.
    #[error("Failed to generate a unique short code after {attempts} attempts")]
    GenerationExhausted { attempts: usize },

    /// The durable store could not be reached or failed the query.
    #[error("{message}")]
    StoreUnavailable { message: String, details: Value },

    /// The client exceeded its request budget on this call.
    #[error("Too many requests")]
    RateLimited { limit: u64, window_seconds: u64 },

    /// The client is on the deny-list.
    #[error("Client is temporarily blocked")]
    Blacklisted,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }

    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }

    pub fn store_unavailable(message: impl Into<String>, details: Value) -> Self {
        Self::StoreUnavailable {
            message: message.into(),
            details,
        }
    }

    /// Shorthand for the 404 every code-addressed endpoint returns.
    pub fn link_not_found(code: &str) -> Self {
        Self::not_found("Short URL not found", json!({ "code": code }))
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::DuplicateCode { .. } => StatusCode::CONFLICT,
            Self::GenerationExhausted { .. } | Self::StoreUnavailable { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Blacklisted => StatusCode::FORBIDDEN,
        }
    }

    /// Converts the error into its serializable form.
    pub fn to_error_info(&self) -> ErrorInfo {
        let (code, details) = match self {
            Self::Validation { details, .. } => ("validation_error", details.clone()),
            Self::NotFound { details, .. } => ("not_found", details.clone()),
            Self::DuplicateCode { code } => ("duplicate_code", json!({ "code": code })),
            Self::GenerationExhausted { attempts } => {
                ("generation_exhausted", json!({ "attempts": attempts }))
            }
            Self::StoreUnavailable { details, .. } => ("store_unavailable", details.clone()),
            Self::RateLimited { .. } => ("rate_limited", json!({})),
            Self::Blacklisted => ("blacklisted", json!({})),
        };

        ErrorInfo {
            code,
            message: self.to_string(),
            details,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let error = self.to_error_info();

        match self {
            Self::RateLimited {
                limit,
                window_seconds,
            } => (
                status,
                Json(json!({
                    "error": error,
                    "limit": limit,
                    "time_window": window_seconds,
                })),
            )
                .into_response(),
            _ => (status, Json(ErrorBody { error })).into_response(),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        tracing::error!(error = %e, "Database error");
        Self::store_unavailable("Database error", json!({}))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        let details = serde_json::to_value(e.field_errors()).unwrap_or_else(|_| json!({}));
        Self::bad_request("Invalid request body", details)
    }
}
