//! Application error type and its HTTP representation.
//!
//! Every failure a request can end in is an [`AppError`]. Each variant fixes the
//! HTTP status class; the `code` field carries a stable machine-readable kind so
//! callers can tell apart errors sharing a status (for example a dead link that
//! expired versus one that never existed, or an exhausted code allocator versus
//! a failed session mint).

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Serialized error payload, also embedded in per-item results.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Validation {
        code: &'static str,
        message: String,
        details: Value,
    },
    #[error("{message}")]
    Unauthorized {
        code: &'static str,
        message: String,
        details: Value,
    },
    #[error("{message}")]
    NotFound {
        code: &'static str,
        message: String,
        details: Value,
    },
    #[error("{message}")]
    Conflict {
        code: &'static str,
        message: String,
        details: Value,
    },
    #[error("{message}")]
    Gone {
        code: &'static str,
        message: String,
        details: Value,
    },
    #[error("{message}")]
    TooManyRequests {
        code: &'static str,
        message: String,
        details: Value,
    },
    #[error("{message}")]
    Internal {
        code: &'static str,
        message: String,
        details: Value,
    },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            code: "validation_error",
            message: message.into(),
            details,
        }
    }

    pub fn invalid_alias(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            code: "invalid_alias",
            message: message.into(),
            details,
        }
    }

    pub fn unauthorized(message: impl Into<String>, details: Value) -> Self {
        Self::Unauthorized {
            code: "unauthorized",
            message: message.into(),
            details,
        }
    }

    pub fn session_invalid() -> Self {
        Self::Unauthorized {
            code: "session_invalid_or_expired",
            message: "Invalid or expired session".to_string(),
            details: json!({}),
        }
    }

    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            code: "not_found",
            message: message.into(),
            details,
        }
    }

    pub fn conflict(message: impl Into<String>, details: Value) -> Self {
        Self::Conflict {
            code: "conflict",
            message: message.into(),
            details,
        }
    }

    pub fn alias_taken(alias: &str) -> Self {
        Self::Conflict {
            code: "alias_taken",
            message: "Custom alias already exists".to_string(),
            details: json!({ "alias": alias }),
        }
    }

    pub fn expired(code: &str) -> Self {
        Self::Gone {
            code: "expired",
            message: "Short link has expired".to_string(),
            details: json!({ "code": code }),
        }
    }

    pub fn rate_limited() -> Self {
        Self::TooManyRequests {
            code: "rate_limit_exceeded",
            message: "Too many requests, please try again later".to_string(),
            details: json!({}),
        }
    }

    pub fn exhausted_retries(attempts: usize) -> Self {
        Self::Internal {
            code: "exhausted_retries",
            message: "Failed to generate unique code".to_string(),
            details: json!({ "attempts": attempts }),
        }
    }

    pub fn session_creation(reason: impl Into<String>) -> Self {
        Self::Internal {
            code: "session_creation_failed",
            message: "Failed to create session".to_string(),
            details: json!({ "reason": reason.into() }),
        }
    }

    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            code: "internal_error",
            message: message.into(),
            details,
        }
    }

    /// Machine-readable error kind.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation { code, .. }
            | AppError::Unauthorized { code, .. }
            | AppError::NotFound { code, .. }
            | AppError::Conflict { code, .. }
            | AppError::Gone { code, .. }
            | AppError::TooManyRequests { code, .. }
            | AppError::Internal { code, .. } => code,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Gone { .. } => StatusCode::GONE,
            AppError::TooManyRequests { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_error_info(&self) -> ErrorInfo {
        let (code, message, details) = match self {
            AppError::Validation {
                code,
                message,
                details,
            }
            | AppError::Unauthorized {
                code,
                message,
                details,
            }
            | AppError::NotFound {
                code,
                message,
                details,
            }
            | AppError::Conflict {
                code,
                message,
                details,
            }
            | AppError::Gone {
                code,
                message,
                details,
            }
            | AppError::TooManyRequests {
                code,
                message,
                details,
            }
            | AppError::Internal {
                code,
                message,
                details,
            } => (*code, message.clone(), details.clone()),
        };

        ErrorInfo {
            code,
            message,
            details,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(code = self.code(), "{}", self);
        }

        let body = ErrorBody {
            error: self.to_error_info(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db) = e.as_database_error()
            && db.is_unique_violation()
        {
            return AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": db.constraint() }),
            );
        }

        tracing::error!("Database error: {}", e);
        AppError::internal("Database error", json!({}))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let details = serde_json::to_value(&errors).unwrap_or_else(|_| json!({}));
        AppError::bad_request("Request validation failed", details)
    }
}
