// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Unprocessable request: {0}")]
    Unprocessable(String),

    #[error("User {0} is not registered")]
    UserNotRegistered(u64),

    #[error("Strava rejected the request with HTTP {status}: {body}")]
    ProviderRejected { status: u16, body: String },

    #[error("Strava transport error: {0}")]
    Transport(String),

    #[error("Invalid Strava response: {0}")]
    InvalidResponse(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Returns true if Strava refused the user's credentials, meaning the
    /// stored refresh token is no longer usable and the user must re-register.
    pub fn is_strava_token_error(&self) -> bool {
        match self {
            AppError::ProviderRejected { status, body } => {
                *status == 401 || body.contains("invalid_grant")
            }
            _ => false,
        }
    }

    /// Returns true if Strava throttled the request.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, AppError::ProviderRejected { status: 429, .. })
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::Unprocessable(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "unprocessable",
                Some(msg.clone()),
            ),
            AppError::UserNotRegistered(_) => {
                (StatusCode::NOT_FOUND, "not_registered", Some(self.to_string()))
            }
            AppError::ProviderRejected { status, .. } => (
                StatusCode::BAD_GATEWAY,
                "strava_error",
                Some(format!("Strava returned HTTP {}", status)),
            ),
            AppError::Transport(msg) | AppError::InvalidResponse(msg) => {
                (StatusCode::BAD_GATEWAY, "strava_error", Some(msg.clone()))
            }
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
