// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use crate::db::StorageError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
///
/// Sign-in failures never carry upstream bodies, tokens or secrets into
/// the response; those details are logged where the failure happens.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authorization code required")]
    MissingCode,

    #[error("Invalid OAuth state")]
    InvalidState,

    #[error("Failed to exchange authorization code")]
    TokenExchange,

    #[error("Failed to get user information")]
    IdentityFetch,

    #[error("Authentication required")]
    Unauthorized,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Not configured: {0}")]
    NotConfigured(&'static str),

    /// Sign-in broke for a reason other than the provider rejecting it
    #[error("Sign-in failed: {0}")]
    SignInFailed(anyhow::Error),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(what) => AppError::NotFound(what),
            other => AppError::Database(other.to_string()),
        }
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
            AppError::MissingCode
            | AppError::InvalidState
            | AppError::TokenExchange
            | AppError::IdentityFetch => (StatusCode::BAD_REQUEST, self.to_string(), None),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string(), None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone(), None),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "Invalid request data".to_string(),
                Some(errors.to_string()),
            ),
            AppError::NotConfigured(what) => {
                tracing::error!(missing = %what, "Sign-in attempted without credentials");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Authentication failed".to_string(),
                    None,
                )
            }
            AppError::SignInFailed(err) => {
                tracing::error!(error = %err, "Sign-in failed unexpectedly");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Authentication failed".to_string(),
                    None,
                )
            }
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                    None,
                )
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        let body = ErrorResponse { error, details };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
