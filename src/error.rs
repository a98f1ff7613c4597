/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / JSON error body `{"detail", "code"}`)
 * - RepoError / IdCodecError / AuthError / extractor の rejection を統一的に変換
 * - 内部エラーの詳細はログにだけ出し、クライアントには返さない
 */
use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::repos::error::RepoError;
use crate::services::auth::{AuthError, AuthFailure};
use crate::services::id_codec::IdCodecError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
    pub code: &'static str,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{message}")]
    BadRequest { code: &'static str, message: String },
    #[error("{0}")]
    Unauthorized(AuthFailure),
    #[error("{resource} not found.")]
    NotFound { resource: &'static str },
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::BadRequest { code, .. } => (StatusCode::BAD_REQUEST, *code),
            AppError::Unauthorized(failure) => (StatusCode::UNAUTHORIZED, failure.code()),
            AppError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "internal_server_error"),
        };

        let body = ErrorResponse {
            detail: self.to_string(),
            code,
        };

        (status, Json(body)).into_response()
    }
}

impl From<AuthFailure> for AppError {
    fn from(failure: AuthFailure) -> Self {
        AppError::Unauthorized(failure)
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Rejected(failure) => AppError::Unauthorized(failure),
            AuthError::Resolve(err) => {
                tracing::error!(error = %err, "identity resolution failed");
                AppError::Internal
            }
        }
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::MissingReference => AppError::bad_request("unknown_game", "unknown game"),
            RepoError::Conflict => AppError::bad_request("conflict", "conflicting update"),
            RepoError::Db(err) => {
                tracing::error!(error = ?err, "database error");
                AppError::Internal
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::bad_request("bad_request", rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::bad_request("bad_request", rejection.body_text())
    }
}

impl From<IdCodecError> for AppError {
    fn from(e: IdCodecError) -> Self {
        match e {
            // Client supplied a malformed public id (e.g. /gamers/{id})
            IdCodecError::DecodeInvalidFormat | IdCodecError::DecodeOutOfRange => {
                AppError::bad_request("invalid_public_id", "invalid id")
            }

            // These indicate server-side config / programming errors
            other => {
                tracing::error!(error = %other, "id codec failure");
                AppError::Internal
            }
        }
    }
}
