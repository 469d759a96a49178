use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

/// Where clients are sent to obtain a fresh token.
pub const LOGIN_PATH: &str = "/api/auth/login";

const PG_UNIQUE_VIOLATION: &str = "23505";
const PG_FOREIGN_KEY_VIOLATION: &str = "23503";

/// Failures surfaced to API callers.
///
/// Every variant is per-request; none of them is fatal to the process.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Missing or malformed required input.
    #[error("{0}")]
    Validation(String),

    /// A referenced report or user does not exist.
    #[error("{0}")]
    NotFound(String),

    /// A uniqueness rule was violated (duplicate email, concurrent vote, ...).
    #[error("{0}")]
    Conflict(String),

    /// The request lacks a valid authenticated identity.
    #[error("{0}")]
    Unauthorized(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Database(sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
            Self::Database(e) if is_unique_violation(e) => StatusCode::CONFLICT,
            Self::Database(e) if is_foreign_key_violation(e) => StatusCode::NOT_FOUND,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self.status() {
            StatusCode::BAD_REQUEST => "validation_error",
            StatusCode::NOT_FOUND => "not_found",
            StatusCode::CONFLICT => "conflict",
            StatusCode::UNAUTHORIZED => "unauthorized",
            _ => "internal_error",
        }
    }

    fn public_message(&self) -> String {
        match self {
            Self::Database(sqlx::Error::RowNotFound) => "resource not found".into(),
            Self::Database(e) if is_unique_violation(e) => "resource already exists".into(),
            Self::Database(e) if is_foreign_key_violation(e) => "referenced resource not found".into(),
            Self::Database(_) | Self::Internal(_) => "internal server error".into(),
            other => other.to_string(),
        }
    }
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    pg_code(err).as_deref() == Some(PG_UNIQUE_VIOLATION)
}

pub(crate) fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    pg_code(err).as_deref() == Some(PG_FOREIGN_KEY_VIOLATION)
}

/// Name of the constraint a database error was raised for, if any.
pub(crate) fn violated_constraint(err: &sqlx::Error) -> Option<&str> {
    match err {
        sqlx::Error::Database(db) => db.constraint(),
        _ => None,
    }
}

fn pg_code(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db) => db.code().map(|c| c.into_owned()),
        _ => None,
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    login: Option<&'static str>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code(),
                message: self.public_message(),
                login: matches!(self, Self::Unauthorized(_)).then_some(LOGIN_PATH),
            },
        };

        if matches!(self, Self::Unauthorized(_)) {
            return (status, [(header::WWW_AUTHENTICATE, "Bearer")], Json(body)).into_response();
        }
        (status, Json(body)).into_response()
    }
}
