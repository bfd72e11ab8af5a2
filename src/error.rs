use std::future::Future;
use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

/// Upper bound for a single store operation. Exceeding it surfaces as
/// [`AppError::Timeout`], never as a hung request.
pub const STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Typed error taxonomy for the whole service. Lower layers return these;
/// the [`IntoResponse`] impl at the transport boundary is the only place an
/// HTTP status is chosen.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("missing authorization token")]
    MissingToken,
    #[error("invalid token")]
    InvalidToken,
    #[error("token expired")]
    TokenExpired,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("email already exists")]
    DuplicateEmail,
    #[error("username already exists")]
    DuplicateUsername,
    #[error("article already liked")]
    AlreadyLiked,
    #[error("{0}")]
    Conflict(&'static str),
    #[error("store operation timed out")]
    Timeout,
    #[error("internal server error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials
            | AppError::MissingToken
            | AppError::InvalidToken
            | AppError::TokenExpired => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DuplicateEmail
            | AppError::DuplicateUsername
            | AppError::AlreadyLiked
            | AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            // Internal detail goes to logs; the caller only sees the kind.
            error!(error = ?self, "request failed");
        }
        let body = ErrorBody {
            code: status.as_u16(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Internal(e.into())
    }
}

/// Runs a store future under [`STORE_TIMEOUT`].
pub async fn with_store_timeout<T, F>(fut: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    tokio::time::timeout(STORE_TIMEOUT, fut)
        .await
        .map_err(|_| AppError::Timeout)?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failures_are_unauthorized() {
        assert_eq!(AppError::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::InvalidToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::TokenExpired.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn conflicts_map_to_409() {
        assert_eq!(AppError::DuplicateEmail.status(), StatusCode::CONFLICT);
        assert_eq!(AppError::AlreadyLiked.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn internal_message_stays_generic() {
        let err = AppError::Internal(anyhow::anyhow!("connection refused to 10.0.0.3"));
        assert_eq!(err.to_string(), "internal server error");
    }
}
