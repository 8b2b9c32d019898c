// src/error.rs
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use log::error;
use thiserror::Error;

use crate::dtos::ApiResponse;
use crate::repositories::RepoError;
use crate::services::auth_services::AuthError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("upstream error: {0}")]
    Upstream(String),
    #[error("database error: {0}")]
    Database(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Message shown to API clients. Server-side failures are not echoed.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Database(_) | AppError::Internal(_) => "Something went wrong".to_string(),
            AppError::Upstream(_) => "Authentication service unavailable".to_string(),
            other => other.to_string(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ApiResponse::<()>::error(self.public_message()))
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Conflict(msg) => AppError::Conflict(msg),
            RepoError::InvalidReference(msg) => AppError::BadRequest(msg),
            other => {
                error!("repository failure: {}", other);
                AppError::Database(other.to_string())
            }
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => AppError::Unauthorized("Invalid email or password".into()),
            AuthError::AlreadyRegistered => {
                AppError::Conflict("Email already exists. Please sign in instead.".into())
            }
            AuthError::Provider(msg) => AppError::BadRequest(msg),
            AuthError::InvalidToken | AuthError::UuidError(_) => {
                AppError::Unauthorized("Invalid token".into())
            }
            AuthError::Http(e) => {
                error!("auth provider unreachable: {}", e);
                AppError::Upstream(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_errors_are_masked() {
        let err = AppError::Database("relation \"posts\" does not exist".into());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "Something went wrong");
    }

    #[test]
    fn client_errors_keep_their_message() {
        let err = AppError::NotFound("Post not found".into());
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.public_message(), "Post not found");
    }

    #[test]
    fn slug_conflicts_surface_as_409() {
        let err: AppError = RepoError::Conflict("Slug already in use".into()).into();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn missing_category_is_a_bad_request() {
        let err: AppError = RepoError::InvalidReference("Category not found".into()).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.public_message(), "Category not found");
    }
}
