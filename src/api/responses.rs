//! Shared HTTP responses
//!
//! Redirect helpers and the error type every page handler returns.

use axum::{
    extract::rejection::FormRejection,
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
};

use crate::api::urls;
use crate::services::{AccessError, CommentServiceError, NoteServiceError, UserServiceError};
use crate::views::{simple_error_page, ViewError};

/// `302 Found` to `location`
pub fn found(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::FOUND, [(header::LOCATION, value)]).into_response(),
        Err(e) => {
            tracing::error!("Invalid redirect location {:?}: {}", location, e);
            AppError::Internal(anyhow::anyhow!("invalid redirect location")).into_response()
        }
    }
}

/// Send an anonymous viewer to the login page, returning to `next` after
pub fn login_redirect(next: &str) -> Response {
    found(&urls::login_with_next(next))
}

/// Marker left on a response that must become a login redirect.
///
/// Handlers don't know the URL they were reached by; the session
/// middleware does, and swaps the marked response for the redirect.
#[derive(Debug, Clone, Copy)]
pub struct LoginRequired;

/// Errors returned by page handlers
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Missing entity, or one owned by somebody else
    #[error("Not found")]
    NotFound,

    /// Nobody is logged in
    #[error("Login required")]
    LoginRequired,

    /// Body that isn't a usable urlencoded form. Surfaced only once the
    /// viewer has passed the access checks.
    #[error("Bad form: {0}")]
    BadForm(#[from] FormRejection),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound => (
                StatusCode::NOT_FOUND,
                Html(simple_error_page(404, "Страница не найдена")),
            )
                .into_response(),
            AppError::LoginRequired => {
                let mut response = StatusCode::FOUND.into_response();
                response.extensions_mut().insert(LoginRequired);
                response
            }
            AppError::BadForm(rejection) => rejection.into_response(),
            AppError::Internal(e) => {
                tracing::error!("Request failed: {:#}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html(simple_error_page(500, "Внутренняя ошибка сервера")),
                )
                    .into_response()
            }
        }
    }
}

impl From<AccessError> for AppError {
    fn from(e: AccessError) -> Self {
        match e {
            AccessError::LoginRequired => AppError::LoginRequired,
            AccessError::Hidden => AppError::NotFound,
        }
    }
}

impl From<ViewError> for AppError {
    fn from(e: ViewError) -> Self {
        AppError::Internal(e.into())
    }
}

impl From<CommentServiceError> for AppError {
    fn from(e: CommentServiceError) -> Self {
        match e {
            CommentServiceError::Access(access) => access.into(),
            CommentServiceError::NewsNotFound => AppError::NotFound,
            CommentServiceError::Invalid(errors) => {
                AppError::Internal(anyhow::anyhow!("Unhandled comment validation error: {}", errors))
            }
            CommentServiceError::InternalError(e) => AppError::Internal(e),
        }
    }
}

impl From<NoteServiceError> for AppError {
    fn from(e: NoteServiceError) -> Self {
        match e {
            NoteServiceError::Access(access) => access.into(),
            NoteServiceError::Invalid(errors) => {
                AppError::Internal(anyhow::anyhow!("Unhandled note validation error: {}", errors))
            }
            NoteServiceError::InternalError(e) => AppError::Internal(e),
        }
    }
}

impl From<UserServiceError> for AppError {
    fn from(e: UserServiceError) -> Self {
        match e {
            UserServiceError::InternalError(e) => AppError::Internal(e),
            other => AppError::Internal(anyhow::anyhow!("Unhandled user error: {}", other)),
        }
    }
}
