//! HTTP middleware and request extractors
//!
//! Contains:
//! - Application state shared by all handlers
//! - Session token extraction and validation
//! - The login guard for pages that need a logged-in user

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::api::responses::{login_redirect, AppError, LoginRequired};
use crate::config::Config;
use crate::db::repositories::{
    SqlxCommentRepository, SqlxNewsRepository, SqlxNoteRepository, SqlxSessionRepository,
    SqlxUserRepository,
};
use crate::db::DynDatabasePool;
use crate::models::{Session, User};
use crate::services::{CommentService, NewsService, NoteService, UserService};
use crate::views::{ViewEngine, ViewError};

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub pool: DynDatabasePool,
    pub user_service: Arc<UserService>,
    pub news_service: Arc<NewsService>,
    pub comment_service: Arc<CommentService>,
    pub note_service: Arc<NoteService>,
    pub views: Arc<ViewEngine>,
    /// Session cookie lifetime in seconds
    pub session_max_age: i64,
}

impl AppState {
    /// Wire repositories and services over `pool`
    pub fn new(pool: DynDatabasePool, config: &Config) -> Result<Self, ViewError> {
        let user_repo = SqlxUserRepository::boxed(pool.clone());
        let session_repo = SqlxSessionRepository::boxed(pool.clone());
        let news_repo = SqlxNewsRepository::boxed(pool.clone());
        let comment_repo = SqlxCommentRepository::boxed(pool.clone());
        let note_repo = SqlxNoteRepository::boxed(pool.clone());

        let expiration_days = config.session.expiration_days;
        let user_service =
            UserService::with_session_expiration(user_repo, session_repo, expiration_days);
        let news_service = NewsService::with_page_size(
            news_repo.clone(),
            comment_repo.clone(),
            config.news.page_size as usize,
        );
        let comment_service = CommentService::with_banned_words(
            comment_repo,
            news_repo,
            config.news.banned_words.clone(),
        );

        Ok(Self {
            pool,
            user_service: Arc::new(user_service),
            news_service: Arc::new(news_service),
            comment_service: Arc::new(comment_service),
            note_service: Arc::new(NoteService::new(note_repo)),
            views: Arc::new(ViewEngine::new()?),
            session_max_age: expiration_days * SECONDS_PER_DAY,
        })
    }

    /// `Set-Cookie` value carrying a freshly opened session
    pub fn session_cookie(&self, session: &Session) -> Option<HeaderValue> {
        let cookie = format!(
            "session={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            session.id, self.session_max_age
        );
        HeaderValue::from_str(&cookie).ok()
    }
}

/// `Set-Cookie` value that drops the session cookie
pub fn clear_session_cookie() -> HeaderValue {
    HeaderValue::from_static("session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Authenticated user extracted from request
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

/// Whoever sent the request, logged in or not
#[derive(Debug, Clone, Default)]
pub struct Viewer(pub Option<User>);

impl Viewer {
    pub fn user(&self) -> Option<&User> {
        self.0.as_ref()
    }
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AppError::LoginRequired)
    }
}

impl<S> FromRequestParts<S> for Viewer
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Viewer(
            parts
                .extensions
                .get::<AuthenticatedUser>()
                .map(|user| user.0.clone()),
        ))
    }
}

/// Extract session token from request headers.
///
/// A `Bearer` authorization header wins over the `session` cookie.
pub fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                return Some(token.to_string());
            }
        }
    }

    if let Some(cookie_header) = headers.get(header::COOKIE) {
        if let Ok(cookie_str) = cookie_header.to_str() {
            for cookie in cookie_str.split(';') {
                let cookie = cookie.trim();
                if let Some(token) = cookie.strip_prefix("session=") {
                    if !token.is_empty() {
                        return Some(token.to_string());
                    }
                }
            }
        }
    }

    None
}

/// Path and query the request was made for
fn request_target(request: &Request) -> String {
    request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string())
}

/// Optional authentication middleware.
///
/// Resolves the session into an `AuthenticatedUser` extension when there
/// is one, and turns responses marked `LoginRequired` into a redirect to
/// the login page that returns to the requested URL.
pub async fn optional_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = extract_session_token(request.headers()) {
        match state.user_service.validate_session(&token).await {
            Ok(Some(user)) => {
                request.extensions_mut().insert(AuthenticatedUser(user));
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Session validation failed: {}", e),
        }
    }

    let target = request_target(&request);
    let response = next.run(request).await;

    if response.extensions().get::<LoginRequired>().is_some() {
        tracing::debug!(path = %target, "Anonymous request sent to login");
        return login_redirect(&target);
    }
    response
}

/// Login guard for pages that need a logged-in user
pub async fn require_login(request: Request, next: Next) -> Response {
    if request.extensions().get::<AuthenticatedUser>().is_some() {
        return next.run(request).await;
    }

    let target = request_target(&request);
    tracing::debug!(path = %target, "Anonymous request sent to login");
    login_redirect(&target)
}
