//! Account pages
//!
//! - GET/POST /auth/login/  - login form, redirects to `next` afterwards
//! - GET/POST /auth/logout/ - ends the session
//! - GET/POST /auth/signup/ - create an account

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap},
    response::{Html, IntoResponse, Response},
    routing::get,
    Form, Router,
};
use serde::Deserialize;
use tera::Context as TeraContext;

use crate::api::middleware::{clear_session_cookie, extract_session_token, AppState, Viewer};
use crate::api::responses::{found, AppError};
use crate::api::urls;
use crate::services::{FieldErrors, LoginInput, RegisterInput, UserServiceError};

/// Shown when the username/password pair doesn't match an account
pub const INVALID_LOGIN: &str =
    "Пожалуйста, введите правильные имя пользователя и пароль.";

/// Shown when signing up with a taken username
pub const USERNAME_TAKEN: &str = "Пользователь с таким именем уже существует.";

/// Build the account router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/login/", get(login_page).post(login))
        .route("/auth/logout/", get(logout).post(logout))
        .route("/auth/signup/", get(signup_page).post(signup))
}

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    #[serde(default)]
    pub next: String,
}

/// Login form fields
#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub next: String,
}

/// Signup form fields
#[derive(Debug, Default, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

fn render_login(
    state: &AppState,
    viewer: &Viewer,
    username: &str,
    next: &str,
    error: Option<&str>,
) -> Result<Response, AppError> {
    let mut context = TeraContext::new();
    context.insert("username", username);
    context.insert("next", next);
    context.insert("error", &error);

    let html = state.views.page("users/login.html", &context, viewer.user())?;
    Ok(Html(html).into_response())
}

/// GET /auth/login/
async fn login_page(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(query): Query<NextQuery>,
) -> Result<Response, AppError> {
    render_login(&state, &viewer, "", &query.next, None)
}

/// POST /auth/login/
async fn login(
    State(state): State<AppState>,
    viewer: Viewer,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let input = LoginInput::new(form.username.clone(), form.password);

    match state.user_service.login(input).await {
        Ok(session) => {
            let target = if urls::is_safe_next(&form.next) {
                form.next.as_str()
            } else {
                urls::HOME
            };

            tracing::info!(user_id = session.user_id, "User logged in");
            let mut response = found(target);
            if let Some(cookie) = state.session_cookie(&session) {
                response.headers_mut().insert(header::SET_COOKIE, cookie);
            }
            Ok(response)
        }
        Err(UserServiceError::AuthenticationError(_)) => render_login(
            &state,
            &viewer,
            &form.username,
            &form.next,
            Some(INVALID_LOGIN),
        ),
        Err(e) => Err(e.into()),
    }
}

/// GET|POST /auth/logout/
async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, AppError> {
    if let Some(token) = extract_session_token(&headers) {
        state.user_service.logout(&token).await?;
    }

    let html = state
        .views
        .page("users/logout.html", &TeraContext::new(), None)?;

    let mut response = Html(html).into_response();
    response
        .headers_mut()
        .insert(header::SET_COOKIE, clear_session_cookie());
    Ok(response)
}

fn render_signup(
    state: &AppState,
    viewer: &Viewer,
    username: &str,
    errors: &FieldErrors,
) -> Result<Response, AppError> {
    let mut context = TeraContext::new();
    context.insert("username", username);
    context.insert("errors", errors);

    let html = state.views.page("users/signup.html", &context, viewer.user())?;
    Ok(Html(html).into_response())
}

/// GET /auth/signup/
async fn signup_page(State(state): State<AppState>, viewer: Viewer) -> Result<Response, AppError> {
    render_signup(&state, &viewer, "", &FieldErrors::new())
}

/// POST /auth/signup/
async fn signup(
    State(state): State<AppState>,
    viewer: Viewer,
    Form(form): Form<SignupForm>,
) -> Result<Response, AppError> {
    let input = RegisterInput::new(form.username.clone(), form.password);

    match state.user_service.register(input).await {
        Ok(_) => Ok(found(urls::LOGIN)),
        Err(UserServiceError::ValidationError(errors)) => {
            render_signup(&state, &viewer, &form.username, &errors)
        }
        Err(UserServiceError::UserExists(_)) => render_signup(
            &state,
            &viewer,
            &form.username,
            &FieldErrors::single("username", USERNAME_TAKEN),
        ),
        Err(e) => Err(e.into()),
    }
}
