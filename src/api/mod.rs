//! HTTP layer - page handlers and routing
//!
//! This module contains all server-rendered pages:
//! - News feed, news detail and comment management
//! - Personal notes
//! - Login, logout and signup

pub mod middleware;
pub mod news;
pub mod notes;
pub mod responses;
pub mod urls;
pub mod users;

#[cfg(test)]
mod tests;

use axum::{
    extract::State,
    http::StatusCode,
    middleware as axum_middleware,
    response::{Html, IntoResponse, Response},
    Router,
};
use tower_http::trace::TraceLayer;

pub use middleware::{AppState, AuthenticatedUser, Viewer};
pub use responses::{found, login_redirect, AppError};

/// Build the complete router with middleware
pub fn build_router(state: AppState) -> Router {
    // Pages that need a logged-in user
    let protected_routes = Router::new()
        .merge(news::protected_router())
        .merge(notes::protected_router())
        .route_layer(axum_middleware::from_fn(middleware::require_login));

    Router::new()
        .merge(news::router())
        .merge(notes::router())
        .merge(users::router())
        .merge(protected_routes)
        .fallback(not_found)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::optional_auth,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Fallback for unknown paths
async fn not_found(State(state): State<AppState>, viewer: Viewer) -> Response {
    let html = state
        .views
        .error_page(404, "Страница не найдена", viewer.user());
    (StatusCode::NOT_FOUND, Html(html)).into_response()
}
