//! News pages
//!
//! - GET  /                       - latest news
//! - GET  /news/{id}/             - news with comments
//! - POST /news/{id}/             - post a comment
//! - GET/POST /edit_comment/{id}/   - edit own comment
//! - GET/POST /delete_comment/{id}/ - delete own comment

use axum::{
    extract::{rejection::FormRejection, Path, State},
    response::{Html, IntoResponse, Response},
    routing::get,
    Form, Router,
};
use tera::Context as TeraContext;

use crate::api::middleware::{AppState, Viewer};
use crate::api::responses::{found, AppError};
use crate::api::urls;
use crate::models::{Comment, CommentInput};
use crate::services::{CommentServiceError, FieldErrors};

/// Public news pages
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/news/{id}/", get(detail).post(post_comment))
}

/// Comment edit/delete pages, mounted behind the login guard
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/edit_comment/{id}/", get(edit_comment_page).post(edit_comment))
        .route("/delete_comment/{id}/", get(delete_comment_page).post(delete_comment))
}

/// GET / - latest news, newest first
async fn home(State(state): State<AppState>, viewer: Viewer) -> Result<Response, AppError> {
    let news_list = state.news_service.home_page().await?;

    let mut context = TeraContext::new();
    context.insert("news_list", &news_list);

    let html = state.views.page("news/home.html", &context, viewer.user())?;
    Ok(Html(html).into_response())
}

/// Render the detail page, with the comment form for logged-in viewers
async fn render_detail(
    state: &AppState,
    viewer: &Viewer,
    id: i64,
    form_text: &str,
    errors: &FieldErrors,
) -> Result<Response, AppError> {
    let detail = state
        .news_service
        .detail(id)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut context = TeraContext::new();
    context.insert("news", &detail.news);
    context.insert("comments", &detail.comments);
    context.insert("show_form", &viewer.user().is_some());
    context.insert("form_text", form_text);
    context.insert("errors", errors);

    let html = state.views.page("news/detail.html", &context, viewer.user())?;
    Ok(Html(html).into_response())
}

/// GET /news/{id}/
async fn detail(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    render_detail(&state, &viewer, id, "", &FieldErrors::new()).await
}

/// POST /news/{id}/ - add a comment
async fn post_comment(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<i64>,
    form: Result<Form<CommentInput>, FormRejection>,
) -> Result<Response, AppError> {
    let author = viewer.user().ok_or(AppError::LoginRequired)?;
    let Form(input) = form?;

    match state.comment_service.create(author, id, input.clone()).await {
        Ok(_) => Ok(found(&urls::news_comments(id))),
        Err(CommentServiceError::Invalid(errors)) => {
            render_detail(&state, &viewer, id, &input.text, &errors).await
        }
        Err(e) => Err(e.into()),
    }
}

fn render_comment_form(
    state: &AppState,
    viewer: &Viewer,
    comment: &Comment,
    form_text: &str,
    errors: &FieldErrors,
) -> Result<Response, AppError> {
    let mut context = TeraContext::new();
    context.insert("comment", comment);
    context.insert("form_text", form_text);
    context.insert("errors", errors);

    let html = state
        .views
        .page("news/comment_edit.html", &context, viewer.user())?;
    Ok(Html(html).into_response())
}

/// GET /edit_comment/{id}/
async fn edit_comment_page(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let comment = state.comment_service.get_owned(viewer.user(), id).await?;
    render_comment_form(&state, &viewer, &comment, &comment.text, &FieldErrors::new())
}

/// POST /edit_comment/{id}/
async fn edit_comment(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<i64>,
    form: Result<Form<CommentInput>, FormRejection>,
) -> Result<Response, AppError> {
    let comment = state.comment_service.get_owned(viewer.user(), id).await?;
    let Form(input) = form?;

    match state
        .comment_service
        .update(viewer.user(), id, input.clone())
        .await
    {
        Ok(updated) => Ok(found(&urls::news_comments(updated.news_id))),
        Err(CommentServiceError::Invalid(errors)) => {
            render_comment_form(&state, &viewer, &comment, &input.text, &errors)
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /delete_comment/{id}/ - confirmation page
async fn delete_comment_page(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let comment = state.comment_service.get_owned(viewer.user(), id).await?;

    let mut context = TeraContext::new();
    context.insert("comment", &comment);

    let html = state
        .views
        .page("news/comment_delete.html", &context, viewer.user())?;
    Ok(Html(html).into_response())
}

/// POST /delete_comment/{id}/
async fn delete_comment(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let comment = state.comment_service.delete(viewer.user(), id).await?;
    Ok(found(&urls::news_comments(comment.news_id)))
}
