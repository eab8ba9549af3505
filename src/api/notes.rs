//! Notes pages
//!
//! The landing page is public; everything else sits behind the login
//! guard and only ever shows the viewer's own notes.

use axum::{
    extract::{rejection::FormRejection, Path, State},
    response::{Html, IntoResponse, Response},
    routing::get,
    Form, Router,
};
use tera::Context as TeraContext;

use crate::api::middleware::{AppState, AuthenticatedUser, Viewer};
use crate::api::responses::{found, AppError};
use crate::api::urls;
use crate::models::{NoteInput, User};
use crate::services::{FieldErrors, NoteServiceError};

/// Public notes landing page
pub fn router() -> Router<AppState> {
    Router::new().route("/notes/", get(notes_home))
}

/// Note pages, mounted behind the login guard
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/notes/list/", get(list))
        .route("/notes/add/", get(add_page).post(add))
        .route("/notes/done/", get(done))
        .route("/notes/note/{slug}/", get(detail))
        .route("/notes/edit/{slug}/", get(edit_page).post(edit))
        .route("/notes/delete/{slug}/", get(delete_page).post(delete))
}

/// GET /notes/
async fn notes_home(State(state): State<AppState>, viewer: Viewer) -> Result<Response, AppError> {
    let html = state
        .views
        .page("notes/home.html", &TeraContext::new(), viewer.user())?;
    Ok(Html(html).into_response())
}

/// GET /notes/list/ - the viewer's notes
async fn list(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Response, AppError> {
    let notes = state.note_service.list_for(&user).await?;

    let mut context = TeraContext::new();
    context.insert("notes", &notes);

    let html = state.views.page("notes/list.html", &context, Some(&user))?;
    Ok(Html(html).into_response())
}

/// GET /notes/done/
async fn done(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Response, AppError> {
    let html = state
        .views
        .page("notes/success.html", &TeraContext::new(), Some(&user))?;
    Ok(Html(html).into_response())
}

/// Render the add/edit form with submitted values and errors
fn render_form(
    state: &AppState,
    viewer: Option<&User>,
    action: &str,
    form: &NoteInput,
    errors: &FieldErrors,
) -> Result<Response, AppError> {
    let mut context = TeraContext::new();
    context.insert("form", form);
    context.insert("errors", errors);
    context.insert("action", action);
    context.insert("is_edit", &(action != urls::NOTES_ADD));

    let html = state.views.page("notes/form.html", &context, viewer)?;
    Ok(Html(html).into_response())
}

/// GET /notes/add/
async fn add_page(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Response, AppError> {
    render_form(
        &state,
        Some(&user),
        urls::NOTES_ADD,
        &NoteInput::default(),
        &FieldErrors::new(),
    )
}

/// POST /notes/add/
async fn add(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Form(input): Form<NoteInput>,
) -> Result<Response, AppError> {
    match state.note_service.create(&user, input.clone()).await {
        Ok(_) => Ok(found(urls::NOTES_DONE)),
        Err(NoteServiceError::Invalid(errors)) => {
            render_form(&state, Some(&user), urls::NOTES_ADD, &input, &errors)
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /notes/note/{slug}/
async fn detail(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(slug): Path<String>,
) -> Result<Response, AppError> {
    let note = state.note_service.get_owned(viewer.user(), &slug).await?;

    let mut context = TeraContext::new();
    context.insert("note", &note);

    let html = state.views.page("notes/detail.html", &context, viewer.user())?;
    Ok(Html(html).into_response())
}

/// GET /notes/edit/{slug}/
async fn edit_page(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(slug): Path<String>,
) -> Result<Response, AppError> {
    let note = state.note_service.get_owned(viewer.user(), &slug).await?;
    let form = NoteInput::new(note.title, note.text).with_slug(note.slug);

    render_form(
        &state,
        viewer.user(),
        &urls::note_edit(&slug),
        &form,
        &FieldErrors::new(),
    )
}

/// POST /notes/edit/{slug}/
async fn edit(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(slug): Path<String>,
    form: Result<Form<NoteInput>, FormRejection>,
) -> Result<Response, AppError> {
    state.note_service.get_owned(viewer.user(), &slug).await?;
    let Form(input) = form?;

    match state
        .note_service
        .update(viewer.user(), &slug, input.clone())
        .await
    {
        Ok(_) => Ok(found(urls::NOTES_DONE)),
        Err(NoteServiceError::Invalid(errors)) => {
            render_form(&state, viewer.user(), &urls::note_edit(&slug), &input, &errors)
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /notes/delete/{slug}/ - confirmation page
async fn delete_page(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(slug): Path<String>,
) -> Result<Response, AppError> {
    let note = state.note_service.get_owned(viewer.user(), &slug).await?;

    let mut context = TeraContext::new();
    context.insert("note", &note);

    let html = state.views.page("notes/delete.html", &context, viewer.user())?;
    Ok(Html(html).into_response())
}

/// POST /notes/delete/{slug}/
async fn delete(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(slug): Path<String>,
) -> Result<Response, AppError> {
    state.note_service.delete(viewer.user(), &slug).await?;
    Ok(found(urls::NOTES_DONE))
}
