//! View engine
//!
//! Server-side HTML rendering with Tera. Templates are compiled into the
//! binary and registered once at startup; HTML auto-escaping is on for
//! every template.

use std::error::Error as StdError;
use tera::{Context as TeraContext, Tera};

use crate::models::User;

mod error;


pub use error::ViewError;

/// Site name shown in page titles
pub const SITE_NAME: &str = "Newsdesk";

/// Embedded templates, parents before children
const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../../templates/base.html")),
    ("error.html", include_str!("../../templates/error.html")),
    ("news/home.html", include_str!("../../templates/news/home.html")),
    ("news/detail.html", include_str!("../../templates/news/detail.html")),
    ("news/comment_edit.html", include_str!("../../templates/news/comment_edit.html")),
    ("news/comment_delete.html", include_str!("../../templates/news/comment_delete.html")),
    ("notes/home.html", include_str!("../../templates/notes/home.html")),
    ("notes/list.html", include_str!("../../templates/notes/list.html")),
    ("notes/form.html", include_str!("../../templates/notes/form.html")),
    ("notes/detail.html", include_str!("../../templates/notes/detail.html")),
    ("notes/delete.html", include_str!("../../templates/notes/delete.html")),
    ("notes/success.html", include_str!("../../templates/notes/success.html")),
    ("users/login.html", include_str!("../../templates/users/login.html")),
    ("users/logout.html", include_str!("../../templates/users/logout.html")),
    ("users/signup.html", include_str!("../../templates/users/signup.html")),
];

/// Renders the site's pages
pub struct ViewEngine {
    tera: Tera,
}

impl ViewEngine {
    /// Register all embedded templates
    pub fn new() -> Result<Self, ViewError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES.iter().copied())
            .map_err(|e| ViewError::TemplateError(error_chain("Failed to load templates", &e)))?;

        tracing::debug!(count = TEMPLATES.len(), "Templates loaded");
        Ok(Self { tera })
    }

    /// Render a template with context
    pub fn render(&self, template: &str, context: &TeraContext) -> Result<String, ViewError> {
        self.tera.render(template, context).map_err(|e| {
            ViewError::RenderError(error_chain(&format!("Failed to render '{}'", template), &e))
        })
    }

    /// Render a page with the standard variables added.
    ///
    /// `current_user` holds the viewer's username and `current_user_id`
    /// their id, both null for anonymous viewers.
    pub fn page(
        &self,
        template: &str,
        context: &TeraContext,
        viewer: Option<&User>,
    ) -> Result<String, ViewError> {
        let mut full_context = context.clone();
        full_context.insert("site_name", SITE_NAME);
        full_context.insert("current_user", &viewer.map(|u| u.username.as_str()));
        full_context.insert("current_user_id", &viewer.map(|u| u.id));

        self.render(template, &full_context)
    }

    /// Render the error page for `status`, falling back to plain HTML
    pub fn error_page(&self, status: u16, message: &str, viewer: Option<&User>) -> String {
        let mut context = TeraContext::new();
        context.insert("status", &status);
        context.insert("message", message);

        match self.page("error.html", &context, viewer) {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!("Failed to render error template: {}", e);
                simple_error_page(status, message)
            }
        }
    }
}

/// Flatten a Tera error and its causes into one message
fn error_chain(prefix: &str, e: &tera::Error) -> String {
    let mut error_msg = format!("{}: {}", prefix, e);
    let mut source = e.source();
    while let Some(s) = source {
        error_msg.push_str(&format!("\n  Caused by: {}", s));
        source = s.source();
    }
    error_msg
}

/// Last-resort error page when even the error template fails
pub fn simple_error_page(status: u16, message: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="ru">
<head><meta charset="utf-8"><title>{status}</title></head>
<body><h1>{status}</h1><p>{message}</p></body>
</html>"#,
        status = status,
        message = tera::escape_html(message),
    )
}
