//! Site URLs
//!
//! Every path the site links or redirects to is built here so handlers,
//! templates and tests agree on the exact strings.

pub const HOME: &str = "/";
pub const LOGIN: &str = "/auth/login/";
pub const LOGOUT: &str = "/auth/logout/";
pub const SIGNUP: &str = "/auth/signup/";

pub const NOTES_HOME: &str = "/notes/";
pub const NOTES_LIST: &str = "/notes/list/";
pub const NOTES_ADD: &str = "/notes/add/";
pub const NOTES_DONE: &str = "/notes/done/";

pub fn news_detail(id: i64) -> String {
    format!("/news/{}/", id)
}

/// Comment section of a news page, where comment forms return to
pub fn news_comments(id: i64) -> String {
    format!("/news/{}/#comments", id)
}

pub fn edit_comment(id: i64) -> String {
    format!("/edit_comment/{}/", id)
}

pub fn delete_comment(id: i64) -> String {
    format!("/delete_comment/{}/", id)
}

pub fn note_detail(slug: &str) -> String {
    format!("/notes/note/{}/", slug)
}

pub fn note_edit(slug: &str) -> String {
    format!("/notes/edit/{}/", slug)
}

pub fn note_delete(slug: &str) -> String {
    format!("/notes/delete/{}/", slug)
}

/// Login page that sends the user back to `next` afterwards.
///
/// `next` is percent-encoded except for `/`, so `/notes/add/` stays
/// readable in the query string.
pub fn login_with_next(next: &str) -> String {
    let encoded = urlencoding::encode(next).replace("%2F", "/");
    format!("{}?next={}", LOGIN, encoded)
}

/// Whether `next` points back into this site.
///
/// Only absolute local paths are accepted; `//host` and backslash tricks
/// would leave the site.
pub fn is_safe_next(next: &str) -> bool {
    next.starts_with('/') && !next.starts_with("//") && !next.contains('\\')
}
