//! Data models
//!
//! This module contains the data structures used throughout Newsdesk:
//! - Database entities (User, Session, News, Comment, Note)
//! - Inputs accepted by the services that create or change them

mod comment;
mod news;
mod note;
mod session;
mod user;

pub use comment::{Comment, CommentInput, CommentWithAuthor};
pub use news::{CreateNewsInput, News};
pub use note::{Note, NoteInput, MAX_SLUG_LENGTH, MAX_TITLE_LENGTH};
pub use session::Session;
pub use user::User;
