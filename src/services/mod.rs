//! Services layer - Business logic
//!
//! This module contains all business logic services for Newsdesk.
//! Services are responsible for:
//! - Implementing business rules (ownership, slug uniqueness, banned words)
//! - Coordinating between repositories
//! - Handling validation and error cases

pub mod access;
pub mod comment;
pub mod news;
pub mod note;
pub mod password;
pub mod slug;
pub mod user;
pub mod validation;

pub use access::{authorize, require_viewer, AccessError, Owned};
pub use comment::{CommentService, CommentServiceError, BAD_WORDS_WARNING};
pub use news::{NewsDetail, NewsService};
pub use note::{NoteService, NoteServiceError, SLUG_TAKEN_WARNING};
pub use password::{hash_password, verify_password};
pub use slug::{is_valid_slug, slugify};
pub use user::{LoginInput, RegisterInput, UserService, UserServiceError};
pub use validation::{FieldErrors, REQUIRED_FIELD};
