//! Ownership-based access control
//!
//! Comments and notes may only be read (notes) or changed (both) by their
//! author. Anonymous viewers are sent to log in before anything else is
//! looked at, and other users get the same answer as for a missing entity.

use crate::models::{Comment, Note, User};

/// An entity that belongs to exactly one user
pub trait Owned {
    fn author_id(&self) -> i64;

    fn is_owned_by(&self, user: &User) -> bool {
        self.author_id() == user.id
    }
}

impl Owned for Comment {
    fn author_id(&self) -> i64 {
        self.author_id
    }
}

impl Owned for Note {
    fn author_id(&self) -> i64 {
        self.author_id
    }
}

/// Why a viewer may not touch an owned entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    /// Nobody is logged in
    #[error("Login required")]
    LoginRequired,

    /// The entity does not exist or belongs to somebody else
    #[error("Not found")]
    Hidden,
}

/// Require a logged-in viewer
pub fn require_viewer(viewer: Option<&User>) -> Result<&User, AccessError> {
    viewer.ok_or(AccessError::LoginRequired)
}

/// Decide whether `viewer` may act on `entity`.
///
/// The anonymous check comes first, so a missing entity still asks an
/// anonymous viewer to log in.
pub fn authorize<T: Owned>(viewer: Option<&User>, entity: Option<T>) -> Result<T, AccessError> {
    let viewer = require_viewer(viewer)?;
    match entity {
        Some(entity) if entity.is_owned_by(viewer) => Ok(entity),
        Some(_) => {
            tracing::debug!(user_id = viewer.id, "Hiding entity owned by another user");
            Err(AccessError::Hidden)
        }
        None => Err(AccessError::Hidden),
    }
}
