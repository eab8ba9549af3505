//! Note model

use serde::{Deserialize, Serialize};

/// Maximum length of a note title, in characters
pub const MAX_TITLE_LENGTH: usize = 100;

/// Maximum length of a note slug, in characters
pub const MAX_SLUG_LENGTH: usize = 100;

/// Private note, visible only to its author
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub text: String,
    /// Unique across all notes
    pub slug: String,
    pub author_id: i64,
}

impl Note {
    /// New unsaved note
    pub fn new(title: String, text: String, slug: String, author_id: i64) -> Self {
        Self {
            id: 0,
            title,
            text,
            slug,
            author_id,
        }
    }
}

/// Form payload for creating or editing a note.
///
/// An empty `slug` means "derive it from the title".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NoteInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub slug: String,
}

impl NoteInput {
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            slug: String::new(),
        }
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = slug.into();
        self
    }
}
