//! Comment model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Comment left by a user under a news item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub news_id: i64,
    pub author_id: i64,
    pub text: String,
    pub created: DateTime<Utc>,
}

impl Comment {
    /// New unsaved comment stamped with the current time
    pub fn new(news_id: i64, author_id: i64, text: String) -> Self {
        Self {
            id: 0,
            news_id,
            author_id,
            text,
            created: Utc::now(),
        }
    }
}

/// Comment joined with its author's username for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentWithAuthor {
    #[serde(flatten)]
    pub comment: Comment,
    pub author_username: String,
}

/// Form payload for creating or editing a comment
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentInput {
    #[serde(default)]
    pub text: String,
}

impl CommentInput {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}
