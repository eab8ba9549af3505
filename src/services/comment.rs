//! Comment service
//!
//! Posting, editing and deleting comments under news items. Only the
//! comment's author may change it; text containing a banned word is
//! rejected before anything reaches the database.

use crate::db::repositories::{CommentRepository, NewsRepository};
use crate::models::{Comment, CommentInput, User};
use crate::services::access::{authorize, require_viewer, AccessError};
use crate::services::validation::{FieldErrors, REQUIRED_FIELD};
use anyhow::Context;
use std::sync::Arc;

/// Field error shown when a comment contains a banned word
pub const BAD_WORDS_WARNING: &str = "Не ругайтесь!";

/// Words rejected in comment text unless configured otherwise
pub const DEFAULT_BANNED_WORDS: [&str; 2] = ["редиска", "негодяй"];

/// Error types for comment operations
#[derive(Debug, thiserror::Error)]
pub enum CommentServiceError {
    /// The submitted form is invalid
    #[error("Invalid comment: {0}")]
    Invalid(FieldErrors),

    /// The news item to comment on does not exist
    #[error("News not found")]
    NewsNotFound,

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Comment service
pub struct CommentService {
    repo: Arc<dyn CommentRepository>,
    news_repo: Arc<dyn NewsRepository>,
    banned_words: Vec<String>,
}

impl CommentService {
    pub fn new(repo: Arc<dyn CommentRepository>, news_repo: Arc<dyn NewsRepository>) -> Self {
        let banned_words = DEFAULT_BANNED_WORDS.iter().map(|w| w.to_string()).collect();
        Self::with_banned_words(repo, news_repo, banned_words)
    }

    pub fn with_banned_words(
        repo: Arc<dyn CommentRepository>,
        news_repo: Arc<dyn NewsRepository>,
        banned_words: Vec<String>,
    ) -> Self {
        let banned_words = banned_words
            .into_iter()
            .map(|w| w.trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self {
            repo,
            news_repo,
            banned_words,
        }
    }

    /// Check comment text, returning the field errors to show on the form
    pub fn check_text(&self, text: &str) -> Result<(), FieldErrors> {
        if text.trim().is_empty() {
            return Err(FieldErrors::single("text", REQUIRED_FIELD));
        }

        let lowered = text.to_lowercase();
        if self.banned_words.iter().any(|word| lowered.contains(word.as_str())) {
            return Err(FieldErrors::single("text", BAD_WORDS_WARNING));
        }

        Ok(())
    }

    /// Post a comment under a news item on behalf of `author`
    pub async fn create(
        &self,
        author: &User,
        news_id: i64,
        input: CommentInput,
    ) -> Result<Comment, CommentServiceError> {
        if self
            .news_repo
            .get_by_id(news_id)
            .await
            .context("Failed to load news")?
            .is_none()
        {
            return Err(CommentServiceError::NewsNotFound);
        }

        self.check_text(&input.text)
            .map_err(CommentServiceError::Invalid)?;

        let comment = self
            .repo
            .create(&Comment::new(news_id, author.id, input.text))
            .await?;

        tracing::info!(comment_id = comment.id, news_id, user_id = author.id, "Comment posted");
        Ok(comment)
    }

    /// Load a comment that `viewer` is allowed to change
    pub async fn get_owned(
        &self,
        viewer: Option<&User>,
        id: i64,
    ) -> Result<Comment, CommentServiceError> {
        // Anonymous viewers are turned away before the lookup
        require_viewer(viewer)?;
        let comment = self.repo.get_by_id(id).await?;
        Ok(authorize(viewer, comment)?)
    }

    /// Replace the text of an owned comment
    pub async fn update(
        &self,
        viewer: Option<&User>,
        id: i64,
        input: CommentInput,
    ) -> Result<Comment, CommentServiceError> {
        let mut comment = self.get_owned(viewer, id).await?;

        self.check_text(&input.text)
            .map_err(CommentServiceError::Invalid)?;

        self.repo.update_text(comment.id, &input.text).await?;
        comment.text = input.text;

        tracing::info!(comment_id = comment.id, "Comment edited");
        Ok(comment)
    }

    /// Delete an owned comment, returning it
    pub async fn delete(
        &self,
        viewer: Option<&User>,
        id: i64,
    ) -> Result<Comment, CommentServiceError> {
        let comment = self.get_owned(viewer, id).await?;
        self.repo.delete(comment.id).await?;

        tracing::info!(comment_id = comment.id, news_id = comment.news_id, "Comment deleted");
        Ok(comment)
    }

    pub async fn count(&self) -> Result<i64, CommentServiceError> {
        Ok(self.repo.count().await?)
    }
}
