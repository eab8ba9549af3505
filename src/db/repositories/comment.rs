//! Comment repository
//!
//! Database operations for comments under news items.

use crate::db::DynDatabasePool;
use crate::models::{Comment, CommentWithAuthor};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Comment repository trait
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Create a new comment
    async fn create(&self, comment: &Comment) -> Result<Comment>;

    /// Get comment by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Comment>>;

    /// All comments of a news item, oldest first
    async fn list_by_news(&self, news_id: i64) -> Result<Vec<CommentWithAuthor>>;

    /// Replace the text of a comment
    async fn update_text(&self, id: i64, text: &str) -> Result<()>;

    /// Delete a comment
    async fn delete(&self, id: i64) -> Result<()>;

    /// Count all comments
    async fn count(&self) -> Result<i64>;
}

/// SQLx-based comment repository implementation
pub struct SqlxCommentRepository {
    pool: DynDatabasePool,
}

impl SqlxCommentRepository {
    /// Create a new SQLx comment repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn CommentRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CommentRepository for SqlxCommentRepository {
    async fn create(&self, comment: &Comment) -> Result<Comment> {
        create_comment(self.pool.sqlite(), comment).await
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Comment>> {
        get_comment_by_id(self.pool.sqlite(), id).await
    }

    async fn list_by_news(&self, news_id: i64) -> Result<Vec<CommentWithAuthor>> {
        list_comments_by_news(self.pool.sqlite(), news_id).await
    }

    async fn update_text(&self, id: i64, text: &str) -> Result<()> {
        update_comment_text(self.pool.sqlite(), id, text).await
    }

    async fn delete(&self, id: i64) -> Result<()> {
        delete_comment(self.pool.sqlite(), id).await
    }

    async fn count(&self) -> Result<i64> {
        count_comments(self.pool.sqlite()).await
    }
}

async fn create_comment(pool: &SqlitePool, comment: &Comment) -> Result<Comment> {
    let result = sqlx::query(
        r#"
        INSERT INTO comments (news_id, author_id, text, created)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(comment.news_id)
    .bind(comment.author_id)
    .bind(&comment.text)
    .bind(comment.created)
    .execute(pool)
    .await
    .context("Failed to create comment")?;

    Ok(Comment {
        id: result.last_insert_rowid(),
        ..comment.clone()
    })
}

async fn get_comment_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Comment>> {
    let row = sqlx::query(
        r#"
        SELECT id, news_id, author_id, text, created
        FROM comments
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get comment by ID")?;

    Ok(row.as_ref().map(row_to_comment))
}

async fn list_comments_by_news(pool: &SqlitePool, news_id: i64) -> Result<Vec<CommentWithAuthor>> {
    let rows = sqlx::query(
        r#"
        SELECT c.id, c.news_id, c.author_id, c.text, c.created, u.username
        FROM comments c
        JOIN users u ON u.id = c.author_id
        WHERE c.news_id = ?
        ORDER BY c.created ASC, c.id ASC
        "#,
    )
    .bind(news_id)
    .fetch_all(pool)
    .await
    .context("Failed to list comments")?;

    Ok(rows
        .iter()
        .map(|row| CommentWithAuthor {
            comment: row_to_comment(row),
            author_username: row.get("username"),
        })
        .collect())
}

async fn update_comment_text(pool: &SqlitePool, id: i64, text: &str) -> Result<()> {
    sqlx::query("UPDATE comments SET text = ? WHERE id = ?")
        .bind(text)
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to update comment")?;

    Ok(())
}

async fn delete_comment(pool: &SqlitePool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM comments WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete comment")?;

    Ok(())
}

async fn count_comments(pool: &SqlitePool) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM comments")
        .fetch_one(pool)
        .await
        .context("Failed to count comments")?;

    Ok(row.get("count"))
}

fn row_to_comment(row: &sqlx::sqlite::SqliteRow) -> Comment {
    Comment {
        id: row.get("id"),
        news_id: row.get("news_id"),
        author_id: row.get("author_id"),
        text: row.get("text"),
        created: row.get("created"),
    }
}
