//! News repository
//!
//! Database operations for news items.

use crate::db::DynDatabasePool;
use crate::models::{CreateNewsInput, News};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// News repository trait
#[async_trait]
pub trait NewsRepository: Send + Sync {
    /// Create a new news item
    async fn create(&self, input: &CreateNewsInput) -> Result<News>;

    /// Get news by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<News>>;

    /// Most recent news first, at most `limit` items
    async fn list_latest(&self, limit: i64) -> Result<Vec<News>>;

    /// Count total news items
    async fn count(&self) -> Result<i64>;
}

/// SQLx-based news repository implementation
pub struct SqlxNewsRepository {
    pool: DynDatabasePool,
}

impl SqlxNewsRepository {
    /// Create a new SQLx news repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn NewsRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl NewsRepository for SqlxNewsRepository {
    async fn create(&self, input: &CreateNewsInput) -> Result<News> {
        create_news(self.pool.sqlite(), input).await
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<News>> {
        get_news_by_id(self.pool.sqlite(), id).await
    }

    async fn list_latest(&self, limit: i64) -> Result<Vec<News>> {
        list_latest_news(self.pool.sqlite(), limit).await
    }

    async fn count(&self) -> Result<i64> {
        count_news(self.pool.sqlite()).await
    }
}

async fn create_news(pool: &SqlitePool, input: &CreateNewsInput) -> Result<News> {
    let result = sqlx::query("INSERT INTO news (title, text, date) VALUES (?, ?, ?)")
        .bind(&input.title)
        .bind(&input.text)
        .bind(input.date)
        .execute(pool)
        .await
        .context("Failed to create news")?;

    Ok(News {
        id: result.last_insert_rowid(),
        title: input.title.clone(),
        text: input.text.clone(),
        date: input.date,
    })
}

async fn get_news_by_id(pool: &SqlitePool, id: i64) -> Result<Option<News>> {
    let row = sqlx::query("SELECT id, title, text, date FROM news WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get news by ID")?;

    Ok(row.as_ref().map(row_to_news))
}

async fn list_latest_news(pool: &SqlitePool, limit: i64) -> Result<Vec<News>> {
    let rows = sqlx::query(
        r#"
        SELECT id, title, text, date
        FROM news
        ORDER BY date DESC, id DESC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await
    .context("Failed to list news")?;

    Ok(rows.iter().map(row_to_news).collect())
}

async fn count_news(pool: &SqlitePool) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM news")
        .fetch_one(pool)
        .await
        .context("Failed to count news")?;

    Ok(row.get("count"))
}

fn row_to_news(row: &sqlx::sqlite::SqliteRow) -> News {
    News {
        id: row.get("id"),
        title: row.get("title"),
        text: row.get("text"),
        date: row.get("date"),
    }
}
