//! News service
//!
//! Read side of the news feed: the home page listing and the detail page
//! with its comments.

use crate::db::repositories::{CommentRepository, NewsRepository};
use crate::models::{CommentWithAuthor, CreateNewsInput, News};
use anyhow::{Context, Result};
use serde::Serialize;
use std::sync::Arc;

/// Default number of news items on the home page
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// A news item together with its comments, oldest first
#[derive(Debug, Clone, Serialize)]
pub struct NewsDetail {
    pub news: News,
    pub comments: Vec<CommentWithAuthor>,
}

/// News service
pub struct NewsService {
    news_repo: Arc<dyn NewsRepository>,
    comment_repo: Arc<dyn CommentRepository>,
    page_size: usize,
}

impl NewsService {
    pub fn new(
        news_repo: Arc<dyn NewsRepository>,
        comment_repo: Arc<dyn CommentRepository>,
    ) -> Self {
        Self::with_page_size(news_repo, comment_repo, DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(
        news_repo: Arc<dyn NewsRepository>,
        comment_repo: Arc<dyn CommentRepository>,
        page_size: usize,
    ) -> Self {
        Self {
            news_repo,
            comment_repo,
            page_size,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Latest news for the home page, newest date first
    pub async fn home_page(&self) -> Result<Vec<News>> {
        let limit = i64::try_from(self.page_size).unwrap_or(i64::MAX);
        self.news_repo
            .list_latest(limit)
            .await
            .context("Failed to load home page news")
    }

    /// A news item with its comments, or `None` if it doesn't exist
    pub async fn detail(&self, id: i64) -> Result<Option<NewsDetail>> {
        let news = match self.news_repo.get_by_id(id).await? {
            Some(news) => news,
            None => return Ok(None),
        };

        let comments = self
            .comment_repo
            .list_by_news(news.id)
            .await
            .context("Failed to load comments")?;

        Ok(Some(NewsDetail { news, comments }))
    }

    /// Publish a news item
    pub async fn create(&self, input: CreateNewsInput) -> Result<News> {
        let news = self.news_repo.create(&input).await?;
        tracing::info!(news_id = news.id, "News published");
        Ok(news)
    }
}
