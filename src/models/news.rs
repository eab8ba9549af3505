//! News model

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Public news item. Nobody owns news; it is only read through the site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct News {
    pub id: i64,
    pub title: String,
    pub text: String,
    /// Publication date, defaults to today
    pub date: NaiveDate,
}

/// Input for creating a news item
#[derive(Debug, Clone)]
pub struct CreateNewsInput {
    pub title: String,
    pub text: String,
    pub date: NaiveDate,
}

impl CreateNewsInput {
    /// News dated today
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            date: Utc::now().date_naive(),
        }
    }

    /// Override the publication date
    pub fn dated(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }
}
