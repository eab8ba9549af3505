//! Note repository
//!
//! Database operations for personal notes. Every listing is filtered by
//! author in SQL so other users' notes never leave the database.

use crate::db::DynDatabasePool;
use crate::models::Note;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Note repository trait
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// Create a new note
    async fn create(&self, note: &Note) -> Result<Note>;

    /// Get note by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Note>>;

    /// Get note by slug
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Note>>;

    /// Notes written by the given user, in creation order
    async fn list_by_author(&self, author_id: i64) -> Result<Vec<Note>>;

    /// Whether any note other than `exclude_id` already uses `slug`
    async fn slug_exists(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool>;

    /// Update title, text and slug of a note
    async fn update(&self, note: &Note) -> Result<Note>;

    /// Delete a note
    async fn delete(&self, id: i64) -> Result<()>;

    /// Count all notes
    async fn count(&self) -> Result<i64>;
}

/// SQLx-based note repository implementation
pub struct SqlxNoteRepository {
    pool: DynDatabasePool,
}

impl SqlxNoteRepository {
    /// Create a new SQLx note repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn NoteRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl NoteRepository for SqlxNoteRepository {
    async fn create(&self, note: &Note) -> Result<Note> {
        create_note(self.pool.sqlite(), note).await
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Note>> {
        get_note_by_id(self.pool.sqlite(), id).await
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Note>> {
        get_note_by_slug(self.pool.sqlite(), slug).await
    }

    async fn list_by_author(&self, author_id: i64) -> Result<Vec<Note>> {
        list_notes_by_author(self.pool.sqlite(), author_id).await
    }

    async fn slug_exists(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool> {
        note_slug_exists(self.pool.sqlite(), slug, exclude_id).await
    }

    async fn update(&self, note: &Note) -> Result<Note> {
        update_note(self.pool.sqlite(), note).await
    }

    async fn delete(&self, id: i64) -> Result<()> {
        delete_note(self.pool.sqlite(), id).await
    }

    async fn count(&self) -> Result<i64> {
        count_notes(self.pool.sqlite()).await
    }
}

async fn create_note(pool: &SqlitePool, note: &Note) -> Result<Note> {
    let result = sqlx::query(
        r#"
        INSERT INTO notes (title, text, slug, author_id)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&note.title)
    .bind(&note.text)
    .bind(&note.slug)
    .bind(note.author_id)
    .execute(pool)
    .await
    .context("Failed to create note")?;

    Ok(Note {
        id: result.last_insert_rowid(),
        ..note.clone()
    })
}

async fn get_note_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Note>> {
    let row = sqlx::query("SELECT id, title, text, slug, author_id FROM notes WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get note by ID")?;

    Ok(row.as_ref().map(row_to_note))
}

async fn get_note_by_slug(pool: &SqlitePool, slug: &str) -> Result<Option<Note>> {
    let row = sqlx::query("SELECT id, title, text, slug, author_id FROM notes WHERE slug = ?")
        .bind(slug)
        .fetch_optional(pool)
        .await
        .context("Failed to get note by slug")?;

    Ok(row.as_ref().map(row_to_note))
}

async fn list_notes_by_author(pool: &SqlitePool, author_id: i64) -> Result<Vec<Note>> {
    let rows = sqlx::query(
        r#"
        SELECT id, title, text, slug, author_id
        FROM notes
        WHERE author_id = ?
        ORDER BY id ASC
        "#,
    )
    .bind(author_id)
    .fetch_all(pool)
    .await
    .context("Failed to list notes")?;

    Ok(rows.iter().map(row_to_note).collect())
}

async fn note_slug_exists(pool: &SqlitePool, slug: &str, exclude_id: Option<i64>) -> Result<bool> {
    let row = sqlx::query(
        r#"
        SELECT COUNT(*) as count
        FROM notes
        WHERE slug = ? AND (? IS NULL OR id != ?)
        "#,
    )
    .bind(slug)
    .bind(exclude_id)
    .bind(exclude_id)
    .fetch_one(pool)
    .await
    .context("Failed to check note slug")?;

    let count: i64 = row.get("count");
    Ok(count > 0)
}

async fn update_note(pool: &SqlitePool, note: &Note) -> Result<Note> {
    sqlx::query("UPDATE notes SET title = ?, text = ?, slug = ? WHERE id = ?")
        .bind(&note.title)
        .bind(&note.text)
        .bind(&note.slug)
        .bind(note.id)
        .execute(pool)
        .await
        .context("Failed to update note")?;

    get_note_by_id(pool, note.id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Note not found after update"))
}

async fn delete_note(pool: &SqlitePool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM notes WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete note")?;

    Ok(())
}

async fn count_notes(pool: &SqlitePool) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM notes")
        .fetch_one(pool)
        .await
        .context("Failed to count notes")?;

    Ok(row.get("count"))
}

fn row_to_note(row: &sqlx::sqlite::SqliteRow) -> Note {
    Note {
        id: row.get("id"),
        title: row.get("title"),
        text: row.get("text"),
        slug: row.get("slug"),
        author_id: row.get("author_id"),
    }
}
