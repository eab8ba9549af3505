//! Note service
//!
//! Personal notes: every operation acts on behalf of a logged-in user and
//! only ever touches that user's notes. Slugs are unique across all notes.

use crate::db::repositories::{is_unique_violation, NoteRepository};
use crate::models::{Note, NoteInput, User, MAX_SLUG_LENGTH, MAX_TITLE_LENGTH};
use crate::services::access::{authorize, require_viewer, AccessError};
use crate::services::slug::{is_valid_slug, slugify};
use crate::services::validation::{too_long, FieldErrors, REQUIRED_FIELD};
use anyhow::Context;
use std::sync::Arc;

/// Appended to a slug that another note already uses
pub const SLUG_TAKEN_WARNING: &str =
    " - такой slug уже существует, придумайте уникальное значение!";

/// Shown for a slug with characters outside `[-a-zA-Z0-9_]`
pub const INVALID_SLUG: &str =
    "Значение должно состоять только из латинских букв, цифр, знаков подчеркивания или дефиса.";

/// Error types for note operations
#[derive(Debug, thiserror::Error)]
pub enum NoteServiceError {
    /// The submitted form is invalid
    #[error("Invalid note: {0}")]
    Invalid(FieldErrors),

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Note service
pub struct NoteService {
    repo: Arc<dyn NoteRepository>,
}

impl NoteService {
    pub fn new(repo: Arc<dyn NoteRepository>) -> Self {
        Self { repo }
    }

    /// Notes written by `user`
    pub async fn list_for(&self, user: &User) -> Result<Vec<Note>, NoteServiceError> {
        let notes = self
            .repo
            .list_by_author(user.id)
            .await
            .context("Failed to list notes")?;
        Ok(notes)
    }

    /// Create a note owned by `author`
    pub async fn create(&self, author: &User, input: NoteInput) -> Result<Note, NoteServiceError> {
        let (title, text, slug) = self.validate(&input, None).await?;

        let note = self
            .repo
            .create(&Note::new(title, text, slug.clone(), author.id))
            .await
            .map_err(|e| write_error(e, &slug))?;

        tracing::info!(note_id = note.id, slug = %note.slug, user_id = author.id, "Note created");
        Ok(note)
    }

    /// Load the note with `slug` if `viewer` wrote it
    pub async fn get_owned(
        &self,
        viewer: Option<&User>,
        slug: &str,
    ) -> Result<Note, NoteServiceError> {
        require_viewer(viewer)?;
        let note = self.repo.get_by_slug(slug).await?;
        Ok(authorize(viewer, note)?)
    }

    /// Replace title, text and slug of an owned note
    pub async fn update(
        &self,
        viewer: Option<&User>,
        slug: &str,
        input: NoteInput,
    ) -> Result<Note, NoteServiceError> {
        let note = self.get_owned(viewer, slug).await?;
        let (title, text, slug) = self.validate(&input, Some(note.id)).await?;

        let updated = self
            .repo
            .update(&Note {
                title,
                text,
                slug: slug.clone(),
                ..note
            })
            .await
            .map_err(|e| write_error(e, &slug))?;

        tracing::info!(note_id = updated.id, slug = %updated.slug, "Note updated");
        Ok(updated)
    }

    /// Delete an owned note, returning it
    pub async fn delete(&self, viewer: Option<&User>, slug: &str) -> Result<Note, NoteServiceError> {
        let note = self.get_owned(viewer, slug).await?;
        self.repo.delete(note.id).await?;

        tracing::info!(note_id = note.id, slug = %note.slug, "Note deleted");
        Ok(note)
    }

    pub async fn count(&self) -> Result<i64, NoteServiceError> {
        Ok(self.repo.count().await?)
    }

    /// Check the form and resolve the slug to store.
    ///
    /// `editing` is the id of the note being edited, whose own slug does
    /// not count as taken.
    async fn validate(
        &self,
        input: &NoteInput,
        editing: Option<i64>,
    ) -> Result<(String, String, String), NoteServiceError> {
        let mut errors = FieldErrors::new();

        let title = input.title.trim();
        if title.is_empty() {
            errors.add("title", REQUIRED_FIELD);
        } else if title.chars().count() > MAX_TITLE_LENGTH {
            errors.add("title", too_long(MAX_TITLE_LENGTH));
        }

        if input.text.trim().is_empty() {
            errors.add("text", REQUIRED_FIELD);
        }

        let submitted = input.slug.trim();
        let slug = if submitted.is_empty() {
            slugify(title)
        } else {
            submitted.to_string()
        };

        if slug.is_empty() {
            if !title.is_empty() {
                errors.add("slug", REQUIRED_FIELD);
            }
        } else if slug.chars().count() > MAX_SLUG_LENGTH {
            errors.add("slug", too_long(MAX_SLUG_LENGTH));
        } else if !is_valid_slug(&slug) {
            errors.add("slug", INVALID_SLUG);
        } else if self
            .repo
            .slug_exists(&slug, editing)
            .await
            .context("Failed to check slug")?
        {
            errors.add("slug", slug_taken(&slug));
        }

        errors.into_result().map_err(NoteServiceError::Invalid)?;
        Ok((title.to_string(), input.text.trim().to_string(), slug))
    }
}

fn slug_taken(slug: &str) -> String {
    format!("{}{}", slug, SLUG_TAKEN_WARNING)
}

/// A slug that passed validation can still lose to a concurrent write;
/// the UNIQUE index reports it and the form gets the usual slug error.
fn write_error(err: anyhow::Error, slug: &str) -> NoteServiceError {
    if is_unique_violation(&err) {
        tracing::debug!(slug, "Slug taken between validation and write");
        NoteServiceError::Invalid(FieldErrors::single("slug", slug_taken(slug)))
    } else {
        NoteServiceError::InternalError(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxNoteRepository, SqlxUserRepository, UserRepository};
    use crate::db::{create_test_pool, migrations};

    async fn setup() -> (NoteService, User, User) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let users = SqlxUserRepository::new(pool.clone());
        let author = users
            .create(&User::new("author".to_string(), "hash".to_string()))
            .await
            .unwrap();
        let reader = users
            .create(&User::new("reader".to_string(), "hash".to_string()))
            .await
            .unwrap();

        (NoteService::new(SqlxNoteRepository::boxed(pool)), author, reader)
    }

    fn slug_errors(result: Result<Note, NoteServiceError>) -> Vec<String> {
        match result {
            Err(NoteServiceError::Invalid(errors)) => errors.get("slug").to_vec(),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_with_explicit_slug() {
        let (service, author, _) = setup().await;
        let note = service
            .create(&author, NoteInput::new("Заголовок", "Текст").with_slug("note-slug"))
            .await
            .unwrap();

        assert_eq!(note.slug, "note-slug");
        assert_eq!(note.author_id, author.id);
        assert_eq!(service.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_without_slug_derives_it_from_title() {
        let (service, author, _) = setup().await;
        let note = service
            .create(&author, NoteInput::new("Заголовок", "Текст"))
            .await
            .unwrap();

        assert_eq!(note.slug, slugify("Заголовок"));
        assert_eq!(note.slug, "zagolovok");
    }

    #[tokio::test]
    async fn test_duplicate_slug_is_rejected() {
        let (service, author, reader) = setup().await;
        let input = NoteInput::new("Заголовок", "Текст").with_slug("note-slug");
        service.create(&author, input.clone()).await.unwrap();

        let errors = slug_errors(service.create(&reader, input).await);
        assert_eq!(errors, vec![format!("note-slug{}", SLUG_TAKEN_WARNING)]);
        assert_eq!(service.count().await.unwrap(), 1);
    }

    /// Sees no existing slugs, like a request validated just before a
    /// concurrent one committed
    struct StaleSlugCheck(Arc<dyn NoteRepository>);

    #[async_trait::async_trait]
    impl NoteRepository for StaleSlugCheck {
        async fn create(&self, note: &Note) -> anyhow::Result<Note> {
            self.0.create(note).await
        }
        async fn get_by_id(&self, id: i64) -> anyhow::Result<Option<Note>> {
            self.0.get_by_id(id).await
        }
        async fn get_by_slug(&self, slug: &str) -> anyhow::Result<Option<Note>> {
            self.0.get_by_slug(slug).await
        }
        async fn list_by_author(&self, author_id: i64) -> anyhow::Result<Vec<Note>> {
            self.0.list_by_author(author_id).await
        }
        async fn slug_exists(&self, _slug: &str, _exclude_id: Option<i64>) -> anyhow::Result<bool> {
            Ok(false)
        }
        async fn update(&self, note: &Note) -> anyhow::Result<Note> {
            self.0.update(note).await
        }
        async fn delete(&self, id: i64) -> anyhow::Result<()> {
            self.0.delete(id).await
        }
        async fn count(&self) -> anyhow::Result<i64> {
            self.0.count().await
        }
    }

    #[tokio::test]
    async fn test_slug_lost_to_concurrent_write_is_a_form_error() {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        let author = SqlxUserRepository::new(pool.clone())
            .create(&User::new("author".to_string(), "hash".to_string()))
            .await
            .unwrap();
        let service = NoteService::new(Arc::new(StaleSlugCheck(SqlxNoteRepository::boxed(pool))));

        let input = NoteInput::new("Заголовок", "Текст").with_slug("note-slug");
        service.create(&author, input.clone()).await.unwrap();
        let errors = slug_errors(service.create(&author, input).await);
        assert_eq!(errors, vec![format!("note-slug{}", SLUG_TAKEN_WARNING)]);

        let other = service
            .create(&author, NoteInput::new("Другая", "Текст").with_slug("other"))
            .await
            .unwrap();
        let renamed = service
            .update(
                Some(&author),
                &other.slug,
                NoteInput::new("Другая", "Текст").with_slug("note-slug"),
            )
            .await;
        assert_eq!(slug_errors(renamed), vec![format!("note-slug{}", SLUG_TAKEN_WARNING)]);
        assert_eq!(service.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_derived_slug_collision_is_rejected() {
        let (service, author, _) = setup().await;
        service.create(&author, NoteInput::new("Заголовок", "Текст")).await.unwrap();

        let duplicate = service.create(&author, NoteInput::new("Заголовок", "Другой")).await;
        let errors = slug_errors(duplicate);
        assert_eq!(errors, vec![format!("zagolovok{}", SLUG_TAKEN_WARNING)]);
    }

    #[tokio::test]
    async fn test_form_validation() {
        let (service, author, _) = setup().await;
        let result = service
            .create(&author, NoteInput::new("", "").with_slug("не латиница"))
            .await;

        match result {
            Err(NoteServiceError::Invalid(errors)) => {
                assert_eq!(errors.get("title"), [REQUIRED_FIELD]);
                assert_eq!(errors.get("text"), [REQUIRED_FIELD]);
                assert_eq!(errors.get("slug"), [INVALID_SLUG]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }

        let long_title = "a".repeat(MAX_TITLE_LENGTH + 1);
        let result = service.create(&author, NoteInput::new(long_title, "Текст")).await;
        assert!(matches!(result, Err(NoteServiceError::Invalid(_))));
        assert_eq!(service.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_only_contains_own_notes() {
        let (service, author, reader) = setup().await;
        service
            .create(&author, NoteInput::new("Моя", "Текст").with_slug("mine"))
            .await
            .unwrap();
        service
            .create(&reader, NoteInput::new("Чужая", "Текст").with_slug("theirs"))
            .await
            .unwrap();

        let own: Vec<_> = service
            .list_for(&author)
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.slug)
            .collect();
        assert_eq!(own, vec!["mine"]);
    }

    #[tokio::test]
    async fn test_update_recomputes_slug_and_keeps_own_slug() {
        let (service, author, _) = setup().await;
        service
            .create(&author, NoteInput::new("Заголовок", "Текст").with_slug("note-slug"))
            .await
            .unwrap();

        // Re-submitting the same slug is not a conflict with itself
        let kept = service
            .update(
                Some(&author),
                "note-slug",
                NoteInput::new("Заголовок", "Новый текст").with_slug("note-slug"),
            )
            .await
            .unwrap();
        assert_eq!(kept.text, "Новый текст");

        let renamed = service
            .update(Some(&author), "note-slug", NoteInput::new("Новый заголовок", "Текст"))
            .await
            .unwrap();
        assert_eq!(renamed.slug, "novyij-zagolovok");
        assert!(service.get_owned(Some(&author), "note-slug").await.is_err());
    }

    #[tokio::test]
    async fn test_other_users_cannot_touch_note() {
        let (service, author, reader) = setup().await;
        let note = service
            .create(&author, NoteInput::new("Заголовок", "Текст").with_slug("note-slug"))
            .await
            .unwrap();

        assert!(matches!(
            service.get_owned(Some(&reader), "note-slug").await,
            Err(NoteServiceError::Access(AccessError::Hidden))
        ));
        assert!(matches!(
            service.update(Some(&reader), "note-slug", NoteInput::new("x", "y")).await,
            Err(NoteServiceError::Access(AccessError::Hidden))
        ));
        assert!(matches!(
            service.delete(None, "note-slug").await,
            Err(NoteServiceError::Access(AccessError::LoginRequired))
        ));

        let unchanged = service.get_owned(Some(&author), "note-slug").await.unwrap();
        assert_eq!(unchanged, note);
    }

    #[tokio::test]
    async fn test_author_deletes_note() {
        let (service, author, _) = setup().await;
        service
            .create(&author, NoteInput::new("Заголовок", "Текст"))
            .await
            .unwrap();

        service.delete(Some(&author), "zagolovok").await.unwrap();
        assert_eq!(service.count().await.unwrap(), 0);
    }
}
